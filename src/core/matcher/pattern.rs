use crate::core::semantic::FunctionRef;

/// What a matching call looks like: the function it must resolve to and
/// whether only calls written in the main file count. Matching calls always
/// take exactly two arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallPattern {
    pub target: FunctionRef,
    pub main_file_only: bool,
}

impl CallPattern {
    pub fn new(namespace: &str, function: &str, main_file_only: bool) -> Self {
        Self {
            target: FunctionRef::new(namespace, function),
            main_file_only,
        }
    }
}

impl Default for CallPattern {
    fn default() -> Self {
        Self::new("std", "pow", true)
    }
}
