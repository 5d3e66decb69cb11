use std::fmt;

/// Static type of an expression, coarse enough for the integer-type test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaticType {
    Bool,
    Char,
    Integer,
    Floating,
    Enum { name: String, scoped: bool },
    Pointer,
    Class(String),
    Void,
    Unknown,
}

impl StaticType {
    /// Integer types: bool, character types, signed and unsigned integers,
    /// and unscoped enumerations. Scoped enumerations are not integer types.
    pub fn is_integer(&self) -> bool {
        match self {
            StaticType::Bool | StaticType::Char | StaticType::Integer => true,
            StaticType::Enum { scoped, .. } => !scoped,
            _ => false,
        }
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, StaticType::Floating)
    }

    pub fn is_arithmetic(&self) -> bool {
        self.is_integer() || self.is_floating()
    }

    /// Builtin type names as they appear in `primitive_type` nodes or as
    /// standard typedefs (`size_t`, `std::int64_t`, ...).
    pub fn from_builtin(name: &str) -> Option<Self> {
        let name = name.strip_prefix("std::").unwrap_or(name);
        let ty = match name {
            "bool" => StaticType::Bool,
            "char" | "wchar_t" | "char8_t" | "char16_t" | "char32_t" => StaticType::Char,
            "float" | "double" => StaticType::Floating,
            "void" => StaticType::Void,
            "nullptr_t" => StaticType::Pointer,
            "int" | "short" | "long" | "signed" | "unsigned" | "size_t" | "ssize_t"
            | "ptrdiff_t" | "intptr_t" | "uintptr_t" | "intmax_t" | "uintmax_t" => {
                StaticType::Integer
            }
            _ if is_fixed_width_integer(name) => StaticType::Integer,
            _ => return None,
        };
        Some(ty)
    }

    /// Type named by a sequence of specifier keywords such as
    /// `unsigned long long` or `long double`.
    pub fn from_specifiers(text: &str) -> Self {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.contains(&"double") || words.contains(&"float") {
            StaticType::Floating
        } else if words.contains(&"char") {
            StaticType::Char
        } else if words.contains(&"bool") {
            StaticType::Bool
        } else {
            StaticType::Integer
        }
    }
}

/// `int8_t`, `uint_least32_t`, `int_fast64_t`, ...
fn is_fixed_width_integer(name: &str) -> bool {
    let Some(rest) = name.strip_suffix("_t") else {
        return false;
    };
    let rest = rest.strip_prefix('u').unwrap_or(rest);
    let Some(rest) = rest.strip_prefix("int") else {
        return false;
    };
    let rest = rest
        .strip_prefix("_least")
        .or_else(|| rest.strip_prefix("_fast"))
        .unwrap_or(rest);
    matches!(rest, "8" | "16" | "32" | "64")
}

impl fmt::Display for StaticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaticType::Bool => write!(f, "bool"),
            StaticType::Char => write!(f, "char"),
            StaticType::Integer => write!(f, "integer"),
            StaticType::Floating => write!(f, "floating"),
            StaticType::Enum { name, scoped: true } => write!(f, "enum class {}", name),
            StaticType::Enum { name, scoped: false } => write!(f, "enum {}", name),
            StaticType::Pointer => write!(f, "pointer"),
            StaticType::Class(name) => write!(f, "class {}", name),
            StaticType::Void => write!(f, "void"),
            StaticType::Unknown => write!(f, "unknown"),
        }
    }
}
