//! Structural matching of calls to a namespace-scope function.
//!
//! - `pattern`: what to look for
//! - `record`: what a match binds (call, callee, arguments)
//! - `walker`: the scope-aware traversal producing matches

pub mod pattern;
pub mod record;
pub mod walker;

pub use pattern::CallPattern;
pub use record::{Argument, CallSite, Callee, PowCallMatch};
pub use walker::{PowCallMatches, find_pow_calls};
