//! Rule implementations.
//!
//! - `const_pow`: power calls with an integer constant exponent

pub mod const_pow;

pub use const_pow::check_const_pow_issues;
