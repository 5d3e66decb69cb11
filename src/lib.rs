//! stdpow - rewrites `std::pow` calls with integer constant exponents
//!
//! A call `std::pow(b, N)` whose exponent `N` is an integer constant
//! expression is reported with a fix that rewrites it to
//! `utils::pow<std::pow(b, N)>(b)`.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (commands, actions, reporting)
//! - `config`: Configuration file loading and parsing
//! - `core`: Front end, semantic model and call matching
//! - `diagnostics`: One-time diagnostic registration and emission
//! - `issues`: Issue type definitions and reporting
//! - `rules`: The constant-exponent rule

pub mod cli;
pub mod config;
pub mod core;
pub mod diagnostics;
pub mod issues;
pub mod rules;
