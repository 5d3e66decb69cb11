//! Just enough C++ semantics to tell which function a call names and
//! whether an argument is an integer constant expression.
//!
//! - `types`: coarse static types
//! - `scope`: scopes, symbols, macros
//! - `declarations`: fills the environment from the syntax tree
//! - `consteval`: constant-expression and type facts for expressions
//! - `resolve`: callee resolution
//! - `syntax`: tree-sitter node helpers

pub mod consteval;
pub mod declarations;
pub mod resolve;
pub mod scope;
pub mod syntax;
pub mod types;

pub use consteval::{ConstEvaluator, ExprFacts};
pub use resolve::{FunctionRef, callee_name, resolves_to};
pub use scope::{Environment, ScopeKind, Symbol};
pub use syntax::QualifiedName;
pub use types::StaticType;
