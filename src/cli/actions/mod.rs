//! Actions for applying issue fixes.
//!
//! ```text
//! Issue (problem detected)
//!     ↓
//! Action (Issue → Operation conversion)
//!     ↓
//! Operation (byte-range replacement in one file)
//!     ↓
//! execute (file modification)
//! ```
//!
//! - [`ReplaceCall`]: Rewrite a power call to its replacement (fix)

mod operation;
mod replace_call;
mod traits;

pub use operation::Operation;
pub use replace_call::ReplaceCall;
pub(crate) use traits::execute_operations;
pub use traits::{Action, ActionStats};
