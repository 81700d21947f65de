pub mod error;
pub mod eval;
pub mod functions;

pub use error::{ExpressionError, Result};
pub use eval::{Evaluator, filter_rows};
