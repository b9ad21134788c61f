//! Aoi: parse a tiny S-expression language of numbers, identifiers, binary
//! arithmetic and `let`, and render the resulting tree.
//!
//! ```rust
//! let tree = aoi::parse("(let ((x 5)) (+ x 1))").unwrap();
//! assert_eq!(
//!     tree.to_string(),
//!     r#"ELet([("x", ENumber(5))], EPrim(PLUS, EId(x), ENumber(1)))"#
//! );
//! ```

pub use crate::ast::{Binding, Expr, Op, Span};
pub use crate::errors::{AoiError, ErrorCategory, SourceContext};
pub use crate::syntax::{parse, parse_program};

pub mod ast;
pub mod cli;
pub mod engine;
pub mod errors;
pub mod syntax;
