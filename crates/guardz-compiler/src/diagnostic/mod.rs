//! Errors and source locations.

mod error;
mod span;

pub use error::GuardzError;
pub use span::{Position, Span};
