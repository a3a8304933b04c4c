pub mod catalog;
pub mod check_clause;
pub mod dialect;
pub mod expectation;
pub mod reconciler;

pub use dialect::Dialect;
