//! Shared helpers for the fittrack test suites: one-time log setup,
//! error-contract assertions and unique fixture values.

pub mod logging;
pub mod problem_details;
pub mod unique_helpers;
