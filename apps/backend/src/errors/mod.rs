//! Error handling for the FitTrack backend.

pub mod error_code;

pub use error_code::ErrorCode;
