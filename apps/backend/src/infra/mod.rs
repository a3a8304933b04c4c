//! Infrastructure layer: connections, schema expectation, error mapping and
//! state assembly.

pub mod db;
pub mod db_errors;
pub mod schema;
pub mod state;
