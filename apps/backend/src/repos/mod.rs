//! Persistence functions, generic over `ConnectionTrait` so they run on a
//! pooled connection or inside a transaction alike.

pub mod progress;
pub mod users;
pub mod workouts;
