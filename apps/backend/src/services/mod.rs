pub mod accounts;
pub mod nutrition;
pub mod progress;
pub mod validation;
pub mod workouts;
