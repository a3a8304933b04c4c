pub mod progress;
pub mod users;
pub mod workouts;

pub use progress::Entity as ProgressEntries;
pub use progress::Model as ProgressEntry;
pub use users::Entity as Users;
pub use users::Model as User;
pub use workouts::Entity as Workouts;
pub use workouts::Model as Workout;
