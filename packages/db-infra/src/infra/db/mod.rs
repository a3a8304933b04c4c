pub mod pool;

pub use pool::{connect_pool, sanitize_db_url};
