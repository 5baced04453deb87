pub mod manager;
pub mod models;
pub mod query;
pub mod repository;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use repository::{Entity, Repository};
pub use store::{PgStore, ProfileStore, RelationStore};
