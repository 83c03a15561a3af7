pub mod manager;
pub mod models;
pub mod query_builder;
pub mod repository;
pub mod tables;

pub use manager::{DatabaseError, DatabaseManager};
pub use query_builder::{Page, QueryBuilder};
pub use repository::Repository;
