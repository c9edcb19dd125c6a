//! Data store implementations: PostgreSQL through SeaORM, and in-memory.

mod connections;
pub mod memory;

#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
pub mod postgres_repo;

#[cfg(feature = "postgres")]
pub mod entity;

pub use connections::DatabaseConfig;
#[cfg(feature = "postgres")]
pub use connections::DatabaseConnections;
pub use memory::{InMemoryRepository, InMemoryStore};

#[cfg(feature = "postgres")]
pub use postgres_repo::{
    PostgresCategoryRepository, PostgresCommentRepository, PostgresLocationRepository,
    PostgresPostRepository, PostgresUserRepository,
};

/// Repository handles sharing one SeaORM connection.
#[cfg(feature = "postgres")]
pub fn postgres_repositories(db: sea_orm::DbConn) -> blogicum_core::ports::Repositories {
    use std::sync::Arc;

    blogicum_core::ports::Repositories {
        users: Arc::new(PostgresUserRepository::new(db.clone())),
        categories: Arc::new(PostgresCategoryRepository::new(db.clone())),
        locations: Arc::new(PostgresLocationRepository::new(db.clone())),
        posts: Arc::new(PostgresPostRepository::new(db.clone())),
        comments: Arc::new(PostgresCommentRepository::new(db)),
    }
}

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;
