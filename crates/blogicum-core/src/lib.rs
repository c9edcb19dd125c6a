//! # Blogicum Core
//!
//! The domain layer of the Blogicum blog service.
//! This crate holds the entities, the visibility and authorization policies,
//! the repository ports and the services built on top of them. It has no
//! infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod pagination;
pub mod policy;
pub mod ports;
pub mod services;

pub use error::{DomainError, FieldErrors, RepoError};
pub use pagination::{Page, PageRequest};
