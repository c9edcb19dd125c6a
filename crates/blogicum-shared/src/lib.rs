//! # Blogicum Shared
//!
//! Wire types of the HTTP API: form bodies, page payloads and the
//! error/redirect bodies. Kept free of server dependencies so a client can
//! reuse them.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, RedirectResponse};
