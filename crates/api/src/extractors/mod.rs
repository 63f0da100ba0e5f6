//! Custom Axum extractors.
//!
//! Extractors for the request owner and for bodies, queries and paths that
//! report failures in the error envelope.

pub mod owner;
pub mod rejection;

pub use owner::{OwnerContext, OWNER_HEADER};
pub use rejection::{ApiJson, ApiPath, ApiQuery};
