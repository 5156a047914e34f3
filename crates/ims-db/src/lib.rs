//! Persistence gateway for IMS Release.
//!
//! The [`Gateway`] trait is the only way the rest of the system touches the
//! relational store. Handlers receive it by injection, so tests substitute
//! [`InMemoryGateway`] where production uses [`SqliteGateway`].
//!
//! Every lookup distinguishes "not found" ([`DbError::is_not_found`]) from
//! backend failures. Writes validate records first, so an `unknown` status
//! never reaches storage.

pub mod error;
pub mod memory;
pub mod sqlite;
pub mod traits;

pub use error::{DbError, DbResult};
pub use memory::{GatewayOp, InMemoryGateway};
pub use sqlite::SqliteGateway;
pub use traits::{Gateway, ListOrder};
