//! Storage for the doctors portal.
//!
//! This crate provides a storage abstraction over the five portal
//! collections (treatment options, bookings, users, doctors and payments).
//! It ships an in-memory store for tests and development and a SQLite store
//! for persistent deployments.

mod error;
mod memory;
mod sqlite;
mod store;

pub use error::*;
pub use memory::*;
pub use sqlite::*;
pub use store::*;
