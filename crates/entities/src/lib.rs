//! Core entity definitions for the doctors portal.
//!
//! This crate defines the records shared by the store, the HTTP server and
//! the protocol types: treatment options, bookings, users, doctors and
//! payment records. All entities serialize in camelCase with their
//! identifier exposed as `_id`, the shape existing portal clients consume.

mod booking;
mod doctor;
mod payment;
mod treatment;
mod user;

pub use booking::*;
pub use doctor::*;
pub use payment::*;
pub use treatment::*;
pub use user::*;
