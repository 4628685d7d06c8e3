//! HTTP protocol definitions for the doctors portal.
//!
//! Request bodies, query parameters and response envelopes exchanged
//! between the portal server and its clients. Write acknowledgements mirror
//! the document-store result shapes (`acknowledged`, `insertedId`,
//! `deletedCount`, ...) that existing clients inspect.

mod error;
pub mod requests;
pub mod responses;

pub use error::*;
