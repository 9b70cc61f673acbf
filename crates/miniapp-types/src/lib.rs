//! Core types and traits for the miniapp event service.
//!
//! The record shape lives in [`schema`] and is shared by the datastore backends
//! (DDL, validation) and the JSON views served by the API.

mod dto;
mod record;
pub mod schema;
mod traits;

pub use dto::*;
pub use record::*;
pub use traits::*;
