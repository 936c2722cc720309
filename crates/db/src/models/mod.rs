//! Row structs and request DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for inserts and patches
//! - Query parameter structs for list endpoints

pub mod quote;
pub mod tag;
pub mod widget;
