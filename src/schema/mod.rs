//! Stream schema module
//!
//! Declared JSON schemas for streams, plus the record checks the sync
//! engine applies before emitting.
//!
//! # Features
//!
//! - **Typed properties**: JSON-schema types, formats and enums
//! - **Conforming**: undeclared properties are dropped from records
//! - **Primary keys**: records missing a key field are rejected

mod types;

pub use types::{check_primary_key, JsonSchema, JsonType, JsonTypeOrArray, SchemaProperty};
