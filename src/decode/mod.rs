//! Response decoder module
//!
//! Supports: JSON-path selection, key/value map reshaping
//!
//! # Overview
//!
//! A [`RecordDecoder`] turns one parsed response body into a lazy sequence
//! of record objects. Streams choose a decoder through a [`RecordSelector`].

mod decoders;
mod types;

pub use decoders::{lookup_path, parse_json, JsonPathDecoder, KeyValueDecoder};
pub use types::{RecordDecoder, RecordSelector, Records};
