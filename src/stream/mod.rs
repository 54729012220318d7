//! Stream definitions
//!
//! A [`StreamDefinition`] binds a path template, schema, keys, record
//! selector, pagination and parent link into one named entity. A
//! [`StreamRegistry`] holds the streams of a tap in declaration order.

mod registry;
mod types;

pub use crate::decode::RecordSelector;
pub use crate::pagination::PaginationConfig;
pub use registry::{Selection, StreamRegistry};
pub use types::{ChildContextRule, ContextField, StreamDefinition};
