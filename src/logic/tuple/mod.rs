//! Tuple Module - typed records and schemas
//!
//! Minimal stand-in for the host runtime's tuple model: enough to bind
//! attribute names to types and copy input tuples into output tuples.

pub mod record;
pub mod schema;
pub mod types;


// Re-export common types
pub use record::{OutputTuple, Record};
pub use schema::{Attribute, StreamSchema};
pub use types::{MetaType, Value};
