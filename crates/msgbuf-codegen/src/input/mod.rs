//! Schema loaders.
//!
//! Each loader produces an IR [`Schema`](crate::ir::Schema). The textual schema
//! language has its own front end; this crate reads the JSON form of the IR.

mod json;

pub use json::{load_schema, parse_schema_json};
