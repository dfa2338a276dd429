//! Schema ↔ canonical JSON interchange
//!
//! [`SchemaConverter`] turns a [`Schema`](schemajson_types::Schema) into the
//! JSON document
//!
//! ```json
//! {"schema": {"fields": [...], "metadata": [{"key": "k", "value": "v"}]}}
//! ```
//!
//! and back. Extension types travel as reserved metadata entries over their
//! storage type; on the way in they are resolved against an
//! [`ExtensionLookup`](schemajson_registry::ExtensionLookup).

mod config;
mod converter;
mod error;
mod marshal;
mod scope;
mod unmarshal;
mod wire;

pub use config::{ConverterConfig, ExtensionFailurePolicy};
pub use converter::{json_to_schema, schema_to_json, SchemaConverter};
pub use error::{ConvertError, Result};
