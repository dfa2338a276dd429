//! Sub-command implementations. Each returns the text destined for stdout.

use std::fmt::{self, Write};
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use schemajson_convert::SchemaConverter;
use schemajson_types::{Field, Metadata, Schema};
use serde_json::Value;

/// Parse a JSON document from `path`, or stdin for `None` and `-`.
pub fn read_document(path: Option<&Path>) -> Result<Value> {
    let text = match path {
        Some(path) if path != Path::new("-") => {
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
        }
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading stdin")?;
            text
        }
    };
    serde_json::from_str(&text).context("parsing JSON")
}

fn load(converter: &SchemaConverter<'_>, document: &Value) -> Result<Schema> {
    let schema = converter.json_to_schema(document).context("invalid schema document")?;
    tracing::info!(fields = schema.fields.len(), "schema loaded");
    Ok(schema)
}

pub fn validate(converter: &SchemaConverter<'_>, document: &Value) -> Result<String> {
    let schema = load(converter, document)?;
    Ok(format!("valid: {} top-level field(s)", schema.fields.len()))
}

/// Re-emit the document in canonical form.
pub fn normalize(converter: &SchemaConverter<'_>, document: &Value, compact: bool) -> Result<String> {
    let schema = load(converter, document)?;
    let json = converter.schema_to_json(&schema)?;
    let text = if compact {
        serde_json::to_string(&json)?
    } else {
        serde_json::to_string_pretty(&json)?
    };
    Ok(text)
}

pub fn fingerprint(converter: &SchemaConverter<'_>, document: &Value) -> Result<String> {
    let schema = load(converter, document)?;
    Ok(converter.fingerprint(&schema)?)
}

/// Indented tree of fields with their types and metadata.
pub fn inspect(converter: &SchemaConverter<'_>, document: &Value) -> Result<String> {
    let schema = load(converter, document)?;
    let mut tree = String::new();
    render_tree(&mut tree, &schema)?;
    Ok(tree)
}

pub fn render_tree<W: Write>(out: &mut W, schema: &Schema) -> fmt::Result {
    writeln!(out, "schema ({} fields)", schema.fields.len())?;
    write_metadata(out, &schema.metadata, 1)?;
    for field in &schema.fields {
        write_field(out, field, 1)?;
    }
    Ok(())
}

fn write_field<W: Write>(out: &mut W, field: &Field, depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    let null = if field.nullable { "" } else { " not null" };
    writeln!(out, "{}{}: {}{}", indent, field.name, field.data_type, null)?;
    write_metadata(out, &field.metadata, depth + 1)?;

    for child in field.data_type.children() {
        write_field(out, child, depth + 1)?;
    }
    Ok(())
}

fn write_metadata<W: Write>(out: &mut W, metadata: &Metadata, depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    for kv in metadata {
        writeln!(out, "{}# {} = {}", indent, kv.key, kv.value)?;
    }
    Ok(())
}
