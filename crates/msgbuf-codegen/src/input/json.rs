//! JSON form of the definition model.
//!
//! A document is either a whole [`Schema`] (an object with a `files` array)
//! or a single [`DefinitionFile`], which becomes a one-file schema.

use crate::error::GenerateError;
use crate::ir::{DefinitionFile, Schema};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Parse a schema from its JSON representation.
pub fn parse_schema_json(value: &Value) -> Result<Schema, GenerateError> {
    if value.get("files").is_some() {
        return Ok(serde_json::from_value(value.clone())?);
    }
    let file: DefinitionFile = serde_json::from_value(value.clone())?;
    Ok(Schema {
        files: vec![file],
        options: Vec::new(),
    })
}

/// Read and parse a schema file.
pub fn load_schema(path: &Path) -> Result<Schema, GenerateError> {
    let text = std::fs::read_to_string(path).map_err(|source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&text)?;
    let mut schema = parse_schema_json(&value)?;
    let fallback = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    for file in &mut schema.files {
        if file.name.is_empty() {
            file.name = fallback.clone();
        }
    }
    debug!(path = %path.display(), files = schema.files.len(), "loaded schema");
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Definition, PrimitiveKind, Type};
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn single_file_documents() {
        let schema = parse_schema_json(&json!({
            "name": "shapes",
            "definitions": [
                { "message": { "name": "Shape", "abstract": true } },
                { "message": {
                    "name": "Circle",
                    "extends": "Shape",
                    "fields": [{ "name": "radius", "type": { "primitive": "double" } }]
                } }
            ]
        }))
        .unwrap();
        assert_eq!(schema.files.len(), 1);
        let Definition::Message(circle) = &schema.files[0].definitions[1] else {
            panic!("expected a message");
        };
        assert_eq!(circle.extends.as_deref(), Some("Shape"));
        assert_eq!(circle.fields[0].ty, Type::Primitive(PrimitiveKind::Double));
    }

    #[test]
    fn whole_schemas() {
        let schema = parse_schema_json(&json!({
            "files": [{ "name": "a" }, { "name": "b" }],
            "options": [{ "name": "global", "options": { "NoXml": true } }]
        }))
        .unwrap();
        assert_eq!(schema.files.len(), 2);
        assert_eq!(schema.options.len(), 1);
    }

    #[test]
    fn malformed_documents_fail() {
        let err = parse_schema_json(&json!({ "definitions": [{ "message": { "fields": [{}] } }] }))
            .unwrap_err();
        assert!(matches!(err, GenerateError::Input(_)));
    }

    #[test]
    fn files_are_named_after_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{ "definitions": [] }}"#).unwrap();
        let schema = load_schema(&path).unwrap();
        assert_eq!(schema.files[0].name, "search.json");
    }
}
