//! # Data Schema Validation
//!
//! A schema lists required top-level fields and their JSON types. Extra
//! fields are allowed.

use crate::domain::SchemaViolation;
use serde_json::Value;
use shared_types::{FieldKind, SchemaField};

fn has_kind(value: &Value, kind: FieldKind) -> bool {
    match kind {
        FieldKind::String => value.is_string(),
        FieldKind::Number => value.is_number(),
        FieldKind::Boolean => value.is_boolean(),
        FieldKind::Object => value.is_object(),
        FieldKind::Array => value.is_array(),
    }
}

/// Check `plaintext` against `schema`.
pub fn validate_against_schema(
    schema: &[SchemaField],
    plaintext: &[u8],
) -> Result<(), SchemaViolation> {
    let value: Value =
        serde_json::from_slice(plaintext).map_err(|e| SchemaViolation::NotJson(e.to_string()))?;
    let object = value.as_object().ok_or(SchemaViolation::NotObject)?;

    for field in schema {
        let present = object
            .get(&field.name)
            .ok_or_else(|| SchemaViolation::MissingField(field.name.clone()))?;
        if !has_kind(present, field.kind) {
            return Err(SchemaViolation::WrongType {
                field: field.name.clone(),
                expected: field.kind,
            });
        }
    }
    Ok(())
}
