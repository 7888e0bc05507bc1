use jsonschema::Validator;
use serde_json::Value;
use tracing::warn;

use crate::errors::Error;
use crate::utils::strip_code_fence;

/// Creates a JSON Schema validator from a schema string
///
/// # Arguments
/// * `schema_content` - The JSON Schema as a string
///
/// # Returns
/// * `Result<Validator, Error>` - The compiled validator on success, or an error
pub fn build_validator(schema_content: &str) -> Result<Validator, Error> {
    let schema: Value = serde_json::from_str(schema_content)?;
    jsonschema::validator_for(&schema).map_err(|e| Error::SchemaError(e.to_string()))
}

/// Parses a JSON string and checks it against a schema validator
///
/// # Returns
/// * `Result<Option<Value>, Error>` - The value if it conforms, `None` if it
///   parses but does not conform, or a parse error
pub fn validate_response(schema: &Validator, response: &str) -> Result<Option<Value>, Error> {
    let val: Value = serde_json::from_str(response)?;
    Ok(schema.is_valid(&val).then_some(val))
}

/// Extracts a schema-conforming JSON value from raw model output.
///
/// One layer of code fence is stripped first. Any failure (bad schema, bad
/// JSON, non-conforming value) yields `None`.
pub fn parse_structured(schema_content: &str, raw: &str) -> Option<Value> {
    let validator = match build_validator(schema_content) {
        Ok(v) => v,
        Err(e) => {
            warn!("Invalid output schema: {}", e);
            return None;
        }
    };
    match validate_response(&validator, strip_code_fence(raw)) {
        Ok(value) => value,
        Err(e) => {
            warn!("Model output is not valid JSON: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRING_LIST: &str = r#"{"type":"array","items":{"type":"string"}}"#;

    #[test]
    fn accepts_fenced_conforming_json() {
        let value = parse_structured(STRING_LIST, "```json\n[\"a\", \"b\"]\n```").unwrap();
        assert_eq!(value, serde_json::json!(["a", "b"]));
    }

    #[test]
    fn rejects_non_conforming_json() {
        assert!(parse_structured(STRING_LIST, "[1, 2]").is_none());
        assert!(parse_structured(STRING_LIST, r#"{"a": 1}"#).is_none());
    }

    #[test]
    fn rejects_prose() {
        assert!(parse_structured(STRING_LIST, "Sure! Here is the list").is_none());
    }
}
