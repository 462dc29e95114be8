//! Field-level checks for untrusted JSON input.
//!
//! Every failure is a [`ValidationError`] naming the offending field, so callers can
//! answer with a 400 without inspecting the message.

use crate::error::ValidationError;
use serde_json::Value;

/// Fails if `value` is missing, not a string, or blank. Returns the trimmed string.
pub fn require_non_empty_string(
    value: Option<&Value>,
    field: &str,
) -> Result<String, ValidationError> {
    match value {
        None | Some(Value::Null) => Err(ValidationError::for_field(
            field,
            format!("{field} is required"),
        )),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Err(ValidationError::for_field(
                    field,
                    format!("{field} must not be empty"),
                ))
            } else {
                Ok(trimmed.to_string())
            }
        }
        Some(_) => Err(ValidationError::for_field(
            field,
            format!("{field} must be a string"),
        )),
    }
}

/// Absent, null and blank all become `None`. Anything other than a string fails.
pub fn optional_string(
    value: Option<&Value>,
    field: &str,
) -> Result<Option<String>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(_) => Err(ValidationError::for_field(
            field,
            format!("{field} must be a string"),
        )),
    }
}

/// Lowercases `value` and returns the matching member of `allowed`.
pub fn require_enum<'a>(
    value: Option<&Value>,
    allowed: &[&'a str],
    field: &str,
) -> Result<&'a str, ValidationError> {
    let raw = require_non_empty_string(value, field)?.to_lowercase();
    allowed
        .iter()
        .find(|candidate| **candidate == raw)
        .copied()
        .ok_or_else(|| {
            ValidationError::for_field(
                field,
                format!("{field} must be one of: {}", allowed.join(", ")),
            )
        })
}

/// Length is counted in characters, not bytes.
pub fn require_length(
    value: &str,
    field: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min {
        return Err(ValidationError::for_field(
            field,
            format!("{field} must be at least {min} characters"),
        ));
    }
    if len > max {
        return Err(ValidationError::for_field(
            field,
            format!("{field} must be at most {max} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_empty_string_trims() {
        let v = json!("  Laptop ");
        assert_eq!(require_non_empty_string(Some(&v), "name").unwrap(), "Laptop");
    }

    #[test]
    fn non_empty_string_rejects_missing_blank_and_non_strings() {
        for value in [None, Some(json!(null)), Some(json!("   ")), Some(json!(42))] {
            let err = require_non_empty_string(value.as_ref(), "name").unwrap_err();
            assert_eq!(err.field.as_deref(), Some("name"));
        }
        let err = require_non_empty_string(None, "ownerId").unwrap_err();
        assert_eq!(err.message, "ownerId is required");
    }

    #[test]
    fn optional_string_normalizes_empty_to_none() {
        assert_eq!(optional_string(None, "description").unwrap(), None);
        assert_eq!(optional_string(Some(&json!("")), "description").unwrap(), None);
        assert_eq!(optional_string(Some(&json!(null)), "description").unwrap(), None);
        assert_eq!(
            optional_string(Some(&json!(" dev box ")), "description").unwrap(),
            Some("dev box".to_string())
        );
        assert!(optional_string(Some(&json!(["x"])), "description").is_err());
    }

    #[test]
    fn enum_is_case_insensitive() {
        let allowed = ["image", "document", "video", "other"];
        assert_eq!(
            require_enum(Some(&json!("VIDEO")), &allowed, "category").unwrap(),
            "video"
        );
    }

    #[test]
    fn enum_failure_lists_allowed_values() {
        let allowed = ["image", "document", "video", "other"];
        let err = require_enum(Some(&json!("Electronics")), &allowed, "category").unwrap_err();
        assert_eq!(err.field.as_deref(), Some("category"));
        assert_eq!(
            err.message,
            "category must be one of: image, document, video, other"
        );
        assert!(require_enum(None, &allowed, "category").is_err());
    }

    #[test]
    fn length_bounds() {
        assert!(require_length("a", "name", 1, 255).is_ok());
        assert!(require_length(&"a".repeat(255), "name", 1, 255).is_ok());

        let short = require_length("", "name", 1, 255).unwrap_err();
        assert!(short.message.contains("at least 1"));
        let long = require_length(&"a".repeat(256), "name", 1, 255).unwrap_err();
        assert!(long.message.contains("at most 255"));
    }

    #[test]
    fn length_counts_chars() {
        assert!(require_length(&"é".repeat(255), "name", 1, 255).is_ok());
    }
}
