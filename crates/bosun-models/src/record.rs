//! Record protocol shared by all configuration entities
//!
//! The engine dumps configuration as blank-line-delimited text records and
//! accepts writes as `key value` field assignments. Every entity implements
//! [`EngineObject`] so the record parser and the write path stay generic.

use crate::error::ValidationError;

/// A configuration object that can be inflated from an engine dump record
/// and serialized back into engine field assignments.
pub trait EngineObject: Default + Clone + Send + Sync {
    /// Apply the leading token of a record's header line. For named entities
    /// this is the name; for positional entities it is the numeric id, and an
    /// unparseable token degrades to id 0 rather than failing.
    fn apply_header_token(&mut self, token: &str);

    /// Apply one `key value` field line. Unknown keys and unparseable values
    /// are ignored; a key with an empty value is a bare flag.
    fn set_field(&mut self, key: &str, value: &str);

    /// Field assignments sent to the engine on create and edit, in a stable
    /// order. The identifying header token is not a field.
    fn fields(&self) -> Vec<(&'static str, String)>;

    /// Check the payload shape before it is handed to the engine.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Parse a positional id token, degrading to 0 on malformed input.
///
/// The engine assigns rule ids by dump position, so a header that is not a
/// valid integer has no recoverable identity; collections may therefore
/// contain several id-0 entries.
pub fn positional_id(token: &str) -> i64 {
    token.trim().parse().unwrap_or(0)
}

/// Check an entity name: non-empty, at most 63 characters, alphanumeric
/// plus `.`, `-` and `_`.
pub fn validate_name(field: &'static str, name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::Missing(field));
    }
    if name.len() > 63 {
        return Err(ValidationError::invalid(field, "longer than 63 characters"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
    {
        return Err(ValidationError::invalid(
            field,
            format!("`{}` contains characters outside [a-zA-Z0-9._-]", name),
        ));
    }
    Ok(())
}

/// Check a TCP port value.
pub fn validate_port(field: &'static str, port: i64) -> Result<(), ValidationError> {
    if !(1..=65535).contains(&port) {
        return Err(ValidationError::invalid(
            field,
            format!("{} is outside 1-65535", port),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_id_fallback() {
        assert_eq!(positional_id("42"), 42);
        assert_eq!(positional_id(" 7 "), 7);
        assert_eq!(positional_id("abc"), 0);
        assert_eq!(positional_id(""), 0);
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "web_front-01.prod").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", "has space").is_err());
        assert!(validate_name("name", &"x".repeat(64)).is_err());
    }

    #[test]
    fn test_validate_port() {
        assert!(validate_port("port", 80).is_ok());
        assert!(validate_port("port", 0).is_err());
        assert!(validate_port("port", 70000).is_err());
    }
}
