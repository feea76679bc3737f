//! Scope resolution between the logical and the engine vocabulary
//!
//! Nested entities live under a (parent type, parent name) scope, and tcp
//! content rules carry an extra request/response axis. Resolution into the
//! engine's command tokens happens here, before any cache lookup or engine
//! invocation, so an invalid combination can never populate the cache.

use std::fmt;
use std::str::FromStr;

use crate::error::ClientError;

/// Parent entity type a nested entity is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentType {
    Frontend,
    Backend,
}

impl ParentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParentType::Frontend => "frontend",
            ParentType::Backend => "backend",
        }
    }

    /// Engine-side token for this parent type.
    pub fn engine_token(&self) -> &'static str {
        match self {
            ParentType::Frontend => "service",
            ParentType::Backend => "farm",
        }
    }
}

impl fmt::Display for ParentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParentType {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "frontend" => Ok(ParentType::Frontend),
            "backend" => Ok(ParentType::Backend),
            _ => Err(ClientError::Validation(format!(
                "parent type {} not recognized",
                s
            ))),
        }
    }
}

/// Request/response axis of tcp content rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleType {
    Request,
    Response,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::Request => "request",
            RuleType::Response => "response",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleType {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "request" => Ok(RuleType::Request),
            "response" => Ok(RuleType::Response),
            _ => Err(ClientError::Validation(format!(
                "rule type {} not recognized",
                s
            ))),
        }
    }
}

/// Engine-side token for a rule type under a given parent.
///
/// Response-class rules only exist on the backend side; requesting them
/// under a frontend is a validation error, never an engine call.
pub fn rule_token(rule_type: RuleType, parent: ParentType) -> Result<&'static str, ClientError> {
    match (rule_type, parent) {
        (RuleType::Request, _) => Ok("tcpreqcont"),
        (RuleType::Response, ParentType::Backend) => Ok("tcprspcont"),
        (RuleType::Response, ParentType::Frontend) => Err(ClientError::Validation(
            "rule type cannot be response for a frontend parent".to_string(),
        )),
    }
}

/// A (parent type, parent name) pair bounding cache lookups and invalidation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope {
    pub parent: ParentType,
    pub name: String,
}

impl Scope {
    pub fn new(parent: ParentType, name: impl Into<String>) -> Self {
        Self {
            parent,
            name: name.into(),
        }
    }

    pub fn frontend(name: impl Into<String>) -> Self {
        Self::new(ParentType::Frontend, name)
    }

    pub fn backend(name: impl Into<String>) -> Self {
        Self::new(ParentType::Backend, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_type_tokens() {
        assert_eq!(ParentType::Frontend.engine_token(), "service");
        assert_eq!(ParentType::Backend.engine_token(), "farm");
        assert_eq!("backend".parse::<ParentType>().unwrap(), ParentType::Backend);
    }

    #[test]
    fn test_unrecognized_vocabulary_is_a_validation_error() {
        assert!(matches!(
            "acl".parse::<ParentType>(),
            Err(ClientError::Validation(_))
        ));
        assert!(matches!(
            "preconnect".parse::<RuleType>(),
            Err(ClientError::Validation(_))
        ));
    }

    #[test]
    fn test_rule_token_resolution() {
        assert_eq!(
            rule_token(RuleType::Request, ParentType::Frontend).unwrap(),
            "tcpreqcont"
        );
        assert_eq!(
            rule_token(RuleType::Response, ParentType::Backend).unwrap(),
            "tcprspcont"
        );
        assert!(matches!(
            rule_token(RuleType::Response, ParentType::Frontend),
            Err(ClientError::Validation(_))
        ));
    }
}
