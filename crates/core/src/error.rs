//! Domain error records.

use serde::Serialize;
use thiserror::Error;

/// A single field-rule failure produced by validation.
///
/// Errors are reported in rule-declaration order, one per failing rule, so
/// the caller can attach each message to its form field on redisplay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// An identifier string that does not parse (e.g. malformed UUID).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid identifier: {0}")]
pub struct IdParseError(pub String);
