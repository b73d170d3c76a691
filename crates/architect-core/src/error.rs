//! Error types for Profile Architect.

use crate::section::SectionKind;
use thiserror::Error;

/// A shared error type for the entire application.
///
/// Model failures for one-shot generation never reach callers as this type;
/// the generation gateway folds them into fixed user-facing strings. Everything
/// else (storage, validation, configuration, streaming chat) is reported here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArchitectError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "JSON"
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected user input or a disallowed state transition
    #[error("Validation error: {0}")]
    Validation(String),

    /// Finalize was requested before the required sections were approved
    #[error("Please select and approve content for: {}", join_kinds(.missing))]
    IncompleteSections { missing: Vec<SectionKind> },

    /// An operation was requested before the session reached the required step
    #[error("Missing precondition: {0}")]
    MissingPrecondition(String),

    /// The language model call failed (transport, auth, or malformed reply)
    #[error("Model error{}: {message}", status_suffix(.status))]
    Model {
        status: Option<u16>,
        message: String,
    },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

fn join_kinds(kinds: &[SectionKind]) -> String {
    kinds
        .iter()
        .map(|k| k.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ArchitectError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a MissingPrecondition error
    pub fn missing_precondition(message: impl Into<String>) -> Self {
        Self::MissingPrecondition(message.into())
    }

    /// Creates a Model error
    pub fn model(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Model {
            status,
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a model error
    pub fn is_model(&self) -> bool {
        matches!(self, Self::Model { .. })
    }

    /// Returns the missing section ids when finalize was rejected.
    pub fn missing_sections(&self) -> Option<&[SectionKind]> {
        match self {
            Self::IncompleteSections { missing } => Some(missing.as_slice()),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ArchitectError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ArchitectError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, ArchitectError>`.
pub type Result<T> = std::result::Result<T, ArchitectError>;
