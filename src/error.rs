//! Error types for the project store.

use std::fmt;

use thiserror::Error;

/// Result type alias for project operations.
pub type ProjectResult<T> = Result<T, ProjectError>;

/// The kind of entity an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Shot,
    Asset,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Shot => f.write_str("shot"),
            EntityKind::Asset => f.write_str("asset"),
        }
    }
}

/// Errors that can occur while working with a project.
#[derive(Error, Debug)]
pub enum ProjectError {
    /// Automerge error during document operations.
    #[error("Automerge error: {0}")]
    Automerge(#[from] automerge::AutomergeError),

    /// Autosurgeon hydration error.
    #[error("Hydration error: {0}")]
    Hydrate(#[from] autosurgeon::HydrateError),

    /// Autosurgeon reconcile error.
    #[error("Reconcile error: {0}")]
    Reconcile(#[from] autosurgeon::ReconcileError),

    /// Entity not found. Store mutations report missing ids through
    /// `Outcome::NotFound`; this variant exists for strict callers.
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// Editor input rejected by a validation gate.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ProjectError {
    /// Creates a NotFound error.
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Creates a Validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a Serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}

impl From<serde_json::Error> for ProjectError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = ProjectError::not_found(EntityKind::Asset, "asset-1");
        assert_eq!(err.to_string(), "asset not found: asset-1");
    }

    #[test]
    fn test_json_error_converts() {
        let err: ProjectError = serde_json::from_str::<i32>("nope").unwrap_err().into();
        assert!(matches!(err, ProjectError::Serialization(_)));
    }
}
