//! Domain error taxonomy.
//!
//! One enum for the whole core so callers can match on the kind. The
//! boundary layer (HTTP handler, CLI) owns the mapping to transport
//! codes; `Forbidden` is kept distinct from `Validation` so an
//! authorization failure can be rendered as 403 rather than 400.

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

/// Convenience alias for core results.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Build a `NotFound` from any displayable id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        CoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns `true` for errors that are safe to retry (transient
    /// persistence failures). Validation, authorization, conflict, and
    /// not-found errors are never retried automatically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::Persistence(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_includes_entity_and_id() {
        let err = CoreError::not_found("Article", "a1b2");
        assert_eq!(err.to_string(), "Entity not found: Article with id a1b2");
    }

    #[test]
    fn only_persistence_errors_are_retryable() {
        assert!(CoreError::Persistence("timeout".into()).is_retryable());
        assert!(!CoreError::Validation("bad".into()).is_retryable());
        assert!(!CoreError::Forbidden("nope".into()).is_retryable());
        assert!(!CoreError::Conflict("dup".into()).is_retryable());
        assert!(!CoreError::not_found("Comment", "x").is_retryable());
    }
}
