//! Errors reported by persistence and collaborator ports.

use thiserror::Error;

/// Failure reported by a store or external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The store rejected a read.
    #[error("read failed: {0}")]
    ReadFailed(String),

    /// The store rejected a write.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// A concurrent writer changed the record first.
    #[error("conflicting update: {0}")]
    Conflict(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn write_failed(message: impl Into<String>) -> Self {
        StoreError::WriteFailed(message.into())
    }

    pub fn read_failed(message: impl Into<String>) -> Self {
        StoreError::ReadFailed(message.into())
    }

    /// Returns true if the host should retry the event.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::ReadFailed(_) | StoreError::WriteFailed(_) | StoreError::Conflict(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_displays_entity_and_id() {
        let err = StoreError::not_found("membership plan", 12);
        assert_eq!(err.to_string(), "membership plan not found: 12");
        assert!(!err.is_retryable());
    }

    #[test]
    fn write_failures_are_retryable() {
        assert!(StoreError::write_failed("disk full").is_retryable());
        assert!(StoreError::Conflict("entry 1".into()).is_retryable());
    }
}
