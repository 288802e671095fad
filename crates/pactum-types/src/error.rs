//! Error types for Pactum
//!
//! Every rejected action maps to exactly one variant here, so callers can
//! tell authorization failures from sequencing failures from infrastructure
//! failures without parsing message strings.

use thiserror::Error;

/// Result alias used across the Pactum crates
pub type Result<T> = std::result::Result<T, EscrowError>;

/// Unified error type for escrow operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EscrowError {
    // ========================================================================
    // Authorization Errors
    // ========================================================================
    /// The requesting principal does not hold the role the action requires
    #[error("Wrong actor: {message}")]
    WrongActor {
        /// What role was required and why
        message: String,
    },

    // ========================================================================
    // Sequencing Errors
    // ========================================================================
    /// The record is not in a status that admits this action
    #[error("Wrong status: {message}")]
    WrongStatus {
        /// Current status and what was expected
        message: String,
    },

    /// The acting party already performed this step
    #[error("Already done: {message}")]
    AlreadyDone {
        /// Which step was repeated
        message: String,
    },

    // ========================================================================
    // Lookup Errors
    // ========================================================================
    /// No record exists under the given ID
    #[error("Escrow record not found: {id}")]
    RecordNotFound {
        /// The ID that missed
        id: String,
    },

    // ========================================================================
    // Infrastructure Errors
    // ========================================================================
    /// The settlement layer refused or failed to accept a broadcast
    #[error("Broadcast failed: {reason}")]
    BroadcastFailed {
        /// Reason reported by the settlement layer
        reason: String,
    },

    /// The store could not persist or remove the record
    #[error("Persistence failed: {reason}")]
    PersistenceFailed {
        /// Underlying storage failure
        reason: String,
    },

    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// A request field failed validation
    #[error("Invalid input for field '{field}': {message}")]
    InvalidInput {
        /// Offending field
        field: String,
        /// What was wrong with it
        message: String,
    },
}

impl EscrowError {
    /// Stable machine-readable code for each variant
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::WrongActor { .. } => "WRONG_ACTOR",
            Self::WrongStatus { .. } => "WRONG_STATUS",
            Self::AlreadyDone { .. } => "ALREADY_DONE",
            Self::RecordNotFound { .. } => "RECORD_NOT_FOUND",
            Self::BroadcastFailed { .. } => "BROADCAST_FAILED",
            Self::PersistenceFailed { .. } => "PERSISTENCE_FAILED",
            Self::InvalidInput { .. } => "INVALID_INPUT",
        }
    }

    /// Check if retrying the same command could succeed
    ///
    /// Guard rejections are deterministic; only infrastructure failures are
    /// worth retrying.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::BroadcastFailed { .. } | Self::PersistenceFailed { .. }
        )
    }

    /// Create a WrongActor error
    pub fn wrong_actor(message: impl Into<String>) -> Self {
        Self::WrongActor {
            message: message.into(),
        }
    }

    /// Create a WrongStatus error
    pub fn wrong_status(message: impl Into<String>) -> Self {
        Self::WrongStatus {
            message: message.into(),
        }
    }

    /// Create an AlreadyDone error
    pub fn already_done(message: impl Into<String>) -> Self {
        Self::AlreadyDone {
            message: message.into(),
        }
    }

    /// Create a RecordNotFound error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::RecordNotFound { id: id.into() }
    }

    /// Create a BroadcastFailed error
    pub fn broadcast_failed(reason: impl Into<String>) -> Self {
        Self::BroadcastFailed {
            reason: reason.into(),
        }
    }

    /// Create a PersistenceFailed error
    pub fn persistence_failed(reason: impl Into<String>) -> Self {
        Self::PersistenceFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            EscrowError::wrong_actor("only the payer can fund").error_code(),
            "WRONG_ACTOR"
        );
        assert_eq!(
            EscrowError::wrong_status("record is terminal").error_code(),
            "WRONG_STATUS"
        );
        assert_eq!(
            EscrowError::already_done("payer already funded").error_code(),
            "ALREADY_DONE"
        );
        assert_eq!(
            EscrowError::not_found("escrow-123").error_code(),
            "RECORD_NOT_FOUND"
        );
        assert_eq!(
            EscrowError::broadcast_failed("daemon timeout").error_code(),
            "BROADCAST_FAILED"
        );
        assert_eq!(
            EscrowError::persistence_failed("disk full").error_code(),
            "PERSISTENCE_FAILED"
        );
        assert_eq!(
            EscrowError::invalid_input("title", "must not be blank").error_code(),
            "INVALID_INPUT"
        );
    }

    #[test]
    fn test_retriable_errors() {
        assert!(EscrowError::broadcast_failed("daemon timeout").is_retriable());
        assert!(EscrowError::persistence_failed("disk full").is_retriable());

        assert!(!EscrowError::wrong_actor("not the arbiter").is_retriable());
        assert!(!EscrowError::wrong_status("already resolved").is_retriable());
        assert!(!EscrowError::already_done("already confirmed").is_retriable());
        assert!(!EscrowError::not_found("escrow-123").is_retriable());
        assert!(!EscrowError::invalid_input("amount", "must be positive").is_retriable());
    }

    #[test]
    fn test_error_display() {
        let err = EscrowError::invalid_input("duration_hours", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid input for field 'duration_hours': must be at least 1"
        );
    }
}
