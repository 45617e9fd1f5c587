//! Error types for port operations.

/// Ledger operation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LedgerError {
    /// The ledger has no record for the player in this realm.
    #[error("No ledger account for {player_id} in realm {realm_id}")]
    UnknownAccount { player_id: String, realm_id: String },

    /// The ledger backend failed - includes operation name for tracing.
    #[error("Ledger error in {operation}: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },
}

impl LedgerError {
    pub fn backend(operation: &'static str, message: impl ToString) -> Self {
        Self::Backend {
            operation,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PresentationError {
    /// The channel or message backing the session is gone.
    #[error("Presentation surface unreachable: {0}")]
    SurfaceUnreachable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PersistenceError {
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }
}
