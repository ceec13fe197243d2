// src/infra/errors.rs — Error types for Decora

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecoraError {
    // Backend errors (retriable when transport-level or 5xx)
    #[error("Design backend error: HTTP {status}: {message}")]
    Backend {
        status: u16,
        message: String,
        retriable: bool,
    },

    #[error("Design backend unreachable: {message}")]
    Transport { message: String, retriable: bool },

    #[error("Backend returned an unexpected payload: {0}")]
    MalformedResponse(String),

    // Auth: 401 from the backend, or no local credential at all.
    // Kept distinct from generic backend failures so the UI can say
    // "log in" instead of "try again".
    #[error("Authentication required. Run `decora login` first.")]
    AuthRequired,

    #[error("Session '{session_id}' not found")]
    SessionNotFound { session_id: String },

    // Infra
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DecoraError {
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            DecoraError::Backend {
                retriable: true,
                ..
            } | DecoraError::Transport {
                retriable: true,
                ..
            }
        )
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, DecoraError::AuthRequired)
    }
}
