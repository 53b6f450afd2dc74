use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScriptboxError {
    // Workspace errors
    #[error("Invalid filename: {reason}")]
    Validation { reason: String },

    #[error("File not found: {name}")]
    NotFound { name: String },

    #[error("File already exists: {name}")]
    AlreadyExists { name: String },

    #[error("Content is required and may not be empty")]
    EmptyContent,

    #[error("Content too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    // Execution errors
    #[error("Execution timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Execution failed: {message}")]
    Runtime { message: String },

    #[error("No execution strategy registered for '.{extension}' files")]
    UnsupportedType { extension: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    // Generic wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScriptboxError {
    /// Stable taxonomy name for this error, for callers that branch on the
    /// failure class rather than the message text.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::NotFound { .. } => "not-found",
            Self::AlreadyExists { .. } => "already-exists",
            Self::EmptyContent => "empty-content",
            Self::TooLarge { .. } => "too-large",
            Self::Timeout { .. } => "timeout",
            Self::Runtime { .. } => "runtime",
            Self::UnsupportedType { .. } => "unsupported-type",
            Self::Io(_) => "io",
            Self::Json(_) | Self::TomlParse(_) | Self::Other(_) => "internal",
        }
    }

    /// The message surfaced to external callers. Taxonomy variants already
    /// carry caller-facing text; internal variants (IO, serialization) are
    /// replaced with a generic message so host paths never leak.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io(_) => "Workspace storage unavailable".to_string(),
            Self::Json(_) | Self::TomlParse(_) | Self::Other(_) => "Internal error".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScriptboxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_io_details() {
        let err = ScriptboxError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "/var/lib/secret/path denied",
        ));
        assert_eq!(err.user_message(), "Workspace storage unavailable");
        assert_eq!(err.kind(), "io");
    }

    #[test]
    fn test_user_message_keeps_taxonomy_text() {
        let err = ScriptboxError::NotFound {
            name: "demo.js".to_string(),
        };
        assert_eq!(err.user_message(), "File not found: demo.js");
        assert_eq!(err.kind(), "not-found");
    }
}
