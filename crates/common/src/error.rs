//! Error types shared across togif crates.

use std::path::PathBuf;

/// Top-level error type for togif operations.
#[derive(Debug, thiserror::Error)]
pub enum TogifError {
    #[error("Edit error: {message}")]
    Edit { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Engine error: {message}")]
    Engine { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error("Image error: {message}")]
    Image { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using TogifError.
pub type TogifResult<T> = Result<T, TogifError>;

impl TogifError {
    pub fn edit(msg: impl Into<String>) -> Self {
        Self::Edit {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn image(msg: impl Into<String>) -> Self {
        Self::Image {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Whether this error came from the external frame engine (ffmpeg).
    ///
    /// Engine failures are terminal for the export attempt; callers report
    /// them and do not retry.
    pub fn is_engine_failure(&self) -> bool {
        matches!(self, Self::Engine { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_build_matching_variants() {
        assert!(matches!(TogifError::edit("x"), TogifError::Edit { .. }));
        assert!(matches!(TogifError::render("x"), TogifError::Render { .. }));
        assert!(TogifError::engine("ffmpeg exited 1").is_engine_failure());
        assert!(!TogifError::config("bad").is_engine_failure());
    }

    #[test]
    fn test_display_includes_message() {
        let err = TogifError::engine("decoder crashed");
        assert_eq!(err.to_string(), "Engine error: decoder crashed");
    }
}
