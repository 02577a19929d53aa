//! Edit documents: a saved edit of one clip (`*.togif.json`).

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::edit::{BackgroundSettings, EditError, ExportSettings, TrimRange, ZoomWindow};
use crate::snapshot::EditSpecification;
use crate::source::SourceVideo;

/// Current document schema version.
pub const DOCUMENT_VERSION: &str = "1.0";

/// A persisted edit together with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditDocument {
    /// Schema version.
    pub version: String,

    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,

    /// Path of the source clip, relative to the document or absolute.
    pub source_path: PathBuf,

    /// The validated edit. Its source metadata describes `source_path`.
    pub edit: EditSpecification,
}

impl EditDocument {
    /// Wrap an edit into a fresh document.
    pub fn new(source_path: impl Into<PathBuf>, edit: EditSpecification) -> Self {
        let now = Utc::now();
        Self {
            version: DOCUMENT_VERSION.to_string(),
            created_at: now,
            modified_at: now,
            source_path: source_path.into(),
            edit,
        }
    }

    /// A document editing the whole clip with `export` settings.
    pub fn create(
        source_path: impl Into<PathBuf>,
        source: SourceVideo,
        export: ExportSettings,
        background: BackgroundSettings,
    ) -> Result<Self, DocumentError> {
        let trim = TrimRange::full(source.duration_secs)?;
        let edit = EditSpecification::new(source, trim, None, ZoomWindow::none(), export, background)?;
        Ok(Self::new(source_path, edit))
    }

    /// Load and validate a document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| DocumentError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| DocumentError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Write the document as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| DocumentError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| DocumentError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| DocumentError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Replace the edit and bump `modified_at`.
    pub fn update(&mut self, edit: EditSpecification) {
        self.edit = edit;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }

    /// Resolve `source_path` against the directory holding `document_path`.
    pub fn resolve_source(&self, document_path: &Path) -> PathBuf {
        if self.source_path.is_absolute() {
            return self.source_path.clone();
        }
        document_path
            .parent()
            .map(|dir| dir.join(&self.source_path))
            .unwrap_or_else(|| self.source_path.clone())
    }
}

/// Errors from reading or writing edit documents.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid edit: {0}")]
    Edit(#[from] EditError),
}
