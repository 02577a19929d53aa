pub mod check;
pub mod export;
pub mod info;
pub mod init;
pub mod mask;
pub mod plan;
pub mod replay;

use std::path::{Path, PathBuf};

use togif_edit_model::{EditDocument, QualityPreset};

/// `dir/clip.mp4` -> `dir/clip.togif.json`.
pub fn default_document_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "edit".to_string());
    source.with_file_name(format!("{stem}.togif.json"))
}

/// Source path as stored in a document written to `document`: bare file
/// name when both live in the same directory, absolute otherwise.
pub fn source_reference(source: &Path, document: &Path) -> PathBuf {
    let source_dir = source.parent().unwrap_or(Path::new(""));
    let document_dir = document.parent().unwrap_or(Path::new(""));
    match source.file_name() {
        Some(name) if source_dir == document_dir => PathBuf::from(name),
        _ => std::fs::canonicalize(source).unwrap_or_else(|_| source.to_path_buf()),
    }
}

pub fn parse_quality(value: &str) -> anyhow::Result<QualityPreset> {
    match value.parse::<QualityPreset>() {
        Ok(QualityPreset::Custom) => Err(anyhow::anyhow!(
            "'custom' is not a preset to apply. Use: high, medium, low"
        )),
        Ok(preset) => Ok(preset),
        Err(e) => Err(anyhow::anyhow!("{e}. Use: high, medium, low")),
    }
}

pub fn load_document(path: &Path) -> anyhow::Result<EditDocument> {
    EditDocument::load(path).map_err(|e| anyhow::anyhow!("Failed to load edit document: {e}"))
}
