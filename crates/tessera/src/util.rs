use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

/// Drop trailing whitespace without reallocating
pub fn truncate_trailing_whitespace(text: &mut String) {
    let len = text.trim_end().len();
    text.truncate(len);
}

/// Human-facing name of a source file: its final path component
pub fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// Render a list of paths as `a, b, c`
pub fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Write `contents` to `path`, creating missing parent directories
pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}
