//! Bundle assembly
//!
//! Inputs are validated as a batch before anything is read: every missing
//! path is reported in one error, and no file is read or written when any
//! input is absent.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use indexmap::IndexSet;
use log::debug;
use thiserror::Error;

use crate::util::{display_name, join_paths};

/// One or more declared inputs do not exist
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing {} input file(s): {}", .paths.len(), join_paths(.paths))]
pub struct MissingInputError {
    /// Missing paths in declaration order, without duplicates
    pub paths: Vec<PathBuf>,
}

impl MissingInputError {
    /// Merge several reports, keeping first-seen order
    pub fn merge(errors: impl IntoIterator<Item = Self>) -> Option<Self> {
        let paths: IndexSet<PathBuf> = errors.into_iter().flat_map(|err| err.paths).collect();
        if paths.is_empty() {
            None
        } else {
            Some(Self {
                paths: paths.into_iter().collect(),
            })
        }
    }
}

#[derive(Debug, Error)]
pub enum BundleError {
    #[error(transparent)]
    MissingInputs(#[from] MissingInputError),

    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A source file read at load time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Zero-based position in the bundle order
    pub position: usize,
    /// File name used in markers and reports
    pub name: String,
    pub content: String,
}

/// Outcome of transforming one [`SourceFile`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResult {
    pub name: String,
    pub original_len: usize,
    pub original_lines: usize,
    pub text: String,
}

impl TransformResult {
    pub fn new(source: &SourceFile, text: String) -> Self {
        Self {
            name: source.name.clone(),
            original_len: source.content.len(),
            original_lines: source.content.lines().count(),
            text,
        }
    }

    pub fn transformed_len(&self) -> usize {
        self.text.len()
    }

    pub fn transformed_lines(&self) -> usize {
        self.text.lines().count()
    }
}

/// How transformed files are joined into one artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinPolicy {
    /// One blank line between files, no markers
    Minified,
    /// Every file preceded by a `/* ===== name ===== */` marker line
    Annotated,
}

impl JoinPolicy {
    pub const fn for_minify(minify: bool) -> Self {
        if minify { Self::Minified } else { Self::Annotated }
    }
}

/// Provenance marker written before each file of an unminified bundle
pub fn file_marker(name: &str) -> String {
    format!("/* ===== {name} ===== */")
}

/// Ordered transformed files plus the policy used to join them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub results: Vec<TransformResult>,
    pub policy: JoinPolicy,
}

impl Bundle {
    pub const fn new(results: Vec<TransformResult>, policy: JoinPolicy) -> Self {
        Self { results, policy }
    }

    /// Concatenate the files according to the join policy.
    pub fn render(&self) -> String {
        match self.policy {
            JoinPolicy::Minified => {
                let parts: Vec<&str> = self
                    .results
                    .iter()
                    .map(|result| result.text.trim_end_matches(['\r', '\n']))
                    .filter(|text| !text.is_empty())
                    .collect();
                if parts.is_empty() {
                    String::new()
                } else {
                    let mut joined = parts.join("\n\n");
                    joined.push('\n');
                    joined
                }
            }
            JoinPolicy::Annotated => {
                let mut parts = Vec::with_capacity(self.results.len() * 2);
                for result in &self.results {
                    parts.push(file_marker(&result.name));
                    parts.push(result.text.clone());
                }
                parts.join("\n")
            }
        }
    }

    pub fn original_len(&self) -> usize {
        self.results.iter().map(|result| result.original_len).sum()
    }
}

/// Check that every input exists, reporting all missing paths at once.
pub fn check_inputs<P: AsRef<Path>>(paths: &[P]) -> Result<(), MissingInputError> {
    let missing: IndexSet<PathBuf> = paths
        .iter()
        .map(|path| path.as_ref())
        .filter(|path| !path.is_file())
        .map(Path::to_path_buf)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(MissingInputError {
            paths: missing.into_iter().collect(),
        })
    }
}

/// Validate then read every input in order.
pub fn load_sources<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<SourceFile>, BundleError> {
    check_inputs(paths)?;

    paths
        .iter()
        .enumerate()
        .map(|(position, path)| {
            let path = path.as_ref();
            let content = fs::read_to_string(path).map_err(|source| BundleError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            debug!("Loaded {} ({} bytes)", path.display(), content.len());
            Ok(SourceFile {
                path: path.to_path_buf(),
                position,
                name: display_name(path),
                content,
            })
        })
        .collect()
}

/// Read, transform and join `paths` into a bundle.
///
/// The transform only runs when `minify` is set; otherwise files pass through
/// unchanged and the bundle is annotated with per-file markers.
pub fn assemble<P, F>(paths: &[P], transform: F, minify: bool) -> Result<Bundle, BundleError>
where
    P: AsRef<Path>,
    F: Fn(&str) -> String,
{
    let results = load_sources(paths)?
        .iter()
        .map(|source| {
            let text = if minify {
                transform(&source.content)
            } else {
                source.content.clone()
            };
            TransformResult::new(source, text)
        })
        .collect();

    Ok(Bundle::new(results, JoinPolicy::for_minify(minify)))
}

#[cfg(test)]
mod tests;
