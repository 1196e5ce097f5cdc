//! Build configuration
//!
//! Every pipeline receives its settings through [`Config`]; nothing is read
//! from process-wide state once the configuration has been loaded. Relative
//! paths are resolved against [`Config::root`].

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{css::MinifyOptions, dirs, html::HtmlOptions, js::StripMode};

/// Stylesheets in cascade order
pub const DEFAULT_CSS_FILES: [&str; 18] = [
    "variables.css",
    "reset.css",
    "layout.css",
    "sidebar.css",
    "reference-panel.css",
    "resize-handles.css",
    "header.css",
    "scripture.css",
    "color-picker.css",
    "highlights-popup.css",
    "strongs-popup.css",
    "notes.css",
    "settings.css",
    "loading.css",
    "error.css",
    "responsive.css",
    "scrollbars.css",
    "hotkeys.css",
];

/// Scripts, relative to the JS source root
pub const DEFAULT_JS_FILES: [&str; 11] = [
    "main.js",
    "sw.js",
    "modules/api.js",
    "modules/highlights.js",
    "modules/hotkeys.js",
    "modules/navigation.js",
    "modules/passage.js",
    "modules/settings.js",
    "modules/state.js",
    "modules/strongs.js",
    "modules/ui.js",
];

pub const DEFAULT_HTML_FILES: [&str; 1] = ["index.html"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_owned()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Base for every relative path below
    pub root: PathBuf,
    /// Copy an existing output aside before overwriting it
    pub backup: bool,
    pub css: CssConfig,
    pub js: JsConfig,
    pub html: HtmlConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            backup: true,
            css: CssConfig::default(),
            js: JsConfig::default(),
            html: HtmlConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CssConfig {
    pub source_dir: PathBuf,
    /// Bundle order; cascade precedence depends on it
    pub files: Vec<String>,
    pub output: PathBuf,
    pub backup_dir: PathBuf,
    pub strip_line_comments: bool,
}

impl Default for CssConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("src/css"),
            files: owned(&DEFAULT_CSS_FILES),
            output: PathBuf::from("www/styles.css"),
            backup_dir: PathBuf::from("src/css/backups"),
            strip_line_comments: true,
        }
    }
}

impl CssConfig {
    pub const fn minify_options(&self) -> MinifyOptions {
        MinifyOptions {
            strip_line_comments: self.strip_line_comments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct JsConfig {
    pub source_root: PathBuf,
    pub output_root: PathBuf,
    /// Paths relative to both roots
    pub files: Vec<String>,
    pub backup_dir: PathBuf,
    pub strip_mode: StripMode,
}

impl Default for JsConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("src"),
            output_root: PathBuf::from("www"),
            files: owned(&DEFAULT_JS_FILES),
            backup_dir: PathBuf::from("src/modules"),
            strip_mode: StripMode::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HtmlConfig {
    pub source_root: PathBuf,
    pub output_root: PathBuf,
    pub files: Vec<String>,
    pub backup_dir: PathBuf,
    pub preserve_comment_markers: Vec<String>,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("src"),
            output_root: PathBuf::from("www"),
            files: owned(&DEFAULT_HTML_FILES),
            backup_dir: PathBuf::from("src/backups"),
            preserve_comment_markers: HtmlOptions::default().preserve_comment_markers,
        }
    }
}

impl HtmlConfig {
    pub fn options(&self) -> HtmlOptions {
        HtmlOptions {
            preserve_comment_markers: self.preserve_comment_markers.clone(),
        }
    }
}

/// One file of a per-file pipeline with its resolved locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMapping {
    /// Name relative to the source and output roots
    pub name: String,
    pub source: PathBuf,
    pub output: PathBuf,
}

impl Config {
    /// Resolve `path` against the configured root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    /// Ordered CSS inputs
    pub fn css_inputs(&self) -> Vec<PathBuf> {
        let dir = self.resolve(&self.css.source_dir);
        self.css.files.iter().map(|name| dir.join(name)).collect()
    }

    pub fn css_output(&self) -> PathBuf {
        self.resolve(&self.css.output)
    }

    pub fn js_files(&self) -> Vec<FileMapping> {
        map_files(
            &self.resolve(&self.js.source_root),
            &self.resolve(&self.js.output_root),
            &self.js.files,
        )
    }

    pub fn html_files(&self) -> Vec<FileMapping> {
        map_files(
            &self.resolve(&self.html.source_root),
            &self.resolve(&self.html.output_root),
            &self.html.files,
        )
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read a config file; a relative `root` is taken relative to the file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::read(path)?;
        if config.root.is_relative() {
            let base = path.parent().unwrap_or(Path::new(""));
            config.root = base.join(&config.root);
        }
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the configuration for a build started in the current directory.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().map_err(|source| ConfigError::Read {
            path: PathBuf::from("."),
            source,
        })?;
        Self::load_from(explicit, &cwd, dirs::user_config_file().as_deref())
    }

    /// Lookup order: `explicit` (must exist), `cwd/tessera.toml`,
    /// `user_file`, built-in defaults.
    ///
    /// A relative root in a user-level file is taken relative to `cwd`, since
    /// that file describes the layout of whichever project is being built.
    pub fn load_from(
        explicit: Option<&Path>,
        cwd: &Path,
        user_file: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            let path = cwd.join(path);
            if !path.is_file() {
                return Err(ConfigError::NotFound(path));
            }
            debug!("Using config file {}", path.display());
            return Self::from_file(&path);
        }

        let project = dirs::project_config_file(cwd);
        if project.is_file() {
            debug!("Using project config file {}", project.display());
            return Self::from_file(&project);
        }

        if let Some(user) = user_file.filter(|path| path.is_file()) {
            debug!("Using user config file {}", user.display());
            let mut config = Self::read(user)?;
            config.root = cwd.join(&config.root);
            return Ok(config);
        }

        debug!("No config file found, using defaults");
        Ok(Self {
            root: cwd.to_path_buf(),
            ..Self::default()
        })
    }
}

fn map_files(source_root: &Path, output_root: &Path, names: &[String]) -> Vec<FileMapping> {
    names
        .iter()
        .map(|name| FileMapping {
            name: name.clone(),
            source: source_root.join(name),
            output: output_root.join(name),
        })
        .collect()
}
