//! Static-asset build pipeline.
//!
//! Ordered CSS sources are merged into one stylesheet; scripts and pages are
//! processed file by file. Minification is textual: comments and whitespace
//! are removed by regex stages (CSS, HTML) or a line scanner (JavaScript),
//! never by parsing the language.

pub mod backup;
pub mod bundle;
pub mod config;
pub mod css;
pub mod dirs;
pub mod html;
pub mod js;
pub mod orchestrator;
pub mod stats;
pub mod util;
