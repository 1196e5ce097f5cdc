//! Size statistics for build reports

use log::info;

use crate::bundle::TransformResult;

/// Before/after sizes of one processed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStats {
    pub name: String,
    pub original_bytes: usize,
    pub processed_bytes: usize,
    pub original_lines: usize,
    pub processed_lines: usize,
}

impl FileStats {
    pub fn savings_percent(&self) -> f64 {
        reduction_percent(self.original_bytes, self.processed_bytes)
    }

    pub fn line_reduction_percent(&self) -> f64 {
        reduction_percent(self.original_lines, self.processed_lines)
    }
}

impl From<&TransformResult> for FileStats {
    fn from(result: &TransformResult) -> Self {
        Self {
            name: result.name.clone(),
            original_bytes: result.original_len,
            processed_bytes: result.transformed_len(),
            original_lines: result.original_lines,
            processed_lines: result.transformed_lines(),
        }
    }
}

/// Running totals over a set of [`FileStats`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Totals {
    pub files: usize,
    pub original_bytes: usize,
    pub processed_bytes: usize,
    pub original_lines: usize,
    pub processed_lines: usize,
}

impl Totals {
    pub fn add(&mut self, stats: &FileStats) {
        self.files += 1;
        self.original_bytes += stats.original_bytes;
        self.processed_bytes += stats.processed_bytes;
        self.original_lines += stats.original_lines;
        self.processed_lines += stats.processed_lines;
    }

    pub fn savings_percent(&self) -> f64 {
        reduction_percent(self.original_bytes, self.processed_bytes)
    }

    pub fn line_reduction_percent(&self) -> f64 {
        reduction_percent(self.original_lines, self.processed_lines)
    }
}

impl<'a> FromIterator<&'a FileStats> for Totals {
    fn from_iter<I: IntoIterator<Item = &'a FileStats>>(iter: I) -> Self {
        let mut totals = Self::default();
        for stats in iter {
            totals.add(stats);
        }
        totals
    }
}

/// Percentage saved going from `before` to `after`, rounded to one decimal.
///
/// Empty input reports `0.0`. Growth yields a negative value.
pub fn reduction_percent(before: usize, after: usize) -> f64 {
    if before == 0 {
        return 0.0;
    }
    let ratio = 1.0 - after as f64 / before as f64;
    (ratio * 1000.0).round() / 10.0
}

/// Format a byte count in kilobytes with one decimal place
pub fn format_kb(bytes: usize) -> String {
    format!("{:.1} KB", bytes as f64 / 1024.0)
}

/// Log one file's byte statistics.
pub fn log_file(stats: &FileStats) {
    info!(
        "  {}: {} -> {} ({:.1}% saved)",
        stats.name,
        format_kb(stats.original_bytes),
        format_kb(stats.processed_bytes),
        stats.savings_percent()
    );
}

/// Log one file's byte and line statistics.
pub fn log_file_with_lines(stats: &FileStats) {
    info!(
        "  {}: {} -> {} bytes ({:.1}% saved), {} -> {} lines ({:.1}% fewer)",
        stats.name,
        stats.original_bytes,
        stats.processed_bytes,
        stats.savings_percent(),
        stats.original_lines,
        stats.processed_lines,
        stats.line_reduction_percent()
    );
}

/// Log the totals for one pipeline.
pub fn log_totals(label: &str, totals: &Totals) {
    info!(
        "{label}: {} file(s), {} -> {} ({:.1}% saved)",
        totals.files,
        format_kb(totals.original_bytes),
        format_kb(totals.processed_bytes),
        totals.savings_percent()
    );
}
