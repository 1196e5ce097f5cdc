//! Timestamped backups of outputs about to be overwritten

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use cow_utils::CowUtils;
use log::info;

/// Timestamp layout appended to backup names
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Name of the backup for `name` taken at `now`.
///
/// Path separators are flattened so nested outputs (`modules/api.js`) land
/// directly in the backup directory.
pub fn backup_file_name(name: &str, now: &DateTime<Local>) -> String {
    let flat = name.cow_replace('/', "_");
    let flat = flat.cow_replace('\\', "_");
    format!("{flat}.backup.{}", now.format(TIMESTAMP_FORMAT))
}

/// Copy `target` into `backup_dir` if it exists.
///
/// `name` is the output's name relative to its output root. Returns the backup
/// path, or `None` when there was nothing to back up.
pub fn backup_existing(
    target: &Path,
    name: &str,
    backup_dir: &Path,
    now: &DateTime<Local>,
) -> Result<Option<PathBuf>> {
    if !target.is_file() {
        return Ok(None);
    }

    fs::create_dir_all(backup_dir).with_context(|| {
        format!(
            "Failed to create backup directory {}",
            backup_dir.display()
        )
    })?;

    let backup = backup_dir.join(backup_file_name(name, now));
    fs::copy(target, &backup).with_context(|| {
        format!(
            "Failed to back up {} to {}",
            target.display(),
            backup.display()
        )
    })?;
    info!("Backed up {} to {}", target.display(), backup.display());

    Ok(Some(backup))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn fixed_time() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2025, 3, 7, 14, 5, 9)
            .single()
            .unwrap()
    }

    #[test]
    fn test_backup_file_name() {
        let now = fixed_time();
        assert_eq!(
            backup_file_name("styles.css", &now),
            "styles.css.backup.20250307-140509"
        );
        assert_eq!(
            backup_file_name("modules/api.js", &now),
            "modules_api.js.backup.20250307-140509"
        );
        assert_eq!(
            backup_file_name(r"modules\ui.js", &now),
            "modules_ui.js.backup.20250307-140509"
        );
    }

    #[test]
    fn test_missing_target_is_not_backed_up() {
        let dir = TempDir::new().unwrap();
        let backups = dir.path().join("backups");
        let result =
            backup_existing(&dir.path().join("styles.css"), "styles.css", &backups, &fixed_time())
                .unwrap();
        assert_eq!(result, None);
        assert!(!backups.exists());
    }

    #[test]
    fn test_existing_target_is_copied() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("styles.css");
        fs::write(&target, "old{}").unwrap();
        let backups = dir.path().join("src").join("backups");

        let backup = backup_existing(&target, "styles.css", &backups, &fixed_time())
            .unwrap()
            .unwrap();

        assert_eq!(backup, backups.join("styles.css.backup.20250307-140509"));
        assert_eq!(fs::read_to_string(&backup).unwrap(), "old{}");
        assert_eq!(fs::read_to_string(&target).unwrap(), "old{}");
    }
}
