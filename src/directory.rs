//! Control directory: discovery and naming of period files
//!
//! Period files are named `<prefix>MM-YY.<ext>`, e.g. `controle-03-24.parquet` for a
//! period started in March 2024. Listing sorts filenames in descending lexicographic
//! order. This is newest-first within one century but not across year rollovers
//! (`12-23` sorts above `01-24`).

use crate::config::ControlConfig;
use crate::{Error, Result};
use chrono::Datelike;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Period files under one base directory.
#[derive(Debug, Clone)]
pub struct ControlDirectory {
    config: ControlConfig,
}

impl ControlDirectory {
    /// Create a directory view from a configuration.
    #[must_use]
    pub const fn new(config: ControlConfig) -> Self {
        Self { config }
    }

    /// Underlying configuration.
    #[must_use]
    pub const fn config(&self) -> &ControlConfig {
        &self.config
    }

    /// Create the base directory if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageAccess`] if the directory cannot be created
    pub fn ensure_base_dir(&self) -> Result<()> {
        let base = self.config.base_dir();
        fs::create_dir_all(base)
            .map_err(|e| Error::storage(base, format!("Failed to create base directory: {e}")))
    }

    /// Period filenames, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageAccess`] if the base directory cannot be read
    pub fn list_periods(&self) -> Result<Vec<String>> {
        list_periods(
            self.config.base_dir(),
            self.config.file_prefix(),
            self.config.extension(),
        )
    }

    /// Filename of the period containing `now`.
    ///
    /// Two calls within the same month and year return the same name, so
    /// starting a "new" period twice in a month reopens the same file.
    #[must_use]
    pub fn new_period_name<D: Datelike>(&self, now: &D) -> String {
        format!(
            "{}{:02}-{:02}.{}",
            self.config.file_prefix(),
            now.month(),
            now.year().rem_euclid(100),
            self.config.extension()
        )
    }

    /// Display name of a period file: the filename without prefix and extension.
    #[must_use]
    pub fn display_name<'a>(&self, filename: &'a str) -> &'a str {
        let stem = filename
            .strip_suffix(self.config.extension())
            .and_then(|s| s.strip_suffix('.'))
            .unwrap_or(filename);
        stem.strip_prefix(self.config.file_prefix()).unwrap_or(stem)
    }

    /// Full path of a period file.
    #[must_use]
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.config.base_dir().join(filename)
    }

    /// Whether `filename` follows the period naming convention.
    #[must_use]
    pub fn is_period_file(&self, filename: &str) -> bool {
        is_period_file(filename, self.config.file_prefix(), self.config.extension())
    }
}

/// List period filenames under `base_dir`, sorted descending.
///
/// A missing base directory lists as empty. Sub-directories and files not
/// following the naming convention are ignored.
///
/// # Errors
///
/// Returns [`Error::StorageAccess`] if `base_dir` exists but cannot be read
pub fn list_periods(base_dir: &Path, prefix: &str, extension: &str) -> Result<Vec<String>> {
    if !base_dir.exists() {
        debug!(base_dir = %base_dir.display(), "base directory missing, no periods");
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(base_dir)
        .map_err(|e| Error::storage(base_dir, format!("Failed to list directory: {e}")))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| Error::storage(base_dir, format!("Failed to list directory: {e}")))?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if is_file && is_period_file(&name, prefix, extension) {
            names.push(name);
        }
    }

    names.sort_unstable_by(|a, b| b.cmp(a));
    debug!(base_dir = %base_dir.display(), periods = names.len(), "listed periods");
    Ok(names)
}

/// `<prefix>MM-YY.<ext>` with two ASCII digits on each side of the dash.
fn is_period_file(filename: &str, prefix: &str, extension: &str) -> bool {
    let Some(middle) = filename
        .strip_prefix(prefix)
        .and_then(|s| s.strip_suffix(extension))
        .and_then(|s| s.strip_suffix('.'))
    else {
        return false;
    };
    let bytes = middle.as_bytes();
    bytes.len() == 5
        && bytes[2] == b'-'
        && bytes[..2].iter().chain(&bytes[3..]).all(u8::is_ascii_digit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn directory(base: &Path) -> ControlDirectory {
        ControlDirectory::new(ControlConfig::builder(base).build().unwrap())
    }

    #[test]
    fn test_new_period_name_from_date() {
        let dir = directory(Path::new("/data"));
        let march = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(dir.new_period_name(&march), "controle-03-24.parquet");
    }

    #[test]
    fn test_new_period_name_stable_within_month() {
        let dir = directory(Path::new("/data"));
        let first = NaiveDate::from_ymd_opt(2024, 11, 1).unwrap();
        let last = NaiveDate::from_ymd_opt(2024, 11, 30).unwrap();
        assert_eq!(dir.new_period_name(&first), dir.new_period_name(&last));
        assert_ne!(
            dir.new_period_name(&first),
            dir.new_period_name(&NaiveDate::from_ymd_opt(2025, 11, 1).unwrap())
        );
    }

    #[test]
    fn test_display_name_strips_prefix_and_extension() {
        let dir = directory(Path::new("/data"));
        assert_eq!(dir.display_name("controle-03-24.parquet"), "03-24");
        assert_eq!(dir.display_name("other.txt"), "other.txt");
    }

    #[test]
    fn test_is_period_file() {
        let dir = directory(Path::new("/data"));
        assert!(dir.is_period_file("controle-03-24.parquet"));
        assert!(!dir.is_period_file("controle-3-24.parquet"));
        assert!(!dir.is_period_file("controle-03-24.xlsx"));
        assert!(!dir.is_period_file("controle-ab-24.parquet"));
        assert!(!dir.is_period_file("notes-03-24.parquet"));
    }

    #[test]
    fn test_list_periods_sorted_descending() {
        let tmp = tempfile::tempdir().unwrap();
        for name in [
            "controle-01-24.parquet",
            "controle-03-24.parquet",
            "controle-12-23.parquet",
            "readme.txt",
        ] {
            fs::write(tmp.path().join(name), b"").unwrap();
        }
        fs::create_dir(tmp.path().join("controle-05-24.parquet")).unwrap();

        let periods = directory(tmp.path()).list_periods().unwrap();
        assert_eq!(
            periods,
            vec![
                "controle-12-23.parquet",
                "controle-03-24.parquet",
                "controle-01-24.parquet",
            ]
        );
    }

    #[test]
    fn test_list_periods_missing_dir_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let periods = directory(&tmp.path().join("absent")).list_periods().unwrap();
        assert!(periods.is_empty());
    }
}
