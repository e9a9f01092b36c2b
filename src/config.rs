//! Project configuration.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! serialized to a TOML table, the user's file is merged on top, and the
//! result is deserialized and validated. A project without `config.toml`
//! runs on stock defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! content_dir = "content"        # Content root, relative to the project root
//!
//! [directories]                  # Category directory names under content_dir
//! case_studies = "case-studies"  # 導入事例
//! technical = "technical"        # 技術解説
//! news = "news"                  # お知らせ
//!
//! [output]
//! snapshot = "data/articles.json"  # Snapshot read by the presentation layer
//! # pages_dir = "data/articles"    # Per-article JSON with rendered HTML
//!
//! [listing]
//! latest_limit = 3               # Articles shown by `list` without --limit
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use crate::types::Category;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediaConfig {
    /// Content root, relative to the project root.
    pub content_dir: String,
    /// Category directory names under the content root.
    pub directories: DirectoryConfig,
    /// Where build outputs are written.
    pub output: OutputConfig,
    /// Listing defaults for the CLI.
    pub listing: ListingConfig,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            content_dir: "content".to_string(),
            directories: DirectoryConfig::default(),
            output: OutputConfig::default(),
            listing: ListingConfig::default(),
        }
    }
}

impl MediaConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "content_dir must not be empty".into(),
            ));
        }
        self.directories.validate()?;
        if self.output.snapshot.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output.snapshot must not be empty".into(),
            ));
        }
        if let Some(pages_dir) = self.output.pages_dir.as_deref() {
            self.output.validate_pages_dir(pages_dir)?;
        }
        if self.listing.latest_limit == 0 {
            return Err(ConfigError::Validation(
                "listing.latest_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Content root resolved against the project root.
    pub fn content_root(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.content_dir)
    }

    /// Snapshot path resolved against the project root.
    pub fn snapshot_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.output.snapshot)
    }

    /// Detail page directory resolved against the project root, if enabled.
    pub fn pages_dir(&self, project_root: &Path) -> Option<PathBuf> {
        self.output.pages_dir.as_ref().map(|d| project_root.join(d))
    }
}

/// Category directory names, one per category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectoryConfig {
    /// Directory holding 導入事例 articles.
    pub case_studies: String,
    /// Directory holding 技術解説 articles.
    pub technical: String,
    /// Directory holding お知らせ articles.
    pub news: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            case_studies: Category::CaseStudies.default_dir().to_string(),
            technical: Category::Technical.default_dir().to_string(),
            news: Category::News.default_dir().to_string(),
        }
    }
}

impl DirectoryConfig {
    pub fn dir_for(&self, category: Category) -> &str {
        match category {
            Category::CaseStudies => &self.case_studies,
            Category::Technical => &self.technical,
            Category::News => &self.news,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen: Vec<&str> = Vec::new();
        for category in Category::ALL {
            let dir = self.dir_for(category);
            if dir.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "directory for {category} must not be empty"
                )));
            }
            if dir.contains(['/', '\\']) || dir == "." || dir == ".." {
                return Err(ConfigError::Validation(format!(
                    "directory for {category} must be a single directory name, got '{dir}'"
                )));
            }
            if seen.contains(&dir) {
                return Err(ConfigError::Validation(format!(
                    "directory '{dir}' is assigned to more than one category"
                )));
            }
            seen.push(dir);
        }
        Ok(())
    }
}

/// Build output locations, relative to the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Snapshot JSON file.
    pub snapshot: String,
    /// Directory for per-article JSON with rendered HTML. Disabled when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages_dir: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            snapshot: "data/articles.json".to_string(),
            pages_dir: None,
        }
    }
}

impl OutputConfig {
    /// Stale detail pages are deleted from `pages_dir`, so it must be a
    /// dedicated directory: inside the project root, not the root itself,
    /// and not the snapshot's directory or one of its ancestors.
    fn validate_pages_dir(&self, pages_dir: &str) -> Result<(), ConfigError> {
        if pages_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output.pages_dir must not be empty when set".into(),
            ));
        }
        let pages = project_relative(pages_dir).ok_or_else(|| {
            ConfigError::Validation(format!(
                "output.pages_dir must be a relative path inside the project root, got '{pages_dir}'"
            ))
        })?;
        if pages.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "output.pages_dir must not be the project root".into(),
            ));
        }
        let snapshot_dir = project_relative(&self.snapshot)
            .and_then(|p| p.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        if snapshot_dir.starts_with(&pages) {
            return Err(ConfigError::Validation(format!(
                "output.pages_dir '{pages_dir}' must not contain the snapshot '{}'",
                self.snapshot
            )));
        }
        Ok(())
    }
}

/// Lexically normalize a path relative to the project root.
///
/// Returns `None` for absolute paths and paths that climb out with `..`.
fn project_relative(path: &str) -> Option<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in Path::new(path.trim()).components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(normalized)
}

/// CLI listing defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListingConfig {
    /// Number of articles `list` shows when no limit or category is given.
    pub latest_limit: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self { latest_limit: 3 }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(MediaConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<MediaConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: MediaConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the project root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(project_root: &Path) -> Result<MediaConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(project_root)?;
    let config = resolve_config(base, overlay)?;
    log::debug!("loaded config: {config:?}");
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Media Articles Configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# Content root, relative to this file.
content_dir = "content"

# ---------------------------------------------------------------------------
# Category directories (under content_dir)
# ---------------------------------------------------------------------------
[directories]
case_studies = "case-studies"   # 導入事例
technical = "technical"         # 技術解説
news = "news"                   # お知らせ

# ---------------------------------------------------------------------------
# Build outputs (relative to this file)
# ---------------------------------------------------------------------------
[output]
# Snapshot read by the presentation layer:
# { "articles": [...], "latestByCategory": [...] }
snapshot = "data/articles.json"

# One JSON file per article, with the markdown body rendered to HTML.
# Must be a dedicated directory: pages left over from earlier builds are
# removed. It may not be the project root or hold the snapshot.
# Omit to disable.
# pages_dir = "data/articles"

# ---------------------------------------------------------------------------
# Listing
# ---------------------------------------------------------------------------
[listing]
# Number of articles `list` shows when no --limit or --category is given.
latest_limit = 3
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = MediaConfig::default();
        assert_eq!(config.content_dir, "content");
        assert_eq!(config.directories.technical, "technical");
        assert_eq!(config.output.snapshot, "data/articles.json");
        assert_eq!(config.output.pages_dir, None);
        assert_eq!(config.listing.latest_limit, 3);
    }

    #[test]
    fn validate_default_config_passes() {
        assert!(MediaConfig::default().validate().is_ok());
    }

    #[test]
    fn stock_toml_matches_defaults() {
        let parsed: MediaConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(parsed, MediaConfig::default());
    }

    #[test]
    fn parse_partial_config() {
        let parsed: MediaConfig = toml::from_str("[listing]\nlatest_limit = 6\n").unwrap();
        assert_eq!(parsed.listing.latest_limit, 6);
        assert_eq!(parsed.content_dir, "content");
    }

    #[test]
    fn dir_for_maps_each_category() {
        let dirs = DirectoryConfig::default();
        assert_eq!(dirs.dir_for(Category::CaseStudies), "case-studies");
        assert_eq!(dirs.dir_for(Category::Technical), "technical");
        assert_eq!(dirs.dir_for(Category::News), "news");
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config, MediaConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
content_dir = "src/app/media/content"

[output]
pages_dir = "public/articles"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.content_dir, "src/app/media/content");
        assert_eq!(config.output.pages_dir.as_deref(), Some("public/articles"));
        // untouched keys keep their defaults
        assert_eq!(config.output.snapshot, "data/articles.json");
        assert_eq!(
            config.content_root(tmp.path()),
            tmp.path().join("src/app/media/content")
        );
        assert_eq!(
            config.pages_dir(tmp.path()),
            Some(tmp.path().join("public/articles"))
        );
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "content_dir = [unclosed").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<MediaConfig, _> = toml::from_str("content_root = \"x\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_nested_key_rejected() {
        let result: Result<MediaConfig, _> = toml::from_str("[output]\nsnapshots = \"x\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_key_rejected_via_load_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "[directories]\nblog = \"blog\"\n").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn validate_latest_limit_zero() {
        let mut config = MediaConfig::default();
        config.listing.latest_limit = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_empty_snapshot() {
        let mut config = MediaConfig::default();
        config.output.snapshot = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_empty_pages_dir() {
        let mut config = MediaConfig::default();
        config.output.pages_dir = Some(String::new());
        assert!(config.validate().is_err());
    }

    fn with_pages_dir(snapshot: &str, pages_dir: &str) -> MediaConfig {
        let mut config = MediaConfig::default();
        config.output.snapshot = snapshot.to_string();
        config.output.pages_dir = Some(pages_dir.to_string());
        config
    }

    #[test]
    fn validate_pages_dir_beside_snapshot_passes() {
        assert!(with_pages_dir("data/articles.json", "data/articles").validate().is_ok());
        assert!(with_pages_dir("data/articles.json", "./pages").validate().is_ok());
        assert!(with_pages_dir("articles.json", "pages").validate().is_ok());
    }

    #[test]
    fn validate_pages_dir_project_root_rejected() {
        for root in [".", "./", "./."] {
            let err = with_pages_dir("data/articles.json", root).validate().unwrap_err();
            assert!(err.to_string().contains("project root"), "{root}: {err}");
        }
    }

    #[test]
    fn validate_pages_dir_holding_snapshot_rejected() {
        let err = with_pages_dir("data/articles.json", "data")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("must not contain the snapshot"));
        assert!(with_pages_dir("site/data/articles.json", "site").validate().is_err());
        assert!(with_pages_dir("data/articles.json", "./data/").validate().is_err());
    }

    #[test]
    fn validate_pages_dir_outside_project_rejected() {
        assert!(with_pages_dir("data/articles.json", "../pages").validate().is_err());
        assert!(with_pages_dir("data/articles.json", "/tmp/pages").validate().is_err());
        assert!(with_pages_dir("data/articles.json", "data/../..").validate().is_err());
    }

    #[test]
    fn validate_pages_dir_sharing_prefix_with_snapshot_dir_passes() {
        assert!(with_pages_dir("data/articles.json", "dat").validate().is_ok());
    }

    #[test]
    fn validate_duplicate_directories() {
        let mut config = MediaConfig::default();
        config.directories.news = "technical".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("more than one category"));
    }

    #[test]
    fn validate_nested_directory_rejected() {
        let mut config = MediaConfig::default();
        config.directories.news = "media/news".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_empty_directory_rejected() {
        let mut config = MediaConfig::default();
        config.directories.case_studies = String::new();
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("b = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(1));
        assert_eq!(merged["b"].as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value =
            toml::from_str("[directories]\nnews = \"news\"\ntechnical = \"technical\"").unwrap();
        let overlay: toml::Value = toml::from_str("[directories]\nnews = \"oshirase\"").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["directories"]["news"].as_str(), Some("oshirase"));
        assert_eq!(merged["directories"]["technical"].as_str(), Some("technical"));
    }

    #[test]
    fn resolve_config_applies_overlay() {
        let base = stock_defaults_value().unwrap();
        let overlay: toml::Value = toml::from_str("[directories]\nnews = \"oshirase\"").unwrap();
        let config = resolve_config(base, Some(overlay)).unwrap();
        assert_eq!(config.directories.news, "oshirase");
        assert_eq!(config.directories.case_studies, "case-studies");
    }

    #[test]
    fn resolve_config_validates_after_merge() {
        let base = stock_defaults_value().unwrap();
        let overlay: toml::Value = toml::from_str("[listing]\nlatest_limit = 0").unwrap();
        assert!(matches!(
            resolve_config(base, Some(overlay)),
            Err(ConfigError::Validation(_))
        ));
    }
}
