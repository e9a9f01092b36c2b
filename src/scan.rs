//! Content discovery.
//!
//! Walks the category directories of the content root and turns every
//! markdown file into an [`ArticleDraft`], or records why it was skipped.
//!
//! ## Directory Structure
//!
//! ```text
//! content/                         # Content root
//! ├── case-studies/                # 導入事例
//! │   └── manufacturing-ai.md
//! ├── technical/                   # 技術解説
//! │   ├── rag-search.md
//! │   └── llm-security.md
//! └── news/                        # お知らせ
//!     └── first-anniversary.md
//! ```
//!
//! Directory names are configurable (see [`crate::config::DirectoryConfig`]).
//! Only `.md` files directly inside a category directory are read; hidden
//! files and subdirectories are ignored.
//!
//! ## Failure handling
//!
//! Nothing below the content root aborts a scan. A missing category
//! directory is a warning, an unreadable one (or a file in its place) is an
//! error, and a file that cannot be read, parsed or validated is logged and
//! skipped. Every skip is also recorded in the [`ScanReport`] so callers can
//! inspect it without scraping logs.
//!
//! ## Enumeration order
//!
//! Categories are visited in display order and files are sorted by name, so
//! two scans of the same tree yield drafts in the same order.

use crate::config::DirectoryConfig;
use crate::frontmatter::{self, FrontmatterError};
use crate::types::{Article, Category, display_date};
use crate::validate::{self, FieldError};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// The only failures that stop a scan: the content root itself is unusable.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("content directory not found: {0}")]
    MissingRoot(PathBuf),
    #[error("content path is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Why a single content file was skipped.
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),
    #[error("invalid frontmatter ({} problem(s))", .0.len())]
    Invalid(Vec<FieldError>),
}

/// An accepted article before aggregation assigns its id.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleDraft {
    pub title: String,
    pub category: Category,
    pub raw_date: Option<NaiveDate>,
    pub excerpt: String,
    pub slug: String,
    pub author: Option<String>,
    pub tags: Option<Vec<String>>,
    pub featured: bool,
    /// Markdown body
    pub body: String,
    /// Source file relative to the content root
    pub source: String,
}

impl ArticleDraft {
    pub fn into_article(self, id: u32) -> Article {
        Article {
            id,
            title: self.title,
            category: self.category,
            date: display_date(self.raw_date),
            raw_date: self.raw_date,
            excerpt: self.excerpt,
            slug: self.slug,
            author: self.author,
            tags: self.tags,
            featured: self.featured,
            content: Some(self.body),
            source: self.source,
        }
    }
}

#[derive(Debug)]
pub struct SkippedFile {
    /// Path relative to the content root
    pub path: String,
    pub error: ContentError,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryIssue {
    Missing,
    Unreadable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedDirectory {
    pub category: Category,
    /// Directory name relative to the content root
    pub path: String,
    pub issue: DirectoryIssue,
}

/// Everything a scan found: accepted drafts in enumeration order, plus
/// the files and directories it had to skip.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub drafts: Vec<ArticleDraft>,
    pub skipped_files: Vec<SkippedFile>,
    pub skipped_dirs: Vec<SkippedDirectory>,
}

impl ScanReport {
    pub fn is_clean(&self) -> bool {
        self.skipped_files.is_empty() && self.skipped_dirs.is_empty()
    }
}

const ARTICLE_EXTENSION: &str = "md";

/// Scan every category directory under `root`.
pub fn scan(root: &Path, dirs: &DirectoryConfig) -> Result<ScanReport, ScanError> {
    if !root.exists() {
        return Err(ScanError::MissingRoot(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let mut report = ScanReport::default();
    for category in Category::ALL {
        scan_category(root, dirs.dir_for(category), category, &mut report);
    }

    log::debug!(
        "scanned {}: {} accepted, {} skipped",
        root.display(),
        report.drafts.len(),
        report.skipped_files.len()
    );
    Ok(report)
}

fn scan_category(root: &Path, dir_name: &str, category: Category, report: &mut ScanReport) {
    let dir = root.join(dir_name);
    if !dir.exists() {
        log::warn!("category directory not found: {}", dir.display());
        report.skipped_dirs.push(SkippedDirectory {
            category,
            path: dir_name.to_string(),
            issue: DirectoryIssue::Missing,
        });
        return;
    }

    let listing = if dir.is_dir() {
        collect_article_files(&dir).map_err(|e| e.to_string())
    } else {
        Err("not a directory".to_string())
    };
    let files = match listing {
        Ok(files) => files,
        Err(reason) => {
            log::error!("error reading directory {}: {reason}", dir.display());
            report.skipped_dirs.push(SkippedDirectory {
                category,
                path: dir_name.to_string(),
                issue: DirectoryIssue::Unreadable(reason),
            });
            return;
        }
    };

    for path in files {
        let rel = relative_path(root, &path);
        match read_article(&path, &rel, category) {
            Ok(draft) => {
                log::debug!("accepted {rel} as '{}'", draft.slug);
                report.drafts.push(draft);
            }
            Err(error) => {
                log_skip(&rel, &error);
                report.skipped_files.push(SkippedFile { path: rel, error });
            }
        }
    }
}

/// List candidate article files in a category directory, sorted by name.
///
/// Fails only when the directory itself cannot be read; unreadable entries
/// inside it are logged and dropped.
fn collect_article_files(dir: &Path) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e),
            Err(e) => {
                log::error!("error reading entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        if entry.depth() == 0 || !entry.file_type().is_file() {
            continue;
        }
        if is_article_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_article_file(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(true);
    !hidden
        && path
            .extension()
            .map(|e| e.eq_ignore_ascii_case(ARTICLE_EXTENSION))
            .unwrap_or(false)
}

/// Read, split and validate one article file.
pub fn read_article(path: &Path, rel: &str, category: Category) -> Result<ArticleDraft, ContentError> {
    let text = fs::read_to_string(path)?;
    let document = frontmatter::split(&text)?;
    let fm = validate::validate(&document.data, category).map_err(ContentError::Invalid)?;

    let slug = fm.slug.unwrap_or_else(|| file_slug(path));

    Ok(ArticleDraft {
        title: fm.title,
        category: fm.category,
        raw_date: Some(fm.date),
        excerpt: fm.excerpt,
        slug,
        author: fm.author,
        tags: fm.tags,
        featured: fm.featured,
        body: document.body,
        source: rel.to_string(),
    })
}

/// Default slug: the file name with its extension stripped.
fn file_slug(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn log_skip(rel: &str, error: &ContentError) {
    match error {
        ContentError::Invalid(errors) => {
            log::error!("invalid frontmatter in {rel}:");
            for e in errors {
                log::error!("  - {e}");
            }
        }
        other => log::error!("error processing file {rel}: {other}"),
    }
}
