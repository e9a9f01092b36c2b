//! Shared test utilities for the media-articles test suite.
//!
//! Provides fixture setup, small content-tree builders, and extractors that
//! work with scan-phase and store data structures (`ScanReport`,
//! `ArticleStore`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let report = scan(tmp.path(), &DirectoryConfig::default()).unwrap();
//! assert!(draft_slugs(&report).contains(&"rag-search"));
//!
//! write_article(tmp.path(), "news", "extra.md", &valid_frontmatter("Extra", "2025-08-01"));
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::scan::ScanReport;
use crate::store::ArticleStore;
use crate::types::Article;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write `text` to `root/dir/file`, creating the directory as needed.
pub fn write_article(root: &Path, dir: &str, file: &str, text: &str) -> PathBuf {
    let dir = root.join(dir);
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(file);
    std::fs::write(&path, text).unwrap();
    path
}

/// A minimal valid frontmatter block with no category (directory decides).
pub fn valid_frontmatter(title: &str, date: &str) -> String {
    format!("---\ntitle: {title}\ndate: {date}\nexcerpt: {title} excerpt\n---\n")
}

// =========================================================================
// Extractors
// =========================================================================

/// Slugs of accepted drafts, in enumeration order.
pub fn draft_slugs(report: &ScanReport) -> Vec<&str> {
    report.drafts.iter().map(|d| d.slug.as_str()).collect()
}

/// Slugs of stored articles, in collection order.
pub fn article_slugs(store: &ArticleStore) -> Vec<&str> {
    store.articles().iter().map(|a| a.slug.as_str()).collect()
}

// =========================================================================
// Lookup helpers
// =========================================================================

/// Find an article by slug. Panics with the available slugs if missing.
pub fn find_article<'a>(store: &'a ArticleStore, slug: &str) -> &'a Article {
    store.by_slug(slug).unwrap_or_else(|| {
        panic!(
            "article '{}' not found. Available: {:?}",
            slug,
            article_slugs(store)
        )
    })
}
