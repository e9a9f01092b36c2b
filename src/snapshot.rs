//! Build-time snapshot of the article collection.
//!
//! The deployed site is pre-rendered with no backend, so the presentation
//! layer reads articles from a JSON file written here instead of scanning
//! content at render time:
//!
//! ```json
//! {
//!   "articles": [ { "id": 1, "title": "…", "rawDate": "2025-07-10", … } ],
//!   "latestByCategory": [ … ]
//! }
//! ```
//!
//! List entries never carry `content`. When a pages directory is configured,
//! each article additionally gets `<pages_dir>/<slug>.json` with its body and
//! the body rendered to HTML.
//!
//! ## Write skipping
//!
//! Output is deterministic for an unchanged content tree. Each file's SHA-256
//! is compared with what is already on disk and identical files are left
//! alone, so timestamps only move when content does.
//!
//! ## Stale pages
//!
//! The pages directory holds a `.pages.json` manifest listing the pages the
//! last build wrote. A later build deletes listed pages it no longer
//! produces and nothing else: the snapshot and files from other tools in the
//! same directory survive.

use crate::markdown;
use crate::store::ArticleStore;
use crate::types::Article;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The list-level projection consumed by static pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub articles: Vec<Article>,
    pub latest_by_category: Vec<Article>,
}

impl Snapshot {
    pub fn from_store(store: &ArticleStore) -> Self {
        Self {
            articles: store.articles().iter().map(Article::summary).collect(),
            latest_by_category: store
                .latest_by_category()
                .into_iter()
                .map(Article::summary)
                .collect(),
        }
    }

    /// Pretty-printed JSON with a trailing newline.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        to_json(self)
    }
}

/// A single article with its body and rendered HTML.
#[derive(Debug, Serialize)]
pub struct ArticlePage<'a> {
    #[serde(flatten)]
    pub article: &'a Article,
    pub html: String,
}

impl<'a> ArticlePage<'a> {
    pub fn new(article: &'a Article) -> Self {
        let html = markdown::render(article.content.as_deref().unwrap_or_default());
        Self { article, html }
    }
}

/// Records which pages a build wrote, so the next build removes only those.
const PAGES_MANIFEST: &str = ".pages.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct PagesManifest {
    pages: Vec<String>,
}

/// Where a build writes its outputs.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub snapshot: PathBuf,
    pub pages_dir: Option<PathBuf>,
}

/// Result of writing one output file.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOutcome {
    pub path: PathBuf,
    /// Hex SHA-256 of the file contents
    pub digest: String,
    /// False when an identical file was already present
    pub written: bool,
}

/// Summary of a build, for CLI output.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    pub snapshot: WriteOutcome,
    pub article_count: usize,
    pub latest_count: usize,
    pub pages: Vec<WriteOutcome>,
    /// Slugs that could not be used as file names
    pub unsafe_slugs: Vec<String>,
    /// Slugs whose page name matches an earlier page ignoring case
    pub colliding_slugs: Vec<String>,
    /// Stale detail pages removed from the pages directory
    pub removed_pages: Vec<PathBuf>,
}

/// Write the snapshot (and detail pages, if configured) for a store.
pub fn build(store: &ArticleStore, paths: &OutputPaths) -> Result<BuildReport, SnapshotError> {
    let snapshot = Snapshot::from_store(store);
    let outcome = write_if_changed(&paths.snapshot, &snapshot.to_json()?)?;
    if outcome.written {
        log::info!("wrote {}", outcome.path.display());
    } else {
        log::info!("{} unchanged", outcome.path.display());
    }

    let mut report = BuildReport {
        snapshot: outcome,
        article_count: snapshot.articles.len(),
        latest_count: snapshot.latest_by_category.len(),
        pages: Vec::new(),
        unsafe_slugs: Vec::new(),
        colliding_slugs: Vec::new(),
        removed_pages: Vec::new(),
    };

    if let Some(pages_dir) = &paths.pages_dir {
        write_pages(store, pages_dir, &paths.snapshot, &mut report)?;
    }

    Ok(report)
}

fn write_pages(
    store: &ArticleStore,
    pages_dir: &Path,
    snapshot: &Path,
    report: &mut BuildReport,
) -> Result<(), SnapshotError> {
    let previous = read_manifest(pages_dir);
    let mut written = Vec::new();
    // Case-folded file name -> file name that claimed it.
    let mut claimed: HashMap<String, String> = HashMap::new();

    // Collection order, so a duplicated slug gets the same article as by_slug.
    for article in store.articles() {
        let file_name = format!("{}.json", article.slug);
        let path = pages_dir.join(&file_name);
        if !is_safe_file_stem(&article.slug) || path == snapshot {
            log::warn!(
                "slug '{}' ({}) cannot be used as a file name, skipping detail page",
                article.slug,
                article.source
            );
            report.unsafe_slugs.push(article.slug.clone());
            continue;
        }
        match claimed.get(&file_name.to_lowercase()) {
            Some(taken) if *taken == file_name => continue,
            Some(taken) => {
                log::warn!(
                    "slug '{}' ({}) collides with '{}' on case-insensitive file systems, skipping detail page",
                    article.slug,
                    article.source,
                    taken.trim_end_matches(".json")
                );
                report.colliding_slugs.push(article.slug.clone());
                continue;
            }
            None => {
                claimed.insert(file_name.to_lowercase(), file_name.clone());
            }
        }
        let json = to_json(&ArticlePage::new(article))?;
        report.pages.push(write_if_changed(&path, &json)?);
        written.push(file_name);
    }

    report.removed_pages = remove_stale_pages(pages_dir, &previous, &claimed, snapshot)?;

    written.sort();
    write_if_changed(
        &pages_dir.join(PAGES_MANIFEST),
        &to_json(&PagesManifest { pages: written })?,
    )?;
    Ok(())
}

/// Pages written by the previous build, or none if there is no readable
/// manifest.
fn read_manifest(pages_dir: &Path) -> Vec<String> {
    let path = pages_dir.join(PAGES_MANIFEST);
    let Ok(text) = fs::read_to_string(&path) else {
        return Vec::new();
    };
    match serde_json::from_str::<PagesManifest>(&text) {
        Ok(manifest) => manifest.pages,
        Err(e) => {
            log::warn!("ignoring unreadable page manifest {}: {e}", path.display());
            Vec::new()
        }
    }
}

/// Delete pages the previous build wrote that this build did not.
///
/// Only names from the manifest are candidates, so files this tool never
/// wrote are left alone. Comparison is case-folded: on a case-insensitive
/// file system `Foo.json` and `foo.json` are the same file, and deleting the
/// old name would delete the new page. On a case-sensitive one the old name
/// is left behind instead.
fn remove_stale_pages(
    pages_dir: &Path,
    previous: &[String],
    current: &HashMap<String, String>,
    snapshot: &Path,
) -> Result<Vec<PathBuf>, SnapshotError> {
    let mut removed = Vec::new();
    for name in previous {
        if current.contains_key(&name.to_lowercase()) {
            continue;
        }
        let is_page = name
            .strip_suffix(".json")
            .is_some_and(is_safe_file_stem);
        let path = pages_dir.join(name);
        if !is_page || path == snapshot || !path.is_file() {
            continue;
        }
        fs::remove_file(&path).map_err(|source| SnapshotError::Io {
            path: path.clone(),
            source,
        })?;
        log::info!("removed stale page {}", path.display());
        removed.push(path);
    }
    Ok(removed)
}

/// A slug can name a file if it stays inside the pages directory.
fn is_safe_file_stem(slug: &str) -> bool {
    !slug.is_empty() && !slug.starts_with('.') && !slug.contains(['/', '\\', '\0'])
}

fn to_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}

/// Hex SHA-256 of a string.
pub fn digest(contents: &str) -> String {
    Sha256::digest(contents.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Write `contents` to `path` unless the file already holds exactly that.
///
/// Parent directories are created as needed.
pub fn write_if_changed(path: &Path, contents: &str) -> Result<WriteOutcome, SnapshotError> {
    let io_err = |source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    };
    let new_digest = digest(contents);

    let unchanged = fs::read_to_string(path)
        .map(|existing| digest(&existing) == new_digest)
        .unwrap_or(false);

    if !unchanged {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(path, contents).map_err(io_err)?;
    }

    Ok(WriteOutcome {
        path: path.to_path_buf(),
        digest: new_digest,
        written: !unchanged,
    })
}
