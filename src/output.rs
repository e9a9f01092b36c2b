//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output leads with what an article *is* (positional index and title) and
//! shows where it came from as indented `Source:` context, so a report reads
//! as a content inventory while still pointing back at files.
//!
//! ## Check
//!
//! ```text
//! Articles
//! 001 導入事例 (2 articles)
//!     Source: case-studies/
//!     001 製造業AI導入で業務効率90%改善を実現
//!         Source: case-studies/manufacturing-ai.md
//!         Date: 2025年7月10日
//!
//! Skipped
//!     news/draft.md
//!         excerpt is required and must be a non-empty string
//! ```
//!
//! ## Build
//!
//! ```text
//! Snapshot → data/articles.json (written)
//!     6 articles, 3 latest by category
//!     sha256 3f1a…
//! Pages → data/articles/ (6 pages, 1 written)
//! ```
//!
//! Each report has a `format_*` function returning lines, for testability,
//! and a `print_*` wrapper that writes them to stdout.

use crate::scan::{ContentError, DirectoryIssue, ScanReport};
use crate::snapshot::BuildReport;
use crate::store::ArticleStore;
use crate::types::{Article, Category};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn entity_header(index: usize, title: &str, count: Option<usize>) -> String {
    match count {
        Some(1) => format!("{} {} (1 article)", format_index(index), title),
        Some(n) => format!("{} {} ({} articles)", format_index(index), title, n),
        None => format!("{} {}", format_index(index), title),
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    }
}

fn article_lines(index: usize, article: &Article, depth: usize) -> Vec<String> {
    let pad = indent(depth);
    let marker = if article.featured { " *" } else { "" };
    let mut lines = vec![format!(
        "{pad}{}{marker}",
        entity_header(index, &article.title, None)
    )];
    lines.push(format!("{pad}    Source: {}", article.source));
    lines.push(format!("{pad}    Date: {}", article.date));
    if article.slug != file_stem(&article.source) {
        lines.push(format!("{pad}    Slug: {}", article.slug));
    }
    lines
}

fn file_stem(source: &str) -> String {
    Path::new(source)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

// ============================================================================
// Check
// ============================================================================

/// Format a content check: accepted articles per category, then everything
/// that was skipped, then duplicate slugs.
pub fn format_check_output(report: &ScanReport, store: &ArticleStore) -> Vec<String> {
    let mut lines = vec!["Articles".to_string()];

    for (i, category) in Category::ALL.into_iter().enumerate() {
        let articles = store.by_category(category);
        lines.push(entity_header(i + 1, category.label(), Some(articles.len())));
        if let Some(dir) = report.skipped_dirs.iter().find(|d| d.category == category) {
            let note = match &dir.issue {
                DirectoryIssue::Missing => "missing".to_string(),
                DirectoryIssue::Unreadable(e) => format!("unreadable: {e}"),
            };
            lines.push(format!("    Source: {}/ ({note})", dir.path));
        } else if let Some(first) = articles.first() {
            let dir = first.source.split('/').next().unwrap_or_default();
            lines.push(format!("    Source: {dir}/"));
        }
        for (j, article) in articles.iter().enumerate() {
            lines.extend(article_lines(j + 1, article, 1));
        }
    }

    if !report.skipped_files.is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        for skipped in &report.skipped_files {
            lines.push(format!("    {}", skipped.path));
            match &skipped.error {
                ContentError::Invalid(errors) => {
                    for e in errors {
                        lines.push(format!("        {e}"));
                    }
                }
                other => lines.push(format!("        {other}")),
            }
        }
    }

    let duplicates = store.duplicate_slugs();
    if !duplicates.is_empty() {
        lines.push(String::new());
        lines.push("Duplicate slugs (first article wins)".to_string());
        for slug in duplicates {
            lines.push(format!("    {slug}"));
            for article in store.articles().iter().filter(|a| a.slug == slug) {
                lines.push(format!("        {}", article.source));
            }
        }
    }

    lines
}

pub fn print_check_output(report: &ScanReport, store: &ArticleStore) {
    for line in format_check_output(report, store) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

/// Format a build report, with output paths shown relative to `root`.
pub fn format_build_output(report: &BuildReport, root: &Path) -> Vec<String> {
    let rel = |p: &Path| p.strip_prefix(root).unwrap_or(p).display().to_string();
    let status = |written: bool| if written { "written" } else { "unchanged" };

    let mut lines = vec![
        format!(
            "Snapshot \u{2192} {} ({})",
            rel(&report.snapshot.path),
            status(report.snapshot.written)
        ),
        format!(
            "    {} articles, {} latest by category",
            report.article_count, report.latest_count
        ),
        format!("    sha256 {}", truncate_chars(&report.snapshot.digest, 12)),
    ];

    if let Some(dir) = report.pages.first().and_then(|p| p.path.parent()) {
        let written = report.pages.iter().filter(|p| p.written).count();
        lines.push(format!(
            "Pages \u{2192} {}/ ({} pages, {} written)",
            rel(dir),
            report.pages.len(),
            written
        ));
    }
    for path in &report.removed_pages {
        lines.push(format!("    removed {}", rel(path)));
    }
    for slug in &report.unsafe_slugs {
        lines.push(format!("    skipped unsafe slug '{slug}'"));
    }
    for slug in &report.colliding_slugs {
        lines.push(format!("    skipped slug '{slug}' (same file name ignoring case)"));
    }

    lines
}

pub fn print_build_output(report: &BuildReport, root: &Path) {
    for line in format_build_output(report, root) {
        println!("{}", line);
    }
}

// ============================================================================
// List
// ============================================================================

/// Format an article listing: index, title, then category, date and excerpt.
pub fn format_article_list(articles: &[&Article]) -> Vec<String> {
    if articles.is_empty() {
        return vec!["No articles".to_string()];
    }
    let mut lines = Vec::new();
    for (i, article) in articles.iter().enumerate() {
        lines.push(entity_header(i + 1, &article.title, None));
        lines.push(format!("    {} \u{b7} {} \u{b7} {}", article.category, article.date, article.slug));
        lines.push(format!("    {}", truncate_chars(&article.excerpt, 60)));
    }
    lines
}

pub fn print_article_list(articles: &[&Article]) {
    for line in format_article_list(articles) {
        println!("{}", line);
    }
}
