//! # Media Articles
//!
//! The article content pipeline behind the corporate site's media section.
//! Your filesystem is the data source: one directory per category, one
//! markdown file per article, metadata in a YAML frontmatter block.
//!
//! # Architecture: Scan, Aggregate, Project
//!
//! ```text
//! 1. Scan       content/{case-studies,technical,news}/*.md  →  ScanReport
//! 2. Aggregate  ScanReport  →  ArticleStore   (ids, newest-first ordering)
//! 3. Project    ArticleStore  →  data/articles.json (+ optional detail pages)
//! ```
//!
//! The snapshot is plain JSON the presentation layer reads at build time.
//! A broken article never breaks the build: it is logged, reported by
//! `check`, and left out.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`frontmatter`] | Splits a file into its YAML frontmatter mapping and markdown body |
//! | [`validate`] | Checks frontmatter against the field rules, accumulating every error |
//! | [`scan`] | Walks the category directories and produces a scan report |
//! | [`store`] | `ArticleStore`: id assignment, sorting, read-only queries |
//! | [`snapshot`] | Writes the snapshot and detail pages, skipping unchanged files |
//! | [`markdown`] | Renders article bodies to HTML for detail pages |
//! | [`config`] | `config.toml` loading, merging onto stock defaults, validation |
//! | [`types`] | `Article` and `Category`, the types serialized into the snapshot |
//! | [`output`] | CLI output formatting for check, build and list |
//!
//! # Design Decisions
//!
//! ## Explicit Store Handle
//!
//! The store is built once per process and passed by reference. There is no
//! lazily initialized global: tests build as many independent stores as they
//! like, and the CLI decides when loading happens.
//!
//! ## Build-Stable Ids
//!
//! Ids come from a counter over a deterministic enumeration (categories in
//! display order, files sorted by name). An unchanged content tree produces
//! the same ids, and therefore a byte-identical snapshot.
//!
//! ## Category Directory Fallback
//!
//! An article without a `category` field takes the category of the
//! directory it lives in. An explicit category always wins, and an
//! unrecognized one rejects the article.

pub mod config;
pub mod frontmatter;
pub mod markdown;
pub mod output;
pub mod scan;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_helpers;
