//! Article aggregation and queries.
//!
//! [`ArticleStore`] is the explicit content handle the rest of the crate
//! threads around. It is built once per process from a scan and never
//! mutated afterwards; every query is a read-only view over its sorted
//! collection.
//!
//! ## Identifiers
//!
//! Ids are assigned 1, 2, 3, … in enumeration order when drafts are merged,
//! before sorting. The scanner enumerates categories in display order and
//! files by name, so an unchanged content tree always gets the same ids.
//!
//! ## Ordering
//!
//! Newest `rawDate` first; undated articles after every dated one. The sort
//! is stable, so ties keep enumeration order.
//!
//! ## Duplicate slugs
//!
//! Slugs are not required to be unique. [`ArticleStore::by_slug`] returns the
//! first match in collection order, and duplicates are reported as warnings
//! when the store is built (and by the `check` command).

use crate::config::DirectoryConfig;
use crate::scan::{self, ArticleDraft};
use crate::types::{Article, Category};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct ArticleStore {
    articles: Vec<Article>,
}

impl ArticleStore {
    /// Merge drafts into a store: assign ids, then sort newest first.
    pub fn collect(drafts: impl IntoIterator<Item = ArticleDraft>) -> Self {
        let mut articles: Vec<Article> = drafts
            .into_iter()
            .zip(1..)
            .map(|(draft, id)| draft.into_article(id))
            .collect();

        // Option orders None below Some, so comparing b to a puts undated last.
        articles.sort_by(|a, b| b.raw_date.cmp(&a.raw_date));

        let store = Self { articles };
        for slug in store.duplicate_slugs() {
            log::warn!("duplicate slug '{slug}': only the first article is reachable by slug");
        }
        store
    }

    /// Scan `root` and build a store.
    ///
    /// A scan-level failure (unusable content root) is logged and yields an
    /// empty store: no articles is a valid, if degraded, result.
    pub fn load(root: &Path, dirs: &DirectoryConfig) -> Self {
        match scan::scan(root, dirs) {
            Ok(report) => Self::collect(report.drafts),
            Err(e) => {
                log::error!("error loading articles: {e}");
                Self::default()
            }
        }
    }

    /// Every article, newest first.
    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// The `limit` newest articles.
    pub fn latest(&self, limit: usize) -> &[Article] {
        &self.articles[..limit.min(self.articles.len())]
    }

    /// Articles in one category, newest first.
    pub fn by_category(&self, category: Category) -> Vec<&Article> {
        self.articles
            .iter()
            .filter(|a| a.category == category)
            .collect()
    }

    /// The newest article of each category, in display order.
    ///
    /// Categories without articles are omitted rather than padded.
    pub fn latest_by_category(&self) -> Vec<&Article> {
        Category::ALL
            .into_iter()
            .filter_map(|category| self.articles.iter().find(|a| a.category == category))
            .collect()
    }

    /// First article with the given slug, if any.
    pub fn by_slug(&self, slug: &str) -> Option<&Article> {
        self.articles.iter().find(|a| a.slug == slug)
    }

    /// Every slug in collection order, duplicates included.
    ///
    /// These are the route parameters for statically generated detail pages.
    pub fn slugs(&self) -> Vec<&str> {
        self.articles.iter().map(|a| a.slug.as_str()).collect()
    }

    /// Slugs used by more than one article, in order of first appearance.
    pub fn duplicate_slugs(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut duplicates = Vec::new();
        for slug in self.slugs() {
            if !seen.insert(slug) && reported.insert(slug) {
                duplicates.push(slug);
            }
        }
        duplicates
    }
}
