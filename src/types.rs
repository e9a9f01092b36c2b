//! Shared types used across the pipeline.
//!
//! [`Article`] is what the presentation layer reads out of the snapshot, so
//! its serialized field names (`rawDate`, `latestByCategory` on the snapshot)
//! are part of the output contract and must not drift.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Display string used when an article has no usable date.
pub const UNKNOWN_DATE: &str = "日付不明";

/// The closed set of article categories.
///
/// Declaration order is the fixed display order used by every per-category
/// projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    #[serde(rename = "導入事例")]
    CaseStudies,
    #[serde(rename = "技術解説")]
    Technical,
    #[serde(rename = "お知らせ")]
    News,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 3] = [Category::CaseStudies, Category::Technical, Category::News];

    /// The label written in frontmatter and shown on the site.
    pub fn label(self) -> &'static str {
        match self {
            Category::CaseStudies => "導入事例",
            Category::Technical => "技術解説",
            Category::News => "お知らせ",
        }
    }

    /// Stock content directory name for this category.
    pub fn default_dir(self) -> &'static str {
        match self {
            Category::CaseStudies => "case-studies",
            Category::Technical => "technical",
            Category::News => "news",
        }
    }

    /// Look up a category by its exact label. Directory names are not labels.
    pub fn from_label(label: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parses either the label or the stock directory name, for CLI convenience.
impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::from_label(s)
            .or_else(|| Category::ALL.into_iter().find(|c| c.default_dir() == s))
            .ok_or_else(|| {
                let known: Vec<String> = Category::ALL
                    .iter()
                    .map(|c| format!("{} ({})", c.label(), c.default_dir()))
                    .collect();
                format!("unknown category '{s}'. Expected one of: {}", known.join(", "))
            })
    }
}

/// A validated, normalized article.
///
/// `content` holds the markdown body. List-level projections drop it via
/// [`Article::summary`]; only single-article lookups carry it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: u32,
    pub title: String,
    pub category: Category,
    /// Display date, `YYYY年M月D日`
    pub date: String,
    /// Machine-readable date used for ordering only; `null` when undated
    pub raw_date: Option<NaiveDate>,
    pub excerpt: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    pub featured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Source file relative to the content root
    #[serde(skip)]
    pub source: String,
}

impl Article {
    /// Copy of this article without its body, for list projections.
    pub fn summary(&self) -> Article {
        Article {
            content: None,
            ..self.clone()
        }
    }
}

/// Format a date for display: `2025-07-08` → `2025年7月8日`.
///
/// Missing dates render as [`UNKNOWN_DATE`].
pub fn display_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => format!("{}年{}月{}日", d.year(), d.month(), d.day()),
        None => UNKNOWN_DATE.to_string(),
    }
}
