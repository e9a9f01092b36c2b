//! Frontmatter validation and normalization.
//!
//! Turns the untyped mapping produced by [`crate::frontmatter::split`] into a
//! [`ValidFrontmatter`], or into the full list of problems with it.
//!
//! ## Field rules
//!
//! | Field | Required | Rule |
//! |-------|----------|------|
//! | `title` | yes | non-empty string after trimming |
//! | `category` | falls back | one of the three labels; absent → directory category |
//! | `date` | yes | a calendar date (see [`parse_date`]) |
//! | `excerpt` | yes | non-empty string after trimming |
//! | `slug` | no | non-empty string if present |
//! | `author` | no | non-empty string if present |
//! | `tags` | no | sequence of strings if present |
//! | `featured` | no | boolean if present |
//!
//! Every field is checked even after a failure, so one pass reports every
//! problem with a file. Any error rejects the record as a whole: valid
//! fields of a rejected record are never used.
//!
//! A YAML `null` is treated the same as an absent key.

use crate::types::Category;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_yaml_ng::{Mapping, Value};
use thiserror::Error;

/// A single field that failed validation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    #[error("title is required and must be a non-empty string")]
    Title,
    #[error("category must be one of: 導入事例, 技術解説, お知らせ")]
    Category,
    #[error("date must be a valid date string (YYYY-MM-DD format recommended)")]
    Date,
    #[error("excerpt is required and must be a non-empty string")]
    Excerpt,
    #[error("slug must be a non-empty string if provided")]
    Slug,
    #[error("author must be a non-empty string if provided")]
    Author,
    #[error("tags must be an array of strings if provided")]
    Tags,
    #[error("featured must be a boolean if provided")]
    Featured,
}

impl FieldError {
    /// Frontmatter key this error refers to.
    pub fn field(self) -> &'static str {
        match self {
            FieldError::Title => "title",
            FieldError::Category => "category",
            FieldError::Date => "date",
            FieldError::Excerpt => "excerpt",
            FieldError::Slug => "slug",
            FieldError::Author => "author",
            FieldError::Tags => "tags",
            FieldError::Featured => "featured",
        }
    }
}

/// Normalized frontmatter: every required field present, strings trimmed,
/// category resolved against the directory fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidFrontmatter {
    pub title: String,
    pub category: Category,
    pub date: NaiveDate,
    pub excerpt: String,
    pub slug: Option<String>,
    pub author: Option<String>,
    pub tags: Option<Vec<String>>,
    pub featured: bool,
}

/// Validate a frontmatter mapping.
///
/// `fallback` is the category implied by the file's directory; it applies
/// only when the mapping has no `category` key. An explicit but unknown
/// category is an error, not a silent correction.
///
/// The error list is never empty.
pub fn validate(data: &Mapping, fallback: Category) -> Result<ValidFrontmatter, Vec<FieldError>> {
    let mut errors = Vec::new();

    let title = required(data, "title", text, FieldError::Title, &mut errors);
    let category = match field(data, "category") {
        None => Some(fallback),
        Some(value) => check(
            value.as_str().and_then(Category::from_label),
            FieldError::Category,
            &mut errors,
        ),
    };
    let date = required(
        data,
        "date",
        |v| v.as_str().and_then(parse_date),
        FieldError::Date,
        &mut errors,
    );
    let excerpt = required(data, "excerpt", text, FieldError::Excerpt, &mut errors);

    let slug = optional(data, "slug", text, FieldError::Slug, &mut errors);
    let author = optional(data, "author", text, FieldError::Author, &mut errors);
    let tags = optional(data, "tags", string_list, FieldError::Tags, &mut errors);
    let featured = optional(data, "featured", Value::as_bool, FieldError::Featured, &mut errors);

    match (title, category, date, excerpt) {
        (Some(title), Some(category), Some(date), Some(excerpt)) if errors.is_empty() => {
            Ok(ValidFrontmatter {
                title,
                category,
                date,
                excerpt,
                slug,
                author,
                tags,
                featured: featured.unwrap_or(false),
            })
        }
        _ => Err(errors),
    }
}

/// Parse a frontmatter date.
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, RFC 3339 timestamps and naive
/// `YYYY-MM-DDTHH:MM:SS` timestamps. Timestamps keep the calendar date as
/// written, whatever the offset.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let s = input.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

fn field<'a>(data: &'a Mapping, key: &str) -> Option<&'a Value> {
    data.get(key).filter(|v| !v.is_null())
}

fn check<T>(parsed: Option<T>, error: FieldError, errors: &mut Vec<FieldError>) -> Option<T> {
    if parsed.is_none() {
        errors.push(error);
    }
    parsed
}

fn required<T>(
    data: &Mapping,
    key: &str,
    parse: impl Fn(&Value) -> Option<T>,
    error: FieldError,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    check(field(data, key).and_then(parse), error, errors)
}

fn optional<T>(
    data: &Mapping,
    key: &str,
    parse: impl Fn(&Value) -> Option<T>,
    error: FieldError,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    field(data, key).and_then(|value| check(parse(value), error, errors))
}

fn text(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_sequence()?
        .iter()
        .map(|item| item.as_str().map(String::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(yaml: &str) -> Mapping {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    const VALID: &str = "\
title: '  RAG活用の実装手法  '
category: 技術解説
date: 2025-07-08
excerpt: ナレッジ検索の精度向上を解説します。
";

    #[test]
    fn valid_record_is_normalized() {
        let fm = validate(&mapping(VALID), Category::News).unwrap();
        assert_eq!(fm.title, "RAG活用の実装手法");
        assert_eq!(fm.category, Category::Technical);
        assert_eq!(fm.date, NaiveDate::from_ymd_opt(2025, 7, 8).unwrap());
        assert_eq!(fm.excerpt, "ナレッジ検索の精度向上を解説します。");
        assert_eq!(fm.slug, None);
        assert_eq!(fm.author, None);
        assert_eq!(fm.tags, None);
        assert!(!fm.featured);
    }

    #[test]
    fn optional_fields_are_kept() {
        let yaml = format!(
            "{VALID}slug: rag-search\nauthor: ' 山田 '\ntags: [RAG, LLM]\nfeatured: true\n"
        );
        let fm = validate(&mapping(&yaml), Category::Technical).unwrap();
        assert_eq!(fm.slug.as_deref(), Some("rag-search"));
        assert_eq!(fm.author.as_deref(), Some("山田"));
        assert_eq!(fm.tags, Some(vec!["RAG".to_string(), "LLM".to_string()]));
        assert!(fm.featured);
    }

    #[test]
    fn missing_category_falls_back_to_directory() {
        let yaml = "title: A\ndate: 2025-07-08\nexcerpt: e\n";
        let fm = validate(&mapping(yaml), Category::News).unwrap();
        assert_eq!(fm.category, Category::News);
    }

    #[test]
    fn null_category_falls_back_to_directory() {
        let yaml = "title: A\ncategory: ~\ndate: 2025-07-08\nexcerpt: e\n";
        let fm = validate(&mapping(yaml), Category::CaseStudies).unwrap();
        assert_eq!(fm.category, Category::CaseStudies);
    }

    #[test]
    fn unknown_category_rejected_despite_fallback() {
        let yaml = "title: A\ncategory: 不明\ndate: 2025-07-08\nexcerpt: e\n";
        let errors = validate(&mapping(yaml), Category::Technical).unwrap_err();
        assert_eq!(errors, vec![FieldError::Category]);
    }

    #[test]
    fn directory_name_is_not_a_category_label() {
        let yaml = "title: A\ncategory: technical\ndate: 2025-07-08\nexcerpt: e\n";
        let errors = validate(&mapping(yaml), Category::Technical).unwrap_err();
        assert_eq!(errors, vec![FieldError::Category]);
    }

    #[test]
    fn each_required_field_is_enforced() {
        for (key, expected) in [
            ("title", FieldError::Title),
            ("date", FieldError::Date),
            ("excerpt", FieldError::Excerpt),
        ] {
            let yaml: String = VALID
                .lines()
                .filter(|line| !line.starts_with(key))
                .map(|line| format!("{line}\n"))
                .collect();
            let errors = validate(&mapping(&yaml), Category::Technical).unwrap_err();
            assert_eq!(errors, vec![expected], "removing '{key}'");
        }
    }

    #[test]
    fn errors_accumulate_without_short_circuit() {
        let yaml = "title: '   '\ncategory: 不明\ndate: yesterday\nslug: ''\ntags: [1, 2]\nfeatured: 'yes'\n";
        let errors = validate(&mapping(yaml), Category::News).unwrap_err();
        assert_eq!(
            errors,
            vec![
                FieldError::Title,
                FieldError::Category,
                FieldError::Date,
                FieldError::Excerpt,
                FieldError::Slug,
                FieldError::Tags,
                FieldError::Featured,
            ]
        );
    }

    #[test]
    fn empty_mapping_reports_all_required_fields() {
        let errors = validate(&Mapping::new(), Category::News).unwrap_err();
        assert_eq!(
            errors,
            vec![FieldError::Title, FieldError::Date, FieldError::Excerpt]
        );
    }

    #[test]
    fn non_string_title_rejected() {
        let yaml = "title: 42\ndate: 2025-07-08\nexcerpt: e\n";
        let errors = validate(&mapping(yaml), Category::News).unwrap_err();
        assert_eq!(errors, vec![FieldError::Title]);
    }

    #[test]
    fn empty_author_rejected() {
        let yaml = format!("{VALID}author: '  '\n");
        let errors = validate(&mapping(&yaml), Category::Technical).unwrap_err();
        assert_eq!(errors, vec![FieldError::Author]);
    }

    #[test]
    fn scalar_tags_rejected() {
        let yaml = format!("{VALID}tags: RAG\n");
        let errors = validate(&mapping(&yaml), Category::Technical).unwrap_err();
        assert_eq!(errors, vec![FieldError::Tags]);
    }

    #[test]
    fn empty_tag_list_is_valid() {
        let yaml = format!("{VALID}tags: []\n");
        let fm = validate(&mapping(&yaml), Category::Technical).unwrap();
        assert_eq!(fm.tags, Some(vec![]));
    }

    #[test]
    fn null_optional_fields_count_as_absent() {
        let yaml = format!("{VALID}slug: ~\nauthor: null\nfeatured: ~\n");
        let fm = validate(&mapping(&yaml), Category::Technical).unwrap();
        assert_eq!(fm.slug, None);
        assert_eq!(fm.author, None);
        assert!(!fm.featured);
    }

    #[test]
    fn field_names_match_keys() {
        assert_eq!(FieldError::Excerpt.field(), "excerpt");
        assert_eq!(FieldError::Featured.field(), "featured");
    }

    // =========================================================================
    // parse_date() tests
    // =========================================================================

    #[test]
    fn parse_date_iso() {
        assert_eq!(parse_date("2025-07-08"), NaiveDate::from_ymd_opt(2025, 7, 8));
    }

    #[test]
    fn parse_date_slashes() {
        assert_eq!(parse_date("2025/07/08"), NaiveDate::from_ymd_opt(2025, 7, 8));
    }

    #[test]
    fn parse_date_rfc3339_keeps_written_date() {
        assert_eq!(
            parse_date("2025-07-08T23:30:00+09:00"),
            NaiveDate::from_ymd_opt(2025, 7, 8)
        );
        assert_eq!(
            parse_date("2025-07-08T09:00:00Z"),
            NaiveDate::from_ymd_opt(2025, 7, 8)
        );
    }

    #[test]
    fn parse_date_naive_timestamp() {
        assert_eq!(
            parse_date("2025-07-08T09:00:00"),
            NaiveDate::from_ymd_opt(2025, 7, 8)
        );
    }

    #[test]
    fn parse_date_rejects_impossible_dates() {
        assert_eq!(parse_date("2025-02-30"), None);
        assert_eq!(parse_date("2025-13-01"), None);
    }

    #[test]
    fn parse_date_rejects_free_text() {
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date(""), None);
    }
}
