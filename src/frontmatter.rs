//! Frontmatter extraction.
//!
//! An article file opens with a YAML block fenced by `---` lines:
//!
//! ```text
//! ---
//! title: RAG活用で企業内検索精度を大幅向上する実装手法
//! date: 2025-07-08
//! excerpt: ナレッジ検索システムの実装方法を解説します。
//! ---
//!
//! # 本文
//! ```
//!
//! This module only splits the file and parses the YAML into an untyped
//! mapping. Whether the mapping describes a valid article is decided by
//! [`crate::validate`].

use serde_yaml_ng::{Mapping, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("frontmatter block opened with `---` but never closed")]
    Unterminated,
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
    #[error("frontmatter must be a YAML mapping of keys to values")]
    NotAMapping,
}

/// A content file split into its metadata and markdown body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub data: Mapping,
    pub body: String,
}

/// Split a content file into frontmatter and body.
///
/// A file without an opening fence has empty frontmatter and the whole text
/// as body. A leading UTF-8 BOM and CRLF line endings are tolerated.
pub fn split(source: &str) -> Result<Document, FrontmatterError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);

    let Some(rest) = strip_opening_fence(source) else {
        return Ok(Document {
            data: Mapping::new(),
            body: source.to_string(),
        });
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if is_fence(line) {
            let data = parse_mapping(&rest[..offset])?;
            let body = rest[offset + line.len()..].to_string();
            return Ok(Document { data, body });
        }
        offset += line.len();
    }

    Err(FrontmatterError::Unterminated)
}

fn strip_opening_fence(source: &str) -> Option<&str> {
    let first_len = source.find('\n').map(|i| i + 1).unwrap_or(source.len());
    is_fence(&source[..first_len]).then(|| &source[first_len..])
}

fn is_fence(line: &str) -> bool {
    line.trim_end() == "---"
}

fn parse_mapping(yaml: &str) -> Result<Mapping, FrontmatterError> {
    let blank = yaml.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    });
    if blank {
        return Ok(Mapping::new());
    }
    match serde_yaml_ng::from_str::<Value>(yaml)? {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Err(FrontmatterError::NotAMapping),
    }
}
