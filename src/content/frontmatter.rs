//! Front-matter parsing
//!
//! A post begins with a `---` delimited YAML block; everything after the
//! closing delimiter is body content. Unlike looser generators, a missing
//! or unparseable block is an error here: the loader turns it into a
//! document-level skip-and-report.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Why a metadata block could not produce a usable document.
#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("no front-matter block found")]
    MissingBlock,

    #[error("front-matter block is not terminated")]
    Unterminated,

    #[error("invalid front-matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("missing required key `{0}`")]
    MissingKey(&'static str),

    #[error("unparseable date `{0}`")]
    BadDate(String),
}

/// Custom deserializer that accepts both a single string and a list of
/// strings for the `tags` key.
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Front-matter data from a post
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FrontMatter {
    pub layout: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub date: Option<String>,
    #[serde(deserialize_with = "string_or_vec")]
    pub tags: Vec<String>,
    pub comments: Option<bool>,
    #[serde(rename = "thumbnail-img")]
    pub thumbnail_img: Option<String>,
    pub author: Option<String>,
}

impl FrontMatter {
    /// Parse front-matter from the head of a content file.
    /// Returns (front_matter, remaining_content).
    pub fn parse(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let content = content.trim_start_matches('\u{feff}');

        let rest = content
            .strip_prefix("---")
            .ok_or(FrontMatterError::MissingBlock)?;
        let rest = rest.trim_start_matches(['\n', '\r']);

        let end_pos = rest.find("\n---").ok_or(FrontMatterError::Unterminated)?;
        let yaml_content = &rest[..end_pos];
        let remaining = rest[end_pos + 4..].trim_start_matches(['\n', '\r']);

        let mut fm: FrontMatter = serde_yaml::from_str(yaml_content)?;
        fm.dedup_tags();
        Ok((fm, remaining))
    }

    /// Check the required keys. `title` and `layout` must both be present.
    pub fn validate(&self) -> Result<(), FrontMatterError> {
        if self.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
            return Err(FrontMatterError::MissingKey("title"));
        }
        if self.layout.as_deref().map_or(true, |l| l.trim().is_empty()) {
            return Err(FrontMatterError::MissingKey("layout"));
        }
        Ok(())
    }

    /// Parse the `date` key with the configured pattern, falling back to
    /// a few common date-only and datetime shapes.
    pub fn parse_date(&self, date_format: &str) -> Result<Option<NaiveDateTime>, FrontMatterError> {
        let Some(raw) = self.date.as_deref() else {
            return Ok(None);
        };
        let raw = raw.trim();

        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, date_format) {
            return Ok(Some(dt));
        }
        if let Ok(d) = NaiveDate::parse_from_str(raw, date_format) {
            return Ok(Some(d.and_hms_opt(0, 0, 0).unwrap()));
        }

        let fallbacks = [
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%d %H:%M",
            "%Y-%m-%dT%H:%M:%S",
            "%Y/%m/%d %H:%M:%S",
        ];
        for fmt in fallbacks {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
                return Ok(Some(dt));
            }
        }
        for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
            if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
                return Ok(Some(d.and_hms_opt(0, 0, 0).unwrap()));
            }
        }

        Err(FrontMatterError::BadDate(raw.to_string()))
    }

    /// Remove duplicate tags, keeping first-occurrence order.
    fn dedup_tags(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.tags.retain(|t| seen.insert(t.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
layout: post
title: Hello World
date: 2024-01-15 10:30:00
tags:
  - rust
  - blogging
---

This is the content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, Some("Hello World".to_string()));
        assert_eq!(fm.layout, Some("post".to_string()));
        assert_eq!(fm.tags, vec!["rust", "blogging"]);
        assert!(remaining.contains("This is the content."));
        fm.validate().unwrap();
    }

    #[test]
    fn test_parse_single_string_tags() {
        let content = "---\nlayout: post\ntitle: T\ntags: notes\n---\nbody";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.tags, vec!["notes"]);
    }

    #[test]
    fn test_duplicate_tags_removed() {
        let content = "---\nlayout: post\ntitle: T\ntags: [a, b, a]\n---\nbody";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_missing_block() {
        let err = FrontMatter::parse("Just some markdown.").unwrap_err();
        assert!(matches!(err, FrontMatterError::MissingBlock));
    }

    #[test]
    fn test_unterminated_block() {
        let err = FrontMatter::parse("---\ntitle: T\nno closing delimiter").unwrap_err();
        assert!(matches!(err, FrontMatterError::Unterminated));
    }

    #[test]
    fn test_missing_title_rejected() {
        let content = "---\nlayout: post\n---\nbody";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        let err = fm.validate().unwrap_err();
        assert!(matches!(err, FrontMatterError::MissingKey("title")));
    }

    #[test]
    fn test_missing_layout_rejected() {
        let content = "---\ntitle: T\n---\nbody";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        let err = fm.validate().unwrap_err();
        assert!(matches!(err, FrontMatterError::MissingKey("layout")));
    }

    #[test]
    fn test_wrong_type_rejected() {
        // `comments` must be a boolean, not a list
        let content = "---\ntitle: T\nlayout: post\ncomments: [a]\n---\nbody";
        let err = FrontMatter::parse(content).unwrap_err();
        assert!(matches!(err, FrontMatterError::Yaml(_)));
    }

    #[test]
    fn test_parse_date_with_configured_format() {
        let fm = FrontMatter {
            date: Some("15/01/2024".to_string()),
            ..Default::default()
        };
        let dt = fm.parse_date("%d/%m/%Y").unwrap().unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2024-01-15");
    }

    #[test]
    fn test_parse_date_fallback() {
        let fm = FrontMatter {
            date: Some("2024-01-15 10:30:00".to_string()),
            ..Default::default()
        };
        let dt = fm.parse_date("%d/%m/%Y").unwrap().unwrap();
        assert_eq!(dt.format("%H:%M").to_string(), "10:30");
    }

    #[test]
    fn test_bad_date() {
        let fm = FrontMatter {
            date: Some("next tuesday".to_string()),
            ..Default::default()
        };
        let err = fm.parse_date("%Y-%m-%d").unwrap_err();
        assert!(matches!(err, FrontMatterError::BadDate(_)));
    }

    #[test]
    fn test_thumbnail_key() {
        let content = "---\ntitle: T\nlayout: post\nthumbnail-img: img/cover.png\n---\nbody";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.thumbnail_img, Some("img/cover.png".to_string()));
    }
}
