//! Cultivar Content
//!
//! Localized marketing payload for a cultivar, read from
//! `data/cultivars/{id}/content.json` (default language) and
//! `data/cultivars/{id}/content.{lang}.json` (optional override).

use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "api")]
pub mod resolver;
#[cfg(feature = "api")]
pub mod source;

#[cfg(feature = "api")]
pub use resolver::{new_content_cache, ContentCache, ContentKey, ContentResolver};
#[cfg(feature = "api")]
pub use source::{ContentSource, DirectorySource, HttpSource};

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("invalid language code: {0}")]
    InvalidLanguage(String),
    #[error("invalid cultivar id: {0}")]
    InvalidId(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[cfg(feature = "api")]
    #[error("request for {path} failed: {source}")]
    Http {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[cfg(feature = "api")]
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request for {path} returned status {status}")]
    Status { path: String, status: u16 },
    #[error("series for {id} could not be parsed: {source}")]
    Series {
        id: String,
        #[source]
        source: crate::series::SeriesError,
    },
    #[error("background task failed: {0}")]
    Task(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    pub title: String,
    #[serde(default)]
    pub paragraphs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Images {
    pub banner: String,
    #[serde(default)]
    pub carousel: Vec<String>,
}

/// Display strings for the four charted metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    #[serde(rename = "yield")]
    pub yield_text: String,
    pub firmness: String,
    pub size: String,
    pub appearance: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendations {
    pub planting: String,
    pub spacing: String,
    pub fertility: String,
    pub harvest: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CultivarContent {
    pub description: Description,
    pub images: Images,
    pub performance_metrics: PerformanceMetrics,
    pub recommendations: Recommendations,
}

/// Language code such as `en`, `es` or `pt-br`. Always lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Language(String);

impl Language {
    pub const DEFAULT: &'static str = "en";

    pub fn parse(code: &str) -> Result<Self, ContentError> {
        let code = code.trim().to_ascii_lowercase();
        let valid = match code.split_once('-') {
            Some((lang, region)) => is_alpha(lang, 2) && is_alpha(region, 2),
            None => is_alpha(&code, 2),
        };
        if valid {
            Ok(Self(code))
        } else {
            Err(ContentError::InvalidLanguage(code))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The default language is the canonical content source
    pub fn is_default(&self) -> bool {
        self.0 == Self::DEFAULT
    }
}

impl Default for Language {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_alpha(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_lowercase())
}

/// Slug check applied before an id becomes part of a resource path
pub fn is_valid_slug(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_')
}

pub fn content_path(cultivar_id: &str, language: &Language) -> String {
    if language.is_default() {
        format!("data/cultivars/{}/content.json", cultivar_id)
    } else {
        format!("data/cultivars/{}/content.{}.json", cultivar_id, language)
    }
}

pub fn series_path(cultivar_id: &str) -> String {
    format!("data/csv/{}.csv", cultivar_id)
}

pub const TRAIT_TABLE_PATH: &str = "data/csv/spider_traits.csv";
pub const CATALOG_PATH: &str = "data/catalog.json";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parse() {
        assert_eq!(Language::parse("ES").unwrap().as_str(), "es");
        assert_eq!(Language::parse("pt-BR").unwrap().as_str(), "pt-br");
        assert!(Language::parse("en").unwrap().is_default());
        assert!(Language::parse("../etc").is_err());
        assert!(Language::parse("english").is_err());
        assert!(Language::parse("").is_err());
    }

    #[test]
    fn test_paths() {
        let en = Language::default();
        let es = Language::parse("es").unwrap();
        assert_eq!(content_path("ruby-coast", &en), "data/cultivars/ruby-coast/content.json");
        assert_eq!(content_path("ruby-coast", &es), "data/cultivars/ruby-coast/content.es.json");
        assert_eq!(series_path("ruby-coast"), "data/csv/ruby-coast.csv");
    }

    #[test]
    fn test_slug_validation() {
        assert!(is_valid_slug("ruby-coast"));
        assert!(is_valid_slug("debug"));
        assert!(!is_valid_slug("../secret"));
        assert!(!is_valid_slug("Ruby Coast"));
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn test_content_json_shape() {
        let json = r#"{
            "description": {"title": "Ruby Coast", "paragraphs": ["Bright red fruit."]},
            "images": {"banner": "/images/ruby/banner.jpg", "carousel": ["/images/ruby/1.jpg"]},
            "performanceMetrics": {"yield": "High", "firmness": "Firm", "size": "Large", "appearance": "Glossy"},
            "recommendations": {"planting": "Oct", "spacing": "30 cm", "fertility": "Moderate N", "harvest": "Every 3 days"}
        }"#;
        let content: CultivarContent = serde_json::from_str(json).unwrap();
        assert_eq!(content.performance_metrics.yield_text, "High");
        assert_eq!(content.images.carousel.len(), 1);
    }
}
