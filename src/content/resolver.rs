//! Content Resolver
//!
//! Resolves (cultivar id, language) to a content record with default-language
//! fallback, and loads CSV series through the same source.
//! Successful lookups stay cached for the lifetime of the cache object.

use super::source::ContentSource;
use super::{
    content_path, is_valid_slug, series_path, ContentError, CultivarContent, Language,
    TRAIT_TABLE_PATH,
};
use crate::series::{parse_series_csv, parse_trait_table, MonthlySeries, TraitTable};
use moka::future::Cache;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentKey {
    pub cultivar_id: String,
    pub language: Language,
}

pub type ContentCache = Cache<ContentKey, Arc<CultivarContent>>;

/// Session-lifetime cache: bounded, never expires
pub fn new_content_cache(max_capacity: u64) -> ContentCache {
    Cache::builder().max_capacity(max_capacity).build()
}

pub struct ContentResolver {
    source: Arc<dyn ContentSource>,
    cache: ContentCache,
}

impl ContentResolver {
    pub fn new(source: Arc<dyn ContentSource>, cache: ContentCache) -> Self {
        Self { source, cache }
    }

    /// Content for `cultivar_id` in `language`, falling back to the default
    /// language. `None` when neither file is usable.
    pub async fn resolve(&self, cultivar_id: &str, language: &Language) -> Option<Arc<CultivarContent>> {
        if !is_valid_slug(cultivar_id) {
            tracing::warn!("Refusing content lookup for invalid id {:?}", cultivar_id);
            return None;
        }

        let key = ContentKey {
            cultivar_id: cultivar_id.to_string(),
            language: language.clone(),
        };
        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!("Cache hit for content {}/{}", cultivar_id, language);
            return Some(cached);
        }

        let localized = if language.is_default() {
            None
        } else {
            self.fetch_content(&content_path(cultivar_id, language)).await
        };
        let content = match localized {
            Some(content) => content,
            None => {
                self.fetch_content(&content_path(cultivar_id, &Language::default()))
                    .await?
            }
        };

        let content = Arc::new(content);
        self.cache.insert(key, content.clone()).await;
        Some(content)
    }

    async fn fetch_content(&self, path: &str) -> Option<CultivarContent> {
        match self.source.fetch(path).await {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(content) => Some(content),
                Err(e) => {
                    tracing::warn!("Malformed content file {}: {}", path, e);
                    None
                }
            },
            Ok(None) => {
                tracing::debug!("Content file {} not found", path);
                None
            }
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", path, e);
                None
            }
        }
    }

    /// Monthly series for a cultivar. `Ok(None)` when no CSV exists.
    pub async fn load_series(&self, cultivar_id: &str) -> Result<Option<MonthlySeries>, ContentError> {
        if !is_valid_slug(cultivar_id) {
            return Err(ContentError::InvalidId(cultivar_id.to_string()));
        }
        let Some(bytes) = self.source.fetch(&series_path(cultivar_id)).await? else {
            return Ok(None);
        };

        let id = cultivar_id.to_string();
        let series = tokio::task::spawn_blocking(move || parse_series_csv(&bytes))
            .await
            .map_err(|e| ContentError::Task(e.to_string()))?
            .map_err(|source| ContentError::Series { id, source })?;
        Ok(Some(series))
    }

    /// The wide spider trait table. `Ok(None)` when the file is absent.
    pub async fn load_trait_table(&self) -> Result<Option<TraitTable>, ContentError> {
        let Some(bytes) = self.source.fetch(TRAIT_TABLE_PATH).await? else {
            return Ok(None);
        };
        let table = tokio::task::spawn_blocking(move || parse_trait_table(&bytes))
            .await
            .map_err(|e| ContentError::Task(e.to_string()))?
            .map_err(|source| ContentError::Series {
                id: "spider_traits".to_string(),
                source,
            })?;
        Ok(Some(table))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory asset tree that counts fetches
    #[derive(Default)]
    pub struct MemorySource {
        pub files: HashMap<String, Vec<u8>>,
        pub fetches: AtomicUsize,
        pub failing: Vec<String>,
    }

    impl MemorySource {
        pub fn with_file(mut self, path: &str, body: &str) -> Self {
            self.files.insert(path.to_string(), body.as_bytes().to_vec());
            self
        }

        pub fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ContentSource for MemorySource {
        async fn fetch(&self, path: &str) -> Result<Option<Vec<u8>>, ContentError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.failing.iter().any(|p| p == path) {
                return Err(ContentError::Status {
                    path: path.to_string(),
                    status: 503,
                });
            }
            Ok(self.files.get(path).cloned())
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    pub fn content_json(title: &str) -> String {
        serde_json::json!({
            "description": {"title": title, "paragraphs": ["Sweet and firm."]},
            "images": {"banner": "/images/banner.jpg", "carousel": []},
            "performanceMetrics": {"yield": "High", "firmness": "Firm", "size": "Large", "appearance": "Glossy"},
            "recommendations": {"planting": "Oct", "spacing": "30 cm", "fertility": "Moderate", "harvest": "Weekly"}
        })
        .to_string()
    }
}
