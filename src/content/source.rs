//! Content sources: where static assets under `data/` are read from.
//!
//! Local deployments read the asset root from disk; CDN deployments fetch the
//! same relative paths over HTTP.

use super::ContentError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

/// Read-only access to the static asset tree by relative path.
///
/// `Ok(None)` means the resource does not exist, which callers treat as a
/// fallback case rather than a failure.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<Option<Vec<u8>>, ContentError>;

    fn describe(&self) -> String;
}

pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ContentSource for DirectorySource {
    async fn fetch(&self, path: &str) -> Result<Option<Vec<u8>>, ContentError> {
        match tokio::fs::read(self.root.join(path)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ContentError::Io {
                path: path.to_string(),
                source,
            }),
        }
    }

    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }
}

pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Result<Self, ContentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(ContentError::Client)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl ContentSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<Option<Vec<u8>>, ContentError> {
        let http_err = |source| ContentError::Http {
            path: path.to_string(),
            source,
        };

        let response = self.client.get(self.url(path)).send().await.map_err(http_err)?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ContentError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await.map_err(http_err)?;
        Ok(Some(bytes.to_vec()))
    }

    fn describe(&self) -> String {
        format!("http {}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_directory_source_reads_and_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("data/csv")).unwrap();
        std::fs::write(dir.path().join("data/csv/a.csv"), "cultivar,month\n").unwrap();

        let source = DirectorySource::new(dir.path());
        let bytes = source.fetch("data/csv/a.csv").await.unwrap();
        assert_eq!(bytes.as_deref(), Some(&b"cultivar,month\n"[..]));
        assert!(source.fetch("data/csv/missing.csv").await.unwrap().is_none());
    }

    #[test]
    fn test_http_url_join() {
        let source = HttpSource::new("https://cdn.example.com/site/").unwrap();
        assert_eq!(
            source.url("data/catalog.json"),
            "https://cdn.example.com/site/data/catalog.json"
        );
    }
}
