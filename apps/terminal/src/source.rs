//! Catalog source: remote JSON over HTTP or a local file.

use std::path::PathBuf;

use drill_core::catalog::parse_document;
use drill_core::{CatalogDocument, SourceError};
use reqwest::Client;

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogSource {
    Http(String),
    File(PathBuf),
}

impl CatalogSource {
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Http(location.to_string())
        } else {
            Self::File(PathBuf::from(location))
        }
    }
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(url) => f.write_str(url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Fetches the catalog document. Failures are returned, not retried; the
/// controller degrades to the embedded seed.
#[derive(Clone)]
pub struct CatalogFetcher {
    client: Client,
    source: CatalogSource,
}

impl CatalogFetcher {
    pub fn new(source: CatalogSource) -> Self {
        Self {
            client: Client::new(),
            source,
        }
    }

    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    pub async fn fetch(&self) -> Result<CatalogDocument, SourceError> {
        let body = match &self.source {
            CatalogSource::Http(url) => self.fetch_http(url).await?,
            CatalogSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| SourceError::Unavailable(format!("{}: {}", path.display(), e)))?,
        };
        let document = parse_document(&body)?;
        tracing::debug!(source = %self.source, levels = document.levels.len(), "catalog fetched");
        Ok(document)
    }

    async fn fetch_http(&self, url: &str) -> Result<String, SourceError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(SourceError::Unavailable(format!(
                "{} returned {}",
                url,
                resp.status()
            )));
        }

        resp.text()
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("kr-en-terms-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn parse_location() {
        assert_eq!(
            CatalogSource::parse("https://host/terms.json"),
            CatalogSource::Http("https://host/terms.json".into())
        );
        assert_eq!(
            CatalogSource::parse("data/kr_en_terms.json"),
            CatalogSource::File(PathBuf::from("data/kr_en_terms.json"))
        );
    }

    #[tokio::test]
    async fn fetch_file() {
        let path = temp_file(r#"{"levels":[{"id":"x","name":"X","terms":[{"ko":"정수","en":"integer"}]}]}"#);
        let fetcher = CatalogFetcher::new(CatalogSource::File(path.clone()));
        let document = fetcher.fetch().await.unwrap();
        assert_eq!(document.levels[0].terms[0].en, "integer");
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let source = CatalogSource::File(PathBuf::from("/nonexistent/terms.json"));
        let fetcher = CatalogFetcher::new(source);
        assert!(matches!(fetcher.fetch().await, Err(SourceError::Unavailable(_))));
    }

    #[tokio::test]
    async fn malformed_file() {
        let path = temp_file("[not a catalog");
        let fetcher = CatalogFetcher::new(CatalogSource::File(path.clone()));
        assert!(matches!(fetcher.fetch().await, Err(SourceError::Malformed(_))));
        std::fs::remove_file(path).ok();
    }
}
