//! Feed fetcher for the published spreadsheet export.

use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use super::{parse_feed, FeedReport};
use crate::error::FeedError;

/// Fetches the facility feed from a URL or a local file.
pub struct FeedLoader {
    client: Client,
}

impl FeedLoader {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Fetch and parse the feed.
    pub async fn load(&self, source: &str) -> Result<FeedReport, FeedError> {
        info!("Loading facility feed from {}", source);
        let text = self.fetch(source).await?;
        debug!("Feed body is {} bytes", text.len());
        Ok(parse_feed(&text))
    }

    async fn fetch(&self, source: &str) -> Result<String, FeedError> {
        if !is_remote(source) {
            return tokio::fs::read_to_string(source)
                .await
                .map_err(|source_err| FeedError::File {
                    path: source.to_string(),
                    source: source_err,
                });
        }

        let response = self.client.get(source).send().await?;
        if !response.status().is_success() {
            return Err(FeedError::Status(response.status()));
        }

        Ok(response.text().await?)
    }
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn loader() -> FeedLoader {
        FeedLoader::new("cebamap-test", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://docs.google.com/x?output=csv"));
        assert!(is_remote("http://localhost:8080/feed.csv"));
        assert!(!is_remote("data/facilities.csv"));
    }

    #[tokio::test]
    async fn test_load_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "name,district\nCEBA Norte,Lima\nroto\n").unwrap();

        let report = loader()
            .load(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.skipped.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_feed_error() {
        let err = loader()
            .load("/definitely/not/here/facilities.csv")
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::File { .. }));
    }
}
