//! HTTP adapter for the remote quote source.
//!
//! All network access goes through [`RemoteSource`] so the reconciler and
//! presenter can be exercised against in-process fakes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::domain::{AppError, QuoteRecord, RemoteConfig, RemoteItem, Result};

/// Remote list capability.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch the current remote snapshot.
    ///
    /// # Errors
    /// Returns `AppError::Network` on transport failure, non-2xx status or
    /// an unparseable body.
    async fn fetch_items(&self) -> Result<Vec<RemoteItem>>;

    /// Post a locally created quote. The response body is ignored.
    ///
    /// # Errors
    /// Returns `AppError::Network` if the request fails.
    async fn post_quote(&self, quote: &QuoteRecord) -> Result<()>;
}

/// JSON-over-HTTP remote using `reqwest`.
pub struct HttpRemote {
    client: Client,
    base_url: String,
    limit: u32,
}

impl HttpRemote {
    /// Create a client from configuration.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the HTTP client cannot be built.
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limit: config.limit,
        })
    }

    fn posts_url(&self) -> String {
        format!("{}/posts", self.base_url)
    }
}

#[async_trait]
impl RemoteSource for HttpRemote {
    async fn fetch_items(&self) -> Result<Vec<RemoteItem>> {
        let url = self.posts_url();
        tracing::debug!(%url, limit = self.limit, "Fetching remote quotes");

        let response = self
            .client
            .get(&url)
            .query(&[("_limit", self.limit)])
            .send()
            .await
            .map_err(|e| AppError::network(&e))?
            .error_for_status()
            .map_err(|e| AppError::network(&e))?;

        response
            .json::<Vec<RemoteItem>>()
            .await
            .map_err(|e| AppError::network(&e))
    }

    async fn post_quote(&self, quote: &QuoteRecord) -> Result<()> {
        let url = self.posts_url();
        tracing::debug!(%url, "Posting quote");

        self.client
            .post(&url)
            .json(quote)
            .send()
            .await
            .map_err(|e| AppError::network(&e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;

    /// Serve `app` on an ephemeral local port and return its base URL.
    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn remote_at(base_url: String) -> HttpRemote {
        let config = RemoteConfig {
            base_url,
            timeout_secs: 2,
            ..RemoteConfig::default()
        };
        HttpRemote::new(&config).unwrap()
    }

    #[test]
    fn test_posts_url_trims_trailing_slash() {
        let config = RemoteConfig {
            base_url: "http://localhost:3000/".to_string(),
            ..RemoteConfig::default()
        };
        let remote = HttpRemote::new(&config).unwrap();
        assert_eq!(remote.posts_url(), "http://localhost:3000/posts");
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_network_error() {
        let config = RemoteConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..RemoteConfig::default()
        };
        let remote = HttpRemote::new(&config).unwrap();
        let result = remote.fetch_items().await;
        assert!(matches!(result, Err(AppError::Network { .. })));
    }

    #[tokio::test]
    async fn test_fetch_reads_titles() {
        let app = Router::new().route(
            "/posts",
            get(|| async { r#"[{"userId":1,"id":1,"title":"From server","body":"x"}]"# }),
        );
        let remote = remote_at(serve(app).await);

        let items = remote.fetch_items().await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "From server");
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_network_error() {
        let app = Router::new().route(
            "/posts",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let remote = remote_at(serve(app).await);

        let result = remote.fetch_items().await;
        assert!(matches!(result, Err(AppError::Network { .. })));
    }

    #[tokio::test]
    async fn test_fetch_non_json_body_is_network_error() {
        let app = Router::new().route("/posts", get(|| async { "<html>not json</html>" }));
        let remote = remote_at(serve(app).await);

        let result = remote.fetch_items().await;
        assert!(matches!(result, Err(AppError::Network { .. })));
    }
}
