use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::types::SerpResponse;
use crate::config::SerpConfig;
use crate::research::{SearchResult, SearchResultSet};

/// Backend requested from SerpAPI. Fixed; not part of configuration.
const ENGINE: &str = "google";

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("invalid search endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("search provider error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("malformed search response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Web search returning candidates in provider order.
/// Implemented by `SerpClient` for production; stubs are used in tests.
pub trait SearchClient {
    async fn search(&self, query: &str) -> Result<SearchResultSet, SearchError>;
}

#[derive(Clone)]
pub struct SerpClient {
    http: Client,
    config: SerpConfig,
}

impl SerpClient {
    pub fn new(http: Client, config: SerpConfig) -> Self {
        Self { http, config }
    }

    fn request_url(&self, query: &str) -> Result<url::Url, SearchError> {
        let url = url::Url::parse_with_params(
            &self.config.endpoint,
            &[
                ("q", query),
                ("api_key", self.config.api_key.expose()),
                ("engine", ENGINE),
            ],
        )?;
        Ok(url)
    }
}

impl SearchClient for SerpClient {
    async fn search(&self, query: &str) -> Result<SearchResultSet, SearchError> {
        let url = self.request_url(query)?;

        let response = self
            .http
            .get(url)
            .header("User-Agent", crate::USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<SerpResponse>(&text)
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| {
                    let end = text.floor_char_boundary(200);
                    format!("HTTP {status}: {}", &text[..end])
                });
            warn!(status = %status, "search provider error");
            return Err(SearchError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let raw: serde_json::Value = serde_json::from_str(&text)?;
        let body = SerpResponse::deserialize(&raw)?;

        if let Some(err) = &body.error {
            warn!(error = %err, "search provider reported an error with a success status");
        }

        let results: Vec<SearchResult> = body
            .organic_results
            .unwrap_or_default()
            .into_iter()
            .map(SearchResult::from)
            .collect();

        debug!(results = results.len(), bytes = text.len(), "search complete");
        Ok(SearchResultSet { results, raw })
    }
}


#[cfg(test)]
mod http_tests {
    use super::*;
    use crate::config::ApiKey;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> SerpClient {
        let config =
            SerpConfig::new(ApiKey::new("test-key")).with_endpoint(&format!("{}/search", server.uri()));
        SerpClient::new(Client::new(), config)
    }

    #[tokio::test]
    async fn search_returns_results_in_provider_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "latest news in AI"))
            .and(query_param("api_key", "test-key"))
            .and(query_param("engine", "google"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "search_metadata": {"status": "Success"},
                "organic_results": [
                    {"position": 1, "title": "A", "link": "http://x", "snippet": "s1"},
                    {"position": 2, "title": "B", "link": "http://y", "snippet": "s2"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let set = client_for(&server).search("latest news in AI").await.unwrap();

        assert_eq!(set.results.len(), 2);
        assert_eq!(set.results[0].link, "http://x");
        assert_eq!(set.results[1].title, "B");
        assert_eq!(set.raw["search_metadata"]["status"], "Success");
    }

    #[tokio::test]
    async fn search_without_organic_results_is_empty_not_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"organic_results": []})),
            )
            .mount(&server)
            .await;

        let set = client_for(&server).search("nothing").await.unwrap();
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn search_missing_organic_field_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": "Google hasn't returned any results for this query."
            })))
            .mount(&server)
            .await;

        let set = client_for(&server).search("zzzz").await.unwrap();
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn search_non_json_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let result = client_for(&server).search("q").await;
        assert!(matches!(result, Err(SearchError::Decode(_))));
    }

    #[tokio::test]
    async fn search_401_uses_provider_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": "Invalid API key. Your API key should be here: https://serpapi.com/manage-api-key"
            })))
            .mount(&server)
            .await;

        match client_for(&server).search("q").await {
            Err(SearchError::Api { code: 401, message }) => {
                assert!(message.contains("Invalid API key"), "got: {message}");
            }
            other => panic!("expected Api(401), got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn search_500_without_json_keeps_body_snippet() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
            .mount(&server)
            .await;

        match client_for(&server).search("q").await {
            Err(SearchError::Api { code: 500, message }) => {
                assert!(message.contains("upstream down"), "got: {message}");
            }
            other => panic!("expected Api(500), got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn search_connection_refused_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let config = SerpConfig::new(ApiKey::new("test-key"))
            .with_endpoint(&format!("http://127.0.0.1:{port}/search"));
        let client = SerpClient::new(Client::new(), config);

        let result = client.search("q").await;
        assert!(matches!(result, Err(SearchError::Network(_))));
    }
}
