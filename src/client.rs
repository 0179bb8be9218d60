use std::time::{Duration, Instant};

use bytes::Bytes;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response};
use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};
use crate::observability::{
    GATEWAY_DOWNLOADS, GATEWAY_REQUEST_DURATION, GATEWAY_REQUEST_ERRORS, GATEWAY_REQUESTS,
};
use crate::types::{ChatRequest, ChatResponse};

/// Where the agent backend listens unless told otherwise.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/";

/// The agent backend as seen by a chat session.
///
/// [`Gateway`] talks HTTP; tests substitute scripted backends.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Run one natural-language command.  Exactly one attempt is made.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Where a backend-generated artifact can be downloaded from.
    fn download_url(&self, file_name: &str) -> Result<Url>;
}

/// HTTP client for the agent backend.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: ReqwestClient,
    base_url: Url,
    timeout: Option<Duration>,
}

impl Gateway {
    /// Create a gateway for the default backend address.
    pub fn new() -> Result<Self> {
        Self::with_options(None, None)
    }

    /// Create a gateway with custom settings.
    ///
    /// Without a timeout the transport defaults apply.
    pub fn with_options(base_url: Option<&str>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = Url::parse(base_url.unwrap_or(DEFAULT_BASE_URL))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::url(
                format!("{base_url} is not an http(s) base URL"),
                None,
            ));
        }

        let mut builder = ReqwestClient::builder().default_headers(default_headers());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            Error::http_client(
                format!("Failed to build HTTP client: {}", e),
                Some(Box::new(e)),
            )
        })?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// The backend's base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The URL a backend-generated artifact can be fetched from.
    ///
    /// The name is opaque and is encoded as a single path segment.
    pub fn download_url(&self, file_name: &str) -> Result<Url> {
        if file_name.is_empty() {
            return Err(Error::validation(
                "download file name is empty",
                Some("download_file".to_string()),
            ));
        }
        self.endpoint(&["files", file_name])
    }

    /// Fetch a backend-generated artifact.
    pub async fn download(&self, file_name: &str) -> Result<Bytes> {
        let url = self.download_url(file_name)?;
        GATEWAY_DOWNLOADS.click();
        tracing::debug!(%url, "downloading artifact");
        let response = self.execute(self.client.get(url)).await?;
        response.bytes().await.map_err(|e| {
            Error::http_client(format!("Failed to read download: {}", e), Some(Box::new(e)))
        })
    }

    /// Ask the backend for its banner, confirming it is reachable.
    pub async fn health(&self) -> Result<String> {
        #[derive(Deserialize)]
        struct Banner {
            message: String,
        }

        let response = self.execute(self.client.get(self.base_url.clone())).await?;
        let banner: Banner = parse_body(response).await?;
        Ok(banner.message)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::url(format!("{} cannot be a base URL", self.base_url), None))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request once, mapping transport failures and non-2xx statuses
    /// onto [`Error`].
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Response> {
        GATEWAY_REQUESTS.click();
        let start = Instant::now();
        let result = request.send().await;
        GATEWAY_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        let response = result.map_err(|e| {
            GATEWAY_REQUEST_ERRORS.click();
            tracing::warn!(error = %e, "request to agent backend failed");
            if e.is_timeout() {
                Error::timeout(
                    format!("Request timed out: {}", e),
                    self.timeout.map(|t| t.as_secs_f64()),
                )
            } else if e.is_connect() {
                Error::connection(format!("{}", e), Some(Box::new(e)))
            } else {
                Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
            }
        })?;

        tracing::debug!(status = %response.status(), url = %response.url(), "backend responded");
        if !response.status().is_success() {
            GATEWAY_REQUEST_ERRORS.click();
            return Err(process_error_response(response).await);
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl Backend for Gateway {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = self.endpoint(&["chat"])?;
        tracing::debug!(%url, prompt = %request.prompt, "sending prompt");
        let response = self.execute(self.client.post(url).json(request)).await?;
        parse_body(response).await
    }

    fn download_url(&self, file_name: &str) -> Result<Url> {
        Gateway::download_url(self, file_name)
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

async fn parse_body<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes().await.map_err(|e| {
        Error::http_client(format!("Failed to read response: {}", e), Some(Box::new(e)))
    })?;
    serde_json::from_slice(&body).map_err(|e| {
        Error::serialization(
            format!("Failed to parse response: {}", e),
            Some(Box::new(e)),
        )
    })
}

/// Turn a non-2xx response into an error.  The backend reports failures as
/// `{"detail": ...}`; anything else is passed through as raw text.
async fn process_error_response(response: Response) -> Error {
    #[derive(Deserialize)]
    struct ErrorResponse {
        detail: serde_json::Value,
    }

    let status_code = response.status().as_u16();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            return Error::http_client(
                format!("Failed to read error response: {}", e),
                Some(Box::new(e)),
            );
        }
    };

    let message = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(ErrorResponse {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(ErrorResponse { detail }) => detail.to_string(),
        Err(_) => body.trim().to_string(),
    };
    Error::api(status_code, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_creation() {
        let gateway = Gateway::new().unwrap();
        assert_eq!(gateway.base_url().as_str(), DEFAULT_BASE_URL);
        assert_eq!(gateway.timeout, None);

        let gateway = Gateway::with_options(
            Some("https://agent.example.com/api/"),
            Some(Duration::from_secs(30)),
        )
        .unwrap();
        assert_eq!(gateway.base_url().as_str(), "https://agent.example.com/api/");
        assert_eq!(gateway.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn rejects_non_http_base() {
        assert!(Gateway::with_options(Some("localhost:8000"), None).is_err());
        assert!(Gateway::with_options(Some("ftp://example.com/"), None).is_err());
        assert!(Gateway::with_options(Some("not a url"), None).is_err());
    }

    #[test]
    fn download_url_is_deterministic() {
        let gateway = Gateway::new().unwrap();
        let url = gateway
            .download_url("reddit_results_20250422_101500.xlsx")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/files/reddit_results_20250422_101500.xlsx"
        );
        assert_eq!(
            gateway
                .download_url("reddit_results_20250422_101500.xlsx")
                .unwrap(),
            url
        );
    }

    #[test]
    fn download_url_encodes_the_name() {
        let gateway = Gateway::with_options(Some("http://localhost:8000/api"), None).unwrap();
        let url = gateway.download_url("a b/../c?.xlsx").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/files/a%20b%2F..%2Fc%3F.xlsx"
        );
    }

    #[test]
    fn download_url_requires_a_name() {
        let gateway = Gateway::new().unwrap();
        assert!(gateway.download_url("").unwrap_err().is_validation());
    }

    #[test]
    fn chat_endpoint_respects_base_path() {
        let gateway = Gateway::with_options(Some("http://agent:9000/v1/"), None).unwrap();
        assert_eq!(
            gateway.endpoint(&["chat"]).unwrap().as_str(),
            "http://agent:9000/v1/chat"
        );
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_connection_error() {
        let gateway = Gateway::with_options(Some("http://127.0.0.1:1/"), None).unwrap();
        let err = gateway
            .chat(&ChatRequest::new("Search for AI agents in startups"))
            .await
            .unwrap_err();
        assert!(err.is_connection(), "unexpected error: {err:?}");
    }
}
