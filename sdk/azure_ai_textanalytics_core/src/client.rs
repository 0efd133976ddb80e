//! HTTP client for the Azure Text Analytics / Language service.
//!
//! [`TextAnalyticsClient`] owns authentication, HTTP transport, transient
//! retries and error normalisation. Every failure that leaves this module is a
//! [`TextAnalyticsError`]; callers never see a bare non-success response.
//!
//! # Examples
//!
//! ## Using a resource key
//! ```rust,no_run
//! use azure_ai_textanalytics_core::client::TextAnalyticsClient;
//! use azure_ai_textanalytics_core::auth::TextAnalyticsCredential;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TextAnalyticsClient::builder()
//!     .endpoint("https://your-resource.cognitiveservices.azure.com")
//!     .credential(TextAnalyticsCredential::api_key("your-key"))
//!     .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Using the legacy v3.1 API with the Azure CLI identity
//! ```rust,no_run
//! use azure_ai_textanalytics_core::client::TextAnalyticsClient;
//! use azure_ai_textanalytics_core::auth::TextAnalyticsCredential;
//! use azure_ai_textanalytics_core::ServiceVersion;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TextAnalyticsClient::builder()
//!     .endpoint("https://your-resource.cognitiveservices.azure.com")
//!     .credential(TextAnalyticsCredential::azure_cli()?)
//!     .service_version(ServiceVersion::V3_1)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use crate::auth::TextAnalyticsCredential;
use crate::error::{TextAnalyticsError, TextAnalyticsResult};
use crate::version::ServiceVersion;
use reqwest::Client as HttpClient;
use url::Url;

use std::time::Duration;

/// Default connection timeout (10 seconds).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default read/response timeout (60 seconds).
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Determines if an HTTP status code represents a retriable error.
///
/// Retriable errors are transient server-side issues that may succeed on retry:
/// - 429 Too Many Requests (rate limiting)
/// - 500 Internal Server Error
/// - 502 Bad Gateway
/// - 503 Service Unavailable
/// - 504 Gateway Timeout
#[inline]
pub fn is_retriable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Configuration for automatic retry behavior on transient errors.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts (not counting the initial request).
    pub max_retries: u32,
    /// Initial backoff duration before the first retry.
    /// Subsequent retries use exponential backoff (2^attempt * initial_backoff).
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `attempt` (0-based), with ±25% jitter.
    fn backoff(&self, attempt: u32) -> Duration {
        let base = self.initial_backoff * 2_u32.saturating_pow(attempt);
        let jitter = 0.75 + fastrand::f64() * 0.5;
        base.mul_f64(jitter)
    }
}

/// The HTTP verbs the job APIs use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Get,
    Post,
    Delete,
}

/// The base client for the Text Analytics service.
///
/// Higher-level crates (`azure_ai_textanalytics_lro`, `azure_ai_textanalytics`)
/// build every job call on top of it.
///
/// The client is cheaply cloneable and can be shared across threads.
#[derive(Debug, Clone)]
pub struct TextAnalyticsClient {
    pub(crate) http: HttpClient,
    pub(crate) endpoint: Url,
    pub(crate) credential: TextAnalyticsCredential,
    pub(crate) service_version: ServiceVersion,
    pub(crate) retry_policy: RetryPolicy,
}

/// Builder for constructing a [`TextAnalyticsClient`].
///
/// Use [`TextAnalyticsClient::builder()`] to create a new builder.
#[derive(Debug, Default)]
pub struct TextAnalyticsClientBuilder {
    endpoint: Option<String>,
    credential: Option<TextAnalyticsCredential>,
    service_version: Option<ServiceVersion>,
    http_client: Option<HttpClient>,
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
    retry_policy: Option<RetryPolicy>,
}

impl TextAnalyticsClient {
    /// Create a new builder for configuring a `TextAnalyticsClient`.
    pub fn builder() -> TextAnalyticsClientBuilder {
        TextAnalyticsClientBuilder::default()
    }

    /// Get the base endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Get the configured service version.
    pub fn service_version(&self) -> ServiceVersion {
        self.service_version
    }

    /// Get the retry policy configuration.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Build a full URL for an API path (which may carry a query string).
    pub fn url(&self, path: &str) -> TextAnalyticsResult<Url> {
        self.endpoint.join(path).map_err(|e| {
            TextAnalyticsError::invalid_endpoint_with_source("failed to construct URL", e)
        })
    }

    /// Send a GET request, retrying transient failures.
    pub async fn get(&self, path: &str) -> TextAnalyticsResult<reqwest::Response> {
        self.send(Verb::Get, path, None).await
    }

    /// Send a POST request with a JSON body, retrying transient failures.
    pub async fn post<T: serde::Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> TextAnalyticsResult<reqwest::Response> {
        let body = serde_json::to_vec(body)?;
        self.send(Verb::Post, path, Some(body)).await
    }

    /// Send a POST request without a body (used by `:cancel`).
    pub async fn post_empty(&self, path: &str) -> TextAnalyticsResult<reqwest::Response> {
        self.send(Verb::Post, path, None).await
    }

    /// Send a DELETE request, retrying transient failures.
    pub async fn delete(&self, path: &str) -> TextAnalyticsResult<reqwest::Response> {
        self.send(Verb::Delete, path, None).await
    }

    async fn send(
        &self,
        verb: Verb,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> TextAnalyticsResult<reqwest::Response> {
        let url = self.url(path)?;
        let auth = self.credential.resolve().await?;

        for attempt in 0..=self.retry_policy.max_retries {
            let mut request = match verb {
                Verb::Get => self.http.get(url.clone()),
                Verb::Post => self.http.post(url.clone()),
                Verb::Delete => self.http.delete(url.clone()),
            }
            .header(auth.name, &auth.value);

            if let Some(body) = &body {
                request = request
                    .header(reqwest::header::CONTENT_TYPE, "application/json")
                    .body(body.clone());
            }

            let response = request.send().await?;
            let status = response.status().as_u16();

            if response.status().is_success() {
                return Ok(response);
            }

            if !is_retriable_status(status) || attempt == self.retry_policy.max_retries {
                return Err(Self::error_from_response(response).await);
            }

            let backoff = self.retry_policy.backoff(attempt);
            tracing::warn!(
                status,
                attempt,
                backoff_ms = backoff.as_millis() as u64,
                "transient service error, retrying"
            );
            tokio::time::sleep(backoff).await;
        }

        unreachable!("retry loop should return before reaching here")
    }

    /// Maximum length for error messages to prevent sensitive data leaks.
    const MAX_ERROR_MESSAGE_LEN: usize = 1000;

    /// Replace the token following each occurrence of `marker` with `[REDACTED]`.
    fn redact_after(text: &mut String, marker: &str) {
        const REDACTED: &str = "[REDACTED]";
        let mut search_start = 0;

        while let Some(relative) = text[search_start..].find(marker) {
            let value_start = search_start + relative + marker.len();
            let rest = &text[value_start..];
            let value_len = rest
                .find(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | ','))
                .unwrap_or(rest.len());

            if value_len == 0 || rest.starts_with(REDACTED) {
                search_start = value_start + value_len;
                continue;
            }

            text.replace_range(value_start..value_start + value_len, REDACTED);
            search_start = value_start + REDACTED.len();
        }
    }

    /// Remove bearer tokens and subscription keys from an error message.
    pub(crate) fn sanitize_error_message(msg: &str) -> String {
        let mut result = msg.to_string();
        Self::redact_after(&mut result, "Bearer ");
        Self::redact_after(&mut result, "Ocp-Apim-Subscription-Key: ");
        Self::redact_after(&mut result, "Ocp-Apim-Subscription-Key=");
        result
    }

    /// Sanitize, then truncate a message that exceeds the maximum length.
    pub(crate) fn truncate_message(msg: &str) -> String {
        let sanitized = Self::sanitize_error_message(msg);

        if sanitized.len() > Self::MAX_ERROR_MESSAGE_LEN {
            let mut cut = Self::MAX_ERROR_MESSAGE_LEN;
            while !sanitized.is_char_boundary(cut) {
                cut -= 1;
            }
            format!("{}... (truncated)", &sanitized[..cut])
        } else {
            sanitized
        }
    }

    /// Normalise a non-success response into [`TextAnalyticsError::Http`].
    async fn error_from_response(response: reqwest::Response) -> TextAnalyticsError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) {
            if let Some(err_obj) = value.get("error") {
                let code = err_obj
                    .get("code")
                    .and_then(|c| c.as_str())
                    .map(str::to_string);
                let message = err_obj
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or(&body);
                return TextAnalyticsError::Http {
                    status,
                    code,
                    message: Self::truncate_message(message),
                };
            }
        }

        TextAnalyticsError::http(status, Self::truncate_message(&body))
    }
}

impl TextAnalyticsClientBuilder {
    /// Set the Language resource endpoint URL.
    ///
    /// This should be in the format:
    /// `https://<resource-name>.cognitiveservices.azure.com`
    ///
    /// If not set, the builder will check the `AZURE_LANGUAGE_ENDPOINT`
    /// environment variable.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the credential to use for authentication.
    ///
    /// If not set, the builder will use [`TextAnalyticsCredential::from_env()`].
    pub fn credential(mut self, credential: TextAnalyticsCredential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Set the service version.
    ///
    /// If not set, the builder reads `AZURE_LANGUAGE_API_VERSION` and otherwise
    /// uses [`ServiceVersion::LATEST`].
    pub fn service_version(mut self, version: ServiceVersion) -> Self {
        self.service_version = Some(version);
        self
    }

    /// Set a custom HTTP client.
    ///
    /// **Note:** If you provide a custom HTTP client, any timeout configuration
    /// on this builder is ignored.
    pub fn http_client(mut self, client: HttpClient) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the read timeout, covering the whole request/response cycle.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Set the retry policy for transient errors.
    ///
    /// Defaults to 3 retries with 500ms initial backoff.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Build the `TextAnalyticsClient`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No endpoint is provided and `AZURE_LANGUAGE_ENDPOINT` is not set
    /// - The endpoint URL is invalid
    /// - `AZURE_LANGUAGE_API_VERSION` names an unknown version
    /// - Credential creation fails (when using environment-based credentials)
    pub fn build(self) -> TextAnalyticsResult<TextAnalyticsClient> {
        let http = match self.http_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .connect_timeout(self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT))
                .timeout(self.read_timeout.unwrap_or(DEFAULT_READ_TIMEOUT))
                .build()?,
        };

        let endpoint_str = self
            .endpoint
            .or_else(|| std::env::var("AZURE_LANGUAGE_ENDPOINT").ok())
            .ok_or_else(|| {
                TextAnalyticsError::MissingConfig(
                    "endpoint is required. Set it via builder or AZURE_LANGUAGE_ENDPOINT env var."
                        .into(),
                )
            })?;

        let endpoint = Url::parse(&endpoint_str).map_err(|e| {
            TextAnalyticsError::invalid_endpoint_with_source("invalid endpoint URL", e)
        })?;

        let service_version = match self.service_version {
            Some(version) => version,
            None => match std::env::var("AZURE_LANGUAGE_API_VERSION") {
                Ok(value) if !value.is_empty() => value.parse()?,
                _ => ServiceVersion::LATEST,
            },
        };

        let credential = match self.credential {
            Some(credential) => credential,
            None => TextAnalyticsCredential::from_env()?,
        };

        Ok(TextAnalyticsClient {
            http,
            endpoint,
            credential,
            service_version,
            retry_policy: self.retry_policy.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ENDPOINT: &str = "https://test.cognitiveservices.azure.com";

    fn test_client() -> TextAnalyticsClient {
        TextAnalyticsClient::builder()
            .endpoint(ENDPOINT)
            .credential(TextAnalyticsCredential::api_key("test"))
            .service_version(ServiceVersion::V2023_04_01)
            .build()
            .expect("should build")
    }

    #[test]
    #[serial]
    fn builder_requires_endpoint() {
        std::env::remove_var("AZURE_LANGUAGE_ENDPOINT");

        let result = TextAnalyticsClient::builder()
            .credential(TextAnalyticsCredential::api_key("test"))
            .build();

        assert!(matches!(
            result.unwrap_err(),
            TextAnalyticsError::MissingConfig(_)
        ));
    }

    #[test]
    fn builder_accepts_endpoint() {
        assert_eq!(
            test_client().endpoint().as_str(),
            "https://test.cognitiveservices.azure.com/"
        );
    }

    #[test]
    #[serial]
    fn builder_uses_latest_version_by_default() {
        std::env::remove_var("AZURE_LANGUAGE_API_VERSION");

        let client = TextAnalyticsClient::builder()
            .endpoint(ENDPOINT)
            .credential(TextAnalyticsCredential::api_key("test"))
            .build()
            .expect("should build");

        assert_eq!(client.service_version(), ServiceVersion::LATEST);
    }

    #[test]
    #[serial]
    fn builder_reads_version_from_env() {
        let original = std::env::var("AZURE_LANGUAGE_API_VERSION").ok();
        std::env::set_var("AZURE_LANGUAGE_API_VERSION", "v3.1");

        let client = TextAnalyticsClient::builder()
            .endpoint(ENDPOINT)
            .credential(TextAnalyticsCredential::api_key("test"))
            .build()
            .expect("should build");
        assert_eq!(client.service_version(), ServiceVersion::V3_1);

        std::env::set_var("AZURE_LANGUAGE_API_VERSION", "1999-01-01");
        let result = TextAnalyticsClient::builder()
            .endpoint(ENDPOINT)
            .credential(TextAnalyticsCredential::api_key("test"))
            .build();
        assert!(matches!(
            result.unwrap_err(),
            TextAnalyticsError::Unsupported(_)
        ));

        match original {
            Some(val) => std::env::set_var("AZURE_LANGUAGE_API_VERSION", val),
            None => std::env::remove_var("AZURE_LANGUAGE_API_VERSION"),
        }
    }

    #[test]
    #[serial]
    fn builder_endpoint_overrides_env() {
        let original = std::env::var("AZURE_LANGUAGE_ENDPOINT").ok();
        std::env::set_var("AZURE_LANGUAGE_ENDPOINT", "https://env.cognitiveservices.azure.com");

        let client = TextAnalyticsClient::builder()
            .endpoint("https://explicit.cognitiveservices.azure.com")
            .credential(TextAnalyticsCredential::api_key("test"))
            .build()
            .expect("should build");

        assert_eq!(
            client.endpoint().as_str(),
            "https://explicit.cognitiveservices.azure.com/"
        );

        match original {
            Some(val) => std::env::set_var("AZURE_LANGUAGE_ENDPOINT", val),
            None => std::env::remove_var("AZURE_LANGUAGE_ENDPOINT"),
        }
    }

    #[test]
    fn builder_invalid_endpoint_url() {
        let result = TextAnalyticsClient::builder()
            .endpoint("not a valid url")
            .credential(TextAnalyticsCredential::api_key("test"))
            .build();

        assert!(matches!(
            result.unwrap_err(),
            TextAnalyticsError::InvalidEndpoint { .. }
        ));
    }

    #[test]
    fn url_joins_path_and_query() {
        let url = test_client()
            .url("/language/analyze-text/jobs?api-version=2023-04-01")
            .expect("should join");
        assert_eq!(
            url.as_str(),
            "https://test.cognitiveservices.azure.com/language/analyze-text/jobs?api-version=2023-04-01"
        );
    }

    #[test]
    fn identifies_retriable_http_errors() {
        for status in [429, 500, 502, 503, 504] {
            assert!(is_retriable_status(status), "{status} should retry");
        }
        for status in [200, 400, 401, 403, 404, 409] {
            assert!(!is_retriable_status(status), "{status} should not retry");
        }
    }

    #[test]
    fn backoff_grows_with_jitter_bounds() {
        let policy = RetryPolicy {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
        };
        for attempt in 0..3 {
            let base = Duration::from_millis(100) * 2_u32.pow(attempt);
            let backoff = policy.backoff(attempt);
            assert!(backoff >= base.mul_f64(0.75) && backoff <= base.mul_f64(1.25));
        }
    }

    // --- Wiremock integration tests ---

    fn setup_mock_client(server: &MockServer) -> TextAnalyticsClient {
        TextAnalyticsClient::builder()
            .endpoint(server.uri())
            .credential(TextAnalyticsCredential::api_key("test-api-key"))
            .retry_policy(RetryPolicy {
                max_retries: 2,
                initial_backoff: Duration::from_millis(1),
            })
            .build()
            .expect("should build client")
    }

    #[tokio::test]
    async fn get_sends_subscription_key() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/language/analyze-text/jobs/abc"))
            .and(header("Ocp-Apim-Subscription-Key", "test-api-key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "running"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = setup_mock_client(&server);
        let response = client
            .get("/language/analyze-text/jobs/abc")
            .await
            .expect("should succeed");

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["status"], "running");
    }

    #[tokio::test]
    async fn post_sends_json_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/language/analyze-text/jobs"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({"displayName": "job"})))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let client = setup_mock_client(&server);
        let response = client
            .post(
                "/language/analyze-text/jobs",
                &serde_json::json!({"displayName": "job"}),
            )
            .await
            .expect("should succeed");
        assert_eq!(response.status(), 202);
    }

    #[tokio::test]
    async fn delete_and_empty_post_succeed() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/text/analytics/v3.1/entities/health/jobs/abc"))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/language/analyze-text/jobs/abc:cancel"))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let client = setup_mock_client(&server);
        client
            .delete("/text/analytics/v3.1/entities/health/jobs/abc")
            .await
            .expect("delete should succeed");
        client
            .post_empty("/language/analyze-text/jobs/abc:cancel")
            .await
            .expect("post should succeed");
    }

    #[tokio::test]
    async fn service_error_body_becomes_http_error_with_code() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/language/analyze-text/jobs"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {
                    "code": "InvalidRequest",
                    "message": "Invalid document in request."
                }
            })))
            .mount(&server)
            .await;

        let client = setup_mock_client(&server);
        let err = client
            .post("/language/analyze-text/jobs", &serde_json::json!({}))
            .await
            .expect_err("should fail");

        match err {
            TextAnalyticsError::Http {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 400);
                assert_eq!(code.as_deref(), Some("InvalidRequest"));
                assert_eq!(message, "Invalid document in request.");
            }
            other => panic!("Expected Http error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn plain_text_error_body_is_kept() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&server)
            .await;

        let client = setup_mock_client(&server);
        let err = client.get("/missing").await.expect_err("should fail");

        assert!(err.is_transport());
        match err {
            TextAnalyticsError::Http {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 404);
                assert!(code.is_none());
                assert_eq!(message, "Not Found");
            }
            other => panic!("Expected Http error, got {other:?}"),
        }
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn get_retries_on_503_then_succeeds() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let client = setup_mock_client(&server);
        let response = client.get("/flaky").await.expect("should recover");
        assert_eq!(response.status(), 200);
        assert!(logs_contain("transient service error, retrying"));
        assert!(logs_contain("status=503"));
    }

    #[tokio::test]
    async fn retries_stop_after_max_attempts() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Too many requests"))
            .expect(3)
            .mount(&server)
            .await;

        let client = setup_mock_client(&server);
        let err = client.get("/down").await.expect_err("should give up");
        assert_eq!(err.status(), Some(429));
    }

    #[tokio::test]
    async fn request_times_out_with_configured_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("OK")
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = TextAnalyticsClient::builder()
            .endpoint(server.uri())
            .credential(TextAnalyticsCredential::api_key("test"))
            .read_timeout(Duration::from_millis(200))
            .build()
            .expect("should build");

        let err = client.get("/slow").await.expect_err("should time out");
        assert!(matches!(err, TextAnalyticsError::Request(_)));
        assert!(err.is_transport());
    }

    #[test]
    fn sanitization_removes_bearer_tokens() {
        let msg = "Authorization failed for Bearer eyJhbGciOiJIUzI1NiJ9.payload, retry";
        let sanitized = TextAnalyticsClient::sanitize_error_message(msg);
        assert!(!sanitized.contains("eyJhbGciOiJIUzI1NiJ9"));
        assert!(sanitized.contains("Bearer [REDACTED]"));
        assert!(sanitized.ends_with(", retry"));
    }

    #[test]
    fn sanitization_removes_subscription_keys() {
        let msg = "rejected Ocp-Apim-Subscription-Key: 0123456789abcdef and Bearer tok1 Bearer tok2";
        let sanitized = TextAnalyticsClient::sanitize_error_message(msg);
        assert!(!sanitized.contains("0123456789abcdef"));
        assert!(!sanitized.contains("tok1"));
        assert!(!sanitized.contains("tok2"));
        assert_eq!(sanitized.matches("[REDACTED]").count(), 3);
    }

    #[test]
    fn sanitization_preserves_legitimate_errors() {
        let msg = "Document text is empty.";
        assert_eq!(TextAnalyticsClient::sanitize_error_message(msg), msg);
    }

    #[test]
    fn truncation_applies_after_sanitization() {
        let msg = format!("Bearer secret {}", "x".repeat(2000));
        let truncated = TextAnalyticsClient::truncate_message(&msg);
        assert!(truncated.starts_with("Bearer [REDACTED]"));
        assert!(truncated.ends_with("... (truncated)"));
    }
}
