#![doc = include_str!("../README.md")]

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod version;

pub use error::{TextAnalyticsError, TextAnalyticsResult};
pub use version::ServiceVersion;

/// Helpers for sibling crates' tests, enabled with the `test-support` feature.
#[cfg(feature = "test-support")]
pub mod test_support {
    use crate::auth::TextAnalyticsCredential;
    use crate::client::{RetryPolicy, TextAnalyticsClient};
    use crate::version::ServiceVersion;
    use std::time::Duration;
    use wiremock::MockServer;

    /// Test API key (not a real key).
    pub const TEST_API_KEY: &str = "test-api-key";

    /// Create a client pointed at a mock server, with fast retries.
    pub fn setup_mock_client(server: &MockServer, version: ServiceVersion) -> TextAnalyticsClient {
        TextAnalyticsClient::builder()
            .endpoint(server.uri())
            .credential(TextAnalyticsCredential::api_key(TEST_API_KEY))
            .service_version(version)
            .retry_policy(RetryPolicy {
                max_retries: 1,
                initial_backoff: Duration::from_millis(1),
            })
            .build()
            .expect("should build client")
    }
}
