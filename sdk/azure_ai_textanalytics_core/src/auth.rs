use crate::error::{TextAnalyticsError, TextAnalyticsResult};
use azure_core::credentials::TokenCredential;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

/// OAuth scope for Cognitive Services data-plane calls.
pub const COGNITIVE_SERVICES_SCOPE: &str = "https://cognitiveservices.azure.com/.default";

/// Header carrying a resource key.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Credential types supported by the Text Analytics SDK.
#[derive(Clone)]
pub enum TextAnalyticsCredential {
    /// Resource key authentication, sent as `Ocp-Apim-Subscription-Key`.
    ApiKey(SecretString),

    /// Microsoft Entra ID token authentication through any `azure_identity` credential.
    TokenCredential(Arc<dyn TokenCredential>),
}

/// A resolved authentication header.
#[derive(Clone)]
pub struct AuthHeader {
    pub name: &'static str,
    pub value: String,
}

impl std::fmt::Debug for AuthHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthHeader({}: ****)", self.name)
    }
}

impl TextAnalyticsCredential {
    /// Create a credential from the `AZURE_LANGUAGE_KEY` environment variable.
    /// Falls back to the Azure CLI credential if the variable is not set.
    pub fn from_env() -> TextAnalyticsResult<Self> {
        match std::env::var("AZURE_LANGUAGE_KEY") {
            Ok(key) if !key.is_empty() => Ok(Self::ApiKey(SecretString::from(key))),
            _ => Self::azure_cli(),
        }
    }

    /// Create a resource key credential.
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::ApiKey(SecretString::from(key.into()))
    }

    /// Use the identity the Azure CLI is logged in with.
    pub fn azure_cli() -> TextAnalyticsResult<Self> {
        let credential = azure_identity::AzureCliCredential::new(None)
            .map_err(|e| TextAnalyticsError::Auth(format!("Azure CLI credential: {e}")))?;
        Ok(Self::TokenCredential(credential))
    }

    /// Wrap any token credential (service principal, managed identity, ...).
    pub fn token_credential(credential: Arc<dyn TokenCredential>) -> Self {
        Self::TokenCredential(credential)
    }

    /// Resolve the credential to the header the service expects.
    pub async fn resolve(&self) -> TextAnalyticsResult<AuthHeader> {
        match self {
            Self::ApiKey(key) => Ok(AuthHeader {
                name: SUBSCRIPTION_KEY_HEADER,
                value: key.expose_secret().to_string(),
            }),
            Self::TokenCredential(credential) => {
                let token = credential
                    .get_token(&[COGNITIVE_SERVICES_SCOPE], None)
                    .await
                    .map_err(|e| TextAnalyticsError::Auth(e.to_string()))?;
                Ok(AuthHeader {
                    name: "Authorization",
                    value: format!("Bearer {}", token.token.secret()),
                })
            }
        }
    }
}

impl std::fmt::Debug for TextAnalyticsCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => write!(f, "TextAnalyticsCredential::ApiKey(****)"),
            Self::TokenCredential(_) => write!(f, "TextAnalyticsCredential::TokenCredential"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn api_key_resolves_to_subscription_header() {
        let header = TextAnalyticsCredential::api_key("secret-key")
            .resolve()
            .await
            .expect("should resolve");
        assert_eq!(header.name, SUBSCRIPTION_KEY_HEADER);
        assert_eq!(header.value, "secret-key");
    }

    #[test]
    fn debug_never_prints_the_key() {
        let credential = TextAnalyticsCredential::api_key("secret-key");
        let printed = format!("{credential:?}");
        assert!(!printed.contains("secret-key"));

        let header = AuthHeader {
            name: SUBSCRIPTION_KEY_HEADER,
            value: "secret-key".into(),
        };
        assert!(!format!("{header:?}").contains("secret-key"));
    }
}
