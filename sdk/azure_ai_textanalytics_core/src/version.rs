//! Service API versions and the REST generation each one belongs to.

use crate::error::{TextAnalyticsError, TextAnalyticsResult};

/// A Text Analytics / Language service API version.
///
/// Versions are ordered oldest to newest, so gating a feature is a plain
/// comparison: `configured >= required`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ServiceVersion {
    /// Legacy Text Analytics REST API v3.1 (`/text/analytics/v3.1`).
    V3_1,
    /// Language API `2022-05-01` (`/language/analyze-text`).
    V2022_05_01,
    /// Language API `2023-04-01` (`/language/analyze-text`).
    V2023_04_01,
}

/// The two REST generations the SDK speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFamily {
    /// The original "Analyze" API with versioned URL paths.
    Legacy,
    /// The "Language / AnalyzeText" jobs API with an `api-version` query parameter.
    Language,
}

impl ServiceVersion {
    /// The newest version this SDK knows about.
    pub const LATEST: Self = Self::V2023_04_01;

    /// The version string as the service spells it.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V3_1 => "v3.1",
            Self::V2022_05_01 => "2022-05-01",
            Self::V2023_04_01 => "2023-04-01",
        }
    }

    /// Which REST generation this version belongs to.
    pub fn family(self) -> ApiFamily {
        match self {
            Self::V3_1 => ApiFamily::Legacy,
            Self::V2022_05_01 | Self::V2023_04_01 => ApiFamily::Language,
        }
    }

    /// `true` for the legacy `/text/analytics` API.
    pub fn is_legacy(self) -> bool {
        self.family() == ApiFamily::Legacy
    }

    /// Fail with [`TextAnalyticsError::Unsupported`] unless this version is at least `required`.
    pub fn require(self, required: ServiceVersion, feature: &str) -> TextAnalyticsResult<()> {
        if self >= required {
            Ok(())
        } else {
            Err(TextAnalyticsError::Unsupported(format!(
                "{feature} requires service version {} or newer, configured {}",
                required.as_str(),
                self.as_str()
            )))
        }
    }
}

impl Default for ServiceVersion {
    fn default() -> Self {
        Self::LATEST
    }
}

impl std::fmt::Display for ServiceVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ServiceVersion {
    type Err = TextAnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "v3.1" | "3.1" => Ok(Self::V3_1),
            "2022-05-01" => Ok(Self::V2022_05_01),
            "2023-04-01" => Ok(Self::V2023_04_01),
            other => Err(TextAnalyticsError::Unsupported(format!(
                "unknown service version '{other}'"
            ))),
        }
    }
}
