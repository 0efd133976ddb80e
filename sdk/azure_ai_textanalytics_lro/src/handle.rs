use azure_ai_textanalytics_core::error::{TextAnalyticsError, TextAnalyticsResult};

/// Opaque identifier of a submitted job.
///
/// Obtained once from the `Operation-Location` header and never changed; every
/// poll, cancel and fetch is keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle(String);

impl JobHandle {
    /// Wrap an identifier the caller already has (e.g. from a previous process run).
    pub fn new(id: impl Into<String>) -> TextAnalyticsResult<Self> {
        let id = id.into();
        if id.is_empty() || id.contains('/') || id.contains('?') {
            return Err(TextAnalyticsError::InvalidState(format!(
                "'{id}' is not a valid job id"
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the job id from an `Operation-Location` URL: the last path segment.
pub fn parse_operation_location(location: &str) -> TextAnalyticsResult<JobHandle> {
    let url = url::Url::parse(location).map_err(|e| {
        TextAnalyticsError::invalid_endpoint_with_source("failed to parse Operation-Location URL", e)
    })?;

    let id = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| {
            TextAnalyticsError::InvalidState(format!(
                "Operation-Location '{location}' has no job id segment"
            ))
        })?;

    JobHandle::new(id)
}
