use thiserror::Error;

/// A `#/tasks/<taskName>/<index>` error target resolved to the sub-task it names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTarget {
    /// The task list name as it appears on the wire (e.g. `entityRecognitionTasks`).
    pub task_name: String,
    /// Zero-based index into that task list.
    pub task_index: usize,
}

/// One entry of the error list reported by a completed batch job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchError {
    /// Service error code.
    pub code: String,
    /// Human-readable description.
    pub message: String,
    /// Raw JSON-pointer style target, if the service sent one.
    pub target: Option<String>,
    /// The sub-task the target points at, when it could be parsed.
    pub task: Option<TaskTarget>,
}

impl std::fmt::Display for BatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(task) = &self.task {
            write!(f, " (task {}[{}])", task.task_name, task.task_index)?;
        } else if let Some(target) = &self.target {
            write!(f, " (target {target})")?;
        }
        Ok(())
    }
}

fn summarize(errors: &[BatchError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur when interacting with the Text Analytics service.
#[derive(Error, Debug)]
pub enum TextAnalyticsError {
    /// The service answered with a non-success HTTP status.
    #[error("HTTP error: {status} - {message}")]
    Http {
        status: u16,
        /// Service error code from the response body, when one was present.
        code: Option<String>,
        message: String,
    },

    /// The HTTP request failed at the transport level.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// A request or response payload could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The endpoint URL is invalid.
    #[error("Invalid endpoint URL: {message}")]
    InvalidEndpoint {
        message: String,
        #[source]
        source: Option<url::ParseError>,
    },

    /// A required configuration value is missing.
    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    /// A local I/O failure, such as building the blocking runtime.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A request builder was given invalid input.
    #[error("Invalid request: {0}")]
    Builder(String),

    /// The operation is not available for this task kind or service version.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// A completed job reported batch-level errors.
    #[error("batch job reported {} error(s): {}", errors.len(), summarize(errors))]
    BatchResult { errors: Vec<BatchError> },

    /// A response arrived in a shape the client does not recognize.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The polling driver ran out of attempts before the job finished.
    #[error("operation did not complete after {attempts} poll attempts")]
    PollTimeout { attempts: u32 },
}

impl TextAnalyticsError {
    /// Build an [`TextAnalyticsError::Http`] without a service error code.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            code: None,
            message: message.into(),
        }
    }

    /// Build an [`TextAnalyticsError::InvalidEndpoint`] that keeps the parse error as its source.
    pub fn invalid_endpoint_with_source(message: impl Into<String>, source: url::ParseError) -> Self {
        Self::InvalidEndpoint {
            message: format!("{}: {source}", message.into()),
            source: Some(source),
        }
    }

    /// `true` for failures reaching or reading a response (HTTP status or transport).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::Request(_))
    }

    /// The HTTP status code, when the error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The batch errors carried by a [`TextAnalyticsError::BatchResult`].
    pub fn batch_errors(&self) -> Option<&[BatchError]> {
        match self {
            Self::BatchResult { errors } => Some(errors),
            _ => None,
        }
    }
}

/// Result type alias for Text Analytics operations.
pub type TextAnalyticsResult<T> = std::result::Result<T, TextAnalyticsError>;
