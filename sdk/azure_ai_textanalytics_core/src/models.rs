//! Wire types shared by every Text Analytics task and API generation.

use serde::{Deserialize, Serialize};

/// One document of a batch submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDocumentInput {
    /// Caller-chosen unique id within the batch.
    pub id: String,
    /// The text to analyze.
    pub text: String,
    /// ISO 639-1 language hint (e.g. `en`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl TextDocumentInput {
    /// Create a document without a language hint.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            language: None,
        }
    }

    /// Set the language hint.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// The `analysisInput` wrapper both job APIs expect.
#[derive(Debug, Clone, Serialize)]
pub struct MultiLanguageAnalysisInput<'a> {
    pub documents: &'a [TextDocumentInput],
}

/// Aggregate statistics for a batch, returned when `showStats=true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStatistics {
    pub documents_count: u32,
    pub valid_documents_count: u32,
    pub erroneous_documents_count: u32,
    #[serde(default)]
    pub transactions_count: u64,
}

/// Per-document statistics, returned when `showStats=true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStatistics {
    pub characters_count: u32,
    pub transactions_count: u32,
}

/// An error object as the service reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceError {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// More specific error, when the service provides one.
    #[serde(
        default,
        rename = "innererror",
        skip_serializing_if = "Option::is_none"
    )]
    pub inner_error: Option<Box<ServiceError>>,
}

impl ServiceError {
    /// The innermost error in the chain; its code is the most specific.
    pub fn innermost(&self) -> &ServiceError {
        let mut current = self;
        while let Some(inner) = current.inner_error.as_deref() {
            current = inner;
        }
        current
    }
}

/// An error attached to one document rather than to the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentError {
    pub id: String,
    pub error: ServiceError,
}

/// A non-fatal warning attached to a document result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAnalyticsWarning {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub target_ref: Option<String>,
}
