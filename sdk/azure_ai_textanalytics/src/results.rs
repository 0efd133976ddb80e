//! Result models for every task kind.
//!
//! Each task's results arrive as a [`DocumentsPage`] of kind-specific
//! documents. Multi-task jobs decode into [`ActionResult`]s whose
//! [`TaskResults`] variant is chosen from the task's wire `kind`.

use azure_ai_textanalytics_core::error::{TextAnalyticsError, TextAnalyticsResult};
use azure_ai_textanalytics_core::models::{
    BatchStatistics, DocumentError, DocumentStatistics, TextAnalyticsWarning,
};
use azure_ai_textanalytics_lro::OperationState;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::tasks::TaskKind;

// ---------------------------------------------------------------------------
// Shared pieces
// ---------------------------------------------------------------------------

/// The documents of one task, plus batch-level metadata.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "D: Deserialize<'de>"))]
pub struct DocumentsPage<D> {
    #[serde(default)]
    pub documents: Vec<D>,
    /// Documents the service could not process.
    #[serde(default)]
    pub errors: Vec<DocumentError>,
    pub statistics: Option<BatchStatistics>,
    pub model_version: Option<String>,
}

/// Document types that can be the items of a single-task job.
pub trait TaskDocumentKind: DeserializeOwned + Send + 'static {
    /// Task kinds whose results decode into this document type.
    const KINDS: &'static [TaskKind];
}

/// An entity with a category, as found by entity recognition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizedEntity {
    pub text: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub offset: u32,
    pub length: u32,
    pub confidence_score: f64,
}

// ---------------------------------------------------------------------------
// Entities, PII, key phrases, linking
// ---------------------------------------------------------------------------

/// Entity recognition result for one document (prebuilt or custom model).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizeEntitiesDocument {
    pub id: String,
    pub entities: Vec<CategorizedEntity>,
    #[serde(default)]
    pub warnings: Vec<TextAnalyticsWarning>,
    pub statistics: Option<DocumentStatistics>,
}

impl TaskDocumentKind for RecognizeEntitiesDocument {
    const KINDS: &'static [TaskKind] =
        &[TaskKind::EntityRecognition, TaskKind::CustomEntityRecognition];
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PiiEntitiesDocument {
    pub id: String,
    /// The input text with every detected entity masked.
    pub redacted_text: String,
    pub entities: Vec<CategorizedEntity>,
    #[serde(default)]
    pub warnings: Vec<TextAnalyticsWarning>,
    pub statistics: Option<DocumentStatistics>,
}

impl TaskDocumentKind for PiiEntitiesDocument {
    const KINDS: &'static [TaskKind] = &[TaskKind::PiiEntityRecognition];
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPhrasesDocument {
    pub id: String,
    pub key_phrases: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<TextAnalyticsWarning>,
    pub statistics: Option<DocumentStatistics>,
}

impl TaskDocumentKind for KeyPhrasesDocument {
    const KINDS: &'static [TaskKind] = &[TaskKind::KeyPhraseExtraction];
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedEntityMatch {
    pub text: String,
    pub offset: u32,
    pub length: u32,
    pub confidence_score: f64,
}

/// An entity resolved against a knowledge base.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedEntity {
    pub name: String,
    pub matches: Vec<LinkedEntityMatch>,
    pub language: String,
    /// Id in the data source.
    pub id: Option<String>,
    pub url: String,
    pub data_source: String,
    pub bing_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedEntitiesDocument {
    pub id: String,
    pub entities: Vec<LinkedEntity>,
    #[serde(default)]
    pub warnings: Vec<TextAnalyticsWarning>,
    pub statistics: Option<DocumentStatistics>,
}

impl TaskDocumentKind for LinkedEntitiesDocument {
    const KINDS: &'static [TaskKind] = &[TaskKind::EntityLinking];
}

// ---------------------------------------------------------------------------
// Sentiment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SentimentConfidenceScores {
    pub positive: f64,
    #[serde(default)]
    pub neutral: f64,
    pub negative: f64,
}

/// A link from a target to the assessment describing it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRelation {
    pub relation_type: String,
    /// JSON pointer to the related target or assessment.
    #[serde(rename = "ref")]
    pub reference: String,
}

/// The subject of an opinion (e.g. "food" in "the food was great").
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceTarget {
    pub text: String,
    pub sentiment: Sentiment,
    pub confidence_scores: SentimentConfidenceScores,
    pub offset: u32,
    pub length: u32,
    #[serde(default)]
    pub relations: Vec<TargetRelation>,
}

/// The opinion about a target (e.g. "great").
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceAssessment {
    pub text: String,
    pub sentiment: Sentiment,
    pub confidence_scores: SentimentConfidenceScores,
    pub offset: u32,
    pub length: u32,
    #[serde(default)]
    pub is_negated: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceSentiment {
    pub text: String,
    pub sentiment: Sentiment,
    pub confidence_scores: SentimentConfidenceScores,
    pub offset: u32,
    pub length: u32,
    /// Present only with opinion mining.
    #[serde(default)]
    pub targets: Vec<SentenceTarget>,
    #[serde(default)]
    pub assessments: Vec<SentenceAssessment>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentDocument {
    pub id: String,
    pub sentiment: Sentiment,
    pub confidence_scores: SentimentConfidenceScores,
    pub sentences: Vec<SentenceSentiment>,
    #[serde(default)]
    pub warnings: Vec<TextAnalyticsWarning>,
    pub statistics: Option<DocumentStatistics>,
}

impl TaskDocumentKind for SentimentDocument {
    const KINDS: &'static [TaskKind] = &[TaskKind::SentimentAnalysis];
}

// ---------------------------------------------------------------------------
// Summarization
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarySentence {
    pub text: String,
    pub rank_score: f64,
    pub offset: u32,
    pub length: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractiveSummaryDocument {
    pub id: String,
    pub sentences: Vec<SummarySentence>,
    #[serde(default)]
    pub warnings: Vec<TextAnalyticsWarning>,
    pub statistics: Option<DocumentStatistics>,
}

impl TaskDocumentKind for ExtractiveSummaryDocument {
    const KINDS: &'static [TaskKind] = &[TaskKind::ExtractiveSummarization];
}

/// The span of input a generated summary was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SummaryContext {
    pub offset: u32,
    pub length: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AbstractiveSummary {
    pub text: String,
    #[serde(default)]
    pub contexts: Vec<SummaryContext>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbstractiveSummaryDocument {
    pub id: String,
    pub summaries: Vec<AbstractiveSummary>,
    #[serde(default)]
    pub warnings: Vec<TextAnalyticsWarning>,
    pub statistics: Option<DocumentStatistics>,
}

impl TaskDocumentKind for AbstractiveSummaryDocument {
    const KINDS: &'static [TaskKind] = &[TaskKind::AbstractiveSummarization];
}

// ---------------------------------------------------------------------------
// Custom classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationCategory {
    pub category: String,
    pub confidence_score: f64,
}

/// Single- or multi-label classification result for one document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyDocument {
    pub id: String,
    #[serde(rename = "class")]
    pub classifications: Vec<ClassificationCategory>,
    #[serde(default)]
    pub warnings: Vec<TextAnalyticsWarning>,
    pub statistics: Option<DocumentStatistics>,
}

impl TaskDocumentKind for ClassifyDocument {
    const KINDS: &'static [TaskKind] = &[
        TaskKind::CustomSingleLabelClassification,
        TaskKind::CustomMultiLabelClassification,
    ];
}

// ---------------------------------------------------------------------------
// Healthcare
// ---------------------------------------------------------------------------

/// Qualifiers of a healthcare entity (e.g. negated, hypothetical).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthcareAssertion {
    pub conditionality: Option<String>,
    pub certainty: Option<String>,
    pub association: Option<String>,
}

/// An entry for the entity in a medical knowledge base (e.g. UMLS).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDataSource {
    pub data_source: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthcareEntity {
    pub text: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub offset: u32,
    pub length: u32,
    pub confidence_score: f64,
    pub assertion: Option<HealthcareAssertion>,
    /// Normalized name of the entity.
    pub name: Option<String>,
    #[serde(default)]
    pub links: Vec<EntityDataSource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthcareRelationEntity {
    /// JSON pointer to the entity, e.g. `#/results/documents/0/entities/1`.
    #[serde(rename = "ref")]
    pub reference: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthcareRelation {
    pub relation_type: String,
    pub entities: Vec<HealthcareRelationEntity>,
    pub confidence_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthcareEntitiesDocument {
    pub id: String,
    pub entities: Vec<HealthcareEntity>,
    #[serde(default)]
    pub relations: Vec<HealthcareRelation>,
    /// FHIR bundle, when one was requested (Language API only).
    pub fhir_bundle: Option<serde_json::Value>,
    #[serde(default)]
    pub warnings: Vec<TextAnalyticsWarning>,
    pub statistics: Option<DocumentStatistics>,
}

impl TaskDocumentKind for HealthcareEntitiesDocument {
    const KINDS: &'static [TaskKind] = &[TaskKind::Healthcare];
}

// ---------------------------------------------------------------------------
// Multi-task results
// ---------------------------------------------------------------------------

/// The results of one task, typed by its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskResults {
    EntityRecognition(DocumentsPage<RecognizeEntitiesDocument>),
    PiiEntityRecognition(DocumentsPage<PiiEntitiesDocument>),
    KeyPhraseExtraction(DocumentsPage<KeyPhrasesDocument>),
    EntityLinking(DocumentsPage<LinkedEntitiesDocument>),
    SentimentAnalysis(DocumentsPage<SentimentDocument>),
    ExtractiveSummarization(DocumentsPage<ExtractiveSummaryDocument>),
    AbstractiveSummarization(DocumentsPage<AbstractiveSummaryDocument>),
    CustomEntityRecognition(DocumentsPage<RecognizeEntitiesDocument>),
    CustomSingleLabelClassification(DocumentsPage<ClassifyDocument>),
    CustomMultiLabelClassification(DocumentsPage<ClassifyDocument>),
    Healthcare(DocumentsPage<HealthcareEntitiesDocument>),
}

macro_rules! each_page {
    ($results:expr, $page:ident => $body:expr) => {
        match $results {
            TaskResults::EntityRecognition($page) => $body,
            TaskResults::PiiEntityRecognition($page) => $body,
            TaskResults::KeyPhraseExtraction($page) => $body,
            TaskResults::EntityLinking($page) => $body,
            TaskResults::SentimentAnalysis($page) => $body,
            TaskResults::ExtractiveSummarization($page) => $body,
            TaskResults::AbstractiveSummarization($page) => $body,
            TaskResults::CustomEntityRecognition($page) => $body,
            TaskResults::CustomSingleLabelClassification($page) => $body,
            TaskResults::CustomMultiLabelClassification($page) => $body,
            TaskResults::Healthcare($page) => $body,
        }
    };
}

impl TaskResults {
    /// Decode the `results` object of a task of the given kind.
    pub fn decode(kind: TaskKind, results: serde_json::Value) -> TextAnalyticsResult<Self> {
        Ok(match kind {
            TaskKind::EntityRecognition => Self::EntityRecognition(serde_json::from_value(results)?),
            TaskKind::PiiEntityRecognition => {
                Self::PiiEntityRecognition(serde_json::from_value(results)?)
            }
            TaskKind::KeyPhraseExtraction => {
                Self::KeyPhraseExtraction(serde_json::from_value(results)?)
            }
            TaskKind::EntityLinking => Self::EntityLinking(serde_json::from_value(results)?),
            TaskKind::SentimentAnalysis => Self::SentimentAnalysis(serde_json::from_value(results)?),
            TaskKind::ExtractiveSummarization => {
                Self::ExtractiveSummarization(serde_json::from_value(results)?)
            }
            TaskKind::AbstractiveSummarization => {
                Self::AbstractiveSummarization(serde_json::from_value(results)?)
            }
            TaskKind::CustomEntityRecognition => {
                Self::CustomEntityRecognition(serde_json::from_value(results)?)
            }
            TaskKind::CustomSingleLabelClassification => {
                Self::CustomSingleLabelClassification(serde_json::from_value(results)?)
            }
            TaskKind::CustomMultiLabelClassification => {
                Self::CustomMultiLabelClassification(serde_json::from_value(results)?)
            }
            TaskKind::Healthcare => Self::Healthcare(serde_json::from_value(results)?),
        })
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            Self::EntityRecognition(_) => TaskKind::EntityRecognition,
            Self::PiiEntityRecognition(_) => TaskKind::PiiEntityRecognition,
            Self::KeyPhraseExtraction(_) => TaskKind::KeyPhraseExtraction,
            Self::EntityLinking(_) => TaskKind::EntityLinking,
            Self::SentimentAnalysis(_) => TaskKind::SentimentAnalysis,
            Self::ExtractiveSummarization(_) => TaskKind::ExtractiveSummarization,
            Self::AbstractiveSummarization(_) => TaskKind::AbstractiveSummarization,
            Self::CustomEntityRecognition(_) => TaskKind::CustomEntityRecognition,
            Self::CustomSingleLabelClassification(_) => TaskKind::CustomSingleLabelClassification,
            Self::CustomMultiLabelClassification(_) => TaskKind::CustomMultiLabelClassification,
            Self::Healthcare(_) => TaskKind::Healthcare,
        }
    }

    /// Number of successfully processed documents.
    pub fn document_count(&self) -> usize {
        each_page!(self, page => page.documents.len())
    }

    pub fn document_errors(&self) -> &[DocumentError] {
        each_page!(self, page => &page.errors)
    }

    pub fn statistics(&self) -> Option<BatchStatistics> {
        each_page!(self, page => page.statistics)
    }

    pub fn model_version(&self) -> Option<&str> {
        each_page!(self, page => page.model_version.as_deref())
    }
}

/// One task of a multi-task job.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResult {
    pub kind: TaskKind,
    pub task_name: Option<String>,
    pub state: OperationState,
    pub last_updated_at: Option<DateTime<Utc>>,
    /// `None` for a task that produced no results (e.g. it failed).
    pub results: Option<TaskResults>,
}

impl ActionResult {
    pub fn is_error(&self) -> bool {
        self.state == OperationState::Failed
    }

    pub(crate) fn from_raw(
        kind: TaskKind,
        raw: RawTaskItem,
        job_state: &OperationState,
    ) -> TextAnalyticsResult<Self> {
        let results = raw
            .results
            .map(|value| TaskResults::decode(kind, value))
            .transpose()?;
        Ok(Self {
            kind,
            task_name: raw.task_name,
            state: raw.status.unwrap_or_else(|| job_state.clone()),
            last_updated_at: raw.last_update_date_time,
            results,
        })
    }
}

/// A task item as it appears in a status body, before its kind is resolved.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawTaskItem {
    /// Result kind (Language API only; legacy items are keyed by their list).
    pub kind: Option<String>,
    pub task_name: Option<String>,
    #[serde(alias = "lastUpdatedDateTime")]
    pub last_update_date_time: Option<DateTime<Utc>>,
    #[serde(alias = "state")]
    pub status: Option<OperationState>,
    pub results: Option<serde_json::Value>,
}

impl RawTaskItem {
    /// Resolve the Language API result kind.
    pub(crate) fn language_kind(&self) -> TextAnalyticsResult<TaskKind> {
        let raw = self.kind.as_deref().ok_or_else(|| {
            TextAnalyticsError::InvalidState("task result has no kind".into())
        })?;
        TaskKind::from_result_kind(raw).ok_or_else(|| {
            TextAnalyticsError::InvalidState(format!("unknown task result kind '{raw}'"))
        })
    }
}
