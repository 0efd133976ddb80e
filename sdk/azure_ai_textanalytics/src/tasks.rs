//! Task kinds and the actions a batch job can run.
//!
//! A [`TaskSpec`] names one action (with its options) inside a job. Both REST
//! generations are served from the same value: the Language API takes a list
//! of `{kind, taskName, parameters}` objects, the legacy analyze API groups
//! tasks into per-kind lists such as `entityRecognitionTasks`.

use azure_ai_textanalytics_core::error::{TextAnalyticsError, TextAnalyticsResult};
use azure_ai_textanalytics_core::version::ServiceVersion;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Task kinds
// ---------------------------------------------------------------------------

/// Every kind of task the batch APIs can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskKind {
    EntityRecognition,
    PiiEntityRecognition,
    KeyPhraseExtraction,
    EntityLinking,
    SentimentAnalysis,
    ExtractiveSummarization,
    AbstractiveSummarization,
    CustomEntityRecognition,
    CustomSingleLabelClassification,
    CustomMultiLabelClassification,
    Healthcare,
}

impl TaskKind {
    pub const ALL: [TaskKind; 11] = [
        Self::EntityRecognition,
        Self::PiiEntityRecognition,
        Self::KeyPhraseExtraction,
        Self::EntityLinking,
        Self::SentimentAnalysis,
        Self::ExtractiveSummarization,
        Self::AbstractiveSummarization,
        Self::CustomEntityRecognition,
        Self::CustomSingleLabelClassification,
        Self::CustomMultiLabelClassification,
        Self::Healthcare,
    ];

    /// The Language API `kind` of a submitted task.
    pub fn language_kind(self) -> &'static str {
        match self {
            Self::EntityRecognition => "EntityRecognition",
            Self::PiiEntityRecognition => "PiiEntityRecognition",
            Self::KeyPhraseExtraction => "KeyPhraseExtraction",
            Self::EntityLinking => "EntityLinking",
            Self::SentimentAnalysis => "SentimentAnalysis",
            Self::ExtractiveSummarization => "ExtractiveSummarization",
            Self::AbstractiveSummarization => "AbstractiveSummarization",
            Self::CustomEntityRecognition => "CustomEntityRecognition",
            Self::CustomSingleLabelClassification => "CustomSingleLabelClassification",
            Self::CustomMultiLabelClassification => "CustomMultiLabelClassification",
            Self::Healthcare => "Healthcare",
        }
    }

    /// The Language API `kind` of the task's result item.
    pub fn result_kind(self) -> &'static str {
        match self {
            Self::EntityRecognition => "EntityRecognitionLROResults",
            Self::PiiEntityRecognition => "PiiEntityRecognitionLROResults",
            Self::KeyPhraseExtraction => "KeyPhraseExtractionLROResults",
            Self::EntityLinking => "EntityLinkingLROResults",
            Self::SentimentAnalysis => "SentimentAnalysisLROResults",
            Self::ExtractiveSummarization => "ExtractiveSummarizationLROResults",
            Self::AbstractiveSummarization => "AbstractiveSummarizationLROResults",
            Self::CustomEntityRecognition => "CustomEntityRecognitionLROResults",
            Self::CustomSingleLabelClassification => "CustomSingleLabelClassificationLROResults",
            Self::CustomMultiLabelClassification => "CustomMultiLabelClassificationLROResults",
            Self::Healthcare => "HealthcareLROResults",
        }
    }

    /// Inverse of [`result_kind`](Self::result_kind); `None` for kinds this SDK does not know.
    pub fn from_result_kind(kind: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.result_kind() == kind)
    }

    /// The task list this kind is submitted in on the legacy v3.1 analyze API,
    /// `None` when v3.1 cannot run it as an action.
    pub fn legacy_task_list(self) -> Option<&'static str> {
        match self {
            Self::EntityRecognition => Some("entityRecognitionTasks"),
            Self::PiiEntityRecognition => Some("entityRecognitionPiiTasks"),
            Self::KeyPhraseExtraction => Some("keyPhraseExtractionTasks"),
            Self::EntityLinking => Some("entityLinkingTasks"),
            Self::SentimentAnalysis => Some("sentimentAnalysisTasks"),
            _ => None,
        }
    }

    /// Inverse of [`legacy_task_list`](Self::legacy_task_list).
    pub fn from_legacy_task_list(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.legacy_task_list() == Some(name))
    }

    /// Oldest service version that can run this kind.
    pub fn min_version(self) -> ServiceVersion {
        match self {
            Self::EntityRecognition
            | Self::PiiEntityRecognition
            | Self::KeyPhraseExtraction
            | Self::EntityLinking
            | Self::SentimentAnalysis
            | Self::Healthcare => ServiceVersion::V3_1,
            Self::ExtractiveSummarization
            | Self::CustomEntityRecognition
            | Self::CustomSingleLabelClassification
            | Self::CustomMultiLabelClassification => ServiceVersion::V2022_05_01,
            Self::AbstractiveSummarization => ServiceVersion::V2023_04_01,
        }
    }

    /// Fail with [`TextAnalyticsError::Unsupported`] if `version` cannot run this kind.
    pub fn check_version(self, version: ServiceVersion) -> TextAnalyticsResult<()> {
        version.require(self.min_version(), self.language_kind())
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.language_kind())
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// How the service measures `offset` and `length` in results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum StringIndexType {
    /// Offsets count Unicode scalar values, matching `str::chars`.
    #[default]
    UnicodeCodePoint,
    Utf16CodeUnit,
    #[serde(rename = "TextElement_v8")]
    TextElementV8,
}

impl StringIndexType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnicodeCodePoint => "UnicodeCodePoint",
            Self::Utf16CodeUnit => "Utf16CodeUnit",
            Self::TextElementV8 => "TextElement_v8",
        }
    }
}

/// PII detection domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PiiDomain {
    /// Protected health information.
    Phi,
    None,
}

/// Ordering of extracted summary sentences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SummarySortOrder {
    /// Order of appearance in the document.
    Offset,
    /// Descending rank score.
    Rank,
}

/// Options every prebuilt model accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelOptions {
    /// Model version, e.g. `latest` or `2022-10-01`.
    pub model_version: Option<String>,
    /// Ask the service not to log input text.
    pub logging_opt_out: Option<bool>,
}

impl ModelOptions {
    pub fn model_version(mut self, version: impl Into<String>) -> Self {
        self.model_version = Some(version.into());
        self
    }

    pub fn logging_opt_out(mut self, opt_out: bool) -> Self {
        self.logging_opt_out = Some(opt_out);
        self
    }
}

/// Options for entity recognition and entity linking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntitiesOptions {
    pub model: ModelOptions,
    pub string_index_type: StringIndexType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PiiOptions {
    pub model: ModelOptions,
    pub string_index_type: StringIndexType,
    pub domain: Option<PiiDomain>,
    /// Restrict detection to these categories (e.g. `USSocialSecurityNumber`).
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentimentOptions {
    pub model: ModelOptions,
    pub string_index_type: StringIndexType,
    /// Return target/assessment pairs per sentence.
    pub opinion_mining: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractiveSummaryOptions {
    pub model: ModelOptions,
    pub string_index_type: StringIndexType,
    pub sentence_count: Option<u32>,
    pub order_by: Option<SummarySortOrder>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbstractiveSummaryOptions {
    pub model: ModelOptions,
    pub string_index_type: StringIndexType,
    /// Approximate length of each summary, in sentences.
    pub sentence_count: Option<u32>,
}

/// A deployed custom model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomOptions {
    pub project_name: String,
    pub deployment_name: String,
    pub logging_opt_out: Option<bool>,
    pub string_index_type: StringIndexType,
}

impl CustomOptions {
    pub fn new(project_name: impl Into<String>, deployment_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            deployment_name: deployment_name.into(),
            logging_opt_out: None,
            string_index_type: StringIndexType::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthcareOptions {
    pub model: ModelOptions,
    pub string_index_type: StringIndexType,
    /// Also return a FHIR bundle (Language API only), e.g. `4.0.1`.
    pub fhir_version: Option<String>,
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// One action with its options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    RecognizeEntities(EntitiesOptions),
    RecognizePiiEntities(PiiOptions),
    ExtractKeyPhrases(ModelOptions),
    RecognizeLinkedEntities(EntitiesOptions),
    AnalyzeSentiment(SentimentOptions),
    ExtractiveSummary(ExtractiveSummaryOptions),
    AbstractiveSummary(AbstractiveSummaryOptions),
    RecognizeCustomEntities(CustomOptions),
    SingleLabelClassify(CustomOptions),
    MultiLabelClassify(CustomOptions),
    AnalyzeHealthcareEntities(HealthcareOptions),
}

impl TaskAction {
    pub fn kind(&self) -> TaskKind {
        match self {
            Self::RecognizeEntities(_) => TaskKind::EntityRecognition,
            Self::RecognizePiiEntities(_) => TaskKind::PiiEntityRecognition,
            Self::ExtractKeyPhrases(_) => TaskKind::KeyPhraseExtraction,
            Self::RecognizeLinkedEntities(_) => TaskKind::EntityLinking,
            Self::AnalyzeSentiment(_) => TaskKind::SentimentAnalysis,
            Self::ExtractiveSummary(_) => TaskKind::ExtractiveSummarization,
            Self::AbstractiveSummary(_) => TaskKind::AbstractiveSummarization,
            Self::RecognizeCustomEntities(_) => TaskKind::CustomEntityRecognition,
            Self::SingleLabelClassify(_) => TaskKind::CustomSingleLabelClassification,
            Self::MultiLabelClassify(_) => TaskKind::CustomMultiLabelClassification,
            Self::AnalyzeHealthcareEntities(_) => TaskKind::Healthcare,
        }
    }

    fn parameters(&self) -> TaskParameters<'_> {
        fn model<'a>(options: &'a ModelOptions) -> TaskParameters<'a> {
            TaskParameters {
                model_version: options.model_version.as_deref(),
                logging_opt_out: options.logging_opt_out,
                ..TaskParameters::default()
            }
        }

        match self {
            Self::ExtractKeyPhrases(o) => model(o),
            Self::RecognizeEntities(o) | Self::RecognizeLinkedEntities(o) => TaskParameters {
                string_index_type: Some(o.string_index_type),
                ..model(&o.model)
            },
            Self::RecognizePiiEntities(o) => TaskParameters {
                string_index_type: Some(o.string_index_type),
                domain: o.domain,
                pii_categories: (!o.categories.is_empty()).then_some(o.categories.as_slice()),
                ..model(&o.model)
            },
            Self::AnalyzeSentiment(o) => TaskParameters {
                string_index_type: Some(o.string_index_type),
                opinion_mining: o.opinion_mining.then_some(true),
                ..model(&o.model)
            },
            Self::ExtractiveSummary(o) => TaskParameters {
                string_index_type: Some(o.string_index_type),
                sentence_count: o.sentence_count,
                sort_by: o.order_by,
                ..model(&o.model)
            },
            Self::AbstractiveSummary(o) => TaskParameters {
                string_index_type: Some(o.string_index_type),
                sentence_count: o.sentence_count,
                ..model(&o.model)
            },
            Self::RecognizeCustomEntities(o)
            | Self::SingleLabelClassify(o)
            | Self::MultiLabelClassify(o) => TaskParameters {
                project_name: Some(&o.project_name),
                deployment_name: Some(&o.deployment_name),
                logging_opt_out: o.logging_opt_out,
                string_index_type: Some(o.string_index_type),
                ..TaskParameters::default()
            },
            Self::AnalyzeHealthcareEntities(o) => TaskParameters {
                string_index_type: Some(o.string_index_type),
                fhir_version: o.fhir_version.as_deref(),
                ..model(&o.model)
            },
        }
    }
}

/// An action plus an optional caller-chosen task name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub task_name: Option<String>,
    pub action: TaskAction,
}

impl TaskSpec {
    pub fn new(action: TaskAction) -> Self {
        Self {
            task_name: None,
            action,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.task_name = Some(name.into());
        self
    }

    pub fn kind(&self) -> TaskKind {
        self.action.kind()
    }

    /// The task object of a Language API submission.
    pub fn to_language_task(&self) -> TextAnalyticsResult<serde_json::Value> {
        let task = LanguageTask {
            kind: self.kind().language_kind(),
            task_name: self.task_name.as_deref(),
            parameters: self.action.parameters(),
        };
        Ok(serde_json::to_value(task)?)
    }

    /// The task object of a legacy v3.1 submission, for its task list.
    /// v3.1 spells the model version `model-version`.
    pub fn to_legacy_task(&self) -> TextAnalyticsResult<serde_json::Value> {
        let mut parameters = serde_json::to_value(self.action.parameters())?;
        if let Some(map) = parameters.as_object_mut() {
            if let Some(version) = map.remove("modelVersion") {
                map.insert("model-version".into(), version);
            }
        }

        let mut task = serde_json::Map::new();
        if let Some(name) = &self.task_name {
            task.insert("taskName".into(), name.clone().into());
        }
        task.insert("parameters".into(), parameters);
        Ok(task.into())
    }
}

impl From<TaskAction> for TaskSpec {
    fn from(action: TaskAction) -> Self {
        Self::new(action)
    }
}

/// Validate a task list against a service version.
pub(crate) fn check_tasks(tasks: &[TaskSpec], version: ServiceVersion) -> TextAnalyticsResult<()> {
    if tasks.is_empty() {
        return Err(TextAnalyticsError::Builder(
            "at least one task is required".into(),
        ));
    }
    for task in tasks {
        task.kind().check_version(version)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskParameters<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model_version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    logging_opt_out: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    string_index_type: Option<StringIndexType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    domain: Option<PiiDomain>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pii_categories: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    opinion_mining: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sentence_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort_by: Option<SummarySortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deployment_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fhir_version: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LanguageTask<'a> {
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    task_name: Option<&'a str>,
    parameters: TaskParameters<'a>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn result_kinds_round_trip() {
        for kind in TaskKind::ALL {
            assert_eq!(TaskKind::from_result_kind(kind.result_kind()), Some(kind));
        }
        assert_eq!(TaskKind::from_result_kind("SomethingNewLROResults"), None);
    }

    #[test]
    fn legacy_task_lists_round_trip() {
        for kind in TaskKind::ALL {
            if let Some(list) = kind.legacy_task_list() {
                assert_eq!(TaskKind::from_legacy_task_list(list), Some(kind));
            }
        }
        assert_eq!(TaskKind::AbstractiveSummarization.legacy_task_list(), None);
        assert_eq!(TaskKind::Healthcare.legacy_task_list(), None);
    }

    #[test]
    fn version_gating() {
        assert!(TaskKind::EntityRecognition
            .check_version(ServiceVersion::V3_1)
            .is_ok());
        assert!(TaskKind::ExtractiveSummarization
            .check_version(ServiceVersion::V2022_05_01)
            .is_ok());

        let err = TaskKind::AbstractiveSummarization
            .check_version(ServiceVersion::V2022_05_01)
            .unwrap_err();
        assert!(matches!(err, TextAnalyticsError::Unsupported(_)));
        assert!(err.to_string().contains("AbstractiveSummarization"));
        assert!(err.to_string().contains("2023-04-01"));
    }

    #[test]
    fn language_task_with_defaults() {
        let task = TaskSpec::new(TaskAction::RecognizeEntities(EntitiesOptions::default()))
            .to_language_task()
            .unwrap();
        assert_eq!(
            task,
            json!({
                "kind": "EntityRecognition",
                "parameters": { "stringIndexType": "UnicodeCodePoint" }
            })
        );
    }

    #[test]
    fn language_task_with_options() {
        let spec = TaskSpec::new(TaskAction::RecognizePiiEntities(PiiOptions {
            model: ModelOptions::default().model_version("latest"),
            string_index_type: StringIndexType::Utf16CodeUnit,
            domain: Some(PiiDomain::Phi),
            categories: vec!["USSocialSecurityNumber".into()],
        }))
        .named("pii");

        let task = spec.to_language_task().unwrap();
        assert_eq!(task["kind"], "PiiEntityRecognition");
        assert_eq!(task["taskName"], "pii");
        assert_eq!(
            task["parameters"],
            json!({
                "modelVersion": "latest",
                "stringIndexType": "Utf16CodeUnit",
                "domain": "phi",
                "piiCategories": ["USSocialSecurityNumber"]
            })
        );
    }

    #[test]
    fn summary_and_custom_parameters() {
        let task = TaskSpec::new(TaskAction::ExtractiveSummary(ExtractiveSummaryOptions {
            sentence_count: Some(3),
            order_by: Some(SummarySortOrder::Rank),
            ..Default::default()
        }))
        .to_language_task()
        .unwrap();
        assert_eq!(task["parameters"]["sentenceCount"], 3);
        assert_eq!(task["parameters"]["sortBy"], "Rank");

        let task = TaskSpec::new(TaskAction::SingleLabelClassify(CustomOptions::new(
            "proj", "prod",
        )))
        .to_language_task()
        .unwrap();
        assert_eq!(task["kind"], "CustomSingleLabelClassification");
        assert_eq!(task["parameters"]["projectName"], "proj");
        assert_eq!(task["parameters"]["deploymentName"], "prod");
    }

    #[test]
    fn legacy_task_uses_dashed_model_version() {
        let task = TaskSpec::new(TaskAction::AnalyzeSentiment(SentimentOptions {
            model: ModelOptions::default().model_version("latest"),
            opinion_mining: true,
            ..Default::default()
        }))
        .named("sentiment")
        .to_legacy_task()
        .unwrap();

        assert_eq!(
            task,
            json!({
                "taskName": "sentiment",
                "parameters": {
                    "model-version": "latest",
                    "stringIndexType": "UnicodeCodePoint",
                    "opinionMining": true
                }
            })
        );
    }

    #[test]
    fn check_tasks_requires_tasks() {
        let err = check_tasks(&[], ServiceVersion::LATEST).unwrap_err();
        assert!(matches!(err, TextAnalyticsError::Builder(_)));
    }
}
