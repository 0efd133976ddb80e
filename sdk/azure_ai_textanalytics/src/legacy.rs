//! Adapters for the legacy Text Analytics v3.1 job endpoints.
//!
//! v3.1 has two long-running APIs:
//!
//! - `/analyze`, which runs several actions grouped into per-kind task lists
//!   ([`LegacyAnalyzeActionsAdapter`]). It cannot be cancelled.
//! - `/entities/health/jobs`, which runs healthcare entity recognition
//!   ([`LegacyHealthcareAdapter`]). It is cancelled with `DELETE`.

use std::collections::BTreeMap;

use azure_ai_textanalytics_core::client::TextAnalyticsClient;
use azure_ai_textanalytics_core::error::{TextAnalyticsError, TextAnalyticsResult};
use azure_ai_textanalytics_core::models::MultiLanguageAnalysisInput;
use azure_ai_textanalytics_core::version::ServiceVersion;
use azure_ai_textanalytics_lro::{
    CancelCall, JobEnvelope, JobHandle, LroAdapter, LroPoller, PageContent, SubmitRequest,
    TaskProgress,
};
use serde::{Deserialize, Serialize};

use crate::results::{ActionResult, DocumentsPage, HealthcareEntitiesDocument, RawTaskItem};
use crate::tasks::{HealthcareOptions, TaskKind, TaskSpec};

const ANALYZE_PATH: &str = "/text/analytics/v3.1/analyze";
const HEALTH_JOBS_PATH: &str = "/text/analytics/v3.1/entities/health/jobs";

fn require_legacy(version: ServiceVersion) -> TextAnalyticsResult<()> {
    if version.is_legacy() {
        Ok(())
    } else {
        Err(TextAnalyticsError::Unsupported(format!(
            "the v3.1 job endpoints are not available on service version {version}; use the Language adapters"
        )))
    }
}

// ---------------------------------------------------------------------------
// Analyze
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeJobRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
    analysis_input: MultiLanguageAnalysisInput<'a>,
    tasks: BTreeMap<&'static str, Vec<serde_json::Value>>,
}

/// The `tasks` section of a v3.1 analyze status: counters plus one array per
/// task list (`entityRecognitionTasks`, `sentimentAnalysisTasks`, ...).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyTasks {
    #[serde(default)]
    pub completed: u32,
    #[serde(default)]
    pub failed: u32,
    #[serde(default)]
    pub in_progress: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(flatten)]
    pub(crate) lists: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LegacyAnalyzeBody {
    pub tasks: Option<LegacyTasks>,
}

/// Several actions over one batch on the v3.1 `/analyze` endpoint.
///
/// Only the kinds v3.1 groups into task lists can run here; see
/// [`TaskKind::legacy_task_list`].
#[derive(Debug, Clone)]
pub struct LegacyAnalyzeActionsAdapter {
    version: ServiceVersion,
    tasks: Vec<TaskSpec>,
}

impl LegacyAnalyzeActionsAdapter {
    pub fn new(version: ServiceVersion, tasks: Vec<TaskSpec>) -> TextAnalyticsResult<Self> {
        require_legacy(version)?;
        if tasks.is_empty() {
            return Err(TextAnalyticsError::Builder(
                "at least one task is required".into(),
            ));
        }
        if let Some(task) = tasks.iter().find(|t| t.kind().legacy_task_list().is_none()) {
            return Err(TextAnalyticsError::Unsupported(format!(
                "{} cannot run as a v3.1 analyze action",
                task.kind()
            )));
        }
        Ok(Self { version, tasks })
    }

    pub fn tasks(&self) -> &[TaskSpec] {
        &self.tasks
    }
}

impl LroAdapter for LegacyAnalyzeActionsAdapter {
    type Body = LegacyAnalyzeBody;
    type Item = ActionResult;

    fn operation_name(&self) -> &'static str {
        "analyze-actions-v3.1"
    }

    fn service_version(&self) -> ServiceVersion {
        self.version
    }

    fn submit_path(&self) -> String {
        ANALYZE_PATH.to_string()
    }

    fn build_submit_request(&self, request: &SubmitRequest) -> TextAnalyticsResult<serde_json::Value> {
        let mut lists: BTreeMap<&'static str, Vec<serde_json::Value>> = BTreeMap::new();
        for task in &self.tasks {
            let kind = task.kind();
            let list = kind.legacy_task_list().ok_or_else(|| {
                TextAnalyticsError::Unsupported(format!("{kind} cannot run as a v3.1 analyze action"))
            })?;
            lists.entry(list).or_default().push(task.to_legacy_task()?);
        }

        Ok(serde_json::to_value(AnalyzeJobRequest {
            display_name: request.display_name.as_deref(),
            analysis_input: MultiLanguageAnalysisInput {
                documents: &request.documents,
            },
            tasks: lists,
        })?)
    }

    fn status_path(&self, handle: &JobHandle) -> String {
        format!("{ANALYZE_PATH}/jobs/{handle}")
    }

    fn cancel_call(&self, _handle: &JobHandle) -> Option<CancelCall> {
        None
    }

    fn task_progress(&self, envelope: &JobEnvelope<LegacyAnalyzeBody>) -> TaskProgress {
        envelope
            .body
            .tasks
            .as_ref()
            .map(|t| TaskProgress {
                total: t.total,
                succeeded: t.completed,
                failed: t.failed,
                in_progress: t.in_progress,
            })
            .unwrap_or_default()
    }

    /// Items come back grouped by task list, in [`TaskKind`] order and by
    /// index within each list.
    fn extract_result_page(
        &self,
        envelope: JobEnvelope<LegacyAnalyzeBody>,
    ) -> TextAnalyticsResult<PageContent<ActionResult>> {
        let JobEnvelope {
            status,
            statistics,
            body,
            ..
        } = envelope;

        let mut grouped = Vec::new();
        for (list, value) in body.tasks.map(|t| t.lists).unwrap_or_default() {
            let kind = TaskKind::from_legacy_task_list(&list).ok_or_else(|| {
                TextAnalyticsError::InvalidState(format!("unknown task list '{list}'"))
            })?;
            let raw: Vec<RawTaskItem> = serde_json::from_value(value)?;
            grouped.push((kind, raw));
        }
        grouped.sort_by_key(|(kind, _)| *kind);

        let items = grouped
            .into_iter()
            .flat_map(|(kind, raw)| raw.into_iter().map(move |item| (kind, item)))
            .map(|(kind, item)| ActionResult::from_raw(kind, item, &status))
            .collect::<TextAnalyticsResult<Vec<_>>>()?;

        Ok(PageContent {
            items,
            statistics,
            ..PageContent::default()
        })
    }
}

// ---------------------------------------------------------------------------
// Healthcare
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LegacyHealthcareBody {
    pub results: Option<DocumentsPage<HealthcareEntitiesDocument>>,
}

/// Healthcare entity recognition on the v3.1 `/entities/health/jobs` endpoint.
///
/// Task options travel as query parameters; the body carries only documents.
#[derive(Debug, Clone)]
pub struct LegacyHealthcareAdapter {
    version: ServiceVersion,
    options: HealthcareOptions,
}

impl LegacyHealthcareAdapter {
    /// # Errors
    ///
    /// [`TextAnalyticsError::Unsupported`] for a non-legacy `version` or when a
    /// FHIR bundle is requested, which v3.1 cannot produce.
    pub fn new(version: ServiceVersion, options: HealthcareOptions) -> TextAnalyticsResult<Self> {
        require_legacy(version)?;
        if options.fhir_version.is_some() {
            return Err(TextAnalyticsError::Unsupported(
                "FHIR bundles require the Language API".into(),
            ));
        }
        Ok(Self { version, options })
    }
}

impl LroAdapter for LegacyHealthcareAdapter {
    type Body = LegacyHealthcareBody;
    type Item = HealthcareEntitiesDocument;

    fn operation_name(&self) -> &'static str {
        "healthcare-v3.1"
    }

    fn service_version(&self) -> ServiceVersion {
        self.version
    }

    fn submit_path(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        if let Some(model) = &self.options.model.model_version {
            query.append_pair("model-version", model);
        }
        query.append_pair(
            "stringIndexType",
            self.options.string_index_type.as_str(),
        );
        if let Some(opt_out) = self.options.model.logging_opt_out {
            query.append_pair("loggingOptOut", if opt_out { "true" } else { "false" });
        }
        format!("{HEALTH_JOBS_PATH}?{}", query.finish())
    }

    fn build_submit_request(&self, request: &SubmitRequest) -> TextAnalyticsResult<serde_json::Value> {
        Ok(serde_json::to_value(MultiLanguageAnalysisInput {
            documents: &request.documents,
        })?)
    }

    fn status_path(&self, handle: &JobHandle) -> String {
        format!("{HEALTH_JOBS_PATH}/{handle}")
    }

    fn cancel_call(&self, handle: &JobHandle) -> Option<CancelCall> {
        Some(CancelCall::Delete(format!("{HEALTH_JOBS_PATH}/{handle}")))
    }

    fn task_progress(&self, envelope: &JobEnvelope<LegacyHealthcareBody>) -> TaskProgress {
        TaskProgress::single(&envelope.status)
    }

    fn extract_result_page(
        &self,
        envelope: JobEnvelope<LegacyHealthcareBody>,
    ) -> TextAnalyticsResult<PageContent<HealthcareEntitiesDocument>> {
        let Some(page) = envelope.body.results else {
            return Ok(PageContent {
                statistics: envelope.statistics,
                ..PageContent::default()
            });
        };

        Ok(PageContent {
            items: page.documents,
            document_errors: page.errors,
            statistics: page.statistics.or(envelope.statistics),
            model_version: page.model_version,
        })
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

#[tracing::instrument(
    name = "textanalytics::legacy::begin_analyze_actions",
    skip(client, request, tasks),
    fields(tasks = tasks.len())
)]
pub async fn begin_analyze_actions(
    client: &TextAnalyticsClient,
    request: &SubmitRequest,
    tasks: Vec<TaskSpec>,
) -> TextAnalyticsResult<(LroPoller<LegacyAnalyzeActionsAdapter>, JobHandle)> {
    let adapter = LegacyAnalyzeActionsAdapter::new(client.service_version(), tasks)?;
    crate::start(client, adapter, request).await
}

#[tracing::instrument(
    name = "textanalytics::legacy::begin_analyze_healthcare_entities",
    skip(client, request, options)
)]
pub async fn begin_analyze_healthcare_entities(
    client: &TextAnalyticsClient,
    request: &SubmitRequest,
    options: HealthcareOptions,
) -> TextAnalyticsResult<(LroPoller<LegacyHealthcareAdapter>, JobHandle)> {
    let adapter = LegacyHealthcareAdapter::new(client.service_version(), options)?;
    crate::start(client, adapter, request).await
}
