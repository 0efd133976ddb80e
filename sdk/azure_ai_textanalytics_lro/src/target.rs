//! Parsing of batch error targets (`#/tasks/<taskName>/<index>`).
//!
//! The legacy Analyze API and the Language API name their task lists
//! differently, so each generation gets its own vocabulary. The scheme is
//! picked from the configured service version; the two are never merged.

use azure_ai_textanalytics_core::error::{BatchError, TaskTarget};
use azure_ai_textanalytics_core::models::ServiceError;
use azure_ai_textanalytics_core::version::{ApiFamily, ServiceVersion};

const TARGET_PREFIX: &str = "#/tasks/";

const LEGACY_TASK_NAMES: &[&str] = &[
    "entityRecognitionTasks",
    "entityRecognitionPiiTasks",
    "keyPhraseExtractionTasks",
    "entityLinkingTasks",
    "sentimentAnalysisTasks",
    "extractiveSummarizationTasks",
    "customEntityRecognitionTasks",
    "customSingleClassificationTasks",
    "customMultiClassificationTasks",
];

// The Language API may not use this target format at all for every task;
// targets that do not match stay unparsed rather than being guessed at.
const LANGUAGE_TASK_NAMES: &[&str] = &[
    "entityRecognitionTasks",
    "entityRecognitionPiiTasks",
    "keyPhraseExtractionTasks",
    "entityLinkingTasks",
    "sentimentAnalysisTasks",
    "extractiveSummarizationTasks",
    "abstractiveSummarizationTasks",
    "customEntityRecognitionTasks",
    "customSingleLabelClassificationTasks",
    "customMultiLabelClassificationTasks",
    "healthcareTasks",
];

/// Which task-name vocabulary error targets are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorTargetScheme {
    Legacy,
    Language,
}

impl ErrorTargetScheme {
    pub fn for_version(version: ServiceVersion) -> Self {
        match version.family() {
            ApiFamily::Legacy => Self::Legacy,
            ApiFamily::Language => Self::Language,
        }
    }

    /// Task list names this scheme recognises.
    pub fn task_names(self) -> &'static [&'static str] {
        match self {
            Self::Legacy => LEGACY_TASK_NAMES,
            Self::Language => LANGUAGE_TASK_NAMES,
        }
    }

    /// Parse `#/tasks/<taskName>/<index>`; `None` for anything else.
    pub fn parse(self, target: &str) -> Option<TaskTarget> {
        let rest = target.strip_prefix(TARGET_PREFIX)?;
        let (task_name, index) = rest.split_once('/')?;

        if !self.task_names().contains(&task_name) {
            return None;
        }
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        Some(TaskTarget {
            task_name: task_name.to_string(),
            task_index: index.parse().ok()?,
        })
    }

    /// Convert service errors into [`BatchError`]s, resolving targets where possible.
    pub fn batch_errors(self, errors: &[ServiceError]) -> Vec<BatchError> {
        errors
            .iter()
            .map(|error| BatchError {
                code: error.code.clone(),
                message: error.message.clone(),
                target: error.target.clone(),
                task: error.target.as_deref().and_then(|t| self.parse(t)),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entity_recognition_target() {
        let target = ErrorTargetScheme::Legacy
            .parse("#/tasks/entityRecognitionTasks/2")
            .expect("should parse");
        assert_eq!(target.task_name, "entityRecognitionTasks");
        assert_eq!(target.task_index, 2);

        let target = ErrorTargetScheme::Language
            .parse("#/tasks/entityRecognitionTasks/2")
            .expect("should parse");
        assert_eq!(target.task_index, 2);
    }

    #[test]
    fn vocabularies_stay_separate() {
        assert!(ErrorTargetScheme::Legacy
            .parse("#/tasks/customSingleClassificationTasks/0")
            .is_some());
        assert!(ErrorTargetScheme::Language
            .parse("#/tasks/customSingleClassificationTasks/0")
            .is_none());
        assert!(ErrorTargetScheme::Language
            .parse("#/tasks/abstractiveSummarizationTasks/1")
            .is_some());
        assert!(ErrorTargetScheme::Legacy
            .parse("#/tasks/abstractiveSummarizationTasks/1")
            .is_none());
    }

    #[test]
    fn rejects_malformed_targets() {
        let scheme = ErrorTargetScheme::Legacy;
        for target in [
            "",
            "#/tasks/",
            "#/tasks/entityRecognitionTasks",
            "#/tasks/entityRecognitionTasks/",
            "#/tasks/entityRecognitionTasks/-1",
            "#/tasks/entityRecognitionTasks/1/extra",
            "#/documents/0",
            "tasks/entityRecognitionTasks/1",
        ] {
            assert!(scheme.parse(target).is_none(), "{target:?} should not parse");
        }
    }

    #[test]
    fn scheme_follows_service_version() {
        assert_eq!(
            ErrorTargetScheme::for_version(ServiceVersion::V3_1),
            ErrorTargetScheme::Legacy
        );
        assert_eq!(
            ErrorTargetScheme::for_version(ServiceVersion::V2023_04_01),
            ErrorTargetScheme::Language
        );
    }

    #[test]
    fn batch_errors_keep_unparsed_targets() {
        let errors = vec![
            ServiceError {
                code: "InvalidArgument".into(),
                message: "bad task".into(),
                target: Some("#/tasks/keyPhraseExtractionTasks/0".into()),
                inner_error: None,
            },
            ServiceError {
                code: "InternalServerError".into(),
                message: "oops".into(),
                target: Some("#/somewhere/else".into()),
                inner_error: None,
            },
        ];

        let batch = ErrorTargetScheme::Legacy.batch_errors(&errors);
        assert_eq!(
            batch[0].task,
            Some(TaskTarget {
                task_name: "keyPhraseExtractionTasks".into(),
                task_index: 0
            })
        );
        assert_eq!(batch[1].task, None);
        assert_eq!(batch[1].target.as_deref(), Some("#/somewhere/else"));
    }
}
