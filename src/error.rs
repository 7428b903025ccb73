//! Error types for the report generator

use crate::models::Artifact;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, DprError>;

/// Pipeline stage, used to name where a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Validate,
    Namespace,
    Chart,
    Spreadsheet,
    Narrative,
    Summary,
    Manifest,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Validate => "validate",
            Stage::Namespace => "namespace",
            Stage::Chart => "chart",
            Stage::Spreadsheet => "spreadsheet",
            Stage::Narrative => "narrative",
            Stage::Summary => "summary",
            Stage::Manifest => "manifest",
        };
        write!(f, "{}", s)
    }
}

#[derive(Error, Debug)]
pub enum DprError {

    // =============================
    // Core Pipeline Errors
    // =============================

    #[error("Invalid brief: {0}")]
    InvalidBrief(String),

    #[error("External data unavailable: {0}")]
    ExternalData(String),

    #[error("Generative text error: {0}")]
    GenerativeText(String),

    #[error("Namespace collision: {0}")]
    NamespaceCollision(String),

    #[error("{stage} stage failed: {message} ({} artifact(s) completed)", .completed.len())]
    StageFailed {
        stage: Stage,
        message: String,
        completed: Vec<Artifact>,
    },

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

/// Serializable account of a failed run
#[derive(Debug, Serialize)]
pub struct FailureReport<'a> {
    pub stage: Option<Stage>,
    pub message: String,
    pub completed: &'a [Artifact],
}

impl DprError {
    /// Stage a failure is attributed to, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            DprError::InvalidBrief(_) => Some(Stage::Validate),
            DprError::NamespaceCollision(_) => Some(Stage::Namespace),
            DprError::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Artifacts that were fully written before the failure
    pub fn completed_artifacts(&self) -> &[Artifact] {
        match self {
            DprError::StageFailed { completed, .. } => completed,
            _ => &[],
        }
    }

    pub fn report(&self) -> FailureReport<'_> {
        FailureReport {
            stage: self.stage(),
            message: self.to_string(),
            completed: self.completed_artifacts(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArtifactKind;
    use std::path::PathBuf;

    #[test]
    fn test_stage_failed_reports_completed() {
        let err = DprError::StageFailed {
            stage: Stage::Narrative,
            message: "permission denied".to_string(),
            completed: vec![Artifact {
                kind: ArtifactKind::Chart,
                path: PathBuf::from("out/abc_finance.png"),
            }],
        };

        assert_eq!(err.stage(), Some(Stage::Narrative));
        assert_eq!(err.completed_artifacts().len(), 1);
        assert!(err.to_string().contains("narrative stage failed"));
    }

    #[test]
    fn test_invalid_brief_is_validate_stage() {
        let err = DprError::InvalidBrief("title is required".to_string());
        assert_eq!(err.stage(), Some(Stage::Validate));
        assert!(err.completed_artifacts().is_empty());
    }

    #[test]
    fn test_failure_report_serialization() {
        let err = DprError::StageFailed {
            stage: Stage::Summary,
            message: "disk full".to_string(),
            completed: vec![Artifact {
                kind: ArtifactKind::Chart,
                path: PathBuf::from("out/abc_finance.png"),
            }],
        };

        let json = serde_json::to_value(err.report()).unwrap();
        assert_eq!(json["stage"], "summary");
        assert_eq!(json["completed"].as_array().unwrap().len(), 1);
        assert!(json["message"].as_str().unwrap().contains("disk full"));

        let plain = serde_json::to_value(DprError::ExternalData("down".to_string()).report()).unwrap();
        assert!(plain["stage"].is_null());
    }
}
