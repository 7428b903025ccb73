//! Detailed Project Report generator
//!
//! Turns a short project brief into a report package:
//! - Narrative document (Markdown) with one section per outline heading
//! - One-page HTML summary embedding the projection chart
//! - CSV spreadsheet of the five-year financial projection
//!
//! PIPELINE:
//! BRIEF → CLASSIFY → OUTLINE → PROJECT → FILL → CHART / SPREADSHEET → NARRATIVE → SUMMARY
//!
//! Every artifact of a run reads the same `FinancialProjection`, so the
//! numbers agree across formats.

pub mod audit;
pub mod chart;
pub mod classifier;
pub mod config;
pub mod content;
pub mod context;
pub mod document;
pub mod error;
pub mod finance;
pub mod gemini;
pub mod models;
pub mod orchestrator;
pub mod spreadsheet;
pub mod templates;

pub use error::{DprError, FailureReport, Result, Stage};

// Re-export common types
pub use models::*;
pub use classifier::{KeywordClassifier, ProjectClassifier};
pub use config::PipelineConfig;
pub use orchestrator::Orchestrator;
