//! Report orchestrator - runs the pipeline for one brief
//!
//! VALIDATE → CLASSIFY → OUTLINE → CONTEXT → PROJECT → FILL →
//! NAMESPACE → CHART → SPREADSHEET → NARRATIVE → SUMMARY → MANIFEST

use crate::audit::{compute_brief_hash, write_manifest, RunManifest};
use crate::chart;
use crate::classifier::{KeywordClassifier, ProjectClassifier};
use crate::config::PipelineConfig;
use crate::content::SectionContentProvider;
use crate::context::{self, ContextDataSource};
use crate::document::{self, NarrativeHeader};
use crate::error::{DprError, Stage};
use crate::finance;
use crate::models::{Artifact, ArtifactKind, ProjectBrief, ReportPackage};
use crate::spreadsheet;
use crate::templates::TemplateRegistry;
use crate::Result;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

pub mod namespace;
pub use namespace::Namespace;

/// Artifacts written so far in one run
#[derive(Debug, Default)]
pub(crate) struct RunTracker {
    completed: Vec<Artifact>,
}

impl RunTracker {
    /// Run one write stage; on failure, report it with everything completed before it
    pub(crate) fn stage<F>(&mut self, stage: Stage, kind: ArtifactKind, path: &Path, write: F) -> Result<()>
    where
        F: FnOnce(&Path) -> Result<()>,
    {
        match write(path) {
            Ok(()) => {
                debug!(stage = %stage, path = %path.display(), "Stage complete");
                self.completed.push(Artifact {
                    kind,
                    path: path.to_path_buf(),
                });
                Ok(())
            }
            Err(e) => {
                error!(stage = %stage, error = %e, completed = self.completed.len(), "Stage failed");
                Err(DprError::StageFailed {
                    stage,
                    message: e.to_string(),
                    completed: self.completed.clone(),
                })
            }
        }
    }

    pub(crate) fn completed(&self) -> &[Artifact] {
        &self.completed
    }
}

/// Main orchestrator that sequences the report pipeline
pub struct Orchestrator {
    classifier: Box<dyn ProjectClassifier>,
    content: SectionContentProvider,
    context_source: Arc<dyn ContextDataSource>,
    config: PipelineConfig,
}

impl Orchestrator {
    pub fn new(
        classifier: Box<dyn ProjectClassifier>,
        content: SectionContentProvider,
        context_source: Arc<dyn ContextDataSource>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            classifier,
            content,
            context_source,
            config,
        }
    }

    /// Keyword classifier, generative sections when a key is set, context per config
    pub fn from_config(config: PipelineConfig) -> Self {
        let content = SectionContentProvider::from_config(&config);
        let context_source = context::source_from_config(&config);

        Self::new(Box::new(KeywordClassifier), content, context_source, config)
    }

    pub fn output_root(&self) -> &Path {
        &self.config.output_root
    }

    /// Generate the full package for one brief
    pub async fn generate(&self, brief: &ProjectBrief) -> Result<ReportPackage> {
        let start_time = Instant::now();

        brief.validate()?;

        info!(title = %brief.title, "Generating report package");

        let project_type = self.classifier.classify(&brief.short_description);
        let outline = TemplateRegistry::lookup(project_type);
        debug!(project_type = %project_type, template = outline.name, "Outline selected");

        let location = brief.location.as_deref().unwrap_or_default();
        let site_context =
            context::resolve(self.context_source.as_ref(), location, self.config.context_timeout).await;

        let (projection, meta) = finance::project(brief);
        finance::ensure_finite(&projection, &meta)?;

        let content = self.content.fill(&outline, brief).await;

        let ns = namespace::allocate(&self.config.output_root, self.config.namespace_retries)
            .map_err(|e| match e {
                collision @ DprError::NamespaceCollision(_) => collision,
                other => DprError::StageFailed {
                    stage: Stage::Namespace,
                    message: other.to_string(),
                    completed: Vec::new(),
                },
            })?;

        info!(uid = %ns.uid, dir = %ns.dir.display(), "Namespace allocated");

        let chart_path = ns.chart_path();
        let spreadsheet_path = ns.spreadsheet_path();
        let narrative_path = ns.narrative_path();
        let summary_path = ns.summary_path();
        let manifest_path = ns.manifest_path();
        let generated_at = Utc::now();

        let mut tracker = RunTracker::default();

        tracker.stage(Stage::Chart, ArtifactKind::Chart, &chart_path, |path| {
            chart::render(&projection, path)
        })?;

        tracker.stage(Stage::Spreadsheet, ArtifactKind::Spreadsheet, &spreadsheet_path, |path| {
            spreadsheet::export(&projection, path)
        })?;

        let header = NarrativeHeader {
            template_name: outline.name,
            project_type,
            context: &site_context,
            generated_at,
        };
        tracker.stage(Stage::Narrative, ArtifactKind::Narrative, &narrative_path, |path| {
            document::build_narrative(brief, &content, &projection, &meta, &header, path)
        })?;

        tracker.stage(Stage::Summary, ArtifactKind::Summary, &summary_path, |path| {
            document::build_summary(&narrative_path, &chart_path, path)
        })?;

        let package = ReportPackage {
            uid: ns.uid.clone(),
            project_type,
            template_name: outline.name.to_string(),
            narrative: narrative_path.clone(),
            summary: summary_path.clone(),
            spreadsheet: spreadsheet_path.clone(),
            chart: chart_path.clone(),
            manifest: manifest_path.clone(),
            brief_hash: compute_brief_hash(brief),
            generated_at,
        };

        let manifest = RunManifest {
            package: package.clone(),
            brief: brief.clone(),
            artifacts: tracker.completed().to_vec(),
            projection,
            meta,
        };
        tracker.stage(Stage::Manifest, ArtifactKind::Manifest, &manifest_path, |path| {
            write_manifest(&manifest, path)
        })?;

        info!(
            uid = %package.uid,
            project_type = %package.project_type,
            artifacts = tracker.completed().len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Report package complete"
        );

        Ok(package)
    }
}

/// Directory holding every artifact of a package
pub fn package_dir(package: &ReportPackage) -> Option<PathBuf> {
    package.narrative.parent().map(Path::to_path_buf)
}
