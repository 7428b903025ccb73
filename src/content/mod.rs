//! Section content provider
//!
//! Fills every outline section with body text. The strategy is chosen once:
//! generative (external text service) or placeholder. A generative failure
//! only degrades its own section to a placeholder.

use crate::config::PipelineConfig;
use crate::gemini::GeminiClient;
use crate::models::{ProjectBrief, SectionContent, SectionContentMap, SectionOutline};
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

pub mod gemini;
pub use gemini::GeminiSectionWriter;

/// Marker that opens every placeholder body
pub const PLACEHOLDER_MARKER: &str = "[Auto-generated section:";

/// Writes the body of one section
#[async_trait]
pub trait SectionWriter: Send + Sync {
    async fn write_section(&self, section: &str, brief: &ProjectBrief) -> Result<String>;
}

/// Deterministic templated body
pub fn placeholder(section: &str, brief: &ProjectBrief) -> String {
    format!(
        "{} {}]\n\nProject: {}\nDescription: {}\n\n(Replace with real content or connect a text-generation service)",
        PLACEHOLDER_MARKER, section, brief.title, brief.short_description
    )
}

pub enum ContentStrategy {
    Generative(Arc<dyn SectionWriter>),
    Placeholder,
}

pub struct SectionContentProvider {
    strategy: ContentStrategy,
    section_timeout: Duration,
}

impl SectionContentProvider {
    pub fn new(strategy: ContentStrategy, section_timeout: Duration) -> Self {
        Self {
            strategy,
            section_timeout,
        }
    }

    pub fn placeholder_only() -> Self {
        Self::new(ContentStrategy::Placeholder, Duration::from_secs(1))
    }

    /// Generative when a credential is configured, placeholder otherwise
    pub fn from_config(config: &PipelineConfig) -> Self {
        let Some(api_key) = config.gemini_api_key.clone() else {
            info!("No text-generation credential configured, using placeholder sections");
            return Self::placeholder_only();
        };

        match GeminiClient::new(api_key, &config.gemini_model, config.generation_timeout) {
            Ok(client) => {
                let writer = GeminiSectionWriter::new(
                    Arc::new(client),
                    config.max_output_tokens,
                    config.temperature,
                );
                Self::new(
                    ContentStrategy::Generative(Arc::new(writer)),
                    config.generation_timeout,
                )
            }
            Err(e) => {
                warn!(error = %e, "Failed to build Gemini client, using placeholder sections");
                Self::placeholder_only()
            }
        }
    }

    pub fn is_generative(&self) -> bool {
        matches!(self.strategy, ContentStrategy::Generative(_))
    }

    /// One entry per outline section, in outline order
    pub async fn fill(&self, outline: &SectionOutline, brief: &ProjectBrief) -> SectionContentMap {
        let bodies = match &self.strategy {
            ContentStrategy::Placeholder => vec![None; outline.sections.len()],
            ContentStrategy::Generative(writer) => {
                self.generate_all(Arc::clone(writer), outline, brief).await
            }
        };

        let entries = outline
            .sections
            .iter()
            .zip(bodies)
            .map(|(title, body)| SectionContent {
                title: title.to_string(),
                body: body.unwrap_or_else(|| placeholder(title, brief)),
            })
            .collect();

        SectionContentMap::from_entries(entries)
    }

    /// Issues every section concurrently; `None` marks a section that failed
    async fn generate_all(
        &self,
        writer: Arc<dyn SectionWriter>,
        outline: &SectionOutline,
        brief: &ProjectBrief,
    ) -> Vec<Option<String>> {
        let brief = Arc::new(brief.clone());
        let mut tasks = JoinSet::new();

        for (index, title) in outline.sections.iter().enumerate() {
            let writer = Arc::clone(&writer);
            let brief = Arc::clone(&brief);
            let title = title.to_string();
            let limit = self.section_timeout;

            tasks.spawn(async move {
                let outcome = tokio::time::timeout(limit, writer.write_section(&title, &brief)).await;
                (index, title, outcome)
            });
        }

        let mut bodies = vec![None; outline.sections.len()];

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, title, Ok(Ok(text)))) if !text.trim().is_empty() => {
                    debug!(section = %title, "Section generated");
                    bodies[index] = Some(text);
                }
                Ok((_, title, Ok(Ok(_)))) => {
                    warn!(section = %title, "Generated section was blank, using placeholder");
                }
                Ok((_, title, Ok(Err(e)))) => {
                    warn!(section = %title, error = %e, "Section generation failed, using placeholder");
                }
                Ok((_, title, Err(_))) => {
                    warn!(section = %title, "Section generation timed out, using placeholder");
                }
                Err(e) => {
                    warn!(error = %e, "Section task aborted, using placeholder");
                }
            }
        }

        bodies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DprError;
    use crate::templates::TemplateRegistry;
    use crate::models::ProjectType;

    struct EchoWriter;

    #[async_trait]
    impl SectionWriter for EchoWriter {
        async fn write_section(&self, section: &str, brief: &ProjectBrief) -> Result<String> {
            Ok(format!("{} for {}", section, brief.title))
        }
    }

    /// Fails one named section, sleeps past the timeout on another
    struct FlakyWriter;

    #[async_trait]
    impl SectionWriter for FlakyWriter {
        async fn write_section(&self, section: &str, _brief: &ProjectBrief) -> Result<String> {
            match section {
                "Market Analysis" => Err(DprError::GenerativeText("quota exceeded".to_string())),
                "Conclusion" => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok("too late".to_string())
                }
                "Operations Plan" => Ok("   ".to_string()),
                other => {
                    // finish out of order
                    let delay = 40 - (other.len() as u64 % 40);
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    Ok(format!("generated {}", other))
                }
            }
        }
    }

    fn brief() -> ProjectBrief {
        ProjectBrief::new("Rice Mill", "rice processing unit")
    }

    #[tokio::test]
    async fn test_placeholder_covers_outline() {
        let outline = TemplateRegistry::lookup(ProjectType::AgroProcessing);
        let provider = SectionContentProvider::placeholder_only();
        assert!(!provider.is_generative());

        let content = provider.fill(&outline, &brief()).await;

        assert_eq!(content.titles(), outline.sections.to_vec());
        for section in content.iter() {
            assert!(section.body.starts_with(PLACEHOLDER_MARKER));
            assert!(section.body.contains(&section.title));
            assert!(section.body.contains("Rice Mill"));
        }
    }

    #[tokio::test]
    async fn test_generative_keeps_outline_order() {
        let outline = TemplateRegistry::lookup(ProjectType::EvCharging);
        let provider = SectionContentProvider::new(
            ContentStrategy::Generative(Arc::new(EchoWriter)),
            Duration::from_secs(2),
        );

        let content = provider.fill(&outline, &brief()).await;

        assert_eq!(content.titles(), outline.sections.to_vec());
        assert_eq!(
            content.get("Site Analysis"),
            Some("Site Analysis for Rice Mill")
        );
    }

    #[tokio::test]
    async fn test_failures_isolated_per_section() {
        let outline = TemplateRegistry::lookup(ProjectType::AgroProcessing);
        let provider = SectionContentProvider::new(
            ContentStrategy::Generative(Arc::new(FlakyWriter)),
            Duration::from_millis(300),
        );

        let content = provider.fill(&outline, &brief()).await;

        assert_eq!(content.len(), outline.sections.len());
        assert_eq!(content.titles(), outline.sections.to_vec());

        for failed in ["Market Analysis", "Conclusion", "Operations Plan"] {
            let body = content.get(failed).unwrap();
            assert!(body.starts_with(PLACEHOLDER_MARKER), "{}", failed);
            assert!(body.contains(failed));
        }

        assert_eq!(
            content.get("Executive Summary"),
            Some("generated Executive Summary")
        );
        assert_eq!(content.get("Risk & Mitigation"), Some("generated Risk & Mitigation"));
    }

    #[test]
    fn test_from_config_without_key_is_placeholder() {
        let provider = SectionContentProvider::from_config(&PipelineConfig::default());
        assert!(!provider.is_generative());
    }
}
