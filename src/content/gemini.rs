//! Gemini-backed section writer
//!
//! Builds a bounded prompt per section and delegates to a `TextGenerator`.

use super::SectionWriter;
use crate::gemini::{GenerationRequest, TextGenerator};
use crate::models::ProjectBrief;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Upper bound on brief text copied into a prompt
const MAX_FIELD_CHARS: usize = 600;

pub struct GeminiSectionWriter {
    generator: Arc<dyn TextGenerator>,
    max_output_tokens: u32,
    temperature: f32,
}

impl GeminiSectionWriter {
    pub fn new(generator: Arc<dyn TextGenerator>, max_output_tokens: u32, temperature: f32) -> Self {
        Self {
            generator,
            max_output_tokens,
            temperature,
        }
    }

    fn build_prompt(section: &str, brief: &ProjectBrief) -> String {
        format!(
            r#"Write a clear, professional section titled "{}" for a Detailed Project Report.
Project title: {}
Short description: {}
Location: {}
Be concise but useful (~250-400 words). Include bullet points where useful."#,
            section,
            truncate(&brief.title),
            truncate(&brief.short_description),
            truncate(brief.location_or_na()),
        )
    }
}

fn truncate(field: &str) -> &str {
    match field.char_indices().nth(MAX_FIELD_CHARS) {
        Some((idx, _)) => &field[..idx],
        None => field,
    }
}

#[async_trait]
impl SectionWriter for GeminiSectionWriter {
    async fn write_section(&self, section: &str, brief: &ProjectBrief) -> Result<String> {
        let request = GenerationRequest {
            prompt: Self::build_prompt(section, brief),
            max_output_tokens: self.max_output_tokens,
            temperature: self.temperature,
        };

        let text = self.generator.generate(&request).await?;
        Ok(text.trim().to_string())
    }
}
