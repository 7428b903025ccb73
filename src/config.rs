//! Pipeline configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_OUTPUT_DIR: &str = "generated";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Pipeline configuration, passed explicitly into the orchestrator.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root under which every run gets its own namespace directory.
    pub output_root: PathBuf,
    /// Credential for the generative text service. `None` disables it.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    /// Per-section ceiling for a generative call.
    pub generation_timeout: Duration,
    pub max_output_tokens: u32,
    pub temperature: f32,
    /// Contextual data service; the stub is used when unset.
    pub context_api_base_url: Option<String>,
    pub context_timeout: Duration,
    /// Attempts at allocating a fresh namespace before giving up.
    pub namespace_retries: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from(DEFAULT_OUTPUT_DIR),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            generation_timeout: Duration::from_secs(30),
            max_output_tokens: 700,
            temperature: 0.2,
            context_api_base_url: None,
            context_timeout: Duration::from_secs(10),
            namespace_retries: 5,
        }
    }
}

impl PipelineConfig {
    /// Loads configuration from the process environment.
    ///
    /// Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            output_root: env::var("DPR_OUTPUT_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.output_root),
            gemini_api_key: non_empty_var("GEMINI_API_KEY"),
            gemini_model: non_empty_var("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            generation_timeout: secs_var("DPR_GENERATION_TIMEOUT_SECS")
                .unwrap_or(defaults.generation_timeout),
            max_output_tokens: defaults.max_output_tokens,
            temperature: defaults.temperature,
            context_api_base_url: non_empty_var("CONTEXT_API_BASE_URL"),
            context_timeout: secs_var("DPR_CONTEXT_TIMEOUT_SECS")
                .unwrap_or(defaults.context_timeout),
            namespace_retries: defaults.namespace_retries,
        }
    }

    pub fn with_output_root(mut self, output_root: impl Into<PathBuf>) -> Self {
        self.output_root = output_root.into();
        self
    }

    pub fn generative_text_available(&self) -> bool {
        self.gemini_api_key.is_some()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn secs_var(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
