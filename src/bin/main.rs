use dpr_generator::{Orchestrator, PipelineConfig, ProjectBrief};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn sample_brief() -> ProjectBrief {
    let mut brief = ProjectBrief::new("Rice Mill", "rice processing unit");
    brief.location = Some("Nashik, Maharashtra".to_string());
    brief.capacity = Some(2000.0);
    brief
}

fn load_brief(path: &PathBuf) -> Result<ProjectBrief, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = PipelineConfig::from_env();

    info!("DPR generator starting");
    if !config.generative_text_available() {
        info!("GEMINI_API_KEY not set, sections will use placeholder text");
    }

    let brief = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => load_brief(&path)?,
        None => {
            info!("No brief file given, using the sample brief");
            sample_brief()
        }
    };

    let orchestrator = Orchestrator::from_config(config);
    info!(output_root = %orchestrator.output_root().display(), "Output root");

    match orchestrator.generate(&brief).await {
        Ok(package) => {
            info!(uid = %package.uid, "Report package generated");
            println!("{}", serde_json::to_string_pretty(&package)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("Report generation failed: {}", e);
            eprintln!("{}", serde_json::to_string_pretty(&e.report())?);
            Err(Box::new(e) as Box<dyn std::error::Error>)
        }
    }
}
