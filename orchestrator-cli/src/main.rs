//! Orchestrator CLI Entry Point
//!
//! `audit` runs the full pipeline against a zipped project and writes the
//! report; `prompt` shows what would be sent to the model.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use orchestrator_analysis::{
    HealthScore, ReportAssembler, ReportConfig, ReportExporter, ReportFormat,
};
use orchestrator_core::{ensure_zip_name, ArchiveExtractor, CoreConfig, ExtractionPolicy};
use orchestrator_llm::{
    AuditClient, AuditOrchestrator, AuditState, GeminiClient, LlmConfig, PromptBuilder,
};
use orchestrator_utils::logging::{init_logging, LogLevel, LoggerConfig};
use orchestrator_utils::ConfigBuilder;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "orchestrator")]
#[command(about = "AI audit orchestrator for zipped web projects")]
#[command(version)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit a zipped project and write the report
    Audit {
        /// Project archive (.zip)
        archive: PathBuf,

        /// Directory for the report files
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Report renderings to write
        #[arg(short = 'f', long, value_enum, default_value = "json")]
        format: ReportFormat,

        /// Gemini API key
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Model to audit with
        #[arg(short = 'm', long)]
        model: Option<String>,

        /// API root, e.g. a proxy
        #[arg(long)]
        base_url: Option<String>,

        /// Configuration file path (TOML, JSON or YAML)
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,
    },

    /// Print the prompt an audit would send, without calling the model
    Prompt {
        /// Project archive (.zip)
        archive: PathBuf,

        /// Configuration file path (TOML, JSON or YAML)
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,
    },
}

/// Everything a config file can set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct AppConfig {
    core: CoreConfig,
    llm: LlmConfig,
    report: ReportConfig,
}

fn load_app_config(path: Option<&Path>, overrides: serde_json::Value) -> Result<AppConfig> {
    let config = ConfigBuilder::<AppConfig>::new()
        .load_optional_file(path)?
        .merge(overrides)?
        .build();

    config.core.validate()?;
    config.llm.validate()?;
    Ok(config)
}

/// Display name of the upload, checked for the `.zip` suffix
fn archive_name(path: &Path) -> Result<String> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("Not a file path: {}", path.display()))?;
    ensure_zip_name(&name)?;
    Ok(name)
}

async fn read_archive(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn print_results(state: &AuditState, score: &HealthScore) {
    for (i, result) in state.results().iter().enumerate() {
        let status = if result.success { "✅ PASS" } else { "❌ FAIL" };
        println!("{:>2}. {} {} ({})", i + 1, status, result.test_name, result.id);
        if !result.success {
            if let Some(fix) = &result.suggested_fix {
                println!("      fix: {fix}");
            }
            if let Some(patch) = &result.fix_patch {
                println!("      patch: {} {}", patch.action, patch.file);
            }
        }
    }
    println!("\nHealth Score: {score}");
}

#[allow(clippy::too_many_arguments)]
async fn run_audit(
    archive: PathBuf,
    output: Option<PathBuf>,
    format: ReportFormat,
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    config: Option<PathBuf>,
) -> Result<()> {
    let name = archive_name(&archive)?;

    let mut overrides = json!({ "llm": {}, "report": {} });
    if let Some(model) = model {
        overrides["llm"]["model"] = json!(model);
    }
    if let Some(base_url) = base_url {
        overrides["llm"]["base_url"] = json!(base_url);
    }
    if let Some(output) = output {
        overrides["report"]["output_dir"] = json!(output);
    }
    let config = load_app_config(config.as_deref(), overrides)?;

    let api_key = api_key
        .context("No Gemini API key: pass --api-key or set GEMINI_API_KEY")?;
    let transport = GeminiClient::new(api_key, &config.llm)?;
    let client = AuditClient::new(Arc::new(transport), PromptBuilder::from(&config.core))?;
    let extractor = ArchiveExtractor::zip(ExtractionPolicy::from(&config.core));

    let mut orchestrator = AuditOrchestrator::new(extractor, client);
    orchestrator.add_state_listener(|state| info!("Audit status: {}", state.status()));

    let bytes = read_archive(&archive).await?;
    println!("🔍 Auditing {} with {}", name, config.llm.model);

    let state = orchestrator.run(&name, bytes).await?;
    match &state {
        AuditState::Completed { project, results } => {
            let score = HealthScore::from_results(results);
            print_results(&state, &score);

            let report = ReportAssembler::from(&config.report).assemble(project, results);
            let written = ReportExporter::write(&report, &config.report.output_dir, format)?;
            for path in written {
                println!("💾 Report saved to: {}", path.display());
            }
            Ok(())
        }
        other => {
            let message = other
                .error_message()
                .unwrap_or(orchestrator_llm::UNEXPECTED_ERROR_MESSAGE);
            anyhow::bail!("{message}")
        }
    }
}

async fn run_prompt(archive: PathBuf, config: Option<PathBuf>) -> Result<()> {
    let name = archive_name(&archive)?;
    let config = load_app_config(config.as_deref(), json!({}))?;

    let bytes = read_archive(&archive).await?;
    let project = ArchiveExtractor::zip(ExtractionPolicy::from(&config.core))
        .extract_async(name, bytes)
        .await?;

    let prompt = PromptBuilder::from(&config.core).build(&project);
    info!(
        "{} files, {} truncated",
        project.file_count(),
        prompt.truncated_files
    );
    println!("{}", prompt.text);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(LoggerConfig {
        level: LogLevel::from_verbosity(cli.verbose, cli.quiet),
        ..LoggerConfig::default()
    })?;

    match cli.command {
        Commands::Audit {
            archive,
            output,
            format,
            api_key,
            model,
            base_url,
            config,
        } => run_audit(archive, output, format, api_key, model, base_url, config).await,
        Commands::Prompt { archive, config } => run_prompt(archive, config).await,
    }
}
