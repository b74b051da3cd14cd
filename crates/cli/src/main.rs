use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use studio_agents::{studio_profile, Clock, QueryPipeline, ToolDispatcher};
use studio_core::ProfileKind;
use studio_ml::{MlConfig, MlStack};
use studio_observability::{init_tracing, AppMetrics};
use studio_storage::{seed_dataset, MemoryStore, StudioRepository};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "studio")]
#[command(about = "Studio assistant: support and dashboard query pipelines")]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct Settings {
    /// LibreTranslate-compatible base URL. Without it translation runs offline.
    #[arg(long, env = "STUDIO_TRANSLATE_URL", global = true)]
    translate_url: Option<String>,

    #[arg(long, env = "STUDIO_TRANSLATE_API_KEY", global = true, hide_env_values = true)]
    translate_api_key: Option<String>,

    /// JSONL file of {"text", "intent"} examples for the centroid classifier.
    #[arg(long, env = "STUDIO_INTENT_DATASET", global = true)]
    intent_dataset: Option<PathBuf>,

    #[arg(long, env = "STUDIO_MIN_CONFIDENCE", global = true)]
    min_confidence: Option<f32>,

    #[arg(long, env = "STUDIO_TOOL_TIMEOUT_SECS", global = true)]
    tool_timeout_secs: Option<u64>,

    /// Seed the in-memory store with demo records (default).
    #[arg(long, overrides_with = "no_seed", global = true)]
    seed: bool,

    #[arg(long, overrides_with = "seed", global = true)]
    no_seed: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one query through the support profile.
    Support {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Run one query through the dashboard profile.
    Dashboard {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Interactive loop over one profile.
    Chat {
        #[arg(long, value_parser = parse_profile, default_value = "support")]
        profile: ProfileKind,
    },
    /// Print the closed label set and instruction templates of a profile.
    Labels {
        #[arg(long, value_parser = parse_profile)]
        profile: ProfileKind,
    },
    /// Understanding stages only; prints the structured result.
    Parse {
        #[arg(long, value_parser = parse_profile)]
        profile: ProfileKind,
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
}

fn parse_profile(value: &str) -> Result<ProfileKind, String> {
    ProfileKind::parse(value).ok_or_else(|| format!("unknown profile `{value}`"))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("studio_cli");
    let cli = Cli::parse();
    let settings = &cli.settings;

    match &cli.command {
        Command::Support { query, json } => {
            let pipeline = build_pipeline(ProfileKind::Support, settings)?;
            run_once(&pipeline, &query.join(" "), *json).await?;
        }
        Command::Dashboard { query, json } => {
            let pipeline = build_pipeline(ProfileKind::Dashboard, settings)?;
            run_once(&pipeline, &query.join(" "), *json).await?;
        }
        Command::Chat { profile } => {
            let pipeline = build_pipeline(*profile, settings)?;
            run_chat(&pipeline).await?;
        }
        Command::Labels { profile } => {
            for template in profile.templates() {
                println!("{:<40} {}", template.intent.as_label(), template.instruction);
            }
        }
        Command::Parse { profile, query } => {
            let pipeline = build_pipeline(*profile, settings)?;
            let result = pipeline.understand(&query.join(" ")).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

async fn run_once(pipeline: &QueryPipeline, query: &str, json: bool) -> Result<()> {
    let processed = pipeline.process(query).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&processed)?);
    } else {
        println!("{}", processed.final_text());
    }
    Ok(())
}

async fn run_chat(pipeline: &QueryPipeline) -> Result<()> {
    println!(
        "{} chat mode. type 'exit' to quit.",
        pipeline.profile().kind().agent_name()
    );

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        match pipeline.process(message).await {
            Ok(processed) => {
                println!("\n[{} -> {}]", processed.query.intent(), processed.tool);
                println!("{}\n", processed.final_text());
            }
            Err(err) => println!("\nCould not handle that request: {err}\n"),
        }
    }

    Ok(())
}

fn build_pipeline(kind: ProfileKind, settings: &Settings) -> Result<QueryPipeline> {
    let metrics = AppMetrics::shared();
    let stack = MlStack::load(&MlConfig {
        intent_dataset: settings.intent_dataset.clone(),
        translate_url: settings.translate_url.clone(),
        translate_api_key: settings.translate_api_key.clone(),
    });

    let seeded = settings.seed || !settings.no_seed;
    let store: Arc<dyn StudioRepository> = if seeded {
        Arc::new(MemoryStore::with_dataset(seed_dataset(Utc::now().date_naive())))
    } else {
        Arc::new(MemoryStore::new())
    };
    info!(profile = %kind, seeded, "building pipeline");

    let profile = studio_profile(kind, store, Clock::system())
        .with_context(|| format!("failed binding tools for the {kind} profile"))?;
    let dispatcher = ToolDispatcher::new()
        .with_timeout(settings.tool_timeout_secs.map(Duration::from_secs));

    Ok(QueryPipeline::from_stack(profile, &stack, metrics)
        .with_min_confidence(settings.min_confidence)
        .with_dispatcher(dispatcher))
}
