use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod cli;
mod config;

use cli::Cli;
use cli::commands::{Commands, StrategyArg};
use config::Config;

use judgr::batch::BatchDriver;
use judgr::judge::{Feedback, Judge, LlmJudge, RetryConfig};
use judgr::llm::{LlmClient, OpenAiClient, OpenAiConfig};
use judgr::prompts;
use judgr::runner::{
    AppendFindings, ConvergenceConfig, ConvergenceLoop, FeedbackStrategy, ReplaceInstruction,
};
use judgr::tracking::{JsonlTracker, NoopTracker, TrackingSink};
use judgr::transcripts;

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("judgr")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("judgr.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn build_client(config: &Config) -> Result<Arc<dyn LlmClient>> {
    let llm_config = OpenAiConfig {
        model: config.llm.model.clone(),
        max_tokens: config.llm.max_tokens,
        timeout: Duration::from_millis(config.llm.timeout_ms),
    };
    let client = OpenAiClient::new(llm_config).context("Judge credentials missing or invalid")?;
    Ok(Arc::new(client))
}

fn build_tracker(config: &Config) -> Result<Arc<dyn TrackingSink>> {
    if config.tracking.enabled {
        let tracker = JsonlTracker::open(&config.tracking.dir, &config.tracking.project)
            .context("Failed to open tracking run log")?;
        info!("Tracking judge calls to: {}", tracker.path().display());
        Ok(Arc::new(tracker))
    } else {
        Ok(Arc::new(NoopTracker))
    }
}

fn build_judge(
    config: &Config,
    strategy: &dyn FeedbackStrategy,
) -> Result<Arc<dyn Judge>> {
    let client = build_client(config)?;
    let tracker = build_tracker(config)?;
    let retry = RetryConfig {
        max_attempts: config.llm.retry_attempts,
        initial_backoff: Duration::from_millis(config.llm.retry_backoff_ms),
        max_backoff: Duration::from_secs(60),
    };
    let judge = LlmJudge::new(client, tracker, strategy.shape())
        .with_retry(retry)
        .with_max_tokens(config.llm.max_tokens);
    Ok(Arc::new(judge))
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        // Default: batch run with configured settings
        None => handle_run_command(None, StrategyArg::Append, None, config).await,
        Some(Commands::Run {
            transcripts,
            strategy,
            max_iterations,
        }) => handle_run_command(transcripts.clone(), *strategy, *max_iterations, config).await,
        Some(Commands::Eval { file }) => handle_eval_command(file.clone(), config).await,
    }
}

async fn handle_run_command(
    transcripts_dir: Option<PathBuf>,
    strategy_arg: StrategyArg,
    max_iterations: Option<u32>,
    config: &Config,
) -> Result<()> {
    let strategy: Arc<dyn FeedbackStrategy> = match strategy_arg {
        StrategyArg::Append => Arc::new(AppendFindings::new()),
        StrategyArg::Rewrite => Arc::new(ReplaceInstruction::new()),
    };

    let judge = build_judge(config, strategy.as_ref())?;

    let loop_config = ConvergenceConfig {
        max_iterations: max_iterations.unwrap_or(config.convergence.max_iterations),
        stall_threshold: config.convergence.stall_threshold,
    };
    let convergence = ConvergenceLoop::new(judge, strategy).with_config(loop_config);

    let dir = transcripts_dir.unwrap_or_else(|| config.transcripts.dir.clone());
    let entries = transcripts::load_dir(&dir, &config.transcripts.extension)
        .context(format!("Failed to list transcripts in {}", dir.display()))?;

    println!(
        "{} {} transcript(s) from {}",
        "Evaluating:".cyan(),
        entries.len(),
        dir.display()
    );

    let report = BatchDriver::new(convergence)
        .run(entries)
        .await
        .context("Batch run failed")?;

    let counts: Vec<String> = report
        .iteration_counts()
        .iter()
        .map(|c| match c {
            Some(n) => n.to_string(),
            None => "failed".to_string(),
        })
        .collect();
    println!(
        "{} [{}]",
        "Iterations per transcript:".cyan(),
        counts.join(", ")
    );

    match report.final_verdict() {
        Some(verdict) => match &verdict.feedback {
            Feedback::ActionItems(items) => {
                println!("{}", "Final recommendations:".cyan());
                for item in items {
                    println!("  - {}", item);
                }
            }
            Feedback::ImprovedInstruction(text) => {
                println!("{}\n{}", "Final instruction:".cyan(), text);
            }
        },
        None => println!("{}", "No transcript converged".yellow()),
    }

    if report.failure_count() > 0 {
        println!(
            "{} {} transcript(s) failed",
            "Warning:".yellow(),
            report.failure_count()
        );
    }

    Ok(())
}

async fn handle_eval_command(file: Option<PathBuf>, config: &Config) -> Result<()> {
    let text = match &file {
        Some(path) => fs::read_to_string(path)
            .context(format!("Failed to read transcript {}", path.display()))?,
        None => prompts::SAMPLE_DIALOG.to_string(),
    };

    let strategy = AppendFindings::with_instruction(prompts::BASE_PROMPT);
    let judge = build_judge(config, &strategy)?;

    let message = strategy.first_message(&text);
    let verdict = judge
        .evaluate(&message, strategy.seed_instruction())
        .await
        .context("Judge evaluation failed")?;

    if verdict.success {
        println!("{}", "success: no findings remain".green());
    } else {
        println!("{}", "findings:".red());
    }
    if let Some(items) = verdict.action_items() {
        for item in items {
            println!("  - {}", item);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
