use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing_subscriber::EnvFilter;

use idea_validator_core::{
    AggregatedReport, ChatClient, LlmExtractor, LlmKeywordGenerator, Progress, Provider,
    ScraperApiFetcher, SummaryDocument, Validator, ValidatorConfig, default_runs_root, explain,
    format_summary_readable, load_config, rescore, storage,
};

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let whole = d.as_secs();
        format!("{}m {}s", whole / 60, whole % 60)
    }
}

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, ValueEnum)]
enum CliProvider {
    Openai,
    Gemini,
    Grok,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Openai => Provider::Openai,
            CliProvider::Gemini => Provider::Gemini,
            CliProvider::Grok => Provider::Grok,
        }
    }
}

#[derive(Parser)]
#[command(name = "idea-validator")]
#[command(
    about = "Validate business ideas by scraping discussion platforms and scoring market signals"
)]
struct Cli {
    /// Show pipeline logs (same as RUST_LOG=info)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape, analyze and score a business idea
    Validate(ValidateArgs),
    /// Re-score a saved final_report.json without any network access
    Score(ScoreArgs),
}

#[derive(Args)]
struct ValidateArgs {
    /// Business idea, e.g. "AI meal planner for students"
    idea: String,

    /// AI provider for keyword generation and extraction
    #[arg(short, long)]
    provider: Option<CliProvider>,

    /// Number of search keywords to generate
    #[arg(short, long)]
    keywords: Option<usize>,

    /// Pages to scrape per source
    #[arg(long)]
    pages: Option<u32>,

    /// Directory that receives the run checkpoints
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// TOML config file layered over the user config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the summary document as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ScoreArgs {
    /// Path to a final_report.json
    report: PathBuf,

    /// TOML config file layered over the user config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the summary document as JSON
    #[arg(long)]
    json: bool,

    /// Don't write executive_summary.json next to the report
    #[arg(long)]
    no_save: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", style("Error:").red().bold(), e);
    std::process::exit(1);
}

fn print_header(subtitle: &str) {
    println!(
        "\n{}  {}\n",
        style("idea-validator").cyan().bold(),
        style(subtitle).dim()
    );
}

fn print_document(report: &AggregatedReport, document: &SummaryDocument, config: &ValidatorConfig) {
    let explanations = explain(report, &document.scores, &config.scoring);
    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}",
        format_summary_readable(report, document, Some(&explanations))
    );
}

fn print_json(document: &SummaryDocument) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(document)?);
    Ok(())
}

fn apply_overrides(mut config: ValidatorConfig, args: &ValidateArgs) -> ValidatorConfig {
    if let Some(provider) = args.provider.clone() {
        config.provider = provider.into();
    }
    if let Some(keywords) = args.keywords {
        config.num_keywords = keywords;
    }
    if let Some(pages) = args.pages {
        config.pages_per_source = pages;
    }
    config
}

fn report_progress(spinner: &ProgressBar, progress: &Progress<'_>) {
    match progress {
        Progress::KeywordsReady { keywords, fallback } => {
            let note = if *fallback { " (fallback)" } else { "" };
            spinner.println(format!(
                "{} Keywords{}: {}",
                style("✓").green().bold(),
                style(note).dim(),
                style(keywords.join(", ")).yellow()
            ));
        }
        Progress::KeywordStarted {
            index,
            total,
            keyword,
        } => {
            spinner.set_message(format!("[{}/{}] Scraping \"{}\"...", index + 1, total, keyword));
        }
        Progress::PageSkipped {
            source,
            page,
            reason,
            ..
        } => {
            spinner.println(format!(
                "  {} {} page {} skipped: {}",
                style("!").yellow().bold(),
                source,
                page,
                style(reason).dim()
            ));
        }
        Progress::PageAnalyzed {
            keyword,
            source,
            page,
            ..
        } => {
            spinner.set_message(format!("Analyzed \"{}\" on {} page {}", keyword, source, page));
        }
        Progress::KeywordFinished { keyword, findings } => {
            spinner.println(format!(
                "{} {}: {} findings",
                style("✓").green().bold(),
                keyword,
                findings
            ));
        }
        Progress::Scored { overall } => {
            spinner.set_message(format!("Scored: {}/100", overall));
        }
    }
}

async fn validate(args: ValidateArgs) -> Result<()> {
    let config = apply_overrides(load_config(args.config.as_deref())?, &args);
    config.validate()?;

    // Validate API keys early
    let provider = config.provider;
    let chat = ChatClient::new(provider).unwrap_or_else(|e| fail(e));
    let fetcher = ScraperApiFetcher::from_env().unwrap_or_else(|e| fail(e));

    let extractor = LlmExtractor::new(chat.clone(), config.max_page_chars);
    let runs_root = args.output_dir.clone().unwrap_or_else(default_runs_root);
    let validator = Validator::new(
        config,
        Box::new(fetcher),
        Box::new(extractor),
        Box::new(LlmKeywordGenerator::new(chat)),
    )
    .with_runs_root(runs_root);

    if !args.json {
        print_header("Business Idea Validator");
    }

    let started = Instant::now();
    let spinner = create_spinner(&format!("Generating keywords with {}...", provider.name()));
    if args.json {
        spinner.set_draw_target(ProgressDrawTarget::hidden());
    }
    let outcome = validator
        .run(&args.idea, &mut |progress| report_progress(&spinner, progress))
        .await;
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            spinner.finish_and_clear();
            fail(e);
        }
    };
    spinner.finish_with_message(format!(
        "{} Validation complete {}",
        style("✓").green().bold(),
        style(format!("[{}]", format_duration(started.elapsed()))).dim()
    ));

    let document = outcome.document();
    if args.json {
        return print_json(&document);
    }

    if let Some(run_dir) = &outcome.run_dir {
        println!(
            "\n{} {}\n",
            style("Saved:").dim(),
            style(run_dir.display()).cyan()
        );
    }
    print_document(&outcome.report, &document, validator.config());
    Ok(())
}

async fn score(args: ScoreArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let (report, document) = rescore(&args.report, &config).await?;

    let saved = if args.no_save {
        None
    } else {
        let path = storage::summary_path_for(&args.report);
        storage::save_summary(&document, &path).await?;
        Some(path)
    };

    if args.json {
        return print_json(&document);
    }

    print_header("Score Report");
    if let Some(path) = saved.as_deref().map(Path::display) {
        println!("{} {}\n", style("Saved:").dim(), style(path).cyan());
    }
    print_document(&report, &document, &config);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Validate(args) => validate(args).await,
        Command::Score(args) => score(args).await,
    }
}
