use std::io::IsTerminal;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use greenify_core::{CommitHistory, CommitTimestamp, GreenifyConfig, OutputFormat};
use greenify_plan::HistoryPlanner;
use greenify_repo::{
    materialize, CommitOptions, Git2Driver, GitCliDriver, ProgressObserver, RepositoryDriver,
};
use indicatif::{ProgressBar, ProgressStyle};
use miette::{IntoDiagnostic, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "greenify",
    version,
    about = "Create a project with a plausible, made-up commit history",
    long_about = "Create a project with a plausible, made-up commit history.\n\n\
                   Commit counts per day follow a Poisson distribution (separate rates for\n\
                   weekdays and weekends) and commit times cluster around a configured hour.\n\n\
                   Examples:\n  \
                     greenify                                 Use config.json, write MyProject/\n  \
                     greenify -s 2020-01-01 -e 2020-12-31     Fill one calendar year\n  \
                     greenify --dry-run --format json         Print the plan, touch nothing\n  \
                     greenify --seed 42 --backend cli         Reproducible run via the git binary"
)]
struct Cli {
    /// Path to the project directory
    #[arg(short, long, default_value = "MyProject")]
    output: PathBuf,

    /// Configuration file (JSON, or TOML when the name ends in .toml)
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// First day of the history (YYYY-MM-DD)
    #[arg(short, long, default_value = "2019-01-01", value_parser = parse_date)]
    start: NaiveDate,

    /// Last day of the history (YYYY-MM-DD, default: yesterday)
    #[arg(short, long, value_parser = parse_date)]
    end: Option<NaiveDate>,

    /// Seed for the random generator; the same seed reproduces the same history
    #[arg(long)]
    seed: Option<u64>,

    /// Plan the history and print it without creating a repository
    #[arg(long)]
    dry_run: bool,

    /// How commits are written
    #[arg(long, default_value = "git2")]
    backend: Backend,

    /// Output format for --dry-run
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    /// libgit2, in process
    Git2,
    /// The `git` executable on PATH
    Cli,
}

fn parse_date(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected a YYYY-MM-DD date, got {value:?}: {e}"))
}

fn yesterday() -> NaiveDate {
    let today = Local::now().date_naive();
    today.pred_opt().unwrap_or(today)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

/// Progress bar on a terminal, a line every ten commits otherwise.
struct CommitProgress {
    interactive: bool,
    bar: Option<ProgressBar>,
}

impl CommitProgress {
    fn new(interactive: bool) -> Self {
        Self {
            interactive,
            bar: None,
        }
    }
}

impl ProgressObserver for CommitProgress {
    fn started(&mut self, total: usize) {
        if !self.interactive {
            return;
        }
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} [{bar:40.green/white}] {pos}/{len} commits {msg} ({eta})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
        );
        self.bar = Some(bar);
    }

    fn committed(&mut self, done: usize, total: usize, timestamp: &CommitTimestamp) {
        match &self.bar {
            Some(bar) => {
                bar.set_position(done as u64);
                bar.set_message(timestamp.date_naive().to_string());
            }
            None => {
                if done % 10 == 0 || done == total {
                    eprintln!("doing {done} of {total}");
                }
            }
        }
    }

    fn finished(&mut self, _total: usize) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

fn print_history(history: &CommitHistory, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(history).into_diagnostic()?
            );
        }
        OutputFormat::Markdown => {
            println!("# Planned history\n");
            println!("| Date | Weekend | Commits |");
            println!("|------|---------|---------|");
            for day in history.days() {
                let weekend = if day.is_weekend { "yes" } else { "" };
                println!("| {} | {weekend} | {} |", day.date, day.commit_count);
            }
            println!(
                "\n**Total:** {} commits on {} of {} days",
                history.len(),
                history.active_days(),
                history.days().len()
            );
        }
        OutputFormat::Text => {
            for ts in history {
                println!("{}", ts.format("%Y-%m-%d %H:%M:%S %z"));
            }
            println!(
                "{} commits on {} of {} days ({} on weekends)",
                history.len(),
                history.active_days(),
                history.days().len(),
                history.weekend_commits()
            );
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = GreenifyConfig::from_file(&cli.config)?;
    let planner = HistoryPlanner::from_config(&config)?;
    let end = cli.end.unwrap_or_else(yesterday);

    let seed = cli.seed.unwrap_or_else(|| rand::rng().random());
    debug!(seed, start = %cli.start, %end, offset = %planner.offset(), "starting");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    eprintln!("Generating commit dates...");
    let history = planner.plan(cli.start, end, &mut rng)?;

    if cli.dry_run {
        return print_history(&history, cli.format);
    }

    eprintln!("Creating git project...");
    let options = CommitOptions {
        message: config.commit_message.clone(),
        author: config.author.clone(),
        content_seed: rng.random(),
        ..CommitOptions::default()
    };
    let mut driver: Box<dyn RepositoryDriver> = match cli.backend {
        Backend::Git2 => Box::new(Git2Driver::new(options)),
        Backend::Cli => Box::new(GitCliDriver::new(options)),
    };

    eprintln!("Making commits");
    let mut progress = CommitProgress::new(std::io::stderr().is_terminal());
    let made = materialize(&mut driver, &cli.output, &history, &mut progress)?;

    eprintln!("DONE! {made} commits written to {}", cli.output.display());
    Ok(())
}
