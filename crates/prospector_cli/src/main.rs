//! Prospector CLI - crawl the contribution graph of a GitHub repository.

mod config;
mod progress;
mod store;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{CommandFactory, Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;

use prospector::config::GithubConfig;
use prospector::crawl::{CrawlContext, CrawlOptions, ProgressCallback};
use prospector::github::{GithubActivityFetcher, GithubClient, GithubFollowingFetcher};
use prospector::http::reqwest_transport::ReqwestTransport;
use prospector::rate_limit::ApiRateLimiter;
use prospector::retry::RetryConfig;

use crate::progress::LoggingReporter;
use crate::store::{JsonFileStore, JsonlQueueWriter};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(name = "prospector")]
#[command(version)]
#[command(about = "Crawl the contribution graph of a GitHub repository")]
#[command(
    long_about = "Prospector starts from a repository, fetches its metadata and contributors, \
expands to each contributor's social connections and recent activity, and \
writes newly discovered repositories to a crawl queue for later processing."
)]
#[command(after_long_help = r#"EXAMPLES
    Crawl a repository by shorthand reference:
        $ prospector crawl rust-lang/cargo

    Crawl by URL, skipping the lifetime commit aggregation:
        $ prospector crawl https://github.com/rust-lang/cargo --no-lifetime

    Generate shell completions:
        $ prospector completions bash > ~/.local/share/bash-completion/completions/prospector

CONFIGURATION
    Prospector reads configuration from:
      1. ~/.config/prospector/config.toml (or $XDG_CONFIG_HOME/prospector/config.toml)
      2. ./prospector.toml
      3. Environment variables (PROSPECTOR_* prefix)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    PROSPECTOR_GITHUB_TOKEN   GitHub personal access token
    GITHUB_TOKEN              Fallback for the token (e.g. from a .env file)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the contribution graph rooted at one or more repositories
    Crawl {
        /// Repository reference(s): owner/name or https://github.com/owner/name
        #[arg(required = true)]
        references: Vec<String>,

        #[command(flatten)]
        crawl_opts: CrawlCliOptions,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

/// Crawl options shared by every reference on the command line.
#[derive(Debug, Clone, clap::Args)]
struct CrawlCliOptions {
    /// Skip the lifetime commit aggregation for processed users
    #[arg(short = 'L', long)]
    no_lifetime: bool,

    /// Maximum retry attempts for rate-limited requests (default from config or 5)
    #[arg(short = 'r', long)]
    max_retries: Option<usize>,

    /// Proactive request pacing in requests per second (default from config or 10)
    #[arg(short = 'R', long)]
    requests_per_second: Option<u32>,

    /// Path of the JSON store file (default from config)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Path of the JSONL crawl-queue file (default from config)
    #[arg(long)]
    queue: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("prospector=info,prospector_cli=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(Term::stdout().features().colors_supported())
        .init();

    let config = config::Config::load();
    let cli = Cli::parse();

    match cli.command {
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "prospector",
                &mut std::io::stdout(),
            );
            Ok(())
        }
        Commands::Crawl {
            references,
            crawl_opts,
        } => handle_crawl(&config, &references, &crawl_opts).await,
    }
}

async fn handle_crawl(
    config: &config::Config,
    references: &[String],
    opts: &CrawlCliOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(token) = config.github_token() else {
        return Err(
            "no GitHub token configured; set PROSPECTOR_GITHUB_TOKEN or add it to the config file"
                .into(),
        );
    };

    let max_retries = opts.max_retries.unwrap_or(config.crawl.max_retries);
    let rps = opts
        .requests_per_second
        .unwrap_or(config.crawl.requests_per_second);
    let store_path = opts
        .store
        .clone()
        .unwrap_or_else(|| config.crawl.store_path.clone());
    let queue_path = opts
        .queue
        .clone()
        .unwrap_or_else(|| config.crawl.queue_path.clone());

    let transport = Arc::new(ReqwestTransport::with_timeout(REQUEST_TIMEOUT)?);
    let client = GithubClient::new(GithubConfig::with_token(token), transport)
        .with_rate_limiter(ApiRateLimiter::new(rps))
        .with_retry_config(RetryConfig::new(
            Duration::from_secs(1),
            Duration::from_secs(60),
            max_retries,
        ));

    let store = Arc::new(JsonFileStore::open(&store_path)?);
    let queue = Arc::new(JsonlQueueWriter::open(&queue_path)?);

    let reporter = LoggingReporter::new();
    let callback: Arc<ProgressCallback> = Arc::new(Box::new(move |event| reporter.handle(event)));

    let ctx = CrawlContext::builder()
        .client(client.clone())
        .store(store)
        .following(Arc::new(GithubFollowingFetcher::new(client.clone())))
        .activity(Arc::new(GithubActivityFetcher::new(client)))
        .queue(queue)
        .options(CrawlOptions {
            aggregate_lifetime_commits: !opts.no_lifetime
                && config.crawl.aggregate_lifetime_commits,
        })
        .progress(callback)
        .build()?;

    let mut failures = 0usize;
    for reference in references {
        match ctx.crawl(reference).await {
            Ok(report) => {
                tracing::info!(
                    reference = %report.reference,
                    used_org_fallback = report.used_org_fallback,
                    contributors = report.contributors,
                    users_processed = report.users_processed,
                    users_skipped = report.users_skipped,
                    repos_queued = report.repos_queued,
                    non_fatal_errors = report.errors.len(),
                    "Crawl finished"
                );
            }
            Err(e) => {
                tracing::error!(reference = %reference, error = %e, "Crawl failed");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(format!("{failures} of {} crawl(s) failed", references.len()).into());
    }

    Ok(())
}
