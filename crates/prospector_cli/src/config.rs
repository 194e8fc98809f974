//! Configuration file support for the prospector CLI.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `PROSPECTOR_`, e.g.
//!    `PROSPECTOR_GITHUB_TOKEN`)
//! 3. Config file (~/.config/prospector/config.toml or ./prospector.toml)
//! 4. Built-in defaults
//!
//! The bare `GITHUB_TOKEN` environment variable (as populated by `.env`
//! files) is honored as a final fallback for the credential.
//!
//! Example config file:
//! ```toml
//! [github]
//! token = "ghp_..."  # or use PROSPECTOR_GITHUB_TOKEN env var
//!
//! [crawl]
//! max_retries = 5
//! requests_per_second = 10
//! aggregate_lifetime_commits = true
//! store_path = "prospector-store.json"
//! queue_path = "prospector-queue.jsonl"
//! ```

use std::path::PathBuf;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub credential configuration.
    pub github: GitHubConfig,
    /// Crawl behavior configuration.
    pub crawl: CrawlConfig,
}

/// GitHub configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GitHub API token.
    /// Can also be set via PROSPECTOR_GITHUB_TOKEN or GITHUB_TOKEN.
    pub token: Option<String>,
}

/// Crawl behavior configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Maximum retry attempts for rate-limited requests.
    pub max_retries: usize,
    /// Proactive request pacing (requests per second).
    pub requests_per_second: u32,
    /// Compute lifetime commit totals for processed users.
    pub aggregate_lifetime_commits: bool,
    /// Path of the JSON store file.
    pub store_path: PathBuf,
    /// Path of the JSONL crawl-queue file.
    pub queue_path: PathBuf,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            requests_per_second: 10,
            aggregate_lifetime_commits: true,
            store_path: PathBuf::from("prospector-store.json"),
            queue_path: PathBuf::from("prospector-queue.jsonl"),
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/prospector/config.toml)
    /// 3. Local config file (./prospector.toml)
    /// 4. Environment variables with PROSPECTOR_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(proj_dirs) = ProjectDirs::from("", "", "prospector") {
            let xdg_config = proj_dirs.config_dir().join("config.toml");
            if xdg_config.exists() {
                tracing::debug!("loading config from {:?}", xdg_config);
                builder = builder.add_source(
                    File::from(xdg_config)
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        let local_config = PathBuf::from("prospector.toml");
        if local_config.exists() {
            tracing::debug!("loading config from ./prospector.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("PROSPECTOR")
                .separator("_")
                .try_parsing(true),
        );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// The bearer credential, with the bare GITHUB_TOKEN env var as a final
    /// fallback.
    pub fn github_token(&self) -> Option<String> {
        self.github
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
    }

    /// Default config file path.
    #[allow(dead_code)]
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "prospector").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
