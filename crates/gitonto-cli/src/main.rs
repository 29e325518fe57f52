//! Gitonto CLI - Query and check git commit-history snapshots

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use gitonto_core::Snapshot;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{completions, infer, repo, repos, search, validate};
use config::Config;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "gitonto")]
#[command(author, version, about = "Search and validate git commit-history graphs")]
pub struct Cli {
    /// Snapshot file (JSON)
    #[arg(short, long, env = "GITONTO_SNAPSHOT", global = true)]
    pub snapshot: Option<PathBuf>,

    /// Output format: table, json, csv
    #[arg(short, long, global = true)]
    pub format: Option<String>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search commits with the query mini-language
    Search(search::SearchArgs),
    /// Report integrity issues
    Validate(validate::ValidateArgs),
    /// List asserted and derived facts
    Infer(infer::InferArgs),
    /// List repositories with branch and commit counts
    Repos,
    /// Show branches and commits of one repository
    Repo(repo::RepoArgs),
    /// Manage CLI configuration
    Config(commands::config::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

impl Commands {
    /// Whether the command runs inference with the class hierarchy attached
    pub fn uses_hierarchy(&self) -> bool {
        matches!(self, Commands::Infer(args) if !args.no_hierarchy)
    }
}

/// Application context with the loaded snapshot
pub struct AppContext {
    pub snapshot: Snapshot,
    pub format: OutputFormat,
}

impl AppContext {
    pub fn new(cli: &Cli, config: &Config) -> anyhow::Result<Self> {
        let path = cli
            .snapshot
            .clone()
            .or_else(|| config.snapshot.as_ref().map(PathBuf::from))
            .context("No snapshot given. Pass --snapshot, set GITONTO_SNAPSHOT, or run `gitonto config set snapshot <path>`")?;
        tracing::debug!("Loading snapshot from: {:?}", path);

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let snapshot = Snapshot::from_json(&content)
            .with_context(|| format!("Invalid snapshot {}", path.display()))?
            .with_reasoner_available(cli.command.uses_hierarchy());

        let format = cli
            .format
            .as_deref()
            .or(config.format.as_deref())
            .map(OutputFormat::from)
            .unwrap_or(OutputFormat::Table);

        Ok(Self { snapshot, format })
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting gitonto CLI");

    // These do not need a snapshot
    match &cli.command {
        Commands::Config(args) => return commands::config::run(args),
        Commands::Completions(args) => return completions::run(args),
        _ => {}
    }

    let config = Config::load();
    let ctx = AppContext::new(&cli, &config)?;

    match &cli.command {
        Commands::Search(args) => search::run(args, &cli, &ctx)?,
        Commands::Validate(args) => validate::run(args, &cli, &ctx)?,
        Commands::Infer(args) => infer::run(args, &cli, &ctx)?,
        Commands::Repos => repos::run(&cli, &ctx)?,
        Commands::Repo(args) => repo::run(args, &cli, &ctx)?,
        Commands::Config(_) | Commands::Completions(_) => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(args: &[&str]) -> Commands {
        let mut argv = vec!["gitonto"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn test_hierarchy_only_for_infer() {
        assert!(command(&["infer"]).uses_hierarchy());
        assert!(!command(&["infer", "--no-hierarchy"]).uses_hierarchy());
        assert!(!command(&["search", "type:merge"]).uses_hierarchy());
        assert!(!command(&["validate"]).uses_hierarchy());
    }

    #[test]
    fn test_context_records_attached_reasoner() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, r#"{"commits": [{"id": "c0"}]}"#).unwrap();
        let path = path.to_str().unwrap();

        let cli = Cli::try_parse_from(["gitonto", "--snapshot", path, "infer"]).unwrap();
        let ctx = AppContext::new(&cli, &Config::default()).unwrap();
        assert!(ctx.snapshot.profile().reasoner_available);

        let cli = Cli::try_parse_from(["gitonto", "--snapshot", path, "infer", "--no-hierarchy"]).unwrap();
        let ctx = AppContext::new(&cli, &Config::default()).unwrap();
        assert!(!ctx.snapshot.profile().reasoner_available);
    }
}
