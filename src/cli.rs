//! Command-line interface definitions for the article harvester.
//!
//! Global options select the store and config file; each subcommand maps to
//! one operation. The store and config paths can also come from the
//! environment.

use crate::models::{Source, SourceSelection};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Harvest every source into ./articles.json
/// article_harvester fetch
///
/// # Just one source, into a different store
/// article_harvester --store /data/news.json fetch --source itbrew
///
/// # Scheduled mode, once an hour
/// article_harvester auto-fetch --interval 1h
///
/// # Wipe and re-harvest
/// article_harvester refresh --confirm
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the JSON article store
    #[arg(short, long, global = true, env = "ARTICLE_HARVESTER_STORE")]
    pub store: Option<PathBuf>,

    /// Optional path to a YAML config file
    #[arg(short, long, global = true, env = "ARTICLE_HARVESTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Work on an in-memory copy of the store; nothing is written
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Harvest the latest articles from one source or all of them
    Fetch {
        #[arg(long, value_enum, default_value_t = SourceArg::All)]
        source: SourceArg,
    },

    /// Harvest all sources, for use from a scheduler
    AutoFetch {
        /// Keep running, harvesting again after this long (e.g. "30m", "1h")
        #[arg(long)]
        interval: Option<humantime::Duration>,
    },

    /// Delete every stored article and harvest again
    Refresh {
        /// Required; without it nothing is deleted
        #[arg(long)]
        confirm: bool,
    },

    /// Print the stored articles, newest first
    Show {
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the supported sources
    Sources,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceArg {
    Bleepingcomputer,
    Morningbrew,
    Itbrew,
    All,
}

impl From<SourceArg> for SourceSelection {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Bleepingcomputer => SourceSelection::One(Source::BleepingComputer),
            SourceArg::Morningbrew => SourceSelection::One(Source::MorningBrew),
            SourceArg::Itbrew => SourceSelection::One(Source::ItBrew),
            SourceArg::All => SourceSelection::All,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Markdown,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_fetch_defaults_to_all() {
        let cli = Cli::parse_from(["article_harvester", "fetch"]);
        assert_eq!(cli.command, Command::Fetch { source: SourceArg::All });
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_fetch_single_source() {
        let cli = Cli::parse_from(["article_harvester", "fetch", "--source", "itbrew"]);
        let Command::Fetch { source } = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(SourceSelection::from(source), SourceSelection::One(Source::ItBrew));
    }

    #[test]
    fn test_cli_names_match_sources() {
        for source in Source::ALL {
            let arg = SourceArg::from_str(source.cli_name(), false).unwrap();
            assert_eq!(SourceSelection::from(arg), SourceSelection::One(source));
        }
    }

    #[test]
    fn test_unknown_source_rejected() {
        assert!(Cli::try_parse_from(["article_harvester", "fetch", "--source", "cnn"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "article_harvester",
            "show",
            "--format",
            "json",
            "--store",
            "/tmp/a.json",
            "--dry-run",
        ]);
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/a.json")));
        assert!(cli.dry_run);
        assert_eq!(
            cli.command,
            Command::Show {
                format: OutputFormat::Json,
                output: None
            }
        );
    }

    #[test]
    fn test_auto_fetch_interval() {
        let cli = Cli::parse_from(["article_harvester", "auto-fetch", "--interval", "1h 30m"]);
        let Command::AutoFetch { interval: Some(interval) } = cli.command else {
            panic!("expected auto-fetch with interval");
        };
        assert_eq!(Duration::from(interval), Duration::from_secs(5400));
    }

    #[test]
    fn test_refresh_requires_explicit_confirm() {
        let cli = Cli::parse_from(["article_harvester", "refresh"]);
        assert_eq!(cli.command, Command::Refresh { confirm: false });
    }
}
