use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use crate::auth::Token;
use crate::collector::CycleTimeCollector;
use crate::config::Config;
use crate::output;
use crate::providers::github::GitHubClient;
use crate::providers::zenhub::ZenHubClient;

#[derive(Parser)]
#[command(name = "cycletime")]
#[command(author, version, about = "Issue Cycle Time Reporter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write the full report as JSON to this file
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,

    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute weekly cycle time averages for the configured repositories
    Report {
        /// As-of date (YYYY-MM-DD); defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Weeks of history to include, overriding the configuration
        #[arg(short, long)]
        weeks: Option<u32>,

        #[arg(long, env = "GITHUB_TOKEN")]
        github_token: Option<String>,

        #[arg(long, env = "ZENHUB_TOKEN")]
        zenhub_token: Option<String>,

        /// Print a per-issue breakdown under each week
        #[arg(long, default_value_t = false)]
        details: bool,
    },
    /// Write a starter configuration file
    Init {
        /// Where to write it
        #[arg(default_value = "cycletime.toml")]
        path: PathBuf,
    },
}

impl Cli {
    async fn execute_report(
        &self,
        date: Option<NaiveDate>,
        weeks: Option<u32>,
        github_token: &Option<String>,
        zenhub_token: &Option<String>,
        details: bool,
    ) -> Result<()> {
        let mut config = Config::load(self.config.as_deref())?;

        // CLI arguments and environment win over the file
        if let Some(token) = github_token {
            config.github.token = Some(token.clone());
        }
        if let Some(token) = zenhub_token {
            config.zenhub.token = Some(token.clone());
        }
        if let Some(weeks) = weeks {
            config.report.weeks = weeks;
        }
        if details {
            config.report.print_issue_details = true;
        }

        init_logging(self.verbose || config.report.debug);
        config.validate()?;

        let as_of = date.unwrap_or_else(|| Utc::now().date_naive());
        info!("Reporting cycle times as of {as_of}");

        let github = GitHubClient::new(
            config.github.base_url.clone(),
            config.github.token.as_deref().map(Token::from),
        )?;
        let zenhub = ZenHubClient::new(
            &config.zenhub.base_url,
            config.zenhub.token.as_deref().map(Token::from),
        )?;

        let collector = CycleTimeCollector::new(github, zenhub, config.report.clone());
        let report = collector.collect(as_of).await?;

        output::print_summary(&report, config.report.print_issue_details);

        if let Some(output_path) = &self.output {
            let json_output = if self.pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            std::fs::write(output_path, json_output)
                .with_context(|| format!("Failed to write report to {}", output_path.display()))?;
            info!("Report written to: {}", output_path.display());
        }

        Ok(())
    }

    fn execute_init(&self, path: &PathBuf) -> Result<()> {
        init_logging(self.verbose);

        if path.exists() {
            anyhow::bail!("{} already exists, not overwriting", path.display());
        }

        Config::example().save(path)?;
        println!("Wrote starter configuration to {}", path.display());

        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Report {
                date,
                weeks,
                github_token,
                zenhub_token,
                details,
            } => {
                self.execute_report(*date, *weeks, github_token, zenhub_token, *details)
                    .await
            }
            Commands::Init { path } => self.execute_init(path),
        }
    }
}

fn init_logging(debug: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_report_with_date_and_weeks() {
        let cli = Cli::parse_from(["cycletime", "report", "--date", "2026-08-29", "--weeks", "2"]);
        match cli.command {
            Commands::Report { date, weeks, .. } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2026, 8, 29));
                assert_eq!(weeks, Some(2));
            }
            Commands::Init { .. } => panic!("expected report subcommand"),
        }
    }

    #[test]
    fn init_defaults_to_toml_file() {
        let cli = Cli::parse_from(["cycletime", "init"]);
        match cli.command {
            Commands::Init { path } => assert_eq!(path, PathBuf::from("cycletime.toml")),
            Commands::Report { .. } => panic!("expected init subcommand"),
        }
    }
}
