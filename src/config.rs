use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::metrics::PipelineDef;

/// Configuration file structure for cycletime.
///
/// Holds the repository list, the pipelines to measure and API credentials.
/// Configuration files are loaded from the current directory or a specified
/// path.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// GitHub API settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Board event service settings
    #[serde(default)]
    pub zenhub: ZenHubConfig,

    /// Report parameters
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitHubConfig {
    /// GitHub personal access token
    pub token: Option<String>,

    /// GitHub API base URL
    #[serde(default = "default_github_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ZenHubConfig {
    /// Board API access token
    pub token: Option<String>,

    /// Board API base URL
    #[serde(default = "default_zenhub_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReportConfig {
    /// Repositories to report on (format: owner/repo)
    #[serde(default)]
    pub repos: Vec<String>,

    /// Pipelines to measure, in priority order
    #[serde(default)]
    pub pipelines: Vec<PipelineDef>,

    /// Pipeline whose entry marks an issue as done
    #[serde(default = "default_end_pipeline")]
    pub end_pipeline: String,

    /// Issues carrying any of these labels are excluded from the search
    #[serde(default)]
    pub exclude_labels: Vec<String>,

    /// How many full weeks before the as-of date to include
    #[serde(default = "default_weeks")]
    pub weeks: u32,

    /// Enable debug-level logging of API traffic
    #[serde(default)]
    pub debug: bool,

    /// Print a per-issue breakdown under each weekly summary
    #[serde(default)]
    pub print_issue_details: bool,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: default_github_base_url(),
        }
    }
}

impl Default for ZenHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: default_zenhub_base_url(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            repos: vec![],
            pipelines: vec![],
            end_pipeline: default_end_pipeline(),
            exclude_labels: vec![],
            weeks: default_weeks(),
            debug: false,
            print_issue_details: false,
        }
    }
}

fn default_github_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_zenhub_base_url() -> String {
    "https://api.zenhub.io".to_string()
}

fn default_end_pipeline() -> String {
    "Done".to_string()
}

fn default_weeks() -> u32 {
    4
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./cycletime.toml
    /// 3. ./cycletime.json
    /// 4. ./cycletime.yaml
    /// 5. ./cycletime.yml
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = [
            "cycletime.toml",
            "cycletime.json",
            "cycletime.yaml",
            "cycletime.yml",
        ];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        // No config file found, return defaults
        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => {
                // Try TOML first, then JSON, then YAML
                toml::from_str(&contents)
                    .or_else(|_| serde_json::from_str(&contents))
                    .or_else(|_| serde_yaml::from_str(&contents))
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))
            }
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("yaml") | Some("yml") => serde_yaml::to_string(self)?,
            _ => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Reject configurations that cannot produce a report. Runs before any
    /// network call.
    pub fn validate(&self) -> Result<()> {
        if self.report.repos.is_empty() {
            anyhow::bail!("Configuration lists no repositories");
        }
        if self.report.pipelines.is_empty() {
            anyhow::bail!("Configuration lists no pipelines to measure");
        }
        if self.report.end_pipeline.is_empty() {
            anyhow::bail!("Configuration has an empty end-pipeline name");
        }
        Ok(())
    }

    /// A starter configuration with one example repository and a common
    /// three-column pipeline setup, for `cycletime init`.
    pub fn example() -> Self {
        Self {
            report: ReportConfig {
                repos: vec!["your-org/your-repo".to_string()],
                pipelines: vec![
                    PipelineDef {
                        name: "In Progress".to_string(),
                        id: "in-progress".to_string(),
                    },
                    PipelineDef {
                        name: "Review".to_string(),
                        id: "review".to_string(),
                    },
                    PipelineDef {
                        name: "QA".to_string(),
                        id: "qa".to_string(),
                    },
                ],
                end_pipeline: "Done".to_string(),
                exclude_labels: vec!["wontfix".to_string()],
                ..ReportConfig::default()
            },
            ..Self::default()
        }
    }
}
