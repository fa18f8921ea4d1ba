//! CLI command definitions

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::core::{ConcurrencyPolicy, StalenessPolicy};
use crate::repo::cache::DEFAULT_TTL_HOURS;

/// Run a pipeline step by step
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Built-in pipeline name
    #[arg(short, long, required_unless_present = "file", conflicts_with = "file")]
    pub pipeline: Option<String>,

    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Static field overrides (key=value)
    #[arg(long, value_parser = parse_key_value)]
    pub field: Vec<(String, String)>,

    /// Image-to-code use case; "Test Plan Generation" selects the test workflow
    #[arg(long)]
    pub use_case: Option<String>,

    /// Upload an image first and send it as `image_data`
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Stop after this step
    #[arg(long)]
    pub through: Option<String>,

    /// Regenerate these steps after the run (repeatable)
    #[arg(long)]
    pub regenerate: Vec<String>,

    /// Concurrency policy
    #[arg(long, value_enum)]
    pub concurrency: Option<ConcurrencyArg>,

    /// What regeneration does to later steps
    #[arg(long, value_enum)]
    pub staleness: Option<StalenessArg>,

    /// Print full step output instead of a preview
    #[arg(long)]
    pub full: bool,

    /// Print the final run snapshot as JSON
    #[arg(long)]
    pub json: bool,
}

/// The only pipeline that takes `--use-case`
pub const USE_CASE_PIPELINE: &str = "image_to_code";

impl RunCommand {
    /// Reject `--use-case` for pipelines that would ignore it
    pub fn check_use_case(&self) -> Result<(), String> {
        match (&self.use_case, self.pipeline.as_deref()) {
            (Some(use_case), pipeline) if pipeline != Some(USE_CASE_PIPELINE) => Err(format!(
                "--use-case '{}' only applies to --pipeline {}",
                use_case, USE_CASE_PIPELINE
            )),
            _ => Ok(()),
        }
    }
}

/// Validate a pipeline configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// List built-in pipelines and pages
#[derive(Debug, Args, Clone)]
pub struct ListCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Open a console page
#[derive(Debug, Args, Clone)]
pub struct PageCommand {
    /// Page ID, e.g. story_to_code
    pub id: String,

    /// Print the fetched HTML fragment
    #[arg(long)]
    pub html: bool,
}

/// Upload an image for image-to-code
#[derive(Debug, Args, Clone)]
pub struct UploadImageCommand {
    /// Image file
    #[arg(short, long)]
    pub file: PathBuf,
}

/// Repository tools
#[derive(Debug, Subcommand, Clone)]
pub enum RepoCommand {
    /// Clone, index and ask one question about a repository
    Inspect {
        #[arg(long)]
        url: String,

        /// summary, readme, onboarding, issues, bug_fix, troubleshooting or custom
        #[arg(long, default_value = "summary")]
        analysis: String,

        /// Question for custom analysis
        #[arg(long)]
        question: Option<String>,

        /// Model override
        #[arg(long)]
        model: Option<String>,
    },

    /// Clone, index and cache a repository
    Process {
        #[arg(long)]
        url: String,

        /// Cache lifetime in hours
        #[arg(long, default_value_t = DEFAULT_TTL_HOURS)]
        ttl: u32,
    },

    /// Process a repository and run analyses against it with cost estimates
    Analyze {
        #[arg(long)]
        url: String,

        #[arg(long, default_value_t = DEFAULT_TTL_HOURS)]
        ttl: u32,

        /// Analysis kinds to run in order (repeatable)
        #[arg(long, default_value = "summary")]
        analysis: Vec<String>,

        #[arg(long)]
        question: Option<String>,

        #[arg(long)]
        model: Option<String>,

        /// Print full analysis text instead of a preview
        #[arg(long)]
        full: bool,
    },

    /// List active caches
    Caches {
        #[arg(long)]
        json: bool,
    },

    /// Delete a cache by its full name
    DeleteCache { name: String },

    /// Show saved analyses
    History {
        #[arg(long)]
        json: bool,
    },
}

/// Concurrency policy argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ConcurrencyArg {
    Exclusive,
    #[clap(name = "per-step")]
    PerStep,
}

impl From<ConcurrencyArg> for ConcurrencyPolicy {
    fn from(arg: ConcurrencyArg) -> Self {
        match arg {
            ConcurrencyArg::Exclusive => ConcurrencyPolicy::Exclusive,
            ConcurrencyArg::PerStep => ConcurrencyPolicy::PerStep,
        }
    }
}

/// Staleness policy argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StalenessArg {
    Keep,
    Invalidate,
}

impl From<StalenessArg> for StalenessPolicy {
    fn from(arg: StalenessArg) -> Self {
        match arg {
            StalenessArg::Keep => StalenessPolicy::Keep,
            StalenessArg::Invalidate => StalenessPolicy::Invalidate,
        }
    }
}

/// Parse key=value pairs
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("Invalid key=value pair: {}", s)),
    }
}
