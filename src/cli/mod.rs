//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{ListCommand, PageCommand, RepoCommand, RunCommand, UploadImageCommand, ValidateCommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Console for AI-assisted software delivery pipelines
#[derive(Debug, Parser, Clone)]
#[command(name = "genconsole")]
#[command(version)]
#[command(about = "Drive step-by-step generation pipelines against a console backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to console settings file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend URL (overrides settings)
    #[arg(long, global = true)]
    pub base_url: Option<String>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run a pipeline
    Run(RunCommand),

    /// Validate a pipeline configuration
    Validate(ValidateCommand),

    /// List built-in pipelines and pages
    List(ListCommand),

    /// Open a console page
    Page(PageCommand),

    /// Repository inspection and cache analysis
    #[command(subcommand)]
    Repo(RepoCommand),

    /// Upload an image for image-to-code
    UploadImage(UploadImageCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
