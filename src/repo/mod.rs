//! Repository tools: inspection, cached analysis and cost estimates

pub mod analysis;
pub mod cache;
pub mod cost;
pub mod inspection;

pub use analysis::AnalysisKind;
pub use cache::{CacheAnalyzer, CacheEntry, CachedAnalysis, HistoryEntry, ProcessedRepo};
pub use cost::{CostBreakdown, CostLedger, CostRow};
pub use inspection::{IndexedRepo, RepoInspector};

use crate::backend::GenerationError;
use thiserror::Error;

/// Error types for the repository tools
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Please enter a repository URL")]
    MissingUrl,

    #[error("Please provide a question for custom analysis")]
    MissingQuestion,

    #[error("Please clone and index a repository first")]
    NotIndexed,

    #[error("Please process a repository first")]
    NotProcessed,

    #[error("Unknown analysis type: {0}")]
    UnknownAnalysis(String),

    #[error("Please select a cache")]
    MissingCache,

    #[error(transparent)]
    Backend(#[from] GenerationError),
}

fn require_url(url: &str) -> Result<&str, RepoError> {
    let url = url.trim();
    if url.is_empty() {
        Err(RepoError::MissingUrl)
    } else {
        Ok(url)
    }
}
