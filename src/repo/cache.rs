//! Cached repository analysis with a running cost estimate

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use super::{require_url, AnalysisKind, CostLedger, CostRow, RepoError};
use crate::backend::HttpBackend;

pub const PROCESS_PATH: &str = "/repo_cache_analysis/process";
pub const ANALYZE_PATH: &str = "/repo_cache_analysis/analyze";
pub const CACHES_PATH: &str = "/repo_cache_analysis/caches";
pub const HISTORY_PATH: &str = "/repo_cache_analysis/history";

/// Default cache lifetime in hours
pub const DEFAULT_TTL_HOURS: u32 = 1;

/// A processed repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRepo {
    pub message: String,
    pub char_count: usize,
    pub code_index: Vec<String>,
    pub code_text: String,
    /// Server-side cache handle, when the backend created one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_name: Option<String>,
}

/// A context cache held by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub expire_time: Option<String>,
}

fn last_segment(value: &Option<String>) -> &str {
    value
        .as_deref()
        .and_then(|v| v.rsplit('/').next())
        .unwrap_or("N/A")
}

impl CacheEntry {
    /// Cache ID without its resource path
    pub fn short_name(&self) -> &str {
        last_segment(&self.name)
    }

    pub fn short_model(&self) -> &str {
        last_segment(&self.model_name)
    }
}

/// A saved analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "type")]
    pub analysis_type: String,
    pub text: String,
    pub repo_url: String,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    analysis: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    message: String,
}

/// Result of one cached analysis
#[derive(Debug, Clone, PartialEq)]
pub struct CachedAnalysis {
    pub analysis: String,
    pub cost: CostRow,
}

/// Cache analysis session for one repository at a time
pub struct CacheAnalyzer {
    backend: HttpBackend,
    repo_url: Option<String>,
    processed: Option<ProcessedRepo>,
    ttl_hours: u32,
    ledger: CostLedger,
}

impl CacheAnalyzer {
    pub fn new(backend: HttpBackend) -> Self {
        Self {
            backend,
            repo_url: None,
            processed: None,
            ttl_hours: DEFAULT_TTL_HOURS,
            ledger: CostLedger::new(),
        }
    }

    pub fn processed(&self) -> Option<&ProcessedRepo> {
        self.processed.as_ref()
    }

    pub fn ledger(&self) -> &CostLedger {
        &self.ledger
    }

    /// Clone, index and cache a repository
    ///
    /// Starts a new cost ledger.
    pub async fn process(&mut self, repo_url: &str, ttl_hours: u32) -> Result<&ProcessedRepo, RepoError> {
        let repo_url = require_url(repo_url)?;
        let ttl_hours = ttl_hours.max(1);

        info!("Processing {} (ttl {}h)", repo_url, ttl_hours);
        let processed: ProcessedRepo = self
            .backend
            .post_json(
                PROCESS_PATH,
                &json!({ "repo_url": repo_url, "cache_ttl": ttl_hours }),
            )
            .await?;
        info!("Processed {} characters", processed.char_count);

        self.repo_url = Some(repo_url.to_string());
        self.ttl_hours = ttl_hours;
        self.ledger.clear();
        Ok(&*self.processed.insert(processed))
    }

    /// Analyze the processed repository and record its cost
    pub async fn analyze(
        &mut self,
        kind: AnalysisKind,
        custom_question: Option<&str>,
        model_name: &str,
    ) -> Result<CachedAnalysis, RepoError> {
        let (Some(repo), Some(repo_url)) = (self.processed.as_ref(), self.repo_url.as_deref()) else {
            return Err(RepoError::NotProcessed);
        };
        let question = kind.question(custom_question)?;

        info!("Running {} analysis on {}", kind, repo_url);
        let response: AnalyzeResponse = self
            .backend
            .post_json(
                ANALYZE_PATH,
                &json!({
                    "question": question,
                    "cache_name": repo.cache_name,
                    "code_index": repo.code_index,
                    "code_text": repo.code_text,
                    "repo_url": repo_url,
                    "analysis_type": kind.as_str(),
                    "model_name": model_name,
                }),
            )
            .await?;

        let char_count = repo.char_count;
        let cost = self
            .ledger
            .record(kind, char_count, self.ttl_hours, response.analysis.chars().count())
            .clone();
        Ok(CachedAnalysis {
            analysis: response.analysis,
            cost,
        })
    }

    pub async fn list_caches(&self) -> Result<Vec<CacheEntry>, RepoError> {
        Ok(self.backend.get_json(CACHES_PATH).await?)
    }

    /// Delete a cache by its full resource name
    pub async fn delete_cache(&self, name: &str) -> Result<String, RepoError> {
        if name.trim().is_empty() {
            return Err(RepoError::MissingCache);
        }
        let response: MessageResponse = self.backend.delete_json(CACHES_PATH, name).await.map_err(|e| {
            warn!("Failed to delete cache {}: {}", name, e);
            e
        })?;
        info!("{}", response.message);
        Ok(response.message)
    }

    /// Saved analyses, newest first
    pub async fn history(&self) -> Result<Vec<HistoryEntry>, RepoError> {
        Ok(self.backend.get_json(HISTORY_PATH).await?)
    }
}
