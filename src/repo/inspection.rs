//! Repository inspection: clone, index, then ask questions about the code

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::{require_url, AnalysisKind, RepoError};
use crate::backend::{GenerationResponse, HttpBackend};

pub const CLONE_AND_INDEX_PATH: &str = "/repo_inspection/clone_and_index";
pub const GENERATE_ANALYSIS_PATH: &str = "/repo_inspection/generate_analysis";

/// A cloned and indexed repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedRepo {
    pub message: String,
    /// Relative paths of every file
    pub index: Vec<String>,
    /// Concatenated text of the readable files
    pub text: String,
}

/// Inspection session for one repository at a time
pub struct RepoInspector {
    backend: HttpBackend,
    indexed: Option<IndexedRepo>,
}

impl RepoInspector {
    pub fn new(backend: HttpBackend) -> Self {
        Self {
            backend,
            indexed: None,
        }
    }

    pub fn indexed(&self) -> Option<&IndexedRepo> {
        self.indexed.as_ref()
    }

    /// Clone and index a repository, replacing any earlier one
    ///
    /// A failed clone leaves no repository indexed.
    pub async fn clone_and_index(&mut self, repo_url: &str) -> Result<&IndexedRepo, RepoError> {
        let repo_url = require_url(repo_url)?;
        self.indexed = None;

        info!("Cloning and indexing {}", repo_url);
        let repo: IndexedRepo = self
            .backend
            .post_json(CLONE_AND_INDEX_PATH, &json!({ "repo_url": repo_url }))
            .await?;
        info!("Indexed {} files", repo.index.len());

        Ok(&*self.indexed.insert(repo))
    }

    /// Ask the model about the indexed repository
    pub async fn analyze(
        &self,
        kind: AnalysisKind,
        custom_question: Option<&str>,
        model_name: &str,
    ) -> Result<GenerationResponse, RepoError> {
        let question = kind.question(custom_question)?;
        let repo = self.indexed.as_ref().ok_or(RepoError::NotIndexed)?;

        info!("Generating {} analysis with {}", kind, model_name);
        let response = self
            .backend
            .post_json(
                GENERATE_ANALYSIS_PATH,
                &json!({
                    "model_name": model_name,
                    "question": question,
                    "code_index": repo.index,
                    "code_text": repo.text,
                }),
            )
            .await?;
        Ok(response)
    }

    /// Forget the indexed repository
    pub fn clear(&mut self) {
        self.indexed = None;
    }
}
