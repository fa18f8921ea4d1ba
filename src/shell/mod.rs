//! Page shell: the registry of console pages and loading them

pub mod pages;

pub use pages::{Page, PageKind, PAGES};

use crate::backend::{FragmentSource, GenerationError};
use crate::core::{catalog, ConfigError, Pipeline};
use thiserror::Error;
use tracing::{info, warn};

/// Error types for page loading
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Page not found: {0}")]
    UnknownPage(String),

    #[error("Failed to load page {page}: {source}")]
    Fetch {
        page: String,
        #[source]
        source: GenerationError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// What a page needs once its fragment is in place
#[derive(Debug, Clone, PartialEq)]
pub enum PageInit {
    /// Nothing to initialize
    Static,
    /// A step wizard over this pipeline
    Wizard(Pipeline),
    RepoInspection,
    RepoCacheAnalysis,
}

/// A page whose fragment has been fetched
#[derive(Debug, Clone)]
pub struct OpenedPage {
    pub page: &'static Page,
    pub html: String,
    pub init: PageInit,
}

impl OpenedPage {
    /// "Category / Title" as shown in the breadcrumb
    pub fn breadcrumb(&self) -> String {
        format!("{} / {}", self.page.category, self.page.title)
    }
}

/// Loads pages from a fragment source
pub struct Shell<F> {
    source: F,
}

impl<F: FragmentSource> Shell<F> {
    pub fn new(source: F) -> Self {
        Self { source }
    }

    /// Fetch a page's fragment and resolve its initializer
    pub async fn open(&self, page_id: &str) -> Result<OpenedPage, ShellError> {
        let page = pages::find(page_id).ok_or_else(|| ShellError::UnknownPage(page_id.to_string()))?;

        let html = self.source.fetch_fragment(page.url).await.map_err(|source| {
            warn!("Failed to load page {}: {}", page.id, source);
            ShellError::Fetch {
                page: page.id.to_string(),
                source,
            }
        })?;

        let init = match page.kind {
            PageKind::Static => PageInit::Static,
            PageKind::Wizard(name) => PageInit::Wizard(catalog::pipeline(name)?),
            PageKind::RepoInspection => PageInit::RepoInspection,
            PageKind::RepoCacheAnalysis => PageInit::RepoCacheAnalysis,
        };

        info!("Opened page {} ({} bytes)", page.id, html.len());
        Ok(OpenedPage { page, html, init })
    }
}
