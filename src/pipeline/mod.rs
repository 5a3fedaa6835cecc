//! Pipeline entry points for sync operations.
//!
//! - `run_fetch_standings`: Read an event's leaderboard
//! - `run_seed_roster`: Create organization members from a roster page
//! - `run_full_sync`: Join roster and standings into the member store

pub mod seed;
pub mod standings;
pub mod sync;

use std::sync::Arc;

pub use seed::run_seed_roster;
pub use standings::run_fetch_standings;
pub use sync::run_full_sync;

use crate::error::Result;
use crate::models::Config;
use crate::services::{MarkupExtractor, Reconciler};
use crate::storage::DocumentStore;
use crate::utils::http::PageFetcher;

/// Everything a pipeline run needs, shared across requests.
#[derive(Clone)]
pub struct PipelineContext {
    pub config: Arc<Config>,
    pub store: Arc<dyn DocumentStore>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub extractor: MarkupExtractor,
}

impl PipelineContext {
    /// Wire a context, compiling the configured selectors.
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn DocumentStore>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Result<Self> {
        let extractor = MarkupExtractor::from_config(&config.selectors)?;
        Ok(Self {
            config,
            store,
            fetcher,
            extractor,
        })
    }

    pub fn reconciler(&self) -> Reconciler<'_> {
        Reconciler::new(
            self.store.as_ref(),
            &self.config.store,
            &self.config.reconcile,
        )
    }
}
