// src/pipeline/seed.rs

//! Roster seeding pipeline.

use crate::error::Result;
use crate::models::EventReference;
use crate::pipeline::PipelineContext;
use crate::services::SyncReport;

/// Create members for every participant on a roster page.
///
/// The page is fetched and parsed before the event's organization is looked
/// up, so an unreachable page fails without touching the store.
pub async fn run_seed_roster(
    ctx: &PipelineContext,
    roster_url: &str,
    event: &EventReference,
) -> Result<SyncReport> {
    let html = ctx.fetcher.fetch("participant data", roster_url).await?;
    let participants = ctx.extractor.extract_roster(&html);
    log::info!("Extracted {} participants from {}", participants.len(), roster_url);

    let reconciler = ctx.reconciler();
    let scope = reconciler.resolve_scope(event).await?;
    let report = reconciler.seed_roster(&scope, &participants).await?;

    log::info!(
        "Seeded organization {}: {} created, {} already present",
        scope,
        report.created,
        report.unchanged
    );
    Ok(report)
}
