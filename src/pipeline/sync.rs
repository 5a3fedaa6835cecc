// src/pipeline/sync.rs

//! Full member sync pipeline.

use crate::error::Result;
use crate::models::EventReference;
use crate::pipeline::PipelineContext;
use crate::services::{EventUrls, SyncReport};

/// Fetch roster and standings for an event and reconcile its organization.
pub async fn run_full_sync(ctx: &PipelineContext, event: &EventReference) -> Result<SyncReport> {
    let urls = EventUrls::derive(event, &ctx.config.urls);

    let roster_html = ctx.fetcher.fetch("participant data", &urls.roster).await?;
    let standings_html = ctx.fetcher.fetch("scoreboard data", &urls.standings).await?;

    let participants = ctx.extractor.extract_roster(&roster_html);
    let standings = ctx.extractor.extract_standings(&standings_html);
    log::info!(
        "Event {}: {} participants, {} standings rows",
        event,
        participants.len(),
        standings.entry_count()
    );

    let reconciler = ctx.reconciler();
    let scope = reconciler.resolve_scope(event).await?;
    let report = reconciler
        .full_sync(&scope, &participants, &standings)
        .await?;

    log::info!(
        "Synced organization {}: {} created, {} updated ({} fields), {} unchanged",
        scope,
        report.created,
        report.updated,
        report.field_updates,
        report.unchanged
    );
    Ok(report)
}
