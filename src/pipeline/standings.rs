// src/pipeline/standings.rs

//! Standings read pipeline.

use crate::error::Result;
use crate::models::Standings;
use crate::pipeline::PipelineContext;

/// Fetch a leaderboard page as given and extract its standings.
pub async fn run_fetch_standings(ctx: &PipelineContext, leaderboard_url: &str) -> Result<Standings> {
    let html = ctx.fetcher.fetch("scoreboard data", leaderboard_url).await?;
    let standings = ctx.extractor.extract_standings(&html);

    log::info!(
        "Extracted {} divisions ({} rows) from {}",
        standings.len(),
        standings.entry_count(),
        leaderboard_url
    );
    Ok(standings)
}
