// src/testing.rs

//! Shared test fixtures: scoring-platform page builders and a wired context.

use std::sync::Arc;

use crate::models::Config;
use crate::pipeline::PipelineContext;
use crate::storage::MemoryStore;
use crate::utils::http::StaticFetcher;

pub(crate) fn standings_row(position: &str, name: &str) -> String {
    format!(
        r#"<tr>
            <td><div><span class="text-xs">{position}</span></div></td>
            <td><a><span class="text-wrap text-start">{name}</span></a></td>
            <td>120 pts</td>
        </tr>"#
    )
}

/// Leaderboard page with one block per `(division, rows)`.
pub(crate) fn standings_page(divisions: &[(&str, Vec<(&str, &str)>)]) -> String {
    let blocks: String = divisions
        .iter()
        .map(|(division, rows)| {
            let rows: String = rows.iter().map(|(p, n)| standings_row(p, n)).collect();
            format!(
                r#"<div class="flex-col">
                    <h2 class="text-large-strong"> {division} </h2>
                    <table><thead><tr><th>#</th></tr></thead><tbody>{rows}</tbody></table>
                </div>"#
            )
        })
        .collect();
    format!(r#"<html><body><div class="flex flex-col gap-y-4">{blocks}</div></body></html>"#)
}

pub(crate) fn roster_row(name: &str, handle: &str) -> String {
    format!(
        r#"<div class="flex items-center justify-between gap-x-2 w-full">
            <div>
                <p class="mb-1 leading-none">{name}</p>
                <div class="text-subtle"><p class="leading-none">{handle}</p></div>
            </div>
            <button>Follow</button>
        </div>"#
    )
}

/// Participants page with one division block per row list.
pub(crate) fn roster_page(blocks: &[Vec<(&str, &str)>]) -> String {
    let blocks: String = blocks
        .iter()
        .map(|rows| {
            let rows: String = rows.iter().map(|(n, h)| roster_row(n, h)).collect();
            format!(
                r#"<div class="border-divider xs:p-5 w-full border-b px-1 py-3"><h3>Division</h3>{rows}</div>"#
            )
        })
        .collect();
    format!("<html><body><main>{blocks}</main></body></html>")
}

/// Context over an in-memory store and canned pages.
pub(crate) fn context(store: Arc<MemoryStore>, fetcher: StaticFetcher) -> PipelineContext {
    PipelineContext::new(Arc::new(Config::default()), store, Arc::new(fetcher))
        .expect("default selectors compile")
}
