// src/services/extract.rs

//! Markup extractor.
//!
//! Reads division standings and participant rosters out of scoring-platform
//! pages using the configured CSS selectors. Missing structure yields empty
//! results rather than errors.

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{
    ParticipantEntry, RosterSelectors, SelectorConfig, StandingEntry, Standings,
    StandingsSelectors,
};

/// Compiled leaderboard selectors.
#[derive(Debug, Clone)]
struct StandingsPlan {
    division: Selector,
    heading: Selector,
    row: Selector,
    position: Selector,
    name: Selector,
}

impl StandingsPlan {
    fn compile(selectors: &StandingsSelectors) -> Result<Self> {
        Ok(Self {
            division: parse_selector(&selectors.division)?,
            heading: parse_selector(&selectors.heading)?,
            row: parse_selector(&selectors.row)?,
            position: parse_selector(&selectors.position)?,
            name: parse_selector(&selectors.name)?,
        })
    }
}

/// Compiled participant list selectors.
#[derive(Debug, Clone)]
struct RosterPlan {
    division: Selector,
    participant: Selector,
    name: Selector,
    user_id: Selector,
}

impl RosterPlan {
    fn compile(selectors: &RosterSelectors) -> Result<Self> {
        Ok(Self {
            division: parse_selector(&selectors.division)?,
            participant: parse_selector(&selectors.participant)?,
            name: parse_selector(&selectors.name)?,
            user_id: parse_selector(&selectors.user_id)?,
        })
    }
}

/// Turns fetched HTML into standings and roster records.
#[derive(Debug, Clone)]
pub struct MarkupExtractor {
    standings: StandingsPlan,
    roster: RosterPlan,
}

impl MarkupExtractor {
    /// Compile every configured selector.
    pub fn from_config(config: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            standings: StandingsPlan::compile(&config.standings)?,
            roster: RosterPlan::compile(&config.roster)?,
        })
    }

    /// Extract division standings from a leaderboard page.
    pub fn extract_standings(&self, html: &str) -> Standings {
        let document = Html::parse_document(html);
        let plan = &self.standings;
        let mut standings = Standings::new();

        for block in document.select(&plan.division) {
            let division = select_text(&block, &plan.heading);
            let entries: Vec<StandingEntry> = block
                .select(&plan.row)
                .map(|row| {
                    StandingEntry::new(
                        &division,
                        &select_text(&row, &plan.position),
                        &select_text(&row, &plan.name),
                    )
                })
                .collect();

            log::debug!("Division '{}': {} rows", division, entries.len());
            standings.insert(division, entries);
        }

        standings
    }

    /// Extract participants from a roster page, in block then row order.
    pub fn extract_roster(&self, html: &str) -> Vec<ParticipantEntry> {
        let document = Html::parse_document(html);
        let plan = &self.roster;
        let mut participants = Vec::new();

        for block in document.select(&plan.division) {
            for row in block.select(&plan.participant) {
                let name = select_text(&row, &plan.name);
                let user_id = select_text(&row, &plan.user_id);

                match ParticipantEntry::from_raw(&name, &user_id) {
                    Some(entry) => participants.push(entry),
                    None => log::debug!(
                        "Skipping participant row (name={:?}, user_id={:?})",
                        name,
                        user_id
                    ),
                }
            }
        }

        participants
    }
}

/// Concatenated text of every match under `scope`, trimmed.
fn select_text(scope: &ElementRef, selector: &Selector) -> String {
    scope
        .select(selector)
        .flat_map(|el| el.text())
        .collect::<String>()
        .trim()
        .to_string()
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
