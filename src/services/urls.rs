// src/services/urls.rs

//! Page URL derivation from an event reference.

use crate::models::{EventReference, UrlConfig};

/// The two pages a full sync reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventUrls {
    /// Leaderboard page
    pub standings: String,
    /// Participant list page
    pub roster: String,
}

impl EventUrls {
    /// Derive both page URLs.
    ///
    /// The roster URL swaps every leaderboard suffix for the participants
    /// suffix (a reference without the suffix is used unchanged). The
    /// standings URL appends the leaderboard suffix.
    pub fn derive(event: &EventReference, config: &UrlConfig) -> Self {
        let reference = event.as_str();
        Self {
            standings: format!("{reference}{}", config.leaderboard_suffix),
            roster: reference.replace(&config.leaderboard_suffix, &config.participants_suffix),
        }
    }
}
