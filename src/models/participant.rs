// src/models/participant.rs

//! Participant rows read from a roster page.

use serde::{Deserialize, Serialize};

/// Handle prefix shown before user identifiers.
const HANDLE_MARKER: char = '@';

/// A registered competitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantEntry {
    /// Display name
    pub name: String,

    /// Case-folded display name
    pub name_lowercase: String,

    /// External user identifier, without the handle marker
    pub user_id: String,
}

impl ParticipantEntry {
    /// Build an entry from raw cell text.
    ///
    /// Returns `None` unless both the trimmed name and the stripped
    /// identifier are non-empty.
    pub fn from_raw(raw_name: &str, raw_user_id: &str) -> Option<Self> {
        let name = raw_name.trim();
        let user_id = raw_user_id.trim();
        let user_id = user_id.strip_prefix(HANDLE_MARKER).unwrap_or(user_id);

        if name.is_empty() || user_id.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            name_lowercase: name.to_lowercase(),
            user_id: user_id.to_string(),
        })
    }
}
