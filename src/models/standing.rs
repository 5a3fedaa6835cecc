// src/models/standing.rs

//! Division standings read from a leaderboard page.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Leading integer after the tie marker has been removed.
static LEADING_INT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?[0-9]+)").expect("rank pattern is valid"));

/// Tie marker prefixed to shared positions (e.g. `T2`).
const TIE_MARKER: char = 'T';

/// Numeric rank derived from a position label.
///
/// Serialized as a JSON number, or `null` when the label held no number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<i64>", into = "Option<i64>")]
pub enum Rank {
    /// Label parsed to an integer position
    Ranked(i64),
    /// Label present but not a number
    Unranked,
}

impl Rank {
    /// Derive a rank from a raw position label.
    ///
    /// A single leading tie marker is stripped, then the leading integer is
    /// parsed. Trailing text after the digits is ignored.
    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        let stripped = label.strip_prefix(TIE_MARKER).unwrap_or(label);

        LEADING_INT
            .captures(stripped)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<i64>().ok())
            .map_or(Rank::Unranked, Rank::Ranked)
    }

    /// Number written to a member's `positionNo`; unranked stores 0.
    pub fn stored_value(self) -> i64 {
        self.value().unwrap_or(0)
    }

    /// The numeric value, if ranked.
    pub fn value(self) -> Option<i64> {
        match self {
            Rank::Ranked(n) => Some(n),
            Rank::Unranked => None,
        }
    }
}

impl From<Option<i64>> for Rank {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Rank::Unranked, Rank::Ranked)
    }
}

impl From<Rank> for Option<i64> {
    fn from(rank: Rank) -> Self {
        rank.value()
    }
}

/// One competitor's row in a division table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingEntry {
    /// Division this row was read from
    #[serde(skip)]
    pub division: String,

    /// Raw position label, tie marker included
    pub position: String,

    /// Rank derived from the label
    pub position_no: Rank,

    /// Display name
    pub name: String,

    /// Case-folded display name
    pub name_lowercase: String,
}

impl StandingEntry {
    /// Build an entry from raw cell text.
    pub fn new(division: &str, position: &str, name: &str) -> Self {
        let position = position.trim();
        let name = name.trim();
        Self {
            division: division.to_string(),
            position: position.to_string(),
            position_no: Rank::parse(position),
            name: name.to_string(),
            name_lowercase: name.to_lowercase(),
        }
    }
}

/// A named division and its rows in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Division {
    pub name: String,
    pub entries: Vec<StandingEntry>,
}

/// Division name to entries, in document order.
///
/// Serializes as a JSON object whose keys keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Standings {
    divisions: Vec<Division>,
}

impl Standings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a division.
    ///
    /// A name seen before replaces the earlier entries but keeps its slot.
    pub fn insert(&mut self, name: impl Into<String>, entries: Vec<StandingEntry>) {
        let name = name.into();
        match self.divisions.iter_mut().find(|d| d.name == name) {
            Some(existing) => existing.entries = entries,
            None => self.divisions.push(Division { name, entries }),
        }
    }

    /// Entries for a division.
    pub fn get(&self, name: &str) -> Option<&[StandingEntry]> {
        self.divisions
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.entries.as_slice())
    }

    pub fn len(&self) -> usize {
        self.divisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.divisions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Division> {
        self.divisions.iter()
    }

    /// Total number of rows across all divisions.
    pub fn entry_count(&self) -> usize {
        self.divisions.iter().map(|d| d.entries.len()).sum()
    }

    /// Index entries by display name.
    ///
    /// Later rows win when two competitors share a name.
    pub fn index_by_name(&self) -> StandingsIndex<'_> {
        let mut by_name = HashMap::new();
        for entry in self.divisions.iter().flat_map(|d| d.entries.iter()) {
            by_name.insert(entry.name.as_str(), entry);
        }
        StandingsIndex { by_name }
    }
}

impl Serialize for Standings {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.divisions.iter().map(|d| (&d.name, &d.entries)))
    }
}

/// Name-keyed view over standings, used to join with the roster.
#[derive(Debug, Default)]
pub struct StandingsIndex<'a> {
    by_name: HashMap<&'a str, &'a StandingEntry>,
}

impl<'a> StandingsIndex<'a> {
    pub fn get(&self, name: &str) -> Option<&'a StandingEntry> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_parse() {
        assert_eq!(Rank::parse("1"), Rank::Ranked(1));
        assert_eq!(Rank::parse("T2"), Rank::Ranked(2));
        assert_eq!(Rank::parse("T10"), Rank::Ranked(10));
        assert_eq!(Rank::parse("abc"), Rank::Unranked);
    }

    #[test]
    fn test_rank_parse_lenient() {
        assert_eq!(Rank::parse("  7 "), Rank::Ranked(7));
        assert_eq!(Rank::parse("3rd"), Rank::Ranked(3));
        assert_eq!(Rank::parse(""), Rank::Unranked);
        assert_eq!(Rank::parse("T"), Rank::Unranked);
        // Only one tie marker is stripped
        assert_eq!(Rank::parse("TT2"), Rank::Unranked);
    }

    #[test]
    fn test_rank_parse_stops_at_non_ascii_digits() {
        assert_eq!(Rank::parse("1\u{0663}"), Rank::Ranked(1));
        assert_eq!(Rank::parse("\u{0663}"), Rank::Unranked);
    }

    #[test]
    fn test_rank_stored_value() {
        assert_eq!(Rank::Ranked(3).stored_value(), 3);
        assert_eq!(Rank::Unranked.stored_value(), 0);
    }

    #[test]
    fn test_rank_serializes_as_number_or_null() {
        assert_eq!(serde_json::to_string(&Rank::Ranked(4)).unwrap(), "4");
        assert_eq!(serde_json::to_string(&Rank::Unranked).unwrap(), "null");
        let back: Rank = serde_json::from_str("null").unwrap();
        assert_eq!(back, Rank::Unranked);
    }

    #[test]
    fn test_insert_repeated_division_keeps_slot() {
        let mut standings = Standings::new();
        standings.insert("Elite", vec![StandingEntry::new("Elite", "1", "Alice")]);
        standings.insert("Open", vec![]);
        standings.insert("Elite", vec![StandingEntry::new("Elite", "1", "Carol")]);

        let names: Vec<_> = standings.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["Elite", "Open"]);
        assert_eq!(standings.get("Elite").unwrap()[0].name, "Carol");
    }

    #[test]
    fn test_serialize_keeps_document_order() {
        let mut standings = Standings::new();
        standings.insert("Zeta", vec![]);
        standings.insert("Alpha", vec![StandingEntry::new("Alpha", "T2", "Bob")]);

        let json = serde_json::to_string(&standings).unwrap();
        assert_eq!(
            json,
            r#"{"Zeta":[],"Alpha":[{"position":"T2","positionNo":2,"name":"Bob","nameLowercase":"bob"}]}"#
        );
    }

    #[test]
    fn test_index_by_name_last_wins() {
        let mut standings = Standings::new();
        standings.insert("A", vec![StandingEntry::new("A", "1", "Sam")]);
        standings.insert("B", vec![StandingEntry::new("B", "5", "Sam")]);

        let index = standings.index_by_name();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("Sam").unwrap().position, "5");
        assert!(index.get("sam").is_none());
    }
}
