// src/models/member.rs

//! Organization member documents.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::StandingEntry;
use crate::storage::Document;

/// Stored field names.
pub mod fields {
    pub const NAME: &str = "name";
    pub const NAME_LOWERCASE: &str = "nameLowercase";
    pub const POSITION: &str = "position";
    pub const POSITION_NO: &str = "positionNo";
}

/// A competitor's membership record within an organization.
///
/// Keyed by the external user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationMember {
    pub name: String,
    #[serde(default)]
    pub name_lowercase: String,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub division: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub position_no: i64,
    #[serde(default)]
    pub tag: i64,
    #[serde(default)]
    pub starting_tag: i64,
    #[serde(default, rename = "checkedin")]
    pub checked_in: bool,
}

impl OrganizationMember {
    /// A new member with every other field at its default.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            name_lowercase: name.to_lowercase(),
            admin: false,
            division: String::new(),
            position: String::new(),
            position_no: 0,
            tag: 0,
            starting_tag: 0,
            checked_in: false,
        }
    }

    /// Apply a standings datum to a member being created.
    ///
    /// An unranked label keeps the default numeric position.
    pub fn with_standing(mut self, standing: Option<&StandingEntry>) -> Self {
        if let Some(entry) = standing {
            self.position = entry.position.clone();
            self.position_no = entry.position_no.stored_value();
        }
        self
    }

    /// Full document representation.
    pub fn to_document(&self) -> Result<Document> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(AppError::store(format!(
                "member serialized to a non-object value: {other}"
            ))),
        }
    }
}

/// Field-level changes for an existing member.
///
/// Only fields that differ from the stored document are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberUpdate {
    pub name: Option<String>,
    pub name_lowercase: Option<String>,
    pub position: Option<String>,
    pub position_no: Option<i64>,
}

impl MemberUpdate {
    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }

    /// Number of fields this update writes.
    pub fn field_count(&self) -> usize {
        [
            self.name.is_some(),
            self.name_lowercase.is_some(),
            self.position.is_some(),
            self.position_no.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    /// The changed fields as a partial document.
    pub fn to_fields(&self) -> Document {
        let mut doc = Document::new();
        if let Some(name) = &self.name {
            doc.insert(fields::NAME.into(), Value::from(name.as_str()));
        }
        if let Some(lower) = &self.name_lowercase {
            doc.insert(fields::NAME_LOWERCASE.into(), Value::from(lower.as_str()));
        }
        if let Some(position) = &self.position {
            doc.insert(fields::POSITION.into(), Value::from(position.as_str()));
        }
        if let Some(position_no) = self.position_no {
            doc.insert(fields::POSITION_NO.into(), Value::from(position_no));
        }
        doc
    }
}
