// src/models/event.rs

//! Event and organization identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::Document;

/// Event document field naming the owning organization.
pub const ORGANIZATION_FIELD: &str = "organization";

/// Canonical event reference: the event's base URL.
///
/// Doubles as the event's document key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventReference(String);

impl EventReference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Organization that owns an event's member collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganizationScope(String);

impl OrganizationScope {
    pub fn new(organization_id: impl Into<String>) -> Self {
        Self(organization_id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }

    /// Event document body linking an event to this organization.
    pub fn event_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert(ORGANIZATION_FIELD.into(), Value::from(self.0.as_str()));
        doc
    }
}

impl fmt::Display for OrganizationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
