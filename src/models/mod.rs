// src/models/mod.rs

//! Domain models for the sync pipeline.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod event;
mod member;
mod participant;
mod standing;

// Re-export all public types
pub use config::{
    Config, HttpConfig, LoggingConfig, ReconcileConfig, RosterSelectors, SelectorConfig,
    StandingsSelectors, StoreBackend, StoreConfig, UrlConfig,
};
pub use event::{EventReference, ORGANIZATION_FIELD, OrganizationScope};
pub use member::{MemberUpdate, OrganizationMember, fields};
pub use participant::ParticipantEntry;
pub use standing::{Division, Rank, StandingEntry, Standings, StandingsIndex};
