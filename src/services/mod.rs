//! Service layer for the sync pipeline.
//!
//! This module contains the business logic for:
//! - Page extraction (`MarkupExtractor`)
//! - Page URL derivation (`EventUrls`)
//! - Member reconciliation (`Reconciler`)

mod extract;
mod reconcile;
mod urls;

pub use extract::MarkupExtractor;
pub use reconcile::{
    MemberChange, MemberSighting, MergeMode, ReconcilePlan, Reconciler, SyncReport, merge_member,
};
pub use urls::EventUrls;
