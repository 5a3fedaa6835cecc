// src/services/reconcile.rs

//! Member reconciliation.
//!
//! Joins extracted roster and standings data against the stored member
//! collection of an organization and stages the resulting writes in a single
//! [`WriteBatch`]. Two modes exist:
//!
//! - **Roster seed**: create members that do not exist yet, leave existing
//!   ones untouched.
//! - **Full sync**: create missing members and update only the fields of
//!   existing members that actually changed.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{
    EventReference, MemberUpdate, ORGANIZATION_FIELD, OrganizationMember, OrganizationScope,
    ParticipantEntry, ReconcileConfig, StandingEntry, Standings, StoreConfig, fields,
};
use crate::storage::{Document, DocumentStore, WriteBatch, paths};

/// How an existing member document is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Existing members are never written
    CreateOnly,
    /// Existing members receive field-level updates
    Sync,
}

/// A competitor observed on the event pages.
#[derive(Debug, Clone, Copy)]
pub struct MemberSighting<'a> {
    pub user_id: &'a str,
    pub name: &'a str,
    /// Standings row joined by display name, if any
    pub standing: Option<&'a StandingEntry>,
}

/// Write decided for one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberChange {
    Create(OrganizationMember),
    Update(MemberUpdate),
}

/// Decide what to write for one member.
///
/// Returns `None` when the stored document already matches (or, in
/// [`MergeMode::CreateOnly`], whenever it exists at all).
pub fn merge_member(
    existing: Option<&Document>,
    sighting: &MemberSighting<'_>,
    mode: MergeMode,
) -> Option<MemberChange> {
    let doc = match (existing, mode) {
        (None, _) => {
            let member = OrganizationMember::new(sighting.name).with_standing(sighting.standing);
            return Some(MemberChange::Create(member));
        }
        (Some(_), MergeMode::CreateOnly) => return None,
        (Some(doc), MergeMode::Sync) => doc,
    };

    let mut update = MemberUpdate::default();

    if str_field(doc, fields::NAME) != Some(sighting.name) {
        update.name = Some(sighting.name.to_string());
        let lower = sighting.name.to_lowercase();
        if str_field(doc, fields::NAME_LOWERCASE) != Some(lower.as_str()) {
            update.name_lowercase = Some(lower);
        }
    }

    if let Some(entry) = sighting.standing {
        if str_field(doc, fields::POSITION) != Some(entry.position.as_str()) {
            update.position = Some(entry.position.clone());
        }
        // Same value a creation would store, so history does not matter
        let position_no = entry.position_no.stored_value();
        if int_field(doc, fields::POSITION_NO) != Some(position_no) {
            update.position_no = Some(position_no);
        }
    }

    (!update.is_empty()).then_some(MemberChange::Update(update))
}

fn str_field<'d>(doc: &'d Document, field: &str) -> Option<&'d str> {
    doc.get(field).and_then(Value::as_str)
}

/// Integer field, accepting integral floats (e.g. `2.0`).
fn int_field(doc: &Document, field: &str) -> Option<i64> {
    let value = doc.get(field)?;
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Outcome counts of a reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Total fields written across all updates
    pub field_updates: usize,
}

impl SyncReport {
    /// Members that received a write.
    pub fn changed(&self) -> usize {
        self.created + self.updated
    }
}

/// Staged writes for a run, not yet committed.
#[derive(Debug, Clone)]
pub struct ReconcilePlan {
    pub scope: OrganizationScope,
    pub batch: WriteBatch,
    pub report: SyncReport,
}

/// Reconciles extracted data against a document store.
pub struct Reconciler<'a> {
    store: &'a dyn DocumentStore,
    store_config: &'a StoreConfig,
    config: &'a ReconcileConfig,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        store: &'a dyn DocumentStore,
        store_config: &'a StoreConfig,
        config: &'a ReconcileConfig,
    ) -> Self {
        Self {
            store,
            store_config,
            config,
        }
    }

    /// Look up the organization that owns an event.
    pub async fn resolve_scope(&self, event: &EventReference) -> Result<OrganizationScope> {
        let path = paths::event(self.store_config, event);
        let doc = self
            .store
            .get(&path)
            .await?
            .ok_or_else(|| AppError::not_found(format!("event {event} is not registered")))?;

        let organization = doc
            .get(ORGANIZATION_FIELD)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                AppError::not_found(format!("event {event} has no {ORGANIZATION_FIELD}"))
            })?;

        log::debug!("Event {} belongs to organization {}", event, organization);
        Ok(OrganizationScope::new(organization))
    }

    /// Stage creations for roster participants not yet in the organization.
    ///
    /// A user id listed twice is staged once, from its first row.
    pub async fn plan_roster_seed(
        &self,
        scope: &OrganizationScope,
        participants: &[ParticipantEntry],
    ) -> Result<ReconcilePlan> {
        let mut seen = HashSet::new();
        let mut sightings = Vec::with_capacity(participants.len());
        for p in participants {
            if !seen.insert(p.user_id.as_str()) {
                log::debug!("Duplicate roster row for {}, keeping the first", p.user_id);
                continue;
            }
            sightings.push(MemberSighting {
                user_id: &p.user_id,
                name: &p.name,
                standing: None,
            });
        }

        self.plan(scope, &sightings, MergeMode::CreateOnly).await
    }

    /// Stage creations and field updates joining roster and standings.
    ///
    /// The roster is keyed by user id (a repeated id takes its last name).
    /// Standings are joined by exact display name.
    pub async fn plan_full_sync(
        &self,
        scope: &OrganizationScope,
        participants: &[ParticipantEntry],
        standings: &Standings,
    ) -> Result<ReconcilePlan> {
        let index = standings.index_by_name();
        let sightings: Vec<MemberSighting<'_>> = roster_by_id(participants)
            .into_iter()
            .map(|(user_id, name)| MemberSighting {
                user_id,
                name,
                standing: index.get(name),
            })
            .collect();

        let joined = sightings.iter().filter(|s| s.standing.is_some()).count();
        log::debug!(
            "{} of {} roster members matched a standings row",
            joined,
            sightings.len()
        );

        self.plan(scope, &sightings, MergeMode::Sync).await
    }

    async fn plan(
        &self,
        scope: &OrganizationScope,
        sightings: &[MemberSighting<'_>],
        mode: MergeMode,
    ) -> Result<ReconcilePlan> {
        let guard = self.config.guard_creates && self.store.supports_conditional_create();
        if self.config.guard_creates && !guard {
            log::warn!("Store cannot guard creates; staging plain sets");
        }

        let mut batch = WriteBatch::new();
        let mut report = SyncReport::default();

        for sighting in sightings {
            let path = paths::member(self.store_config, scope, sighting.user_id);
            let existing = self.store.get(&path).await?;

            match merge_member(existing.as_ref(), sighting, mode) {
                Some(MemberChange::Create(member)) => {
                    let document = member.to_document()?;
                    if guard {
                        batch.create(path, document);
                    } else {
                        batch.set(path, document);
                    }
                    report.created += 1;
                }
                Some(MemberChange::Update(update)) => {
                    report.field_updates += update.field_count();
                    batch.update(path, update.to_fields());
                    report.updated += 1;
                }
                None => report.unchanged += 1,
            }
        }

        Ok(ReconcilePlan {
            scope: scope.clone(),
            batch,
            report,
        })
    }

    /// Commit a plan's batch.
    pub async fn apply(&self, plan: ReconcilePlan) -> Result<SyncReport> {
        if !plan.batch.is_empty() {
            let summary = self.store.commit(plan.batch).await?;
            log::info!(
                "Committed {} writes for organization {}",
                summary.total(),
                plan.scope
            );
        }
        Ok(plan.report)
    }

    /// Seed the organization from a roster.
    pub async fn seed_roster(
        &self,
        scope: &OrganizationScope,
        participants: &[ParticipantEntry],
    ) -> Result<SyncReport> {
        let plan = self.plan_roster_seed(scope, participants).await?;
        self.apply(plan).await
    }

    /// Synchronize the organization with roster and standings.
    pub async fn full_sync(
        &self,
        scope: &OrganizationScope,
        participants: &[ParticipantEntry],
        standings: &Standings,
    ) -> Result<SyncReport> {
        let plan = self.plan_full_sync(scope, participants, standings).await?;
        self.apply(plan).await
    }
}

/// Roster as `(user_id, name)` pairs in first-seen order, last name wins.
fn roster_by_id(participants: &[ParticipantEntry]) -> Vec<(&str, &str)> {
    let mut order = Vec::new();
    let mut names: HashMap<&str, &str> = HashMap::new();

    for p in participants {
        if names.insert(&p.user_id, &p.name).is_none() {
            order.push(p.user_id.as_str());
        }
    }

    order
        .into_iter()
        .filter_map(|id| names.get(id).map(|name| (id, *name)))
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::storage::{BatchOp, DocPath, MemoryStore};

    fn participant(name: &str, user_id: &str) -> ParticipantEntry {
        ParticipantEntry::from_raw(name, user_id).unwrap()
    }

    fn standings(rows: &[(&str, &str)]) -> Standings {
        let mut standings = Standings::new();
        standings.insert(
            "Elite",
            rows.iter()
                .map(|(position, name)| StandingEntry::new("Elite", position, name))
                .collect(),
        );
        standings
    }

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn member_path(config: &StoreConfig, user_id: &str) -> DocPath {
        paths::member(config, &OrganizationScope::new("org-1"), user_id)
    }

    fn registered_store(config: &StoreConfig) -> MemoryStore {
        let event = EventReference::new("evt");
        MemoryStore::with_documents([(
            paths::event(config, &event),
            OrganizationScope::new("org-1").event_document(),
        )])
    }

    #[test]
    fn test_merge_creates_when_absent() {
        let entry = StandingEntry::new("Elite", "T2", "Alice");
        let sighting = MemberSighting {
            user_id: "u1",
            name: "Alice",
            standing: Some(&entry),
        };

        let change = merge_member(None, &sighting, MergeMode::Sync).unwrap();
        let MemberChange::Create(member) = change else {
            panic!("expected create");
        };
        assert_eq!(member.position, "T2");
        assert_eq!(member.position_no, 2);
        assert_eq!(member.name_lowercase, "alice");
    }

    #[test]
    fn test_merge_create_only_skips_existing() {
        let existing = doc(json!({ "name": "Someone Else" }));
        let sighting = MemberSighting {
            user_id: "u1",
            name: "Alice",
            standing: None,
        };
        assert_eq!(
            merge_member(Some(&existing), &sighting, MergeMode::CreateOnly),
            None
        );
    }

    #[test]
    fn test_merge_name_only_update() {
        let existing = doc(json!({
            "name": "Alicia",
            "nameLowercase": "alicia",
            "position": "3",
            "positionNo": 3,
        }));
        let entry = StandingEntry::new("Elite", "3", "Alice");
        let sighting = MemberSighting {
            user_id: "u1",
            name: "Alice",
            standing: Some(&entry),
        };

        let change = merge_member(Some(&existing), &sighting, MergeMode::Sync);
        assert_eq!(
            change,
            Some(MemberChange::Update(MemberUpdate {
                name: Some("Alice".into()),
                name_lowercase: Some("alice".into()),
                ..MemberUpdate::default()
            }))
        );
    }

    #[test]
    fn test_merge_unranked_resets_stored_number() {
        let existing = doc(json!({ "name": "Alice", "position": "4", "positionNo": 4 }));
        let entry = StandingEntry::new("Elite", "WD", "Alice");
        let sighting = MemberSighting {
            user_id: "u1",
            name: "Alice",
            standing: Some(&entry),
        };

        let Some(MemberChange::Update(update)) =
            merge_member(Some(&existing), &sighting, MergeMode::Sync)
        else {
            panic!("expected update");
        };
        assert_eq!(update.position.as_deref(), Some("WD"));
        assert_eq!(update.position_no, Some(0));
    }

    #[test]
    fn test_merge_integral_float_rank_matches() {
        let existing = doc(json!({ "name": "Alice", "position": "2", "positionNo": 2.0 }));
        let entry = StandingEntry::new("Elite", "2", "Alice");
        let sighting = MemberSighting {
            user_id: "u1",
            name: "Alice",
            standing: Some(&entry),
        };
        assert_eq!(merge_member(Some(&existing), &sighting, MergeMode::Sync), None);

        let existing = doc(json!({ "name": "Alice", "position": "2", "positionNo": 2.5 }));
        let Some(MemberChange::Update(update)) =
            merge_member(Some(&existing), &sighting, MergeMode::Sync)
        else {
            panic!("expected update");
        };
        assert_eq!(update.position_no, Some(2));
    }

    #[test]
    fn test_merge_no_standing_leaves_positions() {
        let existing = doc(json!({ "name": "Alice", "position": "4", "positionNo": 4 }));
        let sighting = MemberSighting {
            user_id: "u1",
            name: "Alice",
            standing: None,
        };
        assert_eq!(merge_member(Some(&existing), &sighting, MergeMode::Sync), None);
    }

    #[test]
    fn test_roster_by_id_last_name_wins() {
        let roster = vec![
            participant("Alice", "@u1"),
            participant("Bob", "@u2"),
            participant("Alicia", "@u1"),
        ];
        assert_eq!(roster_by_id(&roster), [("u1", "Alicia"), ("u2", "Bob")]);
    }

    #[tokio::test]
    async fn test_resolve_scope() {
        let config = StoreConfig::default();
        let store = registered_store(&config);
        let reconcile = ReconcileConfig::default();
        let reconciler = Reconciler::new(&store, &config, &reconcile);

        let scope = reconciler
            .resolve_scope(&EventReference::new("evt"))
            .await
            .unwrap();
        assert_eq!(scope.id(), "org-1");

        let err = reconciler
            .resolve_scope(&EventReference::new("other"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_resolve_scope_without_organization() {
        let config = StoreConfig::default();
        let event = EventReference::new("evt");
        let store = MemoryStore::with_documents([(
            paths::event(&config, &event),
            doc(json!({ "organization": "  " })),
        )]);
        let reconcile = ReconcileConfig::default();
        let reconciler = Reconciler::new(&store, &config, &reconcile);

        assert!(reconciler.resolve_scope(&event).await.is_err());
    }

    #[tokio::test]
    async fn test_seed_roster_creates_missing_members() {
        let config = StoreConfig::default();
        let store = registered_store(&config);
        let reconcile = ReconcileConfig::default();
        let reconciler = Reconciler::new(&store, &config, &reconcile);
        let scope = OrganizationScope::new("org-1");

        let roster = vec![participant("Alice", "@u1")];
        let report = reconciler.seed_roster(&scope, &roster).await.unwrap();
        assert_eq!(report.created, 1);

        let stored = store.get(&member_path(&config, "u1")).await.unwrap().unwrap();
        assert_eq!(stored["name"], "Alice");
        assert_eq!(stored["nameLowercase"], "alice");
        assert_eq!(stored["positionNo"], 0);
        assert_eq!(stored["checkedin"], false);
    }

    #[tokio::test]
    async fn test_seed_roster_is_create_if_absent() {
        let config = StoreConfig::default();
        let store = registered_store(&config);
        let reconcile = ReconcileConfig::default();
        let reconciler = Reconciler::new(&store, &config, &reconcile);
        let scope = OrganizationScope::new("org-1");

        reconciler
            .seed_roster(&scope, &[participant("Alice", "@u1")])
            .await
            .unwrap();

        // A renamed row must not touch the stored member
        let report = reconciler
            .seed_roster(&scope, &[participant("Alicia", "@u1"), participant("Bob", "@u2")])
            .await
            .unwrap();
        assert_eq!(report.created, 1);
        assert_eq!(report.unchanged, 1);

        let stored = store.get(&member_path(&config, "u1")).await.unwrap().unwrap();
        assert_eq!(stored["name"], "Alice");
    }

    #[tokio::test]
    async fn test_seed_roster_duplicate_ids_staged_once() {
        let config = StoreConfig::default();
        let store = registered_store(&config);
        let reconcile = ReconcileConfig {
            guard_creates: true,
        };
        let reconciler = Reconciler::new(&store, &config, &reconcile);
        let scope = OrganizationScope::new("org-1");

        let roster = vec![participant("Alice", "@u1"), participant("Alicia", "@u1")];
        let plan = reconciler.plan_roster_seed(&scope, &roster).await.unwrap();
        assert_eq!(plan.batch.len(), 1);

        reconciler.apply(plan).await.unwrap();
        let stored = store.get(&member_path(&config, "u1")).await.unwrap().unwrap();
        assert_eq!(stored["name"], "Alice");
    }

    #[tokio::test]
    async fn test_guard_creates_stages_create_ops() {
        let config = StoreConfig::default();
        let store = registered_store(&config);
        let scope = OrganizationScope::new("org-1");
        let roster = vec![participant("Alice", "@u1")];

        let guarded = ReconcileConfig {
            guard_creates: true,
        };
        let plan = Reconciler::new(&store, &config, &guarded)
            .plan_roster_seed(&scope, &roster)
            .await
            .unwrap();
        assert!(matches!(plan.batch.ops()[0], BatchOp::Create { .. }));

        let plain = ReconcileConfig::default();
        let plan = Reconciler::new(&store, &config, &plain)
            .plan_roster_seed(&scope, &roster)
            .await
            .unwrap();
        assert!(matches!(plan.batch.ops()[0], BatchOp::Set { .. }));
    }

    #[tokio::test]
    async fn test_full_sync_creates_and_updates() {
        let config = StoreConfig::default();
        let store = registered_store(&config);
        let reconcile = ReconcileConfig::default();
        let reconciler = Reconciler::new(&store, &config, &reconcile);
        let scope = OrganizationScope::new("org-1");

        store
            .set(
                &member_path(&config, "u1"),
                OrganizationMember::new("Alice").to_document().unwrap(),
            )
            .await
            .unwrap();

        let roster = vec![participant("Alice", "@u1"), participant("Bob", "@u2")];
        let board = standings(&[("1", "Alice"), ("T2", "Bob")]);
        let report = reconciler.full_sync(&scope, &roster, &board).await.unwrap();

        assert_eq!(report.created, 1);
        assert_eq!(report.updated, 1);
        assert_eq!(report.field_updates, 2);

        let alice = store.get(&member_path(&config, "u1")).await.unwrap().unwrap();
        assert_eq!(alice["position"], "1");
        assert_eq!(alice["positionNo"], 1);
        assert_eq!(alice["checkedin"], false);

        let bob = store.get(&member_path(&config, "u2")).await.unwrap().unwrap();
        assert_eq!(bob["position"], "T2");
        assert_eq!(bob["positionNo"], 2);
        assert_eq!(bob["startingTag"], 0);
    }

    #[tokio::test]
    async fn test_full_sync_is_idempotent() {
        let config = StoreConfig::default();
        let store = registered_store(&config);
        let reconcile = ReconcileConfig::default();
        let reconciler = Reconciler::new(&store, &config, &reconcile);
        let scope = OrganizationScope::new("org-1");

        let roster = vec![participant("Alice", "@u1"), participant("Bob", "@u2")];
        let board = standings(&[("1", "Alice"), ("WD", "Bob")]);

        reconciler.full_sync(&scope, &roster, &board).await.unwrap();
        let first = store.snapshot().unwrap();

        let plan = reconciler
            .plan_full_sync(&scope, &roster, &board)
            .await
            .unwrap();
        assert!(plan.batch.is_empty());
        assert_eq!(plan.report.unchanged, 2);

        reconciler.apply(plan).await.unwrap();
        assert_eq!(store.snapshot().unwrap(), first);
    }

    #[tokio::test]
    async fn test_full_sync_preserves_unmanaged_fields() {
        let config = StoreConfig::default();
        let path = member_path(&config, "u1");
        let store = registered_store(&config);
        store
            .set(
                &path,
                doc(json!({
                    "name": "Alice",
                    "nameLowercase": "alice",
                    "admin": true,
                    "tag": 7,
                    "checkedin": true,
                    "position": "5",
                    "positionNo": 5,
                })),
            )
            .await
            .unwrap();

        let reconcile = ReconcileConfig::default();
        let reconciler = Reconciler::new(&store, &config, &reconcile);
        reconciler
            .full_sync(
                &OrganizationScope::new("org-1"),
                &[participant("Alice", "@u1")],
                &standings(&[("2", "Alice")]),
            )
            .await
            .unwrap();

        let stored = store.get(&path).await.unwrap().unwrap();
        assert_eq!(stored["positionNo"], 2);
        assert_eq!(stored["admin"], true);
        assert_eq!(stored["tag"], 7);
        assert_eq!(stored["checkedin"], true);
    }

    #[tokio::test]
    async fn test_full_sync_name_collision_last_row_wins() {
        let config = StoreConfig::default();
        let store = registered_store(&config);
        let reconcile = ReconcileConfig::default();
        let reconciler = Reconciler::new(&store, &config, &reconcile);

        let mut board = Standings::new();
        board.insert("Elite", vec![StandingEntry::new("Elite", "1", "Sam")]);
        board.insert("Scaled", vec![StandingEntry::new("Scaled", "9", "Sam")]);

        reconciler
            .full_sync(
                &OrganizationScope::new("org-1"),
                &[participant("Sam", "@sam")],
                &board,
            )
            .await
            .unwrap();

        let stored = store.get(&member_path(&config, "sam")).await.unwrap().unwrap();
        assert_eq!(stored["positionNo"], 9);
    }

    #[tokio::test]
    async fn test_full_sync_unranked_converges_with_fresh_create() {
        let config = StoreConfig::default();
        let scope = OrganizationScope::new("org-1");
        let roster = vec![participant("Alice", "@u1")];
        let board = standings(&[("WD", "Alice")]);
        let reconcile = ReconcileConfig::default();

        let fresh = registered_store(&config);
        Reconciler::new(&fresh, &config, &reconcile)
            .full_sync(&scope, &roster, &board)
            .await
            .unwrap();

        let existing = registered_store(&config);
        let mut ranked = OrganizationMember::new("Alice");
        ranked.position = "4".into();
        ranked.position_no = 4;
        existing
            .set(&member_path(&config, "u1"), ranked.to_document().unwrap())
            .await
            .unwrap();
        Reconciler::new(&existing, &config, &reconcile)
            .full_sync(&scope, &roster, &board)
            .await
            .unwrap();

        let fresh_doc = fresh.get(&member_path(&config, "u1")).await.unwrap().unwrap();
        let existing_doc = existing
            .get(&member_path(&config, "u1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fresh_doc["position"], "WD");
        assert_eq!(fresh_doc["positionNo"], 0);
        assert_eq!(existing_doc, fresh_doc);
    }

    #[tokio::test]
    async fn test_full_sync_shared_display_name_joins_both_members() {
        let config = StoreConfig::default();
        let store = registered_store(&config);
        let reconcile = ReconcileConfig::default();
        let reconciler = Reconciler::new(&store, &config, &reconcile);

        let roster = vec![participant("Sam", "@u1"), participant("Sam", "@u2")];
        let report = reconciler
            .full_sync(
                &OrganizationScope::new("org-1"),
                &roster,
                &standings(&[("T3", "Sam")]),
            )
            .await
            .unwrap();
        assert_eq!(report.created, 2);

        for user_id in ["u1", "u2"] {
            let stored = store.get(&member_path(&config, user_id)).await.unwrap().unwrap();
            assert_eq!(stored["position"], "T3");
            assert_eq!(stored["positionNo"], 3);
        }
    }

    #[tokio::test]
    async fn test_failed_commit_writes_nothing() {
        let config = StoreConfig::default();
        let store = registered_store(&config);
        let reconcile = ReconcileConfig {
            guard_creates: true,
        };
        let reconciler = Reconciler::new(&store, &config, &reconcile);
        let scope = OrganizationScope::new("org-1");

        let roster = vec![participant("Alice", "@u1"), participant("Bob", "@u2")];
        let plan = reconciler.plan_roster_seed(&scope, &roster).await.unwrap();

        // Another writer creates u2 between planning and commit
        store
            .set(
                &member_path(&config, "u2"),
                OrganizationMember::new("Bob").to_document().unwrap(),
            )
            .await
            .unwrap();

        let err = reconciler.apply(plan).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(store.get(&member_path(&config, "u1")).await.unwrap().is_none());
    }
}
