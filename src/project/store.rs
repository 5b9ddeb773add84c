//! ProjectStore: the single source of truth for a storyboard project.
//!
//! Wraps an Automerge document holding the [`ProjectRoot`] and keeps the
//! editor [`Session`] next to it:
//! - Mutations go through `apply()`, which hydrates, mutates and reconciles
//!   only when something actually changed
//! - Unknown ids are no-ops reported as [`Outcome::NotFound`], never errors
//! - Referential cleanup (asset refs, selection) happens inside the delete
//!   operations themselves

use automerge::{AutoCommit, ChangeHash};
use autosurgeon::{hydrate, reconcile};

use crate::consistency;
use crate::error::{EntityKind, ProjectError, ProjectResult};
use crate::narration::{self, Segment};
use crate::project::model::*;
use crate::project::session::{Session, WorkspaceTab};

// =============================================================================
// OUTCOME
// =============================================================================

/// What a store mutation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The document changed.
    Applied,
    /// The target exists but the call changed nothing (duplicate link, empty update...).
    Unchanged,
    /// The target id is not in the project.
    NotFound,
}

impl Outcome {
    pub fn is_applied(self) -> bool {
        self == Outcome::Applied
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Applied => "applied",
            Outcome::Unchanged => "unchanged",
            Outcome::NotFound => "notFound",
        }
    }

    /// Turns `NotFound` into an error for callers that want strict behavior.
    pub fn require(self, kind: EntityKind, id: &str) -> ProjectResult<Self> {
        match self {
            Outcome::NotFound => Err(ProjectError::not_found(kind, id)),
            other => Ok(other),
        }
    }
}

// =============================================================================
// PROJECT STORE
// =============================================================================

/// The project store.
///
/// Owns the Automerge document (shots, assets, report, tracks) and the
/// volatile editor session. Each instance is independent.
pub struct ProjectStore {
    doc: AutoCommit,
    /// Cached hydrated state - invalidated after load, merge and sync.
    cached_state: Option<ProjectRoot>,
    session: Session,
}

impl ProjectStore {
    // =========================================================================
    // INITIALIZATION
    // =========================================================================

    /// Creates a new empty store with an initialized document schema.
    pub fn new() -> Self {
        let mut doc = AutoCommit::new();
        let root = ProjectRoot::default();
        reconcile(&mut doc, &root).expect("Failed to initialize document");
        Self {
            doc,
            cached_state: Some(root),
            session: Session::default(),
        }
    }

    /// Creates a store seeded with the given project. Duplicate refs to the
    /// same asset within a shot are reduced to the first.
    pub fn from_root(mut root: ProjectRoot) -> ProjectResult<Self> {
        let dropped: usize = root.shots.values_mut().map(Shot::dedupe_asset_refs).sum();
        if dropped > 0 {
            tracing::debug!(dropped, "from_root dropped duplicate asset refs");
        }
        let mut doc = AutoCommit::new();
        reconcile(&mut doc, &root)?;
        tracing::info!(
            project = %root.id,
            shots = root.shots.len(),
            assets = root.assets.len(),
            "Project store seeded"
        );
        Ok(Self {
            doc,
            cached_state: Some(root),
            session: Session::default(),
        })
    }

    /// Creates a store from saved binary data. The session starts fresh.
    pub fn from_bytes(bytes: &[u8]) -> ProjectResult<Self> {
        let doc = AutoCommit::load(bytes)?;
        tracing::info!(bytes = bytes.len(), "Project document loaded");
        Ok(Self {
            doc,
            cached_state: None,
            session: Session::default(),
        })
    }

    /// Saves the document to binary format. Session state is not included.
    pub fn save(&mut self) -> Vec<u8> {
        self.doc.save()
    }

    /// Returns the current heads (for sync protocol).
    pub fn get_heads(&mut self) -> Vec<ChangeHash> {
        self.doc.get_heads()
    }

    /// Gets the actor ID for this document instance.
    pub fn actor_id(&self) -> String {
        self.doc.get_actor().to_hex_string()
    }

    // =========================================================================
    // STATE ACCESS
    // =========================================================================

    /// Hydrates the entire project document.
    pub fn get_state(&mut self) -> ProjectResult<ProjectRoot> {
        Ok(self.state()?.clone())
    }

    /// Applies a function to mutate the document state, then reconciles it.
    pub fn update_state<F>(&mut self, f: F) -> ProjectResult<()>
    where
        F: FnOnce(&mut ProjectRoot),
    {
        self.apply(|state| {
            f(state);
            Outcome::Applied
        })
        .map(|_| ())
    }

    /// Borrowing view of the cached state, hydrating on a cache miss.
    fn state(&mut self) -> ProjectResult<&ProjectRoot> {
        if self.cached_state.is_none() {
            let state: ProjectRoot = hydrate(&self.doc)?;
            self.cached_state = Some(state);
        }
        self.cached_state
            .as_ref()
            .ok_or_else(|| ProjectError::serialization("document state unavailable"))
    }

    /// Runs a mutation against a copy of the state and reconciles it back
    /// only if the closure reports `Applied`.
    fn apply<F>(&mut self, f: F) -> ProjectResult<Outcome>
    where
        F: FnOnce(&mut ProjectRoot) -> Outcome,
    {
        let mut state = self.state()?.clone();
        let outcome = f(&mut state);
        if outcome.is_applied() {
            reconcile(&mut self.doc, &state)?;
            self.cached_state = Some(state);
        }
        Ok(outcome)
    }

    /// The editor session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    // =========================================================================
    // SHOT OPERATIONS
    // =========================================================================

    /// Appends a shot to the collection. A shot whose id is already taken
    /// is ignored.
    pub fn add_shot(&mut self, shot: Shot) -> ProjectResult<Outcome> {
        let id = shot.id.clone();
        let outcome = self.apply(|state| {
            if state.insert_shot(shot) {
                Outcome::Applied
            } else {
                Outcome::Unchanged
            }
        })?;
        tracing::debug!(shot = %id, ?outcome, "add_shot");
        Ok(outcome)
    }

    /// Shallow-merges `update` into the shot.
    pub fn update_shot(&mut self, id: &str, update: &ShotUpdate) -> ProjectResult<Outcome> {
        let outcome = self.apply(|state| match state.shots.get_mut(id) {
            None => Outcome::NotFound,
            Some(shot) => {
                let before = shot.clone();
                update.apply_to(shot);
                if *shot == before {
                    Outcome::Unchanged
                } else {
                    Outcome::Applied
                }
            }
        })?;
        tracing::debug!(shot = %id, ?outcome, "update_shot");
        Ok(outcome)
    }

    /// Removes a shot and clears the selection if it pointed at it.
    pub fn delete_shot(&mut self, id: &str) -> ProjectResult<Outcome> {
        let outcome = self.apply(|state| {
            if state.shots.remove(id).is_none() {
                return Outcome::NotFound;
            }
            state.shot_order.retain(|s| s != id);
            Outcome::Applied
        })?;
        if self.session.selected_shot_id.as_deref() == Some(id) {
            self.session.selected_shot_id = None;
        }
        tracing::debug!(shot = %id, ?outcome, "delete_shot");
        Ok(outcome)
    }

    /// Rebuilds the shot collection from `ordered_ids`.
    ///
    /// Each listed shot gets `order` = its 1-based position in `ordered_ids`.
    /// Unknown ids are skipped but still take up a position, so the numbering
    /// can have gaps. Repeated ids keep their first position, and shots missing
    /// from the list are dropped from the collection.
    pub fn reorder_shots<S: AsRef<str>>(&mut self, ordered_ids: &[S]) -> ProjectResult<Outcome> {
        let outcome = self.apply(|state| {
            let mut remaining = std::mem::take(&mut state.shots);
            let mut order = Vec::with_capacity(ordered_ids.len());
            let mut shots = std::collections::HashMap::with_capacity(ordered_ids.len());
            let mut renumbered = false;

            for (i, id) in ordered_ids.iter().map(AsRef::as_ref).enumerate() {
                if let Some(mut shot) = remaining.remove(id) {
                    let position = i as i32 + 1;
                    renumbered |= shot.order != position;
                    shot.order = position;
                    order.push(id.to_string());
                    shots.insert(id.to_string(), shot);
                }
            }
            if !remaining.is_empty() {
                tracing::debug!(dropped = remaining.len(), "reorder_shots dropped unlisted shots");
            }

            let changed = renumbered || !remaining.is_empty() || order != state.shot_order;
            state.shot_order = order;
            state.shots = shots;
            if changed {
                Outcome::Applied
            } else {
                Outcome::Unchanged
            }
        })?;

        if let Some(selected) = self.session.selected_shot_id.clone() {
            if !self.state()?.shots.contains_key(&selected) {
                self.session.selected_shot_id = None;
            }
        }
        tracing::debug!(count = ordered_ids.len(), ?outcome, "reorder_shots");
        Ok(outcome)
    }

    /// Gets a shot by ID.
    pub fn shot(&mut self, id: &str) -> ProjectResult<Option<Shot>> {
        Ok(self.state()?.shots.get(id).cloned())
    }

    /// All shots in collection order.
    pub fn shots(&mut self) -> ProjectResult<Vec<Shot>> {
        Ok(self
            .state()?
            .ordered_shots()
            .into_iter()
            .cloned()
            .collect())
    }

    /// Sum of all shot durations in seconds.
    pub fn total_duration(&mut self) -> ProjectResult<f64> {
        Ok(self.state()?.total_duration())
    }

    /// The shot's narration with its own visual keywords highlighted.
    pub fn annotated_narration(&mut self, shot_id: &str) -> ProjectResult<Option<Vec<Segment>>> {
        Ok(self
            .state()?
            .shots
            .get(shot_id)
            .map(|s| narration::annotate(&s.narration, &s.visual_keywords)))
    }

    // =========================================================================
    // ASSET OPERATIONS
    // =========================================================================

    /// Appends an asset to the library. An asset whose id is already taken
    /// is ignored.
    pub fn add_asset(&mut self, mut asset: Asset) -> ProjectResult<Outcome> {
        asset.consistency_score = asset.consistency_score.clamp(0, 100);
        let id = asset.id.clone();
        let outcome = self.apply(|state| {
            if state.insert_asset(asset) {
                Outcome::Applied
            } else {
                Outcome::Unchanged
            }
        })?;
        tracing::debug!(asset = %id, ?outcome, "add_asset");
        Ok(outcome)
    }

    /// Shallow-merges `update` into the asset.
    ///
    /// If the payload variant changes, refs to the asset take the new type.
    pub fn update_asset(&mut self, id: &str, update: &AssetUpdate) -> ProjectResult<Outcome> {
        let outcome = self.apply(|state| {
            let Some(asset) = state.assets.get_mut(id) else {
                return Outcome::NotFound;
            };
            let before = asset.clone();
            update.apply_to(asset);
            if *asset == before {
                return Outcome::Unchanged;
            }
            let asset_type = asset.asset_type();
            if asset_type != before.asset_type() {
                for shot in state.shots.values_mut() {
                    for r in shot.asset_refs.iter_mut().filter(|r| r.asset_id == id) {
                        r.asset_type = asset_type;
                    }
                }
            }
            Outcome::Applied
        })?;
        tracing::debug!(asset = %id, ?outcome, "update_asset");
        Ok(outcome)
    }

    /// Removes an asset, strips every ref to it from all shots and clears
    /// the selection if it pointed at it.
    pub fn delete_asset(&mut self, id: &str) -> ProjectResult<Outcome> {
        let outcome = self.apply(|state| {
            if state.assets.remove(id).is_none() {
                return Outcome::NotFound;
            }
            state.asset_order.retain(|a| a != id);
            let mut stripped = 0usize;
            for shot in state.shots.values_mut() {
                let before = shot.asset_refs.len();
                shot.asset_refs.retain(|r| r.asset_id != id);
                stripped += before - shot.asset_refs.len();
            }
            tracing::debug!(asset = %id, stripped, "delete_asset cascaded to shots");
            Outcome::Applied
        })?;
        if self.session.selected_asset_id.as_deref() == Some(id) {
            self.session.selected_asset_id = None;
        }
        tracing::debug!(asset = %id, ?outcome, "delete_asset");
        Ok(outcome)
    }

    /// Gets an asset by ID.
    pub fn asset(&mut self, id: &str) -> ProjectResult<Option<Asset>> {
        Ok(self.state()?.assets.get(id).cloned())
    }

    /// All assets in library order.
    pub fn assets(&mut self) -> ProjectResult<Vec<Asset>> {
        Ok(self
            .state()?
            .ordered_assets()
            .into_iter()
            .cloned()
            .collect())
    }

    /// Assets of one type, in library order.
    pub fn assets_of_type(&mut self, asset_type: AssetType) -> ProjectResult<Vec<Asset>> {
        Ok(self
            .state()?
            .ordered_assets()
            .into_iter()
            .filter(|a| a.asset_type() == asset_type)
            .cloned()
            .collect())
    }

    // =========================================================================
    // LINKING
    // =========================================================================

    /// Links an asset to a shot. Linking an already linked asset is a no-op.
    pub fn link_asset_to_shot(&mut self, shot_id: &str, asset_ref: AssetRef) -> ProjectResult<Outcome> {
        let asset_id = asset_ref.asset_id.clone();
        let outcome = self.apply(|state| match state.shots.get_mut(shot_id) {
            None => Outcome::NotFound,
            Some(shot) if shot.references(&asset_ref.asset_id) => Outcome::Unchanged,
            Some(shot) => {
                shot.asset_refs.push(asset_ref);
                Outcome::Applied
            }
        })?;
        tracing::debug!(shot = %shot_id, asset = %asset_id, ?outcome, "link_asset_to_shot");
        Ok(outcome)
    }

    /// Removes any link from the shot to the asset.
    pub fn unlink_asset_from_shot(&mut self, shot_id: &str, asset_id: &str) -> ProjectResult<Outcome> {
        let outcome = self.apply(|state| match state.shots.get_mut(shot_id) {
            None => Outcome::NotFound,
            Some(shot) => {
                let before = shot.asset_refs.len();
                shot.asset_refs.retain(|r| r.asset_id != asset_id);
                if shot.asset_refs.len() == before {
                    Outcome::Unchanged
                } else {
                    Outcome::Applied
                }
            }
        })?;
        tracing::debug!(shot = %shot_id, asset = %asset_id, ?outcome, "unlink_asset_from_shot");
        Ok(outcome)
    }

    /// Assets linked to a shot, in link order. Dangling refs are skipped.
    pub fn linked_assets(&mut self, shot_id: &str) -> ProjectResult<Vec<Asset>> {
        let state = self.state()?;
        Ok(state
            .shots
            .get(shot_id)
            .map(|shot| {
                shot.asset_refs
                    .iter()
                    .filter_map(|r| state.assets.get(&r.asset_id).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Shots linking the asset, in collection order.
    pub fn referencing_shots(&mut self, asset_id: &str) -> ProjectResult<Vec<Shot>> {
        Ok(self
            .state()?
            .ordered_shots()
            .into_iter()
            .filter(|s| s.references(asset_id))
            .cloned()
            .collect())
    }

    /// Number of shots linking the asset.
    pub fn asset_reference_count(&mut self, asset_id: &str) -> ProjectResult<usize> {
        Ok(self
            .state()?
            .shots
            .values()
            .filter(|s| s.references(asset_id))
            .count())
    }

    // =========================================================================
    // SESSION
    // =========================================================================

    /// Switches the workspace view.
    pub fn go_to_tab(&mut self, tab: WorkspaceTab) {
        self.session.current_tab = tab;
    }

    pub fn current_tab(&self) -> WorkspaceTab {
        self.session.current_tab
    }

    /// Selects a shot by id (or clears the selection). The id is not checked.
    pub fn select_shot(&mut self, id: Option<&str>) {
        self.session.selected_shot_id = id.map(str::to_string);
    }

    /// Selects an asset by id (or clears the selection). The id is not checked.
    pub fn select_asset(&mut self, id: Option<&str>) {
        self.session.selected_asset_id = id.map(str::to_string);
    }

    /// Moves the playhead. Callers clamp to `[0, total_duration]`.
    pub fn set_playhead_time(&mut self, time: f64) {
        self.session.playhead_time = time;
    }

    pub fn playhead_time(&self) -> f64 {
        self.session.playhead_time
    }

    /// The selected shot, if the selection points at an existing shot.
    pub fn selected_shot(&mut self) -> ProjectResult<Option<Shot>> {
        match self.session.selected_shot_id.clone() {
            Some(id) => self.shot(&id),
            None => Ok(None),
        }
    }

    /// The selected asset, if the selection points at an existing asset.
    pub fn selected_asset(&mut self) -> ProjectResult<Option<Asset>> {
        match self.session.selected_asset_id.clone() {
            Some(id) => self.asset(&id),
            None => Ok(None),
        }
    }

    // =========================================================================
    // CONSISTENCY
    // =========================================================================

    /// The stored consistency report.
    pub fn consistency_report(&mut self) -> ProjectResult<ConsistencyReport> {
        Ok(self.state()?.consistency_report.clone())
    }

    /// Replaces the stored consistency report.
    pub fn set_consistency_report(&mut self, report: ConsistencyReport) -> ProjectResult<()> {
        self.update_state(|state| state.consistency_report = report)
    }

    /// Recomputes the consistency report from the current shots and assets
    /// and stores it.
    pub fn run_consistency_check(&mut self) -> ProjectResult<ConsistencyReport> {
        let shots = self.shots()?;
        let assets = self.assets()?;
        let report = consistency::check(&shots, &assets, now_millis());
        self.set_consistency_report(report.clone())?;
        Ok(report)
    }

    // =========================================================================
    // SYNC OPERATIONS
    // =========================================================================

    /// Merges another document into this one.
    pub fn merge(&mut self, other: &mut Self) -> ProjectResult<()> {
        self.cached_state = None;
        self.doc.merge(&mut other.doc)?;
        tracing::info!(actor = %self.actor_id(), "Merged project document");
        Ok(())
    }

    /// Generates sync message for incremental sync.
    /// Returns None if there are no changes since their_heads.
    pub fn generate_sync_message(&mut self, their_heads: &[ChangeHash]) -> Option<Vec<u8>> {
        let changes = self.doc.get_changes(their_heads);
        if changes.is_empty() {
            return None;
        }
        let mut bytes = Vec::new();
        for change in changes {
            bytes.extend(change.raw_bytes());
        }
        Some(bytes)
    }

    /// Applies sync message from peer.
    pub fn apply_sync_message(&mut self, msg: &[u8]) -> ProjectResult<()> {
        self.cached_state = None;
        self.doc.load_incremental(msg)?;
        Ok(())
    }
}

impl Default for ProjectStore {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================
