//! WASM bindings for the project store.
//!
//! JavaScript-friendly wrapper around [`ProjectStore`] for the browser
//! editor. Structured values cross the boundary as plain JS objects using
//! the serde (camelCase) shapes of the model types.

use automerge::ChangeHash;
use js_sys::{Array, Uint8Array};
use serde::Serialize;
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::prelude::*;

use crate::consistency::ConsistencySummary;
use crate::editor::AssetDraft;
use crate::error::ProjectError;
use crate::fixtures;
use crate::narration;
use crate::project::model::*;
use crate::project::session::WorkspaceTab;
use crate::project::store::ProjectStore;
use crate::project::timeline;

/// Serialize a value to JsValue with HashMaps as plain JS objects (not Map).
fn to_js_value<T: Serialize>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&Serializer::new().serialize_maps_as_objects(true))
}

// =============================================================================
// ERROR CONVERSION
// =============================================================================

/// Helper macro for Result conversion
macro_rules! js_result {
    ($expr:expr) => {
        $expr.map_err(|e: ProjectError| JsValue::from_str(&e.to_string()))
    };
}

/// Parses hex-encoded change hashes, skipping anything malformed.
fn parse_heads(heads: Array) -> Vec<ChangeHash> {
    heads
        .iter()
        .filter_map(|v| {
            v.as_string().and_then(|s| {
                let bytes = hex::decode(&s).ok()?;
                if bytes.len() == 32 {
                    let mut arr = [0u8; 32];
                    arr.copy_from_slice(&bytes);
                    Some(ChangeHash(arr))
                } else {
                    None
                }
            })
        })
        .collect()
}

// =============================================================================
// MAIN WRAPPER TYPE
// =============================================================================

/// JavaScript-friendly wrapper around ProjectStore.
///
/// Mutations return `"applied"`, `"unchanged"` or `"notFound"`.
#[wasm_bindgen]
pub struct JsProjectStore {
    inner: ProjectStore,
}

#[wasm_bindgen]
impl JsProjectStore {
    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Creates an empty project.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// const store = new JsProjectStore();
    /// ```
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsProjectStore {
        JsProjectStore {
            inner: ProjectStore::new(),
        }
    }

    /// Creates a store holding the seed documentary project.
    #[wasm_bindgen(js_name = withSeedProject)]
    pub fn with_seed_project() -> Result<JsProjectStore, JsValue> {
        let inner = js_result!(fixtures::seed_store())?;
        Ok(JsProjectStore { inner })
    }

    /// Loads from binary bytes (Uint8Array).
    #[wasm_bindgen(js_name = fromBytes)]
    pub fn from_bytes(bytes: &[u8]) -> Result<JsProjectStore, JsValue> {
        let inner = js_result!(ProjectStore::from_bytes(bytes))?;
        Ok(JsProjectStore { inner })
    }

    /// Saves to binary bytes (returns Uint8Array).
    #[wasm_bindgen(js_name = toBytes)]
    pub fn to_bytes(&mut self) -> Uint8Array {
        let bytes = self.inner.save();
        Uint8Array::from(&bytes[..])
    }

    #[wasm_bindgen(js_name = actorId)]
    pub fn actor_id(&self) -> String {
        self.inner.actor_id()
    }

    /// Gets the current heads as hex strings.
    #[wasm_bindgen(js_name = getHeads)]
    pub fn get_heads(&mut self) -> Array {
        let heads = self.inner.get_heads();
        heads
            .into_iter()
            .map(|h| JsValue::from_str(&h.to_string()))
            .collect()
    }

    // =========================================================================
    // STATE ACCESS
    // =========================================================================

    /// Gets the full document state as a JavaScript object.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// const state = store.getState();
    /// console.log(state.shotOrder.map((id) => state.shots[id].title));
    /// ```
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&mut self) -> Result<JsValue, JsValue> {
        let state = js_result!(self.inner.get_state())?;
        Ok(to_js_value(&state)?)
    }

    /// Gets the editor session (tab, selection, playhead).
    #[wasm_bindgen(js_name = getSession)]
    pub fn get_session(&self) -> Result<JsValue, JsValue> {
        Ok(to_js_value(self.inner.session())?)
    }

    // =========================================================================
    // SHOT OPERATIONS
    // =========================================================================

    /// Adds a shot.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// store.addShot({
    ///   id: 'shot-6',
    ///   order: 6,
    ///   title: 'Epilogue',
    ///   narration: '...',
    ///   duration: 10,
    ///   shotType: 'wide',
    ///   cameraMovement: 'static',
    ///   visualKeywords: [],
    ///   visualNotes: '',
    ///   thumbnailColor: '#1f4e2a',
    ///   assetRefs: []
    /// });
    /// ```
    #[wasm_bindgen(js_name = addShot)]
    pub fn add_shot(&mut self, shot: JsValue) -> Result<String, JsValue> {
        let shot: Shot = from_value(shot)?;
        let outcome = js_result!(self.inner.add_shot(shot))?;
        Ok(outcome.as_str().to_string())
    }

    /// Merges a partial shot into an existing one.
    #[wasm_bindgen(js_name = updateShot)]
    pub fn update_shot(&mut self, id: &str, update: JsValue) -> Result<String, JsValue> {
        let update: ShotUpdate = from_value(update)?;
        let outcome = js_result!(self.inner.update_shot(id, &update))?;
        Ok(outcome.as_str().to_string())
    }

    #[wasm_bindgen(js_name = deleteShot)]
    pub fn delete_shot(&mut self, id: &str) -> Result<String, JsValue> {
        let outcome = js_result!(self.inner.delete_shot(id))?;
        Ok(outcome.as_str().to_string())
    }

    /// Reorders shots by id. Shots not listed are removed.
    #[wasm_bindgen(js_name = reorderShots)]
    pub fn reorder_shots(&mut self, ids: Vec<String>) -> Result<String, JsValue> {
        let outcome = js_result!(self.inner.reorder_shots(&ids))?;
        Ok(outcome.as_str().to_string())
    }

    /// Gets a shot by ID (null if missing).
    #[wasm_bindgen(js_name = getShot)]
    pub fn get_shot(&mut self, id: &str) -> Result<JsValue, JsValue> {
        let shot = js_result!(self.inner.shot(id))?;
        Ok(to_js_value(&shot)?)
    }

    /// Gets all shots in order.
    #[wasm_bindgen(js_name = getShots)]
    pub fn get_shots(&mut self) -> Result<JsValue, JsValue> {
        let shots = js_result!(self.inner.shots())?;
        Ok(to_js_value(&shots)?)
    }

    #[wasm_bindgen(js_name = totalDuration)]
    pub fn total_duration(&mut self) -> Result<f64, JsValue> {
        js_result!(self.inner.total_duration())
    }

    /// Narration of a shot split into `{ text, highlighted }` segments.
    #[wasm_bindgen(js_name = annotatedNarration)]
    pub fn annotated_narration(&mut self, shot_id: &str) -> Result<JsValue, JsValue> {
        let segments = js_result!(self.inner.annotated_narration(shot_id))?;
        Ok(to_js_value(&segments)?)
    }

    // =========================================================================
    // ASSET OPERATIONS
    // =========================================================================

    #[wasm_bindgen(js_name = addAsset)]
    pub fn add_asset(&mut self, asset: JsValue) -> Result<String, JsValue> {
        let asset: Asset = from_value(asset)?;
        let outcome = js_result!(self.inner.add_asset(asset))?;
        Ok(outcome.as_str().to_string())
    }

    #[wasm_bindgen(js_name = updateAsset)]
    pub fn update_asset(&mut self, id: &str, update: JsValue) -> Result<String, JsValue> {
        let update: AssetUpdate = from_value(update)?;
        let outcome = js_result!(self.inner.update_asset(id, &update))?;
        Ok(outcome.as_str().to_string())
    }

    /// Deletes an asset and every shot reference to it.
    #[wasm_bindgen(js_name = deleteAsset)]
    pub fn delete_asset(&mut self, id: &str) -> Result<String, JsValue> {
        let outcome = js_result!(self.inner.delete_asset(id))?;
        Ok(outcome.as_str().to_string())
    }

    #[wasm_bindgen(js_name = getAsset)]
    pub fn get_asset(&mut self, id: &str) -> Result<JsValue, JsValue> {
        let asset = js_result!(self.inner.asset(id))?;
        Ok(to_js_value(&asset)?)
    }

    #[wasm_bindgen(js_name = getAssets)]
    pub fn get_assets(&mut self) -> Result<JsValue, JsValue> {
        let assets = js_result!(self.inner.assets())?;
        Ok(to_js_value(&assets)?)
    }

    /// Saves an asset editor form. Pass `existingId` when editing.
    ///
    /// Fails if the name is blank.
    #[wasm_bindgen(js_name = saveAssetDraft)]
    pub fn save_asset_draft(
        &mut self,
        draft: JsValue,
        existing_id: Option<String>,
    ) -> Result<JsValue, JsValue> {
        let draft: AssetDraft = from_value(draft)?;
        let existing = match existing_id.as_deref() {
            Some(id) => js_result!(self.inner.asset(id))?,
            None => None,
        };
        let asset = js_result!(draft.build(existing.as_ref()))?;
        if existing.is_some() {
            let update = AssetUpdate {
                name: Some(asset.name.clone()),
                description: Some(asset.description.clone()),
                color: Some(asset.color.clone()),
                tags: Some(asset.tags.clone()),
                kind: Some(asset.kind.clone()),
                ..AssetUpdate::default()
            };
            js_result!(self.inner.update_asset(&asset.id, &update))?;
        } else {
            js_result!(self.inner.add_asset(asset.clone()))?;
        }
        Ok(to_js_value(&asset)?)
    }

    // =========================================================================
    // LINK OPERATIONS
    // =========================================================================

    /// Links an asset to a shot. Duplicate links are ignored.
    #[wasm_bindgen(js_name = linkAssetToShot)]
    pub fn link_asset_to_shot(&mut self, shot_id: &str, asset_ref: JsValue) -> Result<String, JsValue> {
        let asset_ref: AssetRef = from_value(asset_ref)?;
        let outcome = js_result!(self.inner.link_asset_to_shot(shot_id, asset_ref))?;
        Ok(outcome.as_str().to_string())
    }

    #[wasm_bindgen(js_name = unlinkAssetFromShot)]
    pub fn unlink_asset_from_shot(&mut self, shot_id: &str, asset_id: &str) -> Result<String, JsValue> {
        let outcome = js_result!(self.inner.unlink_asset_from_shot(shot_id, asset_id))?;
        Ok(outcome.as_str().to_string())
    }

    #[wasm_bindgen(js_name = linkedAssets)]
    pub fn linked_assets(&mut self, shot_id: &str) -> Result<JsValue, JsValue> {
        let assets = js_result!(self.inner.linked_assets(shot_id))?;
        Ok(to_js_value(&assets)?)
    }

    #[wasm_bindgen(js_name = assetReferenceCount)]
    pub fn asset_reference_count(&mut self, asset_id: &str) -> Result<usize, JsValue> {
        js_result!(self.inner.asset_reference_count(asset_id))
    }

    // =========================================================================
    // SESSION
    // =========================================================================

    /// Switches workspace tab: `"script"`, `"visual"` or `"arrange"`.
    #[wasm_bindgen(js_name = goToTab)]
    pub fn go_to_tab(&mut self, tab: JsValue) -> Result<(), JsValue> {
        let tab: WorkspaceTab = from_value(tab)?;
        self.inner.go_to_tab(tab);
        Ok(())
    }

    #[wasm_bindgen(js_name = selectShot)]
    pub fn select_shot(&mut self, id: Option<String>) {
        self.inner.select_shot(id.as_deref());
    }

    #[wasm_bindgen(js_name = selectAsset)]
    pub fn select_asset(&mut self, id: Option<String>) {
        self.inner.select_asset(id.as_deref());
    }

    #[wasm_bindgen(js_name = setPlayheadTime)]
    pub fn set_playhead_time(&mut self, time: f64) {
        self.inner.set_playhead_time(time);
    }

    // =========================================================================
    // CONSISTENCY
    // =========================================================================

    #[wasm_bindgen(js_name = getConsistencyReport)]
    pub fn get_consistency_report(&mut self) -> Result<JsValue, JsValue> {
        let report = js_result!(self.inner.consistency_report())?;
        Ok(to_js_value(&report)?)
    }

    /// Recomputes and stores the report.
    #[wasm_bindgen(js_name = runConsistencyCheck)]
    pub fn run_consistency_check(&mut self) -> Result<JsValue, JsValue> {
        let report = js_result!(self.inner.run_consistency_check())?;
        Ok(to_js_value(&report)?)
    }

    /// Overall score, band, average asset score and issue counts.
    #[wasm_bindgen(js_name = consistencySummary)]
    pub fn consistency_summary(&mut self) -> Result<JsValue, JsValue> {
        let report = js_result!(self.inner.consistency_report())?;
        let assets = js_result!(self.inner.assets())?;
        Ok(to_js_value(&ConsistencySummary::new(&report, &assets))?)
    }

    // =========================================================================
    // SYNC OPERATIONS
    // =========================================================================

    #[wasm_bindgen]
    pub fn merge(&mut self, other: &mut JsProjectStore) -> Result<(), JsValue> {
        js_result!(self.inner.merge(&mut other.inner))
    }

    /// Gets changes since the given hex heads. Returns null if there are none.
    #[wasm_bindgen(js_name = getChangesSince)]
    pub fn get_changes_since(&mut self, their_heads: Array) -> Result<JsValue, JsValue> {
        let heads = parse_heads(their_heads);
        match self.inner.generate_sync_message(&heads) {
            Some(bytes) => Ok(Uint8Array::from(&bytes[..]).into()),
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen(js_name = applyChanges)]
    pub fn apply_changes(&mut self, changes: &[u8]) -> Result<(), JsValue> {
        js_result!(self.inner.apply_sync_message(changes))
    }
}

impl Default for JsProjectStore {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// FREE FUNCTIONS
// =============================================================================

/// Splits text into `{ text, highlighted }` segments for the given keywords.
#[wasm_bindgen(js_name = annotateNarration)]
pub fn annotate_narration(text: &str, keywords: Vec<String>) -> Result<JsValue, JsValue> {
    Ok(to_js_value(&narration::annotate(text, &keywords))?)
}

/// Formats seconds as `m:ss`.
#[wasm_bindgen(js_name = formatTimecode)]
pub fn format_timecode(seconds: f64) -> String {
    timeline::format_timecode(seconds)
}
