//! Data models for the storyboard project.
//!
//! These structs are the document schema: autosurgeon derives map them onto
//! the Automerge document, serde derives give the camelCase JSON shape used by
//! the editor front end.

use autosurgeon::{Hydrate, Reconcile};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::project::timeline::TimelineTrack;

// =============================================================================
// IDS & CLOCK
// =============================================================================

/// Generates a new entity id of the form `<prefix>-<uuid>`.
pub fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// =============================================================================
// DOCUMENT ROOT
// =============================================================================

/// Root document structure for a storyboard project.
#[derive(Debug, Clone, Default, Reconcile, Hydrate, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectRoot {
    /// Unique identifier
    pub id: String,
    /// Project title (usually the video topic)
    pub title: String,

    /// Shot ordering (shot IDs), the collection order shown in the editor
    pub shot_order: Vec<String>,
    /// Shot data keyed by shot ID
    pub shots: HashMap<String, Shot>,

    /// Asset ordering (asset IDs)
    pub asset_order: Vec<String>,
    /// Asset data keyed by asset ID
    pub assets: HashMap<String, Asset>,

    /// Last consistency report
    pub consistency_report: ConsistencyReport,

    /// Arrangement tracks
    pub tracks: Vec<TimelineTrack>,
}

impl ProjectRoot {
    /// Creates a new empty project root with the given ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Builder: Set title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Builder: Append a shot.
    pub fn with_shot(mut self, shot: Shot) -> Self {
        self.insert_shot(shot);
        self
    }

    /// Builder: Append an asset.
    pub fn with_asset(mut self, asset: Asset) -> Self {
        self.insert_asset(asset);
        self
    }

    /// Inserts a shot at the end of the collection, keeping only the first
    /// ref per asset. Returns false if the id is already taken.
    pub fn insert_shot(&mut self, mut shot: Shot) -> bool {
        if self.shots.contains_key(&shot.id) {
            return false;
        }
        shot.dedupe_asset_refs();
        self.shot_order.push(shot.id.clone());
        self.shots.insert(shot.id.clone(), shot);
        true
    }

    /// Inserts an asset at the end of the collection. Returns false if the id
    /// is already taken.
    pub fn insert_asset(&mut self, asset: Asset) -> bool {
        if self.assets.contains_key(&asset.id) {
            return false;
        }
        self.asset_order.push(asset.id.clone());
        self.assets.insert(asset.id.clone(), asset);
        true
    }

    /// Shots in collection order.
    pub fn ordered_shots(&self) -> Vec<&Shot> {
        self.shot_order
            .iter()
            .filter_map(|id| self.shots.get(id))
            .collect()
    }

    /// Assets in collection order.
    pub fn ordered_assets(&self) -> Vec<&Asset> {
        self.asset_order
            .iter()
            .filter_map(|id| self.assets.get(id))
            .collect()
    }

    /// Sum of all shot durations in seconds.
    pub fn total_duration(&self) -> f64 {
        self.shots.values().map(|s| s.duration).sum()
    }
}

// =============================================================================
// SHOT
// =============================================================================

/// Shot framing.
#[derive(Debug, Clone, Copy, Default, Reconcile, Hydrate, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ShotType {
    Wide,
    #[default]
    Medium,
    Closeup,
    Aerial,
    Macro,
    Panning,
    Tracking,
}

impl ShotType {
    pub const ALL: [ShotType; 7] = [
        ShotType::Wide,
        ShotType::Medium,
        ShotType::Closeup,
        ShotType::Aerial,
        ShotType::Macro,
        ShotType::Panning,
        ShotType::Tracking,
    ];
}

/// Camera movement over the shot.
#[derive(Debug, Clone, Copy, Default, Reconcile, Hydrate, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum CameraMovement {
    #[default]
    Static,
    PanLeft,
    PanRight,
    TiltUp,
    TiltDown,
    DollyIn,
    DollyOut,
    CraneUp,
    CraneDown,
    Orbit,
}

impl CameraMovement {
    pub const ALL: [CameraMovement; 10] = [
        CameraMovement::Static,
        CameraMovement::PanLeft,
        CameraMovement::PanRight,
        CameraMovement::TiltUp,
        CameraMovement::TiltDown,
        CameraMovement::DollyIn,
        CameraMovement::DollyOut,
        CameraMovement::CraneUp,
        CameraMovement::CraneDown,
        CameraMovement::Orbit,
    ];
}

/// A single storyboard unit.
#[derive(Debug, Clone, Default, Reconcile, Hydrate, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Shot {
    pub id: String,
    /// 1-based position, contiguous by convention
    pub order: i32,
    pub title: String,
    /// Voice-over text for this shot
    pub narration: String,
    /// Seconds
    pub duration: f64,
    pub shot_type: ShotType,
    pub camera_movement: CameraMovement,
    /// Terms highlighted in the narration and used for visual matching
    pub visual_keywords: Vec<String>,
    pub visual_notes: String,
    /// Display hex color for the thumbnail placeholder
    pub thumbnail_color: String,
    /// Linked assets, at most one per asset id
    pub asset_refs: Vec<AssetRef>,
}

impl Shot {
    /// Creates a new Shot with the given ID, order and title.
    pub fn new(id: impl Into<String>, order: i32, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            order,
            title: title.into(),
            ..Default::default()
        }
    }

    /// Builder: Set narration.
    pub fn with_narration(mut self, narration: impl Into<String>) -> Self {
        self.narration = narration.into();
        self
    }

    /// Builder: Set duration in seconds.
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    /// Builder: Set shot type.
    pub fn with_shot_type(mut self, shot_type: ShotType) -> Self {
        self.shot_type = shot_type;
        self
    }

    /// Builder: Set camera movement.
    pub fn with_camera_movement(mut self, movement: CameraMovement) -> Self {
        self.camera_movement = movement;
        self
    }

    /// Builder: Set visual keywords.
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.visual_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: Set visual notes.
    pub fn with_visual_notes(mut self, notes: impl Into<String>) -> Self {
        self.visual_notes = notes.into();
        self
    }

    /// Builder: Set thumbnail color.
    pub fn with_thumbnail_color(mut self, color: impl Into<String>) -> Self {
        self.thumbnail_color = color.into();
        self
    }

    /// Builder: Append an asset reference (skipped if the asset is already linked).
    pub fn with_asset_ref(mut self, asset_ref: AssetRef) -> Self {
        if !self.references(&asset_ref.asset_id) {
            self.asset_refs.push(asset_ref);
        }
        self
    }

    /// Whether this shot links the given asset.
    pub fn references(&self, asset_id: &str) -> bool {
        self.asset_refs.iter().any(|r| r.asset_id == asset_id)
    }

    /// Drops later refs to an already linked asset. Returns how many were dropped.
    pub fn dedupe_asset_refs(&mut self) -> usize {
        let before = self.asset_refs.len();
        let mut seen = HashSet::with_capacity(before);
        self.asset_refs.retain(|r| seen.insert(r.asset_id.clone()));
        before - self.asset_refs.len()
    }
}

/// Partial shot update. `Some` fields replace the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ShotUpdate {
    pub order: Option<i32>,
    pub title: Option<String>,
    pub narration: Option<String>,
    pub duration: Option<f64>,
    pub shot_type: Option<ShotType>,
    pub camera_movement: Option<CameraMovement>,
    pub visual_keywords: Option<Vec<String>>,
    pub visual_notes: Option<String>,
    pub thumbnail_color: Option<String>,
    pub asset_refs: Option<Vec<AssetRef>>,
}

impl ShotUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_narration(mut self, narration: impl Into<String>) -> Self {
        self.narration = Some(narration.into());
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_shot_type(mut self, shot_type: ShotType) -> Self {
        self.shot_type = Some(shot_type);
        self
    }

    pub fn with_camera_movement(mut self, movement: CameraMovement) -> Self {
        self.camera_movement = Some(movement);
        self
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.visual_keywords = Some(keywords);
        self
    }

    pub fn with_visual_notes(mut self, notes: impl Into<String>) -> Self {
        self.visual_notes = Some(notes.into());
        self
    }

    /// Shallow-merges this update into `shot`.
    pub fn apply_to(&self, shot: &mut Shot) {
        macro_rules! merge {
            ($($field:ident),*) => {
                $(if let Some(v) = &self.$field {
                    shot.$field = v.clone();
                })*
            };
        }
        merge!(
            order,
            title,
            narration,
            duration,
            shot_type,
            camera_movement,
            visual_keywords,
            visual_notes,
            thumbnail_color,
            asset_refs
        );
        shot.dedupe_asset_refs();
    }
}

// =============================================================================
// ASSET REFERENCE
// =============================================================================

/// Labeled link from a shot to an asset.
#[derive(Debug, Clone, Default, Reconcile, Hydrate, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssetRef {
    pub asset_id: String,
    pub asset_type: AssetType,
    /// Free-form role label (e.g. "主角", "背景")
    pub role: String,
}

impl AssetRef {
    pub fn new(asset_id: impl Into<String>, asset_type: AssetType, role: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            asset_type,
            role: role.into(),
        }
    }

    /// Creates a reference to an existing asset.
    pub fn to_asset(asset: &Asset, role: impl Into<String>) -> Self {
        Self::new(asset.id.clone(), asset.asset_type(), role)
    }
}

// =============================================================================
// ASSET
// =============================================================================

/// Asset discriminator.
#[derive(Debug, Clone, Copy, Default, Reconcile, Hydrate, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    #[default]
    Character,
    Location,
    Prop,
    Style,
}

impl AssetType {
    pub const ALL: [AssetType; 4] = [
        AssetType::Character,
        AssetType::Location,
        AssetType::Prop,
        AssetType::Style,
    ];

    /// Lowercase tag used in JSON and in CLI output.
    pub fn as_str(self) -> &'static str {
        match self {
            AssetType::Character => "character",
            AssetType::Location => "location",
            AssetType::Prop => "prop",
            AssetType::Style => "style",
        }
    }
}

/// Type-specific asset payload.
#[derive(Debug, Clone, Reconcile, Hydrate, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum AssetKind {
    Character {
        appearance: String,
        costume: String,
    },
    Location {
        atmosphere: String,
        lighting: String,
    },
    Prop {
        visual_traits: String,
        scale: String,
    },
    Style {
        art_style: String,
        color_scheme: Vec<String>,
        rules: Vec<String>,
    },
}

impl Default for AssetKind {
    fn default() -> Self {
        AssetKind::empty(AssetType::Character)
    }
}

impl AssetKind {
    /// An empty payload of the given type.
    pub fn empty(asset_type: AssetType) -> Self {
        match asset_type {
            AssetType::Character => AssetKind::Character {
                appearance: String::new(),
                costume: String::new(),
            },
            AssetType::Location => AssetKind::Location {
                atmosphere: String::new(),
                lighting: String::new(),
            },
            AssetType::Prop => AssetKind::Prop {
                visual_traits: String::new(),
                scale: String::new(),
            },
            AssetType::Style => AssetKind::Style {
                art_style: String::new(),
                color_scheme: Vec::new(),
                rules: Vec::new(),
            },
        }
    }

    pub fn asset_type(&self) -> AssetType {
        match self {
            AssetKind::Character { .. } => AssetType::Character,
            AssetKind::Location { .. } => AssetType::Location,
            AssetKind::Prop { .. } => AssetType::Prop,
            AssetKind::Style { .. } => AssetType::Style,
        }
    }
}

/// Reference image attached to an asset. Stored only.
#[derive(Debug, Clone, Default, Reconcile, Hydrate, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ReferenceImage {
    pub id: String,
    pub url: String,
    pub caption: String,
    pub is_primary: bool,
}

/// Reusable visual reference (character, location, prop or style guide).
#[derive(Debug, Clone, Default, Reconcile, Hydrate, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Display hex color
    pub color: String,
    pub tags: Vec<String>,
    pub reference_images: Vec<ReferenceImage>,
    /// 0-100
    pub consistency_score: i32,
    /// Milliseconds since epoch
    pub created_at: i64,
    #[serde(flatten)]
    pub kind: AssetKind,
}

impl Asset {
    /// Creates a new Asset with the given ID, name and payload.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: AssetKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    pub fn asset_type(&self) -> AssetType {
        self.kind.asset_type()
    }

    /// Builder: Set description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder: Set color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Builder: Set tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: Set consistency score (clamped to 0-100).
    pub fn with_score(mut self, score: i32) -> Self {
        self.consistency_score = score.clamp(0, 100);
        self
    }

    /// Builder: Set creation timestamp.
    pub fn with_created_at(mut self, created_at: i64) -> Self {
        self.created_at = created_at;
        self
    }
}

/// Partial asset update. `kind` replaces the whole payload, which may change
/// the asset type.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub tags: Option<Vec<String>>,
    pub reference_images: Option<Vec<ReferenceImage>>,
    pub consistency_score: Option<i32>,
    pub kind: Option<AssetKind>,
}

impl AssetUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_score(mut self, score: i32) -> Self {
        self.consistency_score = Some(score);
        self
    }

    pub fn with_kind(mut self, kind: AssetKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Shallow-merges this update into `asset`.
    pub fn apply_to(&self, asset: &mut Asset) {
        if let Some(name) = &self.name {
            asset.name = name.clone();
        }
        if let Some(description) = &self.description {
            asset.description = description.clone();
        }
        if let Some(color) = &self.color {
            asset.color = color.clone();
        }
        if let Some(tags) = &self.tags {
            asset.tags = tags.clone();
        }
        if let Some(images) = &self.reference_images {
            asset.reference_images = images.clone();
        }
        if let Some(score) = self.consistency_score {
            asset.consistency_score = score.clamp(0, 100);
        }
        if let Some(kind) = &self.kind {
            asset.kind = kind.clone();
        }
    }
}

// =============================================================================
// CONSISTENCY
// =============================================================================

#[derive(Debug, Clone, Copy, Default, Reconcile, Hydrate, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Error,
    Warning,
    #[default]
    Info,
}

/// A single finding of a consistency check.
#[derive(Debug, Clone, Default, Reconcile, Hydrate, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ConsistencyIssue {
    pub id: String,
    pub severity: IssueSeverity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shot_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
}

impl ConsistencyIssue {
    pub fn new(id: impl Into<String>, severity: IssueSeverity, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            severity,
            message: message.into(),
            shot_id: None,
            asset_id: None,
        }
    }

    /// Builder: Point at a shot.
    pub fn with_shot(mut self, shot_id: impl Into<String>) -> Self {
        self.shot_id = Some(shot_id.into());
        self
    }

    /// Builder: Point at an asset.
    pub fn with_asset(mut self, asset_id: impl Into<String>) -> Self {
        self.asset_id = Some(asset_id.into());
        self
    }
}

/// Result of a consistency check.
#[derive(Debug, Clone, Reconcile, Hydrate, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ConsistencyReport {
    /// 0-100
    pub overall_score: i32,
    pub issues: Vec<ConsistencyIssue>,
    /// Milliseconds since epoch
    pub checked_at: i64,
}

impl Default for ConsistencyReport {
    /// A report for a project nobody has checked yet: nothing to complain about.
    fn default() -> Self {
        Self {
            overall_score: 100,
            issues: Vec::new(),
            checked_at: 0,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_prefix_and_uniqueness() {
        let a = new_id("shot");
        let b = new_id("shot");
        assert!(a.starts_with("shot-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_shot_builder() {
        let shot = Shot::new("shot-1", 1, "Arrival")
            .with_duration(14.0)
            .with_shot_type(ShotType::Wide)
            .with_keywords(["商船", "鼠疫"]);

        assert_eq!(shot.id, "shot-1");
        assert_eq!(shot.order, 1);
        assert_eq!(shot.visual_keywords, vec!["商船", "鼠疫"]);
        assert_eq!(shot.camera_movement, CameraMovement::Static);
    }

    #[test]
    fn test_shot_builder_skips_duplicate_ref() {
        let shot = Shot::new("shot-1", 1, "Arrival")
            .with_asset_ref(AssetRef::new("asset-1", AssetType::Character, "lead"))
            .with_asset_ref(AssetRef::new("asset-1", AssetType::Character, "extra"));
        assert_eq!(shot.asset_refs.len(), 1);
        assert_eq!(shot.asset_refs[0].role, "lead");
    }

    #[test]
    fn test_insert_and_update_dedupe_refs() {
        let lead = AssetRef::new("asset-1", AssetType::Character, "lead");
        let extra = AssetRef::new("asset-1", AssetType::Character, "extra");
        let mut shot = Shot::new("shot-1", 1, "Arrival");
        shot.asset_refs = vec![lead.clone(), extra.clone()];

        let mut root = ProjectRoot::new("p");
        assert!(root.insert_shot(shot));
        assert_eq!(root.shots["shot-1"].asset_refs, vec![lead.clone()]);

        let mut shot = Shot::new("shot-2", 2, "Spread");
        ShotUpdate {
            asset_refs: Some(vec![extra.clone(), lead.clone()]),
            ..ShotUpdate::default()
        }
        .apply_to(&mut shot);
        assert_eq!(shot.asset_refs, vec![extra]);
    }

    #[test]
    fn test_shot_update_is_shallow_merge() {
        let mut shot = Shot::new("shot-1", 1, "Old").with_narration("keep me");
        ShotUpdate::new()
            .with_title("New")
            .with_duration(8.0)
            .apply_to(&mut shot);

        assert_eq!(shot.title, "New");
        assert_eq!(shot.duration, 8.0);
        assert_eq!(shot.narration, "keep me");
        assert_eq!(shot.id, "shot-1");
    }

    #[test]
    fn test_asset_update_clamps_score_and_swaps_kind() {
        let mut asset = Asset::new("asset-1", "Doctor", AssetKind::empty(AssetType::Character));
        AssetUpdate::new()
            .with_score(140)
            .with_kind(AssetKind::empty(AssetType::Prop))
            .apply_to(&mut asset);

        assert_eq!(asset.consistency_score, 100);
        assert_eq!(asset.asset_type(), AssetType::Prop);
    }

    #[test]
    fn test_asset_json_is_flat_with_type_tag() {
        let asset = Asset::new(
            "asset-1",
            "鸟嘴医生",
            AssetKind::Character {
                appearance: "beak mask".into(),
                costume: "black robe".into(),
            },
        )
        .with_score(91);

        let json = serde_json::to_value(&asset).unwrap();
        assert_eq!(json["type"], "character");
        assert_eq!(json["appearance"], "beak mask");
        assert_eq!(json["consistencyScore"], 91);

        let back: Asset = serde_json::from_value(json).unwrap();
        assert_eq!(back, asset);
    }

    #[test]
    fn test_style_fields_are_camel_case() {
        let asset = Asset::new(
            "asset-2",
            "Parchment",
            AssetKind::Style {
                art_style: "woodcut".into(),
                color_scheme: vec!["#8a7a5a".into()],
                rules: vec![],
            },
        );
        let json = serde_json::to_value(&asset).unwrap();
        assert_eq!(json["type"], "style");
        assert_eq!(json["artStyle"], "woodcut");
        assert_eq!(json["colorScheme"][0], "#8a7a5a");
    }

    #[test]
    fn test_camera_movement_json() {
        let json = serde_json::to_string(&CameraMovement::DollyIn).unwrap();
        assert_eq!(json, "\"dolly-in\"");
    }

    #[test]
    fn test_root_insert_rejects_duplicate_id() {
        let mut root = ProjectRoot::new("p-1");
        assert!(root.insert_shot(Shot::new("shot-1", 1, "A").with_duration(3.0)));
        assert!(!root.insert_shot(Shot::new("shot-1", 2, "B").with_duration(5.0)));
        assert_eq!(root.shot_order.len(), 1);
        assert_eq!(root.total_duration(), 3.0);
    }
}
