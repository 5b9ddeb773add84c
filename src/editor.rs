//! Asset editor form state.
//!
//! Holds the raw text the user types into the asset editor and turns it into
//! an [`Asset`]. The only gate is a non-blank name; front ends disable the
//! save action while [`AssetDraft::can_save`] is false.

use serde::{Deserialize, Serialize};

use crate::error::{ProjectError, ProjectResult};
use crate::project::model::{new_id, now_millis, Asset, AssetKind, AssetType};

/// Swatches offered by the color picker. The first one is the default.
pub const PRESET_COLORS: [&str; 10] = [
    "#e85454", "#e8b468", "#54c878", "#4466aa", "#6644aa", "#44aaaa", "#aa44aa", "#3a3a3a",
    "#8a7a5a", "#cc8844",
];

/// Score given to assets created through the editor.
pub const DEFAULT_CONSISTENCY_SCORE: i32 = 80;

/// Asset editor form fields.
///
/// `tags` and `color_scheme` are comma separated, `rules` one per line.
/// Fields belonging to other asset types are kept so switching the type
/// back and forth does not lose input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetDraft {
    pub asset_type: AssetType,
    pub name: String,
    pub description: String,
    pub color: String,
    pub tags: String,

    pub appearance: String,
    pub costume: String,

    pub atmosphere: String,
    pub lighting: String,

    pub visual_traits: String,
    pub scale: String,

    pub art_style: String,
    pub color_scheme: String,
    pub rules: String,
}

impl Default for AssetDraft {
    fn default() -> Self {
        Self::new(AssetType::Character)
    }
}

impl AssetDraft {
    /// Blank form for a new asset.
    pub fn new(asset_type: AssetType) -> Self {
        Self {
            asset_type,
            name: String::new(),
            description: String::new(),
            color: PRESET_COLORS[0].to_string(),
            tags: String::new(),
            appearance: String::new(),
            costume: String::new(),
            atmosphere: String::new(),
            lighting: String::new(),
            visual_traits: String::new(),
            scale: String::new(),
            art_style: String::new(),
            color_scheme: String::new(),
            rules: String::new(),
        }
    }

    /// Form pre-filled from an existing asset.
    pub fn from_asset(asset: &Asset) -> Self {
        let mut draft = Self {
            asset_type: asset.asset_type(),
            name: asset.name.clone(),
            description: asset.description.clone(),
            color: asset.color.clone(),
            tags: asset.tags.join(", "),
            ..Self::new(asset.asset_type())
        };
        match &asset.kind {
            AssetKind::Character { appearance, costume } => {
                draft.appearance = appearance.clone();
                draft.costume = costume.clone();
            }
            AssetKind::Location { atmosphere, lighting } => {
                draft.atmosphere = atmosphere.clone();
                draft.lighting = lighting.clone();
            }
            AssetKind::Prop { visual_traits, scale } => {
                draft.visual_traits = visual_traits.clone();
                draft.scale = scale.clone();
            }
            AssetKind::Style {
                art_style,
                color_scheme,
                rules,
            } => {
                draft.art_style = art_style.clone();
                draft.color_scheme = color_scheme.join(", ");
                draft.rules = rules.join("\n");
            }
        }
        draft
    }

    /// Whether the save action is enabled.
    pub fn can_save(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Payload for the selected type.
    pub fn kind(&self) -> AssetKind {
        match self.asset_type {
            AssetType::Character => AssetKind::Character {
                appearance: self.appearance.clone(),
                costume: self.costume.clone(),
            },
            AssetType::Location => AssetKind::Location {
                atmosphere: self.atmosphere.clone(),
                lighting: self.lighting.clone(),
            },
            AssetType::Prop => AssetKind::Prop {
                visual_traits: self.visual_traits.clone(),
                scale: self.scale.clone(),
            },
            AssetType::Style => AssetKind::Style {
                art_style: self.art_style.clone(),
                color_scheme: split_list(&self.color_scheme),
                rules: self
                    .rules
                    .split('\n')
                    .filter(|r| !r.is_empty())
                    .map(str::to_string)
                    .collect(),
            },
        }
    }

    /// Builds the asset to save.
    ///
    /// When editing, id, creation time, reference images and score carry
    /// over from `existing`; a new asset gets a fresh id, the current time
    /// and [`DEFAULT_CONSISTENCY_SCORE`].
    pub fn build(&self, existing: Option<&Asset>) -> ProjectResult<Asset> {
        if !self.can_save() {
            return Err(ProjectError::validation("asset name must not be empty"));
        }

        let (id, created_at, reference_images, consistency_score) = match existing {
            Some(asset) => (
                asset.id.clone(),
                asset.created_at,
                asset.reference_images.clone(),
                asset.consistency_score,
            ),
            None => (new_id("asset"), now_millis(), Vec::new(), DEFAULT_CONSISTENCY_SCORE),
        };

        Ok(Asset {
            id,
            name: self.name.clone(),
            description: self.description.clone(),
            color: self.color.clone(),
            tags: split_list(&self.tags),
            reference_images,
            consistency_score,
            created_at,
            kind: self.kind(),
        })
    }
}

/// Splits a comma separated field, trimming entries and dropping blanks.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::model::ReferenceImage;

    #[test]
    fn test_blank_name_blocks_save() {
        let mut draft = AssetDraft::new(AssetType::Prop);
        assert!(!draft.can_save());
        draft.name = "   ".into();
        assert!(!draft.can_save());
        assert!(matches!(draft.build(None), Err(ProjectError::Validation(_))));

        draft.name = " 香料棒 ".into();
        assert!(draft.can_save());
    }

    #[test]
    fn test_build_new_asset() {
        let mut draft = AssetDraft::new(AssetType::Character);
        draft.name = "鸟嘴医生".into();
        draft.tags = "医生, 面具,, 黑袍 ".into();
        draft.appearance = "beak mask".into();

        let asset = draft.build(None).unwrap();
        assert!(asset.id.starts_with("asset-"));
        assert_eq!(asset.tags, vec!["医生", "面具", "黑袍"]);
        assert_eq!(asset.consistency_score, DEFAULT_CONSISTENCY_SCORE);
        assert_eq!(asset.color, PRESET_COLORS[0]);
        assert!(asset.created_at > 0);
        assert_eq!(
            asset.kind,
            AssetKind::Character {
                appearance: "beak mask".into(),
                costume: String::new(),
            }
        );
    }

    #[test]
    fn test_style_lists() {
        let mut draft = AssetDraft::new(AssetType::Style);
        draft.name = "Woodcut".into();
        draft.color_scheme = "#8a7a5a, #3a3a3a".into();
        draft.rules = "no modern objects\n\nwarm shadows".into();

        match draft.build(None).unwrap().kind {
            AssetKind::Style {
                color_scheme, rules, ..
            } => {
                assert_eq!(color_scheme, vec!["#8a7a5a", "#3a3a3a"]);
                assert_eq!(rules, vec!["no modern objects", "warm shadows"]);
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_edit_keeps_identity() {
        let mut existing = Asset::new(
            "asset-7",
            "Harbour",
            AssetKind::Location {
                atmosphere: "foggy".into(),
                lighting: "dawn".into(),
            },
        )
        .with_score(91)
        .with_created_at(1_000)
        .with_tags(["港口", "中世纪"]);
        existing.reference_images.push(ReferenceImage {
            id: "img-1".into(),
            url: "https://example.com/harbour.png".into(),
            caption: "dock".into(),
            is_primary: true,
        });

        let mut draft = AssetDraft::from_asset(&existing);
        assert_eq!(draft.tags, "港口, 中世纪");
        assert_eq!(draft.atmosphere, "foggy");
        draft.lighting = "dusk".into();

        let saved = draft.build(Some(&existing)).unwrap();
        assert_eq!(saved.id, "asset-7");
        assert_eq!(saved.created_at, 1_000);
        assert_eq!(saved.consistency_score, 91);
        assert_eq!(saved.reference_images.len(), 1);
        assert_eq!(saved.tags, existing.tags);
        assert_eq!(
            saved.kind,
            AssetKind::Location {
                atmosphere: "foggy".into(),
                lighting: "dusk".into(),
            }
        );
    }

    #[test]
    fn test_switching_type_keeps_other_fields() {
        let mut draft = AssetDraft::new(AssetType::Character);
        draft.name = "Lantern".into();
        draft.appearance = "kept".into();
        draft.asset_type = AssetType::Prop;
        draft.scale = "hand-held".into();
        draft.asset_type = AssetType::Character;
        assert_eq!(draft.appearance, "kept");
        assert_eq!(draft.build(None).unwrap().asset_type(), AssetType::Character);
    }
}
