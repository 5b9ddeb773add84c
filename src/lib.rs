//! Shotboard - project store for AI-assisted documentary storyboards.
//!
//! An Automerge document holds the shots, the visual assets they reference,
//! the last consistency report and the arrange-view tracks. On top of it:
//!
//! - **Narration annotation**: voice-over text split into plain and keyword runs
//! - **Consistency aggregation**: average scores, issue counts and fresh checks
//! - **Referential cleanup**: deleting an asset removes every shot reference to it
//!
//! # Example
//!
//! ```rust
//! use shotboard::{Asset, AssetKind, AssetRef, AssetType, ProjectStore, Shot};
//!
//! let mut store = ProjectStore::new();
//!
//! let town = Asset::new(
//!     "asset-town",
//!     "Medieval town",
//!     AssetKind::empty(AssetType::Location),
//! )
//! .with_score(94);
//! store.add_asset(town).unwrap();
//!
//! let shot = Shot::new("shot-1", 1, "Arrival")
//!     .with_narration("The fleet docks at Messina.")
//!     .with_keywords(["Messina"])
//!     .with_duration(14.0)
//!     .with_asset_ref(AssetRef::new("asset-town", AssetType::Location, "background"));
//! store.add_shot(shot).unwrap();
//!
//! // Deleting the asset also drops the shot's reference to it.
//! store.delete_asset("asset-town").unwrap();
//! assert!(store.shot("shot-1").unwrap().unwrap().asset_refs.is_empty());
//!
//! let bytes = store.save();
//! assert!(!bytes.is_empty());
//! ```

pub mod consistency;
pub mod editor;
pub mod error;
pub mod fixtures;
pub mod narration;
pub mod project;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-exports for convenience
pub use consistency::{ConsistencySummary, IssueCounts, ScoreBand, ScoreGrade};
pub use editor::AssetDraft;
pub use error::{EntityKind, ProjectError, ProjectResult};
pub use narration::{annotate, Segment};
pub use project::{
    Asset, AssetKind, AssetRef, AssetType, AssetUpdate, CameraMovement, ConsistencyIssue,
    ConsistencyReport, IssueSeverity, Outcome, ProjectRoot, ProjectStore, ReferenceImage, Session,
    Shot, ShotType, ShotUpdate, TimelineClip, TimelineTrack, TrackType, WorkspaceTab,
};

#[cfg(feature = "wasm")]
pub use wasm::JsProjectStore;
