//! The project document and its store.
//!
//! - `model`: shots, assets, references and the consistency report
//! - `timeline`: arrange-view tracks and playhead helpers
//! - `session`: volatile editor state (tab, selection, playhead)
//! - `store`: ProjectStore, the Automerge-backed source of truth

pub mod model;
pub mod session;
pub mod store;
pub mod timeline;

pub use model::*;
pub use session::{Session, WorkspaceTab};
pub use store::{Outcome, ProjectStore};
pub use timeline::{TimelineClip, TimelineTrack, TrackType};
