//! JSON project files.
//!
//! The file keeps shots and assets as arrays in display order, the shape the
//! editor front end works with. The document keeps them as a HashMap plus an
//! order Vec; this module converts between the two.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use shotboard::{Asset, ConsistencyReport, ProjectRoot, Shot, TimelineTrack};

/// Project as stored in a `.json` file.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectFile {
    pub id: String,
    pub title: String,
    pub shots: Vec<Shot>,
    pub assets: Vec<Asset>,
    pub consistency_report: ConsistencyReport,
    pub tracks: Vec<TimelineTrack>,
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Converts an array to HashMap + order vector, preserving input order.
///
/// Later duplicates of an id are dropped so the order never names an id twice.
fn array_to_hashmap<T, F>(items: Vec<T>, key_fn: F) -> (HashMap<String, T>, Vec<String>)
where
    F: Fn(&T) -> String,
{
    let mut map = HashMap::with_capacity(items.len());
    let mut order = Vec::with_capacity(items.len());
    for item in items {
        let key = key_fn(&item);
        if map.contains_key(&key) {
            tracing::warn!(id = %key, "Skipping duplicate id in project file");
            continue;
        }
        order.push(key.clone());
        map.insert(key, item);
    }
    (map, order)
}

// =============================================================================
// CONVERSIONS
// =============================================================================

impl From<ProjectFile> for ProjectRoot {
    fn from(file: ProjectFile) -> Self {
        let (shots, shot_order) = array_to_hashmap(file.shots, |s| s.id.clone());
        let (assets, asset_order) = array_to_hashmap(file.assets, |a| a.id.clone());

        ProjectRoot {
            id: file.id,
            title: file.title,
            shot_order,
            shots,
            asset_order,
            assets,
            consistency_report: file.consistency_report,
            tracks: file.tracks,
        }
    }
}

impl From<&ProjectRoot> for ProjectFile {
    fn from(root: &ProjectRoot) -> Self {
        ProjectFile {
            id: root.id.clone(),
            title: root.title.clone(),
            shots: root.ordered_shots().into_iter().cloned().collect(),
            assets: root.ordered_assets().into_iter().cloned().collect(),
            consistency_report: root.consistency_report.clone(),
            tracks: root.tracks.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_survives_file_shape() {
        let root = shotboard::fixtures::seed_project();
        let file = ProjectFile::from(&root);
        let json = serde_json::to_string(&file).unwrap();
        let parsed: ProjectFile = serde_json::from_str(&json).unwrap();
        assert_eq!(ProjectRoot::from(parsed), root);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let file = ProjectFile {
            shots: vec![
                Shot::new("shot-1", 1, "first"),
                Shot::new("shot-1", 2, "second"),
            ],
            ..ProjectFile::default()
        };
        let root = ProjectRoot::from(file);
        assert_eq!(root.shot_order, vec!["shot-1"]);
        assert_eq!(root.shots["shot-1"].title, "first");
    }

    #[test]
    fn test_missing_fields_default() {
        let parsed: ProjectFile = serde_json::from_str(r#"{"id":"p","shots":[{"id":"s","title":"t"}]}"#).unwrap();
        let root = ProjectRoot::from(parsed);
        assert_eq!(root.consistency_report.overall_score, 100);
        assert_eq!(root.shots["s"].duration, 0.0);
    }
}
