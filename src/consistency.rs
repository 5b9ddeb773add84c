//! Consistency aggregation and checking.
//!
//! Aggregates per-asset consistency scores and report issues into the
//! figures the status bar and report view show, and derives fresh reports
//! from the current shots and assets.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::project::model::{Asset, ConsistencyIssue, ConsistencyReport, IssueSeverity, Shot};

/// Assets scoring below this are reported as conflicts.
pub const CONFLICT_THRESHOLD: i32 = 80;

/// Score deducted per error.
pub const ERROR_PENALTY: i32 = 10;
/// Score deducted per warning.
pub const WARNING_PENALTY: i32 = 4;
/// Score deducted per info.
pub const INFO_PENALTY: i32 = 1;

/// Rounded mean of the scores, 0 for an empty set.
pub fn average_score<I>(scores: I) -> i32
where
    I: IntoIterator<Item = i32>,
{
    let (sum, count) = scores
        .into_iter()
        .fold((0i64, 0i64), |(sum, count), s| (sum + s as i64, count + 1));
    if count == 0 {
        return 0;
    }
    (sum as f64 / count as f64).round() as i32
}

/// Average consistency score across assets.
pub fn average_asset_score(assets: &[Asset]) -> i32 {
    average_score(assets.iter().map(|a| a.consistency_score))
}

/// Issue counts by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCounts {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl IssueCounts {
    pub fn from_issues(issues: &[ConsistencyIssue]) -> Self {
        issues.iter().fold(Self::default(), |mut counts, issue| {
            match issue.severity {
                IssueSeverity::Error => counts.errors += 1,
                IssueSeverity::Warning => counts.warnings += 1,
                IssueSeverity::Info => counts.infos += 1,
            }
            counts
        })
    }

    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.infos
    }

    /// Errors plus warnings: what the status bar flags.
    pub fn attention(&self) -> usize {
        self.errors + self.warnings
    }
}

/// Coarse rating of a 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn from_score(score: i32) -> Self {
        if score >= 90 {
            ScoreBand::Good
        } else if score >= 75 {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }
}

/// Verbal grade of the headline score, coarser than [`ScoreBand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoreGrade {
    Excellent,
    Good,
    NeedsImprovement,
}

impl ScoreGrade {
    pub fn from_score(score: i32) -> Self {
        if score >= 85 {
            ScoreGrade::Excellent
        } else if score >= 70 {
            ScoreGrade::Good
        } else {
            ScoreGrade::NeedsImprovement
        }
    }

    /// Label shown under the score ring.
    pub fn label(self) -> &'static str {
        match self {
            ScoreGrade::Excellent => "优秀",
            ScoreGrade::Good => "良好",
            ScoreGrade::NeedsImprovement => "需改善",
        }
    }
}

/// Overall project score.
///
/// Starts from the average asset score (100 with no assets), deducts a fixed
/// penalty per issue by severity and clamps to 0-100.
pub fn overall_score(asset_scores: &[i32], issues: &[ConsistencyIssue]) -> i32 {
    let base = if asset_scores.is_empty() {
        100
    } else {
        average_score(asset_scores.iter().copied())
    };
    let counts = IssueCounts::from_issues(issues);
    let penalty = counts.errors as i64 * ERROR_PENALTY as i64
        + counts.warnings as i64 * WARNING_PENALTY as i64
        + counts.infos as i64 * INFO_PENALTY as i64;
    (base as i64 - penalty).clamp(0, 100) as i32
}

/// Figures shown by the consistency report view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencySummary {
    pub overall_score: i32,
    pub band: ScoreBand,
    pub grade: ScoreGrade,
    pub average_asset_score: i32,
    pub counts: IssueCounts,
    pub checked_at: i64,
}

impl ConsistencySummary {
    pub fn new(report: &ConsistencyReport, assets: &[Asset]) -> Self {
        Self {
            overall_score: report.overall_score,
            band: ScoreBand::from_score(report.overall_score),
            grade: ScoreGrade::from_score(report.overall_score),
            average_asset_score: average_asset_score(assets),
            counts: IssueCounts::from_issues(&report.issues),
            checked_at: report.checked_at,
        }
    }
}

/// Derives a report from the current shots and assets.
///
/// Findings, in order:
/// - error: a shot references an asset that does not exist
/// - warning: an asset scores below [`CONFLICT_THRESHOLD`]
/// - info: an asset no shot references
/// - info: a shot with no linked assets
pub fn check(shots: &[Shot], assets: &[Asset], checked_at: i64) -> ConsistencyReport {
    let known: HashSet<&str> = assets.iter().map(|a| a.id.as_str()).collect();
    let referenced: HashSet<&str> = shots
        .iter()
        .flat_map(|s| s.asset_refs.iter().map(|r| r.asset_id.as_str()))
        .collect();

    let mut issues = Vec::new();

    for shot in shots {
        for r in shot.asset_refs.iter().filter(|r| !known.contains(r.asset_id.as_str())) {
            push_issue(
                &mut issues,
                IssueSeverity::Error,
                format!("Shot \"{}\" references missing asset {}", shot.title, r.asset_id),
                Some(shot.id.as_str()),
                Some(r.asset_id.as_str()),
            );
        }
    }

    for asset in assets.iter().filter(|a| a.consistency_score < CONFLICT_THRESHOLD) {
        push_issue(
            &mut issues,
            IssueSeverity::Warning,
            format!(
                "Asset \"{}\" is inconsistent across shots (score {})",
                asset.name, asset.consistency_score
            ),
            None,
            Some(asset.id.as_str()),
        );
    }

    for asset in assets.iter().filter(|a| !referenced.contains(a.id.as_str())) {
        push_issue(
            &mut issues,
            IssueSeverity::Info,
            format!("Asset \"{}\" is not used by any shot", asset.name),
            None,
            Some(asset.id.as_str()),
        );
    }

    for shot in shots.iter().filter(|s| s.asset_refs.is_empty()) {
        push_issue(
            &mut issues,
            IssueSeverity::Info,
            format!("Shot \"{}\" has no linked assets", shot.title),
            Some(shot.id.as_str()),
            None,
        );
    }

    let scores: Vec<i32> = assets.iter().map(|a| a.consistency_score).collect();
    let overall_score = overall_score(&scores, &issues);
    tracing::info!(
        issues = issues.len(),
        overall_score,
        "Consistency check completed"
    );

    ConsistencyReport {
        overall_score,
        issues,
        checked_at,
    }
}

/// Appends an issue with a sequential `issue-N` id.
fn push_issue(
    issues: &mut Vec<ConsistencyIssue>,
    severity: IssueSeverity,
    message: String,
    shot_id: Option<&str>,
    asset_id: Option<&str>,
) {
    let mut issue = ConsistencyIssue::new(format!("issue-{}", issues.len() + 1), severity, message);
    issue.shot_id = shot_id.map(str::to_string);
    issue.asset_id = asset_id.map(str::to_string);
    issues.push(issue);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::model::{AssetKind, AssetRef, AssetType};

    fn asset(id: &str, score: i32) -> Asset {
        Asset::new(id, id, AssetKind::empty(AssetType::Location)).with_score(score)
    }

    #[test]
    fn test_average_score_rounds() {
        assert_eq!(average_score([94, 87, 91, 76, 82, 96]), 88);
        assert_eq!(average_score([1, 2]), 2);
        assert_eq!(average_score(std::iter::empty()), 0);
    }

    #[test]
    fn test_average_asset_score_empty() {
        assert_eq!(average_asset_score(&[]), 0);
    }

    #[test]
    fn test_issue_counts() {
        let issues = vec![
            ConsistencyIssue::new("1", IssueSeverity::Error, "e"),
            ConsistencyIssue::new("2", IssueSeverity::Warning, "w"),
            ConsistencyIssue::new("3", IssueSeverity::Warning, "w"),
            ConsistencyIssue::new("4", IssueSeverity::Info, "i"),
        ];
        let counts = IssueCounts::from_issues(&issues);
        assert_eq!(counts.errors, 1);
        assert_eq!(counts.warnings, 2);
        assert_eq!(counts.infos, 1);
        assert_eq!(counts.attention(), 3);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn test_score_band() {
        assert_eq!(ScoreBand::from_score(90), ScoreBand::Good);
        assert_eq!(ScoreBand::from_score(89), ScoreBand::Fair);
        assert_eq!(ScoreBand::from_score(75), ScoreBand::Fair);
        assert_eq!(ScoreBand::from_score(74), ScoreBand::Poor);
    }

    #[test]
    fn test_score_grade() {
        assert_eq!(ScoreGrade::from_score(85), ScoreGrade::Excellent);
        assert_eq!(ScoreGrade::from_score(84), ScoreGrade::Good);
        assert_eq!(ScoreGrade::from_score(70), ScoreGrade::Good);
        assert_eq!(ScoreGrade::from_score(69), ScoreGrade::NeedsImprovement);
        assert_eq!(ScoreGrade::from_score(88).label(), "优秀");
        assert_eq!(ScoreGrade::from_score(0).label(), "需改善");
    }

    #[test]
    fn test_overall_score_formula() {
        assert_eq!(overall_score(&[], &[]), 100);
        let issues = vec![
            ConsistencyIssue::new("1", IssueSeverity::Error, "e"),
            ConsistencyIssue::new("2", IssueSeverity::Warning, "w"),
            ConsistencyIssue::new("3", IssueSeverity::Info, "i"),
        ];
        // 88 - 10 - 4 - 1
        assert_eq!(overall_score(&[94, 87, 91, 76, 82, 96], &issues), 73);

        let many: Vec<_> = (0..20)
            .map(|i| ConsistencyIssue::new(i.to_string(), IssueSeverity::Error, "e"))
            .collect();
        assert_eq!(overall_score(&[50], &many), 0);
    }

    #[test]
    fn test_check_reports_findings() {
        let assets = vec![asset("town", 94), asset("map", 76), asset("island", 96)];
        let shots = vec![
            Shot::new("shot-1", 1, "Arrival")
                .with_asset_ref(AssetRef::new("town", AssetType::Location, "背景"))
                .with_asset_ref(AssetRef::new("ghost", AssetType::Prop, "道具")),
            Shot::new("shot-2", 2, "Spread")
                .with_asset_ref(AssetRef::new("map", AssetType::Location, "背景")),
            Shot::new("shot-3", 3, "Legacy"),
        ];

        let report = check(&shots, &assets, 42);
        let counts = IssueCounts::from_issues(&report.issues);
        assert_eq!(counts.errors, 1);
        assert_eq!(counts.warnings, 1);
        assert_eq!(counts.infos, 2);
        assert_eq!(report.checked_at, 42);

        assert_eq!(report.issues[0].asset_id.as_deref(), Some("ghost"));
        assert_eq!(report.issues[1].asset_id.as_deref(), Some("map"));
        assert_eq!(report.issues[2].asset_id.as_deref(), Some("island"));
        assert_eq!(report.issues[3].shot_id.as_deref(), Some("shot-3"));

        // round(266 / 3) = 89, minus 10 + 4 + 2
        assert_eq!(report.overall_score, 73);
    }

    #[test]
    fn test_check_clean_project() {
        let assets = vec![asset("town", 94)];
        let shots = vec![Shot::new("shot-1", 1, "Arrival")
            .with_asset_ref(AssetRef::new("town", AssetType::Location, "背景"))];
        let report = check(&shots, &assets, 0);
        assert!(report.issues.is_empty());
        assert_eq!(report.overall_score, 94);
    }

    #[test]
    fn test_summary() {
        let report = ConsistencyReport {
            overall_score: 86,
            issues: vec![ConsistencyIssue::new("1", IssueSeverity::Warning, "w")],
            checked_at: 7,
        };
        let summary = ConsistencySummary::new(&report, &[asset("a", 90), asset("b", 80)]);
        assert_eq!(summary.band, ScoreBand::Fair);
        assert_eq!(summary.grade, ScoreGrade::Excellent);
        assert_eq!(summary.average_asset_score, 85);
        assert_eq!(summary.counts.warnings, 1);
    }
}
