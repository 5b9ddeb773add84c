//! Arrangement timeline: tracks, clips and playhead helpers.

use autosurgeon::{Hydrate, Reconcile};
use serde::{Deserialize, Serialize};

use crate::project::model::Shot;

#[derive(Debug, Clone, Copy, Default, Reconcile, Hydrate, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TrackType {
    #[default]
    Video,
    Voiceover,
    Music,
    Subtitle,
}

/// A clip placed on a track. Times are in seconds.
#[derive(Debug, Clone, Default, Reconcile, Hydrate, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TimelineClip {
    pub id: String,
    pub label: String,
    pub start_time: f64,
    pub duration: f64,
    pub color: String,
}

impl TimelineClip {
    pub fn new(id: impl Into<String>, label: impl Into<String>, start_time: f64, duration: f64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            start_time,
            duration,
            color: String::new(),
        }
    }

    /// Builder: Set color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Whether `time` falls in `[start, end)`.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start_time && time < self.end_time()
    }
}

/// A track of clips. Clips are expected not to overlap, but nothing enforces it.
#[derive(Debug, Clone, Default, Reconcile, Hydrate, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TimelineTrack {
    pub id: String,
    #[serde(rename = "type")]
    pub track_type: TrackType,
    pub label: String,
    pub clips: Vec<TimelineClip>,
}

impl TimelineTrack {
    pub fn new(id: impl Into<String>, track_type: TrackType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            track_type,
            label: label.into(),
            clips: Vec::new(),
        }
    }

    /// Builder: Append a clip.
    pub fn with_clip(mut self, clip: TimelineClip) -> Self {
        self.clips.push(clip);
        self
    }

    /// End of the last clip, 0 for an empty track.
    pub fn end_time(&self) -> f64 {
        self.clips
            .iter()
            .map(TimelineClip::end_time)
            .fold(0.0, f64::max)
    }

    /// First clip under the playhead.
    pub fn clip_at(&self, time: f64) -> Option<&TimelineClip> {
        self.clips.iter().find(|c| c.contains(time))
    }

    /// Index pairs of clips whose ranges intersect.
    pub fn overlaps(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (i, a) in self.clips.iter().enumerate() {
            for (j, b) in self.clips.iter().enumerate().skip(i + 1) {
                if a.start_time < b.end_time() && b.start_time < a.end_time() {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }
}

/// Builds the picture track from shots laid end to end, in the given order.
pub fn video_track_from_shots<'a, I>(shots: I) -> TimelineTrack
where
    I: IntoIterator<Item = &'a Shot>,
{
    let mut track = TimelineTrack::new("track-video", TrackType::Video, "画面");
    let mut cursor = 0.0;
    for shot in shots {
        track.clips.push(
            TimelineClip::new(format!("clip-{}", shot.id), shot.title.clone(), cursor, shot.duration)
                .with_color(shot.thumbnail_color.clone()),
        );
        cursor += shot.duration;
    }
    track
}

/// Clamps a playhead position to `[0, total]`. NaN maps to 0.
pub fn clamp_playhead(time: f64, total: f64) -> f64 {
    if time.is_nan() {
        return 0.0;
    }
    time.max(0.0).min(total.max(0.0))
}

/// Formats seconds as `m:ss`.
pub fn format_timecode(seconds: f64) -> String {
    let whole = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", whole / 60, whole % 60)
}

/// Upper bound on the number of ruler ticks.
pub const MAX_RULER_MARKS: usize = 10_000;

/// Ruler tick positions: 0, step, 2*step ... up to `ceil(total / step) * step`.
///
/// Degenerate input, or a step so fine it would exceed [`MAX_RULER_MARKS`],
/// yields just the origin.
pub fn ruler_marks(total: f64, step: f64) -> Vec<f64> {
    if !step.is_finite() || step <= 0.0 || !total.is_finite() || total <= 0.0 {
        return vec![0.0];
    }
    let count = (total / step).ceil() + 1.0;
    if !count.is_finite() || count > MAX_RULER_MARKS as f64 {
        tracing::debug!(total, step, "ruler step too fine, skipping marks");
        return vec![0.0];
    }
    (0..count as usize).map(|i| i as f64 * step).collect()
}
