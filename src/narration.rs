//! Narration keyword annotation.
//!
//! Splits a narration string into plain and highlighted segments so the
//! editor can mark visual keywords inside the voice-over text.

use serde::{Deserialize, Serialize};

/// A run of narration text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

impl Segment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            highlighted: false,
        }
    }

    pub fn highlighted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            highlighted: true,
        }
    }

    pub fn is_plain(&self) -> bool {
        !self.highlighted
    }
}

/// Splits `text` into segments, highlighting keyword occurrences.
///
/// Scans left to right. At each step the keyword with the leftmost match in
/// the remaining text wins; on a tie the keyword listed first wins, not the
/// longest one. Matching is case-sensitive and never overlaps. Concatenating
/// the segment texts always yields `text` again.
///
/// Empty keywords are ignored. An empty `text` yields no segments.
pub fn annotate<S: AsRef<str>>(text: &str, keywords: &[S]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let mut earliest: Option<(usize, &str)> = None;
        for keyword in keywords {
            let keyword = keyword.as_ref();
            if keyword.is_empty() {
                continue;
            }
            if let Some(idx) = rest.find(keyword) {
                if earliest.map_or(true, |(best, _)| idx < best) {
                    earliest = Some((idx, keyword));
                }
            }
        }

        let Some((start, keyword)) = earliest else {
            segments.push(Segment::plain(rest));
            break;
        };

        if start > 0 {
            segments.push(Segment::plain(&rest[..start]));
        }
        let end = start + keyword.len();
        segments.push(Segment::highlighted(&rest[start..end]));
        rest = &rest[end..];
    }

    segments
}

/// Highlighted terms in order of appearance.
pub fn highlighted_terms(segments: &[Segment]) -> Vec<&str> {
    segments
        .iter()
        .filter(|s| s.highlighted)
        .map(|s| s.text.as_str())
        .collect()
}

/// Renders segments with highlighted runs wrapped in `open`/`close` markers.
pub fn render_marked(segments: &[Segment], open: &str, close: &str) -> String {
    let mut out = String::new();
    for segment in segments {
        if segment.highlighted {
            out.push_str(open);
            out.push_str(&segment.text);
            out.push_str(close);
        } else {
            out.push_str(&segment.text);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(segments: &[Segment]) -> String {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_highlights_cjk_keywords() {
        let segments = annotate("跳蚤附着在黑鼠身上", &["跳蚤", "黑鼠"]);
        assert_eq!(
            segments,
            vec![
                Segment::highlighted("跳蚤"),
                Segment::plain("附着在"),
                Segment::highlighted("黑鼠"),
                Segment::plain("身上"),
            ]
        );
    }

    #[test]
    fn test_no_keywords_yields_single_plain_segment() {
        let empty: [&str; 0] = [];
        let segments = annotate("a quiet harbour", &empty);
        assert_eq!(segments, vec![Segment::plain("a quiet harbour")]);
    }

    #[test]
    fn test_no_occurrence_yields_single_plain_segment() {
        let segments = annotate("a quiet harbour", &["plague"]);
        assert_eq!(segments, vec![Segment::plain("a quiet harbour")]);
    }

    #[test]
    fn test_empty_text() {
        assert!(annotate("", &["x"]).is_empty());
    }

    #[test]
    fn test_tie_goes_to_first_listed_keyword() {
        let segments = annotate("鼠疫杆菌", &["鼠疫", "鼠疫杆菌"]);
        assert_eq!(
            segments,
            vec![Segment::highlighted("鼠疫"), Segment::plain("杆菌")]
        );

        let segments = annotate("鼠疫杆菌", &["鼠疫杆菌", "鼠疫"]);
        assert_eq!(segments, vec![Segment::highlighted("鼠疫杆菌")]);
    }

    #[test]
    fn test_repeated_keyword_and_case_sensitivity() {
        let segments = annotate("Rat, rat, RAT", &["rat"]);
        assert_eq!(highlighted_terms(&segments), vec!["rat"]);
        assert_eq!(joined(&segments), "Rat, rat, RAT");

        let segments = annotate("rat-rat", &["rat"]);
        assert_eq!(
            segments,
            vec![
                Segment::highlighted("rat"),
                Segment::plain("-"),
                Segment::highlighted("rat"),
            ]
        );
    }

    #[test]
    fn test_empty_keyword_ignored() {
        let segments = annotate("abc", &["", "b"]);
        assert_eq!(
            segments,
            vec![
                Segment::plain("a"),
                Segment::highlighted("b"),
                Segment::plain("c"),
            ]
        );
    }

    #[test]
    fn test_lossless_over_samples() {
        let narration = "1347年，一支来自东方的热那亚商船队停靠在西西里岛的墨西拿港。鼠疫就此登陆。";
        let keyword_sets: Vec<Vec<&str>> = vec![
            vec![],
            vec!["商船", "墨西拿港", "鼠疫", "黑死病"],
            vec!["。"],
            vec!["1347年，一支来自东方的热那亚商船队停靠在西西里岛的墨西拿港。鼠疫就此登陆。"],
            vec!["不存在"],
        ];
        for keywords in keyword_sets {
            let segments = annotate(narration, &keywords);
            assert_eq!(joined(&segments), narration);
            for term in highlighted_terms(&segments) {
                assert!(keywords.contains(&term));
            }
        }
    }

    #[test]
    fn test_render_marked() {
        let segments = annotate("跳蚤附着在黑鼠身上", &["跳蚤", "黑鼠"]);
        assert_eq!(render_marked(&segments, "[", "]"), "[跳蚤]附着在[黑鼠]身上");
    }
}
