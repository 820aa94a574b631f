use crate::scorer::ScoreDetails;
use crate::template::SegmentSpec;
use serde::Serialize;

/// One filled segment of a name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub text: String,
    pub spec: SegmentSpec,
    /// Supplied by the caller rather than generated.
    pub fixed: bool,
}

impl Segment {
    /// Segments that count when comparing two candidates for overlap.
    pub fn is_comparable(&self) -> bool {
        !self.fixed && self.text.len() > 1
    }
}

/// A finished arrangement of the input letters into a template.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub template: String,
    pub segments: Vec<Segment>,
    /// Formatted display name.
    pub name: String,
    pub score: f32,
    #[serde(skip)]
    pub details: ScoreDetails,
    /// Letters were checked against the input.
    pub verified: bool,
}

impl Candidate {
    /// All segment letters in order, without separators.
    pub fn letters(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    /// Sorted lower-case segment texts; equal for reorderings of the same parts.
    pub fn segment_key(&self) -> Vec<String> {
        let mut key: Vec<String> = self
            .segments
            .iter()
            .map(|s| s.text.to_ascii_lowercase())
            .collect();
        key.sort();
        key
    }
}
