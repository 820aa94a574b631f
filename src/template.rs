use crate::letters::is_vowel;
use fastrand::Rng;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SegmentRole {
    First,
    Middle,
    Last,
    Initial,
    HyphenatedLast,
}

impl SegmentRole {
    pub fn is_surname(&self) -> bool {
        matches!(self, Self::Last | Self::HyphenatedLast)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentSpec {
    pub role: SegmentRole,
    pub min_len: usize,
    pub max_len: usize,
}

impl SegmentSpec {
    pub const fn new(role: SegmentRole, min_len: usize, max_len: usize) -> Self {
        Self {
            role,
            min_len,
            max_len,
        }
    }

    pub fn admits(&self, len: usize) -> bool {
        self.min_len <= len && len <= self.max_len
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameTemplate {
    pub label: String,
    pub segments: Vec<SegmentSpec>,
}

impl NameTemplate {
    pub fn new(label: &str, segments: &[SegmentSpec]) -> Self {
        Self {
            label: label.to_string(),
            segments: segments.to_vec(),
        }
    }

    pub fn total_min(&self) -> usize {
        self.segments.iter().map(|s| s.min_len).sum()
    }

    pub fn total_max(&self) -> usize {
        self.segments.iter().map(|s| s.max_len).sum()
    }

    /// Inclusive letter-count feasibility.
    pub fn accepts(&self, n_letters: usize) -> bool {
        self.total_min() <= n_letters && n_letters <= self.total_max()
    }

    pub fn has_role(&self, role: SegmentRole) -> bool {
        self.segments.iter().any(|s| s.role == role)
    }

    pub fn is_hyphenated(&self) -> bool {
        self.has_role(SegmentRole::HyphenatedLast)
    }

    pub fn is_mononym(&self) -> bool {
        self.segments.len() == 1
    }
}

use SegmentRole::{First, HyphenatedLast, Initial, Last, Middle};

const CATALOG: &[(&str, &[SegmentSpec])] = &[
    ("Mononym", &[SegmentSpec::new(First, 3, 10)]),
    (
        "I. Last",
        &[SegmentSpec::new(Initial, 1, 1), SegmentSpec::new(Last, 2, 5)],
    ),
    (
        "First Last",
        &[SegmentSpec::new(First, 3, 8), SegmentSpec::new(Last, 3, 9)],
    ),
    (
        "First M. Last",
        &[
            SegmentSpec::new(First, 3, 7),
            SegmentSpec::new(Initial, 1, 1),
            SegmentSpec::new(Last, 3, 8),
        ],
    ),
    (
        "First Middle Last",
        &[
            SegmentSpec::new(First, 3, 7),
            SegmentSpec::new(Middle, 3, 6),
            SegmentSpec::new(Last, 3, 8),
        ],
    ),
    (
        "First M. M. Last",
        &[
            SegmentSpec::new(First, 3, 7),
            SegmentSpec::new(Initial, 1, 1),
            SegmentSpec::new(Initial, 1, 1),
            SegmentSpec::new(Last, 4, 9),
        ],
    ),
    (
        "First M. Last-Last",
        &[
            SegmentSpec::new(First, 3, 7),
            SegmentSpec::new(Initial, 1, 1),
            SegmentSpec::new(Last, 3, 8),
            SegmentSpec::new(HyphenatedLast, 3, 8),
        ],
    ),
    (
        "First M. M. Last-Last",
        &[
            SegmentSpec::new(First, 3, 7),
            SegmentSpec::new(Initial, 1, 1),
            SegmentSpec::new(Initial, 1, 1),
            SegmentSpec::new(Last, 3, 8),
            SegmentSpec::new(HyphenatedLast, 3, 8),
        ],
    ),
    (
        "First Middle Last-Last",
        &[
            SegmentSpec::new(First, 3, 7),
            SegmentSpec::new(Middle, 3, 6),
            SegmentSpec::new(Last, 3, 8),
            SegmentSpec::new(HyphenatedLast, 3, 8),
        ],
    ),
    (
        "First Middle Middle Last-Last",
        &[
            SegmentSpec::new(First, 3, 7),
            SegmentSpec::new(Middle, 3, 6),
            SegmentSpec::new(Middle, 3, 6),
            SegmentSpec::new(Last, 3, 8),
            SegmentSpec::new(HyphenatedLast, 3, 8),
        ],
    ),
];

pub const MIN_LETTERS_FOR_HYPHEN: usize = 16;
pub const MAX_SELECTED_TEMPLATES: usize = 5;
pub const APOSTROPHE_PROBABILITY: f64 = 0.05;

/// The full catalog, simplest shapes first.
pub fn list_templates() -> Vec<NameTemplate> {
    CATALOG
        .iter()
        .map(|(label, specs)| NameTemplate::new(label, specs))
        .collect()
}

/// Case-insensitive lookup by label.
pub fn find_template(label: &str) -> Option<NameTemplate> {
    let wanted = label.trim();
    CATALOG
        .iter()
        .find(|(l, _)| l.eq_ignore_ascii_case(wanted))
        .map(|(l, specs)| NameTemplate::new(l, specs))
}

/// Picks up to five catalog templates that can hold `n_letters`, in an
/// order shuffled by `rng`. Falls back to a synthesised shape when nothing
/// in the catalog fits.
pub fn select_templates(
    n_letters: usize,
    required_roles: &[SegmentRole],
    rng: &mut Rng,
) -> Vec<NameTemplate> {
    let mut viable: Vec<NameTemplate> = list_templates()
        .into_iter()
        .filter(|t| t.accepts(n_letters))
        .filter(|t| !t.is_hyphenated() || n_letters >= MIN_LETTERS_FOR_HYPHEN)
        .filter(|t| required_roles.iter().all(|r| t.has_role(*r)))
        .collect();

    if viable.is_empty() {
        viable.push(fallback_template(n_letters));
    }

    rng.shuffle(&mut viable);
    viable.truncate(MAX_SELECTED_TEMPLATES);
    viable
}

/// Shape for letter counts the catalog does not cover.
pub fn fallback_template(n_letters: usize) -> NameTemplate {
    if n_letters <= 3 {
        let rest = n_letters.saturating_sub(1).max(1);
        NameTemplate::new(
            "I. Last",
            &[SegmentSpec::new(Initial, 1, 1), SegmentSpec::new(Last, rest, rest)],
        )
    } else if n_letters <= 5 {
        let max = n_letters - 2;
        NameTemplate::new(
            "First Last",
            &[SegmentSpec::new(First, 2, max), SegmentSpec::new(Last, 2, max)],
        )
    } else {
        let per = n_letters / 4;
        let rem = n_letters % 4;
        // Smallest per-word ceiling that still holds every letter.
        let spread = (n_letters - 1).div_ceil(3);
        NameTemplate::new(
            "First M. Last-Last",
            &[
                SegmentSpec::new(First, per, (per + rem).max(spread)),
                SegmentSpec::new(Initial, 1, 1),
                SegmentSpec::new(Last, per, (per + 3).max(spread)),
                SegmentSpec::new(HyphenatedLast, per, (per + 3).max(spread)),
            ],
        )
    }
}

/// Widens the bounds of `template` so it can hold `n_letters`, spreading the
/// letters evenly over the non-initial segments. `None` when no widening
/// can work.
pub fn relax_template(template: &NameTemplate, n_letters: usize) -> Option<NameTemplate> {
    if template.accepts(n_letters) {
        return Some(template.clone());
    }
    let initials = template
        .segments
        .iter()
        .filter(|s| s.role == Initial)
        .count();
    let flexible = template.segments.len() - initials;

    if n_letters < template.segments.len() {
        return None;
    }
    if flexible == 0 {
        return None;
    }

    let share = n_letters - initials;
    let floor = (share / flexible).max(1);
    let ceil = share.div_ceil(flexible);

    let segments = template
        .segments
        .iter()
        .map(|s| {
            if s.role == Initial {
                *s
            } else {
                SegmentSpec::new(s.role, s.min_len.min(floor).max(1), s.max_len.max(ceil))
            }
        })
        .collect();

    let relaxed = NameTemplate {
        label: template.label.clone(),
        segments,
    };
    relaxed.accepts(n_letters).then_some(relaxed)
}

fn capitalize(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut upper_next = true;
    for c in segment.chars() {
        if upper_next && c.is_ascii_alphabetic() {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c.to_ascii_lowercase());
        }
        if c == '\'' {
            upper_next = true;
        }
    }
    out
}

/// Renders segments as a display name: capitalised, initials dotted,
/// hyphenated surnames attached to the preceding part.
pub fn format_name<S: AsRef<str>>(segments: &[S], template: &NameTemplate) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(segments.len());
    for (segment, spec) in segments.iter().zip(template.segments.iter()) {
        let word = capitalize(segment.as_ref());
        match spec.role {
            Initial => {
                let letter = word.chars().next().map(String::from).unwrap_or_default();
                parts.push(format!("{}.", letter));
            }
            HyphenatedLast => match parts.last_mut() {
                Some(prev) => {
                    prev.push('-');
                    prev.push_str(&word);
                }
                None => parts.push(word),
            },
            _ => parts.push(word),
        }
    }
    parts.join(" ")
}

/// Occasionally writes a surname like "obrien" as "o'brien". Display only;
/// `frozen` segments are left alone. Draws from `rng` once per qualifying
/// segment.
pub fn apply_apostrophes(
    segments: &[String],
    template: &NameTemplate,
    frozen: &[bool],
    rng: &mut Rng,
) -> Vec<String> {
    segments
        .iter()
        .zip(template.segments.iter())
        .enumerate()
        .map(|(i, (seg, spec))| {
            let bytes = seg.as_bytes();
            let qualifies = spec.role.is_surname()
                && !frozen.get(i).copied().unwrap_or(false)
                && bytes.len() >= 4
                && bytes[0] == b'o'
                && !is_vowel(bytes[1]);
            if qualifies && rng.f64() < APOSTROPHE_PROBABILITY {
                format!("o'{}", &seg[1..])
            } else {
                seg.clone()
            }
        })
        .collect()
}

/// `(label, segment count, min letters, max letters)` for every template.
pub fn template_summaries() -> Vec<(String, usize, usize, usize)> {
    list_templates()
        .into_iter()
        .map(|t| {
            let (min, max) = (t.total_min(), t.total_max());
            (t.label, t.segments.len(), min, max)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_bounds() {
        let t = find_template("first m. last").unwrap();
        assert_eq!(t.label, "First M. Last");
        assert_eq!((t.total_min(), t.total_max()), (7, 16));
        assert_eq!(list_templates().len(), 10);
    }

    #[test]
    fn test_capitalize_after_apostrophe() {
        assert_eq!(capitalize("o'brien"), "O'Brien");
        assert_eq!(capitalize("smith"), "Smith");
    }

    #[test]
    fn test_relax_impossible() {
        let t = find_template("First M. M. Last").unwrap();
        assert!(relax_template(&t, 3).is_none());
        let relaxed = relax_template(&t, 40).unwrap();
        assert!(relaxed.accepts(40));
        assert_eq!(relaxed.segments[1], SegmentSpec::new(Initial, 1, 1));
    }

    #[test]
    fn test_role_names() {
        use strum::IntoEnumIterator;
        assert_eq!(SegmentRole::iter().count(), 5);
        assert_eq!(SegmentRole::HyphenatedLast.to_string(), "hyphenated_last");
    }
}
