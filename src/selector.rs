use crate::candidate::Candidate;
use std::collections::{HashMap, HashSet};
use tracing::debug;
use typed_builder::TypedBuilder;

#[derive(Debug, Clone, TypedBuilder)]
pub struct SelectionOptions {
    pub count: usize,
    #[builder(default = 0.8)]
    pub similarity_threshold: f32,
    #[builder(default = 2.0)]
    pub overlap_penalty: f32,
}

impl SelectionOptions {
    /// At most 40% of the results from one template, but never fewer than 2.
    pub fn per_template_cap(&self) -> usize {
        ((self.count as f32 * 0.4) as usize).max(2)
    }
}

/// Edit distance over bytes.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// What two candidates are compared on.
struct Profile {
    /// Lower-case comparable segments.
    set: HashSet<String>,
    /// Generated part of the name, lower-case; fixed segments are left out.
    text: String,
}

impl Profile {
    fn of(c: &Candidate) -> Self {
        let set = c
            .segments
            .iter()
            .filter(|s| s.is_comparable())
            .map(|s| s.text.to_ascii_lowercase())
            .collect();
        let text = c
            .segments
            .iter()
            .filter(|s| !s.fixed)
            .map(|s| s.text.to_ascii_lowercase())
            .collect::<Vec<_>>()
            .join(" ");
        Self { set, text }
    }

    fn shared(&self, other: &Profile) -> usize {
        self.set.intersection(&other.set).count()
    }

    fn similarity(&self, other: &Profile) -> f32 {
        let overlap = match self.set.len().max(other.set.len()) {
            0 => 0.0,
            m => self.shared(other) as f32 / m as f32,
        };
        let longest = self.text.len().max(other.text.len());
        let edit = if longest == 0 {
            1.0
        } else {
            1.0 - levenshtein(&self.text, &other.text) as f32 / longest as f32
        };
        overlap.max(edit)
    }
}

/// Similarity in `[0, 1]`: the larger of the shared-segment ratio and the
/// normalised edit similarity of the generated parts.
pub fn similarity(a: &Candidate, b: &Candidate) -> f32 {
    Profile::of(a).similarity(&Profile::of(b))
}

/// Drops repeats by formatted name and by segment set, keeping the first
/// occurrence.
pub fn dedupe(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut names = HashSet::new();
    let mut keys = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| {
            let fresh_name = !names.contains(&c.name.to_lowercase());
            let fresh_key = !keys.contains(&c.segment_key());
            if fresh_name && fresh_key {
                names.insert(c.name.to_lowercase());
                keys.insert(c.segment_key());
                true
            } else {
                false
            }
        })
        .collect()
}

/// Picks up to `count` diverse candidates, best adjusted score first.
///
/// Adjusted score is the score minus `overlap_penalty` for each segment
/// shared with the most similar pick so far. A candidate too similar to any
/// pick is never taken. A second pass lifts the per-template cap if the
/// first one comes up short.
pub fn select(candidates: Vec<Candidate>, opts: &SelectionOptions) -> Vec<Candidate> {
    let total = candidates.len();
    let mut pool = dedupe(candidates);
    pool.sort_by(|a, b| b.score.total_cmp(&a.score));
    let unique = pool.len();

    let mut pool: Vec<(Candidate, Profile)> = pool
        .into_iter()
        .map(|c| {
            let profile = Profile::of(&c);
            (c, profile)
        })
        .collect();

    let mut chosen: Vec<(Candidate, Profile)> = Vec::with_capacity(opts.count);
    let mut per_label: HashMap<String, usize> = HashMap::new();
    let cap = opts.per_template_cap();

    for capped in [true, false] {
        while chosen.len() < opts.count {
            let mut best: Option<(usize, f32)> = None;
            for (i, (cand, profile)) in pool.iter().enumerate() {
                if capped && per_label.get(&cand.template).copied().unwrap_or(0) >= cap {
                    continue;
                }
                if chosen
                    .iter()
                    .any(|(_, p)| profile.similarity(p) >= opts.similarity_threshold)
                {
                    continue;
                }
                let overlap = chosen
                    .iter()
                    .map(|(_, p)| profile.shared(p))
                    .max()
                    .unwrap_or(0);
                let adjusted = cand.score - opts.overlap_penalty * overlap as f32;
                if best.map_or(true, |(_, b)| adjusted > b) {
                    best = Some((i, adjusted));
                }
            }

            let Some((idx, _)) = best else {
                break;
            };
            let pick = pool.remove(idx);
            *per_label.entry(pick.0.template.clone()).or_insert(0) += 1;
            chosen.push(pick);
        }
    }

    debug!(
        "Selected {} of {} candidates ({} unique)",
        chosen.len(),
        total,
        unique
    );
    chosen.into_iter().map(|(c, _)| c).collect()
}
