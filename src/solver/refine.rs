use super::SolveContext;
use crate::phonotactics::syllable_spans;
use std::ops::Range;

/// What a refinement run did. `trajectory` starts with the constructed
/// score and gains one entry per accepted move.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefineOutcome {
    pub char_swaps: usize,
    pub syllable_swaps: usize,
    pub trajectory: Vec<f32>,
}

impl RefineOutcome {
    pub fn final_score(&self) -> f32 {
        self.trajectory.last().copied().unwrap_or(f32::NEG_INFINITY)
    }
}

/// Hill-climbs `texts` in place: single-character swaps first, then
/// equal-length syllable swaps. Only strict improvements are accepted; each
/// scan restarts after an accepted move and stops when a full scan finds
/// nothing or the budget runs out. Fixed segments never change.
pub fn refine(
    ctx: &SolveContext,
    texts: &mut [String],
    char_budget: usize,
    syllable_budget: usize,
) -> RefineOutcome {
    let mut current = ctx.score(texts);
    let mut outcome = RefineOutcome {
        trajectory: vec![current],
        ..Default::default()
    };
    if texts.len() < 2 {
        return outcome;
    }

    while outcome.char_swaps < char_budget {
        let Some(score) = first_char_swap(ctx, texts, current) else {
            break;
        };
        current = score;
        outcome.char_swaps += 1;
        outcome.trajectory.push(score);
    }

    while outcome.syllable_swaps < syllable_budget {
        let Some(score) = first_syllable_swap(ctx, texts, current) else {
            break;
        };
        current = score;
        outcome.syllable_swaps += 1;
        outcome.trajectory.push(score);
    }

    outcome
}

fn replace_range(text: &str, range: Range<usize>, with: &str) -> String {
    let mut out = String::with_capacity(text.len() - range.len() + with.len());
    out.push_str(&text[..range.start]);
    out.push_str(with);
    out.push_str(&text[range.end..]);
    out
}

/// Tries `a` in slot `i` and `b` in slot `j`. Keeps them and returns the new
/// score if it beats `current`, otherwise puts the old texts back.
fn try_pair(
    ctx: &SolveContext,
    texts: &mut [String],
    (i, a): (usize, String),
    (j, b): (usize, String),
    current: f32,
) -> Option<f32> {
    if !ctx.is_legal(&a) || !ctx.is_legal(&b) {
        return None;
    }
    let old_a = std::mem::replace(&mut texts[i], a);
    let old_b = std::mem::replace(&mut texts[j], b);
    let score = ctx.score(texts);
    if score > current {
        return Some(score);
    }
    texts[i] = old_a;
    texts[j] = old_b;
    None
}

/// Segment pairs `(i, j)`, `i < j`, neither fixed, in evaluation order.
fn movable_pairs(ctx: &SolveContext, n: usize) -> Vec<(usize, usize)> {
    (0..n)
        .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
        .filter(|&(i, j)| !ctx.is_frozen(i) && !ctx.is_frozen(j))
        .collect()
}

fn first_char_swap(ctx: &SolveContext, texts: &mut [String], current: f32) -> Option<f32> {
    for (i, j) in movable_pairs(ctx, texts.len()) {
        let (len_i, len_j) = (texts[i].len(), texts[j].len());
        for p1 in 0..len_i {
            for p2 in 0..len_j {
                let c1 = texts[i].as_bytes()[p1];
                let c2 = texts[j].as_bytes()[p2];
                if c1 == c2 {
                    continue;
                }
                let a = replace_range(&texts[i], p1..p1 + 1, &(c2 as char).to_string());
                let b = replace_range(&texts[j], p2..p2 + 1, &(c1 as char).to_string());
                if let Some(score) = try_pair(ctx, texts, (i, a), (j, b), current) {
                    return Some(score);
                }
            }
        }
    }
    None
}

fn first_syllable_swap(ctx: &SolveContext, texts: &mut [String], current: f32) -> Option<f32> {
    for (i, j) in movable_pairs(ctx, texts.len()) {
        if texts[i].len() < 2 || texts[j].len() < 2 {
            continue;
        }
        let spans_i = syllable_spans(&texts[i]);
        let spans_j = syllable_spans(&texts[j]);

        for si in &spans_i {
            for sj in &spans_j {
                if si.len() != sj.len() {
                    continue;
                }
                let from_i = texts[i][si.clone()].to_string();
                let from_j = texts[j][sj.clone()].to_string();
                if from_i == from_j {
                    continue;
                }
                let a = replace_range(&texts[i], si.clone(), &from_j);
                let b = replace_range(&texts[j], sj.clone(), &from_i);
                if let Some(score) = try_pair(ctx, texts, (i, a), (j, b), current) {
                    return Some(score);
                }
            }
        }
    }
    None
}
