use crate::model::SequenceModel;
use crate::phonotactics::{coda, onset};

/// How one segment runs into the next, read as if they were one word.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct BoundaryFlow {
    /// Log-probability of the first two letters of the right-hand segment
    /// given the last two of the left-hand segment.
    pub likelihood: f32,
    /// Coda of the left segment plus onset of the right segment.
    pub consonants: usize,
}

impl BoundaryFlow {
    /// Likelihood minus the pile-up penalty for consonants beyond `max_consonants`.
    pub fn score(&self, max_consonants: usize, penalty_per_consonant: f32) -> f32 {
        let excess = self.consonants.saturating_sub(max_consonants);
        self.likelihood - penalty_per_consonant * excess as f32
    }
}

pub fn analyze_boundary(left: &str, right: &str, model: &SequenceModel) -> BoundaryFlow {
    let l = left.as_bytes();
    let r = right.as_bytes();

    let mut context: Vec<u8> = l[l.len().saturating_sub(2)..].to_vec();
    let mut likelihood = 0.0;
    for &c in r.iter().take(2) {
        likelihood += model.score_continuation(&context, c);
        context.push(c);
        if context.len() > 2 {
            context.remove(0);
        }
    }

    BoundaryFlow {
        likelihood,
        consonants: coda(l).len() + onset(r).len(),
    }
}
