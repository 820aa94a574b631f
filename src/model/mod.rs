pub mod corpus;
pub mod repository;

pub use self::repository::{
    Dataset, DirectoryRepository, EmbeddedRepository, ModelRepository, ModelSet,
};

use fastrand::Rng;
use serde::{Deserialize, Serialize};

/// Context padding before the first character of a word.
pub const START: u8 = b'^';
/// Marks the end of a word.
pub const END: u8 = b'$';

/// Number of characters the model conditions on.
pub const ORDER: usize = 2;

/// Predictable symbols: `a..z` and the end marker.
const OUTCOMES: usize = 27;
/// Context symbols: the outcomes plus start padding.
const CONTEXTS: usize = 28;

const END_IDX: usize = 26;
const START_IDX: usize = 27;

const LAMBDA_TRI: f64 = 0.7;
const LAMBDA_BI: f64 = 0.2;
const LAMBDA_UNI: f64 = 0.1;

/// Score given to an empty segment.
pub const EMPTY_SEGMENT_SCORE: f32 = -100.0;

#[inline(always)]
fn context_index(c: u8) -> usize {
    match c {
        START => START_IDX,
        END => END_IDX,
        b'a'..=b'z' => (c - b'a') as usize,
        b'A'..=b'Z' => (c - b'A') as usize,
        _ => START_IDX,
    }
}

#[inline(always)]
fn outcome_index(c: u8) -> Option<usize> {
    match c {
        END => Some(END_IDX),
        b'a'..=b'z' => Some((c - b'a') as usize),
        b'A'..=b'Z' => Some((c - b'A') as usize),
        _ => None,
    }
}

/// Character-level order-2 model trained on a name corpus.
///
/// Only raw counts are stored. Probabilities are interpolated from the
/// trigram, bigram and unigram counts at query time with add-one smoothing,
/// so every letter keeps a non-zero probability in every context.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SequenceModel {
    trigrams: Vec<u32>,
    trigram_totals: Vec<u32>,
    bigrams: Vec<u32>,
    bigram_totals: Vec<u32>,
    unigrams: Vec<u32>,
    unigram_total: u32,
    names_seen: usize,
}

impl Default for SequenceModel {
    fn default() -> Self {
        Self {
            trigrams: vec![0; CONTEXTS * CONTEXTS * OUTCOMES],
            trigram_totals: vec![0; CONTEXTS * CONTEXTS],
            bigrams: vec![0; CONTEXTS * OUTCOMES],
            bigram_totals: vec![0; CONTEXTS],
            unigrams: vec![0; OUTCOMES],
            unigram_total: 0,
            names_seen: 0,
        }
    }
}

impl SequenceModel {
    /// Trains a model from plain names. Entries with non-letter characters are skipped.
    pub fn train<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut model = Self::default();
        for name in names {
            model.add_name(name.as_ref(), 1);
        }
        model
    }

    /// Trains from `(name, weight)` pairs; each name counts `weight` times.
    pub fn train_weighted<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, u32)>,
    {
        let mut model = Self::default();
        for (name, weight) in entries {
            model.add_name(name, weight);
        }
        model
    }

    fn add_name(&mut self, name: &str, weight: u32) {
        let name = name.trim();
        if name.is_empty() || weight == 0 || !name.bytes().all(|b| b.is_ascii_alphabetic()) {
            return;
        }

        let mut c1 = START_IDX;
        let mut c2 = START_IDX;
        let symbols = name
            .bytes()
            .map(|b| b.to_ascii_lowercase())
            .chain(std::iter::once(END));

        for sym in symbols {
            let Some(next) = outcome_index(sym) else {
                continue;
            };
            let ctx = c1 * CONTEXTS + c2;
            self.trigrams[ctx * OUTCOMES + next] += weight;
            self.trigram_totals[ctx] += weight;
            self.bigrams[c2 * OUTCOMES + next] += weight;
            self.bigram_totals[c2] += weight;
            if next != END_IDX {
                self.unigrams[next] += weight;
                self.unigram_total += weight;
            }
            c1 = c2;
            c2 = context_index(sym);
        }
        self.names_seen += weight as usize;
    }

    /// Number of (weighted) names the model was trained on.
    pub fn names_seen(&self) -> usize {
        self.names_seen
    }

    pub fn is_empty(&self) -> bool {
        self.names_seen == 0
    }

    #[inline(always)]
    fn prob(&self, c1: usize, c2: usize, next: usize) -> f64 {
        let ctx = c1 * CONTEXTS + c2;
        let outcomes = OUTCOMES as f64;

        let p_uni = if next == END_IDX {
            1.0 / (self.unigram_total as f64 + outcomes)
        } else {
            (self.unigrams[next] as f64 + 1.0) / (self.unigram_total as f64 + outcomes)
        };
        let p_bi = (self.bigrams[c2 * OUTCOMES + next] as f64 + 1.0)
            / (self.bigram_totals[c2] as f64 + outcomes);

        // Unseen trigram contexts hand their weight to the lower orders.
        if self.trigram_totals[ctx] == 0 {
            let scale = LAMBDA_BI + LAMBDA_UNI;
            return (LAMBDA_BI / scale) * p_bi + (LAMBDA_UNI / scale) * p_uni;
        }
        let p_tri = (self.trigrams[ctx * OUTCOMES + next] as f64 + 1.0)
            / (self.trigram_totals[ctx] as f64 + outcomes);

        LAMBDA_TRI * p_tri + LAMBDA_BI * p_bi + LAMBDA_UNI * p_uni
    }

    /// Resolves the last two characters of `context`, padding with [`START`].
    #[inline(always)]
    fn context_pair(context: &[u8]) -> (usize, usize) {
        match context {
            [] => (START_IDX, START_IDX),
            [c] => (START_IDX, context_index(*c)),
            [.., a, b] => (context_index(*a), context_index(*b)),
        }
    }

    /// Log-probability of `next` following `context`. `next` may be [`END`].
    pub fn score_continuation(&self, context: &[u8], next: u8) -> f32 {
        let Some(n) = outcome_index(next) else {
            return f32::NEG_INFINITY;
        };
        let (c1, c2) = Self::context_pair(context);
        self.prob(c1, c2, n).ln() as f32
    }

    /// Log-likelihood of a whole word, including the end marker.
    pub fn score_segment(&self, segment: &str) -> f32 {
        if segment.is_empty() {
            return EMPTY_SEGMENT_SCORE;
        }
        let mut c1 = START_IDX;
        let mut c2 = START_IDX;
        let mut total = 0.0f64;
        for sym in segment.bytes().chain(std::iter::once(END)) {
            let Some(next) = outcome_index(sym) else {
                continue;
            };
            total += self.prob(c1, c2, next).ln();
            c1 = c2;
            c2 = context_index(sym);
        }
        total as f32
    }

    /// Log-probabilities for `allowed`, best first; ties resolve alphabetically.
    pub fn rank_next(&self, context: &[u8], allowed: &[u8]) -> Vec<(u8, f32)> {
        let mut ranked: Vec<(u8, f32)> = allowed
            .iter()
            .map(|&c| (c, self.score_continuation(context, c)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked
    }

    /// Draws one of `allowed` with probability proportional to
    /// `exp(log_p / temperature)`. Temperatures at or near zero pick the
    /// arg-max (first in `allowed` order on ties).
    pub fn sample_next(
        &self,
        context: &[u8],
        allowed: &[u8],
        temperature: f32,
        rng: &mut Rng,
    ) -> Option<u8> {
        if allowed.is_empty() {
            return None;
        }
        let scores: Vec<f32> = allowed
            .iter()
            .map(|&c| self.score_continuation(context, c))
            .collect();

        let max_lp = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        if temperature <= f32::EPSILON {
            let idx = scores.iter().position(|&s| s == max_lp).unwrap_or(0);
            return Some(allowed[idx]);
        }

        let weights: Vec<f64> = scores
            .iter()
            .map(|&lp| (((lp - max_lp) / temperature) as f64).exp())
            .collect();
        let total: f64 = weights.iter().sum();

        let mut r = rng.f64() * total;
        for (i, w) in weights.iter().enumerate() {
            if r < *w {
                return Some(allowed[i]);
            }
            r -= w;
        }
        allowed.last().copied()
    }
}
