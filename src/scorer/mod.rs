pub mod boundary;
pub mod types;

pub use self::boundary::{analyze_boundary, BoundaryFlow};
pub use self::types::ScoreDetails;
use crate::config::ScoringWeights;
use crate::letters::is_vowel;
use crate::model::SequenceModel;
use itertools::Itertools;

/// Composite quality score for a candidate. Pure: the same segments and
/// models always give the same score.
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    pub weights: ScoringWeights,
}

impl Scorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    #[inline]
    pub fn score<S: AsRef<str>>(&self, segments: &[S], models: &[&SequenceModel]) -> f32 {
        self.score_details(segments, models).total
    }

    /// `models[i]` scores `segments[i]`.
    pub fn score_details<S: AsRef<str>>(
        &self,
        segments: &[S],
        models: &[&SequenceModel],
    ) -> ScoreDetails {
        let w = &self.weights;
        let mut d = ScoreDetails::default();

        // 1. Likelihood
        let raw_likelihood: f32 = segments
            .iter()
            .zip(models.iter())
            .map(|(seg, model)| {
                let seg = seg.as_ref();
                model.score_segment(seg) / seg.len().max(1) as f32
            })
            .sum();
        d.likelihood = w.weight_markov * raw_likelihood;

        // 2. Length balance over non-initial segments
        let lengths: Vec<f32> = segments
            .iter()
            .map(|s| s.as_ref().len())
            .filter(|&l| l > 1)
            .map(|l| l as f32)
            .collect();
        if lengths.len() > 1 {
            let mean = lengths.iter().sum::<f32>() / lengths.len() as f32;
            d.length_variance =
                lengths.iter().map(|l| (l - mean).powi(2)).sum::<f32>() / lengths.len() as f32;
            d.balance = -w.weight_balance * d.length_variance;
        }

        // 3. Vowel ratio
        let total_letters: usize = segments.iter().map(|s| s.as_ref().len()).sum();
        if total_letters > 0 {
            let vowels = segments
                .iter()
                .flat_map(|s| s.as_ref().bytes())
                .filter(|&c| is_vowel(c))
                .count();
            d.vowel_ratio = vowels as f32 / total_letters as f32;
            d.vowel = -w.weight_vowel * (d.vowel_ratio - w.target_vowel_ratio).abs();
        } else {
            d.vowel = -w.weight_vowel;
        }

        // 4. Starting-letter diversity
        d.distinct_starts = segments
            .iter()
            .filter_map(|s| s.as_ref().bytes().next())
            .map(|c| c.to_ascii_lowercase())
            .unique()
            .count();
        d.diversity = w.bonus_diversity * d.distinct_starts as f32;

        // 5. Bigrams shared by two or more segments
        d.repeated_bigrams = segments
            .iter()
            .map(|s| s.as_ref().as_bytes())
            .filter(|b| b.len() >= 2)
            .flat_map(|b| b.iter().tuple_windows::<(_, _)>().unique())
            .counts()
            .values()
            .filter(|&&n| n >= 2)
            .count();
        d.repetition = -w.penalty_repetition * d.repeated_bigrams as f32;

        // 6. Boundary flow between adjacent multi-letter segments
        let mut flow_sum = 0.0;
        for i in 0..segments.len().saturating_sub(1) {
            let (left, right) = (segments[i].as_ref(), segments[i + 1].as_ref());
            if left.len() < 2 || right.len() < 2 {
                continue;
            }
            let Some(model) = models.get(i + 1) else {
                continue;
            };
            let flow = analyze_boundary(left, right, model);
            flow_sum += flow.score(w.max_boundary_consonants, w.penalty_boundary_consonant);
            d.boundaries += 1;
        }
        if d.boundaries > 0 {
            d.boundary = w.weight_boundary * flow_sum / d.boundaries as f32;
        }

        d.total = d.likelihood + d.balance + d.vowel + d.diversity + d.repetition + d.boundary;
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> SequenceModel {
        SequenceModel::train(["anna", "bella", "carla", "dora", "emma", "lola", "nora"])
    }

    #[test]
    fn test_components_add_up() {
        let m = model();
        let scorer = Scorer::default();
        let d = scorer.score_details(&["nora", "bella"], &[&m, &m]);
        let sum = d.likelihood + d.balance + d.vowel + d.diversity + d.repetition + d.boundary;
        assert!((d.total - sum).abs() < 1e-5);
        assert_eq!(d.distinct_starts, 2);
        assert_eq!(d.boundaries, 1);
    }

    #[test]
    fn test_repeated_bigrams_counted_once_per_segment() {
        let m = model();
        let scorer = Scorer::default();
        let d = scorer.score_details(&["lala", "lalo", "x"], &[&m, &m, &m]);
        // "la" and "al" appear in both long segments.
        assert_eq!(d.repeated_bigrams, 2);
        assert_eq!(d.boundaries, 1);
    }

    #[test]
    fn test_boundary_pileup_penalty() {
        let flow = BoundaryFlow {
            likelihood: -2.0,
            consonants: 5,
        };
        assert!((flow.score(3, 3.0) - (-8.0)).abs() < 1e-6);
    }
}
