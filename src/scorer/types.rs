/// Weighted sub-scores of one candidate. Higher is better throughout;
/// penalties are stored as negative contributions.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ScoreDetails {
    // Top-line
    pub total: f32,

    // Likelihood (length-normalised model log-likelihood, summed over segments)
    pub likelihood: f32,

    // Shape
    pub balance: f32,
    pub vowel: f32,

    // Variety
    pub diversity: f32,
    pub repetition: f32,

    // Boundary flow (averaged over adjacent multi-letter pairs)
    pub boundary: f32,

    // === RAW COUNTERS ===
    pub vowel_ratio: f32,
    pub length_variance: f32,
    pub distinct_starts: usize,
    pub repeated_bigrams: usize,
    pub boundaries: usize,
}
