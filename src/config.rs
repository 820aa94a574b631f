use crate::error::{NameForgeError, NfResult};
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[command(flatten)]
    pub search: SearchParams,
    #[command(flatten)]
    pub weights: ScoringWeights,
    #[command(flatten)]
    pub rules: PhonotacticRules,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Number of names to return
    #[arg(short = 'n', long, default_value_t = 15)]
    pub count: usize,
    #[arg(long, default_value_t = 1.2)]
    pub temp_min: f32,
    #[arg(long, default_value_t = 2.0)]
    pub temp_max: f32,
    /// Fixed sampling temperature (overrides --temp-min/--temp-max)
    #[arg(long)]
    pub temperature: Option<f32>,
    /// Construction attempts per template (default scales with input length)
    #[arg(long)]
    pub attempts: Option<usize>,
    #[arg(long, default_value_t = 200)]
    pub refine_iterations: usize,
    #[arg(long, default_value_t = 100)]
    pub syllable_iterations: usize,
    #[arg(long, default_value_t = 0.8)]
    pub similarity_threshold: f32,
    /// Keep segments that spell common English words
    #[arg(long, default_value_t = false)]
    pub allow_words: bool,
    #[arg(short = 'S', long)]
    pub seed: Option<u64>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            count: 15,
            temp_min: 1.2,
            temp_max: 2.0,
            temperature: None,
            attempts: None,
            refine_iterations: 200,
            syllable_iterations: 100,
            similarity_threshold: 0.8,
            allow_words: false,
            seed: None,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    // === LIKELIHOOD ===
    #[arg(long, default_value_t = 1.0)]
    pub weight_markov: f32,

    // === SHAPE ===
    #[arg(long, default_value_t = 0.1)]
    pub weight_balance: f32,
    #[arg(long, default_value_t = 10.0)]
    pub weight_vowel: f32,
    #[arg(long, default_value_t = 0.4)]
    pub target_vowel_ratio: f32,

    // === VARIETY ===
    #[arg(long, default_value_t = 0.2)]
    pub bonus_diversity: f32,
    #[arg(long, default_value_t = 0.3)]
    pub penalty_repetition: f32,

    // === BOUNDARY FLOW ===
    #[arg(long, default_value_t = 0.15)]
    pub weight_boundary: f32,
    #[arg(long, default_value_t = 3.0)]
    pub penalty_boundary_consonant: f32,
    #[arg(long, default_value_t = 3)]
    pub max_boundary_consonants: usize,

    // === SELECTION ===
    #[arg(long, default_value_t = 2.0)]
    pub penalty_segment_overlap: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            weight_markov: 1.0,
            weight_balance: 0.1,
            weight_vowel: 10.0,
            target_vowel_ratio: 0.4,
            bonus_diversity: 0.2,
            penalty_repetition: 0.3,
            weight_boundary: 0.15,
            penalty_boundary_consonant: 3.0,
            max_boundary_consonants: 3,
            penalty_segment_overlap: 2.0,
        }
    }
}

#[derive(Args, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PhonotacticRules {
    #[arg(long, default_value_t = 3)]
    pub max_consonant_run: usize,
    #[arg(long, default_value_t = 2)]
    pub max_vowel_run: usize,
}

impl Default for PhonotacticRules {
    fn default() -> Self {
        Self {
            max_consonant_run: 3,
            max_vowel_run: 2,
        }
    }
}

impl Config {
    pub fn validate(&self) -> NfResult<()> {
        let s = &self.search;
        if s.count == 0 {
            return Err(NameForgeError::Config("--count must be at least 1".into()));
        }
        if let Some(t) = s.temperature {
            if t <= 0.0 || !t.is_finite() {
                return Err(NameForgeError::Config(format!(
                    "--temperature must be positive, got {}",
                    t
                )));
            }
        }
        if s.temp_min <= 0.0 || !s.temp_min.is_finite() {
            return Err(NameForgeError::Config(format!(
                "--temp-min must be positive, got {}",
                s.temp_min
            )));
        }
        if s.temp_max < s.temp_min || !s.temp_max.is_finite() {
            return Err(NameForgeError::Config(format!(
                "--temp-max ({}) must be >= --temp-min ({})",
                s.temp_max, s.temp_min
            )));
        }
        if !(0.0..=1.0).contains(&s.similarity_threshold) {
            return Err(NameForgeError::Config(format!(
                "--similarity-threshold must lie in [0, 1], got {}",
                s.similarity_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.weights.target_vowel_ratio) {
            return Err(NameForgeError::Config(format!(
                "--target-vowel-ratio must lie in [0, 1], got {}",
                self.weights.target_vowel_ratio
            )));
        }
        if self.rules.max_consonant_run == 0 || self.rules.max_vowel_run == 0 {
            return Err(NameForgeError::Config(
                "phonotactic run limits must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl SearchParams {
    /// (min, max) sampling temperature; a fixed temperature collapses both.
    pub fn temperature_range(&self) -> (f32, f32) {
        match self.temperature {
            Some(t) => (t, t),
            None => (self.temp_min, self.temp_max),
        }
    }

    /// Attempt budget per template. Longer inputs get more attempts.
    pub fn attempts_for(&self, n_letters: usize) -> usize {
        if let Some(a) = self.attempts {
            return a.max(1);
        }
        if n_letters > 30 {
            1200
        } else if n_letters > 20 {
            800
        } else {
            500
        }
    }
}

impl ScoringWeights {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> NfResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn merge_from_cli(&mut self, cli_weights: &ScoringWeights, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($field:ident, $arg_name:expr) => {
                if matches.value_source($arg_name) == Some(ValueSource::CommandLine) {
                    self.$field = cli_weights.$field.clone();
                }
            };
        }

        update_if_present!(weight_markov, "weight_markov");
        update_if_present!(weight_balance, "weight_balance");
        update_if_present!(weight_vowel, "weight_vowel");
        update_if_present!(target_vowel_ratio, "target_vowel_ratio");
        update_if_present!(bonus_diversity, "bonus_diversity");
        update_if_present!(penalty_repetition, "penalty_repetition");
        update_if_present!(weight_boundary, "weight_boundary");
        update_if_present!(penalty_boundary_consonant, "penalty_boundary_consonant");
        update_if_present!(max_boundary_consonants, "max_boundary_consonants");
        update_if_present!(penalty_segment_overlap, "penalty_segment_overlap");
    }
}
