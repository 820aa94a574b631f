pub mod construct;
pub mod refine;
pub mod runner;

pub use self::refine::RefineOutcome;
pub use self::runner::{solve, Arrangement, AttemptStats, SolveOptions, TemplateOutcome};

use crate::filter::WordFilter;
use crate::model::{ModelSet, SequenceModel};
use crate::phonotactics::PhonotacticChecker;
use crate::scorer::{ScoreDetails, Scorer};
use crate::template::NameTemplate;

/// Everything one template's attempts share. Read-only.
pub struct SolveContext<'a> {
    pub template: &'a NameTemplate,
    /// One model per segment.
    pub models: Vec<&'a SequenceModel>,
    /// Caller-supplied segment texts; `None` for segments to generate.
    pub fixed: Vec<Option<String>>,
    pub checker: PhonotacticChecker,
    pub filter: &'a WordFilter,
    pub scorer: &'a Scorer,
}

impl<'a> SolveContext<'a> {
    pub fn new(
        template: &'a NameTemplate,
        models: &'a ModelSet,
        fixed: Vec<Option<String>>,
        checker: PhonotacticChecker,
        filter: &'a WordFilter,
        scorer: &'a Scorer,
    ) -> Self {
        let mut fixed = fixed;
        fixed.resize(template.segments.len(), None);
        Self {
            template,
            models: models.models_for(template),
            fixed,
            checker,
            filter,
            scorer,
        }
    }

    pub fn is_frozen(&self, idx: usize) -> bool {
        self.fixed.get(idx).is_some_and(Option::is_some)
    }

    pub fn frozen_mask(&self) -> Vec<bool> {
        (0..self.template.segments.len())
            .map(|i| self.is_frozen(i))
            .collect()
    }

    /// Letters taken by fixed segments.
    pub fn fixed_letters(&self) -> usize {
        self.fixed.iter().flatten().map(String::len).sum()
    }

    pub fn score<S: AsRef<str>>(&self, texts: &[S]) -> f32 {
        self.scorer.score(texts, &self.models)
    }

    pub fn score_details<S: AsRef<str>>(&self, texts: &[S]) -> ScoreDetails {
        self.scorer.score_details(texts, &self.models)
    }

    /// Pronounceable and not a filtered word.
    pub fn is_legal(&self, text: &str) -> bool {
        self.checker.is_valid_segment(text) && !self.filter.is_rejected(text)
    }
}
