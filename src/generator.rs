use crate::candidate::{Candidate, Segment};
use crate::config::Config;
use crate::error::{NameForgeError, NfResult};
use crate::filter::WordFilter;
use crate::letters::{normalize, LetterBag};
use crate::model::ModelSet;
use crate::phonotactics::PhonotacticChecker;
use crate::scorer::Scorer;
use crate::selector::{select, SelectionOptions};
use crate::solver::runner::check_feasible;
use crate::solver::{solve, Arrangement, SolveContext, SolveOptions, TemplateOutcome};
use crate::template::{
    apply_apostrophes, find_template, format_name, list_templates, relax_template,
    select_templates, NameTemplate, SegmentRole,
};
use crate::verifier::verify_segments;
use fastrand::Rng;
use itertools::Itertools;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use typed_builder::TypedBuilder;

pub const MIN_INPUT_LETTERS: usize = 3;
pub const LOW_VOWEL_RATIO: f32 = 0.15;
pub const LONG_INPUT_LETTERS: usize = 30;

#[derive(Debug, Clone, Default, TypedBuilder)]
pub struct GenerationRequest {
    #[builder(setter(into))]
    pub phrase: String,
    /// Use only this catalog template (matched case-insensitively).
    #[builder(default)]
    pub template: Option<String>,
    #[builder(default)]
    pub first: Option<String>,
    /// `Jones`, `-Jones`, `Smith-Jones` or `Jones-`.
    #[builder(default)]
    pub last: Option<String>,
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

/// Splits a `--last` value into (LAST, HYPHENATED_LAST) texts, normalised.
pub fn parse_fixed_last(raw: &str) -> (Option<String>, Option<String>) {
    let raw = raw.trim();
    if let Some(rest) = raw.strip_prefix('-') {
        return (None, non_empty(normalize(rest)));
    }
    match raw.split_once('-') {
        Some((left, right)) => (non_empty(normalize(left)), non_empty(normalize(right))),
        None => (non_empty(normalize(raw)), None),
    }
}

/// Caller-supplied segment texts, already normalised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedNames {
    pub first: Option<String>,
    pub last: Option<String>,
    pub hyphenated: Option<String>,
}

impl FixedNames {
    pub fn parse(first: Option<&str>, last: Option<&str>) -> Self {
        let (last, hyphenated) = last.map(parse_fixed_last).unwrap_or_default();
        Self {
            first: first.map(normalize).and_then(non_empty),
            last,
            hyphenated,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none() && self.last.is_none() && self.hyphenated.is_none()
    }

    fn entries(&self) -> [(SegmentRole, Option<&String>); 3] {
        [
            (SegmentRole::First, self.first.as_ref()),
            (SegmentRole::Last, self.last.as_ref()),
            (SegmentRole::HyphenatedLast, self.hyphenated.as_ref()),
        ]
    }

    /// Roles a template must have to host every fixed name.
    pub fn required_roles(&self) -> Vec<SegmentRole> {
        self.entries()
            .into_iter()
            .filter_map(|(role, text)| text.map(|_| role))
            .collect()
    }

    pub fn letters(&self) -> String {
        self.entries()
            .into_iter()
            .filter_map(|(_, text)| text.cloned())
            .collect()
    }

    /// Places each fixed name in the first segment with its role.
    pub fn assign(&self, template: &NameTemplate) -> Vec<Option<String>> {
        let mut slots = vec![None; template.segments.len()];
        for (role, text) in self.entries() {
            let Some(text) = text else { continue };
            if let Some(idx) = template.segments.iter().position(|s| s.role == role) {
                slots[idx] = Some(text.clone());
            }
        }
        slots
    }

    /// The input letters left over once the fixed names are taken out.
    pub fn pool_from(&self, bag: &LetterBag) -> NfResult<LetterBag> {
        let mut pool = *bag;
        pool.consume_all(&self.letters()).map_err(|_| {
            NameForgeError::Validation(format!(
                "fixed name letters '{}' are not all available in the input",
                self.letters()
            ))
        })?;
        Ok(pool)
    }
}

/// Turns phrases into ranked name anagrams using one resolved model set.
pub struct Generator {
    models: Arc<ModelSet>,
    config: Config,
    scorer: Scorer,
    filter: WordFilter,
    checker: PhonotacticChecker,
}

impl Generator {
    pub fn new(models: Arc<ModelSet>, config: Config) -> Self {
        Self {
            scorer: Scorer::new(config.weights.clone()),
            filter: WordFilter::new(config.search.allow_words),
            checker: PhonotacticChecker::new(config.rules),
            models,
            config,
        }
    }

    pub fn with_filter(mut self, filter: WordFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn generate(&self, request: &GenerationRequest) -> NfResult<Vec<Candidate>> {
        let normalized = normalize(&request.phrase);
        if normalized.len() < MIN_INPUT_LETTERS {
            return Err(NameForgeError::Validation(format!(
                "'{}' has {} letters; at least {} are needed",
                request.phrase,
                normalized.len(),
                MIN_INPUT_LETTERS
            )));
        }

        let bag = LetterBag::from_phrase(&normalized);
        let n_letters = bag.total();
        if (bag.vowel_count() as f32 / n_letters as f32) < LOW_VOWEL_RATIO {
            warn!("Very few vowels available; results may be limited");
        }
        if n_letters > LONG_INPUT_LETTERS {
            warn!(
                "Long input ({} letters); generation may take a moment",
                n_letters
            );
        }

        let mut rng = match self.config.search.seed {
            Some(seed) => Rng::with_seed(seed),
            None => Rng::new(),
        };

        let fixed = FixedNames::parse(request.first.as_deref(), request.last.as_deref());
        let pool = fixed.pool_from(&bag)?;

        let templates = match request.template.as_deref() {
            Some(label) => vec![self.explicit_template(label, n_letters, &fixed, &pool)?],
            None => self.catalog_templates(n_letters, &fixed, &pool, &mut rng)?,
        };
        info!(
            "Templates for {} letters: {}",
            n_letters,
            templates.iter().map(|t| t.label.as_str()).join(", ")
        );

        self.arrange(&bag, &templates, &fixed, &mut rng)
            .map_err(|e| match e {
                NameForgeError::NoArrangement { .. } => NameForgeError::NoArrangement {
                    phrase: request.phrase.clone(),
                },
                other => other,
            })
    }

    fn fits(&self, template: &NameTemplate, fixed: &FixedNames, pool: &LetterBag) -> bool {
        let ctx = self.context(template, fixed);
        check_feasible(&ctx, pool).is_ok()
    }

    fn context<'a>(&'a self, template: &'a NameTemplate, fixed: &FixedNames) -> SolveContext<'a> {
        SolveContext::new(
            template,
            &self.models,
            fixed.assign(template),
            self.checker,
            &self.filter,
            &self.scorer,
        )
    }

    fn explicit_template(
        &self,
        label: &str,
        n_letters: usize,
        fixed: &FixedNames,
        pool: &LetterBag,
    ) -> NfResult<NameTemplate> {
        let template = find_template(label).ok_or_else(|| {
            let available = list_templates()
                .iter()
                .map(|t| format!("'{}'", t.label))
                .join(", ");
            NameForgeError::Validation(format!(
                "Unknown template '{}'. Available: {}",
                label, available
            ))
        })?;

        if let Some(role) = fixed
            .required_roles()
            .into_iter()
            .find(|r| !template.has_role(*r))
        {
            return Err(NameForgeError::Validation(format!(
                "Template '{}' has no {} segment",
                template.label, role
            )));
        }

        if self.fits(&template, fixed, pool) {
            return Ok(template);
        }

        match relax_template(&template, n_letters) {
            Some(relaxed) if self.fits(&relaxed, fixed, pool) => {
                warn!(
                    "Template '{}' is designed for {}-{} letters but the input has {}; bounds relaxed",
                    template.label,
                    template.total_min(),
                    template.total_max(),
                    n_letters
                );
                Ok(relaxed)
            }
            _ => Err(NameForgeError::Validation(format!(
                "Template '{}' cannot hold {} letters ({} after fixed names)",
                template.label,
                n_letters,
                pool.total()
            ))),
        }
    }

    fn catalog_templates(
        &self,
        n_letters: usize,
        fixed: &FixedNames,
        pool: &LetterBag,
        rng: &mut Rng,
    ) -> NfResult<Vec<NameTemplate>> {
        let (viable, skipped): (Vec<_>, Vec<_>) =
            select_templates(n_letters, &fixed.required_roles(), rng)
                .into_iter()
                .partition(|t| self.fits(t, fixed, pool));

        for t in &skipped {
            debug!("Template '{}' cannot host the fixed names; skipped", t.label);
        }
        if viable.is_empty() {
            return Err(NameForgeError::Validation(format!(
                "No template can hold the fixed names with {} remaining letters",
                pool.total()
            )));
        }
        Ok(viable)
    }

    /// Solves every template in parallel and selects the final list.
    ///
    /// `bag` is the whole input; fixed names are taken out of it here. Each
    /// template runs on its own generator seeded from `rng` in template
    /// order, and results are gathered in that same order, so the outcome
    /// does not depend on thread scheduling.
    pub fn arrange(
        &self,
        bag: &LetterBag,
        templates: &[NameTemplate],
        fixed: &FixedNames,
        rng: &mut Rng,
    ) -> NfResult<Vec<Candidate>> {
        let pool = fixed.pool_from(bag)?;
        let opts = SolveOptions::from_search(&self.config.search, bag.total());

        let contexts: Vec<SolveContext> =
            templates.iter().map(|t| self.context(t, fixed)).collect();
        let seeds: Vec<u64> = contexts.iter().map(|_| rng.u64(..)).collect();

        let results: Vec<NfResult<TemplateOutcome>> = contexts
            .par_iter()
            .zip(seeds.par_iter())
            .map(|(ctx, &seed)| {
                let mut local = Rng::with_seed(seed);
                solve(ctx, pool, &opts, &mut local)
            })
            .collect();

        let mut candidates = Vec::new();
        for (ctx, result) in contexts.iter().zip(results) {
            let outcome = match result {
                Ok(outcome) => outcome,
                Err(NameForgeError::TemplateInfeasible { label }) => {
                    debug!("Template '{}' produced nothing; skipped", label);
                    continue;
                }
                Err(e) => {
                    error!("Template '{}' aborted: {}", ctx.template.label, e);
                    return Err(e);
                }
            };
            let frozen = ctx.frozen_mask();
            for arrangement in outcome.arrangements {
                candidates.push(finish(ctx, bag, &frozen, arrangement, rng)?);
            }
        }

        if candidates.is_empty() {
            return Err(NameForgeError::NoArrangement {
                phrase: bag.as_sorted_string(),
            });
        }

        let selection = SelectionOptions::builder()
            .count(self.config.search.count)
            .similarity_threshold(self.config.search.similarity_threshold)
            .overlap_penalty(self.config.weights.penalty_segment_overlap)
            .build();
        let chosen = select(candidates, &selection);
        info!(
            "Selected {} names from {} letters",
            chosen.len(),
            bag.total()
        );
        Ok(chosen)
    }
}

/// Formats and verifies one arrangement. Nothing leaves here unverified.
fn finish(
    ctx: &SolveContext,
    bag: &LetterBag,
    frozen: &[bool],
    arrangement: Arrangement,
    rng: &mut Rng,
) -> NfResult<Candidate> {
    let display = apply_apostrophes(&arrangement.segments, ctx.template, frozen, rng);
    verify_segments(bag, &display)?;

    let name = format_name(&display, ctx.template);
    let segments = display
        .into_iter()
        .zip(ctx.template.segments.iter())
        .zip(frozen)
        .map(|((text, spec), &fixed)| Segment {
            text,
            spec: *spec,
            fixed,
        })
        .collect();

    Ok(Candidate {
        template: ctx.template.label.clone(),
        segments,
        name,
        score: arrangement.score,
        details: arrangement.details,
        verified: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fixed_last_forms() {
        assert_eq!(parse_fixed_last("Jones"), (Some("jones".into()), None));
        assert_eq!(parse_fixed_last("-Jones"), (None, Some("jones".into())));
        assert_eq!(
            parse_fixed_last("Smith-Jones"),
            (Some("smith".into()), Some("jones".into()))
        );
        assert_eq!(parse_fixed_last("Jones-"), (Some("jones".into()), None));
    }

    #[test]
    fn test_fixed_names_assign_first_matching_role() {
        let template = find_template("First M. Last-Last").unwrap();
        let fixed = FixedNames::parse(Some("Ann"), Some("-Lee"));
        let slots = fixed.assign(&template);
        assert_eq!(slots[0].as_deref(), Some("ann"));
        assert_eq!(slots[1], None);
        assert_eq!(slots[3].as_deref(), Some("lee"));
        assert_eq!(
            fixed.required_roles(),
            vec![SegmentRole::First, SegmentRole::HyphenatedLast]
        );
    }

    #[test]
    fn test_pool_from_rejects_missing_letters() {
        let bag = LetterBag::from_phrase("hello world");
        let fixed = FixedNames::parse(Some("zed"), None);
        assert!(matches!(
            fixed.pool_from(&bag),
            Err(NameForgeError::Validation(_))
        ));

        let ok = FixedNames::parse(Some("Lew"), None);
        assert_eq!(ok.pool_from(&bag).unwrap().total(), 7);
    }
}
