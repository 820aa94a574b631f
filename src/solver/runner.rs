use super::construct::construct;
use super::refine::{refine, RefineOutcome};
use super::SolveContext;
use crate::config::SearchParams;
use crate::error::{NameForgeError, NfResult};
use crate::letters::LetterBag;
use crate::scorer::ScoreDetails;
use fastrand::Rng;
use std::collections::HashSet;
use tracing::debug;
use typed_builder::TypedBuilder;

#[derive(Debug, Clone, TypedBuilder)]
pub struct SolveOptions {
    #[builder(default = 500)]
    pub attempts: usize,
    #[builder(default = 1.2)]
    pub temp_min: f32,
    #[builder(default = 2.0)]
    pub temp_max: f32,
    #[builder(default = 200)]
    pub refine_iterations: usize,
    #[builder(default = 100)]
    pub syllable_iterations: usize,
}

impl SolveOptions {
    pub fn from_search(search: &SearchParams, n_letters: usize) -> Self {
        let (temp_min, temp_max) = search.temperature_range();
        Self::builder()
            .attempts(search.attempts_for(n_letters))
            .temp_min(temp_min)
            .temp_max(temp_max)
            .refine_iterations(search.refine_iterations)
            .syllable_iterations(search.syllable_iterations)
            .build()
    }

    /// Linear ramp from `temp_min` on the first attempt to `temp_max` on the last.
    pub fn temperature_at(&self, attempt: usize) -> f32 {
        let span = self.attempts.saturating_sub(1).max(1) as f32;
        let progress = (attempt as f32 / span).min(1.0);
        self.temp_min + (self.temp_max - self.temp_min) * progress
    }
}

/// A constructed, refined and scored set of segment texts.
#[derive(Debug, Clone)]
pub struct Arrangement {
    pub segments: Vec<String>,
    pub score: f32,
    pub details: ScoreDetails,
    pub refinement: RefineOutcome,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AttemptStats {
    pub attempts: usize,
    pub successes: usize,
    pub construction_failures: usize,
    pub dictionary_rejections: usize,
    pub duplicates: usize,
}

#[derive(Debug, Clone)]
pub struct TemplateOutcome {
    pub label: String,
    /// Distinct arrangements, best first.
    pub arrangements: Vec<Arrangement>,
    pub stats: AttemptStats,
}

/// Checks that `pool` plus the fixed segments fit the template's bounds.
pub fn check_feasible(ctx: &SolveContext, pool: &LetterBag) -> NfResult<()> {
    let specs = &ctx.template.segments;
    let infeasible = || NameForgeError::TemplateInfeasible {
        label: ctx.template.label.clone(),
    };

    let mut free_min = 0;
    let mut free_max = 0;
    for (idx, spec) in specs.iter().enumerate() {
        match &ctx.fixed[idx] {
            Some(text) if !spec.admits(text.len()) => return Err(infeasible()),
            Some(_) => {}
            None => {
                free_min += spec.min_len;
                free_max += spec.max_len;
            }
        }
    }

    let n = pool.total();
    if n < free_min || n > free_max {
        return Err(infeasible());
    }
    if !ctx.template.accepts(n + ctx.fixed_letters()) {
        return Err(infeasible());
    }
    Ok(())
}

/// Runs the attempt budget for one template. Recoverable attempt failures
/// are counted and retried; anything else aborts the template.
pub fn solve(
    ctx: &SolveContext,
    pool: LetterBag,
    opts: &SolveOptions,
    rng: &mut Rng,
) -> NfResult<TemplateOutcome> {
    check_feasible(ctx, &pool)?;

    let mut stats = AttemptStats::default();
    let mut constructed: HashSet<Vec<String>> = HashSet::new();
    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut arrangements = Vec::new();

    for attempt in 0..opts.attempts {
        stats.attempts += 1;
        let temperature = opts.temperature_at(attempt);

        let mut texts = match construct(ctx, pool, temperature, rng) {
            Ok(texts) => texts,
            Err(NameForgeError::DictionaryRejection { .. }) => {
                stats.dictionary_rejections += 1;
                continue;
            }
            Err(e) if e.is_retryable() => {
                stats.construction_failures += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        // Refinement is deterministic, so a repeated construction repeats its result.
        if !constructed.insert(texts.clone()) {
            stats.duplicates += 1;
            continue;
        }

        let refinement = refine(
            ctx,
            &mut texts,
            opts.refine_iterations,
            opts.syllable_iterations,
        );
        if !seen.insert(texts.clone()) {
            stats.duplicates += 1;
            continue;
        }

        stats.successes += 1;
        let details = ctx.score_details(&texts);
        arrangements.push(Arrangement {
            segments: texts,
            score: details.total,
            details,
            refinement,
        });
    }

    debug!(
        "Template '{}': {} attempts, {} ok, {} failed, {} rejected, {} duplicate",
        ctx.template.label,
        stats.attempts,
        stats.successes,
        stats.construction_failures,
        stats.dictionary_rejections,
        stats.duplicates
    );

    if arrangements.is_empty() {
        return Err(NameForgeError::TemplateInfeasible {
            label: ctx.template.label.clone(),
        });
    }

    arrangements.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(TemplateOutcome {
        label: ctx.template.label.clone(),
        arrangements,
        stats,
    })
}
