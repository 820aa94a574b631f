use nameforge::error::NameForgeError;
use nameforge::filter::WordFilter;
use nameforge::letters::LetterBag;
use nameforge::model::{Dataset, EmbeddedRepository, ModelRepository, ModelSet};
use nameforge::phonotactics::PhonotacticChecker;
use nameforge::scorer::Scorer;
use nameforge::solver::construct::construct;
use nameforge::solver::refine::refine;
use nameforge::solver::runner::check_feasible;
use nameforge::solver::{solve, SolveContext, SolveOptions};
use nameforge::template::{find_template, NameTemplate};
use proptest::prelude::*;
use std::sync::Arc;

struct Fixture {
    models: Arc<ModelSet>,
    filter: WordFilter,
    scorer: Scorer,
}

impl Fixture {
    fn new() -> Self {
        Self {
            models: EmbeddedRepository::new().resolve(Dataset::Both).unwrap(),
            filter: WordFilter::new(false),
            scorer: Scorer::default(),
        }
    }

    fn ctx<'a>(&'a self, template: &'a NameTemplate, fixed: Vec<Option<String>>) -> SolveContext<'a> {
        SolveContext::new(
            template,
            &self.models,
            fixed,
            PhonotacticChecker::default(),
            &self.filter,
            &self.scorer,
        )
    }
}

fn joined(texts: &[String]) -> LetterBag {
    LetterBag::from_phrase(&texts.concat())
}

#[test]
fn test_construction_uses_every_letter_once() {
    let fx = Fixture::new();
    let template = find_template("First Last").unwrap();
    let ctx = fx.ctx(&template, vec![]);
    let pool = LetterBag::from_phrase("Hello World");

    let mut successes = 0;
    for seed in 0..200 {
        let mut rng = fastrand::Rng::with_seed(seed);
        let Ok(texts) = construct(&ctx, pool, 1.5, &mut rng) else {
            continue;
        };
        successes += 1;
        assert!(joined(&texts).same_letters(&pool), "{:?}", texts);
        for (text, spec) in texts.iter().zip(&template.segments) {
            assert!(spec.admits(text.len()), "{} outside {:?}", text, spec);
            assert!(ctx.is_legal(text), "{} is not legal", text);
        }
    }
    assert!(successes > 0);
}

#[test]
fn test_failed_attempts_are_recoverable() {
    let fx = Fixture::new();
    let template = find_template("First Last").unwrap();
    let ctx = fx.ctx(&template, vec![]);
    // Six consonants and one vowel: most attempts cannot close a segment.
    let pool = LetterBag::from_phrase("bcdfgha");
    for seed in 0..50 {
        let mut rng = fastrand::Rng::with_seed(seed);
        if let Err(e) = construct(&ctx, pool, 1.5, &mut rng) {
            assert!(e.is_retryable(), "{}", e);
        }
    }
}

#[test]
fn test_infeasible_template_rejected_before_construction() {
    let fx = Fixture::new();
    let template = find_template("First M. Last").unwrap();
    let ctx = fx.ctx(&template, vec![]);
    let pool = LetterBag::from_phrase("abc");

    assert!(matches!(
        check_feasible(&ctx, &pool),
        Err(NameForgeError::TemplateInfeasible { .. })
    ));
    let opts = SolveOptions::builder().attempts(5).build();
    let mut rng = fastrand::Rng::with_seed(1);
    assert!(matches!(
        solve(&ctx, pool, &opts, &mut rng),
        Err(NameForgeError::TemplateInfeasible { .. })
    ));
}

#[test]
fn test_fixed_segment_is_kept_verbatim() {
    let fx = Fixture::new();
    let template = find_template("First Middle Last").unwrap();
    let ctx = fx.ctx(&template, vec![Some("anna".to_string())]);
    let full = LetterBag::from_phrase("Anna Maria Lopez");
    let mut pool = full;
    pool.consume_all("anna").unwrap();

    let opts = SolveOptions::builder().attempts(200).build();
    let mut rng = fastrand::Rng::with_seed(21);
    let outcome = solve(&ctx, pool, &opts, &mut rng).unwrap();

    assert!(!outcome.arrangements.is_empty());
    for arrangement in &outcome.arrangements {
        assert_eq!(arrangement.segments[0], "anna");
        assert!(joined(&arrangement.segments).same_letters(&full));
    }
}

#[test]
fn test_solve_sorts_best_first_and_counts_attempts() {
    let fx = Fixture::new();
    let template = find_template("First Last").unwrap();
    let ctx = fx.ctx(&template, vec![]);
    let pool = LetterBag::from_phrase("Split Loyalty");

    let opts = SolveOptions::builder().attempts(150).build();
    let mut rng = fastrand::Rng::with_seed(4);
    let outcome = solve(&ctx, pool, &opts, &mut rng).unwrap();

    let s = outcome.stats;
    assert_eq!(s.attempts, 150);
    assert_eq!(
        s.attempts,
        s.successes + s.construction_failures + s.dictionary_rejections + s.duplicates
    );
    assert_eq!(s.successes, outcome.arrangements.len());
    for w in outcome.arrangements.windows(2) {
        assert!(w[0].score >= w[1].score);
    }
    for a in &outcome.arrangements {
        assert!((a.score - ctx.score(&a.segments)).abs() < 1e-4);
        assert!((a.refinement.final_score() - a.score).abs() < 1e-4);
    }
}

#[test]
fn test_solve_is_reproducible() {
    let fx = Fixture::new();
    let template = find_template("First M. Last").unwrap();
    let ctx = fx.ctx(&template, vec![]);
    let pool = LetterBag::from_phrase("Split Loyalty");
    let opts = SolveOptions::builder().attempts(60).build();

    let run = || {
        let mut rng = fastrand::Rng::with_seed(99);
        solve(&ctx, pool, &opts, &mut rng)
            .map(|o| o.arrangements.into_iter().map(|a| a.segments).collect::<Vec<_>>())
            .ok()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_dictionary_words_are_rejected_and_retried() {
    let fx = Fixture::new();
    let filter = WordFilter::with_dictionary(["anna"], false);
    let template = find_template("Mononym").unwrap();
    let ctx = SolveContext::new(
        &template,
        &fx.models,
        vec![],
        PhonotacticChecker::default(),
        &filter,
        &fx.scorer,
    );
    let pool = LetterBag::from_phrase("Anna");

    let opts = SolveOptions::builder().attempts(200).build();
    let mut rng = fastrand::Rng::with_seed(17);
    let outcome = solve(&ctx, pool, &opts, &mut rng).unwrap();

    let s = outcome.stats;
    assert!(s.dictionary_rejections > 0, "{:?}", s);
    assert_eq!(
        s.attempts,
        s.successes + s.construction_failures + s.dictionary_rejections + s.duplicates
    );
    assert!(!outcome.arrangements.is_empty());
    for a in &outcome.arrangements {
        assert_ne!(a.segments[0], "anna");
    }
}

#[test]
fn test_syllable_pass_finds_improvements() {
    let fx = Fixture::new();
    let pool = LetterBag::from_phrase("Margaret Thatcher");
    let opts = SolveOptions::builder().attempts(300).build();

    let mut syllable_swaps = 0;
    for label in ["First Last", "First M. Last", "First Middle Last"] {
        let template = find_template(label).unwrap();
        let ctx = fx.ctx(&template, vec![]);
        let mut rng = fastrand::Rng::with_seed(12);
        let Ok(outcome) = solve(&ctx, pool, &opts, &mut rng) else {
            continue;
        };
        for a in &outcome.arrangements {
            syllable_swaps += a.refinement.syllable_swaps;
            assert!(joined(&a.segments).same_letters(&pool));
        }
    }
    assert!(syllable_swaps > 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_refinement_climbs_and_conserves_letters(seed in any::<u64>()) {
        let fx = Fixture::new();
        let template = find_template("First M. Last").unwrap();
        let ctx = fx.ctx(&template, vec![]);
        let pool = LetterBag::from_phrase("Split Loyalty");

        let mut rng = fastrand::Rng::with_seed(seed);
        if let Ok(mut texts) = construct(&ctx, pool, 1.6, &mut rng) {
            let lengths: Vec<usize> = texts.iter().map(String::len).collect();
            let outcome = refine(&ctx, &mut texts, 50, 25);

            prop_assert!(joined(&texts).same_letters(&pool));
            prop_assert_eq!(lengths, texts.iter().map(String::len).collect::<Vec<_>>());
            for w in outcome.trajectory.windows(2) {
                prop_assert!(w[1] > w[0], "score fell: {:?}", outcome.trajectory);
            }
            prop_assert_eq!(
                outcome.trajectory.len(),
                1 + outcome.char_swaps + outcome.syllable_swaps
            );
            prop_assert!((outcome.final_score() - ctx.score(&texts)).abs() < 1e-4);
            for text in &texts {
                prop_assert!(ctx.is_legal(text));
            }
        }
    }
}
