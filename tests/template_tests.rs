use nameforge::template::{
    apply_apostrophes, fallback_template, find_template, format_name, list_templates,
    relax_template, select_templates, template_summaries, SegmentRole, MAX_SELECTED_TEMPLATES,
};
use rstest::rstest;

#[test]
fn test_three_letters_only_selects_short_templates() {
    let mut rng = fastrand::Rng::with_seed(7);
    let chosen = select_templates(3, &[], &mut rng);
    assert!(!chosen.is_empty());
    for t in &chosen {
        assert!(t.total_min() <= 3 && 3 <= t.total_max(), "{}", t.label);
        assert!(t.segments.len() < 3, "{}", t.label);
    }
    let labels: Vec<&str> = chosen.iter().map(|t| t.label.as_str()).collect();
    assert!(labels.contains(&"Mononym"));
}

#[rstest]
#[case(10)]
#[case(12)]
#[case(20)]
#[case(28)]
fn test_selection_respects_bounds(#[case] n: usize) {
    let mut rng = fastrand::Rng::with_seed(n as u64);
    let chosen = select_templates(n, &[], &mut rng);
    assert!(!chosen.is_empty());
    assert!(chosen.len() <= MAX_SELECTED_TEMPLATES);
    for t in &chosen {
        assert!(t.accepts(n), "{} cannot hold {}", t.label, n);
    }
}

#[test]
fn test_hyphenated_templates_need_sixteen_letters() {
    for seed in 0..10 {
        let mut rng = fastrand::Rng::with_seed(seed);
        assert!(select_templates(15, &[], &mut rng)
            .iter()
            .all(|t| !t.is_hyphenated()));
    }
}

#[test]
fn test_required_roles_filter() {
    let mut rng = fastrand::Rng::with_seed(3);
    let chosen = select_templates(18, &[SegmentRole::HyphenatedLast], &mut rng);
    assert!(!chosen.is_empty());
    assert!(chosen.iter().all(|t| t.has_role(SegmentRole::HyphenatedLast)));
}

#[test]
fn test_selection_is_seeded() {
    let a: Vec<String> = select_templates(14, &[], &mut fastrand::Rng::with_seed(11))
        .into_iter()
        .map(|t| t.label)
        .collect();
    let b: Vec<String> = select_templates(14, &[], &mut fastrand::Rng::with_seed(11))
        .into_iter()
        .map(|t| t.label)
        .collect();
    assert_eq!(a, b);
}

#[rstest]
#[case(2)]
#[case(4)]
#[case(45)]
fn test_fallback_holds_letter_count(#[case] n: usize) {
    let t = fallback_template(n);
    assert!(t.total_min() <= n.max(2), "{:?}", t);
    if n >= 4 {
        assert!(t.accepts(n), "{:?}", t);
    }
}

#[rstest]
#[case(20, 8)]
#[case(39, 13)]
#[case(45, 15)]
fn test_fallback_words_stay_short(#[case] n: usize, #[case] longest: usize) {
    let t = fallback_template(n);
    assert!(t.accepts(n), "{:?}", t);
    let widest = t.segments.iter().map(|s| s.max_len).max().unwrap();
    assert_eq!(widest, longest, "{:?}", t);
}

#[test]
fn test_out_of_range_input_falls_back() {
    let mut rng = fastrand::Rng::with_seed(1);
    let chosen = select_templates(45, &[], &mut rng);
    assert_eq!(chosen.len(), 1);
    assert!(chosen[0].accepts(45));
}

#[test]
fn test_relax_keeps_label_and_fits() {
    let t = find_template("First Last").unwrap();
    assert!(!t.accepts(20));
    let relaxed = relax_template(&t, 20).unwrap();
    assert_eq!(relaxed.label, "First Last");
    assert!(relaxed.accepts(20));
    assert!(relax_template(&find_template("I. Last").unwrap(), 1).is_none());
}

#[rstest]
#[case("First Last", &["ada", "lovelace"], "Ada Lovelace")]
#[case("I. Last", &["j", "doe"], "J. Doe")]
#[case("First M. Last-Last", &["anna", "b", "cole", "dunn"], "Anna B. Cole-Dunn")]
#[case("Mononym", &["o'neil"], "O'Neil")]
fn test_format_name(#[case] label: &str, #[case] parts: &[&str], #[case] expected: &str) {
    let t = find_template(label).unwrap();
    assert_eq!(format_name(parts, &t), expected);
}

#[test]
fn test_apostrophes_only_touch_unfrozen_surnames() {
    let t = find_template("First Last").unwrap();
    let segments = vec!["obla".to_string(), "obrien".to_string()];
    let mut seen = false;
    for seed in 0..400 {
        let mut rng = fastrand::Rng::with_seed(seed);
        let out = apply_apostrophes(&segments, &t, &[false, false], &mut rng);
        assert_eq!(out[0], "obla");
        if out[1] == "o'brien" {
            seen = true;
        }
        let mut rng = fastrand::Rng::with_seed(seed);
        let frozen = apply_apostrophes(&segments, &t, &[false, true], &mut rng);
        assert_eq!(frozen[1], "obrien");
    }
    assert!(seen);
}

#[test]
fn test_summaries_match_catalog() {
    let summaries = template_summaries();
    assert_eq!(summaries.len(), list_templates().len());
    let (label, segments, min, max) = &summaries[0];
    assert_eq!(label, "Mononym");
    assert_eq!((*segments, *min, *max), (1, 3, 10));
}
