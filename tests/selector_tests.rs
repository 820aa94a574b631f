use nameforge::candidate::{Candidate, Segment};
use nameforge::scorer::ScoreDetails;
use nameforge::selector::{dedupe, levenshtein, select, similarity, SelectionOptions};
use nameforge::template::{SegmentRole, SegmentSpec};
use rstest::rstest;

fn candidate(label: &str, parts: &[(&str, SegmentRole, bool)], score: f32) -> Candidate {
    let segments: Vec<Segment> = parts
        .iter()
        .map(|&(text, role, fixed)| Segment {
            text: text.to_string(),
            spec: SegmentSpec::new(role, 1, 10),
            fixed,
        })
        .collect();
    Candidate {
        template: label.to_string(),
        name: parts.iter().map(|p| p.0).collect::<Vec<_>>().join(" "),
        segments,
        score,
        details: ScoreDetails::default(),
        verified: true,
    }
}

fn two(label: &str, first: &str, last: &str, score: f32) -> Candidate {
    candidate(
        label,
        &[(first, SegmentRole::First, false), (last, SegmentRole::Last, false)],
        score,
    )
}

#[rstest]
#[case("", "", 0)]
#[case("flaw", "lawn", 2)]
#[case("dorel", "doral", 1)]
#[case("abc", "cba", 2)]
fn test_levenshtein(#[case] a: &str, #[case] b: &str, #[case] d: usize) {
    assert_eq!(levenshtein(a, b), d);
    assert_eq!(levenshtein(b, a), d);
}

#[test]
fn test_similarity_of_shared_segment() {
    let a = two("A", "dorel", "wholl", 1.0);
    let b = two("A", "dorel", "lowhl", 1.0);
    assert!(similarity(&a, &b) >= 0.5);
    assert!((similarity(&a, &a) - 1.0).abs() < 1e-6);
}

#[test]
fn test_fixed_segments_do_not_count_as_overlap() {
    let a = candidate(
        "A",
        &[("anna", SegmentRole::First, true), ("lopez", SegmentRole::Last, false)],
        1.0,
    );
    let b = candidate(
        "A",
        &[("anna", SegmentRole::First, true), ("zimbo", SegmentRole::Last, false)],
        1.0,
    );
    assert!(similarity(&a, &b) < 0.5);
}

#[test]
fn test_dedupe_by_name_case_insensitively() {
    let mut upper = two("A", "Nora", "Bell", 2.0);
    upper.name = "NORA BELL".into();
    let out = dedupe(vec![two("A", "nora", "bell", 1.0), upper]);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].score, 1.0);
}

#[test]
fn test_near_duplicates_never_selected_together() {
    let opts = SelectionOptions::builder().count(5).similarity_threshold(0.8).build();
    let picked = select(
        vec![
            two("A", "marlo", "tesin", 9.0),
            two("B", "marlo", "tesim", 8.5),
            two("A", "kiran", "doyle", 7.0),
            two("B", "sulo", "pervak", 6.0),
        ],
        &opts,
    );
    for (i, a) in picked.iter().enumerate() {
        for b in &picked[i + 1..] {
            assert!(similarity(a, b) < 0.8, "{} ~ {}", a.name, b.name);
        }
    }
    assert_eq!(picked.len(), 3);
    assert_eq!(picked[0].name, "marlo tesin");
}

#[test]
fn test_overlap_penalty_reorders() {
    let opts = SelectionOptions::builder()
        .count(3)
        .similarity_threshold(1.0)
        .overlap_penalty(5.0)
        .build();
    let picked = select(
        vec![
            two("A", "nora", "bell", 10.0),
            two("B", "nora", "quist", 9.0),
            two("C", "ulla", "pike", 6.0),
        ],
        &opts,
    );
    let names: Vec<&str> = picked.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["nora bell", "ulla pike", "nora quist"]);
}

#[test]
fn test_cap_is_at_least_two() {
    let opts = SelectionOptions::builder().count(1).build();
    assert_eq!(opts.per_template_cap(), 2);
    let opts = SelectionOptions::builder().count(15).build();
    assert_eq!(opts.per_template_cap(), 6);
}

#[test]
fn test_returns_fewer_when_pool_is_small() {
    let opts = SelectionOptions::builder().count(10).build();
    let picked = select(vec![two("A", "nora", "bell", 1.0)], &opts);
    assert_eq!(picked.len(), 1);
    assert!(select(vec![], &opts).is_empty());
}
