use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use nameforge::candidate::Candidate;
use nameforge::letters::{normalize, verify_anagram, LetterBag};

pub fn print_input_summary(phrase: &str) {
    let normalized = normalize(phrase);
    let bag = LetterBag::from_phrase(&normalized);
    println!(
        "Input: \"{}\" ({} letters: {})",
        phrase,
        bag.total(),
        bag.as_sorted_string()
    );
}

pub fn print_candidates(candidates: &[Candidate]) {
    for (rank, c) in candidates.iter().enumerate() {
        println!("{:>3}. {}", rank + 1, c.name);
    }
}

pub fn print_candidate_table(phrase: &str, candidates: &[Candidate]) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("#"),
        Cell::new("Name").add_attribute(Attribute::Bold),
        Cell::new("Score").fg(Color::Cyan),
        Cell::new("Template"),
        Cell::new("Check"),
    ]);

    for col in [0, 2] {
        if let Some(c) = table.column_mut(col) {
            c.set_cell_alignment(CellAlignment::Right);
        }
    }

    for (rank, c) in candidates.iter().enumerate() {
        // Re-checked against the raw phrase, independently of the generator
        let ok = c.verified && verify_anagram(phrase, &c.name);
        let check = if ok {
            Cell::new("OK").fg(Color::Green)
        } else {
            Cell::new("MISMATCH").fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&c.name),
            Cell::new(format!("{:.2}", c.score)),
            Cell::new(&c.template),
            check,
        ]);
    }
    println!("{}", table);
}

pub fn print_template_table(summaries: &[(String, usize, usize, usize)]) {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.set_header(vec![
        Cell::new("Template").add_attribute(Attribute::Bold),
        Cell::new("Segments"),
        Cell::new("Letters"),
    ]);

    for (label, segments, min, max) in summaries {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(segments).set_alignment(CellAlignment::Right),
            Cell::new(format!("{}-{}", min, max)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{}", table);
}
