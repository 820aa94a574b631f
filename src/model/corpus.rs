use crate::error::NfResult;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Upper bound on the weight column, so one popular name cannot dominate.
pub const MAX_NAME_WEIGHT: u32 = 50;

pub const MALE_FIRST_FILE: &str = "male_first.txt";
pub const FEMALE_FIRST_FILE: &str = "female_first.txt";
pub const SURNAMES_FILE: &str = "surnames.txt";

pub const EMBEDDED_MALE_FIRST: &str = include_str!("../../data/male_first.txt");
pub const EMBEDDED_FEMALE_FIRST: &str = include_str!("../../data/female_first.txt");
pub const EMBEDDED_SURNAMES: &str = include_str!("../../data/surnames.txt");

/// A list of lower-cased names with training weights.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameList {
    pub entries: Vec<(String, u32)>,
}

impl NameList {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn extend(&mut self, other: &NameList) {
        self.entries.extend(other.entries.iter().cloned());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(n, w)| (n.as_str(), *w))
    }
}

/// Reads a name list: one name per line, an optional tab-separated weight,
/// `#` comments. Rows that are not purely alphabetic are skipped.
pub fn load_names<R: Read>(reader: R) -> NfResult<NameList> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut entries = Vec::new();
    let mut skipped = 0usize;

    for result in rdr.records() {
        let rec = result?;
        let Some(raw) = rec.get(0) else {
            continue;
        };
        let name = raw.trim().to_ascii_lowercase();
        if name.is_empty() {
            continue;
        }
        if !name.bytes().all(|b| b.is_ascii_lowercase()) {
            skipped += 1;
            continue;
        }

        let weight = rec
            .get(1)
            .and_then(|w| w.trim().parse::<u32>().ok())
            .unwrap_or(1)
            .clamp(1, MAX_NAME_WEIGHT);

        entries.push((name, weight));
    }

    if skipped > 0 {
        debug!("Skipped {} non-alphabetic corpus rows", skipped);
    }

    Ok(NameList { entries })
}

pub fn load_names_from_file<P: AsRef<Path>>(path: P) -> NfResult<NameList> {
    let file = File::open(path.as_ref())?;
    load_names(file)
}

pub fn load_names_from_str(content: &str) -> NfResult<NameList> {
    load_names(content.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_and_comments() {
        let data = "# header\nAlice\t3\nbob\n\nO'Brien\nzed\t999\n";
        let list = load_names_from_str(data).unwrap();
        assert_eq!(
            list.entries,
            vec![
                ("alice".to_string(), 3),
                ("bob".to_string(), 1),
                ("zed".to_string(), MAX_NAME_WEIGHT),
            ]
        );
    }

    #[test]
    fn test_embedded_lists_are_populated() {
        for data in [EMBEDDED_MALE_FIRST, EMBEDDED_FEMALE_FIRST, EMBEDDED_SURNAMES] {
            let list = load_names_from_str(data).unwrap();
            assert!(list.len() > 100);
        }
    }
}
