use crate::config::PhonotacticRules;
use crate::letters::{is_consonant, is_vowel};
use std::ops::Range;

pub const VALID_ONSETS_2: &[&str] = &[
    "bl", "br", "ch", "cl", "cr", "dh", "dr", "dw", "fl", "fr", "gh", "gl", "gn", "gr", "gw", "kh",
    "kl", "kn", "kr", "kw", "ph", "pl", "pr", "ps", "qu", "rh", "sc", "sh", "sk", "sl", "sm", "sn",
    "sp", "st", "sv", "sw", "th", "tr", "ts", "tw", "vl", "vr", "wh", "wr", "zh",
];

pub const VALID_ONSETS_3: &[&str] = &[
    "chr", "phr", "sch", "scr", "shr", "sph", "spl", "spr", "squ", "str", "thr",
];

pub const VALID_CODAS_2: &[&str] = &[
    "ch", "ck", "ct", "dg", "ds", "ff", "ft", "gh", "gs", "ks", "lb", "lc", "ld", "lf", "lk", "ll",
    "lm", "ln", "lp", "ls", "lt", "lv", "lz", "mb", "mn", "mp", "ms", "mt", "nc", "nd", "ng", "nk",
    "nn", "ns", "nt", "nx", "nz", "ph", "ps", "pt", "rb", "rc", "rd", "rf", "rg", "rk", "rl", "rm",
    "rn", "rp", "rs", "rt", "rv", "rz", "sh", "sk", "sm", "sp", "ss", "st", "th", "ts", "tt", "tz",
    "wl", "wn", "ws", "xt", "xn",
];

pub const VALID_CODAS_3: &[&str] = &[
    "cts", "fts", "lch", "lds", "lfs", "lks", "lls", "lms", "lps", "lts", "mbs", "mps", "nce",
    "nch", "ncs", "nds", "ngs", "nks", "nse", "nth", "nts", "nze", "rbs", "rch", "rds", "rfs",
    "rks", "rls", "rms", "rns", "rps", "rse", "rst", "rth", "rts", "sks", "sts", "tch", "ths",
];

pub const VALID_VOWEL_PAIRS: &[&str] = &[
    "ae", "ai", "ao", "au", "ay", "ea", "ee", "ei", "eo", "eu", "ey", "ia", "ie", "io", "iu", "oa",
    "oe", "oi", "oo", "ou", "oy", "ua", "ue", "ui", "uo", "uy", "ya", "ye", "yi", "yo", "yu",
];

#[inline]
fn in_table(table: &[&str], cluster: &[u8]) -> bool {
    table.iter().any(|t| t.as_bytes() == cluster)
}

#[inline]
fn prefixes_any(table: &[&str], cluster: &[u8]) -> bool {
    table.iter().any(|t| t.as_bytes().starts_with(cluster))
}

/// Leading consonants, before the first vowel.
pub fn onset(word: &[u8]) -> &[u8] {
    let end = word.iter().position(|&c| is_vowel(c)).unwrap_or(word.len());
    &word[..end]
}

/// Trailing consonants, after the last vowel.
pub fn coda(word: &[u8]) -> &[u8] {
    let start = word
        .iter()
        .rposition(|&c| is_vowel(c))
        .map_or(0, |i| i + 1);
    &word[start..]
}

pub fn is_valid_onset(cluster: &[u8]) -> bool {
    match cluster.len() {
        0 | 1 => true,
        2 => in_table(VALID_ONSETS_2, cluster),
        3 => in_table(VALID_ONSETS_3, cluster),
        _ => false,
    }
}

pub fn is_valid_coda(cluster: &[u8]) -> bool {
    match cluster.len() {
        0 | 1 => true,
        2 => in_table(VALID_CODAS_2, cluster),
        3 => in_table(VALID_CODAS_3, cluster),
        _ => false,
    }
}

fn could_be_onset_prefix(cluster: &[u8]) -> bool {
    match cluster.len() {
        0 | 1 => true,
        2 => in_table(VALID_ONSETS_2, cluster) || prefixes_any(VALID_ONSETS_3, cluster),
        3 => in_table(VALID_ONSETS_3, cluster),
        _ => false,
    }
}

fn could_be_coda_prefix(cluster: &[u8]) -> bool {
    match cluster.len() {
        0 | 1 => true,
        2 => in_table(VALID_CODAS_2, cluster) || prefixes_any(VALID_CODAS_3, cluster),
        3 => in_table(VALID_CODAS_3, cluster),
        _ => false,
    }
}

pub fn is_valid_vowel_pair(a: u8, b: u8) -> bool {
    in_table(VALID_VOWEL_PAIRS, &[a, b])
}

/// Incremental view of a segment under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentState {
    text: Vec<u8>,
    vowel_count: usize,
    consonant_run: usize,
    vowel_run: usize,
}

impl SegmentState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, c: u8) {
        let c = c.to_ascii_lowercase();
        if is_vowel(c) {
            self.vowel_count += 1;
            self.vowel_run += 1;
            self.consonant_run = 0;
        } else {
            self.consonant_run += 1;
            self.vowel_run = 0;
        }
        self.text.push(c);
    }

    pub fn text(&self) -> &[u8] {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn has_vowel(&self) -> bool {
        self.vowel_count > 0
    }

    /// The segment as built so far.
    pub fn as_string(&self) -> String {
        String::from_utf8_lossy(&self.text).into_owned()
    }
}

/// Pronounceability rules. Pure: it judges character sequences only and
/// never sees the letter pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhonotacticChecker {
    pub rules: PhonotacticRules,
}

impl PhonotacticChecker {
    pub fn new(rules: PhonotacticRules) -> Self {
        Self { rules }
    }

    /// Whether `next` may follow the segment in `state`, given how many
    /// characters are still to be placed after it.
    pub fn can_extend(&self, state: &SegmentState, next: u8, remaining_after: usize) -> bool {
        if !next.is_ascii_alphabetic() {
            return false;
        }
        let next = next.to_ascii_lowercase();
        let text = state.text();

        if is_consonant(next) {
            if state.consonant_run + 1 > self.rules.max_consonant_run {
                return false;
            }

            let trailing = &text[text.len() - state.consonant_run..];
            let mut cluster = trailing.to_vec();
            cluster.push(next);

            if !state.has_vowel() {
                if !could_be_onset_prefix(&cluster) {
                    return false;
                }
            } else if remaining_after == 0 {
                if !is_valid_coda(&cluster) {
                    return false;
                }
            } else if remaining_after <= 2 && !could_be_coda_prefix(&cluster) {
                return false;
            }

            // The last character must leave the segment with a vowel.
            if remaining_after == 0 && !state.has_vowel() && !text.is_empty() {
                return false;
            }
        } else {
            if state.vowel_run + 1 > self.rules.max_vowel_run {
                return false;
            }
            if state.vowel_run > 0 {
                if let Some(&prev) = text.last() {
                    if !is_valid_vowel_pair(prev, next) {
                        return false;
                    }
                }
            }
            // The onset closes here.
            if !state.has_vowel() && !is_valid_onset(text) {
                return false;
            }
        }
        true
    }

    /// Full check of a finished segment.
    pub fn is_valid_segment(&self, word: &str) -> bool {
        let bytes = word.as_bytes();
        match bytes.len() {
            0 => return false,
            1 => return bytes[0].is_ascii_alphabetic(),
            _ => {}
        }
        if !bytes.iter().all(u8::is_ascii_lowercase) {
            return false;
        }
        if !bytes.iter().any(|&c| is_vowel(c)) {
            return false;
        }
        if !is_valid_onset(onset(bytes)) || !is_valid_coda(coda(bytes)) {
            return false;
        }

        let mut consonant_run = 0;
        let mut vowel_run = 0;
        for (i, &c) in bytes.iter().enumerate() {
            if is_vowel(c) {
                vowel_run += 1;
                consonant_run = 0;
                if vowel_run > self.rules.max_vowel_run {
                    return false;
                }
                if vowel_run >= 2 && !is_valid_vowel_pair(bytes[i - 1], c) {
                    return false;
                }
            } else {
                consonant_run += 1;
                vowel_run = 0;
                if consonant_run > self.rules.max_consonant_run {
                    return false;
                }
            }
        }
        true
    }
}

/// Byte ranges of the syllables of `word`.
///
/// Nuclei are vowels, extended through valid vowel pairs. Consonants between
/// two nuclei go to the following syllable as the longest valid onset; the
/// rest close the previous syllable. Words without a nucleus are one span.
pub fn syllable_spans(word: &str) -> Vec<Range<usize>> {
    let bytes = word.as_bytes();
    if bytes.len() <= 1 {
        return vec![0..bytes.len()];
    }

    let mut nuclei: Vec<Range<usize>> = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if is_vowel(bytes[i]) {
            let start = i;
            while i + 1 < bytes.len()
                && is_vowel(bytes[i + 1])
                && is_valid_vowel_pair(bytes[i], bytes[i + 1])
            {
                i += 1;
            }
            nuclei.push(start..i + 1);
        }
        i += 1;
    }

    if nuclei.is_empty() {
        return vec![0..bytes.len()];
    }

    let mut starts = vec![0usize];
    for pair in nuclei.windows(2) {
        let (prev_end, next_start) = (pair[0].end, pair[1].start);
        let cluster = &bytes[prev_end..next_start];
        let split = (0..=cluster.len())
            .find(|&k| is_valid_onset(&cluster[k..]))
            .unwrap_or(cluster.len());
        starts.push(prev_end + split);
    }

    let mut spans = Vec::with_capacity(starts.len());
    for (k, &start) in starts.iter().enumerate() {
        let end = starts.get(k + 1).copied().unwrap_or(bytes.len());
        spans.push(start..end);
    }
    spans
}

pub fn syllabify(word: &str) -> Vec<String> {
    syllable_spans(word)
        .into_iter()
        .map(|r| word[r].to_string())
        .collect()
}
