use crate::error::{NameForgeError, NfResult};

pub const ALPHABET_SIZE: usize = 26;

pub const VOWELS: &[u8] = b"aeiouy";

/// Keeps only ASCII letters from a phrase, lower-cased.
pub fn normalize(phrase: &str) -> String {
    phrase
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[inline(always)]
pub fn is_vowel(c: u8) -> bool {
    VOWELS.contains(&c.to_ascii_lowercase())
}

#[inline(always)]
pub fn is_consonant(c: u8) -> bool {
    c.is_ascii_alphabetic() && !is_vowel(c)
}

#[inline(always)]
fn slot(c: u8) -> Option<usize> {
    let lower = c.to_ascii_lowercase();
    if lower.is_ascii_lowercase() {
        Some((lower - b'a') as usize)
    } else {
        None
    }
}

/// Saved counts of a [`LetterBag`], restored with [`LetterBag::restore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BagSnapshot([u32; ALPHABET_SIZE]);

/// Letter multiset backed by a fixed count array.
///
/// `ceiling` holds the counts the bag was created with; no operation may push
/// a count below zero or above its ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LetterBag {
    counts: [u32; ALPHABET_SIZE],
    ceiling: [u32; ALPHABET_SIZE],
}

impl LetterBag {
    /// Builds a bag from every ASCII letter of `source`, ignoring everything else.
    pub fn from_phrase(source: &str) -> Self {
        let mut counts = [0u32; ALPHABET_SIZE];
        for b in source.bytes() {
            if let Some(i) = slot(b) {
                counts[i] += 1;
            }
        }
        Self {
            counts,
            ceiling: counts,
        }
    }

    pub fn count(&self, letter: u8) -> usize {
        slot(letter).map_or(0, |i| self.counts[i] as usize)
    }

    pub fn contains(&self, letter: u8) -> bool {
        self.count(letter) > 0
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|&c| c as usize).sum()
    }

    pub fn is_exhausted(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    pub fn consume(&mut self, letter: u8) -> NfResult<()> {
        match slot(letter) {
            Some(i) if self.counts[i] > 0 => {
                self.counts[i] -= 1;
                Ok(())
            }
            _ => Err(NameForgeError::LetterUnavailable {
                letter: letter as char,
            }),
        }
    }

    /// Consumes every letter of `word`; on failure the bag is left untouched.
    pub fn consume_all(&mut self, word: &str) -> NfResult<()> {
        let saved = self.snapshot();
        for b in word.bytes().filter(u8::is_ascii_alphabetic) {
            if let Err(e) = self.consume(b) {
                self.restore(saved);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Returns a letter to the pool. Releasing past the original count is a
    /// bookkeeping bug and is reported as such.
    pub fn release(&mut self, letter: u8) -> NfResult<()> {
        match slot(letter) {
            Some(i) if self.counts[i] < self.ceiling[i] => {
                self.counts[i] += 1;
                Ok(())
            }
            _ => Err(NameForgeError::LetterUnavailable {
                letter: letter as char,
            }),
        }
    }

    pub fn snapshot(&self) -> BagSnapshot {
        BagSnapshot(self.counts)
    }

    pub fn restore(&mut self, snapshot: BagSnapshot) {
        debug_assert!(snapshot
            .0
            .iter()
            .zip(self.ceiling.iter())
            .all(|(c, max)| c <= max));
        self.counts = snapshot.0;
    }

    /// Distinct letters still available, in alphabetical order.
    pub fn available(&self) -> impl Iterator<Item = u8> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(|(i, _)| b'a' + i as u8)
    }

    pub fn vowel_count(&self) -> usize {
        VOWELS.iter().map(|&v| self.count(v)).sum()
    }

    /// Every remaining letter, sorted (e.g. "dehllloorw").
    pub fn as_sorted_string(&self) -> String {
        let mut out = String::with_capacity(self.total());
        for (i, &c) in self.counts.iter().enumerate() {
            for _ in 0..c {
                out.push((b'a' + i as u8) as char);
            }
        }
        out
    }

    /// Multiset equality of the remaining letters, ignoring the ceilings.
    pub fn same_letters(&self, other: &LetterBag) -> bool {
        self.counts == other.counts
    }
}

/// True when `name` uses exactly the letters of `phrase`, ignoring case,
/// spacing and punctuation.
pub fn verify_anagram(phrase: &str, name: &str) -> bool {
    LetterBag::from_phrase(phrase).same_letters(&LetterBag::from_phrase(name))
}
