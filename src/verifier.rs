use crate::error::{NameForgeError, NfResult};
use crate::letters::LetterBag;
use tracing::error;

/// Confirms that `segments` use exactly the letters of `expected`.
///
/// A mismatch means the multiset bookkeeping is broken somewhere upstream;
/// it is logged and returned as an error, never passed on to the caller.
pub fn verify_segments<S: AsRef<str>>(expected: &LetterBag, segments: &[S]) -> NfResult<()> {
    let joined: String = segments.iter().map(|s| s.as_ref()).collect();
    let actual = LetterBag::from_phrase(&joined);
    if actual.same_letters(expected) {
        return Ok(());
    }

    let violation = NameForgeError::AnagramIntegrityViolation {
        expected: expected.as_sorted_string(),
        actual: actual.as_sorted_string(),
    };
    error!("{}", violation);
    Err(violation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_permutation() {
        let bag = LetterBag::from_phrase("Hello World");
        assert!(verify_segments(&bag, &["dorel", "whoLL"]).is_ok());
    }

    #[test]
    fn test_rejects_missing_and_extra_letters() {
        let bag = LetterBag::from_phrase("abc");
        assert!(matches!(
            verify_segments(&bag, &["ab"]),
            Err(NameForgeError::AnagramIntegrityViolation { .. })
        ));
        assert!(verify_segments(&bag, &["abcc"]).is_err());
    }
}
