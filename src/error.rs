use thiserror::Error;

#[derive(Error, Debug)]
pub enum NameForgeError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    /// Multiset bookkeeping bug: a letter was taken that the bag did not hold.
    #[error("Letter '{letter}' is not available in the bag")]
    LetterUnavailable { letter: char },

    #[error("Construction failed: {0}")]
    ConstructionFailure(String),

    #[error("Segment '{word}' is a filtered word")]
    DictionaryRejection { word: String },

    #[error("Template '{label}' produced no candidate within its attempt budget")]
    TemplateInfeasible { label: String },

    #[error("Anagram integrity violation: expected letters '{expected}', got '{actual}'")]
    AnagramIntegrityViolation { expected: String, actual: String },

    #[error("No valid arrangement found for '{phrase}'")]
    NoArrangement { phrase: String },
}

impl NameForgeError {
    /// Errors that only abandon the current attempt; the caller retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConstructionFailure(_) | Self::DictionaryRejection { .. }
        )
    }
}

pub type NfResult<T> = Result<T, NameForgeError>;
