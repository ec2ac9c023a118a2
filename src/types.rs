use serde::Serialize;

use crate::error::DataIntegrityError;

/// A spoken word and the half-open interval `[start_ms, end_ms)` it occupies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordSpan {
    word: String,
    start_ms: u64,
    end_ms: u64,
    sentence_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    char_start: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    char_end: Option<usize>,
}

impl WordSpan {
    pub fn new(
        word: impl Into<String>,
        start_ms: u64,
        end_ms: u64,
        sentence_index: usize,
    ) -> Result<Self, DataIntegrityError> {
        let span = Self {
            word: word.into(),
            start_ms,
            end_ms,
            sentence_index,
            char_start: None,
            char_end: None,
        };
        span.check(0)?;
        Ok(span)
    }

    pub fn with_char_range(
        mut self,
        char_start: usize,
        char_end: usize,
    ) -> Result<Self, DataIntegrityError> {
        self.char_start = Some(char_start);
        self.char_end = Some(char_end);
        self.check(0)?;
        Ok(self)
    }

    pub(crate) fn check(&self, index: usize) -> Result<(), DataIntegrityError> {
        if self.word.is_empty() {
            return Err(DataIntegrityError::EmptyWordText { index });
        }
        if self.end_ms < self.start_ms {
            return Err(DataIntegrityError::InvalidWordSpan {
                index,
                start_ms: self.start_ms,
                end_ms: self.end_ms,
            });
        }
        check_char_range("word", index, self.char_start, self.char_end)
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn start_ms(&self) -> u64 {
        self.start_ms
    }

    pub fn end_ms(&self) -> u64 {
        self.end_ms
    }

    pub fn sentence_index(&self) -> usize {
        self.sentence_index
    }

    pub fn char_range(&self) -> Option<(usize, usize)> {
        self.char_start.zip(self.char_end)
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }

    pub fn is_active_at(&self, time_ms: i64) -> bool {
        is_within(time_ms, self.start_ms, self.end_ms)
    }
}

/// A sentence interval and the inclusive word range it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentenceSpan {
    text: String,
    start_ms: u64,
    end_ms: u64,
    sentence_index: usize,
    word_start_index: usize,
    word_end_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    char_start: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    char_end: Option<usize>,
}

impl SentenceSpan {
    pub fn new(
        text: impl Into<String>,
        start_ms: u64,
        end_ms: u64,
        sentence_index: usize,
        word_start_index: usize,
        word_end_index: usize,
    ) -> Result<Self, DataIntegrityError> {
        let span = Self {
            text: text.into(),
            start_ms,
            end_ms,
            sentence_index,
            word_start_index,
            word_end_index,
            char_start: None,
            char_end: None,
        };
        span.check(0)?;
        Ok(span)
    }

    pub fn with_char_range(
        mut self,
        char_start: usize,
        char_end: usize,
    ) -> Result<Self, DataIntegrityError> {
        self.char_start = Some(char_start);
        self.char_end = Some(char_end);
        self.check(0)?;
        Ok(self)
    }

    pub(crate) fn check(&self, index: usize) -> Result<(), DataIntegrityError> {
        if self.end_ms < self.start_ms {
            return Err(DataIntegrityError::InvalidSentenceSpan {
                index,
                start_ms: self.start_ms,
                end_ms: self.end_ms,
            });
        }
        if self.word_end_index < self.word_start_index {
            return Err(DataIntegrityError::InvalidWordRange {
                index,
                word_start_index: self.word_start_index,
                word_end_index: self.word_end_index,
            });
        }
        check_char_range("sentence", index, self.char_start, self.char_end)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn start_ms(&self) -> u64 {
        self.start_ms
    }

    pub fn end_ms(&self) -> u64 {
        self.end_ms
    }

    pub fn sentence_index(&self) -> usize {
        self.sentence_index
    }

    /// Inclusive `(word_start_index, word_end_index)`.
    pub fn word_range(&self) -> (usize, usize) {
        (self.word_start_index, self.word_end_index)
    }

    pub fn char_range(&self) -> Option<(usize, usize)> {
        self.char_start.zip(self.char_end)
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }

    pub fn is_active_at(&self, time_ms: i64) -> bool {
        is_within(time_ms, self.start_ms, self.end_ms)
    }
}

impl DataIntegrityError {
    /// Rewrites the record position of a span-level error raised by a
    /// standalone constructor.
    pub(crate) fn at_index(self, at: usize) -> Self {
        match self {
            Self::EmptyWordText { .. } => Self::EmptyWordText { index: at },
            Self::InvalidWordSpan {
                start_ms, end_ms, ..
            } => Self::InvalidWordSpan {
                index: at,
                start_ms,
                end_ms,
            },
            Self::InvalidSentenceSpan {
                start_ms, end_ms, ..
            } => Self::InvalidSentenceSpan {
                index: at,
                start_ms,
                end_ms,
            },
            Self::InvalidCharRange {
                kind,
                char_start,
                char_end,
                ..
            } => Self::InvalidCharRange {
                kind,
                index: at,
                char_start,
                char_end,
            },
            Self::InvalidWordRange {
                word_start_index,
                word_end_index,
                ..
            } => Self::InvalidWordRange {
                index: at,
                word_start_index,
                word_end_index,
            },
            other => other,
        }
    }
}

fn check_char_range(
    kind: &'static str,
    index: usize,
    char_start: Option<usize>,
    char_end: Option<usize>,
) -> Result<(), DataIntegrityError> {
    match (char_start, char_end) {
        (Some(char_start), Some(char_end)) if char_end < char_start => {
            Err(DataIntegrityError::InvalidCharRange {
                kind,
                index,
                char_start,
                char_end,
            })
        }
        _ => Ok(()),
    }
}

// Timing contract: [start_ms, end_ms), start inclusive and end exclusive.
fn is_within(time_ms: i64, start_ms: u64, end_ms: u64) -> bool {
    u64::try_from(time_ms).is_ok_and(|t| t >= start_ms && t < end_ms)
}
