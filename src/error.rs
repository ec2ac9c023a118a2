use thiserror::Error;

/// Malformed, non-monotonic or discontinuous timing data.
///
/// Raised only while building spans or a [`crate::TimingIndex`]. It is fatal for
/// the learning object that produced it: the data will not become valid on
/// retry, so callers fall back to playback without highlighting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataIntegrityError {
    #[error("word {index}: text is empty")]
    EmptyWordText { index: usize },
    #[error("word {index}: end_ms {end_ms} precedes start_ms {start_ms}")]
    InvalidWordSpan {
        index: usize,
        start_ms: u64,
        end_ms: u64,
    },
    #[error("sentence {index}: end_ms {end_ms} precedes start_ms {start_ms}")]
    InvalidSentenceSpan {
        index: usize,
        start_ms: u64,
        end_ms: u64,
    },
    #[error("{kind} {index}: char_end {char_end} precedes char_start {char_start}")]
    InvalidCharRange {
        kind: &'static str,
        index: usize,
        char_start: usize,
        char_end: usize,
    },
    #[error("sentence {index}: word_end_index {word_end_index} precedes word_start_index {word_start_index}")]
    InvalidWordRange {
        index: usize,
        word_start_index: usize,
        word_end_index: usize,
    },
    #[error("word {index}: start_ms {start_ms} precedes previous start_ms {prev_start_ms}")]
    WordsOutOfOrder {
        index: usize,
        prev_start_ms: u64,
        start_ms: u64,
    },
    #[error("word {index}: start_ms {start_ms} falls inside an earlier word ending at {prev_end_ms}")]
    OverlappingWords {
        index: usize,
        prev_end_ms: u64,
        start_ms: u64,
    },
    #[error("word {index}: end_ms {end_ms} runs past the last sentence end {total_duration_ms}")]
    WordPastEnd {
        index: usize,
        end_ms: u64,
        total_duration_ms: u64,
    },
    #[error("sentence {index}: start_ms {start_ms} precedes previous start_ms {prev_start_ms}")]
    SentencesOutOfOrder {
        index: usize,
        prev_start_ms: u64,
        start_ms: u64,
    },
    #[error("sentence {index}: start_ms {start_ms} does not continue previous end_ms {prev_end_ms}")]
    SentenceGap {
        index: usize,
        prev_end_ms: u64,
        start_ms: u64,
    },
    #[error("sentence at position {index} carries sentence_index {sentence_index}")]
    SentenceIndexMismatch { index: usize, sentence_index: usize },
    #[error("word {index}: sentence_index {sentence_index} out of range for {sentence_count} sentences")]
    WordSentenceOutOfRange {
        index: usize,
        sentence_index: usize,
        sentence_count: usize,
    },
    #[error("word {index}: sentence_index {sentence_index} precedes previous word's {prev_sentence_index}")]
    WordSentenceOrder {
        index: usize,
        prev_sentence_index: usize,
        sentence_index: usize,
    },
    #[error("word {index}: start_ms {start_ms} duplicates word {prev_index}")]
    DuplicateWordStart {
        index: usize,
        prev_index: usize,
        start_ms: u64,
    },
}

/// Failure converting an upstream timing document into typed spans.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{kind} record {index} is missing `{field}`")]
    MissingField {
        kind: &'static str,
        index: usize,
        field: &'static str,
    },
    #[error("{kind} record {index}: `{field}` is negative ({value})")]
    NegativeValue {
        kind: &'static str,
        index: usize,
        field: &'static str,
        value: i64,
    },
    #[error("{kind} record {index}: `{field}` does not fit this platform ({value})")]
    ValueOutOfRange {
        kind: &'static str,
        index: usize,
        field: &'static str,
        value: u64,
    },
    #[error(transparent)]
    Integrity(#[from] DataIntegrityError),
}

impl IngestError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn missing(kind: &'static str, index: usize, field: &'static str) -> Self {
        Self::MissingField { kind, index, field }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupTableError {
    #[error("lookup interval must be greater than zero")]
    ZeroInterval,
}
