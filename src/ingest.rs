//! Boundary between the loosely-typed timing documents produced upstream and
//! the typed spans the engine accepts.
//!
//! Documents arrive either flat (`{ "words": [...], "sentences": [...] }`) or
//! nested under `"timing"`, with snake_case or camelCase field names. Every
//! field is optional at the JSON layer; conversion rejects incomplete records
//! instead of inventing defaults.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::config::EngineConfig;
use crate::error::{DataIntegrityError, IngestError};
use crate::timing::TimingIndex;
use crate::types::{SentenceSpan, WordSpan};

#[derive(Debug, Default, Deserialize)]
struct RawDocument {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    words: Option<Vec<RawWord>>,
    #[serde(default)]
    sentences: Option<Vec<RawSentence>>,
    #[serde(default, alias = "totalDurationMs")]
    total_duration_ms: Option<i64>,
    #[serde(default)]
    timing: Option<Box<RawDocument>>,
}

#[derive(Debug, Deserialize)]
struct RawWord {
    #[serde(default)]
    word: Option<String>,
    #[serde(default, alias = "startMs")]
    start_ms: Option<i64>,
    #[serde(default, alias = "endMs")]
    end_ms: Option<i64>,
    #[serde(default, alias = "sentenceIndex")]
    sentence_index: Option<i64>,
    #[serde(default, alias = "charStart")]
    char_start: Option<i64>,
    #[serde(default, alias = "charEnd")]
    char_end: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawSentence {
    #[serde(default)]
    text: Option<String>,
    #[serde(default, alias = "startMs")]
    start_ms: Option<i64>,
    #[serde(default, alias = "endMs")]
    end_ms: Option<i64>,
    #[serde(default, alias = "sentenceIndex")]
    sentence_index: Option<i64>,
    #[serde(default, alias = "wordStartIndex")]
    word_start_index: Option<i64>,
    #[serde(default, alias = "wordEndIndex")]
    word_end_index: Option<i64>,
    #[serde(default, alias = "charStart")]
    char_start: Option<i64>,
    #[serde(default, alias = "charEnd")]
    char_end: Option<i64>,
}

/// Typed contents of one learning object's timing document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingDocument {
    pub version: Option<String>,
    pub words: Vec<WordSpan>,
    pub sentences: Vec<SentenceSpan>,
    pub declared_total_duration_ms: Option<u64>,
}

impl TimingDocument {
    pub fn from_json_str(json: &str) -> Result<Self, IngestError> {
        let raw: RawDocument =
            serde_json::from_str(json).map_err(|e| IngestError::json("parse timing document", e))?;
        Self::from_raw(raw)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, IngestError> {
        let raw: RawDocument = serde_json::from_reader(reader)
            .map_err(|e| IngestError::json("parse timing document", e))?;
        Self::from_raw(raw)
    }

    pub fn from_path(path: &Path) -> Result<Self, IngestError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| IngestError::io("read timing document", e))?;
        Self::from_json_str(&data)
    }

    /// Validates the spans into an index. A declared duration that disagrees
    /// with the spans is logged, not rejected.
    pub fn into_index(self, config: &EngineConfig) -> Result<TimingIndex, DataIntegrityError> {
        let declared = self.declared_total_duration_ms;
        let index = TimingIndex::with_config(self.words, self.sentences, config)?;
        if let Some(declared) = declared {
            if declared != index.total_duration_ms() {
                tracing::warn!(
                    declared_ms = declared,
                    derived_ms = index.total_duration_ms(),
                    "timing document: declared total duration disagrees with spans"
                );
            }
        }
        Ok(index)
    }

    fn from_raw(mut raw: RawDocument) -> Result<Self, IngestError> {
        if raw.words.is_none() && raw.sentences.is_none() {
            if let Some(mut nested) = raw.timing.take() {
                nested.version = nested.version.or(raw.version);
                return Self::from_raw(*nested);
            }
        }

        let words = raw
            .words
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, w)| convert_word(index, w))
            .collect::<Result<Vec<_>, _>>()?;
        let sentences = raw
            .sentences
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, s)| convert_sentence(index, s))
            .collect::<Result<Vec<_>, _>>()?;
        let declared_total_duration_ms = raw
            .total_duration_ms
            .map(|v| non_negative("document", 0, "total_duration_ms", v))
            .transpose()?;

        tracing::debug!(
            words = words.len(),
            sentences = sentences.len(),
            version = raw.version.as_deref().unwrap_or("unversioned"),
            "timing document: converted"
        );
        Ok(Self {
            version: raw.version,
            words,
            sentences,
            declared_total_duration_ms,
        })
    }
}

const WORD: &str = "word";
const SENTENCE: &str = "sentence";

fn convert_word(index: usize, raw: RawWord) -> Result<WordSpan, IngestError> {
    let text = raw.word.ok_or(IngestError::missing(WORD, index, "word"))?;
    let start_ms = required_ms(WORD, index, "start_ms", raw.start_ms)?;
    let end_ms = required_ms(WORD, index, "end_ms", raw.end_ms)?;
    let sentence_index = required_index(WORD, index, "sentence_index", raw.sentence_index)?;

    let span = WordSpan::new(text, start_ms, end_ms, sentence_index).map_err(|e| e.at_index(index))?;
    match char_range(WORD, index, raw.char_start, raw.char_end)? {
        Some((start, end)) => Ok(span.with_char_range(start, end).map_err(|e| e.at_index(index))?),
        None => Ok(span),
    }
}

fn convert_sentence(index: usize, raw: RawSentence) -> Result<SentenceSpan, IngestError> {
    let text = raw.text.ok_or(IngestError::missing(SENTENCE, index, "text"))?;
    let start_ms = required_ms(SENTENCE, index, "start_ms", raw.start_ms)?;
    let end_ms = required_ms(SENTENCE, index, "end_ms", raw.end_ms)?;
    // Older documents omit sentence_index; position is the only sane value.
    let sentence_index = match raw.sentence_index {
        Some(v) => to_usize(SENTENCE, index, "sentence_index", v)?,
        None => index,
    };
    let word_start_index =
        required_index(SENTENCE, index, "word_start_index", raw.word_start_index)?;
    let word_end_index = required_index(SENTENCE, index, "word_end_index", raw.word_end_index)?;

    let span = SentenceSpan::new(
        text,
        start_ms,
        end_ms,
        sentence_index,
        word_start_index,
        word_end_index,
    )
    .map_err(|e| e.at_index(index))?;
    match char_range(SENTENCE, index, raw.char_start, raw.char_end)? {
        Some((start, end)) => Ok(span.with_char_range(start, end).map_err(|e| e.at_index(index))?),
        None => Ok(span),
    }
}

fn required_ms(
    kind: &'static str,
    index: usize,
    field: &'static str,
    value: Option<i64>,
) -> Result<u64, IngestError> {
    let value = value.ok_or(IngestError::missing(kind, index, field))?;
    non_negative(kind, index, field, value)
}

fn required_index(
    kind: &'static str,
    index: usize,
    field: &'static str,
    value: Option<i64>,
) -> Result<usize, IngestError> {
    let value = value.ok_or(IngestError::missing(kind, index, field))?;
    to_usize(kind, index, field, value)
}

fn char_range(
    kind: &'static str,
    index: usize,
    start: Option<i64>,
    end: Option<i64>,
) -> Result<Option<(usize, usize)>, IngestError> {
    match (start, end) {
        (None, None) => Ok(None),
        (Some(start), Some(end)) => Ok(Some((
            to_usize(kind, index, "char_start", start)?,
            to_usize(kind, index, "char_end", end)?,
        ))),
        (Some(_), None) => Err(IngestError::missing(kind, index, "char_end")),
        (None, Some(_)) => Err(IngestError::missing(kind, index, "char_start")),
    }
}

fn non_negative(
    kind: &'static str,
    index: usize,
    field: &'static str,
    value: i64,
) -> Result<u64, IngestError> {
    u64::try_from(value).map_err(|_| IngestError::NegativeValue {
        kind,
        index,
        field,
        value,
    })
}

fn to_usize(
    kind: &'static str,
    index: usize,
    field: &'static str,
    value: i64,
) -> Result<usize, IngestError> {
    let value = non_negative(kind, index, field, value)?;
    usize::try_from(value).map_err(|_| IngestError::ValueOutOfRange {
        kind,
        index,
        field,
        value,
    })
}
