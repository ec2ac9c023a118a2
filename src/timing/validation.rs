use std::ops::Range;

use crate::config::DuplicateStartPolicy;
use crate::error::DataIntegrityError;
use crate::types::{SentenceSpan, WordSpan};

/// Derived structure produced by a successful validation pass.
#[derive(Debug)]
pub(crate) struct Validated {
    /// Word-index range per sentence, derived from word `sentence_index` values.
    pub sentence_words: Vec<Range<usize>>,
    /// Sentences whose declared word range disagrees with the derived one.
    pub declared_range_mismatches: Vec<usize>,
    pub duplicate_word_starts: usize,
}

/// Checks every construction invariant and reports the first violation.
pub(crate) fn validate(
    words: &[WordSpan],
    sentences: &[SentenceSpan],
    policy: DuplicateStartPolicy,
) -> Result<Validated, DataIntegrityError> {
    for (index, word) in words.iter().enumerate() {
        word.check(index)?;
    }
    for (index, sentence) in sentences.iter().enumerate() {
        sentence.check(index)?;
    }

    for (index, pair) in words.windows(2).enumerate() {
        if pair[1].start_ms() < pair[0].start_ms() {
            return Err(DataIntegrityError::WordsOutOfOrder {
                index: index + 1,
                prev_start_ms: pair[0].start_ms(),
                start_ms: pair[1].start_ms(),
            });
        }
    }
    // Only words sharing a start time may overlap; those resolve by policy.
    let mut reach_ms = 0u64;
    for (index, pair) in words.windows(2).enumerate() {
        reach_ms = reach_ms.max(pair[0].end_ms());
        if pair[1].start_ms() != pair[0].start_ms() && pair[1].start_ms() < reach_ms {
            return Err(DataIntegrityError::OverlappingWords {
                index: index + 1,
                prev_end_ms: reach_ms,
                start_ms: pair[1].start_ms(),
            });
        }
    }
    for (index, pair) in sentences.windows(2).enumerate() {
        if pair[1].start_ms() < pair[0].start_ms() {
            return Err(DataIntegrityError::SentencesOutOfOrder {
                index: index + 1,
                prev_start_ms: pair[0].start_ms(),
                start_ms: pair[1].start_ms(),
            });
        }
    }
    for (index, pair) in sentences.windows(2).enumerate() {
        if pair[1].start_ms() != pair[0].end_ms() {
            return Err(DataIntegrityError::SentenceGap {
                index: index + 1,
                prev_end_ms: pair[0].end_ms(),
                start_ms: pair[1].start_ms(),
            });
        }
    }
    for (index, sentence) in sentences.iter().enumerate() {
        if sentence.sentence_index() != index {
            return Err(DataIntegrityError::SentenceIndexMismatch {
                index,
                sentence_index: sentence.sentence_index(),
            });
        }
    }

    if let Some(last) = sentences.last() {
        if let Some(index) = words.iter().position(|w| w.end_ms() > last.end_ms()) {
            return Err(DataIntegrityError::WordPastEnd {
                index,
                end_ms: words[index].end_ms(),
                total_duration_ms: last.end_ms(),
            });
        }
    }

    let (sentence_words, declared_range_mismatches) = if sentences.is_empty() {
        (Vec::new(), Vec::new())
    } else {
        let sentence_words = derive_sentence_words(words, sentences.len())?;
        let mismatches = sentences
            .iter()
            .zip(&sentence_words)
            .enumerate()
            .filter(|(_, (sentence, derived))| {
                let (first, last) = sentence.word_range();
                derived.is_empty() || derived.start != first || derived.end != last + 1
            })
            .map(|(index, _)| index)
            .collect();
        (sentence_words, mismatches)
    };

    let mut duplicate_word_starts = 0;
    for (index, pair) in words.windows(2).enumerate() {
        if pair[1].start_ms() != pair[0].start_ms() {
            continue;
        }
        if policy == DuplicateStartPolicy::Reject {
            return Err(DataIntegrityError::DuplicateWordStart {
                index: index + 1,
                prev_index: index,
                start_ms: pair[1].start_ms(),
            });
        }
        duplicate_word_starts += 1;
    }

    Ok(Validated {
        sentence_words,
        declared_range_mismatches,
        duplicate_word_starts,
    })
}

fn derive_sentence_words(
    words: &[WordSpan],
    sentence_count: usize,
) -> Result<Vec<Range<usize>>, DataIntegrityError> {
    let mut ranges = vec![0..0; sentence_count];
    let mut prev_sentence_index = 0;
    for (index, word) in words.iter().enumerate() {
        let sentence_index = word.sentence_index();
        if sentence_index >= sentence_count {
            return Err(DataIntegrityError::WordSentenceOutOfRange {
                index,
                sentence_index,
                sentence_count,
            });
        }
        if sentence_index < prev_sentence_index {
            return Err(DataIntegrityError::WordSentenceOrder {
                index,
                prev_sentence_index,
                sentence_index,
            });
        }
        let range = &mut ranges[sentence_index];
        if range.is_empty() {
            *range = index..index + 1;
        } else {
            range.end = index + 1;
        }
        prev_sentence_index = sentence_index;
    }
    Ok(ranges)
}
