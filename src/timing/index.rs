use std::ops::Range;

use crate::config::{DuplicateStartPolicy, EngineConfig};
use crate::error::DataIntegrityError;
use crate::timing::cursor::{last_at_or_before, LocalityCursor, SearchStats};
use crate::timing::validation::validate;
use crate::types::{SentenceSpan, WordSpan};

/// Immutable word and sentence timings for one learning object.
///
/// Built once when content loads and dropped when it is unloaded. Point
/// queries cost `O(log n)` in the worst case and `O(1)` while the playback
/// position advances steadily, thanks to a single-slot cursor per sequence.
/// The cursors never influence results, so the index can be shared across
/// threads.
#[derive(Debug)]
pub struct TimingIndex {
    words: Vec<WordSpan>,
    sentences: Vec<SentenceSpan>,
    sentence_words: Vec<Range<usize>>,
    total_duration_ms: u64,
    duplicate_start_policy: DuplicateStartPolicy,
    probe_span: usize,
    word_cursor: LocalityCursor,
    sentence_cursor: LocalityCursor,
}

impl TimingIndex {
    pub fn new(
        words: Vec<WordSpan>,
        sentences: Vec<SentenceSpan>,
    ) -> Result<Self, DataIntegrityError> {
        Self::with_config(words, sentences, &EngineConfig::default())
    }

    pub fn with_config(
        words: Vec<WordSpan>,
        sentences: Vec<SentenceSpan>,
        config: &EngineConfig,
    ) -> Result<Self, DataIntegrityError> {
        let validated = validate(&words, &sentences, config.duplicate_start_policy)?;

        if !validated.declared_range_mismatches.is_empty() {
            tracing::warn!(
                sentences = ?validated.declared_range_mismatches,
                "timing index: declared sentence word ranges disagree with word sentence indices; using word indices"
            );
        }
        if validated.duplicate_word_starts > 0 {
            tracing::warn!(
                duplicates = validated.duplicate_word_starts,
                "timing index: words share start times; lowest index wins"
            );
        }

        let total_duration_ms = match sentences.last() {
            Some(last) => last.end_ms(),
            None => words.iter().map(WordSpan::end_ms).max().unwrap_or(0),
        };
        tracing::debug!(
            words = words.len(),
            sentences = sentences.len(),
            total_duration_ms,
            "timing index: built"
        );

        Ok(Self {
            words,
            sentences,
            sentence_words: validated.sentence_words,
            total_duration_ms,
            duplicate_start_policy: config.duplicate_start_policy,
            probe_span: config.locality_probe_span,
            word_cursor: LocalityCursor::new(),
            sentence_cursor: LocalityCursor::new(),
        })
    }

    pub fn words(&self) -> &[WordSpan] {
        &self.words
    }

    pub fn sentences(&self) -> &[SentenceSpan] {
        &self.sentences
    }

    pub fn word(&self, index: usize) -> Option<&WordSpan> {
        self.words.get(index)
    }

    pub fn sentence(&self, index: usize) -> Option<&SentenceSpan> {
        self.sentences.get(index)
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.sentences.is_empty()
    }

    /// End of the last sentence, or of the latest word when there are no
    /// sentences.
    pub fn total_duration_ms(&self) -> u64 {
        self.total_duration_ms
    }

    /// Word active at `time_ms`, or `None` outside `[0, total)` and inside
    /// pauses between words.
    pub fn find_active_word_index(&self, time_ms: i64) -> Option<usize> {
        let t = self.in_range(time_ms)?;
        let candidate = self
            .word_cursor
            .bracket(&self.words, t, self.probe_span, WordSpan::start_ms)?;
        self.resolve_word(candidate, t)
    }

    /// Sentence active at `time_ms`. Sentences partition the duration, so this
    /// is `Some` for every `time_ms` in `[0, total)`.
    pub fn find_active_sentence_index(&self, time_ms: i64) -> Option<usize> {
        let t = self.in_range(time_ms)?;
        if self.sentences.is_empty() {
            return None;
        }
        // A lead-in before the first sentence belongs to it.
        let found =
            self.sentence_cursor
                .bracket(&self.sentences, t, self.probe_span, SentenceSpan::start_ms);
        Some(found.unwrap_or(0))
    }

    /// Same answer as [`Self::find_active_word_index`], resolved by a full
    /// binary search that ignores the cursor and then re-seeds it.
    pub fn find_active_word_index_cold(&self, time_ms: i64) -> Option<usize> {
        let t = self.in_range(time_ms)?;
        let candidate = self
            .word_cursor
            .bracket_cold(&self.words, t, WordSpan::start_ms)?;
        self.resolve_word(candidate, t)
    }

    pub fn find_active_sentence_index_cold(&self, time_ms: i64) -> Option<usize> {
        let t = self.in_range(time_ms)?;
        if self.sentences.is_empty() {
            return None;
        }
        let found = self
            .sentence_cursor
            .bracket_cold(&self.sentences, t, SentenceSpan::start_ms);
        Some(found.unwrap_or(0))
    }

    /// Words of sentence `sentence_index`, in playback order. Unknown indices
    /// yield an empty sequence.
    pub fn words_in_sentence(&self, sentence_index: usize) -> WordsInSentence<'_> {
        let words = self
            .sentence_words
            .get(sentence_index)
            .map_or(&[][..], |range| &self.words[range.clone()]);
        WordsInSentence {
            iter: words.iter(),
        }
    }

    pub fn sentence_word_range(&self, sentence_index: usize) -> Option<Range<usize>> {
        self.sentence_words.get(sentence_index).cloned()
    }

    pub fn sentence_boundaries(&self, sentence_index: usize) -> Option<(u64, u64)> {
        self.sentences
            .get(sentence_index)
            .map(|s| (s.start_ms(), s.end_ms()))
    }

    /// Indices of words whose span intersects `[from_ms, to_ms)`. A
    /// zero-length word counts when its instant falls inside the window.
    pub fn word_indices_in_range(&self, from_ms: i64, to_ms: i64) -> Range<usize> {
        if to_ms <= from_ms || to_ms <= 0 {
            return 0..0;
        }
        let from = from_ms.max(0).unsigned_abs();
        let to = to_ms.unsigned_abs();

        let end = self.words.partition_point(|w| w.start_ms() < to);
        let start = match last_at_or_before(&self.words, from, WordSpan::start_ms) {
            None => 0,
            Some(candidate) => {
                let group = self.same_start_group(candidate);
                self.words[group.clone()]
                    .iter()
                    .position(|w| w.end_ms() > from || w.start_ms() == from)
                    .map_or(candidate + 1, |offset| group.start + offset)
            }
        };
        start..end.max(start)
    }

    /// Case-insensitive search for `text` starting at `start_index`.
    pub fn find_word_index_by_text(&self, text: &str, start_index: usize) -> Option<usize> {
        let needle = text.to_lowercase();
        self.words
            .iter()
            .enumerate()
            .skip(start_index)
            .find(|(_, w)| w.word().to_lowercase() == needle)
            .map(|(index, _)| index)
    }

    /// Re-runs every construction check. Diagnostic only.
    pub fn validate_integrity(&self) -> bool {
        validate(&self.words, &self.sentences, self.duplicate_start_policy).is_ok()
    }

    pub fn search_stats(&self) -> SearchStats {
        SearchStats {
            words: self.word_cursor.stats(),
            sentences: self.sentence_cursor.stats(),
        }
    }

    fn in_range(&self, time_ms: i64) -> Option<u64> {
        u64::try_from(time_ms)
            .ok()
            .filter(|&t| t < self.total_duration_ms)
    }

    /// `candidate` is the last word starting at or before `t`. Among words
    /// sharing its start time the lowest index containing `t` wins.
    fn resolve_word(&self, candidate: usize, t: u64) -> Option<usize> {
        let group = self.same_start_group(candidate);
        self.words[group.clone()]
            .iter()
            .position(|w| t < w.end_ms())
            .map(|offset| group.start + offset)
    }

    fn same_start_group(&self, last: usize) -> Range<usize> {
        let start_ms = self.words[last].start_ms();
        let first = self.words[..last]
            .iter()
            .rposition(|w| w.start_ms() != start_ms)
            .map_or(0, |i| i + 1);
        first..last + 1
    }
}

/// Snapshot of one sentence's words. Clone it to iterate again.
#[derive(Debug, Clone)]
pub struct WordsInSentence<'a> {
    iter: std::slice::Iter<'a, WordSpan>,
}

impl<'a> WordsInSentence<'a> {
    pub fn as_slice(&self) -> &'a [WordSpan] {
        self.iter.as_slice()
    }
}

impl<'a> Iterator for WordsInSentence<'a> {
    type Item = &'a WordSpan;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl DoubleEndedIterator for WordsInSentence<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.iter.next_back()
    }
}

impl ExactSizeIterator for WordsInSentence<'_> {}
