use std::sync::Arc;

use serde::Serialize;

use crate::timing::TimingIndex;

/// Highlight state after one position update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HighlightUpdate {
    pub word_index: Option<usize>,
    pub sentence_index: Option<usize>,
    /// True only when either index differs from the previously emitted value.
    pub changed: bool,
}

/// Turns a playback position stream into change-only highlight updates.
///
/// Shares, but does not own, the bound [`TimingIndex`]. Rebind it whenever a
/// different learning object loads.
#[derive(Debug)]
pub struct HighlightCalculator {
    index: Arc<TimingIndex>,
    last_word_index: Option<usize>,
    last_sentence_index: Option<usize>,
}

impl HighlightCalculator {
    pub fn new(index: Arc<TimingIndex>) -> Self {
        Self {
            index,
            last_word_index: None,
            last_sentence_index: None,
        }
    }

    /// Per-frame entry point. Amortized `O(1)` for steadily advancing
    /// positions.
    pub fn update_indices(&mut self, position_ms: i64) -> HighlightUpdate {
        let word_index = self.index.find_active_word_index(position_ms);
        let sentence_index = self.index.find_active_sentence_index(position_ms);
        self.apply(word_index, sentence_index)
    }

    /// Discontinuous jump, e.g. tap-to-seek. Resolves without trusting the
    /// cursor left by earlier frames.
    pub fn seek(&mut self, position_ms: i64) -> HighlightUpdate {
        let word_index = self.index.find_active_word_index_cold(position_ms);
        let sentence_index = self.index.find_active_sentence_index_cold(position_ms);
        self.apply(word_index, sentence_index)
    }

    pub fn reset(&mut self) {
        self.last_word_index = None;
        self.last_sentence_index = None;
    }

    pub fn rebind(&mut self, index: Arc<TimingIndex>) {
        tracing::debug!(
            words = index.word_count(),
            sentences = index.sentence_count(),
            "highlight calculator: rebound"
        );
        self.index = index;
        self.reset();
    }

    pub fn current(&self) -> (Option<usize>, Option<usize>) {
        (self.last_word_index, self.last_sentence_index)
    }

    pub fn index(&self) -> &Arc<TimingIndex> {
        &self.index
    }

    fn apply(
        &mut self,
        word_index: Option<usize>,
        sentence_index: Option<usize>,
    ) -> HighlightUpdate {
        let changed =
            word_index != self.last_word_index || sentence_index != self.last_sentence_index;
        self.last_word_index = word_index;
        self.last_sentence_index = sentence_index;
        HighlightUpdate {
            word_index,
            sentence_index,
            changed,
        }
    }
}
