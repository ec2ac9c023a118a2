use serde::Serialize;

use crate::timing::index::TimingIndex;

/// Structural summary of a loaded timing index: pauses, overlaps and how
/// much of the duration a word highlight covers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingDiagnostics {
    pub word_count: usize,
    pub sentence_count: usize,
    pub total_duration_ms: u64,
    pub gap_count: u32,
    pub total_gap_ms: u64,
    pub max_gap_ms: u64,
    pub mean_gap_ms: f32,
    pub overlap_count: u32,
    pub zero_duration_word_count: u32,
    pub duplicate_start_count: u32,
    /// Fraction of `[0, total)` inside some word span, in `[0, 1]`.
    pub word_coverage_ratio: f32,
    pub integrity_ok: bool,
}

impl TimingDiagnostics {
    pub fn compute(index: &TimingIndex) -> Self {
        let words = index.words();
        let total_duration_ms = index.total_duration_ms();

        let mut gap_count = 0u32;
        let mut total_gap_ms = 0u64;
        let mut max_gap_ms = 0u64;
        let mut overlap_count = 0u32;
        let mut duplicate_start_count = 0u32;
        for pair in words.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.start_ms() == prev.start_ms() {
                duplicate_start_count += 1;
            }
            if next.start_ms() > prev.end_ms() {
                let gap = next.start_ms() - prev.end_ms();
                gap_count += 1;
                total_gap_ms += gap;
                max_gap_ms = max_gap_ms.max(gap);
            } else if next.start_ms() < prev.end_ms() {
                overlap_count += 1;
            }
        }
        let zero_duration_word_count =
            words.iter().filter(|w| w.duration_ms() == 0).count() as u32;

        // Union of word spans clipped to [0, total); starts are sorted.
        let mut covered_ms = 0u64;
        let mut reach = 0u64;
        for word in words {
            let start = word.start_ms().max(reach);
            let end = word.end_ms().min(total_duration_ms);
            if end > start {
                covered_ms += end - start;
                reach = end;
            }
        }

        Self {
            word_count: words.len(),
            sentence_count: index.sentence_count(),
            total_duration_ms,
            gap_count,
            total_gap_ms,
            max_gap_ms,
            mean_gap_ms: if gap_count == 0 {
                0.0
            } else {
                total_gap_ms as f32 / gap_count as f32
            },
            overlap_count,
            zero_duration_word_count,
            duplicate_start_count,
            word_coverage_ratio: if total_duration_ms == 0 {
                0.0
            } else {
                covered_ms as f32 / total_duration_ms as f32
            },
            integrity_ok: index.validate_integrity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SentenceSpan, WordSpan};

    #[test]
    fn reports_gaps_and_coverage() {
        let words = vec![
            WordSpan::new("The", 0, 163, 0).unwrap(),
            WordSpan::new("objective", 197, 534, 0).unwrap(),
            WordSpan::new("of", 557, 604, 0).unwrap(),
        ];
        let sentences = vec![SentenceSpan::new("The objective of", 0, 1000, 0, 0, 2).unwrap()];
        let index = TimingIndex::new(words, sentences).unwrap();
        let diag = TimingDiagnostics::compute(&index);

        assert_eq!(diag.word_count, 3);
        assert_eq!(diag.gap_count, 2);
        assert_eq!(diag.total_gap_ms, 34 + 23);
        assert_eq!(diag.max_gap_ms, 34);
        assert!((diag.mean_gap_ms - 28.5).abs() < 1e-6);
        assert_eq!(diag.overlap_count, 0);
        // 163 + 337 + 47 = 547 covered out of 1000.
        assert!((diag.word_coverage_ratio - 0.547).abs() < 1e-6);
        assert!(diag.integrity_ok);
    }

    #[test]
    fn counts_overlaps_duplicates_and_zero_length_words() {
        // Only words sharing a start time can overlap in a valid index.
        let words = vec![
            WordSpan::new("a", 0, 200, 0).unwrap(),
            WordSpan::new("b", 200, 200, 0).unwrap(),
            WordSpan::new("c", 200, 400, 0).unwrap(),
            WordSpan::new("d", 200, 300, 0).unwrap(),
        ];
        let sentences = vec![SentenceSpan::new("a b c d", 0, 400, 0, 0, 3).unwrap()];
        let index = TimingIndex::new(words, sentences).unwrap();
        let diag = TimingDiagnostics::compute(&index);

        assert_eq!(diag.overlap_count, 1);
        assert_eq!(diag.duplicate_start_count, 2);
        assert_eq!(diag.zero_duration_word_count, 1);
        assert!((diag.word_coverage_ratio - 1.0).abs() < 1e-6);
    }

    #[test]
    fn empty_index_is_all_zero() {
        let index = TimingIndex::new(Vec::new(), Vec::new()).unwrap();
        let diag = TimingDiagnostics::compute(&index);
        assert_eq!(diag.total_duration_ms, 0);
        assert_eq!(diag.word_coverage_ratio, 0.0);
        assert!(diag.integrity_ok);
    }
}
