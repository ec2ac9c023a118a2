//! Property-based tests for timing index queries.

use proptest::prelude::*;
use narration_sync::{DataIntegrityError, SentenceSpan, TimingIndex, WordSpan};

// =============================================================================
// Test helpers
// =============================================================================

/// Per sentence: (gap before word, word duration) pairs and a trailing pause.
type Layout = Vec<(Vec<(u64, u64)>, u64)>;

fn arbitrary_layout(min_word_ms: u64) -> impl Strategy<Value = Layout> {
    prop::collection::vec(
        (
            prop::collection::vec((0u64..200, min_word_ms..300), 1..6),
            0u64..400,
        ),
        0..6,
    )
}

fn build(layout: &Layout) -> (Vec<WordSpan>, Vec<SentenceSpan>) {
    let mut words = Vec::new();
    let mut sentences = Vec::new();
    let mut cursor = 0u64;
    for (sentence_index, (word_layout, trailing)) in layout.iter().enumerate() {
        let sentence_start = cursor;
        let first_word = words.len();
        for &(gap, duration) in word_layout {
            let start = cursor + gap;
            let end = start + duration;
            words.push(WordSpan::new(format!("w{}", words.len()), start, end, sentence_index).unwrap());
            cursor = end;
        }
        cursor += trailing;
        sentences.push(
            SentenceSpan::new(
                format!("s{sentence_index}"),
                sentence_start,
                cursor,
                sentence_index,
                first_word,
                words.len() - 1,
            )
            .unwrap(),
        );
    }
    (words, sentences)
}

/// Words with distinct, sorted starts whose ends may run into the next word.
fn arbitrary_loose_words() -> impl Strategy<Value = Vec<(u64, u64)>> {
    prop::collection::vec((0u64..2000, 1u64..300), 1..12).prop_map(|mut raw| {
        raw.sort_unstable();
        raw.dedup_by_key(|(start, _)| *start);
        raw
    })
}

fn brute_force_word(words: &[WordSpan], t: i64) -> Option<usize> {
    words.iter().position(|w| w.is_active_at(t))
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn sentences_partition_the_duration(layout in arbitrary_layout(0)) {
        let (words, sentences) = build(&layout);
        let index = TimingIndex::new(words, sentences).unwrap();
        for pair in index.sentences().windows(2) {
            prop_assert_eq!(pair[1].start_ms(), pair[0].end_ms());
        }
        let total = index.total_duration_ms() as i64;
        for t in (0..total).step_by(5) {
            let found = index.find_active_sentence_index(t);
            prop_assert!(found.is_some(), "no sentence at {}", t);
            prop_assert!(index.sentences()[found.unwrap()].is_active_at(t));
        }
        prop_assert_eq!(index.find_active_sentence_index(total), None);
        prop_assert_eq!(index.find_active_sentence_index(-1), None);
    }

    #[test]
    fn every_instant_has_a_single_owner(layout in arbitrary_layout(0)) {
        let (words, sentences) = build(&layout);
        let index = TimingIndex::new(words.clone(), sentences).unwrap();
        for (i, w) in words.iter().enumerate() {
            if w.duration_ms() == 0 {
                continue;
            }
            let (start, end) = (w.start_ms() as i64, w.end_ms() as i64);
            for t in [start, (start + end) / 2, end - 1] {
                prop_assert_eq!(index.find_active_word_index(t), Some(i));
            }
        }
        let total = index.total_duration_ms() as i64;
        for t in (-3..total + 20).step_by(3) {
            prop_assert_eq!(index.find_active_word_index(t), brute_force_word(&words, t));
        }
    }

    #[test]
    fn warm_and_cold_queries_agree(
        layout in arbitrary_layout(0),
        probes in prop::collection::vec(-50i64..3000, 1..80),
    ) {
        let (words, sentences) = build(&layout);
        let index = TimingIndex::new(words, sentences).unwrap();
        for t in probes {
            let warm_word = index.find_active_word_index(t);
            let warm_sentence = index.find_active_sentence_index(t);
            prop_assert_eq!(warm_word, index.find_active_word_index_cold(t));
            prop_assert_eq!(warm_sentence, index.find_active_sentence_index_cold(t));
            // Idempotent regardless of what the cursor now holds.
            prop_assert_eq!(warm_word, index.find_active_word_index(t));
        }
    }

    #[test]
    fn words_in_sentence_matches_sentence_index(layout in arbitrary_layout(0)) {
        let (words, sentences) = build(&layout);
        let index = TimingIndex::new(words.clone(), sentences).unwrap();
        for s in 0..index.sentence_count() {
            let expected: Vec<&WordSpan> = words.iter().filter(|w| w.sentence_index() == s).collect();
            let actual: Vec<&WordSpan> = index.words_in_sentence(s).collect();
            prop_assert_eq!(&actual, &expected);
            prop_assert!(actual.windows(2).all(|p| p[0].start_ms() <= p[1].start_ms()));
        }
    }

    #[test]
    fn range_query_matches_brute_force(
        layout in arbitrary_layout(1),
        from in -100i64..2500,
        len in 0i64..800,
    ) {
        let (words, sentences) = build(&layout);
        let index = TimingIndex::new(words.clone(), sentences).unwrap();
        let to = from + len;
        let expected: Vec<usize> = words
            .iter()
            .enumerate()
            .filter(|(_, w)| {
                to > from && (w.start_ms() as i64) < to && (w.end_ms() as i64) > from.max(0)
            })
            .map(|(i, _)| i)
            .collect();
        let actual: Vec<usize> = index.word_indices_in_range(from, to).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn accepted_words_own_their_whole_span(raw in arbitrary_loose_words()) {
        let words: Vec<WordSpan> = raw
            .iter()
            .enumerate()
            .map(|(i, &(start, duration))| {
                WordSpan::new(format!("w{i}"), start, start + duration, 0).unwrap()
            })
            .collect();
        let end = words.iter().map(WordSpan::end_ms).max().unwrap_or(0);
        let sentences = vec![SentenceSpan::new("all", 0, end, 0, 0, words.len() - 1).unwrap()];
        let overlapping = words.windows(2).any(|p| p[0].end_ms() > p[1].start_ms());

        match TimingIndex::new(words.clone(), sentences) {
            Err(err) => {
                prop_assert!(overlapping);
                let is_overlap = matches!(err, DataIntegrityError::OverlappingWords { .. });
                prop_assert!(is_overlap, "unexpected error {:?}", err);
            }
            Ok(index) => {
                prop_assert!(!overlapping);
                for (i, w) in words.iter().enumerate() {
                    let (start, end) = (w.start_ms() as i64, w.end_ms() as i64);
                    for t in [start, (start + end) / 2, end - 1] {
                        prop_assert_eq!(index.find_active_word_index(t), Some(i));
                        prop_assert!(index.word_indices_in_range(t, t + 1).contains(&i));
                    }
                }
            }
        }
    }

    #[test]
    fn steady_playback_needs_one_binary_search(layout in arbitrary_layout(20)) {
        let (words, sentences) = build(&layout);
        let index = TimingIndex::new(words, sentences).unwrap();
        let total = index.total_duration_ms() as i64;
        for t in (0..total).step_by(16) {
            index.find_active_word_index(t);
        }
        prop_assert!(index.search_stats().words.full_searches <= 1);
    }
}
