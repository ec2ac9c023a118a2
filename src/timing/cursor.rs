use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use serde::Serialize;

/// Single-slot locality cache over a start-sorted sequence.
///
/// The slot remembers the last resolved bracket, i.e. the index `c` with
/// `start(c) <= t < start(c + 1)`. A probe only accepts a candidate that
/// satisfies that bracket exactly, and the bracket is unique for a given `t`,
/// so a stale or raced slot can cost a binary search but never change an answer.
#[derive(Debug)]
pub(crate) struct LocalityCursor {
    slot: AtomicUsize,
    full_searches: AtomicU64,
    cursor_hits: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CursorStats {
    pub full_searches: u64,
    pub cursor_hits: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub words: CursorStats,
    pub sentences: CursorStats,
}

impl LocalityCursor {
    const EMPTY: usize = usize::MAX;

    pub(crate) fn new() -> Self {
        Self {
            slot: AtomicUsize::new(Self::EMPTY),
            full_searches: AtomicU64::new(0),
            cursor_hits: AtomicU64::new(0),
        }
    }

    /// Last index whose start is `<= t`, trying the cached slot and up to
    /// `probe_span` neighbours on each side before a full binary search.
    pub(crate) fn bracket<T>(
        &self,
        items: &[T],
        t: u64,
        probe_span: usize,
        start: impl Fn(&T) -> u64,
    ) -> Option<usize> {
        // Lead-in before the first start has no bracket.
        if items.first().is_some_and(|first| t < start(first)) {
            self.cursor_hits.fetch_add(1, Ordering::Relaxed);
            return None;
        }
        let cached = self.slot.load(Ordering::Relaxed);
        if cached < items.len() {
            let hi = cached.saturating_add(probe_span).min(items.len() - 1);
            let lo = cached.saturating_sub(probe_span);
            // Forward first: playback mostly advances.
            let found = (cached..=hi)
                .chain((lo..cached).rev())
                .find(|&c| brackets(items, c, t, &start));
            if let Some(c) = found {
                self.cursor_hits.fetch_add(1, Ordering::Relaxed);
                self.slot.store(c, Ordering::Relaxed);
                return Some(c);
            }
        }
        self.bracket_cold(items, t, start)
    }

    /// Full binary search that ignores the slot and then re-seeds it.
    pub(crate) fn bracket_cold<T>(
        &self,
        items: &[T],
        t: u64,
        start: impl Fn(&T) -> u64,
    ) -> Option<usize> {
        self.full_searches.fetch_add(1, Ordering::Relaxed);
        let found = last_at_or_before(items, t, start);
        self.slot
            .store(found.unwrap_or(Self::EMPTY), Ordering::Relaxed);
        found
    }

    pub(crate) fn stats(&self) -> CursorStats {
        CursorStats {
            full_searches: self.full_searches.load(Ordering::Relaxed),
            cursor_hits: self.cursor_hits.load(Ordering::Relaxed),
        }
    }
}

pub(crate) fn last_at_or_before<T>(
    items: &[T],
    t: u64,
    start: impl Fn(&T) -> u64,
) -> Option<usize> {
    items.partition_point(|item| start(item) <= t).checked_sub(1)
}

fn brackets<T>(items: &[T], c: usize, t: u64, start: &impl Fn(&T) -> u64) -> bool {
    start(&items[c]) <= t && items.get(c + 1).is_none_or(|next| start(next) > t)
}
