use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;

use crate::error::LookupTableError;
use crate::timing::index::TimingIndex;

pub const LOOKUP_TABLE_VERSION: &str = "1.0";

/// Precomputed `(word, sentence)` pairs sampled every `interval_ms` over
/// `[0, total]`.
///
/// Entries come from the index's own queries, so a table lookup always agrees
/// with [`TimingIndex`] at sampled instants. The closing sample at `total` is
/// always `(None, None)`, which keeps `position / interval` in bounds for a
/// position at the very end of the audio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionLookupTable {
    version: &'static str,
    interval: u64,
    total_duration_ms: u64,
    #[serde(serialize_with = "serialize_entries")]
    lookup: Vec<(Option<usize>, Option<usize>)>,
}

impl PositionLookupTable {
    pub fn build(index: &TimingIndex, interval_ms: u64) -> Result<Self, LookupTableError> {
        if interval_ms == 0 {
            return Err(LookupTableError::ZeroInterval);
        }
        let total = index.total_duration_ms();
        let lookup = (0..=total)
            .step_by(usize::try_from(interval_ms).unwrap_or(usize::MAX))
            .map(|t| {
                let t = i64::try_from(t).unwrap_or(i64::MAX);
                (
                    index.find_active_word_index(t),
                    index.find_active_sentence_index(t),
                )
            })
            .collect::<Vec<_>>();
        tracing::debug!(
            entries = lookup.len(),
            interval_ms,
            total_duration_ms = total,
            "lookup table: built"
        );
        Ok(Self {
            version: LOOKUP_TABLE_VERSION,
            interval: interval_ms,
            total_duration_ms: total,
            lookup,
        })
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// Entry for the sample at or before `time_ms`; `(None, None)` outside
    /// `[0, total)`.
    pub fn entry_at(&self, time_ms: i64) -> (Option<usize>, Option<usize>) {
        u64::try_from(time_ms)
            .ok()
            .filter(|&t| t < self.total_duration_ms)
            .and_then(|t| usize::try_from(t / self.interval).ok())
            .and_then(|slot| self.lookup.get(slot).copied())
            .unwrap_or((None, None))
    }

    /// Fraction of samples with an active word.
    pub fn word_coverage(&self) -> f32 {
        if self.lookup.is_empty() {
            return 0.0;
        }
        let active = self.lookup.iter().filter(|(w, _)| w.is_some()).count();
        active as f32 / self.lookup.len() as f32
    }
}

fn sentinel(index: Option<usize>) -> i64 {
    index.and_then(|i| i64::try_from(i).ok()).unwrap_or(-1)
}

fn serialize_entries<S: Serializer>(
    entries: &[(Option<usize>, Option<usize>)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(entries.len()))?;
    for &(word, sentence) in entries {
        seq.serialize_element(&[sentinel(word), sentinel(sentence)])?;
    }
    seq.end()
}
