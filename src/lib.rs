pub mod config;
pub mod error;
pub mod highlight;
pub mod ingest;
pub mod timing;
pub mod types;

pub use config::{DuplicateStartPolicy, EngineConfig};
pub use error::{ConfigError, DataIntegrityError, IngestError, LookupTableError};
pub use highlight::{HighlightCalculator, HighlightListener, HighlightUpdate, PlaybackSession};
pub use ingest::TimingDocument;
pub use timing::{
    CursorStats, PositionLookupTable, SearchStats, TimingDiagnostics, TimingIndex,
    WordsInSentence,
};
pub use types::{SentenceSpan, WordSpan};
