mod cursor;
pub mod diagnostics;
pub mod index;
pub mod lookup_table;
mod validation;

pub use cursor::{CursorStats, SearchStats};
pub use diagnostics::TimingDiagnostics;
pub use index::{TimingIndex, WordsInSentence};
pub use lookup_table::PositionLookupTable;
