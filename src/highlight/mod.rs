pub mod calculator;
pub mod session;
pub mod traits;

pub use calculator::{HighlightCalculator, HighlightUpdate};
pub use session::PlaybackSession;
pub use traits::HighlightListener;
