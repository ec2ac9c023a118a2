use crate::highlight::calculator::HighlightUpdate;

/// Receives highlight changes. Never called for unchanged frames.
pub trait HighlightListener: Send {
    fn highlight_changed(&mut self, update: &HighlightUpdate);
}

impl<F> HighlightListener for F
where
    F: FnMut(&HighlightUpdate) + Send,
{
    fn highlight_changed(&mut self, update: &HighlightUpdate) {
        (*self)(update)
    }
}
