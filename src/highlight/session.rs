use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::DataIntegrityError;
use crate::highlight::calculator::{HighlightCalculator, HighlightUpdate};
use crate::highlight::traits::HighlightListener;
use crate::ingest::TimingDocument;
use crate::timing::TimingIndex;
use crate::types::{SentenceSpan, WordSpan};

/// Owns the timing state of one player session: the index and calculator
/// for whichever learning object is currently loaded.
pub struct PlaybackSession {
    config: EngineConfig,
    calculator: Option<HighlightCalculator>,
    degraded: bool,
    listener: Option<Box<dyn HighlightListener>>,
}

impl PlaybackSession {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            calculator: None,
            degraded: false,
            listener: None,
        }
    }

    pub fn with_listener(mut self, listener: Box<dyn HighlightListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn set_listener(&mut self, listener: Option<Box<dyn HighlightListener>>) {
        self.listener = listener;
    }

    /// Replaces the loaded content. Invalid timings leave the session
    /// degraded: audio may keep playing but no highlights are produced.
    pub fn load(
        &mut self,
        words: Vec<WordSpan>,
        sentences: Vec<SentenceSpan>,
    ) -> Result<(), DataIntegrityError> {
        let built = TimingIndex::with_config(words, sentences, &self.config);
        self.install(built)
    }

    pub fn load_document(&mut self, document: TimingDocument) -> Result<(), DataIntegrityError> {
        let built = document.into_index(&self.config);
        self.install(built)
    }

    pub fn unload(&mut self) {
        self.calculator = None;
        self.degraded = false;
    }

    pub fn is_highlighting(&self) -> bool {
        self.calculator.is_some()
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn index(&self) -> Option<&Arc<TimingIndex>> {
        self.calculator.as_ref().map(HighlightCalculator::index)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Periodic position callback. `None` when nothing is highlighted.
    pub fn on_position(&mut self, position_ms: i64) -> Option<HighlightUpdate> {
        let update = self.calculator.as_mut()?.update_indices(position_ms);
        self.notify(&update);
        Some(update)
    }

    pub fn seek(&mut self, position_ms: i64) -> Option<HighlightUpdate> {
        let update = self.calculator.as_mut()?.seek(position_ms);
        self.notify(&update);
        Some(update)
    }

    fn install(
        &mut self,
        built: Result<TimingIndex, DataIntegrityError>,
    ) -> Result<(), DataIntegrityError> {
        match built {
            Ok(index) => {
                let index = Arc::new(index);
                match self.calculator.as_mut() {
                    Some(calculator) => calculator.rebind(index),
                    None => self.calculator = Some(HighlightCalculator::new(index)),
                }
                self.degraded = false;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "playback session: timing data rejected; continuing without highlighting"
                );
                self.calculator = None;
                self.degraded = true;
                Err(err)
            }
        }
    }

    fn notify(&mut self, update: &HighlightUpdate) {
        if !update.changed {
            return;
        }
        if let Some(listener) = self.listener.as_mut() {
            listener.highlight_changed(update);
        }
    }
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn valid_content() -> (Vec<WordSpan>, Vec<SentenceSpan>) {
        (
            vec![
                WordSpan::new("The", 0, 250, 0).unwrap(),
                WordSpan::new("quick", 250, 600, 0).unwrap(),
            ],
            vec![SentenceSpan::new("The quick", 0, 600, 0, 0, 1).unwrap()],
        )
    }

    fn gapped_content() -> (Vec<WordSpan>, Vec<SentenceSpan>) {
        (
            vec![
                WordSpan::new("a", 0, 500, 0).unwrap(),
                WordSpan::new("b", 1100, 1500, 1).unwrap(),
            ],
            vec![
                SentenceSpan::new("a", 0, 1000, 0, 0, 0).unwrap(),
                SentenceSpan::new("b", 1050, 2000, 1, 1, 1).unwrap(),
            ],
        )
    }

    #[test]
    fn nothing_loaded_yields_no_updates() {
        let mut session = PlaybackSession::default();
        assert!(!session.is_highlighting());
        assert_eq!(session.on_position(100), None);
        assert_eq!(session.seek(100), None);
    }

    #[test]
    fn listener_sees_only_changes() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut session = PlaybackSession::default().with_listener(Box::new(
            move |update: &HighlightUpdate| {
                sink.lock().unwrap().push((update.word_index, update.sentence_index));
            },
        ));
        let (words, sentences) = valid_content();
        session.load(words, sentences).unwrap();

        for t in (0..700).step_by(16) {
            session.on_position(t).unwrap();
        }
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(Some(0), Some(0)), (Some(1), Some(0)), (None, None)]
        );
    }

    #[test]
    fn rejected_content_degrades_session() {
        let mut session = PlaybackSession::default();
        let (words, sentences) = valid_content();
        session.load(words, sentences).unwrap();
        assert!(session.on_position(100).is_some());

        let (words, sentences) = gapped_content();
        assert!(matches!(
            session.load(words, sentences),
            Err(DataIntegrityError::SentenceGap { .. })
        ));
        assert!(session.is_degraded());
        assert!(!session.is_highlighting());
        assert_eq!(session.on_position(100), None);
    }

    #[test]
    fn reload_resets_highlight_state() {
        let mut session = PlaybackSession::default();
        let (words, sentences) = valid_content();
        session.load(words.clone(), sentences.clone()).unwrap();
        let first = session.on_position(300).unwrap();
        assert!(first.changed);

        session.load(words, sentences).unwrap();
        let after_reload = session.on_position(300).unwrap();
        assert!(after_reload.changed);
        assert_eq!(after_reload.word_index, Some(1));
    }

    #[test]
    fn unload_clears_everything() {
        let mut session = PlaybackSession::default();
        let (words, sentences) = gapped_content();
        let _ = session.load(words, sentences);
        assert!(session.is_degraded());
        session.unload();
        assert!(!session.is_degraded());
        assert!(session.index().is_none());
    }

    #[test]
    fn load_document_uses_session_config() {
        let json = r#"{"words": [
            {"word": "a", "start_ms": 0, "end_ms": 100, "sentence_index": 0},
            {"word": "b", "start_ms": 0, "end_ms": 200, "sentence_index": 0}
        ], "sentences": [
            {"text": "a b", "start_ms": 0, "end_ms": 200, "word_start_index": 0, "word_end_index": 1}
        ]}"#;
        let strict = EngineConfig {
            duplicate_start_policy: crate::config::DuplicateStartPolicy::Reject,
            ..EngineConfig::default()
        };
        let mut session = PlaybackSession::new(strict);
        let doc = TimingDocument::from_json_str(json).unwrap();
        assert!(session.load_document(doc.clone()).is_err());

        let mut lenient = PlaybackSession::default();
        lenient.load_document(doc).unwrap();
        assert_eq!(lenient.seek(150).unwrap().word_index, Some(1));
    }
}
