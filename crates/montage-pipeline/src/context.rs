//! Collaborators shared by the stages.

use std::sync::Arc;

use montage_ledger::VideoLedger;
use montage_media::MediaRunner;
use montage_services::{Detector, SpeechSynthesizer, TextGenerator};
use montage_storage::ObjectStore;

use crate::config::PipelineConfig;

/// Everything a stage needs besides its input envelope.
#[derive(Clone)]
pub struct PipelineContext {
    pub config: PipelineConfig,
    pub store: Arc<dyn ObjectStore>,
    pub media: Arc<dyn MediaRunner>,
    pub detector: Arc<dyn Detector>,
    pub text: Arc<dyn TextGenerator>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    /// Ledger to record published montages in, if one is configured
    pub ledger: Option<Arc<dyn VideoLedger>>,
}

impl PipelineContext {
    pub fn new(
        config: PipelineConfig,
        store: Arc<dyn ObjectStore>,
        media: Arc<dyn MediaRunner>,
        detector: Arc<dyn Detector>,
        text: Arc<dyn TextGenerator>,
        speech: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            config,
            store,
            media,
            detector,
            text,
            speech,
            ledger: None,
        }
    }

    pub fn with_ledger(mut self, ledger: Arc<dyn VideoLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }
}
