//! Structured stage logging.

use tracing::{error, info, warn, Span};

use montage_models::JobId;

/// Placeholder job id for runs triggered without one.
const UNKNOWN_JOB: &str = "-";

/// Logger carrying the job id and stage name on every event.
#[derive(Debug, Clone)]
pub struct StageLogger {
    job_id: String,
    stage: &'static str,
}

impl StageLogger {
    pub fn new(job_id: Option<&JobId>, stage: &'static str) -> Self {
        Self {
            job_id: job_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| UNKNOWN_JOB.to_string()),
            stage,
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(job_id = %self.job_id, stage = self.stage, "Stage started: {}", message);
    }

    pub fn log_progress(&self, message: &str) {
        info!(job_id = %self.job_id, stage = self.stage, "Stage progress: {}", message);
    }

    pub fn log_warning(&self, message: &str) {
        warn!(job_id = %self.job_id, stage = self.stage, "Stage warning: {}", message);
    }

    pub fn log_error(&self, message: &str) {
        error!(job_id = %self.job_id, stage = self.stage, "Stage error: {}", message);
    }

    pub fn log_completion(&self, message: &str) {
        info!(job_id = %self.job_id, stage = self.stage, "Stage completed: {}", message);
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn stage(&self) -> &'static str {
        self.stage
    }

    /// Span for instrumenting the stage body.
    pub fn span(&self) -> Span {
        tracing::info_span!("stage", job_id = %self.job_id, stage = self.stage)
    }
}
