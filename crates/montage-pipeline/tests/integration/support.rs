//! Fakes shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use montage_ledger::{LedgerError, LedgerResult, RecordReceipt, VideoLedger, VideoRecord};
use montage_media::{Invocation, MediaError, MediaResult, MediaRunner, Tool, ToolOutput};
use montage_models::{Interval, IntervalEnvelope, JobId, SourceRef};
use montage_pipeline::{PipelineConfig, PipelineContext};
use montage_services::{
    AudioFormat, DetectedLabel, Detector, ServiceError, ServiceResult, SpeechSynthesizer,
    TextGenerator,
};
use montage_storage::MemoryStore;

pub const BUCKET: &str = "uploads";
pub const EMAIL: &str = "player@example.com";
pub const VIDEO_KEY: &str = "player@example.com/ranked/match.mp4";
pub const MONTAGE_KEY: &str = "player@example.com/output/match_montage.mp4";
pub const MODEL_REF: &str = "model-v3";
pub const COMMENTARY: &str = "Huge play!";

/// What a media invocation does, recognised from its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    StreamProbe,
    DurationProbe,
    Frames,
    Trim,
    Overlay,
    Crossfade,
    ConcatCopy,
    ConcatReencode,
    Mix,
    Other,
}

impl Step {
    pub fn of(invocation: &Invocation) -> Self {
        let args = &invocation.args;
        if invocation.tool == Tool::Ffprobe {
            return if args.iter().any(|a| a.starts_with("stream=")) {
                Step::StreamProbe
            } else {
                Step::DurationProbe
            };
        }

        let filter = invocation.arg_value("-filter_complex").unwrap_or_default();
        let output = invocation
            .output_path()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();

        if output.contains("%04d") {
            Step::Frames
        } else if invocation.has_arg_pair("-f", "concat") {
            if invocation.has_arg_pair("-c", "copy") {
                Step::ConcatCopy
            } else {
                Step::ConcatReencode
            }
        } else if filter.contains("xfade") {
            Step::Crossfade
        } else if filter.contains("amix") {
            Step::Mix
        } else if invocation.has_arg_pair("-map", "1:a:0") {
            Step::Overlay
        } else if invocation.args.iter().any(|a| a == "-ss") {
            Step::Trim
        } else {
            Step::Other
        }
    }
}

/// One recorded media invocation.
#[derive(Debug, Clone)]
pub struct Call {
    pub step: Step,
    pub invocation: Invocation,
    /// Concat manifest contents, captured before the runner removes it
    pub manifest: Option<String>,
}

/// Media runner that answers probes and writes placeholder outputs.
///
/// Every written output contains its own file name, so tests can tell which
/// intermediate file ended up published.
pub struct ScriptedRunner {
    calls: Mutex<Vec<Call>>,
    failures: Mutex<Vec<(Step, Option<String>)>>,
    durations: Mutex<HashMap<String, f64>>,
    frame_count: usize,
    default_duration: f64,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(Vec::new()),
            durations: Mutex::new(HashMap::new()),
            frame_count: 12,
            default_duration: 6.0,
        }
    }

    /// Fail every invocation of `step`.
    pub fn fail(&self, step: Step) {
        self.failures.lock().unwrap().push((step, None));
    }

    /// Fail `step` only when it writes `file_name`.
    pub fn fail_output(&self, step: Step, file_name: &str) {
        self.failures
            .lock()
            .unwrap()
            .push((step, Some(file_name.to_string())));
    }

    /// Duration reported for the file named `file_name`.
    pub fn set_duration(&self, file_name: &str, secs: f64) {
        self.durations
            .lock()
            .unwrap()
            .insert(file_name.to_string(), secs);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_of(&self, step: Step) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.step == step)
            .collect()
    }

    fn should_fail(&self, step: Step, output: Option<&str>) -> bool {
        self.failures
            .lock()
            .unwrap()
            .iter()
            .any(|(s, name)| *s == step && (name.is_none() || name.as_deref() == output))
    }

    fn duration_of(&self, path: &str) -> f64 {
        let name = file_name(Path::new(path));
        self.durations
            .lock()
            .unwrap()
            .get(&name)
            .copied()
            .unwrap_or(self.default_duration)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[async_trait]
impl MediaRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation) -> MediaResult<ToolOutput> {
        let step = Step::of(invocation);
        let output = invocation.output_path().map(Path::to_path_buf);
        let output_name = output.as_deref().map(file_name);

        let manifest = match step {
            Step::ConcatCopy | Step::ConcatReencode => invocation
                .input_paths()
                .first()
                .and_then(|p| std::fs::read_to_string(p).ok()),
            _ => None,
        };

        self.calls.lock().unwrap().push(Call {
            step,
            invocation: invocation.clone(),
            manifest,
        });

        if self.should_fail(step, output_name.as_deref()) {
            return Err(MediaError::tool_failed(
                invocation.tool,
                format!("scripted {:?} failure", step),
                Some("scripted".to_string()),
                Some(1),
            ));
        }

        match step {
            Step::StreamProbe => Ok(ToolOutput::from_stdout(
                format!(
                    r#"{{"streams":[{{"r_frame_rate":"30/1","duration":"{}"}}]}}"#,
                    self.frame_count
                )
                .into_bytes(),
            )),
            Step::DurationProbe => {
                let path = invocation.args.last().cloned().unwrap_or_default();
                Ok(ToolOutput::from_stdout(
                    format!(r#"{{"format":{{"duration":"{}"}}}}"#, self.duration_of(&path))
                        .into_bytes(),
                ))
            }
            Step::Frames => {
                let dir = output
                    .as_deref()
                    .and_then(Path::parent)
                    .expect("frame pattern has a directory");
                for n in 1..=self.frame_count {
                    std::fs::write(
                        dir.join(format!("frame_{:04}.jpg", n)),
                        format!("frame-{}", n - 1),
                    )?;
                }
                Ok(ToolOutput::default())
            }
            _ => {
                if let Some(output) = output {
                    std::fs::write(&output, file_name(&output))?;
                }
                Ok(ToolOutput::default())
            }
        }
    }
}

/// Detector that reports the sentinel on chosen seconds.
///
/// Frames carry their second as `frame-{n}`.
#[derive(Default)]
pub struct StubDetector {
    hits: Mutex<Vec<usize>>,
    failing: Mutex<Vec<usize>>,
    model_refs: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl StubDetector {
    pub fn set_hits(&self, seconds: &[usize]) {
        *self.hits.lock().unwrap() = seconds.to_vec();
    }

    pub fn fail_frame(&self, second: usize) {
        self.failing.lock().unwrap().push(second);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn model_refs(&self) -> Vec<String> {
        self.model_refs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Detector for StubDetector {
    async fn detect(
        &self,
        image: &[u8],
        model_ref: &str,
        _min_confidence: f32,
    ) -> ServiceResult<Vec<DetectedLabel>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.model_refs.lock().unwrap().push(model_ref.to_string());

        let second: usize = std::str::from_utf8(image)
            .ok()
            .and_then(|s| s.strip_prefix("frame-"))
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| ServiceError::InvalidResponse("unexpected frame".to_string()))?;

        if self.failing.lock().unwrap().contains(&second) {
            return Err(ServiceError::ServiceUnavailable {
                status: 503,
                body: "overloaded".to_string(),
            });
        }

        if self.hits.lock().unwrap().contains(&second) {
            Ok(vec![
                DetectedLabel::new("Kill", 92.0),
                DetectedLabel::new("Spike", 99.0),
            ])
        } else {
            Ok(vec![DetectedLabel::new("kill", 30.0)])
        }
    }
}

/// Text generator with a canned quoted reply.
#[derive(Default)]
pub struct StubText {
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl StubText {
    pub fn fail(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for StubText {
    async fn generate(&self, _prompt: &str, _max_tokens: u32, _temperature: f32) -> ServiceResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ServiceError::ServiceUnavailable {
                status: 502,
                body: "bad gateway".to_string(),
            });
        }
        Ok(format!("\"{}\"", COMMENTARY))
    }
}

/// Speech synthesizer that can fail chosen calls (0-based).
#[derive(Default)]
pub struct StubSpeech {
    failing_calls: Mutex<Vec<usize>>,
    voices: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl StubSpeech {
    pub fn fail_call(&self, call: usize) {
        self.failing_calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn voices(&self) -> Vec<String> {
        self.voices.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for StubSpeech {
    async fn synthesize(&self, _text: &str, voice: &str, _format: AudioFormat) -> ServiceResult<Vec<u8>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.voices.lock().unwrap().push(voice.to_string());
        if self.failing_calls.lock().unwrap().contains(&call) {
            return Err(ServiceError::RequestFailed {
                status: 400,
                body: "text too long".to_string(),
            });
        }
        Ok(b"ID3 narration".to_vec())
    }
}

/// Ledger that keeps every record it accepts.
#[derive(Default)]
pub struct RecordingLedger {
    records: Mutex<Vec<VideoRecord>>,
    fail: AtomicBool,
    attempts: AtomicUsize,
}

impl RecordingLedger {
    pub fn fail(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<VideoRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoLedger for RecordingLedger {
    async fn create_video_record(&self, record: &VideoRecord) -> LedgerResult<RecordReceipt> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable {
                status: 503,
                message: "ledger down".to_string(),
            });
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(RecordReceipt {
            video_id: format!("vid-{}", attempt + 1),
        })
    }
}

/// All fakes plus a private work directory.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub media: Arc<ScriptedRunner>,
    pub detector: Arc<StubDetector>,
    pub text: Arc<StubText>,
    pub speech: Arc<StubSpeech>,
    pub ledger: Arc<RecordingLedger>,
    work: TempDir,
}

impl Harness {
    /// Fakes with the source video already uploaded.
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        store.insert(BUCKET, VIDEO_KEY, b"source video".to_vec());

        Self {
            store,
            media: Arc::new(ScriptedRunner::new()),
            detector: Arc::new(StubDetector::default()),
            text: Arc::new(StubText::default()),
            speech: Arc::new(StubSpeech::default()),
            ledger: Arc::new(RecordingLedger::default()),
            work: TempDir::new().unwrap(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        self.work.path()
    }

    pub fn config(&self) -> PipelineConfig {
        PipelineConfig {
            work_dir: self.work.path().to_path_buf(),
            media_timeout: None,
            ..PipelineConfig::default()
        }
    }

    pub fn context(&self) -> PipelineContext {
        self.context_with(|_| {})
    }

    pub fn context_with(&self, adjust: impl FnOnce(&mut PipelineConfig)) -> PipelineContext {
        let mut config = self.config();
        adjust(&mut config);

        PipelineContext::new(
            config,
            self.store.clone(),
            self.media.clone(),
            self.detector.clone(),
            self.text.clone(),
            self.speech.clone(),
        )
        .with_ledger(self.ledger.clone())
    }

    /// Add a background track under the default music prefix.
    pub fn add_track(&self, name: &str) {
        self.store
            .insert(BUCKET, &format!("music/{}", name), b"track".to_vec());
    }

    /// Whether every scratch directory has been removed.
    pub fn scratch_is_clean(&self) -> bool {
        std::fs::read_dir(self.work.path())
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(true)
    }
}

pub fn source() -> SourceRef {
    SourceRef::new(BUCKET, VIDEO_KEY, EMAIL)
}

pub fn intervals(spans: &[(f64, f64)]) -> IntervalEnvelope {
    IntervalEnvelope::new(
        source(),
        Some(JobId::from_string("run-42")),
        spans.iter().map(|&(s, e)| Interval::new(s, e)).collect(),
    )
}
