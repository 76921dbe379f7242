//! FFmpeg command builder and runner.
//!
//! Commands are plain argument lists ([`Invocation`]) handed to a
//! [`MediaRunner`]. The production runner spawns the real binaries; tests
//! substitute a scripted runner so composition logic can be exercised without
//! FFmpeg installed.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// External media tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Ffmpeg,
    Ffprobe,
}

impl Tool {
    /// Binary name looked up in `PATH`.
    pub fn binary(&self) -> &'static str {
        match self {
            Tool::Ffmpeg => "ffmpeg",
            Tool::Ffprobe => "ffprobe",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tool::Ffmpeg => write!(f, "FFmpeg"),
            Tool::Ffprobe => write!(f, "FFprobe"),
        }
    }
}

/// A fully built tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub tool: Tool,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(tool: Tool, args: Vec<String>) -> Self {
        Self { tool, args }
    }

    /// True if `flag` is immediately followed by `value` in the argument list.
    pub fn has_arg_pair(&self, flag: &str, value: &str) -> bool {
        self.args
            .windows(2)
            .any(|pair| pair[0] == flag && pair[1] == value)
    }

    /// Value following the first occurrence of `flag`.
    pub fn arg_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|idx| self.args.get(idx + 1))
            .map(String::as_str)
    }

    /// Last argument, which is the output path for FFmpeg commands.
    pub fn output_path(&self) -> Option<&Path> {
        self.args.last().map(Path::new)
    }

    /// Paths passed with `-i`, in order.
    pub fn input_paths(&self) -> Vec<&str> {
        self.args
            .windows(2)
            .filter(|pair| pair[0] == "-i")
            .map(|pair| pair[1].as_str())
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tool.binary(), self.args.join(" "))
    }
}

/// Captured output of a successful tool run.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    pub fn from_stdout(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: Vec::new(),
        }
    }
}

/// Executes media tool invocations.
///
/// Non-zero exit must be reported as [`MediaError::ToolFailed`].
#[async_trait]
pub trait MediaRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> MediaResult<ToolOutput>;
}

/// One `-i` input with the options that precede it.
#[derive(Debug, Clone)]
struct CommandInput {
    args: Vec<String>,
    path: PathBuf,
}

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Inputs in `-i` order
    inputs: Vec<CommandInput>,
    /// Output file path
    output: PathBuf,
    /// Output arguments (after all inputs)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command with a single input.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self::without_inputs(output).input(input)
    }

    /// Create a command with no inputs yet; add them with [`Self::input`].
    pub fn without_inputs(output: impl AsRef<Path>) -> Self {
        Self {
            inputs: Vec::new(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Append an input file.
    pub fn input(mut self, path: impl AsRef<Path>) -> Self {
        self.inputs.push(CommandInput {
            args: Vec::new(),
            path: path.as_ref().to_path_buf(),
        });
        self
    }

    /// Add an input argument to the most recently added input (before its -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        if let Some(last) = self.inputs.last_mut() {
            last.args.push(arg.into());
        }
        self
    }

    /// Add output arguments (after every -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Output-side start position.
    pub fn start_at(self, seconds: f64) -> Self {
        self.output_arg("-ss").output_arg(format_seconds(seconds))
    }

    /// Output-side end position.
    pub fn end_at(self, seconds: f64) -> Self {
        self.output_arg("-to").output_arg(format_seconds(seconds))
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Set filter complex.
    pub fn filter_complex(self, filter: impl Into<String>) -> Self {
        self.output_arg("-filter_complex").output_arg(filter)
    }

    /// Map a stream specifier or filter label into the output.
    pub fn map(self, stream: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(stream)
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Copy every stream without re-encoding.
    pub fn codec_copy(self) -> Self {
        self.output_arg("-c").output_arg("copy")
    }

    /// Stop at the end of the shortest stream.
    pub fn shortest(self) -> Self {
        self.output_arg("-shortest")
    }

    /// JPEG quality scale for image outputs (2 is high quality).
    pub fn image_quality(self, q: u8) -> Self {
        self.output_arg("-q:v").output_arg(q.to_string())
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Output file path.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        for input in &self.inputs {
            args.extend(input.args.iter().cloned());
            args.push("-i".to_string());
            args.push(input.path.to_string_lossy().to_string());
        }

        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().to_string());

        args
    }

    /// Build the invocation handed to a [`MediaRunner`].
    pub fn invocation(&self) -> Invocation {
        Invocation::new(Tool::Ffmpeg, self.build_args())
    }

    /// Run this command.
    pub async fn run(&self, runner: &dyn MediaRunner) -> MediaResult<ToolOutput> {
        runner.run(&self.invocation()).await
    }
}

/// Format seconds the way every command in this crate passes them.
pub fn format_seconds(seconds: f64) -> String {
    format!("{:.3}", seconds)
}

/// Runner that spawns the real binaries.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    /// Timeout in seconds
    timeout_secs: Option<u64>,
}

impl ProcessRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self { timeout_secs: None }
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

#[async_trait]
impl MediaRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> MediaResult<ToolOutput> {
        let tool = invocation.tool;
        which::which(tool.binary()).map_err(|_| MediaError::ToolNotFound(tool))?;

        debug!("Running {}", invocation);

        let child = Command::new(tool.binary())
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match self.timeout_secs {
            Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), child).await {
                Ok(result) => result?,
                Err(_) => {
                    // Dropping the future kills the process.
                    warn!("{} timed out after {} seconds, killing process", tool, secs);
                    return Err(MediaError::Timeout(secs));
                }
            },
            None => child.await?,
        };

        if output.status.success() {
            Ok(ToolOutput {
                stdout: output.stdout,
                stderr: output.stderr,
            })
        } else {
            Err(MediaError::tool_failed(
                tool,
                format!("{} exited with non-zero status", tool.binary()),
                Some(String::from_utf8_lossy(&output.stderr).to_string()),
                output.status.code(),
            ))
        }
    }
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::ToolNotFound(Tool::Ffmpeg))
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::ToolNotFound(Tool::Ffprobe))
}
