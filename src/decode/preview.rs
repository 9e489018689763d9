use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use log::{debug, info};

use crate::error::ThumbError;

/// Source of embedded previews for RAW containers.
///
/// Implementations may shell out, link a library or call a service; the
/// decoder only relies on this contract.
pub trait PreviewExtractor: Send + Sync {
    /// Bytes of the embedded full-size preview (usually a JPEG).
    ///
    /// Fails when no preview can be produced.
    fn extract_preview(&self, path: &Path) -> Result<Vec<u8>>;

    /// The textual orientation tag, e.g. `"Rotate 90 CW"`, if any.
    fn read_orientation(&self, path: &Path) -> Result<Option<String>>;
}

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Captured output of a finished subprocess.
struct ToolOutput {
    success: bool,
    stdout: Vec<u8>,
    stderr: String,
}

/// [`PreviewExtractor`] backed by the `exiftool` command-line tool.
#[derive(Debug, Clone)]
pub struct ExifToolExtractor {
    program: PathBuf,
    timeout: Duration,
}

impl ExifToolExtractor {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn subprocess_error(&self, path: &Path, stderr: impl Into<String>) -> ThumbError {
        ThumbError::Subprocess {
            program: self.program.display().to_string(),
            path: path.to_path_buf(),
            stderr: stderr.into(),
        }
    }

    /// Run the tool with `args` followed by `path`, killing it after the timeout.
    fn run(&self, args: &[&str], path: &Path) -> Result<ToolOutput> {
        let mut child = Command::new(&self.program)
            .args(args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.subprocess_error(path, format!("failed to start: {}", e)))?;

        // Drain both pipes concurrently so a chatty child never blocks on a full pipe
        let stdout_reader = child.stdout.take().map(|mut out| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                out.read_to_end(&mut buf).map(|_| buf)
            })
        });
        let stderr_reader = child.stderr.take().map(|mut err| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                err.read_to_end(&mut buf).map(|_| buf)
            })
        });

        let started = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if started.elapsed() >= self.timeout => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(self
                        .subprocess_error(
                            path,
                            format!("timed out after {}s", self.timeout.as_secs_f32()),
                        )
                        .into());
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    let _ = child.kill();
                    return Err(self
                        .subprocess_error(path, format!("failed to wait: {}", e))
                        .into());
                }
            }
        };

        let stdout = stdout_reader
            .and_then(|h| h.join().ok())
            .and_then(|r| r.ok())
            .unwrap_or_default();
        let stderr = stderr_reader
            .and_then(|h| h.join().ok())
            .and_then(|r| r.ok())
            .unwrap_or_default();

        Ok(ToolOutput {
            success: status.success(),
            stdout,
            stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
        })
    }
}

impl PreviewExtractor for ExifToolExtractor {
    fn extract_preview(&self, path: &Path) -> Result<Vec<u8>> {
        info!("Extracting preview from RAW: {}", path.display());
        let output = self.run(&["-PreviewImage", "-b"], path)?;

        if !output.success || output.stdout.is_empty() {
            let stderr = if output.stderr.is_empty() {
                "no PreviewImage found".to_string()
            } else {
                output.stderr
            };
            return Err(self.subprocess_error(path, stderr).into());
        }

        Ok(output.stdout)
    }

    fn read_orientation(&self, path: &Path) -> Result<Option<String>> {
        let output = self.run(&["-Orientation", "-s3"], path)?;
        if !output.success {
            debug!(
                "Orientation lookup failed for {}: {}",
                path.display(),
                output.stderr
            );
            return Ok(None);
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!text.is_empty()).then_some(text))
    }
}
