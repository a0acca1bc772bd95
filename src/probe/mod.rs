// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Audio duration probing.
//!
//! Durations are read by running `ffprobe` against a file and asking it for
//! nothing but the container level duration, printed as a bare number. Each
//! invocation is bounded by [`PROBE_TIMEOUT`]; a probe that runs longer is
//! killed and reported as a failure.
//!
//! The [`Prober`] trait is the seam the import pipeline depends on, so that
//! the worker pool can be driven by something other than a real process.

mod locate;

use std::{
    io::Read,
    path::PathBuf,
    process::{Child, Command, ExitStatus, Stdio},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use tracing::{debug, warn};

use crate::error::ProbeError;

/// Hard limit for a single `ffprobe` invocation.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Something that can determine the duration of an audio file in seconds.
pub trait Prober: Send + Sync {
    fn probe(&self, path: &str) -> Result<f64, ProbeError>;
}

/// A [`Prober`] backed by the external `ffprobe` executable.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    executable: Option<PathBuf>,
    timeout: Duration,
}

impl FfprobeProber {
    /// Creates a prober, optionally pinned to a specific executable.
    pub fn new(executable: Option<PathBuf>) -> Self {
        Self {
            executable,
            timeout: PROBE_TIMEOUT,
        }
    }

    #[cfg(test)]
    fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn spawn(&self, path: &str) -> Result<Child, ProbeError> {
        let executable = locate::resolve(self.executable.as_deref())?;

        debug!(executable = %executable.display(), path, "Running ffprobe");

        Command::new(&executable)
            .args(["-v", "error"])
            .args(["-show_entries", "format=duration"])
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| execution_failed(path, format!("failed to start {}: {e}", executable.display())))
    }
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Prober for FfprobeProber {
    fn probe(&self, path: &str) -> Result<f64, ProbeError> {
        let mut child = self.spawn(path)?;

        // Both pipes are drained while the child runs so a chatty ffprobe
        // cannot fill a pipe buffer and stall until the deadline.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = wait_with_timeout(&mut child, self.timeout)
            .map_err(|e| execution_failed(path, e.to_string()))?;

        // On timeout the readers are left behind: a grandchild may still hold
        // the pipes open, and they finish once it exits.
        let Some(status) = status else {
            warn!(path, timeout = ?self.timeout, "ffprobe timed out");
            return Err(execution_failed(path, format!("timed out after {:?}", self.timeout)));
        };

        let stdout = collect_output(stdout).map_err(|e| execution_failed(path, e.to_string()))?;

        if !status.success() {
            let stderr = collect_output(stderr).unwrap_or_default();
            return Err(execution_failed(
                path,
                format!("{status}: {}", stderr.trim()),
            ));
        }

        parse_duration(path, &stdout)
    }
}

/// Reads a child pipe to the end on its own thread.
fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<std::io::Result<String>> {
    thread::spawn(move || {
        let mut bytes = Vec::new();
        pipe.read_to_end(&mut bytes)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    })
}

fn collect_output(reader: Option<JoinHandle<std::io::Result<String>>>) -> std::io::Result<String> {
    match reader {
        Some(handle) => handle
            .join()
            .unwrap_or_else(|_| Err(std::io::Error::other("pipe reader panicked"))),
        None => Ok(String::new()),
    }
}

/// Waits for the child to exit, killing it once `timeout` has elapsed.
///
/// Returns `Ok(None)` if the child had to be killed.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> std::io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }

        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }

        thread::sleep(POLL_INTERVAL);
    }
}

/// Parses the textual output of `ffprobe` into a duration in seconds.
pub(crate) fn parse_duration(path: &str, output: &str) -> Result<f64, ProbeError> {
    let value = output.trim();
    if value.is_empty() {
        return Err(ProbeError::EmptyResult(path.to_string()));
    }

    match value.parse::<f64>() {
        Ok(duration) if duration.is_finite() && duration >= 0.0 => Ok(duration),
        _ => Err(ProbeError::MalformedDuration {
            path: path.to_string(),
            value: value.to_string(),
        }),
    }
}

fn execution_failed(path: &str, reason: String) -> ProbeError {
    ProbeError::ExecutionFailed {
        path: path.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trimmed_output() {
        assert_eq!(parse_duration("a.mp3", "180.500000\n").unwrap(), 180.5);
        assert_eq!(parse_duration("a.mp3", "  42 ").unwrap(), 42.0);
    }

    #[test]
    fn empty_output_is_empty_result() {
        assert!(matches!(
            parse_duration("a.mp3", " \n"),
            Err(ProbeError::EmptyResult(_))
        ));
    }

    #[test]
    fn garbage_output_is_malformed() {
        for output in ["N/A", "12,5", "-3.0", "inf"] {
            assert!(
                matches!(
                    parse_duration("a.mp3", output),
                    Err(ProbeError::MalformedDuration { .. })
                ),
                "{output:?} should be rejected"
            );
        }
    }

    #[cfg(unix)]
    mod process {
        use super::*;
        use std::{
            fs,
            os::unix::fs::PermissionsExt,
            path::Path,
            sync::{Mutex, MutexGuard},
        };
        use tempfile::TempDir;

        // Writing a script while another test thread forks can leave the
        // script open in the forked child, making exec fail with ETXTBSY.
        static SPAWN_LOCK: Mutex<()> = Mutex::new(());

        fn serial() -> MutexGuard<'static, ()> {
            SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner())
        }

        fn fake_ffprobe(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("ffprobe");
            fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[test]
        fn missing_executable_is_execution_failure() {
            let _guard = serial();
            let prober = FfprobeProber::new(Some(PathBuf::from("/nonexistent/ffprobe")));

            assert!(matches!(
                prober.probe("a.mp3"),
                Err(ProbeError::ExecutionFailed { .. })
            ));
        }

        #[test]
        fn reads_duration_from_process_output() {
            let _guard = serial();
            let dir = TempDir::new().unwrap();
            let exe = fake_ffprobe(dir.path(), "echo 195.250000");

            let prober = FfprobeProber::new(Some(exe));

            assert_eq!(prober.probe("/a/song3.mp3").unwrap(), 195.25);
        }

        #[test]
        fn passes_duration_only_arguments() {
            let _guard = serial();
            let dir = TempDir::new().unwrap();
            let exe = fake_ffprobe(
                dir.path(),
                r#"[ "$*" = "-v error -show_entries format=duration -of default=noprint_wrappers=1:nokey=1 /a/song.mp3" ] && echo 1.5 || exit 3"#,
            );

            let prober = FfprobeProber::new(Some(exe));

            assert_eq!(prober.probe("/a/song.mp3").unwrap(), 1.5);
        }

        #[test]
        fn non_zero_exit_is_execution_failure() {
            let _guard = serial();
            let dir = TempDir::new().unwrap();
            let exe = fake_ffprobe(dir.path(), "echo 'Invalid data found' >&2; exit 1");

            let prober = FfprobeProber::new(Some(exe));

            let err = prober.probe("/a/broken.mp3").unwrap_err();
            assert!(matches!(err, ProbeError::ExecutionFailed { ref reason, .. } if reason.contains("Invalid data")));
        }

        #[test]
        fn empty_output_from_process() {
            let _guard = serial();
            let dir = TempDir::new().unwrap();
            let exe = fake_ffprobe(dir.path(), "exit 0");

            let prober = FfprobeProber::new(Some(exe));

            assert!(matches!(
                prober.probe("/a/silent.mp3"),
                Err(ProbeError::EmptyResult(_))
            ));
        }

        #[test]
        fn large_diagnostic_output_does_not_stall() {
            let _guard = serial();
            let dir = TempDir::new().unwrap();
            let exe = fake_ffprobe(
                dir.path(),
                "head -c 200000 /dev/zero | tr '\\0' 'x' >&2; echo 12.5",
            );

            let prober = FfprobeProber::new(Some(exe)).with_timeout(Duration::from_secs(2));

            assert_eq!(prober.probe("/a/noisy.mp3").unwrap(), 12.5);
        }

        #[test]
        fn large_error_output_is_reported() {
            let _guard = serial();
            let dir = TempDir::new().unwrap();
            let exe = fake_ffprobe(
                dir.path(),
                "head -c 200000 /dev/zero | tr '\\0' 'e' >&2; exit 1",
            );

            let prober = FfprobeProber::new(Some(exe)).with_timeout(Duration::from_secs(2));

            let err = prober.probe("/a/damaged.mp3").unwrap_err();
            assert!(matches!(err, ProbeError::ExecutionFailed { ref reason, .. } if !reason.contains("timed out")));
        }

        #[test]
        fn slow_process_is_killed() {
            let _guard = serial();
            let dir = TempDir::new().unwrap();
            let exe = fake_ffprobe(dir.path(), "sleep 10; echo 1.0");

            let prober = FfprobeProber::new(Some(exe)).with_timeout(Duration::from_millis(200));

            let started = Instant::now();
            let err = prober.probe("/a/slow.mp3").unwrap_err();

            assert!(matches!(err, ProbeError::ExecutionFailed { .. }));
            assert!(started.elapsed() < Duration::from_secs(5));
        }
    }
}
