//! Reservoir simulator run as an external process.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use rf_model::Model;
use tracing::{info, warn};

use crate::error::{SimError, SimResult};
use crate::exchange::{ControlSnapshot, WellStreamsFile, ensure_folder, read_json, write_json};
use crate::simulator::ReservoirSimulator;

pub const CONTROLS_FILE: &str = "well_controls.json";
pub const STREAMS_FILE: &str = "well_streams.json";

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Writes `well_controls.json`, runs `command args..` inside the folder and
/// reads `well_streams.json` back.
#[derive(Debug, Clone)]
pub struct ExternalSimulator {
    folder: PathBuf,
    command: String,
    args: Vec<String>,
    timeout: Duration,
    launches: usize,
}

impl ExternalSimulator {
    pub fn new(folder: impl Into<PathBuf>, command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            folder: folder.into(),
            command: command.into(),
            args,
            timeout: Duration::from_secs(3600),
            launches: 0,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl ReservoirSimulator for ExternalSimulator {
    fn name(&self) -> &str {
        &self.command
    }

    fn folder(&self) -> &Path {
        &self.folder
    }

    fn generate_input_files(&mut self, model: &Model) -> SimResult<()> {
        ensure_folder(&self.folder)?;
        let snapshot = ControlSnapshot::from_model(model)?;
        write_json(&self.folder.join(CONTROLS_FILE), &snapshot)?;
        // A stale result must never be read back after a failed run.
        let streams = self.folder.join(STREAMS_FILE);
        if streams.exists() {
            std::fs::remove_file(&streams).map_err(|source| SimError::Io {
                path: streams.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn launch_simulator(&mut self) -> SimResult<()> {
        info!(
            command = %self.command,
            folder = %self.folder.display(),
            "Launching reservoir simulator"
        );
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .current_dir(&self.folder)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| SimError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        let started = Instant::now();
        let status = loop {
            let polled = child.try_wait().map_err(|source| SimError::Io {
                path: self.folder.clone(),
                source,
            })?;
            if let Some(status) = polled {
                break status;
            }
            if started.elapsed() >= self.timeout {
                // Already-exited races are harmless here.
                let _ = child.kill();
                let _ = child.wait();
                warn!(command = %self.command, "Reservoir simulator timed out");
                return Err(SimError::Timeout {
                    command: self.command.clone(),
                    seconds: self.timeout.as_secs_f64(),
                });
            }
            thread::sleep(POLL_INTERVAL);
        };

        if !status.success() {
            return Err(SimError::ExitStatus {
                command: self.command.clone(),
                code: status.code(),
            });
        }
        self.launches += 1;
        Ok(())
    }

    fn read_output(&mut self, model: &mut Model) -> SimResult<()> {
        let file: WellStreamsFile = read_json(&self.folder.join(STREAMS_FILE))?;
        file.apply(model)
    }

    fn launches(&self) -> usize {
        self.launches
    }
}
