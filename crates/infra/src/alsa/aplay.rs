//! `aplay`-backed device inspector

use combo4_core::domain::{AppConfig, ComboError, DeviceInspector, DeviceRecord, Result};
use std::fmt;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

/// Playback target for the hw-params dump; aplay prints the dump before
/// it starts (or fails) playing.
const DUMP_SOURCE: &str = "/dev/zero";

/// Runs `aplay` and hands back whatever it printed
pub struct AplayInspector {
    program: String,
    probe_duration_secs: u64,
    timeout: Duration,
}

impl Default for AplayInspector {
    fn default() -> Self {
        Self::new(1, Duration::from_secs(5))
    }
}

impl AplayInspector {
    pub fn new(probe_duration_secs: u64, timeout: Duration) -> Self {
        Self {
            program: "aplay".to_string(),
            probe_duration_secs,
            timeout,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.probe_duration_secs, config.probe_timeout())
    }

    /// Use a different executable in place of `aplay`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn list_args() -> Vec<String> {
        vec!["-l".to_string()]
    }

    pub fn dump_args(&self, device: &DeviceRecord) -> Vec<String> {
        vec![
            "-D".to_string(),
            device.hw_address(),
            "--dump-hw-params".to_string(),
            "-d".to_string(),
            self.probe_duration_secs.to_string(),
            DUMP_SOURCE.to_string(),
        ]
    }

    /// Run the tool to completion and return stdout followed by stderr
    ///
    /// A non-zero exit status is not an error: aplay routinely fails after
    /// printing the dump. Only a failure to run at all, or the timeout, is.
    async fn run(&self, args: &[String]) -> Result<String> {
        debug!(program = %self.program, ?args, "Running inspection command");

        let child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ComboError::Inspection(format!("failed to run {}: {}", self.program, e)))?;

        let output = timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                ComboError::Inspection(format!(
                    "{} did not finish within {:?}",
                    self.program, self.timeout
                ))
            })?
            .map_err(|e| ComboError::Inspection(format!("{} failed: {}", self.program, e)))?;

        if !output.status.success() {
            debug!(status = %output.status, "Inspection command exited unsuccessfully");
        }

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }
}

#[async_trait::async_trait]
impl DeviceInspector for AplayInspector {
    async fn list_devices(&self) -> Result<String> {
        info!("Enumerating playback cards");
        self.run(&Self::list_args()).await
    }

    async fn dump_hw_params(&self, device: &DeviceRecord) -> Result<String> {
        info!(hw = %device.hw_address(), "Probing hardware capabilities");
        self.run(&self.dump_args(device)).await
    }
}

impl fmt::Debug for AplayInspector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AplayInspector")
            .field("program", &self.program)
            .field("timeout", &self.timeout)
            .finish()
    }
}
