//! End-to-end generation run
//!
//! enumerate -> select -> probe both cards -> negotiate -> render -> write.
//! Every stage only consumes the previous stage's output. A failing
//! collaborator is logged and treated as empty text, which usually ends in
//! a negotiation failure. Nothing is written unless negotiation succeeds.

use crate::domain::capability::{parse_capabilities, CapabilityDescriptor};
use crate::domain::config::AppConfig;
use crate::domain::device::{parse_device_list, select_pair, DeviceRecord};
use crate::domain::error::{ComboError, Result};
use crate::domain::inspector::{DeviceInspector, DeviceSelector};
use crate::domain::render::render_with;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

/// Channels each card contributes to the combined device
const CHANNELS_PER_CARD: u32 = 2;

/// A card together with what its hardware reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbedDevice {
    pub device: DeviceRecord,
    pub capabilities: CapabilityDescriptor,
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub first: ProbedDevice,
    pub second: ProbedDevice,
    pub rate: u32,
    pub format: String,
    pub output_path: PathBuf,
    pub install_path: PathBuf,
    pub plug_pcm: String,
}

impl GenerationReport {
    /// Shell commands the operator runs to install and test the result
    pub fn next_steps(&self) -> Vec<String> {
        vec![
            format!(
                "sudo cp {} {}",
                self.output_path.display(),
                self.install_path.display()
            ),
            "sudo reboot".to_string(),
            format!("aplay -L | grep {}", self.plug_pcm),
            format!(
                "speaker-test -D {} -c 4 -r {} -f {} -t sine",
                self.plug_pcm, self.rate, self.format
            ),
        ]
    }
}

/// Drives one generation run against an inspector
pub struct Generator {
    inspector: Arc<dyn DeviceInspector>,
    config: AppConfig,
}

impl Generator {
    pub fn new(inspector: Arc<dyn DeviceInspector>, config: AppConfig) -> Self {
        Self { inspector, config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// List playback cards, tolerating a failing listing command
    pub async fn enumerate(&self) -> Vec<DeviceRecord> {
        let text = self.inspector.list_devices().await.unwrap_or_else(|e| {
            warn!(error = %e, "Device listing failed, continuing with no output");
            String::new()
        });

        let devices = parse_device_list(&text);
        info!("Found {} playback cards", devices.len());
        devices
    }

    /// Probe one card's hardware parameters
    #[instrument(skip(self, device), fields(card = device.index, hw = %device.hw_address()))]
    pub async fn probe(&self, device: &DeviceRecord) -> CapabilityDescriptor {
        let text = self
            .inspector
            .dump_hw_params(device)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Hardware probe failed, capabilities unknown");
                String::new()
            });
        debug!(dump = %text, "Raw hw params");

        let capabilities = parse_capabilities(&text);
        if capabilities.channels.is_known() && !capabilities.channels.contains(CHANNELS_PER_CARD) {
            warn!(
                channels = %capabilities.channels,
                "Card does not report stereo support; the combined device may not open"
            );
        }

        capabilities
    }

    /// Run the whole pipeline and write the document
    #[instrument(skip(self, selector))]
    pub async fn run(&self, selector: &dyn DeviceSelector) -> Result<GenerationReport> {
        let devices = self.enumerate().await;
        if devices.len() < 2 {
            return Err(ComboError::InsufficientDevices {
                found: devices.len(),
            });
        }

        let (first, second) = selector.select(&devices).await?;
        let (a, b) = select_pair(&devices, first, second)?;
        info!(first = a.index, second = b.index, "Combining cards");

        let caps_a = self.probe(&a).await;
        let caps_b = self.probe(&b).await;
        for (device, caps) in [(&a, &caps_a), (&b, &caps_b)] {
            info!(
                card = device.index,
                short = %device.short_name,
                formats = ?caps.sample_formats,
                rate = %caps.rate,
                "Hardware summary"
            );
        }

        let params = self.config.negotiator().negotiate(&caps_a, &caps_b);
        info!(rate = ?params.rate, format = ?params.format, "Selected common params");
        let (rate, format) = params.require()?;

        let document = render_with(&a, &b, rate, &format, &self.config.render_options());
        self.write_output(&document).await?;

        Ok(GenerationReport {
            first: ProbedDevice {
                device: a,
                capabilities: caps_a,
            },
            second: ProbedDevice {
                device: b,
                capabilities: caps_b,
            },
            rate,
            format,
            output_path: self.config.output_path.clone(),
            install_path: self.config.install_path.clone(),
            plug_pcm: self.config.plug_pcm.clone(),
        })
    }

    async fn write_output(&self, document: &str) -> Result<()> {
        let path = &self.config.output_path;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(path).await?;
        file.write_all(document.as_bytes()).await?;
        file.flush().await?;

        info!(path = %path.display(), "Generated config written");
        Ok(())
    }
}
