//! Configuration for combo4
//!
//! Settings live in a TOML file at `~/.config/combo4/config.toml` (or a path
//! given on the command line). Every field has a default, so a partial file
//! or no file at all is fine.

use crate::domain::error::{ComboError, Result};
use crate::domain::negotiation::{Negotiator, PREFERRED_FORMATS, PREFERRED_RATES};
use crate::domain::render::RenderOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info, instrument};

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the generated document is written
    pub output_path: PathBuf,

    /// System-wide location the operator is told to copy it to
    pub install_path: PathBuf,

    /// Name of the raw 4-channel route/multi PCM
    pub combo_pcm: String,

    /// Name of the pinned plug PCM applications open
    pub plug_pcm: String,

    /// Seconds passed to `aplay -d` while dumping hw params
    pub probe_duration_secs: u64,

    /// Upper bound on a single `aplay` invocation
    pub probe_timeout_secs: u64,

    /// Rates tried in order during negotiation
    pub preferred_rates: Vec<u32>,

    /// Formats tried in order during negotiation
    pub preferred_formats: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("asound.conf.generated"),
            install_path: PathBuf::from("/etc/asound.conf"),
            combo_pcm: "both".to_string(),
            plug_pcm: "convert4".to_string(),
            probe_duration_secs: 1,
            probe_timeout_secs: 5,
            preferred_rates: PREFERRED_RATES.to_vec(),
            preferred_formats: PREFERRED_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl AppConfig {
    /// Get the default config file path
    ///
    /// Returns `~/.config/combo4/config.toml` on Linux
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("combo4").join("config.toml"))
            .ok_or_else(|| ComboError::Invalid("Could not determine config directory".to_string()))
    }

    /// Load configuration from TOML file
    #[instrument(skip(path))]
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        let contents = fs::read_to_string(path).await?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Save configuration to TOML file
    #[instrument(skip(self, path))]
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        info!(path = %path.display(), "Saving configuration");

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        fs::write(path, toml_str).await?;

        debug!("Configuration saved successfully");
        Ok(())
    }

    /// Resolve the configuration for a run
    ///
    /// An explicit path must load. Without one, the default location is used
    /// when it exists and factory defaults otherwise.
    pub async fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path).await;
        }

        match Self::default_path() {
            Ok(path) if path.exists() => Self::load_from_file(&path).await,
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.combo_pcm.trim().is_empty() || self.plug_pcm.trim().is_empty() {
            return Err(ComboError::Invalid("PCM names must not be empty".to_string()));
        }
        if self.combo_pcm == self.plug_pcm {
            return Err(ComboError::Invalid(format!(
                "combo_pcm and plug_pcm must differ (both are '{}')",
                self.combo_pcm
            )));
        }
        if self.probe_timeout_secs == 0 {
            return Err(ComboError::Invalid(
                "probe_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn negotiator(&self) -> Negotiator {
        Negotiator::new(self.preferred_rates.clone(), self.preferred_formats.clone())
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            combo_pcm: self.combo_pcm.clone(),
            plug_pcm: self.plug_pcm.clone(),
        }
    }
}
