//! Collaborator seams: the host's audio tooling and the operator
//!
//! The core never runs processes or reads stdin itself. The `infra` crate
//! provides the `aplay`-backed inspector and the binary provides the
//! interactive selector.

use crate::domain::device::DeviceRecord;
use crate::domain::error::{ComboError, Result};
use std::collections::HashMap;

/// Source of raw enumeration and hw-params text
#[async_trait::async_trait]
pub trait DeviceInspector: Send + Sync {
    /// Raw playback card listing (`aplay -l` layout)
    async fn list_devices(&self) -> Result<String>;

    /// Raw hardware parameter dump for one card
    async fn dump_hw_params(&self, device: &DeviceRecord) -> Result<String>;
}

/// Supplies the two card numbers to combine
#[async_trait::async_trait]
pub trait DeviceSelector: Send + Sync {
    async fn select(&self, devices: &[DeviceRecord]) -> Result<(u32, u32)>;
}

/// Selection decided up front, e.g. from command-line flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSelection {
    pub first: u32,
    pub second: u32,
}

#[async_trait::async_trait]
impl DeviceSelector for FixedSelection {
    async fn select(&self, _devices: &[DeviceRecord]) -> Result<(u32, u32)> {
        Ok((self.first, self.second))
    }
}

/// Inspector answering from canned text
///
/// Cards without a registered dump fail the way a missing `aplay` would.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInspector {
    listing: String,
    dumps: HashMap<String, String>,
}

impl ScriptedInspector {
    pub fn new(listing: impl Into<String>) -> Self {
        Self {
            listing: listing.into(),
            dumps: HashMap::new(),
        }
    }

    /// Register the dump returned for a card id
    pub fn with_dump(mut self, short_name: impl Into<String>, dump: impl Into<String>) -> Self {
        self.dumps.insert(short_name.into(), dump.into());
        self
    }
}

#[async_trait::async_trait]
impl DeviceInspector for ScriptedInspector {
    async fn list_devices(&self) -> Result<String> {
        Ok(self.listing.clone())
    }

    async fn dump_hw_params(&self, device: &DeviceRecord) -> Result<String> {
        self.dumps.get(&device.short_name).cloned().ok_or_else(|| {
            ComboError::Inspection(format!("no dump for {}", device.hw_address()))
        })
    }
}
