//! Playback card records and the `aplay -l` list parser
//!
//! `aplay -l` prints one line per (card, device) pair:
//!
//! ```text
//! card 3: A [USB-C to 3.5mm Headphone Jack A], device 0: USB Audio [USB Audio]
//! ```
//!
//! Everything else in the stream (banners, sub-device lines, warnings) is
//! ignored.

use crate::domain::error::{ComboError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

static CARD_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^card\s+(\d+):\s+(\S+)\s+\[(.*?)\],\s+device\s+(\d+):\s+(.*?)\s+\[(.*?)\]")
        .expect("card line pattern is valid")
});

/// A playback card as reported by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Card number assigned by ALSA
    pub index: u32,
    /// Card id, e.g. `A` or `CODEC`
    pub short_name: String,
    /// Long card name from the first bracketed group
    pub description: String,
    /// Device number on the card
    #[serde(default)]
    pub sub_index: u32,
}

impl DeviceRecord {
    pub fn new(index: u32, short_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            index,
            short_name: short_name.into(),
            description: description.into(),
            sub_index: 0,
        }
    }

    pub fn with_sub_index(mut self, sub_index: u32) -> Self {
        self.sub_index = sub_index;
        self
    }

    /// Raw hardware address, e.g. `hw:CARD=A,DEV=0`
    pub fn hw_address(&self) -> String {
        format!("hw:CARD={},DEV={}", self.short_name, self.sub_index)
    }
}

impl fmt::Display for DeviceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] short='{}' dev={}  desc='{}'",
            self.index, self.short_name, self.sub_index, self.description
        )
    }
}

fn parse_card_line(line: &str) -> Option<DeviceRecord> {
    let caps = CARD_LINE.captures(line)?;
    let index = caps[1].parse().ok()?;
    let sub_index = caps[4].parse().ok()?;

    Some(DeviceRecord {
        index,
        short_name: caps[2].to_string(),
        description: caps[3].to_string(),
        sub_index,
    })
}

/// Parse `aplay -l` output into cards sorted by card number
///
/// A card listed with several devices keeps only its first line.
pub fn parse_device_list(text: &str) -> Vec<DeviceRecord> {
    let mut cards: BTreeMap<u32, DeviceRecord> = BTreeMap::new();

    for record in text.lines().filter_map(parse_card_line) {
        cards.entry(record.index).or_insert(record);
    }

    debug!(count = cards.len(), "Parsed playback cards");
    cards.into_values().collect()
}

/// Resolve two operator selections against the enumerated cards
pub fn select_pair(
    devices: &[DeviceRecord],
    first: u32,
    second: u32,
) -> Result<(DeviceRecord, DeviceRecord)> {
    if first == second {
        return Err(ComboError::DuplicateSelection(first));
    }

    let lookup = |index: u32| {
        devices
            .iter()
            .find(|d| d.index == index)
            .cloned()
            .ok_or(ComboError::InvalidSelection(index))
    };

    Ok((lookup(first)?, lookup(second)?))
}
