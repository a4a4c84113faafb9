//! Hardware capability descriptors parsed from `aplay --dump-hw-params`
//!
//! Each field is looked up on its own, anywhere in the text, so field order
//! and interleaved ALSA warnings do not matter. A missing field is not an
//! error: token lists come back empty and numeric domains come back
//! [`ValueDomain::Unknown`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

static ACCESS: LazyLock<Regex> = LazyLock::new(|| token_field("ACCESS"));
static FORMAT: LazyLock<Regex> = LazyLock::new(|| token_field("FORMAT"));
static CHANNELS_RANGE: LazyLock<Regex> = LazyLock::new(|| range_field("CHANNELS"));
static CHANNELS_FIXED: LazyLock<Regex> = LazyLock::new(|| fixed_field("CHANNELS"));
static RATE_RANGE: LazyLock<Regex> = LazyLock::new(|| range_field("RATE"));
static RATE_FIXED: LazyLock<Regex> = LazyLock::new(|| fixed_field("RATE"));

// `\b` keeps FORMAT from matching inside SUBFORMAT.
fn token_field(label: &str) -> Regex {
    Regex::new(&format!(r"\b{label}:\s+(.*)")).expect("token field pattern is valid")
}

fn range_field(label: &str) -> Regex {
    Regex::new(&format!(r"\b{label}:\s+\[(\d+)\s+(\d+)\]")).expect("range field pattern is valid")
}

fn fixed_field(label: &str) -> Regex {
    Regex::new(&format!(r"\b{label}:\s+(\d+)")).expect("fixed field pattern is valid")
}

/// Set of values a hardware parameter accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueDomain {
    /// Exactly one value
    Fixed(u32),
    /// Closed interval `[min, max]`
    Range { min: u32, max: u32 },
    /// Not reported
    #[default]
    Unknown,
}

impl ValueDomain {
    pub fn contains(&self, value: u32) -> bool {
        match *self {
            ValueDomain::Fixed(v) => v == value,
            ValueDomain::Range { min, max } => min <= value && value <= max,
            ValueDomain::Unknown => false,
        }
    }

    /// Effective closed interval; a fixed value is the degenerate `[v, v]`
    pub fn interval(&self) -> Option<(u32, u32)> {
        match *self {
            ValueDomain::Fixed(v) => Some((v, v)),
            ValueDomain::Range { min, max } => Some((min, max)),
            ValueDomain::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ValueDomain::Unknown)
    }
}

impl fmt::Display for ValueDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueDomain::Fixed(v) => write!(f, "{v}"),
            ValueDomain::Range { min, max } => write!(f, "[{min} {max}]"),
            ValueDomain::Unknown => write!(f, "unknown"),
        }
    }
}

/// What one card's hardware accepts
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    pub access_modes: BTreeSet<String>,
    pub sample_formats: BTreeSet<String>,
    pub rate: ValueDomain,
    pub channels: ValueDomain,
}

impl CapabilityDescriptor {
    pub fn supports_rate(&self, rate: u32) -> bool {
        self.rate.contains(rate)
    }

    pub fn supports_format(&self, format: &str) -> bool {
        self.sample_formats.contains(format)
    }
}

fn parse_tokens(re: &Regex, text: &str) -> BTreeSet<String> {
    re.captures(text)
        .map(|caps| caps[1].split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

fn parse_domain(range: &Regex, fixed: &Regex, text: &str) -> ValueDomain {
    if let Some(caps) = range.captures(text) {
        if let (Ok(min), Ok(max)) = (caps[1].parse(), caps[2].parse()) {
            return ValueDomain::Range { min, max };
        }
    }

    fixed
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
        .map(ValueDomain::Fixed)
        .unwrap_or(ValueDomain::Unknown)
}

/// Parse a hardware parameter dump into a descriptor
pub fn parse_capabilities(text: &str) -> CapabilityDescriptor {
    CapabilityDescriptor {
        access_modes: parse_tokens(&ACCESS, text),
        sample_formats: parse_tokens(&FORMAT, text),
        rate: parse_domain(&RATE_RANGE, &RATE_FIXED, text),
        channels: parse_domain(&CHANNELS_RANGE, &CHANNELS_FIXED, text),
    }
}
