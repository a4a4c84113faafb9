//! Rate and format negotiation between two cards
//!
//! Both searches are ordered: a short list of well-known values is tried
//! first, then a deterministic fallback. Absence is an ordinary outcome and
//! is reported through `Option`, never as an error.

use crate::domain::capability::CapabilityDescriptor;
use crate::domain::error::{ComboError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Rates tried in order before falling back to interval overlap
pub const PREFERRED_RATES: [u32; 4] = [48000, 44100, 96000, 32000];

/// Formats tried in order before falling back to the smallest shared token
pub const PREFERRED_FORMATS: [&str; 3] = ["S16_LE", "S24_3LE", "S32_LE"];

/// Outcome of a negotiation; either half may be missing
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NegotiatedParameters {
    pub rate: Option<u32>,
    pub format: Option<String>,
}

impl NegotiatedParameters {
    /// Both halves, or [`ComboError::NoCommonParameters`]
    pub fn require(self) -> Result<(u32, String)> {
        match self {
            NegotiatedParameters {
                rate: Some(rate),
                format: Some(format),
            } => Ok((rate, format)),
            NegotiatedParameters { rate, format } => {
                Err(ComboError::NoCommonParameters { rate, format })
            }
        }
    }
}

/// Preference lists driving the negotiation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negotiator {
    preferred_rates: Vec<u32>,
    preferred_formats: Vec<String>,
}

impl Default for Negotiator {
    fn default() -> Self {
        Self {
            preferred_rates: PREFERRED_RATES.to_vec(),
            preferred_formats: PREFERRED_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl Negotiator {
    pub fn new(preferred_rates: Vec<u32>, preferred_formats: Vec<String>) -> Self {
        Self {
            preferred_rates,
            preferred_formats,
        }
    }

    pub fn choose_rate(&self, a: &CapabilityDescriptor, b: &CapabilityDescriptor) -> Option<u32> {
        if let Some(rate) = self
            .preferred_rates
            .iter()
            .copied()
            .find(|&r| a.supports_rate(r) && b.supports_rate(r))
        {
            debug!(rate, "Preferred rate supported by both cards");
            return Some(rate);
        }

        let (lo_a, hi_a) = a.rate.interval()?;
        let (lo_b, hi_b) = b.rate.interval()?;
        let lo = lo_a.max(lo_b);
        let hi = hi_a.min(hi_b);

        // Lowest overlapping rate, not the highest.
        (lo <= hi).then(|| {
            debug!(lo, hi, "Falling back to rate overlap");
            lo
        })
    }

    pub fn choose_format(
        &self,
        a: &CapabilityDescriptor,
        b: &CapabilityDescriptor,
    ) -> Option<String> {
        let mut common = a.sample_formats.intersection(&b.sample_formats).peekable();
        common.peek()?;

        if let Some(format) = self
            .preferred_formats
            .iter()
            .find(|f| a.supports_format(f) && b.supports_format(f))
        {
            return Some(format.clone());
        }

        // BTreeSet iterates in lexicographic order
        common.next().cloned()
    }

    pub fn negotiate(
        &self,
        a: &CapabilityDescriptor,
        b: &CapabilityDescriptor,
    ) -> NegotiatedParameters {
        NegotiatedParameters {
            rate: self.choose_rate(a, b),
            format: self.choose_format(a, b),
        }
    }
}

/// [`Negotiator::choose_rate`] with the default preference list
pub fn choose_rate(a: &CapabilityDescriptor, b: &CapabilityDescriptor) -> Option<u32> {
    Negotiator::default().choose_rate(a, b)
}

/// [`Negotiator::choose_format`] with the default preference list
pub fn choose_format(a: &CapabilityDescriptor, b: &CapabilityDescriptor) -> Option<String> {
    Negotiator::default().choose_format(a, b)
}
