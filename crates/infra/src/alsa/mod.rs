//! ALSA backend built on the `aplay` command-line tool
//!
//! Both the card listing and the hardware parameter dump come from `aplay`,
//! so the tool is the only host dependency:
//! - `aplay -l` for enumeration
//! - `aplay -D hw:CARD=<id>,DEV=<n> --dump-hw-params` for capabilities

pub mod aplay;

pub use aplay::*;
