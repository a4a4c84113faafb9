//! combo4 infrastructure
//!
//! Host-facing implementations of the core's collaborator traits.

pub mod alsa;

pub use alsa::*;
