//! combo4 core
//!
//! Parsing, negotiation and rendering for a virtual 4-channel ALSA device
//! built from two stereo playback cards. Everything that touches the host
//! (running `aplay`, prompting the operator) sits behind the traits in
//! [`domain::inspector`].

pub mod domain;

pub use domain::*;
