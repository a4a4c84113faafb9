//! Domain entities and business rules

pub mod capability;
pub mod config;
pub mod device;
pub mod error;
pub mod generator;
pub mod inspector;
pub mod negotiation;
pub mod render;

pub use capability::{parse_capabilities, CapabilityDescriptor, ValueDomain};
pub use config::AppConfig;
pub use device::{parse_device_list, select_pair, DeviceRecord};
pub use error::{ComboError, Result};
pub use generator::{GenerationReport, Generator, ProbedDevice};
pub use inspector::{DeviceInspector, DeviceSelector, FixedSelection, ScriptedInspector};
pub use negotiation::{
    choose_format, choose_rate, NegotiatedParameters, Negotiator, PREFERRED_FORMATS,
    PREFERRED_RATES,
};
pub use render::{render, render_with, RenderOptions};
