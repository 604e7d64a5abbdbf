//! Tessera Services Layer
//!
//! Settings files and the UDP telemetry channel that sits outside the core.

pub mod settings;
pub mod telemetry;

pub use settings::{Settings, SettingsError, SimulationSettings, TelemetrySettings};
pub use telemetry::{TelemetryError, UdpStatsSink};
