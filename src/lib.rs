//! Driver for the thermal sensor controller (THS) of Allwinner SUN8I SoCs.
//!
//! The controller samples one (H3) or three (A83T) on-die sensors periodically in hardware and
//! raises a data interrupt per fresh sample. The driver programs the sampling engine once at
//! bind time, latches fresh codes from the interrupt handler and converts the latched code to
//! millidegree Celsius on demand.
//!
//! Bus access, clocks, reset and the thermal zone registry are provided by the host through
//! the traits in [platform].
#![cfg_attr(not(test), no_std)]

pub mod calibration;
pub mod convert;
pub mod description;
pub mod design_parameters;
pub mod platform;
pub mod registers;
pub mod sensor;
pub mod ths;
pub mod variant;

#[cfg(test)]
pub mod testing;

pub use description::DeviceDescription;
pub use platform::{Platform, PlatformError, ThermalEvent, ThermalZone, ThermalZones};
pub use ths::{Sensor, Ths};
pub use variant::Variant;

/// Driver errors.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unsupported device")]
    UnsupportedDevice,
    #[error("Invalid device description: {0}")]
    Description(serde_json_core::de::Error),
    #[error("Register region `{0}` not declared")]
    MissingRegion(&'static str),
    #[error("Register region `{0}`: {1}")]
    Region(&'static str, PlatformError),
    #[error("No interrupt declared")]
    MissingInterrupt,
    #[error("Interrupt: {0}")]
    Interrupt(PlatformError),
    #[error("Clock `{0}`: {1}")]
    Clock(&'static str, PlatformError),
    #[error("Reset: {0}")]
    Reset(PlatformError),
    #[error("Thermal zone {0}: {1}")]
    ThermalZone(usize, PlatformError),
    /// No valid sample has been latched yet. Transient, retry later.
    #[error("Temperature not yet available")]
    NotYetAvailable,
    #[error("Invalid sensor index {0}")]
    InvalidSensor(usize),
}
