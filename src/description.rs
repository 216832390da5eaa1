//! Binding time device description.
//!
//! The description names the resources the platform declares for one THS instance. Optional
//! resources that are not declared are skipped during bind; declared resources that cannot be
//! obtained fail the bind.
use core::str::FromStr;
use heapless::Vec;
use serde::Deserialize;

use crate::variant::Variant;
use crate::Error;

/// Required THS register region.
pub const REGION_THS: &str = "ths";
/// Optional calibration (SID/SRAM) region.
pub const REGION_CALIBRATION: &str = "calibration";
/// Bus gate clock and reset line.
pub const BUS: &str = "ahb";
/// Sensor module clock.
pub const CLOCK_THS: &str = "ths";

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct DeviceDescription<'a> {
    pub compatible: &'a str,
    #[serde(default, borrow)]
    pub reg_names: Vec<&'a str, 4>,
    #[serde(default)]
    pub interrupts: Vec<u32, 2>,
    #[serde(default, borrow)]
    pub clock_names: Vec<&'a str, 4>,
    #[serde(default, borrow)]
    pub reset_names: Vec<&'a str, 2>,
}

impl<'a> DeviceDescription<'a> {
    /// Parse a JSON description. Strings are borrowed from `json`.
    pub fn from_json(json: &'a str) -> Result<Self, Error> {
        let (desc, _) =
            serde_json_core::from_str(json).map_err(Error::Description)?;
        Ok(desc)
    }

    /// The variant selected by the compatible string.
    pub fn variant(&self) -> Result<Variant, Error> {
        Variant::from_str(self.compatible).map_err(|_| Error::UnsupportedDevice)
    }

    /// The interrupt line. Only the first one is used.
    pub fn interrupt(&self) -> Result<u32, Error> {
        self.interrupts.first().copied().ok_or(Error::MissingInterrupt)
    }

    pub fn has_region(&self, name: &str) -> bool {
        self.reg_names.iter().any(|n| *n == name)
    }

    pub fn has_clock(&self, name: &str) -> bool {
        self.clock_names.iter().any(|n| *n == name)
    }

    pub fn has_reset(&self, name: &str) -> bool {
        self.reset_names.iter().any(|n| *n == name)
    }
}
