//! SoC family descriptors.
//!
//! H3 and A83T share the THS register layout. They differ in the number of sensors, the
//! conversion constants and in whether a second calibration word exists.
use strum::{EnumIter, EnumString, IntoStaticStr};

use crate::convert::{Formula, ThsCode};
use crate::design_parameters::MAX_SENSORS;
use crate::registers::{self, Register};

/// Register bits and data register of one physical sensor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SensorRegisterSet {
    /// Data interrupt enable bit in INT_CTRL.
    pub data_int_en: u32,
    /// Data interrupt status bit in STAT.
    pub data_int_flag: u32,
    /// Raw data register.
    pub data: Register,
    /// Sense enable bit in CTRL2.
    pub sense_en: u32,
}

const SENSOR0: SensorRegisterSet = SensorRegisterSet {
    data_int_en: registers::INT_CTRL_DATA0_IRQ_EN,
    data_int_flag: registers::STAT_DATA0_IRQ_STS,
    data: Register::Data0,
    sense_en: registers::CTRL2_SENSE_EN0,
};

const SENSOR1: SensorRegisterSet = SensorRegisterSet {
    data_int_en: registers::INT_CTRL_DATA1_IRQ_EN,
    data_int_flag: registers::STAT_DATA1_IRQ_STS,
    data: Register::Data1,
    sense_en: registers::CTRL2_SENSE_EN1,
};

const SENSOR2: SensorRegisterSet = SensorRegisterSet {
    data_int_en: registers::INT_CTRL_DATA2_IRQ_EN,
    data_int_flag: registers::STAT_DATA2_IRQ_STS,
    data: Register::Data2,
    sense_en: registers::CTRL2_SENSE_EN2,
};

/// Static description of a SoC family.
#[derive(Debug, PartialEq, Eq)]
pub struct VariantDescriptor {
    pub sensors: &'static [SensorRegisterSet],
    pub formula: Formula,
    /// Whether the calibration region holds a second word for CDATA2.
    pub has_cal1: bool,
}

impl VariantDescriptor {
    pub const fn num_sensors(&self) -> usize {
        self.sensors.len()
    }

    /// Convert a raw code to millidegree Celsius.
    pub const fn convert(&self, code: ThsCode) -> i32 {
        self.formula.millicelsius(code)
    }

    /// OR of all sense enable bits.
    pub fn sense_en_mask(&self) -> u32 {
        self.sensors.iter().fold(0, |m, s| m | s.sense_en)
    }

    /// OR of all data interrupt enable bits.
    pub fn data_int_en_mask(&self) -> u32 {
        self.sensors.iter().fold(0, |m, s| m | s.data_int_en)
    }
}

const H3: VariantDescriptor = VariantDescriptor {
    sensors: &[SENSOR0],
    formula: Formula::H3,
    has_cal1: false,
};

const A83T: VariantDescriptor = VariantDescriptor {
    sensors: &[SENSOR0, SENSOR1, SENSOR2],
    formula: Formula::A83T,
    has_cal1: true,
};

/// Supported SoC families, keyed by their device compatible string.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumString, IntoStaticStr, EnumIter,
)]
pub enum Variant {
    #[strum(serialize = "allwinner,sun8i-h3-ths")]
    H3,
    #[strum(serialize = "allwinner,sun8i-a83t-ths")]
    A83T,
}

impl Variant {
    pub fn descriptor(self) -> &'static VariantDescriptor {
        match self {
            Self::H3 => &H3,
            Self::A83T => &A83T,
        }
    }

    /// The device compatible string.
    pub fn compatible(self) -> &'static str {
        self.into()
    }
}

const _: () = assert!(H3.sensors.len() <= MAX_SENSORS);
const _: () = assert!(A83T.sensors.len() <= MAX_SENSORS);
