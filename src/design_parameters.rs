use fugit::{HertzU32, MillisDurationU32};

/// The nominal THS input clock. The sensor clock is set to this rate during bind and all sampling
/// period computations assume it was achieved exactly.
pub const THS_CLK_IN: HertzU32 = HertzU32::from_raw(40_000_000);

/// The target period between two periodic data interrupts.
pub const THS_DATA_PERIOD: MillisDurationU32 = MillisDurationU32::from_ticks(330);

/// Sensor acquisition time in CTRL0, in input clock cycles (~16us).
pub const SENSOR_ACQ0: u16 = 0x3f;

/// Sensor acquisition time in CTRL2.
pub const SENSOR_ACQ1: u16 = 0x3f;

/// Averaging filter type. The filter averages over 2^(n+1) samples.
pub const FILTER_TYPE: u8 = 2;

/// The number of raw samples averaged into one reading.
pub const FILTER_DIV: u32 = 1 << (FILTER_TYPE + 1);

/// Number of filtered conversions per period tick of the THERMAL_PER field.
pub const PERIOD_UNIT: u32 = 4096;

/// Compute the THERMAL_PER interrupt period field.
///
/// # Note
/// The rate is the nominal input clock, not the rate actually achieved by the clock tree. On
/// A83T this yields noticeably slower interrupts than requested.
pub const fn thermal_period(
    clk: HertzU32,
    period: MillisDurationU32,
    filter_div: u32,
) -> u32 {
    let cycles = period.ticks() as u64 * clk.raw() as u64 / 1000;
    (cycles / filter_div as u64 / PERIOD_UNIT as u64 - 1) as u32
}

/// The THERMAL_PER value for the fixed design parameters.
pub const THERMAL_PERIOD: u32 =
    thermal_period(THS_CLK_IN, THS_DATA_PERIOD, FILTER_DIV);

/// Upper bound of physical sensors on any supported variant.
pub const MAX_SENSORS: usize = 3;
