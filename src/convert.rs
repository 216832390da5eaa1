/// A raw THS data register code.
///
/// Zero is never a valid conversion result; the driver uses it as the "no sample yet" marker.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ThsCode(pub u32);

impl ThsCode {
    /// Whether the code holds a conversion result.
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl From<u32> for ThsCode {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<ThsCode> for u32 {
    fn from(code: ThsCode) -> u32 {
        code.0
    }
}

/// Linear code to temperature conversion: `base - code * 1e6 / divisor` in millidegree Celsius.
///
/// The constants are empirical per silicon family.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Formula {
    /// Temperature at code zero in millidegree Celsius.
    pub base: i32,
    /// Codes per 1000 degree Celsius.
    pub divisor: u32,
}

impl Formula {
    pub const H3: Self = Self {
        base: 217_000,
        divisor: 8253,
    };

    pub const A83T: Self = Self {
        base: 192_000,
        divisor: 14_186,
    };

    /// Convert a code to millidegree Celsius.
    ///
    /// Division truncates. Results below `i32::MIN` saturate; the 12 bit codes produced by the
    /// hardware never get there.
    pub const fn millicelsius(&self, code: ThsCode) -> i32 {
        let delta = code.0 as u64 * 1_000_000 / self.divisor as u64;
        let t = self.base as i64 - delta as i64;
        if t < i32::MIN as i64 {
            i32::MIN
        } else {
            t as i32
        }
    }
}
