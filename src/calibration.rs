//! Factory calibration injection.
//!
//! The calibration words live in a separate SID/SRAM region. A word of zero was never programmed
//! and is not written, writing zero would disable the calibration adjustment on some silicon.
use crate::registers::{RegisterBlock, Register, CAL0_OFFSET, CAL1_OFFSET};
use crate::variant::VariantDescriptor;

/// Copy the calibration words of `cal` into the THS calibration registers.
///
/// Without a calibration region the sensors run uncalibrated.
pub fn load<R: RegisterBlock, C: RegisterBlock>(
    regs: &R,
    cal: Option<&C>,
    variant: &VariantDescriptor,
) {
    let Some(cal) = cal else {
        log::debug!("No calibration region");
        return;
    };

    let words = [
        (CAL0_OFFSET, Register::Cdata01, true),
        (CAL1_OFFSET, Register::Cdata2, variant.has_cal1),
    ];
    for (offset, reg, present) in words {
        if !present {
            continue;
        }
        let word = cal.read(offset);
        if word != 0 {
            log::debug!("{reg:?} calibration: {word:#010x}");
            regs.write(reg.offset(), word);
        }
    }
}
