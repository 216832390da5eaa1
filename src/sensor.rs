use core::sync::atomic::{AtomicU32, Ordering};

use crate::convert::ThsCode;

/// Latched last good code of one sensor.
///
/// Written by the interrupt handler only, read from any context. A reader never blocks and
/// observes either the previous or the new code.
#[derive(Debug, Default)]
pub struct Slot(AtomicU32);

impl Slot {
    pub fn latch(&self, code: ThsCode) {
        self.0.store(code.0, Ordering::Release);
    }

    pub fn get(&self) -> ThsCode {
        ThsCode(self.0.load(Ordering::Acquire))
    }
}
