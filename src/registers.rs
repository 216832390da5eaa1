//! THS register map and register access.
//!
//! # Design
//! All registers are 32 bit wide and accessed through a [RegisterBlock]. Composite registers are
//! modelled as bit fields so the programming sequence reads as a list of field assignments. The
//! per-sensor bits (sense enable, data IRQ enable/status, data register) are carried by the
//! [crate::variant::SensorRegisterSet] of each variant and OR-ed in as raw masks.
use arbitrary_int::{u2, u20, u3};
use bitbybit::bitfield;
use core::ptr::{read_volatile, write_volatile};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Register offsets from the THS base address.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive,
)]
#[repr(usize)]
pub enum Register {
    Ctrl0 = 0x00,
    Ctrl2 = 0x40,
    IntCtrl = 0x44,
    Stat = 0x48,
    Filter = 0x70,
    Cdata01 = 0x74,
    Cdata2 = 0x78,
    Data0 = 0x80,
    Data1 = 0x84,
    Data2 = 0x88,
}

impl Register {
    /// Byte offset of the register.
    pub const fn offset(self) -> usize {
        self as usize
    }
}

/// Offsets into the calibration (SID/SRAM) region.
pub const CAL0_OFFSET: usize = 0x0;
pub const CAL1_OFFSET: usize = 0x4;

pub const CTRL2_SENSE_EN0: u32 = 1 << 0;
pub const CTRL2_SENSE_EN1: u32 = 1 << 1;
pub const CTRL2_SENSE_EN2: u32 = 1 << 2;

pub const INT_CTRL_DATA0_IRQ_EN: u32 = 1 << 8;
pub const INT_CTRL_DATA1_IRQ_EN: u32 = 1 << 9;
pub const INT_CTRL_DATA2_IRQ_EN: u32 = 1 << 10;

pub const STAT_DATA0_IRQ_STS: u32 = 1 << 8;
pub const STAT_DATA1_IRQ_STS: u32 = 1 << 9;
pub const STAT_DATA2_IRQ_STS: u32 = 1 << 10;

/// Writing this to STAT clears all alarm, shutdown and data flags of all three sensors.
pub const STAT_CLEAR: u32 = 0x777;

#[bitfield(u32, default = 0)]
#[derive(Debug, PartialEq)]
pub struct Ctrl0 {
    #[bits(0..=15, rw)]
    pub sensor_acq0: u16,
}

#[bitfield(u32, default = 0)]
#[derive(Debug, PartialEq)]
pub struct Ctrl2 {
    #[bits(0..=2, rw)]
    pub sense_en: u3,
    #[bits(16..=31, rw)]
    pub sensor_acq1: u16,
}

#[bitfield(u32, default = 0)]
#[derive(Debug, PartialEq)]
pub struct IntCtrl {
    #[bits(8..=10, rw)]
    pub data_irq_en: u3,
    #[bits(12..=31, rw)]
    pub thermal_per: u20,
}

#[bitfield(u32)]
#[derive(Debug, PartialEq)]
pub struct Stat {
    #[bits(8..=10, r)]
    pub data_irq_sts: u3,
}

#[bitfield(u32, default = 0)]
#[derive(Debug, PartialEq)]
pub struct Filter {
    #[bits(0..=1, rw)]
    pub filter_type: u2,
    #[bit(2, rw)]
    pub enable: bool,
}

/// 32 bit register access at byte offsets.
///
/// Memory mapped I/O is assumed infallible at this layer. Both methods take `&self` so the
/// interrupt handler and the register programmer can share the block.
pub trait RegisterBlock {
    fn read(&self, offset: usize) -> u32;
    fn write(&self, offset: usize, value: u32);
}

impl<T: RegisterBlock + ?Sized> RegisterBlock for &T {
    fn read(&self, offset: usize) -> u32 {
        (**self).read(offset)
    }

    fn write(&self, offset: usize, value: u32) {
        (**self).write(offset, value)
    }
}

/// A mapped register region accessed with volatile loads and stores.
pub struct Mmio {
    base: *mut u32,
    len: usize,
}

// SAFETY: `Mmio` only performs single word volatile accesses to device memory. Concurrent
// accesses from the interrupt handler and a reader touch disjoint or idempotent registers.
unsafe impl Send for Mmio {}
// SAFETY: See `Send`.
unsafe impl Sync for Mmio {}

impl Mmio {
    /// Wrap a mapped register region.
    ///
    /// # Safety
    /// `base` must be the word aligned virtual address of a device region of at least `len`
    /// bytes that stays mapped for the lifetime of the returned value.
    pub const unsafe fn new(base: usize, len: usize) -> Self {
        Self {
            base: base as *mut u32,
            len,
        }
    }

    /// Pointer to the word at `offset`, or `None` if it is unaligned or outside the region.
    fn word(&self, offset: usize) -> Option<*mut u32> {
        if offset % 4 != 0 || offset.checked_add(4)? > self.len {
            log::error!("Register access out of range: {offset:#x}");
            return None;
        }
        // SAFETY: offset is checked against the mapped length above.
        Some(unsafe { self.base.add(offset / 4) })
    }
}

/// Out of range reads return zero, out of range writes are dropped.
impl RegisterBlock for Mmio {
    fn read(&self, offset: usize) -> u32 {
        self.word(offset)
            // SAFETY: `word()` yields an aligned pointer inside the mapped region.
            .map(|p| unsafe { read_volatile(p) })
            .unwrap_or(0)
    }

    fn write(&self, offset: usize, value: u32) {
        if let Some(p) = self.word(offset) {
            // SAFETY: `word()` yields an aligned pointer inside the mapped region.
            unsafe { write_volatile(p, value) }
        }
    }
}
