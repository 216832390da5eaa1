//! Host platform seams.
//!
//! The driver does not own resource lookup, clock trees, reset controllers or the thermal zone
//! registry. It consumes them through the traits below and wraps every resource that needs
//! symmetric teardown in a guard.
use crate::registers::RegisterBlock;

/// Failure reported by a platform collaborator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    /// The resource does not exist.
    #[error("Not found")]
    NotFound,
    /// The resource exists but is held elsewhere.
    #[error("Busy")]
    Busy,
    /// The resource could not be configured.
    #[error("Invalid argument")]
    Invalid,
    /// Platform specific failure code.
    #[error("I/O error {0}")]
    Io(i32),
}

/// A gateable clock.
pub trait Clock {
    fn enable(&mut self) -> Result<(), PlatformError>;
    fn disable(&mut self);
    fn set_rate(&mut self, hz: u32) -> Result<(), PlatformError>;
}

/// A reset line. Asserted holds the block in reset.
pub trait ResetControl {
    fn assert(&mut self) -> Result<(), PlatformError>;
    fn deassert(&mut self) -> Result<(), PlatformError>;
}

/// A claimed interrupt line.
pub trait InterruptLine {
    /// Release the line back to the platform.
    fn free(&mut self);
}

/// Thermal zone events raised by the driver.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ThermalEvent {
    /// A new temperature sample is available.
    TempSample,
}

/// A thermal zone fed by one sensor.
///
/// `update()` is called from interrupt context.
pub trait ThermalZone {
    fn update(&self, event: ThermalEvent);
}

/// The consumer side registry of thermal zones.
pub trait ThermalZones {
    type Zone: ThermalZone;

    /// Register the zone of `sensor`.
    fn register(&mut self, sensor: usize) -> Result<Self::Zone, PlatformError>;
}

/// Resource provider for one device.
pub trait Platform {
    type Registers: RegisterBlock;
    type Clock: Clock;
    type Reset: ResetControl;
    type Irq: InterruptLine;

    /// Map the named register region.
    fn map(&mut self, name: &'static str) -> Result<Self::Registers, PlatformError>;

    /// Claim an interrupt line for the driver.
    fn request_irq(&mut self, irq: u32) -> Result<Self::Irq, PlatformError>;

    /// Look up the named clock.
    fn clock(&mut self, name: &'static str) -> Result<Self::Clock, PlatformError>;

    /// Look up the named reset control.
    fn reset(&mut self, name: &'static str) -> Result<Self::Reset, PlatformError>;
}

/// A claimed interrupt line. Freed on drop.
pub struct IrqGuard<I: InterruptLine> {
    line: I,
    irq: u32,
}

impl<I: InterruptLine> IrqGuard<I> {
    pub fn request<P: Platform<Irq = I>>(
        platform: &mut P,
        irq: u32,
    ) -> Result<Self, PlatformError> {
        let line = platform.request_irq(irq)?;
        Ok(Self { line, irq })
    }

    pub fn irq(&self) -> u32 {
        self.irq
    }
}

impl<I: InterruptLine> Drop for IrqGuard<I> {
    fn drop(&mut self) {
        self.line.free();
        log::debug!("IRQ {} freed", self.irq);
    }
}

/// An enabled clock. Disabled on drop.
pub struct ClockGuard<C: Clock> {
    clock: C,
    name: &'static str,
}

impl<C: Clock> ClockGuard<C> {
    pub fn enable(
        mut clock: C,
        name: &'static str,
    ) -> Result<Self, PlatformError> {
        clock.enable()?;
        log::debug!("{name} clock enabled");
        Ok(Self { clock, name })
    }

    pub fn set_rate(&mut self, hz: u32) -> Result<(), PlatformError> {
        self.clock.set_rate(hz)
    }
}

impl<C: Clock> Drop for ClockGuard<C> {
    fn drop(&mut self) {
        self.clock.disable();
        log::debug!("{} clock disabled", self.name);
    }
}

/// A deasserted reset line. Asserted on drop.
pub struct ResetGuard<R: ResetControl> {
    reset: R,
}

impl<R: ResetControl> ResetGuard<R> {
    pub fn deassert(mut reset: R) -> Result<Self, PlatformError> {
        reset.deassert()?;
        Ok(Self { reset })
    }
}

impl<R: ResetControl> Drop for ResetGuard<R> {
    fn drop(&mut self) {
        if let Err(e) = self.reset.assert() {
            log::warn!("Reset assert failed: {e:?}");
        }
    }
}
