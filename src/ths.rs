//! THS device instance.
//!
//! # Design
//! Binding acquires every platform resource before the first register write. The reset line and
//! the clocks are held by guards, so an error anywhere after the reset was deasserted releases
//! them in reverse order: sensor clock, bus clock, reset. Unbinding releases them in field order:
//! reset, sensor clock, bus clock.
//!
//! After programming, the hardware samples on its own and raises the data interrupt once per
//! period. [Ths::handle_irq] latches the new codes, [Ths::temperature] converts the latched code
//! on demand. Both take `&self`.
use arbitrary_int::{u2, u20};
use heapless::Vec;
use smlang::statemachine;

use crate::calibration;
use crate::convert::ThsCode;
use crate::description::{
    DeviceDescription, BUS, CLOCK_THS, REGION_CALIBRATION, REGION_THS,
};
use crate::design_parameters::{
    FILTER_TYPE, MAX_SENSORS, SENSOR_ACQ0, SENSOR_ACQ1, THERMAL_PERIOD,
    THS_CLK_IN,
};
use crate::platform::{
    ClockGuard, IrqGuard, Platform, ResetGuard, ThermalEvent, ThermalZone,
    ThermalZones,
};
use crate::registers::{
    Ctrl0, Ctrl2, Filter, IntCtrl, Register, RegisterBlock, Stat, STAT_CLEAR,
};
use crate::sensor::Slot;
use crate::variant::VariantDescriptor;
use crate::Error;

pub mod sm {
    use super::*;

    statemachine! {
        transitions: {
            *Unbound + Bind = ClocksEnabling,
            ClocksEnabling + Fault = Unbound,
            ClocksEnabling + Programmed = Ready,
            Ready + Unbind = Disabling,
            Disabling + Released = Unbound
        }
    }

    impl Clone for States {
        fn clone(&self) -> Self {
            *self
        }
    }

    impl Copy for States {}
}

/// Lifecycle state machine context.
pub struct Lifecycle;

impl sm::StateMachineContext for Lifecycle {}

fn advance(lifecycle: &mut sm::StateMachine<Lifecycle>, event: sm::Events) {
    if lifecycle.process_event(event).is_err() {
        log::error!("Invalid THS lifecycle transition");
    }
}

/// Look up an optional clock. A clock that is not declared is skipped.
fn optional_clock<P: Platform>(
    desc: &DeviceDescription,
    platform: &mut P,
    name: &'static str,
) -> Result<Option<P::Clock>, Error> {
    if !desc.has_clock(name) {
        log::debug!("No {name} clock declared");
        return Ok(None);
    }
    platform.clock(name).map(Some).map_err(|e| Error::Clock(name, e))
}

/// Resources held once the controller is out of reset. Field order is teardown order.
struct Acquired<P: Platform> {
    reset: Option<ResetGuard<P::Reset>>,
    irq: IrqGuard<P::Irq>,
    bus_clk: Option<P::Clock>,
    clk: Option<P::Clock>,
    regs: P::Registers,
    cal: Option<P::Registers>,
}

/// A bound THS controller.
pub struct Ths<P: Platform, Z: ThermalZone> {
    // Field order is teardown order.
    reset: Option<ResetGuard<P::Reset>>,
    clk: Option<ClockGuard<P::Clock>>,
    bus_clk: Option<ClockGuard<P::Clock>>,
    irq: IrqGuard<P::Irq>,
    regs: P::Registers,
    cal: Option<P::Registers>,
    variant: &'static VariantDescriptor,
    slots: [Slot; MAX_SENSORS],
    zones: Vec<Z, MAX_SENSORS>,
    lifecycle: sm::StateMachine<Lifecycle>,
}

impl<P: Platform, Z: ThermalZone> Ths<P, Z> {
    /// Bind to the controller described by `desc`.
    ///
    /// # Args
    /// * `desc` - The device description selecting the variant and naming the resources.
    /// * `platform` - Resource provider.
    /// * `zones` - Thermal zone registry. One zone is registered per sensor.
    ///
    /// # Returns
    /// The programmed device. Periodic interrupts are armed when this returns. On error every
    /// resource acquired so far has been released, including the interrupt line.
    pub fn probe<T: ThermalZones<Zone = Z>>(
        desc: &DeviceDescription,
        platform: &mut P,
        zones: &mut T,
    ) -> Result<Self, Error> {
        let variant = desc.variant()?.descriptor();

        if !desc.has_region(REGION_THS) {
            return Err(Error::MissingRegion(REGION_THS));
        }
        let regs = platform
            .map(REGION_THS)
            .map_err(|e| Error::Region(REGION_THS, e))?;

        // The calibration region is optional.
        let cal = if desc.has_region(REGION_CALIBRATION) {
            Some(
                platform
                    .map(REGION_CALIBRATION)
                    .map_err(|e| Error::Region(REGION_CALIBRATION, e))?,
            )
        } else {
            None
        };

        let irq = IrqGuard::request(platform, desc.interrupt()?)
            .map_err(Error::Interrupt)?;

        let bus_clk = optional_clock(desc, platform, BUS)?;
        let clk = optional_clock(desc, platform, CLOCK_THS)?;

        // A declared reset line must be obtainable.
        let reset = if desc.has_reset(BUS) {
            Some(platform.reset(BUS).map_err(Error::Reset)?)
        } else {
            None
        };

        let mut lifecycle = sm::StateMachine::new(Lifecycle);
        let reset = reset
            .map(ResetGuard::deassert)
            .transpose()
            .map_err(Error::Reset)?;
        advance(&mut lifecycle, sm::Events::Bind);

        let acquired = Acquired {
            reset,
            irq,
            bus_clk,
            clk,
            regs,
            cal,
        };
        let mut ths = Self::enable(acquired, variant, zones).inspect_err(|e| {
            advance(&mut lifecycle, sm::Events::Fault);
            log::error!("THS bind failed: {e}");
        })?;
        advance(&mut lifecycle, sm::Events::Programmed);
        ths.lifecycle = lifecycle;

        log::info!(
            "THS bound: {} sensor(s), IRQ {}",
            variant.num_sensors(),
            ths.irq()
        );
        Ok(ths)
    }

    /// Everything after reset deassertion. On error the clocks enabled here are gated in
    /// reverse order, then the rest of `acquired` drops: reset asserted, interrupt freed.
    fn enable<T: ThermalZones<Zone = Z>>(
        acquired: Acquired<P>,
        variant: &'static VariantDescriptor,
        registry: &mut T,
    ) -> Result<Self, Error> {
        let bus_clk = acquired
            .bus_clk
            .map(|c| ClockGuard::enable(c, BUS))
            .transpose()
            .map_err(|e| Error::Clock(BUS, e))?;

        let mut clk = acquired
            .clk
            .map(|c| ClockGuard::enable(c, CLOCK_THS))
            .transpose()
            .map_err(|e| Error::Clock(CLOCK_THS, e))?;
        if let Some(clk) = clk.as_mut() {
            clk.set_rate(THS_CLK_IN.raw())
                .map_err(|e| Error::Clock(CLOCK_THS, e))?;
        }

        // Variant sensor counts are bounded by MAX_SENSORS at compile time, so the
        // collection cannot overflow.
        let zones = (0..variant.num_sensors())
            .map(|i| registry.register(i).map_err(|e| Error::ThermalZone(i, e)))
            .collect::<Result<Vec<Z, MAX_SENSORS>, Error>>()?;

        let ths = Self {
            reset: acquired.reset,
            clk,
            bus_clk,
            irq: acquired.irq,
            regs: acquired.regs,
            cal: acquired.cal,
            variant,
            slots: Default::default(),
            zones,
            lifecycle: sm::StateMachine::new(Lifecycle),
        };
        ths.init();
        Ok(ths)
    }

    fn read(&self, reg: Register) -> u32 {
        self.regs.read(reg.offset())
    }

    fn write(&self, reg: Register, value: u32) {
        self.regs.write(reg.offset(), value)
    }

    /// One-time register programming. Interrupts are armed by the last write.
    fn init(&self) {
        self.write(
            Register::Ctrl0,
            Ctrl0::DEFAULT.with_sensor_acq0(SENSOR_ACQ0).raw_value(),
        );
        self.write(
            Register::Filter,
            Filter::DEFAULT
                .with_enable(true)
                .with_filter_type(u2::new(FILTER_TYPE))
                .raw_value(),
        );

        let ctrl2 = Ctrl2::DEFAULT.with_sensor_acq1(SENSOR_ACQ1).raw_value()
            | self.variant.sense_en_mask();
        let int_ctrl = IntCtrl::DEFAULT
            .with_thermal_per(u20::new(THERMAL_PERIOD))
            .raw_value()
            | self.variant.data_int_en_mask();

        calibration::load(&self.regs, self.cal.as_ref(), self.variant);

        self.write(Register::Ctrl2, ctrl2);
        self.write(Register::IntCtrl, int_ctrl);
    }

    /// Service the data interrupt.
    ///
    /// The status is cleared before the data registers are read so a sample completing during
    /// the handler raises a new interrupt.
    ///
    /// # Returns
    /// The sensors whose latched code was updated and whose zone was notified.
    pub fn handle_irq(&self) -> Vec<usize, MAX_SENSORS> {
        let status = self.read(Register::Stat);
        self.write(Register::Stat, STAT_CLEAR);
        log::trace!("{:?}", Stat::new_with_raw_value(status));

        let mut updated = Vec::new();
        let sensors = self.variant.sensors.iter().zip(self.zones.iter());
        for (i, (sensor, zone)) in sensors.enumerate() {
            if status & sensor.data_int_flag == 0 {
                continue;
            }
            let code = ThsCode(self.read(sensor.data));
            if !code.is_valid() {
                log::debug!("Sensor {i}: discarding zero sample");
                continue;
            }
            self.slots[i].latch(code);
            zone.update(ThermalEvent::TempSample);
            updated.push(i).ok();
        }
        updated
    }

    /// The temperature of `sensor` in millidegree Celsius.
    ///
    /// Returns [Error::NotYetAvailable] until the first valid sample of that sensor arrived.
    pub fn temperature(&self, sensor: usize) -> Result<i32, Error> {
        if sensor >= self.variant.num_sensors() {
            return Err(Error::InvalidSensor(sensor));
        }
        let code = self.slots[sensor].get();
        if !code.is_valid() {
            return Err(Error::NotYetAvailable);
        }
        Ok(self.variant.convert(code))
    }

    /// Read handle of one sensor, to be handed to its thermal zone.
    pub fn sensor(&self, index: usize) -> Option<Sensor<'_, P, Z>> {
        (index < self.num_sensors()).then_some(Sensor { ths: self, index })
    }

    pub fn num_sensors(&self) -> usize {
        self.variant.num_sensors()
    }

    pub fn variant(&self) -> &'static VariantDescriptor {
        self.variant
    }

    pub fn irq(&self) -> u32 {
        self.irq.irq()
    }

    pub fn state(&self) -> &sm::States {
        self.lifecycle.state()
    }

    /// Unbind: assert reset, gate the sensor and bus clocks, then free the interrupt.
    ///
    /// # Returns
    /// The final lifecycle state, [sm::States::Unbound] after a clean release.
    pub fn remove(mut self) -> sm::States {
        advance(&mut self.lifecycle, sm::Events::Unbind);
        let Self {
            reset,
            clk,
            bus_clk,
            irq,
            mut lifecycle,
            ..
        } = self;
        drop(reset);
        drop(clk);
        drop(bus_clk);
        drop(irq);
        advance(&mut lifecycle, sm::Events::Released);
        log::info!("THS unbound");
        *lifecycle.state()
    }
}

/// The read side of one sensor.
pub struct Sensor<'a, P: Platform, Z: ThermalZone> {
    ths: &'a Ths<P, Z>,
    index: usize,
}

impl<P: Platform, Z: ThermalZone> Sensor<'_, P, Z> {
    pub fn index(&self) -> usize {
        self.index
    }

    /// See [Ths::temperature].
    pub fn get_temp(&self) -> Result<i32, Error> {
        self.ths.temperature(self.index)
    }
}
