//! Mock platform collaborators that record every interaction in order.
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::vec::Vec;

use crate::platform::{
    Clock, InterruptLine, Platform, PlatformError, ResetControl, ThermalEvent,
    ThermalZone, ThermalZones,
};
use crate::registers::{Register, RegisterBlock};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Read(&'static str, usize),
    Write(&'static str, usize, u32),
    Irq(u32),
    IrqFree(u32),
    ClockEnable(&'static str),
    ClockDisable(&'static str),
    ClockRate(&'static str, u32),
    ResetAssert,
    ResetDeassert,
    ZoneRegister(usize),
    ZoneUpdate(usize, ThermalEvent),
}

#[derive(Default)]
struct State {
    events: Vec<Event>,
    fail: Vec<Event>,
    memory: BTreeMap<&'static str, Rc<RefCell<Vec<u32>>>>,
}

/// Shared recorder. All mocks created from one tracker log into the same event list.
#[derive(Clone, Default)]
pub struct Tracker(Rc<RefCell<State>>);

impl Tracker {
    /// Make the next occurrence of `event` fail instead of being recorded.
    pub fn fail(&self, event: Event) {
        self.0.borrow_mut().fail.push(event);
    }

    fn record(&self, event: Event) -> Result<(), PlatformError> {
        let mut state = self.0.borrow_mut();
        if let Some(i) = state.fail.iter().position(|e| *e == event) {
            state.fail.remove(i);
            return Err(PlatformError::Io(-5));
        }
        state.events.push(event);
        Ok(())
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().events.clone()
    }

    /// Events other than register accesses.
    pub fn lifecycle(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| !matches!(e, Event::Read(..) | Event::Write(..)))
            .collect()
    }

    /// Register writes to the named region, decoded as THS registers.
    pub fn writes(&self, name: &str) -> Vec<(Register, u32)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Write(n, offset, value) if n == name => {
                    Some((Register::try_from(offset).unwrap(), value))
                }
                _ => None,
            })
            .collect()
    }

    /// Zone updates in order.
    pub fn updates(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::ZoneUpdate(sensor, _) => Some(sensor),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().events.clear();
    }

    /// Whether the named clock was enabled more often than disabled.
    pub fn enabled(&self, name: &str) -> bool {
        self.events().iter().fold(0i32, |n, e| match e {
            Event::ClockEnable(c) if *c == name => n + 1,
            Event::ClockDisable(c) if *c == name => n - 1,
            _ => n,
        }) > 0
    }

    /// Whether `irq` was claimed more often than freed.
    pub fn claimed(&self, irq: u32) -> bool {
        self.events().iter().fold(0i32, |n, e| match e {
            Event::Irq(i) if *i == irq => n + 1,
            Event::IrqFree(i) if *i == irq => n - 1,
            _ => n,
        }) > 0
    }

    /// Whether the reset line is asserted. Lines start out asserted.
    pub fn in_reset(&self) -> bool {
        !matches!(
            self.events()
                .iter()
                .rev()
                .find(|e| matches!(e, Event::ResetAssert | Event::ResetDeassert)),
            Some(Event::ResetDeassert)
        )
    }

    /// A register region of `words` words backed by memory shared per name.
    pub fn region(&self, name: &'static str, words: usize) -> Region {
        let memory = self
            .0
            .borrow_mut()
            .memory
            .entry(name)
            .or_default()
            .clone();
        {
            let mut m = memory.borrow_mut();
            if m.len() < words {
                m.resize(words, 0);
            }
        }
        Region {
            tracker: self.clone(),
            name,
            memory,
        }
    }

    pub fn clock(&self, name: &'static str) -> MockClock {
        MockClock {
            tracker: self.clone(),
            name,
        }
    }

    pub fn reset(&self, _name: &'static str) -> MockReset {
        MockReset {
            tracker: self.clone(),
        }
    }
}

pub struct Region {
    tracker: Tracker,
    name: &'static str,
    memory: Rc<RefCell<Vec<u32>>>,
}

impl Region {
    /// Set a word without recording an access.
    pub fn set(&self, offset: usize, value: u32) {
        self.memory.borrow_mut()[offset / 4] = value;
    }

    pub fn get(&self, offset: usize) -> u32 {
        self.memory.borrow()[offset / 4]
    }
}

impl RegisterBlock for Region {
    fn read(&self, offset: usize) -> u32 {
        self.tracker.record(Event::Read(self.name, offset)).unwrap();
        self.get(offset)
    }

    fn write(&self, offset: usize, value: u32) {
        self.tracker
            .record(Event::Write(self.name, offset, value))
            .unwrap();
        let mut m = self.memory.borrow_mut();
        if self.name == "ths" && offset == Register::Stat.offset() {
            // write one to clear
            m[offset / 4] &= !value;
        } else {
            m[offset / 4] = value;
        }
    }
}

pub struct MockIrq {
    tracker: Tracker,
    irq: u32,
}

impl InterruptLine for MockIrq {
    fn free(&mut self) {
        self.tracker.record(Event::IrqFree(self.irq)).unwrap();
    }
}

pub struct MockClock {
    tracker: Tracker,
    name: &'static str,
}

impl Clock for MockClock {
    fn enable(&mut self) -> Result<(), PlatformError> {
        self.tracker.record(Event::ClockEnable(self.name))
    }

    fn disable(&mut self) {
        self.tracker.record(Event::ClockDisable(self.name)).unwrap();
    }

    fn set_rate(&mut self, hz: u32) -> Result<(), PlatformError> {
        self.tracker.record(Event::ClockRate(self.name, hz))
    }
}

pub struct MockReset {
    tracker: Tracker,
}

impl ResetControl for MockReset {
    fn assert(&mut self) -> Result<(), PlatformError> {
        self.tracker.record(Event::ResetAssert)
    }

    fn deassert(&mut self) -> Result<(), PlatformError> {
        self.tracker.record(Event::ResetDeassert)
    }
}

pub struct MockZone {
    tracker: Tracker,
    sensor: usize,
}

impl ThermalZone for MockZone {
    fn update(&self, event: ThermalEvent) {
        self.tracker
            .record(Event::ZoneUpdate(self.sensor, event))
            .unwrap();
    }
}

pub struct MockZones(pub Tracker);

impl ThermalZones for MockZones {
    type Zone = MockZone;

    fn register(&mut self, sensor: usize) -> Result<MockZone, PlatformError> {
        self.0.record(Event::ZoneRegister(sensor))?;
        Ok(MockZone {
            tracker: self.0.clone(),
            sensor,
        })
    }
}

/// A platform providing every resource except the ones listed as missing.
pub struct MockPlatform {
    pub tracker: Tracker,
    pub missing_regions: Vec<&'static str>,
    pub missing_clocks: Vec<&'static str>,
    pub missing_resets: Vec<&'static str>,
}

impl MockPlatform {
    pub fn new(tracker: &Tracker) -> Self {
        Self {
            tracker: tracker.clone(),
            missing_regions: Vec::new(),
            missing_clocks: Vec::new(),
            missing_resets: Vec::new(),
        }
    }
}

fn lookup(missing: &[&str], name: &str) -> Result<(), PlatformError> {
    if missing.contains(&name) {
        Err(PlatformError::NotFound)
    } else {
        Ok(())
    }
}

impl Platform for MockPlatform {
    type Registers = Region;
    type Clock = MockClock;
    type Reset = MockReset;
    type Irq = MockIrq;

    fn map(&mut self, name: &'static str) -> Result<Region, PlatformError> {
        lookup(&self.missing_regions, name)?;
        let words = if name == "ths" { 0x90 / 4 } else { 2 };
        Ok(self.tracker.region(name, words))
    }

    /// A line that is already claimed is busy.
    fn request_irq(&mut self, irq: u32) -> Result<MockIrq, PlatformError> {
        if self.tracker.claimed(irq) {
            return Err(PlatformError::Busy);
        }
        self.tracker.record(Event::Irq(irq))?;
        Ok(MockIrq {
            tracker: self.tracker.clone(),
            irq,
        })
    }

    fn clock(&mut self, name: &'static str) -> Result<MockClock, PlatformError> {
        lookup(&self.missing_clocks, name)?;
        Ok(self.tracker.clock(name))
    }

    fn reset(&mut self, name: &'static str) -> Result<MockReset, PlatformError> {
        lookup(&self.missing_resets, name)?;
        Ok(self.tracker.reset(name))
    }
}
