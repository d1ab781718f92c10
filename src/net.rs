//! Electrical nets and the driver/listener model.
//!
//! A net is an equipotential region formed by wired-together pins. Drivers
//! impose levels on it, listeners are notified when its resolved state
//! transitions. Both are small closed variants rather than boxed closures:
//! they stay `Copy`, printable, and trivially re-registerable after a net
//! merge or rebuild.

use slotmap::new_key_type;
use smallvec::SmallVec;

use crate::chip::ChipKey;
use crate::io::{LedKey, ProbeKey, SourceKey};
use crate::logic::LogicState;
use crate::parts::PinNumber;

new_key_type! {
    /// Stable handle to a net in the engine's arena.
    pub struct NetKey;
}

/// The two supply rails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rail {
    Vcc,
    Gnd,
}

/// A source that imposes a level on a net.
///
/// The level a driver yields is evaluated against the board (power flag,
/// source state, chip output registers); the net itself only records which
/// drivers are attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    /// A fixed level, independent of power.
    Constant(LogicState),
    /// A supply rail: high/low while system power is on, floating otherwise.
    Rail(Rail),
    /// A toggle switch's pole.
    Switch(SourceKey),
    /// A clock generator's output.
    Clock(SourceKey),
    /// A mono-pulse button's output.
    Button(SourceKey),
    /// A chip's output pin: its output register while the chip is powered,
    /// floating otherwise.
    ChipOutput { chip: ChipKey, pin: PinNumber },
}

/// A sink notified when a net's resolved state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listener {
    /// Re-evaluate the chip (input, clock, or power pin).
    Chip(ChipKey),
    /// Reflect the level on an indicator LED.
    Led(LedKey),
    /// Record the transition in a probe's log.
    Probe(ProbeKey),
}

/// An electrical node: resolved state plus its driver and listener sets.
#[derive(Debug, Default)]
pub struct Net {
    /// Cached result of resolving the drivers at the last settled update.
    pub(crate) state: LogicState,
    pub(crate) drivers: SmallVec<[Driver; 4]>,
    pub(crate) listeners: SmallVec<[Listener; 4]>,
    /// Informational: this net is (merged with) the VCC rail.
    pub(crate) is_vcc: bool,
    /// Informational: this net is (merged with) the GND rail.
    pub(crate) is_gnd: bool,
}

impl Net {
    pub fn new() -> Self {
        Default::default()
    }

    /// Current resolved state.
    pub fn state(&self) -> LogicState {
        self.state
    }

    pub fn is_vcc(&self) -> bool {
        self.is_vcc
    }

    pub fn is_gnd(&self) -> bool {
        self.is_gnd
    }

    /// Attaches a driver. Returns false if it was already attached
    /// (driver sets are sets, so re-registration after a remap is a no-op).
    pub(crate) fn add_driver(&mut self, driver: Driver) -> bool {
        if self.drivers.contains(&driver) {
            return false;
        }
        self.drivers.push(driver);
        true
    }

    /// Attaches a listener, deduplicating like [`Net::add_driver`].
    pub(crate) fn add_listener(&mut self, listener: Listener) -> bool {
        if self.listeners.contains(&listener) {
            return false;
        }
        self.listeners.push(listener);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::LogicState::*;

    #[test]
    fn fresh_net_floats() {
        let net = Net::new();
        assert_eq!(net.state(), Float);
        assert!(net.drivers.is_empty());
        assert!(net.listeners.is_empty());
    }

    #[test]
    fn driver_set_deduplicates() {
        let mut net = Net::new();
        assert!(net.add_driver(Driver::Constant(High)));
        assert!(!net.add_driver(Driver::Constant(High)));
        assert!(net.add_driver(Driver::Constant(Low)));
        assert_eq!(net.drivers.len(), 2);
    }

    #[test]
    fn listener_set_deduplicates() {
        let mut net = Net::new();
        let led = {
            let mut arena: slotmap::SlotMap<LedKey, ()> = slotmap::SlotMap::with_key();
            arena.insert(())
        };
        assert!(net.add_listener(Listener::Led(led)));
        assert!(!net.add_listener(Listener::Led(led)));
        assert_eq!(net.listeners.len(), 1);
    }
}
