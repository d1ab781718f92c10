//! The 74LS part catalogue and the interfaces parts implement.
//!
//! Each part is a zero-sized struct implementing [`Part`]: it declares its
//! pin map (types for pins 1..=N, the nominated supply pins) and an
//! evaluator from a snapshot of pin levels to proposed output levels. The
//! framework in [`chip`](crate::chip) owns everything stateful (the output
//! register, the clock history, the part's internal state) and feeds it
//! back in through [`EvalContext`].
//!
//! ## The module notably consists of:
//! - **[`Part`]**: the interface all catalogue parts implement.
//! - **[`PartFn`]**: the closed enum of every supported part.
//! - **[`EvalContext`] and [`PinUpdate`]**: evaluation input and output.
//! - **[`instantiate`] / [`PART_NUMBERS`]**: the part-number registry.

use enum_dispatch::enum_dispatch;

use crate::logic::LogicState;

pub use arith::*;
pub use counters::*;
pub use decode::*;
pub use flops::*;
pub use gates::*;
pub use muxes::*;

mod arith;
mod counters;
mod decode;
mod flops;
mod gates;
mod muxes;

/// A 1-based DIP pin number.
pub type PinNumber = u8;

/// The electrical role of a chip pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PinType {
    /// Reads a level from its net (with TTL float-reads-high coercion).
    Input,
    /// Drives its net from the chip's output register.
    Output,
    /// An input that participates in edge detection.
    Clock,
    /// VCC or GND.
    Power,
    /// Not connected.
    Nc,
}

/// A proposed new level for one output pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinUpdate {
    pub pin: PinNumber,
    pub state: LogicState,
}

/// Internal state of a sequential part.
///
/// Closed, like the catalogue itself: combinational parts are
/// [`Stateless`](PartState::Stateless), the flip-flop parts keep one latch
/// level per half, and the ripple counters keep their two sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartState {
    Stateless,
    /// Latched Q level per flip-flop half.
    Flops([LogicState; 2]),
    /// Ripple counter sections: the mod-2 unit and the mod-5/mod-8 chain.
    Counter { unit: bool, high: u8 },
}

/// Everything an evaluator sees: the raw pin level snapshot, the previous
/// coerced clock samples, and the part's internal state.
pub struct EvalContext<'a> {
    /// Raw net level per pin, indexed by pin number - 1.
    pub(crate) levels: &'a [LogicState],
    /// Previous TTL-coerced sample per clock pin.
    pub(crate) prev_clock: &'a [(PinNumber, LogicState)],
    /// The part's internal state.
    pub state: &'a mut PartState,
}

impl EvalContext<'_> {
    /// The raw level on a pin's net.
    pub fn raw(&self, pin: PinNumber) -> LogicState {
        self.levels[usize::from(pin) - 1]
    }

    /// The level the TTL input stage observes (floating reads high).
    pub fn input(&self, pin: PinNumber) -> LogicState {
        self.raw(pin).ttl_input()
    }

    fn prev(&self, pin: PinNumber) -> LogicState {
        self.prev_clock
            .iter()
            .find(|(p, _)| *p == pin)
            .map(|(_, level)| *level)
            .unwrap_or(LogicState::High)
    }

    /// Whether this evaluation sees a clean low-to-high transition on `pin`.
    pub fn rising(&self, pin: PinNumber) -> bool {
        self.prev(pin) == LogicState::Low && self.input(pin) == LogicState::High
    }

    /// Whether this evaluation sees a clean high-to-low transition on `pin`.
    pub fn falling(&self, pin: PinNumber) -> bool {
        self.prev(pin) == LogicState::High && self.input(pin) == LogicState::Low
    }
}

/// The interface defining a catalogue part.
///
/// Evaluators are pure over the context: they never touch nets or the
/// scheduler, and the framework applies power gating (an unpowered chip
/// proposes `Float` everywhere without calling `eval` at all).
#[enum_dispatch]
pub trait Part {
    /// The 74LS part number, e.g. `"74LS00"`.
    fn part_number(&self) -> &'static str;

    /// Pin types for pins `1..=N` (index 0 is pin 1). Called once at
    /// socket time; the result must not change between calls.
    fn pins(&self) -> Vec<PinType>;

    /// The nominated `(VCC, GND)` pins. Defaults to the DIP convention
    /// (14/7 and 16/8); the JK and counter parts override.
    fn power_pins(&self) -> (PinNumber, PinNumber) {
        let count = self.pins().len() as PinNumber;
        (count, count / 2)
    }

    /// Fresh internal state for a newly socketed (or reset) chip.
    fn init_state(&self) -> PartState {
        PartState::Stateless
    }

    /// Computes proposed output levels from the current snapshot.
    fn eval(&self, ctx: EvalContext<'_>) -> Vec<PinUpdate>;
}

/// Every supported part, dispatching [`Part`] over the closed catalogue.
#[enum_dispatch(Part)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum PartFn {
    // Gates
    Ls00, Ls02, Ls04, Ls08, Ls32, Ls86,
    // Decoders
    Ls47, Ls138,
    // Muxes
    Ls151, Ls153, Ls157,
    // Arithmetic
    Ls283,
    // Flip-flops
    Ls74, Ls76,
    // Counters
    Ls90, Ls93,
}

/// Every part number the trainer stocks, in catalogue order.
pub const PART_NUMBERS: [&str; 16] = [
    "74LS00", "74LS02", "74LS04", "74LS08", "74LS32", "74LS47", "74LS74",
    "74LS76", "74LS86", "74LS90", "74LS93", "74LS138", "74LS151", "74LS153",
    "74LS157", "74LS283",
];

/// Looks up a part number and constructs a fresh part.
///
/// Returns `None` for an unknown part number; callers must check.
pub fn instantiate(part_number: &str) -> Option<PartFn> {
    let part = match part_number {
        "74LS00" => Ls00.into(),
        "74LS02" => Ls02.into(),
        "74LS04" => Ls04.into(),
        "74LS08" => Ls08.into(),
        "74LS32" => Ls32.into(),
        "74LS47" => Ls47.into(),
        "74LS74" => Ls74.into(),
        "74LS76" => Ls76.into(),
        "74LS86" => Ls86.into(),
        "74LS90" => Ls90.into(),
        "74LS93" => Ls93.into(),
        "74LS138" => Ls138.into(),
        "74LS151" => Ls151.into(),
        "74LS153" => Ls153.into(),
        "74LS157" => Ls157.into(),
        "74LS283" => Ls283.into(),
        _ => return None,
    };
    Some(part)
}

/// Builds a pin map from explicit `(pin, type)` assignments; unlisted pins
/// are not-connected.
fn pin_map(count: PinNumber, assignments: &[(PinNumber, PinType)]) -> Vec<PinType> {
    let mut pins = vec![PinType::Nc; usize::from(count)];
    for &(pin, ty) in assignments {
        pins[usize::from(pin) - 1] = ty;
    }
    pins
}

#[cfg(test)]
pub(crate) mod bench {
    //! A part-level test harness: holds the level snapshot, the clock
    //! history, and the part state the framework would own, so truth tables
    //! and edge sequences can be driven without building a board.

    use super::*;

    pub struct Bench {
        levels: Vec<LogicState>,
        prev_clock: Vec<(PinNumber, LogicState)>,
        pub state: PartState,
    }

    impl Bench {
        pub fn new<P: Part>(part: &P) -> Self {
            let pins = part.pins();
            let prev_clock = pins
                .iter()
                .enumerate()
                .filter(|(_, ty)| **ty == PinType::Clock)
                // A never-driven clock has always read as (coerced) high.
                .map(|(i, _)| (i as PinNumber + 1, LogicState::High))
                .collect();
            Self {
                levels: vec![LogicState::Float; pins.len()],
                prev_clock,
                state: part.init_state(),
            }
        }

        pub fn set(&mut self, pin: PinNumber, level: LogicState) -> &mut Self {
            self.levels[usize::from(pin) - 1] = level;
            self
        }

        /// Runs one evaluation and refreshes the clock history, exactly as
        /// the framework would.
        pub fn eval<P: Part>(&mut self, part: &P) -> Vec<PinUpdate> {
            let updates = part.eval(EvalContext {
                levels: &self.levels,
                prev_clock: &self.prev_clock,
                state: &mut self.state,
            });
            for (pin, last) in &mut self.prev_clock {
                *last = self.levels[usize::from(*pin) - 1].ttl_input();
            }
            updates
        }

        /// The proposed level for `pin` in a set of updates.
        pub fn output(updates: &[PinUpdate], pin: PinNumber) -> LogicState {
            updates
                .iter()
                .find(|u| u.pin == pin)
                .map(|u| u.state)
                .expect("evaluator should propose a level for every output pin")
        }
    }
}
