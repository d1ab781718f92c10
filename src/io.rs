//! External signal sources and sinks: the front-panel hardware.
//!
//! Sources (switches, clocks, buttons) own a boolean worth of state and a
//! net they drive; their levels are read through
//! [`Source::level`] when the net resolves. Sinks (LEDs, probes) are
//! listener targets the board updates on net transitions.

use slotmap::new_key_type;

use crate::logic::LogicState;
use crate::net::NetKey;
use crate::sched::SimTime;

new_key_type! {
    /// Stable handle to a signal source.
    pub struct SourceKey;
    /// Stable handle to an indicator LED.
    pub struct LedKey;
    /// Stable handle to a net probe.
    pub struct ProbeKey;
}

/// How long a mono-pulse button holds its output high after a press.
pub const DEFAULT_PULSE_WINDOW: SimTime = 100_000_000;

/// A front-panel signal source. All sources drive `Float` while system
/// power is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// A two-position toggle switch.
    Switch { on: bool, net: NetKey },
    /// A free-running square-wave generator.
    ///
    /// A periodic tick task toggles `phase` every `half_period`. The
    /// `generation` counter is bumped on every start, which strands ticks
    /// scheduled by a previous run; that is the stop handle.
    Clock {
        running: bool,
        phase: bool,
        half_period: SimTime,
        generation: u64,
        net: NetKey,
    },
    /// A mono-pulse push button: high for a fixed window after a press,
    /// with no retrigger while the window is active.
    Button {
        active: bool,
        window: SimTime,
        net: NetKey,
    },
}

impl Source {
    pub fn net(&self) -> NetKey {
        match self {
            Source::Switch { net, .. }
            | Source::Clock { net, .. }
            | Source::Button { net, .. } => *net,
        }
    }

    pub(crate) fn set_net(&mut self, new: NetKey) {
        match self {
            Source::Switch { net, .. }
            | Source::Clock { net, .. }
            | Source::Button { net, .. } => *net = new,
        }
    }

    /// The level this source imposes on its net.
    pub fn level(&self, power: bool) -> LogicState {
        if !power {
            return LogicState::Float;
        }
        match self {
            Source::Switch { on, .. } => LogicState::from(*on),
            Source::Clock { phase, .. } => LogicState::from(*phase),
            Source::Button { active, .. } => LogicState::from(*active),
        }
    }
}

/// What an indicator LED shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedMode {
    /// Low or floating input.
    #[default]
    Off,
    /// High input.
    On,
    /// Contention on the watched net.
    Fault,
}

impl From<LogicState> for LedMode {
    fn from(state: LogicState) -> Self {
        match state {
            LogicState::High => LedMode::On,
            LogicState::Low | LogicState::Float => LedMode::Off,
            LogicState::Error => LedMode::Fault,
        }
    }
}

/// An indicator LED attached to a net.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Led {
    pub(crate) net: NetKey,
    pub(crate) mode: LedMode,
}

impl Led {
    /// The net this LED watches.
    pub fn net(&self) -> NetKey {
        self.net
    }

    pub fn mode(&self) -> LedMode {
        self.mode
    }
}

/// Records every transition of a net, timestamped in logical nanoseconds.
#[derive(Debug, Clone)]
pub struct Probe {
    pub(crate) net: NetKey,
    pub(crate) log: Vec<(SimTime, LogicState)>,
}

impl Probe {
    /// The net this probe watches.
    pub fn net(&self) -> NetKey {
        self.net
    }

    /// The most recently observed state.
    pub fn last(&self) -> LogicState {
        self.log.last().map(|&(_, s)| s).unwrap_or_default()
    }

    /// All observed transitions, oldest first.
    pub fn log(&self) -> &[(SimTime, LogicState)] {
        &self.log
    }
}
