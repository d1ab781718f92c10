//! The chip framework: a socketed IC instance on top of the net model.
//!
//! A [`Chip`] binds a catalogue part to per-pin nets and owns everything the
//! part's evaluator cannot: the output register its output drivers read
//! from, the per-clock-pin history that edge detection compares against,
//! the part's internal state, and the re-entrancy guard. The board installs
//! its drivers and listeners (the setup protocol) and schedules the net
//! updates its evaluations propose.

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::logic::LogicState;
use crate::net::{Net, NetKey};
use crate::parts::{EvalContext, Part, PartFn, PartState, PinNumber, PinType, PinUpdate};
use crate::sched::SimTime;

new_key_type! {
    /// Stable handle to a socketed chip.
    pub struct ChipKey;
}

/// Output levels appear on the net this long after an evaluation proposes
/// them.
pub const DEFAULT_PROPAGATION_DELAY: SimTime = 10;

#[derive(Debug)]
pub struct Chip {
    id: String,
    part: PartFn,
    pins: Vec<PinType>,
    vcc_pin: PinNumber,
    gnd_pin: PinNumber,
    /// Net bound to each pin, indexed by pin number - 1.
    pin_nets: Vec<Option<NetKey>>,
    /// The level each output pin currently drives (while powered).
    outputs: Vec<LogicState>,
    state: PartState,
    /// Previous TTL-coerced sample per clock pin.
    last_clock: Vec<(PinNumber, LogicState)>,
    delay: SimTime,
    /// Suppresses synchronous re-entry into evaluation.
    evaluating: bool,
}

impl Chip {
    pub fn new(id: impl Into<String>, part: PartFn) -> Self {
        let pins = part.pins();
        let (vcc_pin, gnd_pin) = part.power_pins();
        let last_clock = pins
            .iter()
            .enumerate()
            .filter(|(_, ty)| **ty == PinType::Clock)
            // A never-driven clock pin has always read as (coerced) high.
            .map(|(i, _)| (i as PinNumber + 1, LogicState::High))
            .collect();
        Self {
            id: id.into(),
            state: part.init_state(),
            pin_nets: vec![None; pins.len()],
            outputs: vec![LogicState::Float; pins.len()],
            last_clock,
            delay: DEFAULT_PROPAGATION_DELAY,
            evaluating: false,
            vcc_pin,
            gnd_pin,
            pins,
            part,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn part_number(&self) -> &'static str {
        self.part.part_number()
    }

    pub fn pin_count(&self) -> PinNumber {
        self.pins.len() as PinNumber
    }

    pub fn pin_type(&self, pin: PinNumber) -> PinType {
        self.pins[usize::from(pin) - 1]
    }

    pub fn vcc_pin(&self) -> PinNumber {
        self.vcc_pin
    }

    pub fn gnd_pin(&self) -> PinNumber {
        self.gnd_pin
    }

    pub fn propagation_delay(&self) -> SimTime {
        self.delay
    }

    pub fn set_propagation_delay(&mut self, delay: SimTime) {
        self.delay = delay;
    }

    /// Binds (or rebinds, after a merge or split) a pin to a net.
    pub fn set_pin_net(&mut self, pin: PinNumber, net: NetKey) {
        self.pin_nets[usize::from(pin) - 1] = Some(net);
    }

    pub fn pin_net(&self, pin: PinNumber) -> Option<NetKey> {
        self.pin_nets[usize::from(pin) - 1]
    }

    fn level(&self, pin: PinNumber, nets: &SlotMap<NetKey, Net>) -> LogicState {
        self.pin_net(pin)
            .and_then(|key| nets.get(key))
            .map(Net::state)
            .unwrap_or_default()
    }

    /// Power validation: VCC high and GND low, anything else is unpowered.
    pub fn is_powered(&self, nets: &SlotMap<NetKey, Net>) -> bool {
        self.level(self.vcc_pin, nets) == LogicState::High
            && self.level(self.gnd_pin, nets) == LogicState::Low
    }

    /// The level this chip's output driver imposes on `pin`'s net.
    pub fn driven(&self, pin: PinNumber, nets: &SlotMap<NetKey, Net>) -> LogicState {
        if self.is_powered(nets) {
            self.outputs[usize::from(pin) - 1]
        } else {
            LogicState::Float
        }
    }

    /// Runs one evaluation cycle and returns the output pins whose register
    /// value changed; the caller schedules their net updates at
    /// [`propagation_delay`](Chip::propagation_delay).
    ///
    /// Unpowered chips propose `Float` on every output (so listeners hear
    /// about power-down) and skip the part evaluator, which also freezes the
    /// internal state. The clock history is refreshed either way, so a
    /// power cycle or async override never manufactures a stale edge.
    pub(crate) fn evaluate(&mut self, nets: &SlotMap<NetKey, Net>) -> SmallVec<[PinUpdate; 4]> {
        if self.evaluating {
            return SmallVec::new();
        }
        self.evaluating = true;

        let levels: Vec<LogicState> = (1..=self.pin_count())
            .map(|pin| self.level(pin, nets))
            .collect();

        let proposals: Vec<PinUpdate> = if self.is_powered(nets) {
            self.part.eval(EvalContext {
                levels: &levels,
                prev_clock: &self.last_clock,
                state: &mut self.state,
            })
        } else {
            self.pins
                .iter()
                .enumerate()
                .filter(|(_, ty)| **ty == PinType::Output)
                .map(|(i, _)| PinUpdate {
                    pin: i as PinNumber + 1,
                    state: LogicState::Float,
                })
                .collect()
        };

        for (pin, sample) in &mut self.last_clock {
            *sample = levels[usize::from(*pin) - 1].ttl_input();
        }

        let mut changed = SmallVec::new();
        for update in proposals {
            let slot = &mut self.outputs[usize::from(update.pin) - 1];
            if *slot != update.state {
                *slot = update.state;
                changed.push(update);
            }
        }

        self.evaluating = false;
        changed
    }

    /// Clears internal state, the output register, and the clock history
    /// back to power-up values. Pin bindings survive.
    pub fn reset(&mut self) {
        self.state = self.part.init_state();
        self.outputs.fill(LogicState::Float);
        for (_, sample) in &mut self.last_clock {
            *sample = LogicState::High;
        }
    }
}
