//! The breadboard: the aggregate that owns the engine, the wiring graph,
//! and every peripheral, and the only surface the UI talks to.
//!
//! All driver evaluation happens here because only the board can see both
//! the nets and the things drivers refer to (the power flag, source state,
//! chip output registers). Everything runs on one logical thread; the event
//! queue is the only ordering primitive.

use slotmap::SlotMap;
use smallvec::SmallVec;
use tracing::{info, trace, warn};

use crate::chip::{Chip, ChipKey};
use crate::engine::Engine;
use crate::io::{
    DEFAULT_PULSE_WINDOW, Led, LedKey, LedMode, Probe, ProbeKey, Source, SourceKey,
};
use crate::logic::{LogicState, resolve};
use crate::net::{Driver, Listener, NetKey, Rail};
use crate::parts::{self, PinType};
use crate::sched::{SimTime, Task};
use crate::wiring::{NetRemap, PinOwner, Wire, WireError, WireKey, Wiring};

/// Upper bound on tasks drained per [`Board::step`]. A zero-delay cycle
/// hits this and is deferred with a warning; delayed oscillation never
/// does, since each transition lands strictly later in logical time.
const STEP_TASK_LIMIT: usize = 100_000;

/// A notification for the UI layer, drained via [`Board::drain_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    WireAdded(WireKey),
    WireRemoved(WireKey),
    /// The listed pins now map to `net`; cached net references are stale.
    NetRemapped { pins: Vec<String>, net: NetKey },
}

#[derive(Debug)]
pub struct Board {
    engine: Engine,
    wiring: Wiring,
    chips: SlotMap<ChipKey, Chip>,
    sources: SlotMap<SourceKey, Source>,
    leds: SlotMap<LedKey, Led>,
    probes: SlotMap<ProbeKey, Probe>,
    events: Vec<BoardEvent>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// An empty board with the two supply rails and power off.
    pub fn new() -> Self {
        let mut board = Self {
            engine: Engine::new(),
            wiring: Wiring::new(),
            chips: SlotMap::with_key(),
            sources: SlotMap::with_key(),
            leds: SlotMap::with_key(),
            probes: SlotMap::with_key(),
            events: Vec::new(),
        };
        for (pin, rail) in [("vcc", Rail::Vcc), ("gnd", Rail::Gnd)] {
            let net = board.engine.create_net();
            match rail {
                Rail::Vcc => board.engine.nets[net].is_vcc = true,
                Rail::Gnd => board.engine.nets[net].is_gnd = true,
            }
            board.engine.add_driver(net, Driver::Rail(rail));
            board
                .wiring
                .register_pin(pin, net, PinType::Power, PinOwner::Rail(rail));
        }
        board
    }

    // ---- time ----------------------------------------------------------

    /// Current logical time in nanoseconds.
    pub fn now(&self) -> SimTime {
        self.engine.now()
    }

    /// Advances logical time by `dt` and drains every ripe task in
    /// timestamp-then-insertion order.
    pub fn step(&mut self, dt: SimTime) {
        self.engine.scheduler.advance(dt);
        let mut drained = 0usize;
        while let Some(task) = self.engine.scheduler.pop_ready() {
            self.run_task(task);
            drained += 1;
            if drained >= STEP_TASK_LIMIT {
                warn!(drained, "step task limit hit; deferring remaining work");
                break;
            }
        }
    }

    /// Advances up to `duration` in event-sized jumps, draining as it goes.
    pub fn run(&mut self, duration: SimTime) {
        let end = self.engine.now().saturating_add(duration);
        while let Some(next) = self.engine.scheduler.next_time() {
            if next > end {
                break;
            }
            let dt = next.saturating_sub(self.engine.now());
            self.step(dt);
        }
        let now = self.engine.now();
        if now < end {
            self.engine.scheduler.advance(end - now);
        }
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::UpdateNet(net) => {
                self.update_net(net);
            }
            Task::ClockTick { source, generation } => self.clock_tick(source, generation),
            Task::ReleaseButton(source) => self.release_button(source),
        }
    }

    // ---- power ---------------------------------------------------------

    pub fn power(&self) -> bool {
        self.engine.power
    }

    pub fn power_on(&mut self) {
        self.set_power(true);
    }

    pub fn power_off(&mut self) {
        self.set_power(false);
    }

    /// Flips the supply and queues updates for every net with a
    /// power-dependent driver; chip outputs follow through their power-pin
    /// listeners.
    pub fn set_power(&mut self, on: bool) {
        if self.engine.power == on {
            return;
        }
        self.engine.power = on;
        info!(on, "system power");

        let affected: Vec<NetKey> = self
            .engine
            .nets
            .iter()
            .filter(|(_, net)| {
                net.drivers.iter().any(|d| {
                    matches!(
                        d,
                        Driver::Rail(_) | Driver::Switch(_) | Driver::Clock(_) | Driver::Button(_)
                    )
                })
            })
            .map(|(key, _)| key)
            .collect();
        for net in affected {
            self.engine.schedule_net_update(net, 0);
        }
    }

    // ---- nets ----------------------------------------------------------

    /// Creates a bare net (for UI scratch use; chips and sources create
    /// their own).
    pub fn create_net(&mut self) -> NetKey {
        self.engine.create_net()
    }

    /// Registers a pin owned by the UI layer itself (a header, a test
    /// point). Pins owned by chips, sources, rails, and LEDs are registered
    /// by their install paths.
    pub fn register_pin(&mut self, pin: &str, net: NetKey, ty: PinType) {
        self.wiring.register_pin(pin, net, ty, PinOwner::Unattached);
    }

    /// Attaches a driver to a net. The attach is queued: dependents observe
    /// the level after the next zero-delay update drains.
    pub fn add_driver(&mut self, net: NetKey, driver: Driver) {
        if self.engine.nets.contains_key(net) {
            self.engine.add_driver(net, driver);
        }
    }

    pub fn net_state(&self, net: NetKey) -> LogicState {
        self.engine.net_state(net)
    }

    pub fn pin_net(&self, pin: &str) -> Option<NetKey> {
        self.wiring.pin_net(pin)
    }

    pub fn pin_state(&self, pin: &str) -> Option<LogicState> {
        self.pin_net(pin).map(|net| self.net_state(net))
    }

    /// Queues a resolution of `net` at `now + delay`.
    pub fn schedule_net_update(&mut self, net: NetKey, delay: SimTime) {
        self.engine.schedule_net_update(net, delay);
    }

    /// The level a driver currently imposes.
    fn driver_value(&self, driver: Driver) -> LogicState {
        match driver {
            Driver::Constant(state) => state,
            Driver::Rail(Rail::Vcc) => match self.engine.power {
                true => LogicState::High,
                false => LogicState::Float,
            },
            Driver::Rail(Rail::Gnd) => match self.engine.power {
                true => LogicState::Low,
                false => LogicState::Float,
            },
            Driver::Switch(key) | Driver::Clock(key) | Driver::Button(key) => self
                .sources
                .get(key)
                .map_or(LogicState::Float, |s| s.level(self.engine.power)),
            Driver::ChipOutput { chip, pin } => self
                .chips
                .get(chip)
                .map_or(LogicState::Float, |c| c.driven(pin, &self.engine.nets)),
        }
    }

    /// Re-resolves a net; on transition, stores the new state and notifies
    /// the listener set as snapshotted at the moment of transition (a
    /// listener added during notification misses this round). Returns
    /// whether the state changed.
    fn update_net(&mut self, key: NetKey) -> bool {
        let (previous, resolved, listeners) = {
            let Some(net) = self.engine.nets.get(key) else {
                trace!(net = ?key, "update for deleted net dropped");
                return false;
            };
            let resolved = resolve(net.drivers.iter().map(|&d| self.driver_value(d)));
            (net.state(), resolved, net.listeners.clone())
        };
        if resolved == previous {
            return false;
        }
        if resolved == LogicState::Error {
            warn!(net = ?key, "bus contention");
        }
        self.engine.nets[key].state = resolved;
        for listener in listeners {
            self.notify_listener(listener, resolved);
        }
        true
    }

    fn notify_listener(&mut self, listener: Listener, state: LogicState) {
        match listener {
            Listener::Chip(chip) => self.trigger_evaluation(chip),
            Listener::Led(led) => {
                if let Some(led) = self.leds.get_mut(led) {
                    led.mode = LedMode::from(state);
                }
            }
            Listener::Probe(probe) => {
                let now = self.engine.now();
                if let Some(probe) = self.probes.get_mut(probe) {
                    probe.log.push((now, state));
                }
            }
        }
    }

    /// Attaches a listener and, if it is new on this net, invokes it once
    /// with the net's current state.
    fn attach_listener(&mut self, net: NetKey, listener: Listener) {
        if self.engine.add_listener(net, listener) {
            let state = self.engine.net_state(net);
            self.notify_listener(listener, state);
        }
    }

    // ---- chips ---------------------------------------------------------

    /// Sockets a fresh chip: one net per pin, pins registered as
    /// `"<id>-pin-<n>"`, output drivers and input/clock/power listeners
    /// installed, then an initial evaluation. `None` on an unknown part
    /// number.
    pub fn place_chip(&mut self, part_number: &str, id: &str) -> Option<ChipKey> {
        let part = parts::instantiate(part_number)?;
        let chip = Chip::new(id, part);
        let count = chip.pin_count();
        let key = self.chips.insert(chip);
        for pin in 1..=count {
            let net = self.engine.create_net();
            let ty = self.chips[key].pin_type(pin);
            self.chips[key].set_pin_net(pin, net);
            self.wiring.register_pin(
                format!("{id}-pin-{pin}"),
                net,
                ty,
                PinOwner::Chip { chip: key, pin },
            );
            match ty {
                PinType::Output => {
                    self.engine.add_driver(net, Driver::ChipOutput { chip: key, pin });
                }
                PinType::Input | PinType::Clock | PinType::Power => {
                    self.attach_listener(net, Listener::Chip(key));
                }
                PinType::Nc => {}
            }
        }
        self.trigger_evaluation(key);
        Some(key)
    }

    pub fn chip(&self, key: ChipKey) -> Option<&Chip> {
        self.chips.get(key)
    }

    pub fn chips(&self) -> impl Iterator<Item = (ChipKey, &Chip)> {
        self.chips.iter()
    }

    /// Runs one evaluation cycle and schedules updates for every output
    /// net whose register changed, after the chip's propagation delay.
    pub fn trigger_evaluation(&mut self, key: ChipKey) {
        let Some(chip) = self.chips.get_mut(key) else {
            return;
        };
        let changed = chip.evaluate(&self.engine.nets);
        if changed.is_empty() {
            return;
        }
        let delay = chip.propagation_delay();
        let nets: SmallVec<[NetKey; 4]> = changed
            .iter()
            .filter_map(|update| chip.pin_net(update.pin))
            .collect();
        for net in nets {
            self.engine.schedule_net_update(net, delay);
        }
    }

    /// Clears a chip back to power-up state and re-drives its outputs.
    pub fn reset_chip(&mut self, key: ChipKey) {
        let Some(chip) = self.chips.get_mut(key) else {
            return;
        };
        chip.reset();
        let nets: Vec<NetKey> = (1..=chip.pin_count())
            .filter(|&pin| chip.pin_type(pin) == PinType::Output)
            .filter_map(|pin| chip.pin_net(pin))
            .collect();
        for net in nets {
            self.engine.schedule_net_update(net, 0);
        }
        self.trigger_evaluation(key);
    }

    pub fn set_propagation_delay(&mut self, key: ChipKey, delay: SimTime) {
        if let Some(chip) = self.chips.get_mut(key) {
            chip.set_propagation_delay(delay);
        }
    }

    // ---- wiring --------------------------------------------------------

    /// Adds a wire between two registered pins, merging their nets.
    pub fn add_wire(
        &mut self,
        source: &str,
        target: &str,
        color: &str,
    ) -> Result<WireKey, WireError> {
        let (key, remap) = self
            .wiring
            .add_wire(source, target, color, &mut self.engine)?;
        if let Some(remap) = remap {
            self.apply_remap(&remap);
            self.events.push(BoardEvent::NetRemapped {
                pins: remap.pins,
                net: remap.net,
            });
        }
        self.events.push(BoardEvent::WireAdded(key));
        Ok(key)
    }

    /// Removes a wire; each side of the cut lands on a fresh net with its
    /// drivers and listeners re-registered. Returns false for an unknown
    /// wire.
    pub fn remove_wire(&mut self, key: WireKey) -> bool {
        let Some((_wire, remaps, orphan)) = self.wiring.remove_wire(key, &mut self.engine) else {
            return false;
        };
        for remap in remaps {
            self.apply_remap(&remap);
            self.events.push(BoardEvent::NetRemapped {
                pins: remap.pins,
                net: remap.net,
            });
        }
        self.engine.discard_net(orphan);
        self.events.push(BoardEvent::WireRemoved(key));
        true
    }

    pub fn wire(&self, key: WireKey) -> Option<&Wire> {
        self.wiring.wire(key)
    }

    pub fn wires(&self) -> impl Iterator<Item = (WireKey, &Wire)> {
        self.wiring.wires()
    }

    /// Rebinds every pin the wiring graph moved: chips update their pin
    /// references and re-register drivers/listeners (idempotent on a merge
    /// survivor, essential on a rebuilt fresh net), sources and rails
    /// re-attach their drivers, LEDs re-attach and refresh.
    fn apply_remap(&mut self, remap: &NetRemap) {
        let net = remap.net;
        let mut touched_chips: SmallVec<[ChipKey; 4]> = SmallVec::new();

        for pin_id in &remap.pins {
            let Some(info) = self.wiring.pin_info(pin_id) else {
                continue;
            };
            let (ty, owner) = (info.ty, info.owner);
            match owner {
                PinOwner::Chip { chip, pin } => {
                    if let Some(c) = self.chips.get_mut(chip) {
                        c.set_pin_net(pin, net);
                    }
                    match ty {
                        PinType::Output => {
                            self.engine.add_driver(net, Driver::ChipOutput { chip, pin });
                        }
                        PinType::Input | PinType::Clock | PinType::Power => {
                            self.attach_listener(net, Listener::Chip(chip));
                        }
                        PinType::Nc => {}
                    }
                    if !touched_chips.contains(&chip) {
                        touched_chips.push(chip);
                    }
                }
                PinOwner::Source(key) => {
                    let driver = match self.sources.get_mut(key) {
                        Some(source) => {
                            source.set_net(net);
                            match source {
                                Source::Switch { .. } => Driver::Switch(key),
                                Source::Clock { .. } => Driver::Clock(key),
                                Source::Button { .. } => Driver::Button(key),
                            }
                        }
                        None => continue,
                    };
                    self.engine.add_driver(net, driver);
                }
                PinOwner::Led(key) => {
                    if let Some(led) = self.leds.get_mut(key) {
                        led.net = net;
                    }
                    self.attach_listener(net, Listener::Led(key));
                }
                PinOwner::Rail(rail) => {
                    match rail {
                        Rail::Vcc => self.engine.nets[net].is_vcc = true,
                        Rail::Gnd => self.engine.nets[net].is_gnd = true,
                    }
                    self.engine.add_driver(net, Driver::Rail(rail));
                }
                PinOwner::Unattached => {}
            }
        }

        for chip in touched_chips {
            self.trigger_evaluation(chip);
        }
    }

    /// Drains queued UI notifications, oldest first.
    pub fn drain_events(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }

    // ---- sources and sinks --------------------------------------------

    /// Installs a toggle switch (initially off) behind a pin.
    pub fn add_switch(&mut self, pin: &str) -> SourceKey {
        let net = self.engine.create_net();
        let key = self.sources.insert(Source::Switch { on: false, net });
        self.engine.add_driver(net, Driver::Switch(key));
        self.wiring
            .register_pin(pin, net, PinType::Output, PinOwner::Source(key));
        key
    }

    pub fn set_switch(&mut self, key: SourceKey, on: bool) {
        let Some(Source::Switch { on: state, net }) = self.sources.get_mut(key) else {
            return;
        };
        if *state != on {
            *state = on;
            let net = *net;
            self.engine.schedule_net_update(net, 0);
        }
    }

    /// Installs a square-wave generator (initially stopped) behind a pin.
    pub fn add_clock(&mut self, pin: &str, frequency_hz: f64) -> SourceKey {
        let half_period = ((500_000_000.0 / frequency_hz) as SimTime).max(1);
        let net = self.engine.create_net();
        let key = self.sources.insert(Source::Clock {
            running: false,
            phase: false,
            half_period,
            generation: 0,
            net,
        });
        self.engine.add_driver(net, Driver::Clock(key));
        self.wiring
            .register_pin(pin, net, PinType::Output, PinOwner::Source(key));
        key
    }

    pub fn start_clock(&mut self, key: SourceKey) {
        let Some(Source::Clock { running, half_period, generation, .. }) =
            self.sources.get_mut(key)
        else {
            return;
        };
        if *running {
            return;
        }
        *running = true;
        *generation += 1;
        let (half_period, generation) = (*half_period, *generation);
        self.engine
            .schedule(half_period, Task::ClockTick { source: key, generation });
    }

    pub fn stop_clock(&mut self, key: SourceKey) {
        if let Some(Source::Clock { running, .. }) = self.sources.get_mut(key) {
            *running = false;
        }
    }

    fn clock_tick(&mut self, key: SourceKey, tick_generation: u64) {
        let Some(Source::Clock { running, phase, half_period, generation, net }) =
            self.sources.get_mut(key)
        else {
            trace!(source = ?key, "tick for removed clock dropped");
            return;
        };
        if !*running || *generation != tick_generation {
            return;
        }
        *phase = !*phase;
        let (net, half_period) = (*net, *half_period);
        self.engine.schedule_net_update(net, 0);
        self.engine.schedule(
            half_period,
            Task::ClockTick { source: key, generation: tick_generation },
        );
    }

    /// Installs a mono-pulse button with the default 100 ms window.
    pub fn add_button(&mut self, pin: &str) -> SourceKey {
        self.add_button_with_window(pin, DEFAULT_PULSE_WINDOW)
    }

    pub fn add_button_with_window(&mut self, pin: &str, window: SimTime) -> SourceKey {
        let net = self.engine.create_net();
        let key = self
            .sources
            .insert(Source::Button { active: false, window, net });
        self.engine.add_driver(net, Driver::Button(key));
        self.wiring
            .register_pin(pin, net, PinType::Output, PinOwner::Source(key));
        key
    }

    /// Starts a pulse; ignored while a pulse is already active.
    pub fn press_button(&mut self, key: SourceKey) {
        let Some(Source::Button { active, window, net }) = self.sources.get_mut(key) else {
            return;
        };
        if *active {
            return;
        }
        *active = true;
        let (window, net) = (*window, *net);
        self.engine.schedule_net_update(net, 0);
        self.engine.schedule(window, Task::ReleaseButton(key));
    }

    fn release_button(&mut self, key: SourceKey) {
        let Some(Source::Button { active, net, .. }) = self.sources.get_mut(key) else {
            return;
        };
        *active = false;
        let net = *net;
        self.engine.schedule_net_update(net, 0);
    }

    pub fn source(&self, key: SourceKey) -> Option<&Source> {
        self.sources.get(key)
    }

    /// Installs an indicator LED behind a pin.
    pub fn add_led(&mut self, pin: &str) -> LedKey {
        let net = self.engine.create_net();
        let key = self.leds.insert(Led { net, mode: LedMode::Off });
        self.wiring
            .register_pin(pin, net, PinType::Input, PinOwner::Led(key));
        self.attach_listener(net, Listener::Led(key));
        key
    }

    pub fn led_mode(&self, key: LedKey) -> LedMode {
        self.leds.get(key).map(|led| led.mode).unwrap_or_default()
    }

    /// Attaches a transition recorder to a net.
    pub fn add_probe(&mut self, net: NetKey) -> ProbeKey {
        let state = self.engine.net_state(net);
        let key = self.probes.insert(Probe {
            net,
            log: vec![(self.engine.now(), state)],
        });
        if self.engine.nets.contains_key(net) {
            self.engine.add_listener(net, Listener::Probe(key));
        }
        key
    }

    pub fn probe(&self, key: ProbeKey) -> Option<&Probe> {
        self.probes.get(key)
    }
}
