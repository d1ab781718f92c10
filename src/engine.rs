//! The circuit engine: the net arena, the scheduler, and the power flag.
//!
//! The engine owns every net and hands out [`NetKey`] handles. Merging and
//! discarding nets invalidates keys, so collaborators must rebind through
//! the wiring graph's remap notifications rather than hold on to old keys.
//! Resolution itself lives on [`Board`](crate::board::Board), which can see
//! the chips and sources that drivers refer to.

use slotmap::SlotMap;
use tracing::{debug, trace};

use crate::net::{Driver, Listener, Net, NetKey};
use crate::sched::{Scheduler, SimTime, Task};

#[derive(Debug, Default)]
pub struct Engine {
    pub(crate) nets: SlotMap<NetKey, Net>,
    pub(crate) scheduler: Scheduler,
    /// Global supply switch. Rails, switches, clocks, and buttons drive
    /// `Float` while this is off.
    pub(crate) power: bool,
}

impl Engine {
    pub fn new() -> Self {
        Default::default()
    }

    /// Current logical time in nanoseconds.
    pub fn now(&self) -> SimTime {
        self.scheduler.now()
    }

    /// Creates a fresh, floating net.
    pub fn create_net(&mut self) -> NetKey {
        self.nets.insert(Net::new())
    }

    /// Drops a net orphaned by a split rebuild.
    pub(crate) fn discard_net(&mut self, key: NetKey) {
        if self.nets.remove(key).is_some() {
            trace!(net = ?key, "discarded orphan net");
        }
    }

    /// The resolved state of a net; `Float` for a key that no longer exists.
    pub fn net_state(&self, key: NetKey) -> crate::logic::LogicState {
        self.nets.get(key).map(Net::state).unwrap_or_default()
    }

    /// Attaches a driver and queues a resolution at the current time, so
    /// dependents observe the change on the next drain.
    pub(crate) fn add_driver(&mut self, key: NetKey, driver: Driver) {
        if self.nets[key].add_driver(driver) {
            self.schedule_net_update(key, 0);
        }
    }

    /// Attaches a listener. The initial notification with the net's current
    /// state is the board's responsibility.
    pub(crate) fn add_listener(&mut self, key: NetKey, listener: Listener) -> bool {
        self.nets[key].add_listener(listener)
    }

    /// Queues a net resolution at `now + delay`.
    pub(crate) fn schedule_net_update(&mut self, key: NetKey, delay: SimTime) {
        self.scheduler.schedule(delay, Task::UpdateNet(key));
    }

    /// Queues a bare task.
    pub(crate) fn schedule(&mut self, delay: SimTime, task: Task) {
        self.scheduler.schedule(delay, task);
    }

    /// Folds net `b` into net `a`: `a` ends with the union of both driver
    /// and listener sets (and the rail flags), `b` is deleted, and `a` is
    /// queued for re-resolution, which is where a disagreement between the
    /// two halves surfaces as contention.
    pub(crate) fn merge_nets(&mut self, a: NetKey, b: NetKey) -> NetKey {
        if a == b {
            return a;
        }
        let Some(absorbed) = self.nets.remove(b) else {
            return a;
        };
        let survivor = &mut self.nets[a];
        for driver in absorbed.drivers {
            survivor.add_driver(driver);
        }
        for listener in absorbed.listeners {
            survivor.add_listener(listener);
        }
        survivor.is_vcc |= absorbed.is_vcc;
        survivor.is_gnd |= absorbed.is_gnd;

        debug!(survivor = ?a, absorbed = ?b, "merged nets");
        self.schedule_net_update(a, 0);
        a
    }
}
