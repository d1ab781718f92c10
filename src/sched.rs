//! The discrete-event scheduler: a time-ordered queue of deferred tasks.
//!
//! Logical time is measured in integer nanoseconds and only ever moves
//! forward. Entries at the same timestamp run in insertion order, which is
//! what makes an input change scheduled at the same instant as a clock edge
//! visible to that edge.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::io::SourceKey;
use crate::net::NetKey;

/// Logical simulation time in nanoseconds.
pub type SimTime = u64;

/// A deferred unit of work.
///
/// Tasks form a closed set so the queue stays inspectable and the kernel
/// never runs arbitrary callbacks across the scheduler boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Task {
    /// Re-resolve a net and notify listeners on transition.
    UpdateNet(NetKey),
    /// Toggle a clock generator's phase and re-arm the next tick.
    ///
    /// The generation counter makes ticks from a stopped (or restarted)
    /// clock stale, so stop/start never leaves a phantom tick behind.
    ClockTick { source: SourceKey, generation: u64 },
    /// End a mono-pulse button's active window.
    ReleaseButton(SourceKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Entry {
    time: SimTime,
    seq: u64,
    task: Task,
}

/// A min-priority queue of tasks keyed by `(time, insertion order)`.
#[derive(Debug, Default)]
pub struct Scheduler {
    now: SimTime,
    seq: u64,
    queue: BinaryHeap<Reverse<Entry>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Default::default()
    }

    /// Current logical time.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Number of tasks still pending (ripe or future).
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Enqueues `task` to run at `now + delay`.
    pub fn schedule(&mut self, delay: SimTime, task: Task) {
        let entry = Entry {
            time: self.now.saturating_add(delay),
            seq: self.seq,
            task,
        };
        self.seq += 1;
        self.queue.push(Reverse(entry));
    }

    /// Advances logical time without executing anything.
    pub fn advance(&mut self, dt: SimTime) {
        self.now = self.now.saturating_add(dt);
    }

    /// The timestamp of the earliest pending task.
    pub fn next_time(&self) -> Option<SimTime> {
        self.queue.peek().map(|Reverse(e)| e.time)
    }

    /// Pops the earliest task whose time has come, if any.
    pub fn pop_ready(&mut self) -> Option<Task> {
        match self.queue.peek() {
            Some(Reverse(e)) if e.time <= self.now => {
                self.queue.pop().map(|Reverse(e)| e.task)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn net_keys(n: usize) -> Vec<NetKey> {
        let mut arena: SlotMap<NetKey, ()> = SlotMap::with_key();
        (0..n).map(|_| arena.insert(())).collect()
    }

    fn drain(s: &mut Scheduler) -> Vec<Task> {
        let mut out = Vec::new();
        while let Some(t) = s.pop_ready() {
            out.push(t);
        }
        out
    }

    #[test]
    fn tasks_run_in_time_order() {
        let keys = net_keys(3);
        let mut s = Scheduler::new();
        s.schedule(30, Task::UpdateNet(keys[2]));
        s.schedule(10, Task::UpdateNet(keys[0]));
        s.schedule(20, Task::UpdateNet(keys[1]));

        s.advance(30);
        let order = drain(&mut s);
        assert_eq!(
            order,
            vec![
                Task::UpdateNet(keys[0]),
                Task::UpdateNet(keys[1]),
                Task::UpdateNet(keys[2])
            ],
            "tasks should drain in ascending time order"
        );
    }

    #[test]
    fn equal_times_run_in_insertion_order() {
        let keys = net_keys(4);
        let mut s = Scheduler::new();
        for &k in &keys {
            s.schedule(5, Task::UpdateNet(k));
        }

        s.advance(5);
        let order = drain(&mut s);
        let expected: Vec<_> = keys.into_iter().map(Task::UpdateNet).collect();
        assert_eq!(order, expected, "ties should break FIFO");
    }

    #[test]
    fn future_tasks_stay_queued() {
        let keys = net_keys(1);
        let mut s = Scheduler::new();
        s.schedule(100, Task::UpdateNet(keys[0]));

        s.advance(99);
        assert_eq!(s.pop_ready(), None);
        assert_eq!(s.pending(), 1);

        s.advance(1);
        assert_eq!(s.pop_ready(), Some(Task::UpdateNet(keys[0])));
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn delays_accumulate_from_current_time() {
        let keys = net_keys(2);
        let mut s = Scheduler::new();
        s.advance(50);
        s.schedule(10, Task::UpdateNet(keys[0]));
        assert_eq!(s.next_time(), Some(60));

        s.advance(10);
        assert_eq!(s.pop_ready(), Some(Task::UpdateNet(keys[0])));
    }

    #[test]
    fn zero_delay_is_ripe_immediately() {
        let keys = net_keys(1);
        let mut s = Scheduler::new();
        s.schedule(0, Task::UpdateNet(keys[0]));
        assert_eq!(s.pop_ready(), Some(Task::UpdateNet(keys[0])));
    }
}
