//! Simulation kernel for an interactive 74LS-series TTL breadboard trainer.
//!
//! The crate models a breadboard populated with fixed-function chips wired
//! together: four-valued logic levels propagate through a graph of
//! electrical nets under a discrete-event scheduler with bounded
//! propagation delay, and each IC behaves as a combinational or
//! edge-triggered state machine on top of the net model.
//!
//! ## The crate notably consists of:
//! - **[`logic`]**: the `LOW`/`HIGH`/`FLOAT`/`ERROR` algebra and the
//!   multi-driver resolution rule (contention collapses to error).
//! - **[`sched`]**: the event queue, keyed by logical nanoseconds with FIFO
//!   tie-break.
//! - **[`net`] and [`engine`]**: electrical nets with driver/listener sets,
//!   owned by an arena; merged and split as the wiring changes.
//! - **[`wiring`]**: the pin-to-pin wire multigraph with validation,
//!   merge-on-add, and rebuild-on-remove.
//! - **[`chip`] and [`parts`]**: the chip framework (power validation, TTL
//!   input coercion, delayed output propagation, edge detection) and the
//!   catalogue of sixteen 74LS parts with exact pinouts.
//! - **[`io`]**: front-panel switches, clock generators, pulse buttons,
//!   LEDs, and probes.
//! - **[`board`]**: the aggregate the UI drives and observes.
//!
//! ```
//! use ttl_trainer_engine::{Board, LogicState};
//!
//! let mut board = Board::new();
//! board.place_chip("74LS04", "u1").unwrap();
//! board.add_wire("vcc", "u1-pin-14", "red").unwrap();
//! board.add_wire("gnd", "u1-pin-7", "black").unwrap();
//! board.power_on();
//! board.step(100);
//!
//! // A floating TTL input reads high, so the first section's output
//! // (pin 1 in, pin 2 out) drives low.
//! assert_eq!(board.pin_state("u1-pin-1"), Some(LogicState::Float));
//! assert_eq!(board.pin_state("u1-pin-2"), Some(LogicState::Low));
//! ```

pub mod board;
pub mod chip;
pub mod engine;
pub mod io;
pub mod logic;
pub mod net;
pub mod parts;
pub mod sched;
pub mod wiring;

pub use board::{Board, BoardEvent};
pub use chip::{Chip, ChipKey, DEFAULT_PROPAGATION_DELAY};
pub use io::{LedKey, LedMode, ProbeKey, SourceKey};
pub use logic::{LogicState, resolve};
pub use net::{Driver, Listener, NetKey, Rail};
pub use parts::{PART_NUMBERS, PartFn, PinNumber, PinType, instantiate};
pub use sched::{SimTime, Task};
pub use wiring::{PinOwner, WireError, WireKey};
