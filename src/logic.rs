//! Four-valued logic levels and the wired-net resolution algebra.
//!
//! Every electrical node in the simulation carries a [`LogicState`]. The
//! algebra here has two layers:
//! - [`LogicState::join`] / [`resolve`] reconcile *concurrent drivers* on one
//!   wire (contention collapses to [`Error`](LogicState::Error)),
//! - the bit operators (`!`, `&`, `|`, `^`) compute *gate outputs* over
//!   already-resolved, TTL-coerced input levels.

/// The resolved level of a net or the value imposed by a single driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogicState {
    /// Driven low (logic 0).
    Low,
    /// Driven high (logic 1).
    High,
    /// High impedance; nothing drives the node.
    #[default]
    Float,
    /// Contention between drivers, or a propagated fault.
    Error,
}

impl LogicState {
    /// The value as a plain bool, if the node is actually driven.
    pub fn try_as_bool(self) -> Option<bool> {
        match self {
            LogicState::Low => Some(false),
            LogicState::High => Some(true),
            LogicState::Float | LogicState::Error => None,
        }
    }

    /// Whether the node is driven to a defined level.
    pub fn is_driven(self) -> bool {
        matches!(self, LogicState::Low | LogicState::High)
    }

    /// The level a TTL input stage observes: a floating input reads high.
    ///
    /// Driven levels and `Error` pass through unchanged.
    pub fn ttl_input(self) -> LogicState {
        match self {
            LogicState::Float => LogicState::High,
            other => other,
        }
    }

    /// Combines two concurrently-imposed levels on the same wire.
    ///
    /// `Float` is the identity, `Error` absorbs, and disagreeing driven
    /// levels short to `Error`. Commutative and associative, so the driver
    /// iteration order never matters.
    pub fn join(self, other: LogicState) -> LogicState {
        use LogicState::*;
        match (self, other) {
            (Error, _) | (_, Error) => Error,
            (Float, x) | (x, Float) => x,
            (High, Low) | (Low, High) => Error,
            (High, High) => High,
            (Low, Low) => Low,
        }
    }
}

impl From<bool> for LogicState {
    fn from(value: bool) -> Self {
        match value {
            true => LogicState::High,
            false => LogicState::Low,
        }
    }
}

impl std::ops::Not for LogicState {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            LogicState::Low => LogicState::High,
            LogicState::High => LogicState::Low,
            _ => LogicState::Error,
        }
    }
}

impl std::ops::BitAnd for LogicState {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        match self.try_as_bool().zip(rhs.try_as_bool()) {
            Some((a, b)) => Self::from(a & b),
            None => LogicState::Error,
        }
    }
}

impl std::ops::BitOr for LogicState {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        match self.try_as_bool().zip(rhs.try_as_bool()) {
            Some((a, b)) => Self::from(a | b),
            None => LogicState::Error,
        }
    }
}

impl std::ops::BitXor for LogicState {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self::Output {
        match self.try_as_bool().zip(rhs.try_as_bool()) {
            Some((a, b)) => Self::from(a ^ b),
            None => LogicState::Error,
        }
    }
}

/// Resolves the set of levels imposed by all drivers of one net.
///
/// An empty (or all-floating) driver set resolves to `Float`.
pub fn resolve<I>(values: I) -> LogicState
where
    I: IntoIterator<Item = LogicState>,
{
    values
        .into_iter()
        .fold(LogicState::Float, LogicState::join)
}

#[cfg(test)]
mod tests {
    use super::LogicState::{self, *};
    use super::resolve;

    const ALL: [LogicState; 4] = [Low, High, Float, Error];

    #[test]
    fn resolve_empty_set_floats() {
        assert_eq!(resolve([]), Float, "no drivers should leave a net floating");
    }

    #[test]
    fn resolve_single_driver_passes_through() {
        for v in ALL {
            assert_eq!(resolve([v]), v);
        }
    }

    #[test]
    fn resolve_contention_is_error() {
        assert_eq!(resolve([High, Low]), Error);
        assert_eq!(resolve([Low, High]), Error);
        assert_eq!(resolve([Low, Float, High]), Error);
    }

    #[test]
    fn resolve_error_absorbs() {
        for v in ALL {
            assert_eq!(resolve([Error, v]), Error);
            assert_eq!(resolve([v, Error]), Error);
        }
    }

    #[test]
    fn resolve_float_is_identity() {
        for v in ALL {
            assert_eq!(resolve([Float, v]), v);
            assert_eq!(resolve([v, Float, Float]), v);
        }
    }

    #[test]
    fn resolve_agreeing_drivers_hold_the_level() {
        assert_eq!(resolve([High, High, High]), High);
        assert_eq!(resolve([Low, Low]), Low);
    }

    #[test]
    fn join_is_commutative_and_associative() {
        for a in ALL {
            for b in ALL {
                assert_eq!(a.join(b), b.join(a), "{a:?} join {b:?}");
                for c in ALL {
                    assert_eq!(
                        a.join(b).join(c),
                        a.join(b.join(c)),
                        "{a:?}, {b:?}, {c:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn ttl_coercion_reads_float_as_high() {
        assert_eq!(Float.ttl_input(), High);
        assert_eq!(Low.ttl_input(), Low);
        assert_eq!(High.ttl_input(), High);
        assert_eq!(Error.ttl_input(), Error);
    }

    #[test]
    fn gate_operators_propagate_error() {
        assert_eq!(!Error, Error);
        assert_eq!(High & Error, Error);
        assert_eq!(Low | Error, Error);
        assert_eq!(High ^ Float, Error);
    }

    #[test]
    fn gate_operators_on_driven_levels() {
        assert_eq!(!Low, High);
        assert_eq!(!High, Low);
        assert_eq!(High & High, High);
        assert_eq!(High & Low, Low);
        assert_eq!(Low | High, High);
        assert_eq!(Low | Low, Low);
        assert_eq!(High ^ High, Low);
        assert_eq!(High ^ Low, High);
    }
}
