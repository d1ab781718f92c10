use crate::logic::LogicState;
use crate::parts::{EvalContext, Part, PartState, PinNumber, PinType, PinUpdate, pin_map};

/// Applies the shared preset/clear priority of the LS74 and LS76.
///
/// Returns the forced Q level, or `None` when neither override is active
/// and the clocked path decides. Both-low is the datasheet's invalid state;
/// the trainer forces Q high deterministically.
fn async_override(preset: LogicState, clear: LogicState) -> Option<LogicState> {
    use LogicState::*;
    match (preset, clear) {
        (Error, _) | (_, Error) => Some(Error),
        (High, Low) => Some(Low),
        (Low, High) => Some(High),
        (Low, Low) => Some(High),
        _ => None,
    }
}

fn q_pair(q: LogicState, q_pin: PinNumber, qn_pin: PinNumber) -> [PinUpdate; 2] {
    [
        PinUpdate { pin: q_pin, state: q },
        PinUpdate { pin: qn_pin, state: !q },
    ]
}

/// The 74LS74 dual D-type flip-flop with preset and clear, rising-edge
/// triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ls74;

impl Ls74 {
    pub const CLR1: PinNumber = 1;
    pub const D1: PinNumber = 2;
    pub const CLK1: PinNumber = 3;
    pub const PR1: PinNumber = 4;
    pub const Q1: PinNumber = 5;
    pub const QN1: PinNumber = 6;
    pub const QN2: PinNumber = 8;
    pub const Q2: PinNumber = 9;
    pub const PR2: PinNumber = 10;
    pub const CLK2: PinNumber = 11;
    pub const D2: PinNumber = 12;
    pub const CLR2: PinNumber = 13;

    /// Per-half `(CLR, D, CLK, PR, Q, Q̄)`.
    const HALVES: [(PinNumber, PinNumber, PinNumber, PinNumber, PinNumber, PinNumber); 2] = [
        (Self::CLR1, Self::D1, Self::CLK1, Self::PR1, Self::Q1, Self::QN1),
        (Self::CLR2, Self::D2, Self::CLK2, Self::PR2, Self::Q2, Self::QN2),
    ];
}

impl Part for Ls74 {
    fn part_number(&self) -> &'static str {
        "74LS74"
    }

    fn pins(&self) -> Vec<PinType> {
        let mut assignments = vec![(14, PinType::Power), (7, PinType::Power)];
        for (clr, d, clk, pr, q, qn) in Self::HALVES {
            assignments.push((clr, PinType::Input));
            assignments.push((d, PinType::Input));
            assignments.push((clk, PinType::Clock));
            assignments.push((pr, PinType::Input));
            assignments.push((q, PinType::Output));
            assignments.push((qn, PinType::Output));
        }
        pin_map(14, &assignments)
    }

    fn init_state(&self) -> PartState {
        PartState::Flops([LogicState::Low; 2])
    }

    fn eval(&self, ctx: EvalContext<'_>) -> Vec<PinUpdate> {
        let halves = Self::HALVES.map(|(clr, d, clk, pr, q, qn)| {
            (
                async_override(ctx.input(pr), ctx.input(clr)),
                ctx.input(d),
                ctx.rising(clk),
                q,
                qn,
            )
        });
        let PartState::Flops(state) = ctx.state else {
            return Vec::new();
        };

        let mut updates = Vec::with_capacity(4);
        for (i, (forced, d, rising, q_pin, qn_pin)) in halves.into_iter().enumerate() {
            let next = match forced {
                Some(level) => level,
                None if rising => d,
                None => state[i],
            };
            state[i] = next;
            updates.extend(q_pair(next, q_pin, qn_pin));
        }
        updates
    }
}

/// The 74LS76 dual JK flip-flop with preset and clear, falling-edge
/// triggered. Trainer pinout: VCC on 5, GND on 7, J2 on 14.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ls76;

impl Ls76 {
    pub const CLK1: PinNumber = 1;
    pub const PR1: PinNumber = 2;
    pub const CLR1: PinNumber = 3;
    pub const J1: PinNumber = 4;
    pub const CLK2: PinNumber = 6;
    pub const PR2: PinNumber = 8;
    pub const CLR2: PinNumber = 9;
    pub const QN2: PinNumber = 10;
    pub const Q2: PinNumber = 11;
    pub const K2: PinNumber = 12;
    pub const QN1: PinNumber = 13;
    pub const J2: PinNumber = 14;
    pub const Q1: PinNumber = 15;
    pub const K1: PinNumber = 16;

    /// Per-half `(CLK, PR, CLR, J, K, Q, Q̄)`.
    const HALVES: [(PinNumber, PinNumber, PinNumber, PinNumber, PinNumber, PinNumber, PinNumber); 2] = [
        (Self::CLK1, Self::PR1, Self::CLR1, Self::J1, Self::K1, Self::Q1, Self::QN1),
        (Self::CLK2, Self::PR2, Self::CLR2, Self::J2, Self::K2, Self::Q2, Self::QN2),
    ];
}

impl Part for Ls76 {
    fn part_number(&self) -> &'static str {
        "74LS76"
    }

    fn pins(&self) -> Vec<PinType> {
        let mut assignments = vec![(5, PinType::Power), (7, PinType::Power)];
        for (clk, pr, clr, j, k, q, qn) in Self::HALVES {
            assignments.push((clk, PinType::Clock));
            assignments.push((pr, PinType::Input));
            assignments.push((clr, PinType::Input));
            assignments.push((j, PinType::Input));
            assignments.push((k, PinType::Input));
            assignments.push((q, PinType::Output));
            assignments.push((qn, PinType::Output));
        }
        pin_map(16, &assignments)
    }

    fn power_pins(&self) -> (PinNumber, PinNumber) {
        (5, 7)
    }

    fn init_state(&self) -> PartState {
        PartState::Flops([LogicState::Low; 2])
    }

    fn eval(&self, ctx: EvalContext<'_>) -> Vec<PinUpdate> {
        let halves = Self::HALVES.map(|(clk, pr, clr, j, k, q, qn)| {
            (
                async_override(ctx.input(pr), ctx.input(clr)),
                ctx.input(j),
                ctx.input(k),
                ctx.falling(clk),
                q,
                qn,
            )
        });
        let PartState::Flops(state) = ctx.state else {
            return Vec::new();
        };

        let mut updates = Vec::with_capacity(4);
        for (i, (forced, j, k, falling, q_pin, qn_pin)) in halves.into_iter().enumerate() {
            let next = match forced {
                Some(level) => level,
                None if falling => match (j, k) {
                    (LogicState::Low, LogicState::Low) => state[i],
                    (LogicState::High, LogicState::Low) => LogicState::High,
                    (LogicState::Low, LogicState::High) => LogicState::Low,
                    (LogicState::High, LogicState::High) => !state[i],
                    _ => LogicState::Error,
                },
                None => state[i],
            };
            state[i] = next;
            updates.extend(q_pair(next, q_pin, qn_pin));
        }
        updates
    }
}
