use crate::logic::LogicState;
use crate::parts::{EvalContext, Part, PinNumber, PinType, PinUpdate, pin_map};

/// The 74LS151 8-line to 1-line data selector with complementary outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ls151;

impl Ls151 {
    /// Data input pins D0..D7.
    pub const D: [PinNumber; 8] = [4, 3, 2, 1, 15, 14, 13, 12];
    /// Select pins S0..S2 (datasheet A, B, C).
    pub const S: [PinNumber; 3] = [11, 10, 9];
    /// Active-low strobe.
    pub const STROBE: PinNumber = 7;
    pub const Y: PinNumber = 5;
    /// Complement output.
    pub const W: PinNumber = 6;
}

impl Part for Ls151 {
    fn part_number(&self) -> &'static str {
        "74LS151"
    }

    fn pins(&self) -> Vec<PinType> {
        let mut assignments = vec![
            (16, PinType::Power),
            (8, PinType::Power),
            (Self::STROBE, PinType::Input),
            (Self::Y, PinType::Output),
            (Self::W, PinType::Output),
        ];
        for d in Self::D {
            assignments.push((d, PinType::Input));
        }
        for s in Self::S {
            assignments.push((s, PinType::Input));
        }
        pin_map(16, &assignments)
    }

    fn eval(&self, ctx: EvalContext<'_>) -> Vec<PinUpdate> {
        let strobe = ctx.input(Self::STROBE);
        let select = Self::S.map(|s| ctx.input(s));

        let pair = |y: LogicState, w: LogicState| {
            vec![
                PinUpdate { pin: Self::Y, state: y },
                PinUpdate { pin: Self::W, state: w },
            ]
        };

        if strobe == LogicState::Error || select.contains(&LogicState::Error) {
            return pair(LogicState::Error, LogicState::Error);
        }
        if strobe == LogicState::High {
            return pair(LogicState::Low, LogicState::High);
        }

        let index = select
            .iter()
            .enumerate()
            .fold(0usize, |acc, (bit, &s)| {
                acc | (usize::from(s == LogicState::High) << bit)
            });
        let y = ctx.input(Self::D[index]);
        pair(y, !y)
    }
}

/// The 74LS153 dual 4-line to 1-line data selector with shared select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ls153;

impl Ls153 {
    /// Select pins S0, S1 (datasheet A, B), shared between halves.
    pub const S: [PinNumber; 2] = [14, 2];
    /// Per-half `(enable, [C0..C3], Y)`; enables are active low.
    pub const HALVES: [(PinNumber, [PinNumber; 4], PinNumber); 2] =
        [(1, [6, 5, 4, 3], 7), (15, [10, 11, 12, 13], 9)];
}

impl Part for Ls153 {
    fn part_number(&self) -> &'static str {
        "74LS153"
    }

    fn pins(&self) -> Vec<PinType> {
        let mut assignments = vec![
            (16, PinType::Power),
            (8, PinType::Power),
            (Self::S[0], PinType::Input),
            (Self::S[1], PinType::Input),
        ];
        for (enable, data, y) in Self::HALVES {
            assignments.push((enable, PinType::Input));
            assignments.push((y, PinType::Output));
            for d in data {
                assignments.push((d, PinType::Input));
            }
        }
        pin_map(16, &assignments)
    }

    fn eval(&self, ctx: EvalContext<'_>) -> Vec<PinUpdate> {
        let select = Self::S.map(|s| ctx.input(s));
        let select_err = select.contains(&LogicState::Error);
        let index = select
            .iter()
            .enumerate()
            .fold(0usize, |acc, (bit, &s)| {
                acc | (usize::from(s == LogicState::High) << bit)
            });

        Self::HALVES
            .iter()
            .map(|&(enable, data, y)| {
                let g = ctx.input(enable);
                let state = if g == LogicState::Error || select_err {
                    LogicState::Error
                } else if g == LogicState::High {
                    // Disabled half parks its output low.
                    LogicState::Low
                } else {
                    ctx.input(data[index])
                };
                PinUpdate { pin: y, state }
            })
            .collect()
    }
}

/// The 74LS157 quad 2-line to 1-line data selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ls157;

impl Ls157 {
    /// Common select: low picks the A inputs, high picks the B inputs.
    pub const SELECT: PinNumber = 1;
    /// Active-low strobe.
    pub const STROBE: PinNumber = 15;
    /// `(A, B, Y)` pin numbers of the four sections.
    pub const SECTIONS: [(PinNumber, PinNumber, PinNumber); 4] =
        [(2, 3, 4), (5, 6, 7), (11, 10, 9), (14, 13, 12)];
}

impl Part for Ls157 {
    fn part_number(&self) -> &'static str {
        "74LS157"
    }

    fn pins(&self) -> Vec<PinType> {
        let mut assignments = vec![
            (16, PinType::Power),
            (8, PinType::Power),
            (Self::SELECT, PinType::Input),
            (Self::STROBE, PinType::Input),
        ];
        for (a, b, y) in Self::SECTIONS {
            assignments.push((a, PinType::Input));
            assignments.push((b, PinType::Input));
            assignments.push((y, PinType::Output));
        }
        pin_map(16, &assignments)
    }

    fn eval(&self, ctx: EvalContext<'_>) -> Vec<PinUpdate> {
        let strobe = ctx.input(Self::STROBE);
        let select = ctx.input(Self::SELECT);

        Self::SECTIONS
            .iter()
            .map(|&(a, b, y)| {
                let state = if strobe == LogicState::Error || select == LogicState::Error {
                    LogicState::Error
                } else if strobe == LogicState::High {
                    LogicState::Low
                } else if select == LogicState::High {
                    ctx.input(b)
                } else {
                    ctx.input(a)
                };
                PinUpdate { pin: y, state }
            })
            .collect()
    }
}
