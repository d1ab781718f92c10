use crate::logic::LogicState;
use crate::parts::{EvalContext, Part, PartState, PinNumber, PinType, PinUpdate, pin_map};

/// Emits QA..QD from the two ripple sections.
fn counter_outputs(unit: bool, high: u8) -> Vec<PinUpdate> {
    vec![
        PinUpdate { pin: QA, state: LogicState::from(unit) },
        PinUpdate { pin: QB, state: LogicState::from(high & 0b001 != 0) },
        PinUpdate { pin: QC, state: LogicState::from(high & 0b010 != 0) },
        PinUpdate { pin: QD, state: LogicState::from(high & 0b100 != 0) },
    ]
}

fn error_outputs() -> Vec<PinUpdate> {
    [QA, QB, QC, QD]
        .into_iter()
        .map(|pin| PinUpdate { pin, state: LogicState::Error })
        .collect()
}

// The LS90 and LS93 share the ripple-counter package layout.
const CKB: PinNumber = 1;
const R01: PinNumber = 2;
const R02: PinNumber = 3;
const QC: PinNumber = 8;
const QB: PinNumber = 9;
const QD: PinNumber = 11;
const QA: PinNumber = 12;
const CKA: PinNumber = 14;

/// The 74LS90 decade ripple counter. VCC on 5, GND on 10.
///
/// Section A divides by two on CKA falling edges; section B counts mod-5 on
/// CKB falling edges. Cascading QA into CKB yields the BCD decade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ls90;

impl Ls90 {
    pub const CKB: PinNumber = CKB;
    pub const R01: PinNumber = R01;
    pub const R02: PinNumber = R02;
    pub const R91: PinNumber = 6;
    pub const R92: PinNumber = 7;
    pub const QC: PinNumber = QC;
    pub const QB: PinNumber = QB;
    pub const QD: PinNumber = QD;
    pub const QA: PinNumber = QA;
    pub const CKA: PinNumber = CKA;
}

impl Part for Ls90 {
    fn part_number(&self) -> &'static str {
        "74LS90"
    }

    fn pins(&self) -> Vec<PinType> {
        pin_map(14, &[
            (5, PinType::Power),
            (10, PinType::Power),
            (Self::CKA, PinType::Clock),
            (Self::CKB, PinType::Clock),
            (Self::R01, PinType::Input),
            (Self::R02, PinType::Input),
            (Self::R91, PinType::Input),
            (Self::R92, PinType::Input),
            (Self::QA, PinType::Output),
            (Self::QB, PinType::Output),
            (Self::QC, PinType::Output),
            (Self::QD, PinType::Output),
        ])
    }

    fn power_pins(&self) -> (PinNumber, PinNumber) {
        (5, 10)
    }

    fn init_state(&self) -> PartState {
        PartState::Counter { unit: false, high: 0 }
    }

    fn eval(&self, ctx: EvalContext<'_>) -> Vec<PinUpdate> {
        let resets = [ctx.input(Self::R01), ctx.input(Self::R02)];
        let sets = [ctx.input(Self::R91), ctx.input(Self::R92)];
        let cka_fell = ctx.falling(Self::CKA);
        let ckb_fell = ctx.falling(Self::CKB);
        let PartState::Counter { unit, high } = ctx.state else {
            return Vec::new();
        };

        if resets.contains(&LogicState::Error) || sets.contains(&LogicState::Error) {
            return error_outputs();
        }

        // R0 wins over R9 when both pairs are asserted.
        if resets == [LogicState::High; 2] {
            *unit = false;
            *high = 0;
        } else if sets == [LogicState::High; 2] {
            *unit = true;
            *high = 4;
        } else {
            if cka_fell {
                *unit = !*unit;
            }
            if ckb_fell {
                *high = (*high + 1) % 5;
            }
        }
        counter_outputs(*unit, *high)
    }
}

/// The 74LS93 4-bit binary ripple counter. VCC on 5, GND on 10.
///
/// As the LS90 with a mod-8 section B and no set-to-nine inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ls93;

impl Ls93 {
    pub const CKB: PinNumber = CKB;
    pub const R01: PinNumber = R01;
    pub const R02: PinNumber = R02;
    pub const QC: PinNumber = QC;
    pub const QB: PinNumber = QB;
    pub const QD: PinNumber = QD;
    pub const QA: PinNumber = QA;
    pub const CKA: PinNumber = CKA;
}

impl Part for Ls93 {
    fn part_number(&self) -> &'static str {
        "74LS93"
    }

    fn pins(&self) -> Vec<PinType> {
        pin_map(14, &[
            (5, PinType::Power),
            (10, PinType::Power),
            (Self::CKA, PinType::Clock),
            (Self::CKB, PinType::Clock),
            (Self::R01, PinType::Input),
            (Self::R02, PinType::Input),
            (Self::QA, PinType::Output),
            (Self::QB, PinType::Output),
            (Self::QC, PinType::Output),
            (Self::QD, PinType::Output),
        ])
    }

    fn power_pins(&self) -> (PinNumber, PinNumber) {
        (5, 10)
    }

    fn init_state(&self) -> PartState {
        PartState::Counter { unit: false, high: 0 }
    }

    fn eval(&self, ctx: EvalContext<'_>) -> Vec<PinUpdate> {
        let resets = [ctx.input(Self::R01), ctx.input(Self::R02)];
        let cka_fell = ctx.falling(Self::CKA);
        let ckb_fell = ctx.falling(Self::CKB);
        let PartState::Counter { unit, high } = ctx.state else {
            return Vec::new();
        };

        if resets.contains(&LogicState::Error) {
            return error_outputs();
        }

        if resets == [LogicState::High; 2] {
            *unit = false;
            *high = 0;
        } else {
            if cka_fell {
                *unit = !*unit;
            }
            if ckb_fell {
                *high = (*high + 1) % 8;
            }
        }
        counter_outputs(*unit, *high)
    }
}
