use crate::parts::{EvalContext, Part, PinNumber, PinType, PinUpdate, pin_map};

macro_rules! quad_gates {
    ($($(#[$m:meta])* $Id:ident, $number:literal, $sections:expr => |$a:ident, $b:ident| $f:expr;)*) => {
        $(
            $(#[$m])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
            pub struct $Id;
            impl $Id {
                /// `(A, B, Y)` pin numbers of the four gate sections.
                pub const SECTIONS: [(PinNumber, PinNumber, PinNumber); 4] = $sections;
            }
            impl Part for $Id {
                fn part_number(&self) -> &'static str {
                    $number
                }
                fn pins(&self) -> Vec<PinType> {
                    let mut assignments = vec![(14, PinType::Power), (7, PinType::Power)];
                    for (a, b, y) in Self::SECTIONS {
                        assignments.push((a, PinType::Input));
                        assignments.push((b, PinType::Input));
                        assignments.push((y, PinType::Output));
                    }
                    pin_map(14, &assignments)
                }
                fn eval(&self, ctx: EvalContext<'_>) -> Vec<PinUpdate> {
                    Self::SECTIONS
                        .iter()
                        .map(|&(a, b, y)| {
                            let $a = ctx.input(a);
                            let $b = ctx.input(b);
                            PinUpdate { pin: y, state: $f }
                        })
                        .collect()
                }
            }
        )*
    }
}

quad_gates! {
    /// The 74LS00 quad two-input NAND.
    Ls00, "74LS00", [(1, 2, 3), (4, 5, 6), (9, 10, 8), (12, 13, 11)] => |a, b| !(a & b);
    /// The 74LS02 quad two-input NOR. Note the Y-first section pinout.
    Ls02, "74LS02", [(2, 3, 1), (5, 6, 4), (8, 9, 10), (11, 12, 13)] => |a, b| !(a | b);
    /// The 74LS08 quad two-input AND.
    Ls08, "74LS08", [(1, 2, 3), (4, 5, 6), (9, 10, 8), (12, 13, 11)] => |a, b| a & b;
    /// The 74LS32 quad two-input OR.
    Ls32, "74LS32", [(1, 2, 3), (4, 5, 6), (9, 10, 8), (12, 13, 11)] => |a, b| a | b;
    /// The 74LS86 quad two-input XOR.
    Ls86, "74LS86", [(1, 2, 3), (4, 5, 6), (9, 10, 8), (12, 13, 11)] => |a, b| a ^ b;
}

/// The 74LS04 hex inverter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ls04;

impl Ls04 {
    /// `(A, Y)` pin numbers of the six inverter sections.
    pub const SECTIONS: [(PinNumber, PinNumber); 6] =
        [(1, 2), (3, 4), (5, 6), (9, 8), (11, 10), (13, 12)];
}

impl Part for Ls04 {
    fn part_number(&self) -> &'static str {
        "74LS04"
    }

    fn pins(&self) -> Vec<PinType> {
        let mut assignments = vec![(14, PinType::Power), (7, PinType::Power)];
        for (a, y) in Self::SECTIONS {
            assignments.push((a, PinType::Input));
            assignments.push((y, PinType::Output));
        }
        pin_map(14, &assignments)
    }

    fn eval(&self, ctx: EvalContext<'_>) -> Vec<PinUpdate> {
        Self::SECTIONS
            .iter()
            .map(|&(a, y)| PinUpdate { pin: y, state: !ctx.input(a) })
            .collect()
    }
}
