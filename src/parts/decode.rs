use crate::logic::LogicState;
use crate::parts::{EvalContext, Part, PinNumber, PinType, PinUpdate, pin_map};

/// The 74LS138 3-to-8 line decoder with three enable inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ls138;

impl Ls138 {
    pub const A: PinNumber = 1;
    pub const B: PinNumber = 2;
    pub const C: PinNumber = 3;
    /// Active-low enable.
    pub const G2A: PinNumber = 4;
    /// Active-low enable.
    pub const G2B: PinNumber = 5;
    /// Active-high enable.
    pub const G1: PinNumber = 6;
    /// Output pins Y0..Y7, active low.
    pub const Y: [PinNumber; 8] = [15, 14, 13, 12, 11, 10, 9, 7];
}

impl Part for Ls138 {
    fn part_number(&self) -> &'static str {
        "74LS138"
    }

    fn pins(&self) -> Vec<PinType> {
        let mut assignments = vec![
            (16, PinType::Power),
            (8, PinType::Power),
            (Self::A, PinType::Input),
            (Self::B, PinType::Input),
            (Self::C, PinType::Input),
            (Self::G1, PinType::Input),
            (Self::G2A, PinType::Input),
            (Self::G2B, PinType::Input),
        ];
        for y in Self::Y {
            assignments.push((y, PinType::Output));
        }
        pin_map(16, &assignments)
    }

    fn eval(&self, ctx: EvalContext<'_>) -> Vec<PinUpdate> {
        let select = [ctx.input(Self::A), ctx.input(Self::B), ctx.input(Self::C)];
        let enables = [ctx.input(Self::G1), ctx.input(Self::G2A), ctx.input(Self::G2B)];

        let all = |state: LogicState| {
            Self::Y
                .iter()
                .map(|&y| PinUpdate { pin: y, state })
                .collect::<Vec<_>>()
        };

        if select.contains(&LogicState::Error) || enables.contains(&LogicState::Error) {
            return all(LogicState::Error);
        }

        let enabled = enables[0] == LogicState::High
            && enables[1] == LogicState::Low
            && enables[2] == LogicState::Low;
        if !enabled {
            return all(LogicState::High);
        }

        let index = select
            .iter()
            .enumerate()
            .fold(0usize, |acc, (bit, &s)| {
                acc | (usize::from(s == LogicState::High) << bit)
            });
        Self::Y
            .iter()
            .enumerate()
            .map(|(i, &y)| PinUpdate {
                pin: y,
                state: LogicState::from(i != index),
            })
            .collect()
    }
}

/// The 74LS47 BCD to seven-segment decoder/driver, active-low outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ls47;

impl Ls47 {
    pub const B: PinNumber = 1;
    pub const C: PinNumber = 2;
    /// Lamp test, active low: all segments on.
    pub const LT: PinNumber = 3;
    /// Blanking input, active low: all segments off.
    pub const BI: PinNumber = 4;
    /// Ripple blanking input, active low: blanks a zero.
    pub const RBI: PinNumber = 5;
    pub const D: PinNumber = 6;
    pub const A: PinNumber = 7;
    /// Segment output pins a..g, active low.
    pub const SEG: [PinNumber; 7] = [13, 12, 11, 10, 9, 15, 14];

    /// Lit-segment masks for digits 0..=9, bit 0 = segment a.
    ///
    /// The 7447 glyphs: 6 is drawn without segments a and b (c,d,e,f,g),
    /// 9 without segments d and e (a,b,c,f,g).
    const DIGITS: [u8; 10] = [
        0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7C, 0x07, 0x7F, 0x67,
    ];
}

impl Part for Ls47 {
    fn part_number(&self) -> &'static str {
        "74LS47"
    }

    fn pins(&self) -> Vec<PinType> {
        let mut assignments = vec![
            (16, PinType::Power),
            (8, PinType::Power),
            (Self::A, PinType::Input),
            (Self::B, PinType::Input),
            (Self::C, PinType::Input),
            (Self::D, PinType::Input),
            (Self::LT, PinType::Input),
            (Self::BI, PinType::Input),
            (Self::RBI, PinType::Input),
        ];
        for seg in Self::SEG {
            assignments.push((seg, PinType::Output));
        }
        pin_map(16, &assignments)
    }

    fn eval(&self, ctx: EvalContext<'_>) -> Vec<PinUpdate> {
        let value_bits = [
            ctx.input(Self::A),
            ctx.input(Self::B),
            ctx.input(Self::C),
            ctx.input(Self::D),
        ];
        let controls = [ctx.input(Self::LT), ctx.input(Self::BI), ctx.input(Self::RBI)];

        let from_mask = |lit: u8| {
            Self::SEG
                .iter()
                .enumerate()
                .map(|(i, &pin)| PinUpdate {
                    pin,
                    // Active low: a lit segment drives low.
                    state: LogicState::from(lit & (1 << i) == 0),
                })
                .collect::<Vec<_>>()
        };

        if value_bits.contains(&LogicState::Error) || controls.contains(&LogicState::Error) {
            return Self::SEG
                .iter()
                .map(|&pin| PinUpdate { pin, state: LogicState::Error })
                .collect();
        }

        let [lt, bi, rbi] = controls;
        if lt == LogicState::Low {
            return from_mask(0x7F);
        }
        if bi == LogicState::Low {
            return from_mask(0x00);
        }

        let value = value_bits
            .iter()
            .enumerate()
            .fold(0usize, |acc, (bit, &s)| {
                acc | (usize::from(s == LogicState::High) << bit)
            });
        if value == 0 && rbi == LogicState::Low {
            return from_mask(0x00);
        }
        let lit = Self::DIGITS.get(value).copied().unwrap_or(0x00);
        from_mask(lit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::LogicState::*;
    use crate::parts::bench::Bench;

    fn set_bits(bench: &mut Bench, pins: [PinNumber; 3], value: usize) {
        for (bit, pin) in pins.into_iter().enumerate() {
            bench.set(pin, LogicState::from(value & (1 << bit) != 0));
        }
    }

    #[test]
    fn decoder_selects_exactly_one_low_output() {
        for index in 0..8 {
            let mut bench = Bench::new(&Ls138);
            bench.set(Ls138::G1, High).set(Ls138::G2A, Low).set(Ls138::G2B, Low);
            set_bits(&mut bench, [Ls138::A, Ls138::B, Ls138::C], index);

            let updates = bench.eval(&Ls138);
            for (i, &y) in Ls138::Y.iter().enumerate() {
                let expected = if i == index { Low } else { High };
                assert_eq!(
                    Bench::output(&updates, y),
                    expected,
                    "Y{i} with CBA = {index}"
                );
            }
        }
    }

    #[test]
    fn decoder_disabled_drives_all_high() {
        // Any failing enable combination blanks the outputs.
        let combos = [(Low, Low, Low), (High, High, Low), (High, Low, High)];
        for (g1, g2a, g2b) in combos {
            let mut bench = Bench::new(&Ls138);
            bench.set(Ls138::G1, g1).set(Ls138::G2A, g2a).set(Ls138::G2B, g2b);
            set_bits(&mut bench, [Ls138::A, Ls138::B, Ls138::C], 5);

            let updates = bench.eval(&Ls138);
            for &y in &Ls138::Y {
                assert_eq!(Bench::output(&updates, y), High);
            }
        }
    }

    #[test]
    fn decoder_floating_enables_disable() {
        // G2A/G2B float high, which deasserts the active-low enables.
        let mut bench = Bench::new(&Ls138);
        bench.set(Ls138::G1, High);
        let updates = bench.eval(&Ls138);
        for &y in &Ls138::Y {
            assert_eq!(Bench::output(&updates, y), High);
        }
    }

    #[test]
    fn decoder_error_select_poisons_outputs() {
        let mut bench = Bench::new(&Ls138);
        bench.set(Ls138::G1, High).set(Ls138::G2A, Low).set(Ls138::G2B, Low);
        bench.set(Ls138::A, Error);
        let updates = bench.eval(&Ls138);
        for &y in &Ls138::Y {
            assert_eq!(Bench::output(&updates, y), Error);
        }
    }

    fn set_bcd(bench: &mut Bench, value: usize) {
        let pins = [Ls47::A, Ls47::B, Ls47::C, Ls47::D];
        for (bit, pin) in pins.into_iter().enumerate() {
            bench.set(pin, LogicState::from(value & (1 << bit) != 0));
        }
    }

    fn lit_mask(updates: &[PinUpdate]) -> u8 {
        Ls47::SEG
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, &pin)| {
                // Active low: a low output means the segment is lit.
                acc | (u8::from(Bench::output(updates, pin) == Low) << i)
            })
    }

    #[test]
    fn seven_segment_digit_patterns() {
        // Transcribed from the 7447 glyph table, bit 0 = segment a; kept
        // independent of the decoder's own constants on purpose.
        let glyphs: [u8; 10] = [
            0b0111111, // 0: a b c d e f
            0b0000110, // 1: b c
            0b1011011, // 2: a b d e g
            0b1001111, // 3: a b c d g
            0b1100110, // 4: b c f g
            0b1101101, // 5: a c d f g
            0b1111100, // 6: c d e f g
            0b0000111, // 7: a b c
            0b1111111, // 8: a b c d e f g
            0b1100111, // 9: a b c f g
        ];
        for (value, &expected) in glyphs.iter().enumerate() {
            let mut bench = Bench::new(&Ls47);
            bench.set(Ls47::LT, High).set(Ls47::BI, High).set(Ls47::RBI, High);
            set_bcd(&mut bench, value);

            let updates = bench.eval(&Ls47);
            assert_eq!(
                lit_mask(&updates),
                expected,
                "segment pattern for digit {value}"
            );
        }
    }

    #[test]
    fn seven_segment_blanks_non_digits() {
        for value in 10..16 {
            let mut bench = Bench::new(&Ls47);
            bench.set(Ls47::LT, High).set(Ls47::BI, High).set(Ls47::RBI, High);
            set_bcd(&mut bench, value);
            assert_eq!(lit_mask(&bench.eval(&Ls47)), 0, "value {value} should blank");
        }
    }

    #[test]
    fn lamp_test_lights_everything() {
        let mut bench = Bench::new(&Ls47);
        bench.set(Ls47::LT, Low).set(Ls47::BI, High);
        set_bcd(&mut bench, 4);
        assert_eq!(lit_mask(&bench.eval(&Ls47)), 0x7F);
    }

    #[test]
    fn blanking_input_overrides_decode() {
        let mut bench = Bench::new(&Ls47);
        bench.set(Ls47::LT, High).set(Ls47::BI, Low);
        set_bcd(&mut bench, 8);
        assert_eq!(lit_mask(&bench.eval(&Ls47)), 0);
    }

    #[test]
    fn ripple_blanking_suppresses_a_zero_only() {
        let mut bench = Bench::new(&Ls47);
        bench.set(Ls47::LT, High).set(Ls47::BI, High).set(Ls47::RBI, Low);

        set_bcd(&mut bench, 0);
        assert_eq!(lit_mask(&bench.eval(&Ls47)), 0, "leading zero should blank");

        set_bcd(&mut bench, 7);
        assert_eq!(
            lit_mask(&bench.eval(&Ls47)),
            Ls47::DIGITS[7],
            "non-zero digits still display"
        );
    }
}
