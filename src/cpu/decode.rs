/*!
decode.rs - Instruction word decoding.

Layout
======
```text
bits 15..10  a      (source operand, 6 bits)
bits  9..5   b      (destination operand, or special opcode)
bits  4..0   opcode (0 selects the special table)
```

Decoding only classifies the word. Operand resolution happens afterwards in
`addressing`, because it has side effects (PC and SP movement) that must
occur exactly once and in a fixed order.
*/

/// Basic (two operand) opcodes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BasicOp {
    Set,
    Add,
    Sub,
    Mul,
    Mli,
    Div,
    Dvi,
    Mod,
    Mdi,
    And,
    Bor,
    Xor,
    Shr,
    Asr,
    Shl,
    Ifb,
    Ifc,
    Ife,
    Ifn,
    Ifg,
    Ifa,
    Ifl,
    Ifu,
    Adx,
    Sbx,
    Sti,
    Std,
}

impl BasicOp {
    pub fn from_code(code: u16) -> Option<Self> {
        let op = match code {
            0x01 => BasicOp::Set,
            0x02 => BasicOp::Add,
            0x03 => BasicOp::Sub,
            0x04 => BasicOp::Mul,
            0x05 => BasicOp::Mli,
            0x06 => BasicOp::Div,
            0x07 => BasicOp::Dvi,
            0x08 => BasicOp::Mod,
            0x09 => BasicOp::Mdi,
            0x0A => BasicOp::And,
            0x0B => BasicOp::Bor,
            0x0C => BasicOp::Xor,
            0x0D => BasicOp::Shr,
            0x0E => BasicOp::Asr,
            0x0F => BasicOp::Shl,
            0x10 => BasicOp::Ifb,
            0x11 => BasicOp::Ifc,
            0x12 => BasicOp::Ife,
            0x13 => BasicOp::Ifn,
            0x14 => BasicOp::Ifg,
            0x15 => BasicOp::Ifa,
            0x16 => BasicOp::Ifl,
            0x17 => BasicOp::Ifu,
            0x1A => BasicOp::Adx,
            0x1B => BasicOp::Sbx,
            0x1E => BasicOp::Sti,
            0x1F => BasicOp::Std,
            _ => return None,
        };
        Some(op)
    }

    /// True for the IFx family.
    #[inline]
    pub fn is_conditional(self) -> bool {
        matches!(
            self,
            BasicOp::Ifb
                | BasicOp::Ifc
                | BasicOp::Ife
                | BasicOp::Ifn
                | BasicOp::Ifg
                | BasicOp::Ifa
                | BasicOp::Ifl
                | BasicOp::Ifu
        )
    }
}

/// Special (single operand) opcodes, selected by the b field when opcode is 0.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SpecialOp {
    Jsr,
    Int,
    Iag,
    Ias,
    Rfi,
    Iaq,
    Hwn,
    Hwq,
    Hwi,
}

impl SpecialOp {
    pub fn from_code(code: u16) -> Option<Self> {
        let op = match code {
            0x01 => SpecialOp::Jsr,
            0x08 => SpecialOp::Int,
            0x09 => SpecialOp::Iag,
            0x0A => SpecialOp::Ias,
            0x0B => SpecialOp::Rfi,
            0x0C => SpecialOp::Iaq,
            0x10 => SpecialOp::Hwn,
            0x11 => SpecialOp::Hwq,
            0x12 => SpecialOp::Hwi,
            _ => return None,
        };
        Some(op)
    }
}

/// A classified instruction word with its raw operand codes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    Basic { op: BasicOp, b: u16, a: u16 },
    Special { op: SpecialOp, a: u16 },
}

/// Split a word into (opcode, b, a) fields.
#[inline]
pub fn fields(word: u16) -> (u16, u16, u16) {
    (word & 0x1F, (word >> 5) & 0x1F, (word >> 10) & 0x3F)
}

/// Classify `word`. `None` means the opcode (or special opcode) is undefined.
pub fn decode(word: u16) -> Option<Instruction> {
    let (opcode, b, a) = fields(word);
    if opcode == 0 {
        SpecialOp::from_code(b).map(|op| Instruction::Special { op, a })
    } else {
        BasicOp::from_code(opcode).map(|op| Instruction::Basic { op, b, a })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_basic_set_with_next_word() {
        assert_eq!(
            decode(0x7C01),
            Some(Instruction::Basic {
                op: BasicOp::Set,
                b: 0x00,
                a: 0x1F
            })
        );
    }

    #[test]
    fn decodes_special_jsr() {
        // JSR 0x0004 as inline literal (0x25)
        assert_eq!(
            decode(0x9420),
            Some(Instruction::Special {
                op: SpecialOp::Jsr,
                a: 0x25
            })
        );
    }

    #[test]
    fn undefined_opcodes() {
        assert_eq!(decode(0x0000), None);
        for op in [0x18u16, 0x19, 0x1C, 0x1D] {
            assert_eq!(decode(op), None, "basic {op:#x}");
        }
        for special in [0x00u16, 0x02, 0x07, 0x0D, 0x13, 0x1F] {
            assert_eq!(decode(special << 5), None, "special {special:#x}");
        }
    }

    #[test]
    fn conditional_family() {
        for code in 0x10..=0x17 {
            assert!(BasicOp::from_code(code).is_some_and(BasicOp::is_conditional));
        }
        assert!(!BasicOp::Set.is_conditional());
    }
}
