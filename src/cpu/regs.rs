/*!
regs.rs - The eight DCPU-16 general purpose registers.

Operand codes 0x00-0x17 all carry a register index in their low three bits
(direct, `[reg]` and `[reg + next word]`), so the index mapping lives here
in one place.
*/

use std::fmt;

/// General purpose register, in encoding order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    A = 0,
    B = 1,
    C = 2,
    X = 3,
    Y = 4,
    Z = 5,
    I = 6,
    J = 7,
}

impl Register {
    /// All registers in encoding order.
    pub const ALL: [Register; 8] = [
        Register::A,
        Register::B,
        Register::C,
        Register::X,
        Register::Y,
        Register::Z,
        Register::I,
        Register::J,
    ];

    /// Register selected by the low three bits of an operand code.
    #[inline]
    pub fn from_code(code: u16) -> Register {
        Self::ALL[(code & 0x7) as usize]
    }

    /// Index into the register file.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Register::A => "A",
            Register::B => "B",
            Register::C => "C",
            Register::X => "X",
            Register::Y => "Y",
            Register::Z => "Z",
            Register::I => "I",
            Register::J => "J",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operand_codes_select_registers() {
        assert_eq!(Register::from_code(0x00), Register::A);
        assert_eq!(Register::from_code(0x0B), Register::X);
        assert_eq!(Register::from_code(0x17), Register::J);
        assert_eq!(Register::J.index(), 7);
    }
}
