/*!
execute.rs - DCPU-16 instruction semantics (ALU and conditions).

Purpose
=======
Pure functions of the operand values, shared by every dispatch handler.
Each arithmetic helper returns the value destined for b together with the
new EX, if the instruction defines one. No helper touches memory or the
register file; the handlers in `dispatch` write results back through the
resolved operands.

Signed variants interpret words as 16-bit two's complement. Intermediate
results are widened (i32/i64) so no shift or product ever overflows.
*/

/// Result of an arithmetic instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Alu {
    /// New value of b.
    pub value: u16,
    /// New value of EX, or `None` when the instruction leaves EX alone.
    pub ex: Option<u16>,
}

impl Alu {
    #[inline]
    fn with_ex(value: u16, ex: u16) -> Self {
        Self {
            value,
            ex: Some(ex),
        }
    }

    #[inline]
    fn plain(value: u16) -> Self {
        Self { value, ex: None }
    }
}

#[inline]
fn signed(v: u16) -> i32 {
    v as i16 as i32
}

// -------------------------------------------------------------------------
// Arithmetic
// -------------------------------------------------------------------------

pub(crate) fn add(b: u16, a: u16) -> Alu {
    let sum = b as u32 + a as u32;
    Alu::with_ex(sum as u16, u16::from(sum > 0xFFFF))
}

pub(crate) fn sub(b: u16, a: u16) -> Alu {
    Alu::with_ex(b.wrapping_sub(a), if b < a { 0xFFFF } else { 0 })
}

pub(crate) fn mul(b: u16, a: u16) -> Alu {
    let p = b as u32 * a as u32;
    Alu::with_ex(p as u16, (p >> 16) as u16)
}

pub(crate) fn mli(b: u16, a: u16) -> Alu {
    let p = signed(b) * signed(a);
    Alu::with_ex(p as u16, (p >> 16) as u16)
}

pub(crate) fn div(b: u16, a: u16) -> Alu {
    if a == 0 {
        return Alu::with_ex(0, 0);
    }
    let ex = ((b as u32) << 16) / a as u32;
    Alu::with_ex(b / a, ex as u16)
}

pub(crate) fn dvi(b: u16, a: u16) -> Alu {
    if a == 0 {
        return Alu::with_ex(0, 0);
    }
    let (sb, sa) = (signed(b), signed(a));
    let ex = ((sb as i64) << 16) / sa as i64;
    Alu::with_ex((sb / sa) as u16, ex as u16)
}

pub(crate) fn modulo(b: u16, a: u16) -> Alu {
    Alu::plain(if a == 0 { 0 } else { b % a })
}

/// Signed remainder; the sign follows the dividend.
pub(crate) fn mdi(b: u16, a: u16) -> Alu {
    if a == 0 {
        return Alu::plain(0);
    }
    Alu::plain((signed(b) % signed(a)) as u16)
}

pub(crate) fn adx(b: u16, a: u16, ex: u16) -> Alu {
    let sum = b as u32 + a as u32 + ex as u32;
    Alu::with_ex(sum as u16, u16::from(sum > 0xFFFF))
}

/// b - a + EX, with EX taken as a signed carry-in.
pub(crate) fn sbx(b: u16, a: u16, ex: u16) -> Alu {
    let r = b as i32 - a as i32 + signed(ex);
    let ex = if r < 0 {
        0xFFFF
    } else if r > 0xFFFF {
        0x0001
    } else {
        0
    };
    Alu::with_ex(r as u16, ex)
}

// -------------------------------------------------------------------------
// Bitwise and shifts
// -------------------------------------------------------------------------

pub(crate) fn and(b: u16, a: u16) -> Alu {
    Alu::plain(b & a)
}

pub(crate) fn bor(b: u16, a: u16) -> Alu {
    Alu::plain(b | a)
}

pub(crate) fn xor(b: u16, a: u16) -> Alu {
    Alu::plain(b ^ a)
}

/// Shift amounts are clamped so the widened value is fully shifted out.
#[inline]
fn clamp_shift(a: u16) -> u32 {
    u32::from(a.min(48))
}

pub(crate) fn shr(b: u16, a: u16) -> Alu {
    let wide = ((b as u64) << 16) >> clamp_shift(a);
    Alu::with_ex((wide >> 16) as u16, wide as u16)
}

pub(crate) fn asr(b: u16, a: u16) -> Alu {
    let wide = ((signed(b) as i64) << 16) >> clamp_shift(a);
    Alu::with_ex((wide >> 16) as u16, wide as u16)
}

pub(crate) fn shl(b: u16, a: u16) -> Alu {
    let wide = (b as u64) << clamp_shift(a);
    Alu::with_ex(wide as u16, (wide >> 16) as u16)
}

// -------------------------------------------------------------------------
// Conditions (IFx)
// -------------------------------------------------------------------------

pub(crate) fn ifb(b: u16, a: u16) -> bool {
    b & a != 0
}

pub(crate) fn ifc(b: u16, a: u16) -> bool {
    b & a == 0
}

pub(crate) fn ife(b: u16, a: u16) -> bool {
    b == a
}

pub(crate) fn ifn(b: u16, a: u16) -> bool {
    b != a
}

pub(crate) fn ifg(b: u16, a: u16) -> bool {
    b > a
}

pub(crate) fn ifa(b: u16, a: u16) -> bool {
    signed(b) > signed(a)
}

pub(crate) fn ifl(b: u16, a: u16) -> bool {
    b < a
}

pub(crate) fn ifu(b: u16, a: u16) -> bool {
    signed(b) < signed(a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_sub_carry() {
        assert_eq!(add(0xF32D, 0x0FED), Alu::with_ex(0x031A, 1));
        assert_eq!(add(1, 2), Alu::with_ex(3, 0));
        assert_eq!(sub(1, 2), Alu::with_ex(0xFFFF, 0xFFFF));
        assert_eq!(sub(2, 1), Alu::with_ex(1, 0));
    }

    #[test]
    fn multiply_unsigned_and_signed() {
        assert_eq!(mul(0x0234, 0xFFFE), Alu::with_ex(0xFB98, 0x0233));
        assert_eq!(mli(0x0234, 0xFFFE), Alu::with_ex(0xFB98, 0xFFFF));
        assert_eq!(mli(0xFFFF, 0xFFFF), Alu::with_ex(1, 0));
    }

    #[test]
    fn unsigned_division() {
        assert_eq!(div(0x1231, 0x000F), Alu::with_ex(0x0136, 0x7777));
        assert_eq!(div(0xDEAD, 0x00DF), Alu::with_ex(0x00FF, 0xA0B7));
        assert_eq!(div(0x0015, 0xFFFF), Alu::with_ex(0, 0x0015));
        assert_eq!(div(0x0023, 0), Alu::with_ex(0, 0));
    }

    #[test]
    fn signed_division_truncates_toward_zero() {
        assert_eq!(dvi(0x0015, 0xFFFF), Alu::with_ex(0xFFEB, 0));
        assert_eq!(dvi(0xDEAD, 0x00DF), Alu::with_ex(0xFFDA, 0xBE91));
        assert_eq!(dvi(0x8000, 0xFFFF), Alu::with_ex(0x8000, 0));
        assert_eq!(dvi(5, 0), Alu::with_ex(0, 0));
    }

    #[test]
    fn remainders() {
        assert_eq!(modulo(0xFFF9, 0x0016), Alu::plain(0x000D));
        assert_eq!(mdi(0xFFF9, 0x0016), Alu::plain(0xFFF9));
        assert_eq!(mdi(7, 0xFFFE), Alu::plain(1));
        assert_eq!(modulo(7, 0), Alu::plain(0));
        assert_eq!(mdi(7, 0), Alu::plain(0));
    }

    #[test]
    fn shifts() {
        assert_eq!(shr(0xDEAD, 4), Alu::with_ex(0x0DEA, 0xD000));
        assert_eq!(asr(0xDEAD, 4), Alu::with_ex(0xFDEA, 0xD000));
        assert_eq!(shl(0xDEAD, 4), Alu::with_ex(0xEAD0, 0x000D));
        assert_eq!(shr(0xDEAD, 0xFFFF), Alu::with_ex(0, 0));
        assert_eq!(asr(0x8000, 0xFFFF), Alu::with_ex(0xFFFF, 0xFFFF));
        assert_eq!(shl(0xDEAD, 40), Alu::with_ex(0, 0));
    }

    #[test]
    fn add_and_subtract_with_ex() {
        assert_eq!(adx(0x1234, 0x5678, 0x0F00), Alu::with_ex(0x77AC, 0));
        assert_eq!(adx(0xFADE, 0x5678, 0x0F00), Alu::with_ex(0x6056, 1));
        assert_eq!(sbx(0xFADE, 0x5678, 0x0F00), Alu::with_ex(0xB366, 0));
        assert_eq!(sbx(0x0F00, 0x5678, 0x0F00), Alu::with_ex(0xC788, 0xFFFF));
        assert_eq!(sbx(0xFFFF, 0, 1), Alu::with_ex(0, 1));
    }

    #[test]
    fn conditions() {
        assert!(ifb(0xDEAD, 0x0F00));
        assert!(!ifc(0xDEAD, 0x0F00));
        assert!(ife(3, 3) && !ifn(3, 3));
        assert!(ifg(0xFFFF, 1));
        assert!(!ifa(0xFFFF, 1));
        assert!(ifl(1, 0xFFFF));
        assert!(!ifu(1, 0xFFFF));
        assert!(ifu(0xFFFF, 1));
    }
}
