//! Two's-complement helpers for the signed 256-bit opcodes.

use core::cmp::Ordering;
use primitives::U256;

/// The sign of a 256-bit integer under the two's-complement interpretation.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Sign {
    /// Less than zero.
    Minus,
    /// Zero.
    Zero,
    /// Greater than zero.
    Plus,
}

/// The minimum negative value, `-2^255`.
pub const MIN_NEGATIVE_VALUE: U256 = U256::from_limbs([
    0x0000000000000000,
    0x0000000000000000,
    0x0000000000000000,
    0x8000000000000000,
]);

const FLIPH_BITMASK_U64: u64 = 0x7FFF_FFFF_FFFF_FFFF;

/// Returns the sign of the value; with `DO_TWO_COMPL` the value is negated in
/// place when it is negative, producing its magnitude.
#[inline]
pub fn i256_sign<const DO_TWO_COMPL: bool>(val: &mut U256) -> Sign {
    if !val.bit(U256::BITS - 1) {
        if val.is_zero() {
            Sign::Zero
        } else {
            Sign::Plus
        }
    } else {
        if DO_TWO_COMPL {
            two_compl_mut(val);
        }
        Sign::Minus
    }
}

#[inline]
fn u256_remove_sign(val: &mut U256) {
    // SAFETY: The limbs are never reduced below the modulus here.
    unsafe {
        val.as_limbs_mut()[3] &= FLIPH_BITMASK_U64;
    }
}

/// Negates the value in place.
#[inline]
pub fn two_compl_mut(op: &mut U256) {
    *op = two_compl(*op);
}

/// Returns the two's complement of the value.
#[inline]
pub fn two_compl(op: U256) -> U256 {
    op.wrapping_neg()
}

/// Compares two values under the two's-complement interpretation.
#[inline]
pub fn i256_cmp(first: &U256, second: &U256) -> Ordering {
    let mut first = *first;
    let mut second = *second;
    let first_sign = i256_sign::<false>(&mut first);
    let second_sign = i256_sign::<false>(&mut second);
    match (first_sign, second_sign) {
        (Sign::Zero, Sign::Zero) => Ordering::Equal,
        (Sign::Zero, Sign::Plus) => Ordering::Less,
        (Sign::Zero, Sign::Minus) => Ordering::Greater,
        (Sign::Minus, Sign::Zero) => Ordering::Less,
        (Sign::Minus, Sign::Plus) => Ordering::Less,
        (Sign::Minus, Sign::Minus) => first.cmp(&second),
        (Sign::Plus, Sign::Minus) => Ordering::Greater,
        (Sign::Plus, Sign::Zero) => Ordering::Greater,
        (Sign::Plus, Sign::Plus) => first.cmp(&second),
    }
}

/// Signed division, with the EVM conventions: division by zero is zero, and
/// `MIN / -1` wraps to `MIN`.
#[inline]
pub fn i256_div(mut first: U256, mut second: U256) -> U256 {
    let second_sign = i256_sign::<true>(&mut second);
    if second_sign == Sign::Zero {
        return U256::ZERO;
    }

    let first_sign = i256_sign::<true>(&mut first);
    if first_sign == Sign::Minus && first == MIN_NEGATIVE_VALUE && second == U256::from(1) {
        // MIN / -1 and MIN / 1 both wrap back to MIN.
        return two_compl(MIN_NEGATIVE_VALUE);
    }

    let mut d = first / second;

    u256_remove_sign(&mut d);

    if d.is_zero() {
        return U256::ZERO;
    }

    match (first_sign, second_sign) {
        (Sign::Zero, Sign::Plus)
        | (Sign::Plus, Sign::Zero)
        | (Sign::Zero, Sign::Zero)
        | (Sign::Plus, Sign::Plus)
        | (Sign::Minus, Sign::Minus) => d,
        (Sign::Zero, Sign::Minus)
        | (Sign::Plus, Sign::Minus)
        | (Sign::Minus, Sign::Zero)
        | (Sign::Minus, Sign::Plus) => two_compl(d),
    }
}

/// Signed modulo, with the EVM convention that the result takes the sign of
/// the dividend and modulo by zero is zero.
#[inline]
pub fn i256_mod(mut first: U256, mut second: U256) -> U256 {
    let first_sign = i256_sign::<true>(&mut first);
    if first_sign == Sign::Zero {
        return U256::ZERO;
    }

    let second_sign = i256_sign::<true>(&mut second);
    if second_sign == Sign::Zero {
        return U256::ZERO;
    }

    let mut r = first % second;
    u256_remove_sign(&mut r);
    if r.is_zero() {
        return U256::ZERO;
    }
    if first_sign == Sign::Minus {
        two_compl(r)
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::num::Wrapping;

    #[test]
    fn div_i256() {
        // Sanity checks based on i8. Notice that we need to use `Wrapping`
        // here because Rust will prevent the overflow by default whereas the
        // EVM does not.
        assert_eq!(Wrapping(i8::MIN) / Wrapping(-1), Wrapping(i8::MIN));
        assert_eq!(i8::MAX / -1, -i8::MAX);

        // Now the same calculations based on i256
        let one = U256::from(1);
        let one_hundred = U256::from(100);
        let fifty = U256::from(50);
        let two = U256::from(2);
        let neg_one_hundred = two_compl(U256::from(100));
        let minus_one = two_compl(U256::from(1));
        let max_value = U256::from(2).pow(U256::from(255)) - U256::from(1);
        let neg_max_value = two_compl(max_value);

        assert_eq!(i256_div(MIN_NEGATIVE_VALUE, minus_one), MIN_NEGATIVE_VALUE);
        assert_eq!(i256_div(MIN_NEGATIVE_VALUE, one), MIN_NEGATIVE_VALUE);
        assert_eq!(i256_div(max_value, one), max_value);
        assert_eq!(i256_div(max_value, minus_one), neg_max_value);
        assert_eq!(i256_div(one_hundred, minus_one), neg_one_hundred);
        assert_eq!(i256_div(one_hundred, two), fifty);
        assert_eq!(i256_div(one_hundred, U256::ZERO), U256::ZERO);
    }

    #[test]
    fn mod_i256() {
        let one = U256::from(1);
        let ten = U256::from(10);
        let three = U256::from(3);
        let minus_ten = two_compl(ten);
        let minus_one = two_compl(one);

        assert_eq!(i256_mod(ten, three), one);
        assert_eq!(i256_mod(minus_ten, three), minus_one);
        assert_eq!(i256_mod(ten, two_compl(three)), one);
        assert_eq!(i256_mod(minus_ten, two_compl(three)), minus_one);
        assert_eq!(i256_mod(ten, U256::ZERO), U256::ZERO);
        assert_eq!(i256_mod(U256::ZERO, three), U256::ZERO);
    }

    #[test]
    fn cmp_i256() {
        use core::cmp::Ordering;
        let one = U256::from(1);
        let minus_one = two_compl(one);
        let two = U256::from(2);

        assert_eq!(i256_cmp(&one, &two), Ordering::Less);
        assert_eq!(i256_cmp(&minus_one, &one), Ordering::Less);
        assert_eq!(i256_cmp(&minus_one, &two_compl(two)), Ordering::Greater);
        assert_eq!(i256_cmp(&U256::ZERO, &minus_one), Ordering::Greater);
        assert_eq!(i256_cmp(&one, &one), Ordering::Equal);
    }
}
