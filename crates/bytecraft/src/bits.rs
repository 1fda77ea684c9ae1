//! Low-level bit manipulation utilities.
//!
//! Groups are addressed MSB-first: the first group is the highest-order slice.

/// Splits `value` into consecutive bit groups of the given widths.
///
/// `groups[0]` is taken from the most-significant end of the `sum(groups)`
/// low bits and the last group from the least-significant end. Bits above
/// `sum(groups)` are ignored. A width of 64 or more takes every remaining bit.
///
/// ```
/// use bytecraft::bits::extract;
///
/// assert_eq!(extract(0b11101010, &[2, 3, 3]), vec![0b11, 0b101, 0b010]);
/// ```
pub fn extract(mut value: u64, groups: &[u32]) -> Vec<u64> {
    let mut out = vec![0u64; groups.len()];

    for (slot, &width) in out.iter_mut().zip(groups).rev() {
        *slot = value & mask(width);
        value = value.checked_shr(width).unwrap_or(0);
    }

    out
}

/// Mask covering the low `width` bits.
fn mask(width: u32) -> u64 {
    match 1u64.checked_shl(width) {
        Some(bit) => bit - 1,
        None => u64::MAX,
    }
}

/// Sign-extends the low `bits` of `value` to a full `i64`.
///
/// `bits` of 0 or 64 and above reinterpret `value` unchanged.
pub fn sign_extend(value: u64, bits: usize) -> i64 {
    match u32::try_from(bits) {
        Ok(bits @ 1..=63) => {
            let shift = 64 - bits;
            ((value << shift) as i64) >> shift
        }
        _ => value as i64,
    }
}
