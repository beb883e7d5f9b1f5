//! Bit-width bookkeeping for dictionary-encoded dimensions.

/// Widest field a single dimension may occupy in a packed key.
pub const MAX_BIT_WIDTH: u8 = 32;

/// Number of bits needed to store surrogates up to `cardinality`.
///
/// Surrogates are assigned from 1 upward, so the largest value a dimension
/// can carry is its cardinality. Every dimension occupies at least one bit.
#[inline]
pub fn bit_width_for_cardinality(cardinality: u32) -> u8 {
    let bits = u32::BITS - cardinality.leading_zeros();
    bits.max(1) as u8
}

/// Bit widths for every dimension of a segment, in schema order.
pub fn bit_widths_from_cardinalities(cardinalities: &[u32]) -> Vec<u8> {
    cardinalities
        .iter()
        .map(|&c| bit_width_for_cardinality(c))
        .collect()
}
