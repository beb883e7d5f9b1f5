use factload_result::{Error, Result};
use factload_types::PackedKey;

use crate::cardinality::MAX_BIT_WIDTH;

/// Packs per-dimension surrogate indices into a fixed-width key.
///
/// Implementations are pure: the only state they keep is their bit-width
/// table, so one instance is shared by every writer unit of a segment.
pub trait KeyPacker: Send + Sync {
    /// Pack one row's indices. Fails on wrong arity or a value that does not
    /// fit its dimension.
    fn pack(&self, indices: &[u32]) -> Result<PackedKey>;

    /// Recover the indices of a key produced by [`KeyPacker::pack`].
    fn unpack(&self, key: &PackedKey) -> Result<Vec<u32>>;

    /// Width in bytes of every key this packer produces.
    fn key_size_bytes(&self) -> usize;

    fn dimension_count(&self) -> usize;
}

/// Bit packer writing each dimension's field most significant bit first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiDimKeyGenerator {
    bit_widths: Vec<u8>,
    key_size: usize,
}

impl MultiDimKeyGenerator {
    pub fn new(bit_widths: Vec<u8>) -> Result<Self> {
        if let Some((dim, &w)) = bit_widths
            .iter()
            .enumerate()
            .find(|&(_, &w)| w == 0 || w > MAX_BIT_WIDTH)
        {
            return Err(Error::KeyGeneration(format!(
                "dimension {dim} has bit width {w}; expected 1..={MAX_BIT_WIDTH}"
            )));
        }
        let total_bits: usize = bit_widths.iter().map(|&w| w as usize).sum();
        Ok(Self {
            key_size: total_bits.div_ceil(8),
            bit_widths,
        })
    }

    pub fn bit_widths(&self) -> &[u8] {
        &self.bit_widths
    }

    #[inline]
    fn mask(width: u8) -> u64 {
        (1u64 << width) - 1
    }
}

impl KeyPacker for MultiDimKeyGenerator {
    fn pack(&self, indices: &[u32]) -> Result<PackedKey> {
        if indices.len() != self.bit_widths.len() {
            return Err(Error::KeyGeneration(format!(
                "expected {} dimension indices, got {}",
                self.bit_widths.len(),
                indices.len()
            )));
        }

        let mut out = Vec::with_capacity(self.key_size);
        // Holds at most 7 pending bits plus one 32-bit field.
        let mut acc: u64 = 0;
        let mut acc_bits: u32 = 0;
        for (dim, (&value, &width)) in indices.iter().zip(&self.bit_widths).enumerate() {
            let value = u64::from(value);
            if value > Self::mask(width) {
                return Err(Error::KeyGeneration(format!(
                    "surrogate {value} of dimension {dim} does not fit in {width} bits"
                )));
            }
            acc = (acc << width) | value;
            acc_bits += u32::from(width);
            while acc_bits >= 8 {
                acc_bits -= 8;
                out.push((acc >> acc_bits) as u8);
            }
            acc &= (1u64 << acc_bits) - 1;
        }
        if acc_bits > 0 {
            out.push((acc << (8 - acc_bits)) as u8);
        }

        debug_assert_eq!(out.len(), self.key_size);
        Ok(PackedKey(out))
    }

    fn unpack(&self, key: &PackedKey) -> Result<Vec<u32>> {
        if key.len() != self.key_size {
            return Err(Error::KeyGeneration(format!(
                "packed key has {} bytes, expected {}",
                key.len(),
                self.key_size
            )));
        }

        let mut bytes = key.as_bytes().iter();
        let mut out = Vec::with_capacity(self.bit_widths.len());
        let mut acc: u64 = 0;
        let mut acc_bits: u32 = 0;
        for &width in &self.bit_widths {
            while acc_bits < u32::from(width) {
                // Length was checked above, so the iterator cannot run dry.
                let byte = bytes.next().copied().unwrap_or(0);
                acc = (acc << 8) | u64::from(byte);
                acc_bits += 8;
            }
            let shift = acc_bits - u32::from(width);
            out.push(((acc >> shift) & Self::mask(width)) as u32);
            acc &= (1u64 << shift) - 1;
            acc_bits = shift;
        }
        Ok(out)
    }

    fn key_size_bytes(&self) -> usize {
        self.key_size
    }

    fn dimension_count(&self) -> usize {
        self.bit_widths.len()
    }
}
