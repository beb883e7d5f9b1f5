//! Segment-wide key layout.

use std::sync::Arc;

use factload_result::{Error, Result};

use crate::cardinality::bit_widths_from_cardinalities;
use crate::packer::{KeyPacker, MultiDimKeyGenerator};

/// Bit-width table and key packer shared by every writer unit of a segment.
#[derive(Clone)]
pub struct SegmentDescriptor {
    dimension_cardinalities: Vec<u32>,
    bit_widths: Vec<u8>,
    key_packer: Arc<dyn KeyPacker>,
}

impl std::fmt::Debug for SegmentDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentDescriptor")
            .field("dimension_cardinalities", &self.dimension_cardinalities)
            .field("bit_widths", &self.bit_widths)
            .field("key_size_bytes", &self.key_packer.key_size_bytes())
            .finish()
    }
}

impl SegmentDescriptor {
    /// Derive bit widths from cardinalities and build the default packer.
    pub fn from_cardinalities(cardinalities: &[u32]) -> Result<Self> {
        let bit_widths = bit_widths_from_cardinalities(cardinalities);
        let packer = MultiDimKeyGenerator::new(bit_widths.clone())?;
        Ok(Self {
            dimension_cardinalities: cardinalities.to_vec(),
            bit_widths,
            key_packer: Arc::new(packer),
        })
    }

    /// Use a caller-provided packer, e.g. one reading a persisted layout.
    pub fn with_key_packer(
        dimension_cardinalities: Vec<u32>,
        bit_widths: Vec<u8>,
        key_packer: Arc<dyn KeyPacker>,
    ) -> Result<Self> {
        if key_packer.dimension_count() != bit_widths.len() {
            return Err(Error::KeyGeneration(format!(
                "key packer handles {} dimensions, bit-width table has {}",
                key_packer.dimension_count(),
                bit_widths.len()
            )));
        }
        Ok(Self {
            dimension_cardinalities,
            bit_widths,
            key_packer,
        })
    }

    pub fn key_packer(&self) -> &Arc<dyn KeyPacker> {
        &self.key_packer
    }

    pub fn bit_widths(&self) -> &[u8] {
        &self.bit_widths
    }

    pub fn dimension_cardinalities(&self) -> &[u32] {
        &self.dimension_cardinalities
    }

    pub fn dimension_count(&self) -> usize {
        self.bit_widths.len()
    }

    pub fn key_size_bytes(&self) -> usize {
        self.key_packer.key_size_bytes()
    }
}

/// Resolves the descriptor of the segment being loaded.
pub trait SegmentDescriptorResolver: Send + Sync {
    fn resolve(&self, dimension_cardinalities: &[u32]) -> Result<SegmentDescriptor>;
}

/// Resolver deriving the key layout purely from configured cardinalities.
#[derive(Debug, Clone, Copy, Default)]
pub struct CardinalitySegmentResolver;

impl SegmentDescriptorResolver for CardinalitySegmentResolver {
    fn resolve(&self, dimension_cardinalities: &[u32]) -> Result<SegmentDescriptor> {
        let descriptor = SegmentDescriptor::from_cardinalities(dimension_cardinalities)?;
        tracing::debug!(
            "[KEYGEN] resolved segment descriptor: {} dimensions, {}-byte keys",
            descriptor.dimension_count(),
            descriptor.key_size_bytes()
        );
        Ok(descriptor)
    }
}
