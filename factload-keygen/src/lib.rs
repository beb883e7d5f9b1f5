//! Multi-dimensional key (MDK) generation.
//!
//! A load packs the surrogate indices of every dictionary-encoded dimension of
//! a row into one fixed-width [`PackedKey`](factload_types::PackedKey). The
//! width of each dimension's field comes from its cardinality, recorded once
//! per segment in a [`SegmentDescriptor`].
//!
//! # Key layout
//!
//! ```text
//! | dim_0 (w_0 bits) | dim_1 (w_1 bits) | ... | zero padding to a byte |
//! ```
//!
//! Fields are written most significant bit first, so comparing two keys byte
//! by byte orders them exactly like comparing their index tuples.

pub mod cardinality;
pub mod descriptor;
pub mod packer;

pub use cardinality::{MAX_BIT_WIDTH, bit_width_for_cardinality, bit_widths_from_cardinalities};
pub use descriptor::{CardinalitySegmentResolver, SegmentDescriptor, SegmentDescriptorResolver};
pub use packer::{KeyPacker, MultiDimKeyGenerator};
