use bitvec::vec::BitVec;
use core::fmt;
use primitives::hex;
use std::sync::Arc;

/// A table of valid `jump` destinations.
///
/// It is immutable and memory efficient, with one bit per byte of the padded
/// bytecode.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JumpTable(pub Arc<BitVec<u8>>);

impl fmt::Debug for JumpTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JumpTable")
            .field("map", &hex::encode(self.0.as_raw_slice()))
            .finish()
    }
}

impl JumpTable {
    /// Creates a new jump table from an existing bit vector.
    #[inline]
    pub fn new(jumps: BitVec<u8>) -> Self {
        Self(Arc::new(jumps))
    }

    /// Gets the raw bytes of the jump map.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_raw_slice()
    }

    /// Constructs a jump map from raw bytes and a bit length.
    ///
    /// # Panics
    ///
    /// Panics if the number of bits in the slice is less than `bit_len`.
    #[inline]
    pub fn from_slice(slice: &[u8], bit_len: usize) -> Self {
        assert!(
            slice.len() * 8 >= bit_len,
            "slice bit length {} is less than bit_len {bit_len}",
            slice.len() * 8
        );
        let mut bitvec: BitVec<u8> = BitVec::from_slice(slice);
        bitvec.truncate(bit_len);
        Self(Arc::new(bitvec))
    }

    /// Gets the bit length of the jump map.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the jump map is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checks if `pc` is a valid jump destination.
    #[inline]
    pub fn is_valid(&self, pc: usize) -> bool {
        pc < self.0.len() && self.0[pc]
    }
}
