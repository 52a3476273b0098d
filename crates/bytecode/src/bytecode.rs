//! The main bytecode type, a tagged union of raw and analyzed legacy code.

use crate::{legacy::LegacyAnalyzedBytecode, JumpTable};
use primitives::{keccak256, Bytes, B256, KECCAK_EMPTY};

/// State of the [`Bytecode`] analysis.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bytecode {
    /// No analysis has been performed.
    LegacyRaw(Bytes),
    /// The bytecode has been analyzed for valid jump destinations.
    LegacyAnalyzed(LegacyAnalyzedBytecode),
}

impl Default for Bytecode {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Bytecode {
    /// Creates a new, empty, already-analyzed bytecode.
    #[inline]
    pub fn new() -> Self {
        Self::LegacyAnalyzed(LegacyAnalyzedBytecode::default())
    }

    /// Creates a new raw [`Bytecode`].
    #[inline]
    pub fn new_raw(bytecode: Bytes) -> Self {
        Self::LegacyRaw(bytecode)
    }

    /// Calculates the hash of the original bytecode.
    #[inline]
    pub fn hash_slow(&self) -> B256 {
        if self.is_empty() {
            KECCAK_EMPTY
        } else {
            keccak256(self.original_byte_slice())
        }
    }

    /// Returns `true` if the bytecode is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.original_byte_slice().is_empty()
    }

    /// Returns the length of the original bytecode, without analysis padding.
    #[inline]
    pub fn len(&self) -> usize {
        self.original_byte_slice().len()
    }

    /// Performs bytecode analysis if it was not already done.
    ///
    /// Analysis pads the code with 33 `STOP` bytes and builds the jump table.
    #[inline]
    pub fn into_analyzed(self) -> Self {
        match self {
            Self::LegacyRaw(raw) => {
                Self::LegacyAnalyzed(LegacyAnalyzedBytecode::analyze(raw))
            }
            analyzed => analyzed,
        }
    }

    /// Returns a reference to the analyzed bytecode, or `None` if the bytecode
    /// is raw.
    #[inline]
    pub fn legacy_analyzed(&self) -> Option<&LegacyAnalyzedBytecode> {
        match self {
            Self::LegacyRaw(_) => None,
            Self::LegacyAnalyzed(analyzed) => Some(analyzed),
        }
    }

    /// Returns the jump table of the analyzed bytecode, or `None` if the
    /// bytecode is raw.
    #[inline]
    pub fn legacy_jump_table(&self) -> Option<&JumpTable> {
        self.legacy_analyzed().map(|b| b.jump_table())
    }

    /// Returns the padded bytecode if analyzed, or the raw bytes otherwise.
    #[inline]
    pub fn bytecode_slice(&self) -> &[u8] {
        match self {
            Self::LegacyRaw(raw) => raw,
            Self::LegacyAnalyzed(analyzed) => analyzed.bytecode(),
        }
    }

    /// Returns the original bytecode without analysis padding.
    #[inline]
    pub fn original_bytes(&self) -> Bytes {
        match self {
            Self::LegacyRaw(bytes) => bytes.clone(),
            Self::LegacyAnalyzed(analyzed) => analyzed.original_bytes(),
        }
    }

    /// Returns the original bytecode as a byte slice, without analysis
    /// padding.
    #[inline]
    pub fn original_byte_slice(&self) -> &[u8] {
        match self {
            Self::LegacyRaw(bytes) => bytes,
            Self::LegacyAnalyzed(analyzed) => analyzed.original_byte_slice(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode;

    #[test]
    fn into_analyzed_is_idempotent() {
        let raw = Bytes::from(vec![opcode::PUSH1, 0x01, opcode::JUMPDEST]);
        let analyzed = Bytecode::new_raw(raw).into_analyzed();
        let again = analyzed.clone().into_analyzed();
        assert_eq!(analyzed, again);
    }

    #[test]
    fn hash_of_empty_is_keccak_empty() {
        assert_eq!(Bytecode::new().hash_slow(), KECCAK_EMPTY);
        assert_eq!(Bytecode::new_raw(Bytes::new()).hash_slow(), KECCAK_EMPTY);
    }

    #[test]
    fn hash_ignores_analysis_padding() {
        let raw = Bytes::from(vec![opcode::PUSH1, 0x01]);
        let bytecode = Bytecode::new_raw(raw.clone());
        let analyzed = bytecode.clone().into_analyzed();
        assert_eq!(bytecode.hash_slow(), analyzed.hash_slow());
        assert_eq!(analyzed.hash_slow(), keccak256(&raw));
    }
}
