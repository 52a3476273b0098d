use super::JumpTable;
use primitives::Bytes;

/// Legacy analyzed bytecode: the padded code together with the length of the
/// original (unpadded) code and the precomputed jump table.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LegacyAnalyzedBytecode {
    /// Bytecode with 33 zero bytes padding.
    bytecode: Bytes,
    /// Original bytes length.
    original_len: usize,
    /// Jump table.
    jump_table: JumpTable,
}

impl Default for LegacyAnalyzedBytecode {
    fn default() -> Self {
        Self {
            bytecode: Bytes::from_static(&[0; 33]),
            original_len: 0,
            jump_table: JumpTable::from_slice(&[0; 5], 33),
        }
    }
}

impl LegacyAnalyzedBytecode {
    /// Creates a new analyzed bytecode.
    ///
    /// Prefer [`analyze`](Self::analyze); this constructor trusts the caller
    /// about the padding and jump table consistency.
    pub fn new(bytecode: Bytes, original_len: usize, jump_table: JumpTable) -> Self {
        Self {
            bytecode,
            original_len,
            jump_table,
        }
    }

    /// Analyzes raw bytecode: pads it and computes the jump table.
    pub fn analyze(raw: Bytes) -> Self {
        let original_len = raw.len();
        let (jump_table, bytecode) = super::analyze_legacy(&raw);
        Self {
            bytecode,
            original_len,
            jump_table,
        }
    }

    /// Returns the padded bytecode.
    pub fn bytecode(&self) -> &Bytes {
        &self.bytecode
    }

    /// Returns the length of the original (unpadded) bytecode.
    pub fn original_len(&self) -> usize {
        self.original_len
    }

    /// Returns the original bytecode without the padding.
    pub fn original_bytes(&self) -> Bytes {
        self.bytecode.slice(..self.original_len)
    }

    /// Returns the original bytecode without the padding, as a slice.
    pub fn original_byte_slice(&self) -> &[u8] {
        &self.bytecode[..self.original_len]
    }

    /// Returns the jump table.
    pub fn jump_table(&self) -> &JumpTable {
        &self.jump_table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode;

    #[test]
    fn original_bytes_drops_padding() {
        let raw = Bytes::from(vec![opcode::PUSH1, 0x01]);
        let analyzed = LegacyAnalyzedBytecode::analyze(raw.clone());
        assert_eq!(analyzed.original_bytes(), raw);
        assert_eq!(analyzed.original_len(), 2);
        assert_eq!(analyzed.bytecode().len(), 2 + 33);
    }

    #[test]
    fn default_is_a_single_padded_stop() {
        let default = LegacyAnalyzedBytecode::default();
        assert_eq!(default.original_len(), 0);
        assert_eq!(default.bytecode().len(), 33);
        assert!(!default.jump_table().is_valid(0));
    }
}
