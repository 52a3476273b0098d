use super::JumpTable;
use crate::opcode;
use bitvec::{bitvec, order::Lsb0, vec::BitVec};
use primitives::Bytes;

/// Padding appended to the analyzed bytecode.
///
/// 33 trailing `STOP` bytes guarantee that a program counter advancing past
/// the real end of the code, including past the immediates of a trailing
/// `PUSH32`, always lands on `STOP`.
pub(crate) const STOP_PADDING: usize = 33;

/// Analyzes the bytecode for use in [`LegacyAnalyzedBytecode`](crate::LegacyAnalyzedBytecode).
///
/// Walks the code once, marking every `JUMPDEST` byte that is not inside a
/// `PUSH` immediate, then pads the code with [`STOP_PADDING`] `STOP` bytes.
/// The returned jump table has one bit per byte of the padded code.
pub fn analyze_legacy(bytecode: &Bytes) -> (JumpTable, Bytes) {
    let padded_len = bytecode.len() + STOP_PADDING;
    let mut jumps: BitVec<u8> = bitvec![u8, Lsb0; 0; padded_len];

    let mut i = 0;
    while i < bytecode.len() {
        let opcode = bytecode[i];
        if opcode == opcode::JUMPDEST {
            jumps.set(i, true);
            i += 1;
        } else {
            let push_offset = opcode.wrapping_sub(opcode::PUSH1);
            if push_offset < 32 {
                // Skip the immediate bytes, they are data and never jump targets.
                i += push_offset as usize + 2;
            } else {
                i += 1;
            }
        }
    }

    let mut padded = Vec::with_capacity(padded_len);
    padded.extend_from_slice(bytecode);
    padded.resize(padded_len, opcode::STOP);

    (JumpTable::new(jumps), Bytes::from(padded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_pads_with_33_stops() {
        let bytecode = Bytes::from(vec![
            opcode::PUSH1,
            0x01,
            opcode::PUSH1,
            0x02,
            opcode::ADD,
        ]);
        let (jump_table, padded) = analyze_legacy(&bytecode);
        assert_eq!(padded.len(), bytecode.len() + STOP_PADDING);
        assert!(padded[bytecode.len()..].iter().all(|b| *b == opcode::STOP));
        assert_eq!(jump_table.len(), padded.len());
    }

    #[test]
    fn empty_bytecode_is_all_stops() {
        let (jump_table, padded) = analyze_legacy(&Bytes::new());
        assert_eq!(padded.len(), STOP_PADDING);
        assert_eq!(jump_table.len(), STOP_PADDING);
        assert!(!jump_table.is_valid(0));
    }

    #[test]
    fn jumpdest_at_start() {
        let bytecode = Bytes::from(vec![opcode::JUMPDEST, opcode::PUSH1, 0x01, opcode::STOP]);
        let (jump_table, _) = analyze_legacy(&bytecode);
        assert!(jump_table.is_valid(0));
    }

    #[test]
    fn jumpdest_after_push() {
        let bytecode = Bytes::from(vec![opcode::PUSH1, 0x01, opcode::JUMPDEST, opcode::STOP]);
        let (jump_table, _) = analyze_legacy(&bytecode);
        assert!(jump_table.is_valid(2));
    }

    #[test]
    fn jumpdest_in_push_data_is_not_valid() {
        let bytecode = Bytes::from(vec![
            opcode::PUSH2,
            opcode::JUMPDEST, // immediate byte, not a destination
            0x02,
            opcode::STOP,
        ]);
        let (jump_table, _) = analyze_legacy(&bytecode);
        assert!(!jump_table.is_valid(1));
    }

    #[test]
    fn multiple_jumpdests() {
        let bytecode = Bytes::from(vec![
            opcode::JUMPDEST,
            opcode::PUSH1,
            0x01,
            opcode::JUMPDEST,
            opcode::STOP,
        ]);
        let (jump_table, _) = analyze_legacy(&bytecode);
        assert!(jump_table.is_valid(0));
        assert!(jump_table.is_valid(3));
        assert!(!jump_table.is_valid(1));
        assert!(!jump_table.is_valid(4));
    }

    #[test]
    fn truncated_push_tail_is_covered_by_padding() {
        // PUSH32 with no immediate bytes at all; the padding must absorb the
        // 32-byte read plus the final STOP.
        let bytecode = Bytes::from(vec![opcode::PUSH32]);
        let (_, padded) = analyze_legacy(&bytecode);
        assert_eq!(padded.len(), 1 + STOP_PADDING);
    }

    #[test]
    fn analysis_is_idempotent() {
        let bytecode = Bytes::from(vec![opcode::JUMPDEST, opcode::PUSH1, 0x00, opcode::JUMP]);
        let (first_table, first) = analyze_legacy(&bytecode);
        let (second_table, second) = analyze_legacy(&bytecode);
        assert_eq!(first, second);
        assert_eq!(first_table, second_table);
    }
}
