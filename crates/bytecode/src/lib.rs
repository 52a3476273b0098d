//! Bytecode types, opcode constants and jump-destination analysis.
//!
//! Legacy bytecode will always contain a jump table after analysis.
#![warn(missing_docs)]

pub mod legacy;
pub mod opcode;

mod bytecode;

/// Re-export of the bitvec crate, used to store the legacy bytecode jump table.
pub use bitvec;
pub use bytecode::Bytecode;
pub use legacy::{analyze_legacy, JumpTable, LegacyAnalyzedBytecode};
pub use opcode::OpCode;
