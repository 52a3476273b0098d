//! Protocol constants used across the workspace.

use alloy_primitives::{address, Address};

/// EVM call stack limit (EIP-150).
pub const CALL_STACK_LIMIT: usize = 1024;

/// EIP-170: Contract code size limit.
///
/// By default the limit is `0x6000` (~25kb).
pub const MAX_CODE_SIZE: usize = 0x6000;

/// EIP-3860: Limit and meter initcode.
///
/// Limit of maximum initcode size is `2 * MAX_CODE_SIZE`.
pub const MAX_INITCODE_SIZE: usize = 2 * MAX_CODE_SIZE;

/// Number of block hashes that the EVM can access in the past (pre-Prague).
pub const BLOCK_HASH_HISTORY: u64 = 256;

/// The address of precompile 3, which is handled specially in a few places
/// because of a pre-Spurious-Dragon consensus quirk (see the yellow paper,
/// appendix K.1).
pub const PRECOMPILE3: Address = address!("0000000000000000000000000000000000000003");
