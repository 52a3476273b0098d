//! Primitive types shared by every corevm crate.
//!
//! Words, addresses and hashes come from [`alloy_primitives`]; this crate adds
//! the hardfork identifiers, protocol constants, the execution environment and
//! the result/error taxonomy of the EVM core.
#![warn(missing_docs)]

pub mod constants;
pub mod eip4844;
pub mod env;
pub mod hardfork;
pub mod result;

pub use constants::*;
pub use eip4844::{calc_blob_gasprice, calc_excess_blob_gas, GAS_PER_BLOB};
pub use env::{
    AnalysisKind, BlobExcessGasAndPrice, BlockEnv, CfgEnv, Env, TransactTo, TxEnv,
};
pub use hardfork::{OpSpecId, SpecId, UnknownHardfork};
pub use result::{
    EVMError, ExecutionResult, HaltReason, InvalidHeader, InvalidTransaction, OutOfGasError,
    Output, ResultAndState, SuccessReason,
};

pub use alloy_eip2930::{AccessList, AccessListItem};
pub use alloy_primitives::{
    self, address, b256, bytes, fixed_bytes, hex, keccak256, ruint, uint, Address, Bytes, Log,
    LogData, TxKind, B256, I256, U256,
};
pub use alloy_primitives::map::{self, hash_map, hash_set, HashMap, HashSet};

/// The Keccak-256 hash of the empty string.
pub const KECCAK_EMPTY: B256 =
    b256!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470");
