//! Typed outcomes of transaction execution and the validation error taxonomy.

use alloy_primitives::{Address, Bytes, Log, U256};
use core::fmt;

/// Result of a transaction execution, paired with the state it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResultAndState<S> {
    /// Status of execution.
    pub result: ExecutionResult,
    /// State that got updated.
    pub state: S,
}

/// Result of a transaction execution.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecutionResult {
    /// Returned successfully.
    Success {
        /// Reason for the success.
        reason: SuccessReason,
        /// Gas used by the transaction.
        gas_used: u64,
        /// Gas refunded by the transaction.
        gas_refunded: u64,
        /// Logs emitted by the transaction.
        logs: Vec<Log>,
        /// Output of the transaction.
        output: Output,
    },
    /// Reverted by the `REVERT` opcode, which doesn't spend all gas.
    Revert {
        /// Gas used by the transaction.
        gas_used: u64,
        /// Output of the transaction.
        output: Bytes,
    },
    /// Reverted for a reason other than the `REVERT` opcode, spending all gas.
    Halt {
        /// Reason for the halt.
        reason: HaltReason,
        /// Halting will spend all the gas, which will be equal to gas_limit.
        gas_used: u64,
    },
}

impl ExecutionResult {
    /// Returns if the transaction was successful.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns true if execution result is a Halt.
    pub fn is_halt(&self) -> bool {
        matches!(self, Self::Halt { .. })
    }

    /// Returns the output data of the execution.
    ///
    /// Returns `None` if the execution was halted.
    pub fn output(&self) -> Option<&Bytes> {
        match self {
            Self::Success { output, .. } => Some(output.data()),
            Self::Revert { output, .. } => Some(output),
            _ => None,
        }
    }

    /// Consumes the type and returns the output data of the execution.
    ///
    /// Returns `None` if the execution was halted.
    pub fn into_output(self) -> Option<Bytes> {
        match self {
            Self::Success { output, .. } => Some(output.into_data()),
            Self::Revert { output, .. } => Some(output),
            _ => None,
        }
    }

    /// Returns the logs if execution is successful, or an empty list otherwise.
    pub fn logs(&self) -> &[Log] {
        match self {
            Self::Success { logs, .. } => logs,
            _ => &[],
        }
    }

    /// Consumes the result and returns the logs if execution is successful.
    pub fn into_logs(self) -> Vec<Log> {
        match self {
            Self::Success { logs, .. } => logs,
            _ => Vec::new(),
        }
    }

    /// Returns the gas used.
    pub fn gas_used(&self) -> u64 {
        match *self {
            Self::Success { gas_used, .. }
            | Self::Revert { gas_used, .. }
            | Self::Halt { gas_used, .. } => gas_used,
        }
    }
}

/// Output of a transaction execution.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Output {
    /// Output of a call.
    Call(Bytes),
    /// Output of a create, with the address of the created contract when it
    /// was actually deployed.
    Create(Bytes, Option<Address>),
}

impl Output {
    /// Returns the output data of the execution output.
    pub fn into_data(self) -> Bytes {
        match self {
            Output::Call(data) => data,
            Output::Create(data, _) => data,
        }
    }

    /// Returns the output data of the execution output.
    pub fn data(&self) -> &Bytes {
        match self {
            Output::Call(data) => data,
            Output::Create(data, _) => data,
        }
    }

    /// Returns the created address, if any.
    pub fn address(&self) -> Option<&Address> {
        match self {
            Output::Call(_) => None,
            Output::Create(_, address) => address.as_ref(),
        }
    }
}

/// Reason a frame finished successfully.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SuccessReason {
    /// Encountered a `STOP` opcode.
    Stop,
    /// Encountered a `RETURN` opcode.
    Return,
    /// Encountered a `SELFDESTRUCT` opcode.
    SelfDestruct,
}

/// Indicates that the EVM has experienced an exceptional halt.
///
/// This causes execution to immediately end with all gas being consumed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HaltReason {
    /// Execution ran out of gas.
    OutOfGas(OutOfGasError),
    /// Unknown opcode encountered.
    OpcodeNotFound,
    /// Invalid `CALL` with value transfer in a static context.
    CallNotAllowedInsideStatic,
    /// Invalid state modification in a static context.
    StateChangeDuringStaticCall,
    /// The designated `INVALID` (0xFE) opcode was executed.
    InvalidFEOpcode,
    /// Jump to a position that is not a `JUMPDEST`.
    InvalidJump,
    /// The feature or opcode is not activated in this hardfork.
    NotActivated,
    /// Attempted to pop a value from an empty stack.
    StackUnderflow,
    /// Attempted to push a value onto a full stack.
    StackOverflow,
    /// Invalid memory or returndata offset.
    OutOfOffset,
    /// Address collision during contract creation.
    CreateCollision,
    /// Payment amount overflow.
    OverflowPayment,
    /// Nonce overflow.
    NonceOverflow,
    /// Created contract exceeds the code size limit.
    CreateContractSizeLimit,
    /// Created contract starts with invalid bytes (`0xEF`).
    CreateContractStartingWithEF,
    /// Initcode exceeds the EIP-3860 size limit.
    CreateInitCodeSizeLimit,
    /// Insufficient funds for a transfer.
    OutOfFunds,
    /// Exceeded the maximum call depth.
    CallTooDeep,
}

/// Out-of-gas errors, broken down by what ran out.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OutOfGasError {
    /// Basic out-of-gas.
    Basic,
    /// Tried to expand past the memory limit.
    MemoryLimit,
    /// Out of gas during memory expansion.
    Memory,
    /// An operand of an opcode exceeds the usable range.
    InvalidOperand,
}

/// Main EVM error.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EVMError<DBError> {
    /// Transaction validation error.
    Transaction(InvalidTransaction),
    /// Header validation error.
    Header(InvalidHeader),
    /// Database error.
    Database(DBError),
    /// Custom error, useful for handler extensions.
    Custom(String),
}

impl<DBError> From<InvalidTransaction> for EVMError<DBError> {
    fn from(invalid: InvalidTransaction) -> Self {
        Self::Transaction(invalid)
    }
}

impl<DBError> From<InvalidHeader> for EVMError<DBError> {
    fn from(invalid: InvalidHeader) -> Self {
        Self::Header(invalid)
    }
}

impl<DBError: core::error::Error> core::error::Error for EVMError<DBError> {}

impl<DBError: fmt::Display> fmt::Display for EVMError<DBError> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transaction(e) => write!(f, "transaction validation error: {e}"),
            Self::Header(e) => write!(f, "header validation error: {e}"),
            Self::Database(e) => write!(f, "database error: {e}"),
            Self::Custom(e) => f.write_str(e),
        }
    }
}

/// Transaction validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InvalidTransaction {
    /// When using the EIP-1559 fee model introduced in the London upgrade,
    /// transactions specify two primary fee fields: the max fee and the
    /// priority fee; the priority fee may not be larger.
    PriorityFeeGreaterThanMaxFee,
    /// EIP-1559: `gas_price` is less than `basefee`.
    GasPriceLessThanBasefee,
    /// `gas_limit` in the transaction is bigger than `block_gas_limit`.
    CallerGasLimitMoreThanBlock,
    /// The initial gas cost exceeds the transaction gas limit.
    CallGasCostMoreThanGasLimit,
    /// EIP-3607: Reject transactions from senders with deployed code.
    RejectCallerWithCode,
    /// Transaction account doesn't have enough base gas to cover the maximum
    /// fee it can pay.
    LackOfFundForMaxFee {
        /// The fee that would need to be covered.
        fee: Box<U256>,
        /// The balance of the caller.
        balance: Box<U256>,
    },
    /// Overflow in payment within the transaction.
    OverflowPaymentInTransaction,
    /// The nonce of the caller would overflow.
    NonceOverflowInTransaction,
    /// The nonce of the transaction is higher than the account's.
    NonceTooHigh {
        /// Transaction nonce.
        tx: u64,
        /// Account state nonce.
        state: u64,
    },
    /// The nonce of the transaction is lower than the account's.
    NonceTooLow {
        /// Transaction nonce.
        tx: u64,
        /// Account state nonce.
        state: u64,
    },
    /// EIP-3860: initcode size limit exceeded.
    CreateInitCodeSizeLimit,
    /// The chain id of the transaction does not match the chain configuration.
    InvalidChainId,
    /// Access lists are not supported before the Berlin hardfork.
    AccessListNotSupported,
    /// Blob versioned hashes are not supported before the Cancun hardfork.
    BlobVersionedHashesNotSupported,
    /// Block blob gas price is greater than the transaction's
    /// `max_fee_per_blob_gas`, per EIP-4844.
    BlobGasPriceGreaterThanMax,
    /// There should be at least one blob in a blob transaction, per EIP-4844.
    EmptyBlobs,
    /// Blob transactions are not allowed to be create transactions.
    BlobCreateTransaction,
    /// A blob versioned hash has an unsupported version byte.
    BlobVersionNotSupported,
    /// The transaction carries more blobs than the per-block maximum.
    TooManyBlobs {
        /// Number of blobs in the transaction.
        have: usize,
        /// Maximum number of blobs allowed.
        max: usize,
    },
}

impl core::error::Error for InvalidTransaction {}

impl fmt::Display for InvalidTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PriorityFeeGreaterThanMaxFee => {
                write!(f, "priority fee is greater than max fee")
            }
            Self::GasPriceLessThanBasefee => write!(f, "gas price is less than basefee"),
            Self::CallerGasLimitMoreThanBlock => {
                write!(f, "caller gas limit exceeds the block gas limit")
            }
            Self::CallGasCostMoreThanGasLimit => {
                write!(f, "call gas cost exceeds the gas limit")
            }
            Self::RejectCallerWithCode => {
                write!(f, "reject transactions from senders with deployed code")
            }
            Self::LackOfFundForMaxFee { fee, balance } => {
                write!(f, "lack of funds ({balance}) for max fee ({fee})")
            }
            Self::OverflowPaymentInTransaction => {
                write!(f, "overflow payment in transaction")
            }
            Self::NonceOverflowInTransaction => {
                write!(f, "nonce overflow in transaction")
            }
            Self::NonceTooHigh { tx, state } => {
                write!(f, "nonce {tx} too high, expected {state}")
            }
            Self::NonceTooLow { tx, state } => {
                write!(f, "nonce {tx} too low, expected {state}")
            }
            Self::CreateInitCodeSizeLimit => {
                write!(f, "create initcode size limit")
            }
            Self::InvalidChainId => write!(f, "invalid chain ID"),
            Self::AccessListNotSupported => write!(f, "access list not supported"),
            Self::BlobVersionedHashesNotSupported => {
                write!(f, "blob versioned hashes not supported")
            }
            Self::BlobGasPriceGreaterThanMax => {
                write!(f, "blob gas price is greater than max fee per blob gas")
            }
            Self::EmptyBlobs => write!(f, "empty blobs"),
            Self::BlobCreateTransaction => write!(f, "blob create transaction"),
            Self::BlobVersionNotSupported => write!(f, "blob version not supported"),
            Self::TooManyBlobs { have, max } => {
                write!(f, "too many blobs, have {have}, max {max}")
            }
        }
    }
}

/// Block header validation error.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InvalidHeader {
    /// `prevrandao` is not set for the Merge and above.
    PrevrandaoNotSet,
    /// `excess_blob_gas` is not set for Cancun and above.
    ExcessBlobGasNotSet,
}

impl core::error::Error for InvalidHeader {}

impl fmt::Display for InvalidHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrevrandaoNotSet => write!(f, "`prevrandao` not set"),
            Self::ExcessBlobGasNotSet => write!(f, "`excess_blob_gas` not set"),
        }
    }
}
