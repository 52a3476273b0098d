use primitives::{HaltReason, OutOfGasError, SuccessReason};

/// Result of an instruction, doubling as the interpreter's status label.
///
/// `Continue` is the running state; every other variant terminates the frame.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InstructionResult {
    /// Execution should continue with the next instruction.
    #[default]
    Continue = 0,
    /// Encountered a `STOP` opcode.
    Stop,
    /// Return from the current frame.
    Return,
    /// Self-destructed the current contract.
    SelfDestruct,
    /// A call or create action was filled; the driver takes over.
    CallOrCreate,

    // Revert codes
    /// Revert the frame.
    Revert = 0x10,
    /// Exceeded the maximum call depth.
    CallTooDeep,
    /// Insufficient funds for a transfer.
    OutOfFunds,

    // Error codes
    /// Out of gas.
    OutOfGas = 0x50,
    /// Out of gas during memory expansion.
    MemoryOOG,
    /// The memory limit of the interpreter has been exceeded.
    MemoryLimitOOG,
    /// An operand of an opcode exceeds the usable range.
    InvalidOperandOOG,
    /// Unknown or invalid opcode.
    OpcodeNotFound,
    /// Invalid `CALL` with value transfer in a static context.
    CallNotAllowedInsideStatic,
    /// Invalid state modification in a static context.
    StateChangeDuringStaticCall,
    /// The designated `INVALID` (0xFE) opcode was executed.
    InvalidFEOpcode,
    /// A jump landed on a byte that is not a `JUMPDEST`.
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
    /// Fatal external error, returned by the database.
    FatalExternalError,
}

/// Matches every "ok" [`InstructionResult`].
#[macro_export]
macro_rules! return_ok {
    () => {
        $crate::InstructionResult::Stop
            | $crate::InstructionResult::Return
            | $crate::InstructionResult::SelfDestruct
    };
}

/// Matches every "revert" [`InstructionResult`].
#[macro_export]
macro_rules! return_revert {
    () => {
        $crate::InstructionResult::Revert
            | $crate::InstructionResult::CallTooDeep
            | $crate::InstructionResult::OutOfFunds
    };
}

/// Matches every "error" [`InstructionResult`].
#[macro_export]
macro_rules! return_error {
    () => {
        $crate::InstructionResult::OutOfGas
            | $crate::InstructionResult::MemoryOOG
            | $crate::InstructionResult::MemoryLimitOOG
            | $crate::InstructionResult::InvalidOperandOOG
            | $crate::InstructionResult::OpcodeNotFound
            | $crate::InstructionResult::CallNotAllowedInsideStatic
            | $crate::InstructionResult::StateChangeDuringStaticCall
            | $crate::InstructionResult::InvalidFEOpcode
            | $crate::InstructionResult::InvalidJump
            | $crate::InstructionResult::NotActivated
            | $crate::InstructionResult::StackUnderflow
            | $crate::InstructionResult::StackOverflow
            | $crate::InstructionResult::OutOfOffset
            | $crate::InstructionResult::CreateCollision
            | $crate::InstructionResult::OverflowPayment
            | $crate::InstructionResult::NonceOverflow
            | $crate::InstructionResult::CreateContractSizeLimit
            | $crate::InstructionResult::CreateContractStartingWithEF
            | $crate::InstructionResult::CreateInitCodeSizeLimit
            | $crate::InstructionResult::FatalExternalError
    };
}

impl InstructionResult {
    /// Returns whether the result is a success.
    #[inline]
    pub const fn is_ok(self) -> bool {
        matches!(self, crate::return_ok!())
    }

    /// Returns whether the result is a revert.
    #[inline]
    pub const fn is_revert(self) -> bool {
        matches!(self, crate::return_revert!())
    }

    /// Returns whether the result is an error.
    #[inline]
    pub const fn is_error(self) -> bool {
        matches!(self, crate::return_error!())
    }
}

/// Classified [`InstructionResult`] as seen by the transaction driver.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SuccessOrHalt {
    /// The transaction returned successfully.
    Success(SuccessReason),
    /// The transaction reverted.
    Revert,
    /// The transaction halted, consuming all gas.
    Halt(HaltReason),
    /// Fatal external error.
    FatalExternalError,
    /// The result is internal and must never reach the driver.
    Internal(InstructionResult),
}

impl SuccessOrHalt {
    /// Returns true if the transaction returned successfully without halts.
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, SuccessOrHalt::Success(_))
    }

    /// Returns the [`SuccessReason`] value if this is a successful result.
    #[inline]
    pub fn to_success(self) -> Option<SuccessReason> {
        match self {
            SuccessOrHalt::Success(reason) => Some(reason),
            _ => None,
        }
    }

    /// Returns true if the transaction reverted.
    #[inline]
    pub fn is_revert(self) -> bool {
        matches!(self, SuccessOrHalt::Revert)
    }

    /// Returns the [`HaltReason`] if the EVM has experienced an exceptional
    /// halt.
    #[inline]
    pub fn to_halt(self) -> Option<HaltReason> {
        match self {
            SuccessOrHalt::Halt(reason) => Some(reason),
            _ => None,
        }
    }
}

impl From<InstructionResult> for SuccessOrHalt {
    fn from(result: InstructionResult) -> Self {
        match result {
            InstructionResult::Continue | InstructionResult::CallOrCreate => {
                Self::Internal(result)
            }
            InstructionResult::Stop => Self::Success(SuccessReason::Stop),
            InstructionResult::Return => Self::Success(SuccessReason::Return),
            InstructionResult::SelfDestruct => Self::Success(SuccessReason::SelfDestruct),
            InstructionResult::Revert => Self::Revert,
            // not gonna happen for the first call
            InstructionResult::CallTooDeep => Self::Halt(HaltReason::CallTooDeep),
            // check for the first call is done separately
            InstructionResult::OutOfFunds => Self::Halt(HaltReason::OutOfFunds),
            InstructionResult::OutOfGas => Self::Halt(HaltReason::OutOfGas(OutOfGasError::Basic)),
            InstructionResult::MemoryOOG => Self::Halt(HaltReason::OutOfGas(OutOfGasError::Memory)),
            InstructionResult::MemoryLimitOOG => {
                Self::Halt(HaltReason::OutOfGas(OutOfGasError::MemoryLimit))
            }
            InstructionResult::InvalidOperandOOG => {
                Self::Halt(HaltReason::OutOfGas(OutOfGasError::InvalidOperand))
            }
            InstructionResult::OpcodeNotFound => Self::Halt(HaltReason::OpcodeNotFound),
            InstructionResult::CallNotAllowedInsideStatic => {
                Self::Halt(HaltReason::CallNotAllowedInsideStatic)
            }
            InstructionResult::StateChangeDuringStaticCall => {
                Self::Halt(HaltReason::StateChangeDuringStaticCall)
            }
            InstructionResult::InvalidFEOpcode => Self::Halt(HaltReason::InvalidFEOpcode),
            InstructionResult::InvalidJump => Self::Halt(HaltReason::InvalidJump),
            InstructionResult::NotActivated => Self::Halt(HaltReason::NotActivated),
            InstructionResult::StackUnderflow => Self::Halt(HaltReason::StackUnderflow),
            InstructionResult::StackOverflow => Self::Halt(HaltReason::StackOverflow),
            InstructionResult::OutOfOffset => Self::Halt(HaltReason::OutOfOffset),
            InstructionResult::CreateCollision => Self::Halt(HaltReason::CreateCollision),
            InstructionResult::OverflowPayment => Self::Halt(HaltReason::OverflowPayment),
            InstructionResult::NonceOverflow => Self::Halt(HaltReason::NonceOverflow),
            InstructionResult::CreateContractSizeLimit => {
                Self::Halt(HaltReason::CreateContractSizeLimit)
            }
            InstructionResult::CreateContractStartingWithEF => {
                Self::Halt(HaltReason::CreateContractStartingWithEF)
            }
            InstructionResult::CreateInitCodeSizeLimit => {
                Self::Halt(HaltReason::CreateInitCodeSizeLimit)
            }
            InstructionResult::FatalExternalError => Self::FatalExternalError,
        }
    }
}
