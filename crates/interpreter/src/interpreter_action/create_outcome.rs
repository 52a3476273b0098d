use crate::{Gas, InstructionResult, InterpreterResult};
use primitives::{Address, Bytes};

/// What a finished sub-create hands back to its parent: the frame result
/// plus the address the create derived, when a frame actually ran.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreateOutcome {
    /// The result of the interpreter operation.
    pub result: InterpreterResult,
    /// An optional address associated with the create operation.
    pub address: Option<Address>,
}

impl CreateOutcome {
    /// Constructs a new [`CreateOutcome`].
    pub fn new(result: InterpreterResult, address: Option<Address>) -> Self {
        Self { result, address }
    }

    /// Returns a reference to the instruction result.
    pub fn instruction_result(&self) -> &InstructionResult {
        &self.result.result
    }

    /// Returns a reference to the output bytes.
    pub fn output(&self) -> &Bytes {
        &self.result.output
    }

    /// Returns the gas usage information.
    pub fn gas(&self) -> Gas {
        self.result.gas
    }
}
