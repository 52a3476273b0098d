//! Actions that the interpreter requests from the frame driver.

mod call_inputs;
mod call_outcome;
mod create_inputs;
mod create_outcome;

pub use call_inputs::{CallInputs, CallScheme, CallValue};
pub use call_outcome::CallOutcome;
pub use create_inputs::{CreateInputs, CreateScheme};
pub use create_outcome::CreateOutcome;

use crate::InterpreterResult;

/// The result of interpreting a frame: either a request for a sub-frame or a
/// finished execution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterpreterAction {
    /// A `CALL`, `CALLCODE`, `DELEGATECALL` or `STATICCALL` instruction was
    /// executed.
    Call {
        /// Call inputs.
        inputs: Box<CallInputs>,
    },
    /// A `CREATE` or `CREATE2` instruction was executed.
    Create {
        /// Create inputs.
        inputs: Box<CreateInputs>,
    },
    /// The interpreter finished execution.
    Return {
        /// Frame result.
        result: InterpreterResult,
    },
    /// No action: the interpreter did not finish and has nothing to report.
    #[default]
    None,
}

impl InterpreterAction {
    /// Returns `true` if the action is a call.
    pub fn is_call(&self) -> bool {
        matches!(self, InterpreterAction::Call { .. })
    }

    /// Returns `true` if the action is a create.
    pub fn is_create(&self) -> bool {
        matches!(self, InterpreterAction::Create { .. })
    }

    /// Returns `true` if the action is a return.
    pub fn is_return(&self) -> bool {
        matches!(self, InterpreterAction::Return { .. })
    }

    /// Returns `true` if the action is none.
    pub fn is_none(&self) -> bool {
        matches!(self, InterpreterAction::None)
    }

    /// Returns `true` if the action is some.
    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    /// Returns the [`InterpreterResult`] if the action is a return.
    pub fn into_result_return(self) -> Option<InterpreterResult> {
        match self {
            InterpreterAction::Return { result } => Some(result),
            _ => None,
        }
    }
}
