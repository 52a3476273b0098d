//! Call frames of the transaction driver.

use context::JournalCheckpoint;
use core::ops::Range;
use interpreter::{CallOutcome, CreateOutcome, Gas, Interpreter, InterpreterResult};
use primitives::Address;

/// One call's interpreter state; parent frames are suspended while a child
/// runs.
#[derive(Debug)]
pub struct Frame {
    /// Data specific to the frame kind.
    pub frame_data: FrameData,
    /// Journal checkpoint, reverted when the frame fails.
    pub checkpoint: JournalCheckpoint,
    /// The interpreter of the frame.
    pub interpreter: Interpreter,
}

/// Per-kind data of a [`Frame`].
#[derive(Debug)]
pub enum FrameData {
    /// A call frame.
    Call {
        /// The memory window of the caller that the output is written into.
        return_memory_range: Range<usize>,
    },
    /// A create frame.
    Create {
        /// The address that will be created.
        created_address: Address,
    },
}

/// The result of a frame that did not need to run (or that finished),
/// carrying what the parent needs to resume.
#[derive(Debug)]
pub enum FrameResult {
    /// A finished call.
    Call(CallOutcome),
    /// A finished create.
    Create(CreateOutcome),
}

impl FrameResult {
    /// Returns the interpreter result of the frame.
    pub fn interpreter_result(&self) -> &InterpreterResult {
        match self {
            Self::Call(outcome) => &outcome.result,
            Self::Create(outcome) => &outcome.result,
        }
    }

    /// Returns the gas state of the frame.
    pub fn gas(&self) -> Gas {
        self.interpreter_result().gas
    }

    /// Returns the created address, if this is a successful create.
    pub fn created_address(&self) -> Option<Address> {
        match self {
            Self::Call(_) => None,
            Self::Create(outcome) => outcome.address,
        }
    }

    /// Consumes the frame result, returning the interpreter result.
    pub fn into_interpreter_result(self) -> InterpreterResult {
        match self {
            Self::Call(outcome) => outcome.result,
            Self::Create(outcome) => outcome.result,
        }
    }
}

/// Either a new frame to run, or the immediate result of a frame that could
/// not start.
#[derive(Debug)]
pub enum FrameOrResult {
    /// A frame to push and run.
    Frame(Frame),
    /// The frame finished before running (depth cap, transfer failure, empty
    /// callee, create collision).
    Result(FrameResult),
}

impl FrameOrResult {
    /// Creates a new call frame.
    pub fn new_call_frame(
        return_memory_range: Range<usize>,
        checkpoint: JournalCheckpoint,
        interpreter: Interpreter,
    ) -> Self {
        Self::Frame(Frame {
            frame_data: FrameData::Call {
                return_memory_range,
            },
            checkpoint,
            interpreter,
        })
    }

    /// Creates a new create frame.
    pub fn new_create_frame(
        created_address: Address,
        checkpoint: JournalCheckpoint,
        interpreter: Interpreter,
    ) -> Self {
        Self::Frame(Frame {
            frame_data: FrameData::Create { created_address },
            checkpoint,
            interpreter,
        })
    }

    /// Creates an immediate call result.
    pub fn new_call_result(
        result: InterpreterResult,
        return_memory_offset: Range<usize>,
    ) -> Self {
        Self::Result(FrameResult::Call(CallOutcome::new(
            result,
            return_memory_offset,
        )))
    }

    /// Creates an immediate create result.
    pub fn new_create_result(result: InterpreterResult, address: Option<Address>) -> Self {
        Self::Result(FrameResult::Create(CreateOutcome::new(result, address)))
    }
}
