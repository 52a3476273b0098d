//! The EVM bytecode interpreter: a stack machine with a program counter, an
//! evaluation stack of 256-bit words, an expandable memory buffer, and a gas
//! tracker, dispatching on opcode through a 256-entry instruction table.

pub mod gas;
mod host;
mod instruction_result;
pub mod instructions;
pub mod interpreter;
pub mod interpreter_action;
pub mod table;

pub use gas::Gas;
pub use host::{AccountLoad, DummyHost, Host, SStoreResult, SelfDestructResult, StateLoad};
pub use instruction_result::{InstructionResult, SuccessOrHalt};
pub use interpreter::{
    num_words, resize_memory, Contract, Interpreter, InterpreterResult, SharedMemory, Stack,
    STACK_LIMIT,
};
pub use interpreter_action::{
    CallInputs, CallOutcome, CallScheme, CallValue, CreateInputs, CreateOutcome, CreateScheme,
    InterpreterAction,
};
pub use table::{make_instruction_table, Instruction, InstructionTable};

/// Maximum call stack depth (EIP-150).
pub use primitives::CALL_STACK_LIMIT;
