//! corevm - an EVM execution core.
//!
//! The crate wires together the bytecode interpreter, the journaled state and
//! the host surface into a transaction driver, [`Evm`], that owns the
//! depth-first call tree of a transaction.
#![warn(missing_docs)]

mod evm;
mod frame;

pub use evm::Evm;
pub use frame::{Frame, FrameData, FrameOrResult, FrameResult};

// Re-export of the component crates.
pub use bytecode;
pub use context;
pub use database;
pub use interpreter;
pub use primitives;
pub use state;

pub use context::{JournaledHost, JournaledState};
pub use database::{CacheDB, Database, DatabaseCommit, DatabaseRef, EmptyDB, InMemoryDB};
pub use interpreter::{Contract, Gas, InstructionResult, Interpreter, InterpreterAction};
pub use primitives::{Env, ExecutionResult, Output, ResultAndState, SpecId};
