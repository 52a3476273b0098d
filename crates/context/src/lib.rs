//! The transactional overlay of the EVM: journaled state with nested
//! checkpoints, and the [`JournaledHost`] the interpreter runs against.
#![warn(missing_docs)]

mod host;
pub mod journaled_state;

pub use host::JournaledHost;
pub use journaled_state::{
    JournalCheckpoint, JournalEntry, JournaledState, JournalOutput, TransferError,
};
