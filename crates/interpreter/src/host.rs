//! The narrow capability surface the interpreter consumes to touch world
//! state.

mod dummy;
pub use dummy::DummyHost;

use core::ops::{Deref, DerefMut};
use primitives::{Address, Bytes, Env, Log, B256, U256};

/// EVM context host.
///
/// The concrete implementation wraps the journaled state and the execution
/// environment; a failing database surfaces as `None`, which the instructions
/// translate to [`InstructionResult::FatalExternalError`](crate::InstructionResult::FatalExternalError).
pub trait Host {
    /// Returns a reference to the environment.
    fn env(&self) -> &Env;

    /// Returns a mutable reference to the environment.
    fn env_mut(&mut self) -> &mut Env;

    /// Loads an account, returning whether it is cold and whether it counts as
    /// empty for new-account gas accounting.
    fn load_account(&mut self, address: Address) -> Option<StateLoad<AccountLoad>>;

    /// Gets the block hash of the given block `number`.
    fn block_hash(&mut self, number: u64) -> Option<B256>;

    /// Gets the balance of `address` and if the account is cold.
    fn balance(&mut self, address: Address) -> Option<StateLoad<U256>>;

    /// Gets the code of `address` and if the account is cold.
    fn code(&mut self, address: Address) -> Option<StateLoad<Bytes>>;

    /// Gets the code hash of `address` and if the account is cold.
    fn code_hash(&mut self, address: Address) -> Option<StateLoad<B256>>;

    /// Gets the storage value of `address` at `index` and if the slot is cold.
    fn sload(&mut self, address: Address, index: U256) -> Option<StateLoad<U256>>;

    /// Sets the storage value of account `address` at `index`.
    ///
    /// Returns [`StateLoad`] with [`SStoreResult`] that contains the
    /// original/present/new storage values.
    fn sstore(
        &mut self,
        address: Address,
        index: U256,
        value: U256,
    ) -> Option<StateLoad<SStoreResult>>;

    /// Gets the transient storage value of `address` at `index`.
    fn tload(&mut self, address: Address, index: U256) -> U256;

    /// Sets the transient storage value of `address` at `index`.
    fn tstore(&mut self, address: Address, index: U256, value: U256);

    /// Emits a log owned by `address` with the given `LogData`.
    fn log(&mut self, log: Log);

    /// Marks `address` to be deleted, with funds transferred to `target`.
    fn selfdestruct(
        &mut self,
        address: Address,
        target: Address,
    ) -> Option<StateLoad<SelfDestructResult>>;
}

/// A loaded state element together with its EIP-2929 cold flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateLoad<T> {
    /// Returned data.
    pub data: T,
    /// Is the load cold (first access in this transaction).
    pub is_cold: bool,
}

impl<T> Deref for StateLoad<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T> DerefMut for StateLoad<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl<T> StateLoad<T> {
    /// Returns a new [`StateLoad`] with the given data and cold load status.
    pub fn new(data: T, is_cold: bool) -> Self {
        Self { data, is_cold }
    }

    /// Maps the data of the [`StateLoad`], preserving the cold load status.
    pub fn map<B, F>(self, f: F) -> StateLoad<B>
    where
        F: FnOnce(T) -> B,
    {
        StateLoad::new(f(self.data), self.is_cold)
    }
}

/// Account load result for `CALL`-family gas accounting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccountLoad {
    /// Whether the account counts as empty under the active spec, which
    /// triggers the new-account surcharge on value-bearing calls.
    pub is_empty: bool,
}

/// Represents the result of an `sstore` operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SStoreResult {
    /// Value of the storage slot when it was first read in the transaction.
    pub original_value: U256,
    /// Value of the storage slot before this write.
    pub present_value: U256,
    /// New value that is set.
    pub new_value: U256,
}

/// Result of a selfdestruct action.
///
/// The returned values are needed to calculate the gas spent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelfDestructResult {
    /// Whether the destroyed account had any balance.
    pub had_value: bool,
    /// Whether the target account exists.
    pub target_exists: bool,
    /// Whether the account was already destroyed in this transaction.
    pub previously_destroyed: bool,
}
