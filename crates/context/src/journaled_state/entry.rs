//! Reverse entries recorded by the journal.

use primitives::{Address, KECCAK_EMPTY, PRECOMPILE3, U256};
use state::{Account, EvmState, TransientStorage};

/// A single reversible state change.
///
/// Each variant stores exactly what is needed to undo one mutation; reverting
/// a checkpoint replays the entries above its watermark newest-first.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JournalEntry {
    /// An account was accessed for the first time in this transaction
    /// (EIP-2929); undoing makes it cold again.
    AccountWarmed {
        /// Accessed account.
        address: Address,
    },
    /// An account became relevant for the EIP-161 writeback; undoing clears
    /// the touched flag.
    AccountTouched {
        /// Touched account.
        address: Address,
    },
    /// An account was created; undoing clears the created flag and resets
    /// the nonce, while the balance and touch entries recorded alongside
    /// rewind on their own.
    AccountCreated {
        /// Created account.
        address: Address,
    },
    /// An account was destroyed and its balance moved to `target`; undoing
    /// restores the prior destroyed flag and moves the balance back.
    AccountDestroyed {
        /// Destroyed account.
        address: Address,
        /// Recipient of the balance.
        target: Address,
        /// Destroyed flag before this destruction.
        was_destroyed: bool,
        /// Balance the account held before the destruction.
        had_balance: U256,
    },
    /// Value moved between two accounts; undoing moves it back.
    BalanceTransfer {
        /// Sender.
        from: Address,
        /// Recipient.
        to: Address,
        /// Amount moved.
        balance: U256,
    },
    /// A nonce was incremented; undoing decrements it.
    NonceChange {
        /// Account whose nonce moved.
        address: Address,
    },
    /// A storage slot was accessed for the first time in this transaction
    /// (EIP-2929); undoing makes the slot cold again.
    StorageWarmed {
        /// Account owning the slot.
        address: Address,
        /// Slot key.
        key: U256,
    },
    /// A storage slot took a new present value; undoing restores the value
    /// it replaced.
    StorageChanged {
        /// Account owning the slot.
        address: Address,
        /// Slot key.
        key: U256,
        /// Value the write replaced.
        had_value: U256,
    },
    /// An EIP-1153 transient slot changed; undoing restores (or clears) the
    /// previous value.
    TransientStorageChange {
        /// Account owning the slot.
        address: Address,
        /// Slot key.
        key: U256,
        /// Value the write replaced; zero means the slot was unset.
        had_value: U256,
    },
    /// Code was deposited on an account. Deposits only ever land on accounts
    /// created in this transaction, so undoing restores "no code".
    CodeChange {
        /// Account that received code.
        address: Address,
    },
}

/// Looks up an account that a journal entry refers to.
///
/// Entries are only written for accounts that are in the state at that
/// moment, and nothing removes accounts mid-transaction, so a miss here is a
/// journal bug rather than bad input.
fn account<'a>(state: &'a mut EvmState, address: &Address) -> &'a mut Account {
    state
        .get_mut(address)
        .expect("journaled account stays loaded for the whole transaction")
}

impl JournalEntry {
    /// Undoes the state change this entry recorded.
    pub(crate) fn revert(
        self,
        state: &mut EvmState,
        transient_storage: &mut TransientStorage,
        is_spurious_dragon_enabled: bool,
    ) {
        match self {
            Self::AccountWarmed { address } => {
                account(state, &address).mark_cold();
            }
            Self::AccountTouched { address } => {
                // Consensus quirk: ripple-carried from a mainnet incident at
                // block 2675119, precompile 3 keeps its touched flag under
                // the state-clear rules (see EIP issue #716).
                if is_spurious_dragon_enabled && address == PRECOMPILE3 {
                    return;
                }
                account(state, &address).unmark_touch();
            }
            Self::AccountCreated { address } => {
                let created = account(state, &address);
                created.unmark_created();
                // Creation requires a zero nonce, so zero is what we go
                // back to.
                created.info.nonce = 0;
            }
            Self::AccountDestroyed {
                address,
                target,
                was_destroyed,
                had_balance,
            } => {
                if address != target {
                    account(state, &target).info.balance -= had_balance;
                }
                let destroyed = account(state, &address);
                destroyed.info.balance += had_balance;
                // A single transaction may destroy the same account twice;
                // only the first destruction flips the flag back.
                if !was_destroyed {
                    destroyed.unmark_selfdestruct();
                }
            }
            Self::BalanceTransfer { from, to, balance } => {
                // Both ends were range-checked when the transfer happened.
                account(state, &to).info.balance -= balance;
                account(state, &from).info.balance += balance;
            }
            Self::NonceChange { address } => {
                account(state, &address).info.nonce -= 1;
            }
            Self::StorageWarmed { address, key } => {
                account(state, &address)
                    .storage
                    .get_mut(&key)
                    .expect("journaled slot stays loaded for the whole transaction")
                    .mark_cold();
            }
            Self::StorageChanged {
                address,
                key,
                had_value,
            } => {
                account(state, &address)
                    .storage
                    .get_mut(&key)
                    .expect("journaled slot stays loaded for the whole transaction")
                    .present_value = had_value;
            }
            Self::TransientStorageChange {
                address,
                key,
                had_value,
            } => {
                if had_value.is_zero() {
                    transient_storage.remove(&(address, key));
                } else {
                    transient_storage.insert((address, key), had_value);
                }
            }
            Self::CodeChange { address } => {
                let changed = account(state, &address);
                changed.info.code_hash = KECCAK_EMPTY;
                changed.info.code = None;
            }
        }
    }
}
