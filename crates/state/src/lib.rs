//! Account and storage state types shared by the journal and the databases.
#![warn(missing_docs)]

mod account_info;

pub use account_info::AccountInfo;
pub use bytecode::Bytecode;

use bitflags::bitflags;
use primitives::{Address, HashMap, SpecId, U256};

/// The in-memory state of loaded accounts, keyed by address.
pub type EvmState = HashMap<Address, Account>;

/// Structure used for EIP-1153 transient storage.
pub type TransientStorage = HashMap<(Address, U256), U256>;

/// An account's storage, keyed by slot.
pub type EvmStorage = HashMap<U256, EvmStorageSlot>;

/// The entity at an address: account info, its loaded storage slots, and the
/// per-transaction status flags.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Account {
    /// Balance, nonce, and code.
    pub info: AccountInfo,
    /// Storage cache.
    pub storage: EvmStorage,
    /// Account status flags.
    pub status: AccountStatus,
}

bitflags! {
    /// Account status flags. Mostly used by the journal.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct AccountStatus: u8 {
        /// When an account is loaded but not touched or interacted with.
        /// This is the default state.
        const Loaded = 0b00000000;
        /// When an account is newly created we will not access the database to
        /// fetch storage values.
        const Created = 0b00000001;
        /// If the account is marked for self destruction.
        const SelfDestructed = 0b00000010;
        /// Only when an account is marked as touched will it be saved to the
        /// database (EIP-161).
        const Touched = 0b00000100;
        /// Used only for pre-Spurious-Dragon hardforks, where existing and
        /// empty were two separate states.
        const LoadedAsNotExisting = 0b00001000;
        /// Cold as in regard to EIP-2929; flipped to warm on first access in a
        /// transaction.
        const Cold = 0b00100000;
    }
}

impl Account {
    /// Creates a new account marked as not existing.
    pub fn new_not_existing() -> Self {
        Self {
            info: AccountInfo::default(),
            storage: HashMap::default(),
            status: AccountStatus::LoadedAsNotExisting,
        }
    }

    /// Marks the account as self destructed.
    pub fn mark_selfdestruct(&mut self) {
        self.status |= AccountStatus::SelfDestructed;
    }

    /// Unmarks the account as self destructed.
    pub fn unmark_selfdestruct(&mut self) {
        self.status -= AccountStatus::SelfDestructed;
    }

    /// Is account marked for self destruction.
    pub fn is_selfdestructed(&self) -> bool {
        self.status.contains(AccountStatus::SelfDestructed)
    }

    /// Marks the account as touched.
    pub fn mark_touch(&mut self) {
        self.status |= AccountStatus::Touched;
    }

    /// Unmarks the touch flag.
    pub fn unmark_touch(&mut self) {
        self.status -= AccountStatus::Touched;
    }

    /// If the account status is marked as touched.
    pub fn is_touched(&self) -> bool {
        self.status.contains(AccountStatus::Touched)
    }

    /// Marks the account as newly created.
    pub fn mark_created(&mut self) {
        self.status -= AccountStatus::LoadedAsNotExisting;
        self.status |= AccountStatus::Created;
    }

    /// Unmarks the created flag.
    pub fn unmark_created(&mut self) {
        self.status -= AccountStatus::Created;
    }

    /// Is account newly created in this transaction.
    pub fn is_created(&self) -> bool {
        self.status.contains(AccountStatus::Created)
    }

    /// Marks the account as cold.
    pub fn mark_cold(&mut self) {
        self.status |= AccountStatus::Cold;
    }

    /// Marks the account as warm and returns `true` if it was previously cold.
    pub fn mark_warm(&mut self) -> bool {
        if self.status.contains(AccountStatus::Cold) {
            self.status -= AccountStatus::Cold;
            true
        } else {
            false
        }
    }

    /// Is account loaded as not existing from the database.
    pub fn is_loaded_as_not_existing(&self) -> bool {
        self.status.contains(AccountStatus::LoadedAsNotExisting)
    }

    /// Is account empty: balance zero, nonce zero, and no code.
    pub fn is_empty(&self) -> bool {
        self.info.is_empty()
    }

    /// Whether the account is considered "non existing" for the purposes of
    /// gas and touch accounting under the given spec.
    ///
    /// After EIP-161 (Spurious Dragon) an empty account is indistinguishable
    /// from a non-existing one; before it, only accounts loaded as
    /// non-existing count.
    pub fn state_clear_aware_is_empty(&self, spec: SpecId) -> bool {
        if spec.is_enabled_in(SpecId::SPURIOUS_DRAGON) {
            self.is_empty()
        } else {
            self.is_loaded_as_not_existing()
        }
    }

    /// Returns an iterator over the storage slots whose present value differs
    /// from the original.
    pub fn changed_storage_slots(&self) -> impl Iterator<Item = (&U256, &EvmStorageSlot)> {
        self.storage.iter().filter(|(_, slot)| slot.is_changed())
    }
}

impl From<AccountInfo> for Account {
    fn from(info: AccountInfo) -> Self {
        Self {
            info,
            storage: HashMap::default(),
            status: AccountStatus::Loaded,
        }
    }
}

/// A storage slot as seen inside a transaction: the value at transaction
/// start, the value after all journaled writes so far, and the EIP-2929
/// cold flag.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvmStorageSlot {
    /// Original value of the storage slot.
    pub original_value: U256,
    /// Present value of the storage slot.
    pub present_value: U256,
    /// Represents if the storage slot is cold.
    pub is_cold: bool,
}

impl EvmStorageSlot {
    /// Creates a new warm slot with `original_value == present_value`.
    pub fn new(original: U256) -> Self {
        Self {
            original_value: original,
            present_value: original,
            is_cold: false,
        }
    }

    /// Creates a new slot with distinct original and present values.
    pub fn new_changed(original_value: U256, present_value: U256) -> Self {
        Self {
            original_value,
            present_value,
            is_cold: false,
        }
    }

    /// Returns `true` if the present value differs from the original value.
    pub fn is_changed(&self) -> bool {
        self.original_value != self.present_value
    }

    /// Returns the original value of the storage slot.
    pub fn original_value(&self) -> U256 {
        self.original_value
    }

    /// Returns the present value of the storage slot.
    pub fn present_value(&self) -> U256 {
        self.present_value
    }

    /// Marks the storage slot as cold.
    pub fn mark_cold(&mut self) {
        self.is_cold = true;
    }

    /// Marks the storage slot as warm and returns `true` if it was previously
    /// cold.
    pub fn mark_warm(&mut self) -> bool {
        core::mem::replace(&mut self.is_cold, false)
    }
}
