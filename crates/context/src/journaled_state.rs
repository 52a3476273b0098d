//! The journal of state changes internal to the EVM.
//!
//! Every mutation of the world state appends one reverse entry to a single
//! append-only arena. A call frame is represented by a pair of watermarks
//! into that arena (and into the log buffer); reverting a frame replays its
//! entries newest-first and truncates, committing simply leaves them in
//! place for an enclosing revert to find.

mod entry;

pub use entry::JournalEntry;

use bytecode::Bytecode;
use core::mem;
use database::Database;
use interpreter::{
    AccountLoad, InstructionResult, SStoreResult, SelfDestructResult, StateLoad,
};
use primitives::{Address, HashMap, HashSet, Log, SpecId, B256, KECCAK_EMPTY, U256};
use state::{Account, EvmState, EvmStorageSlot, TransientStorage};

/// Message used when an operation requires an account that the caller was
/// supposed to have loaded; hitting it is a bug in the driver, not bad input.
const LOADED: &str = "account must be loaded before the journal can operate on it";

/// The journaled state: a transactional overlay on top of a backing
/// [`Database`], supporting nested checkpoints with per-entry reversal.
#[derive(Debug)]
pub struct JournaledState<DB> {
    /// Database.
    pub database: DB,
    /// All accounts loaded or created so far, with their journaled storage.
    pub state: EvmState,
    /// Transient storage that is discarded after every transaction.
    ///
    /// See [EIP-1153](https://eips.ethereum.org/EIPS/eip-1153).
    pub transient_storage: TransientStorage,
    /// Emitted logs. A reverted frame truncates this back to its watermark.
    pub logs: Vec<Log>,
    /// The current call stack depth.
    pub depth: usize,
    /// Arena of reverse entries for the whole transaction.
    ///
    /// Checkpoints are index watermarks into this vector, so no per-frame
    /// allocation happens.
    pub journal: Vec<JournalEntry>,
    /// The spec ID for the EVM.
    ///
    /// The journal needs the spec for two of its rules:
    ///
    /// - [EIP-161]: before it, empty and non-existing accounts were distinct.
    /// - [EIP-6780]: `SELFDESTRUCT` only destroys same-transaction creations.
    ///
    /// [EIP-161]: https://eips.ethereum.org/EIPS/eip-161
    /// [EIP-6780]: https://eips.ethereum.org/EIPS/eip-6780
    pub spec: SpecId,
    /// Addresses that count as warm on their first load: precompiles, the
    /// coinbase (EIP-3651) and access-list entries.
    pub warm_preloaded_addresses: HashSet<Address>,
}

/// Output of the journal after finalizing a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalOutput {
    /// Accounts that were loaded, created or changed in the journal.
    pub state: EvmState,
    /// Logs that were emitted by contract calls.
    pub logs: Vec<Log>,
}

/// A pair of watermarks that a matching revert unwinds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JournalCheckpoint {
    /// Number of journal entries at checkpoint time.
    pub journal_i: usize,
    /// Number of emitted logs at checkpoint time.
    pub log_i: usize,
}

/// Errors of the balance-moving operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransferError {
    /// Caller does not have enough funds.
    OutOfFunds,
    /// The transfer would overflow the target's balance.
    OverflowPayment,
    /// Creation would overwrite an existing account.
    CreateCollision,
}

impl From<TransferError> for InstructionResult {
    fn from(e: TransferError) -> Self {
        match e {
            TransferError::OutOfFunds => InstructionResult::OutOfFunds,
            TransferError::OverflowPayment => InstructionResult::OverflowPayment,
            TransferError::CreateCollision => InstructionResult::CreateCollision,
        }
    }
}

impl<DB: Database> JournaledState<DB> {
    /// Creates a new journaled state over the given database.
    ///
    /// `warm_preloaded_addresses` starts empty; the driver fills it before
    /// execution.
    pub fn new(spec: SpecId, database: DB) -> Self {
        Self {
            database,
            state: HashMap::default(),
            transient_storage: TransientStorage::default(),
            logs: Vec::new(),
            depth: 0,
            journal: Vec::new(),
            spec,
            warm_preloaded_addresses: HashSet::default(),
        }
    }

    /// Sets the spec id, switching hardfork behavior mid-life.
    #[inline]
    pub fn set_spec_id(&mut self, spec: SpecId) {
        self.spec = spec;
    }

    /// Returns the current call depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the already-loaded [`Account`] for the given address.
    ///
    /// # Panics
    ///
    /// Panics if the account has not been loaded.
    #[inline]
    pub fn account(&self, address: Address) -> &Account {
        self.state.get(&address).expect(LOADED)
    }

    /// Marks the account as touched, so that it takes part in the EIP-161
    /// writeback at the end of the transaction.
    #[inline]
    pub fn touch(&mut self, address: &Address) {
        if let Some(account) = self.state.get_mut(address) {
            Self::touch_account(&mut self.journal, address, account);
        }
    }

    /// Sets the touched flag, recording a reverse entry the first time.
    #[inline]
    fn touch_account(journal: &mut Vec<JournalEntry>, address: &Address, account: &mut Account) {
        if !account.is_touched() {
            account.mark_touch();
            journal.push(JournalEntry::AccountTouched { address: *address });
        }
    }

    /// Deposits `code` with a precomputed `hash` on the account.
    ///
    /// Only ever called for accounts created in this transaction, which is
    /// what lets the `CodeChange` entry rewind to "no code".
    #[inline]
    pub fn set_code_with_hash(&mut self, address: Address, code: Bytecode, hash: B256) {
        let account = self.state.get_mut(&address).expect(LOADED);
        Self::touch_account(&mut self.journal, &address, account);

        account.info.code_hash = hash;
        account.info.code = Some(code);
        self.journal.push(JournalEntry::CodeChange { address });
    }

    /// Deposits `code` on the account, hashing it first.
    #[inline]
    pub fn set_code(&mut self, address: Address, code: Bytecode) {
        let hash = code.hash_slow();
        self.set_code_with_hash(address, code, hash)
    }

    /// Increments the nonce of the account.
    ///
    /// Returns the new nonce, or `None` without any change when the nonce
    /// sits at its ceiling.
    #[inline]
    pub fn inc_nonce(&mut self, address: Address) -> Option<u64> {
        let account = self.state.get_mut(&address).expect(LOADED);
        let incremented = account.info.nonce.checked_add(1)?;
        account.info.nonce = incremented;
        Self::touch_account(&mut self.journal, &address, account);
        self.journal.push(JournalEntry::NonceChange { address });
        Some(incremented)
    }

    /// Transfers balance between two accounts, debit first so that a
    /// self-transfer nets out.
    ///
    /// A failed transfer reports a [`TransferError`] and leaves the balances
    /// as they were; database failures surface as `Err`.
    #[inline]
    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        balance: U256,
    ) -> Result<Option<TransferError>, DB::Error> {
        self.load_account(*to)?;
        if balance.is_zero() {
            // A zero-value call still touches the target (EIP-161).
            let to_account = self.state.get_mut(to).unwrap();
            Self::touch_account(&mut self.journal, to, to_account);
            return Ok(None);
        }
        self.load_account(*from)?;

        let from_account = self.state.get_mut(from).unwrap();
        Self::touch_account(&mut self.journal, from, from_account);
        let Some(debited) = from_account.info.balance.checked_sub(balance) else {
            return Ok(Some(TransferError::OutOfFunds));
        };
        from_account.info.balance = debited;

        let to_account = self.state.get_mut(to).unwrap();
        Self::touch_account(&mut self.journal, to, to_account);
        match to_account.info.balance.checked_add(balance) {
            Some(credited) => to_account.info.balance = credited,
            None => {
                // Give the debit back; an overflowing credit must not burn
                // the funds.
                self.state.get_mut(from).unwrap().info.balance += balance;
                return Ok(Some(TransferError::OverflowPayment));
            }
        }

        self.journal.push(JournalEntry::BalanceTransfer {
            from: *from,
            to: *to,
            balance,
        });

        Ok(None)
    }

    /// Creates an account under a fresh checkpoint.
    ///
    /// Collision (spent nonce or existing code), funding and overflow are all
    /// checked up front, so a failed create returns without having opened a
    /// checkpoint or written anything. On success the created flag, the
    /// EIP-161 nonce bump and the endowment transfer all land behind the
    /// returned checkpoint and revert as one unit.
    ///
    /// # Panics
    ///
    /// Panics if the caller or the target is not loaded; the driver loads
    /// both before calling this.
    #[inline]
    pub fn create_account_checkpoint(
        &mut self,
        caller: Address,
        target_address: Address,
        balance: U256,
        spec_id: SpecId,
    ) -> Result<JournalCheckpoint, TransferError> {
        if self.state.get(&caller).expect(LOADED).info.balance < balance {
            return Err(TransferError::OutOfFunds);
        }
        let target_acc = self.state.get(&target_address).expect(LOADED);
        // Anything with code or a spent nonce cannot be created over.
        if target_acc.info.code_hash != KECCAK_EMPTY || target_acc.info.nonce != 0 {
            return Err(TransferError::CreateCollision);
        }
        let Some(endowed_balance) = target_acc.info.balance.checked_add(balance) else {
            return Err(TransferError::OverflowPayment);
        };

        // All checks passed; everything below lands behind the checkpoint.
        let checkpoint = self.checkpoint();

        let target_acc = self.state.get_mut(&target_address).unwrap();
        target_acc.mark_created();
        target_acc.info.code = None;
        if spec_id.is_enabled_in(SpecId::SPURIOUS_DRAGON) {
            // Fresh contracts start at nonce 1 since EIP-161; the
            // AccountCreated entry rewinds this too.
            target_acc.info.nonce = 1;
        }
        target_acc.info.balance = endowed_balance;
        // Touching matters even for a zero endowment: pre EIP-161 an empty
        // created account was still written back.
        Self::touch_account(&mut self.journal, &target_address, target_acc);
        self.journal.push(JournalEntry::AccountCreated {
            address: target_address,
        });

        self.state.get_mut(&caller).unwrap().info.balance -= balance;
        self.journal.push(JournalEntry::BalanceTransfer {
            from: caller,
            to: target_address,
            balance,
        });

        Ok(checkpoint)
    }

    /// Opens a new frame: bumps the depth and records the arena and log
    /// watermarks a matching revert unwinds to.
    #[inline]
    pub fn checkpoint(&mut self) -> JournalCheckpoint {
        self.depth += 1;
        JournalCheckpoint {
            journal_i: self.journal.len(),
            log_i: self.logs.len(),
        }
    }

    /// Commits the current frame.
    ///
    /// Its entries stay in the arena, so an enclosing revert can still undo
    /// them.
    #[inline]
    pub fn checkpoint_commit(&mut self) {
        self.depth -= 1;
    }

    /// Reverts everything recorded since the checkpoint, newest first, and
    /// drops the logs emitted since.
    #[inline]
    pub fn checkpoint_revert(&mut self, checkpoint: JournalCheckpoint) {
        let is_spurious_dragon_enabled = self.spec.is_enabled_in(SpecId::SPURIOUS_DRAGON);
        self.depth -= 1;
        self.logs.truncate(checkpoint.log_i);

        let state = &mut self.state;
        let transient_storage = &mut self.transient_storage;
        self.journal
            .drain(checkpoint.journal_i..)
            .rev()
            .for_each(|journal_entry| {
                journal_entry.revert(state, transient_storage, is_spurious_dragon_enabled)
            });
    }

    /// Performs a selfdestruct: moves the balance of `address` to `target`
    /// and, when the destruction rules apply, marks `address` destroyed.
    ///
    /// From Cancun on (EIP-6780) only accounts created in this transaction
    /// are destroyed; others merely forward their balance, and a self-target
    /// keeps it.
    #[inline]
    pub fn selfdestruct(
        &mut self,
        address: Address,
        target: Address,
    ) -> Result<StateLoad<SelfDestructResult>, DB::Error> {
        let spec = self.spec;
        let target_load = self.load_account(target)?;
        let is_cold = target_load.is_cold;
        let target_exists = !target_load.data.state_clear_aware_is_empty(spec);

        let balance = self.state.get(&address).expect(LOADED).info.balance;
        if target != address {
            let target_acc = self.state.get_mut(&target).unwrap();
            target_acc.info.balance += balance;
            Self::touch_account(&mut self.journal, &target, target_acc);
        }

        let destroyed = self.state.get_mut(&address).expect(LOADED);
        let previously_destroyed = destroyed.is_selfdestructed();

        if destroyed.is_created() || !spec.is_enabled_in(SpecId::CANCUN) {
            destroyed.mark_selfdestruct();
            destroyed.info.balance = U256::ZERO;
            self.journal.push(JournalEntry::AccountDestroyed {
                address,
                target,
                was_destroyed: previously_destroyed,
                had_balance: balance,
            });
        } else if target != address {
            destroyed.info.balance = U256::ZERO;
            self.journal.push(JournalEntry::BalanceTransfer {
                from: address,
                to: target,
                balance,
            });
        }
        // Otherwise (post-Cancun, pre-existing account, self target) nothing
        // changes and the balance stays where it is.

        Ok(StateLoad::new(
            SelfDestructResult {
                had_value: !balance.is_zero(),
                target_exists,
                previously_destroyed,
            },
            is_cold,
        ))
    }

    /// Loads an account and its listed storage slots without journaling
    /// anything; used for access-list prewarming before execution starts.
    #[inline]
    pub fn initial_account_load(
        &mut self,
        address: Address,
        storage_keys: impl IntoIterator<Item = U256>,
    ) -> Result<&mut Account, DB::Error> {
        if !self.state.contains_key(&address) {
            let account = match self.database.basic(address)? {
                Some(info) => Account::from(info),
                None => Account::new_not_existing(),
            };
            self.state.insert(address, account);
        }
        for key in storage_keys {
            if !self.state.get(&address).unwrap().storage.contains_key(&key) {
                let value = self.database.storage(address, key)?;
                self.state
                    .get_mut(&address)
                    .unwrap()
                    .storage
                    .insert(key, EvmStorageSlot::new(value));
            }
        }
        Ok(self.state.get_mut(&address).unwrap())
    }

    /// Loads an account into the state, reporting whether this was the first
    /// (cold) access of the transaction.
    ///
    /// Accounts the database does not know are still returned, flagged as
    /// not existing.
    #[inline]
    pub fn load_account(&mut self, address: Address) -> Result<StateLoad<&mut Account>, DB::Error> {
        self.load_account_optional(address, false)
    }

    /// Loads an account and reports whether it counts as empty for the
    /// new-account gas accounting of the `CALL` family.
    #[inline]
    pub fn load_account_exist(
        &mut self,
        address: Address,
    ) -> Result<StateLoad<AccountLoad>, DB::Error> {
        let spec = self.spec;
        let account = self.load_account(address)?;
        let is_empty = account.data.state_clear_aware_is_empty(spec);
        let is_cold = account.is_cold;
        Ok(StateLoad::new(AccountLoad { is_empty }, is_cold))
    }

    /// Like [`Self::load_account`], but also materialises the account code
    /// through [`Database::code_by_hash`] when it is not already present.
    #[inline]
    pub fn load_code(&mut self, address: Address) -> Result<StateLoad<&mut Account>, DB::Error> {
        self.load_account_optional(address, true)
    }

    /// Loads an account, optionally materialising its code.
    #[inline]
    pub fn load_account_optional(
        &mut self,
        address: Address,
        load_code: bool,
    ) -> Result<StateLoad<&mut Account>, DB::Error> {
        let is_cold = if self.state.contains_key(&address) {
            self.state.get_mut(&address).unwrap().mark_warm()
        } else {
            let account = match self.database.basic(address)? {
                Some(info) => Account::from(info),
                None => Account::new_not_existing(),
            };
            self.state.insert(address, account);
            // A fresh state entry is warm from here on; the preload set
            // decides whether even this first touch was already warm.
            !self.warm_preloaded_addresses.contains(&address)
        };
        if is_cold {
            self.journal.push(JournalEntry::AccountWarmed { address });
        }

        let account = self.state.get_mut(&address).unwrap();
        if load_code && account.info.code.is_none() {
            let code = if account.info.code_hash == KECCAK_EMPTY {
                Bytecode::default()
            } else {
                self.database.code_by_hash(account.info.code_hash)?
            };
            account.info.code = Some(code);
        }

        Ok(StateLoad::new(account, is_cold))
    }

    /// Loads a storage slot, reporting whether this was the first (cold)
    /// access of the transaction.
    ///
    /// # Panics
    ///
    /// Panics if the account is not present in the state; the owning frame
    /// loaded it.
    #[inline]
    pub fn sload(&mut self, address: Address, key: U256) -> Result<StateLoad<U256>, DB::Error> {
        let account = self.state.get_mut(&address).expect(LOADED);

        // Hot path: the slot was already loaded in this transaction.
        if let Some(slot) = account.storage.get_mut(&key) {
            let is_cold = slot.mark_warm();
            let value = slot.present_value;
            if is_cold {
                self.journal.push(JournalEntry::StorageWarmed { address, key });
            }
            return Ok(StateLoad::new(value, is_cold));
        }

        // First access: fetch from the database, except for accounts created
        // in this transaction, whose storage is known to be empty.
        let value = if account.is_created() {
            U256::ZERO
        } else {
            self.database.storage(address, key)?
        };
        self.state
            .get_mut(&address)
            .unwrap()
            .storage
            .insert(key, EvmStorageSlot::new(value));
        self.journal.push(JournalEntry::StorageWarmed { address, key });

        Ok(StateLoad::new(value, true))
    }

    /// Writes a storage slot, returning the (original, present, new) triple
    /// the gas and refund rules price on.
    ///
    /// **Note**: The account must already be present in the state.
    #[inline]
    pub fn sstore(
        &mut self,
        address: Address,
        key: U256,
        new: U256,
    ) -> Result<StateLoad<SStoreResult>, DB::Error> {
        // Warm the slot and pick up the value this write replaces.
        let present = self.sload(address, key)?;
        let slot = self
            .state
            .get_mut(&address)
            .expect(LOADED)
            .storage
            .get_mut(&key)
            .expect("slot was inserted by sload");

        let original_value = slot.original_value;
        if new != present.data {
            slot.present_value = new;
            self.journal.push(JournalEntry::StorageChanged {
                address,
                key,
                had_value: present.data,
            });
        }

        Ok(StateLoad::new(
            SStoreResult {
                original_value,
                present_value: present.data,
                new_value: new,
            },
            present.is_cold,
        ))
    }

    /// Reads an EIP-1153 transient storage slot.
    #[inline]
    pub fn tload(&mut self, address: Address, key: U256) -> U256 {
        self.transient_storage
            .get(&(address, key))
            .copied()
            .unwrap_or_default()
    }

    /// Writes an EIP-1153 transient storage slot, journaling the value it
    /// replaces.
    #[inline]
    pub fn tstore(&mut self, address: Address, key: U256, new: U256) {
        let slot_key = (address, key);
        // Zero writes clear the slot instead of storing a zero.
        let had_value = if new.is_zero() {
            self.transient_storage.remove(&slot_key)
        } else {
            self.transient_storage.insert(slot_key, new)
        }
        .unwrap_or_default();

        if had_value != new {
            self.journal.push(JournalEntry::TransientStorageChange {
                address,
                key,
                had_value,
            });
        }
    }

    /// Appends a log.
    ///
    /// Logs have no reverse entry; a reverting frame truncates the buffer to
    /// its watermark instead.
    #[inline]
    pub fn log(&mut self, log: Log) {
        self.logs.push(log);
    }

    /// Finalizes the transaction: hands out the state and logs and resets
    /// everything else for the next transaction.
    pub fn finalize(&mut self) -> JournalOutput {
        let state = mem::take(&mut self.state);
        let logs = mem::take(&mut self.logs);
        self.transient_storage.clear();
        self.journal.clear();
        self.depth = 0;
        self.warm_preloaded_addresses.clear();

        JournalOutput { state, logs }
    }
}
