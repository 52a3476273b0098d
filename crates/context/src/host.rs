use crate::journaled_state::JournaledState;
use database::Database;
use interpreter::{
    AccountLoad, Host, SStoreResult, SelfDestructResult, StateLoad,
};
use primitives::{Address, Bytes, Env, Log, B256, U256};

/// The concrete [`Host`]: a [`JournaledState`] composed with an execution
/// [`Env`].
///
/// Database errors are reported to the interpreter as `None`, which the
/// instructions translate to a fatal external error; the driver surfaces the
/// stored error to the caller.
#[derive(Debug)]
pub struct JournaledHost<DB: Database> {
    /// The journaled world state.
    pub journaled_state: JournaledState<DB>,
    /// Block, transaction and configuration inputs.
    pub env: Env,
    /// The first database error encountered, if any.
    pub error: Option<DB::Error>,
}

impl<DB: Database> JournaledHost<DB> {
    /// Creates a new host from the journaled state and environment.
    pub fn new(env: Env, journaled_state: JournaledState<DB>) -> Self {
        Self {
            journaled_state,
            env,
            error: None,
        }
    }

    /// Takes the stored database error, if any.
    pub fn take_error(&mut self) -> Option<DB::Error> {
        self.error.take()
    }

    /// Stores a database error and maps the result into an `Option`.
    fn track_err<T>(&mut self, result: Result<T, DB::Error>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.error = Some(err);
                None
            }
        }
    }
}

impl<DB: Database> Host for JournaledHost<DB> {
    #[inline]
    fn env(&self) -> &Env {
        &self.env
    }

    #[inline]
    fn env_mut(&mut self) -> &mut Env {
        &mut self.env
    }

    #[inline]
    fn load_account(&mut self, address: Address) -> Option<StateLoad<AccountLoad>> {
        let result = self.journaled_state.load_account_exist(address);
        self.track_err(result)
    }

    #[inline]
    fn block_hash(&mut self, number: u64) -> Option<B256> {
        let result = self.journaled_state.database.block_hash(number);
        self.track_err(result)
    }

    #[inline]
    fn balance(&mut self, address: Address) -> Option<StateLoad<U256>> {
        let result = self
            .journaled_state
            .load_account(address)
            .map(|acc| acc.map(|a| a.info.balance));
        self.track_err(result)
    }

    #[inline]
    fn code(&mut self, address: Address) -> Option<StateLoad<Bytes>> {
        let result = self.journaled_state.load_code(address).map(|acc| {
            // The code is materialized by `load_code`.
            let code = acc.data.info.code.as_ref().unwrap().original_bytes();
            StateLoad::new(code, acc.is_cold)
        });
        self.track_err(result)
    }

    #[inline]
    fn code_hash(&mut self, address: Address) -> Option<StateLoad<B256>> {
        let result = self.journaled_state.load_code(address).map(|acc| {
            // The hash of a non-existing account is zero, per EIP-1052.
            let hash = if acc.data.is_empty() {
                B256::ZERO
            } else {
                acc.data.info.code_hash
            };
            StateLoad::new(hash, acc.is_cold)
        });
        self.track_err(result)
    }

    #[inline]
    fn sload(&mut self, address: Address, index: U256) -> Option<StateLoad<U256>> {
        let result = self.journaled_state.sload(address, index);
        self.track_err(result)
    }

    #[inline]
    fn sstore(
        &mut self,
        address: Address,
        index: U256,
        value: U256,
    ) -> Option<StateLoad<SStoreResult>> {
        let result = self.journaled_state.sstore(address, index, value);
        self.track_err(result)
    }

    #[inline]
    fn tload(&mut self, address: Address, index: U256) -> U256 {
        self.journaled_state.tload(address, index)
    }

    #[inline]
    fn tstore(&mut self, address: Address, index: U256, value: U256) {
        self.journaled_state.tstore(address, index, value)
    }

    #[inline]
    fn log(&mut self, log: Log) {
        self.journaled_state.log(log)
    }

    #[inline]
    fn selfdestruct(
        &mut self,
        address: Address,
        target: Address,
    ) -> Option<StateLoad<SelfDestructResult>> {
        let result = self.journaled_state.selfdestruct(address, target);
        self.track_err(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::{CacheDB, EmptyDB};
    use primitives::SpecId;
    use state::AccountInfo;

    #[test]
    fn empty_account_code_hash_is_zero() {
        let db = CacheDB::new(EmptyDB::default());
        let mut host = JournaledHost::new(Env::default(), JournaledState::new(SpecId::LATEST, db));

        let address = Address::with_last_byte(1);
        let load = host.code_hash(address).unwrap();
        assert_eq!(load.data, B256::ZERO);
        assert!(load.is_cold);
    }

    #[test]
    fn existing_account_code_hash_is_keccak_empty() {
        let mut db = CacheDB::new(EmptyDB::default());
        let address = Address::with_last_byte(1);
        db.insert_account_info(address, AccountInfo::from_balance(U256::from(1)));
        let mut host = JournaledHost::new(Env::default(), JournaledState::new(SpecId::LATEST, db));

        let load = host.code_hash(address).unwrap();
        assert_eq!(load.data, primitives::KECCAK_EMPTY);
    }

    #[test]
    fn balance_reports_cold_then_warm() {
        let mut db = CacheDB::new(EmptyDB::default());
        let address = Address::with_last_byte(1);
        db.insert_account_info(address, AccountInfo::from_balance(U256::from(7)));
        let mut host = JournaledHost::new(Env::default(), JournaledState::new(SpecId::LATEST, db));

        let load = host.balance(address).unwrap();
        assert_eq!(load.data, U256::from(7));
        assert!(load.is_cold);
        let load = host.balance(address).unwrap();
        assert!(!load.is_cold);
    }
}
