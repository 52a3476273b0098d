use bytecode::Bytecode;
use primitives::{B256, KECCAK_EMPTY, U256};

/// Account information: balance, nonce, and code.
#[derive(Clone, Debug, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccountInfo {
    /// Account balance.
    pub balance: U256,
    /// Account nonce.
    pub nonce: u64,
    /// Code hash.
    pub code_hash: B256,
    /// Code. If `None`, the code will be fetched through
    /// `Database::code_by_hash` when it is needed.
    pub code: Option<Bytecode>,
}

impl Default for AccountInfo {
    fn default() -> Self {
        Self {
            balance: U256::ZERO,
            nonce: 0,
            code_hash: KECCAK_EMPTY,
            code: Some(Bytecode::default()),
        }
    }
}

impl PartialEq for AccountInfo {
    fn eq(&self, other: &Self) -> bool {
        self.balance == other.balance
            && self.nonce == other.nonce
            && self.code_hash == other.code_hash
    }
}

impl AccountInfo {
    /// Creates new account info with the given fields. The code hash is
    /// computed from the code.
    pub fn new(balance: U256, nonce: u64, code: Bytecode) -> Self {
        let code_hash = code.hash_slow();
        Self {
            balance,
            nonce,
            code: Some(code),
            code_hash,
        }
    }

    /// Returns account info without the code, keeping only the hash.
    pub fn without_code(mut self) -> Self {
        self.take_bytecode();
        self
    }

    /// An account is empty if its balance is zero, nonce is zero, and the code
    /// hash is the Keccak-256 of the empty string (EIP-161).
    pub fn is_empty(&self) -> bool {
        let code_empty = self.is_empty_code_hash() || self.code_hash.is_zero();
        code_empty && self.balance.is_zero() && self.nonce == 0
    }

    /// Returns `true` if the account is not empty.
    pub fn exists(&self) -> bool {
        !self.is_empty()
    }

    /// Returns `true` if the account has no nonce and no code.
    pub fn has_no_code_and_nonce(&self) -> bool {
        self.is_empty_code_hash() && self.nonce == 0
    }

    /// Returns `true` if the code hash is the Keccak-256 hash of the empty
    /// string.
    #[inline]
    pub fn is_empty_code_hash(&self) -> bool {
        self.code_hash == KECCAK_EMPTY
    }

    /// Takes the bytecode out of the account info, leaving `None`.
    pub fn take_bytecode(&mut self) -> Option<Bytecode> {
        self.code.take()
    }

    /// Creates account info with the given balance and no code.
    pub fn from_balance(balance: U256) -> Self {
        Self {
            balance,
            ..Default::default()
        }
    }

    /// Creates account info with the given bytecode, zero balance, and nonce 1.
    pub fn from_bytecode(bytecode: Bytecode) -> Self {
        let hash = bytecode.hash_slow();
        Self {
            balance: U256::ZERO,
            nonce: 1,
            code: Some(bytecode),
            code_hash: hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_account() {
        let account = AccountInfo::default();
        assert!(account.is_empty());
        assert!(!account.exists());
        assert!(account.is_empty_code_hash());
    }

    #[test]
    fn code_hash_is_computed() {
        let bytecode = Bytecode::new_raw(primitives::Bytes::from(vec![0x60, 0x01]));
        let account = AccountInfo::new(U256::ZERO, 0, bytecode.clone());
        assert_eq!(account.code_hash, bytecode.hash_slow());
        assert!(!account.is_empty());
    }

    #[test]
    fn equality_ignores_code_presence() {
        let bytecode = Bytecode::new_raw(primitives::Bytes::from(vec![0x60, 0x01]));
        let with_code = AccountInfo::new(U256::from(1), 1, bytecode);
        let without_code = with_code.clone().without_code();
        assert_eq!(with_code, without_code);
    }
}
