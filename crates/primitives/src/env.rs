//! Execution environment: configuration, block and transaction inputs.

use crate::{
    calc_blob_gasprice, calc_excess_blob_gas,
    eip4844::{GAS_PER_BLOB, VERSIONED_HASH_VERSION_KZG},
    result::{InvalidHeader, InvalidTransaction},
    SpecId, MAX_CODE_SIZE, MAX_INITCODE_SIZE,
};
use alloy_eip2930::AccessListItem;
use alloy_primitives::{Address, Bytes, TxKind, B256, U256};
use core::cmp::{min, Ordering};

/// Transaction destination.
pub type TransactTo = TxKind;

/// EVM environment configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Env {
    /// Configuration of the EVM itself.
    pub cfg: CfgEnv,
    /// Configuration of the block the transaction is in.
    pub block: BlockEnv,
    /// Configuration of the transaction that is being executed.
    pub tx: TxEnv,
}

impl Env {
    /// Resets environment to default values.
    #[inline]
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Calculates the effective gas price of the transaction.
    #[inline]
    pub fn effective_gas_price(&self) -> U256 {
        if let Some(priority_fee) = self.tx.gas_priority_fee {
            min(self.tx.gas_price, self.block.basefee + priority_fee)
        } else {
            self.tx.gas_price
        }
    }

    /// Calculates the [EIP-4844] `data_fee` of the transaction.
    ///
    /// Returns `None` if `Cancun` is not enabled. This is enforced in
    /// [`Env::validate_block_env`].
    ///
    /// [EIP-4844]: https://eips.ethereum.org/EIPS/eip-4844
    #[inline]
    pub fn calc_data_fee(&self) -> Option<U256> {
        self.block.get_blob_gasprice().map(|blob_gasprice| {
            U256::from(blob_gasprice).saturating_mul(U256::from(self.tx.get_total_blob_gas()))
        })
    }

    /// Calculates the maximum [EIP-4844] `data_fee` of the transaction.
    ///
    /// This is used for ensuring that the user has at least enough funds to pay
    /// `max_fee_per_blob_gas * total_blob_gas`, on top of regular gas costs.
    ///
    /// [EIP-4844]: https://eips.ethereum.org/EIPS/eip-4844
    pub fn calc_max_data_fee(&self) -> Option<U256> {
        self.tx.max_fee_per_blob_gas.map(|max_fee_per_blob_gas| {
            max_fee_per_blob_gas.saturating_mul(U256::from(self.tx.get_total_blob_gas()))
        })
    }

    /// Validate the block environment.
    #[inline]
    pub fn validate_block_env(&self, spec_id: SpecId) -> Result<(), InvalidHeader> {
        // `prevrandao` is required for the merge
        if spec_id.is_enabled_in(SpecId::MERGE) && self.block.prevrandao.is_none() {
            return Err(InvalidHeader::PrevrandaoNotSet);
        }
        // `excess_blob_gas` is required for Cancun
        if spec_id.is_enabled_in(SpecId::CANCUN) && self.block.blob_excess_gas_and_price.is_none() {
            return Err(InvalidHeader::ExcessBlobGasNotSet);
        }
        Ok(())
    }

    /// Validate transaction data that is set inside ENV and return error if
    /// something is wrong.
    #[inline]
    pub fn validate_tx(&self, spec_id: SpecId) -> Result<(), InvalidTransaction> {
        // Check if the transaction's chain id is correct
        if let Some(tx_chain_id) = self.tx.chain_id {
            if tx_chain_id != self.cfg.chain_id {
                return Err(InvalidTransaction::InvalidChainId);
            }
        }

        // Check if gas_limit is more than block_gas_limit
        if !self.cfg.is_block_gas_limit_disabled()
            && U256::from(self.tx.gas_limit) > self.block.gas_limit
        {
            return Err(InvalidTransaction::CallerGasLimitMoreThanBlock);
        }

        // Check that access list is empty for transactions before BERLIN
        if !spec_id.is_enabled_in(SpecId::BERLIN) && !self.tx.access_list.is_empty() {
            return Err(InvalidTransaction::AccessListNotSupported);
        }

        // BASEFEE tx check
        if spec_id.is_enabled_in(SpecId::LONDON) {
            if let Some(priority_fee) = self.tx.gas_priority_fee {
                if priority_fee > self.tx.gas_price {
                    // or gas_max_fee for eip1559
                    return Err(InvalidTransaction::PriorityFeeGreaterThanMaxFee);
                }
            }

            // check minimal cost against basefee
            if !self.cfg.is_base_fee_check_disabled()
                && self.effective_gas_price() < self.block.basefee
            {
                return Err(InvalidTransaction::GasPriceLessThanBasefee);
            }
        }

        // EIP-3860: Limit and meter initcode
        if spec_id.is_enabled_in(SpecId::SHANGHAI) && self.tx.transact_to.is_create() {
            let max_initcode_size = self
                .cfg
                .limit_contract_code_size
                .map(|limit| limit.saturating_mul(2))
                .unwrap_or(MAX_INITCODE_SIZE);
            if self.tx.data.len() > max_initcode_size {
                return Err(InvalidTransaction::CreateInitCodeSizeLimit);
            }
        }

        // Before CANCUN, `blob_hashes` and `max_fee_per_blob_gas` must not be set
        if !spec_id.is_enabled_in(SpecId::CANCUN)
            && (self.tx.max_fee_per_blob_gas.is_some() || !self.tx.blob_hashes.is_empty())
        {
            return Err(InvalidTransaction::BlobVersionedHashesNotSupported);
        }

        // Presence of max_fee_per_blob_gas means that this is a blob transaction.
        if let Some(max) = self.tx.max_fee_per_blob_gas {
            // ensure that the user was willing to at least pay the current blob gasprice
            let price = self.block.get_blob_gasprice().expect("already checked");
            if U256::from(price) > max {
                return Err(InvalidTransaction::BlobGasPriceGreaterThanMax);
            }

            // there must be at least one blob
            if self.tx.blob_hashes.is_empty() {
                return Err(InvalidTransaction::EmptyBlobs);
            }

            // blob transactions cannot have the form of a create transaction
            if self.tx.transact_to.is_create() {
                return Err(InvalidTransaction::BlobCreateTransaction);
            }

            // all versioned blob hashes must start with VERSIONED_HASH_VERSION_KZG
            for blob in self.tx.blob_hashes.iter() {
                if blob[0] != VERSIONED_HASH_VERSION_KZG {
                    return Err(InvalidTransaction::BlobVersionNotSupported);
                }
            }

            // ensure the total blob gas spent is at most equal to the limit
            let max_blobs = self.cfg.blob_max_count(spec_id) as usize;
            let num_blobs = self.tx.blob_hashes.len();
            if num_blobs > max_blobs {
                return Err(InvalidTransaction::TooManyBlobs {
                    have: num_blobs,
                    max: max_blobs,
                });
            }
        } else {
            // if max_fee_per_blob_gas is not set, then blob_hashes must be empty
            if !self.tx.blob_hashes.is_empty() {
                return Err(InvalidTransaction::BlobVersionedHashesNotSupported);
            }
        }

        Ok(())
    }

    /// Validate the transaction against the caller account state.
    ///
    /// `caller_nonce`, `caller_balance` and `caller_has_code` are read from the
    /// already-loaded caller account.
    #[inline]
    pub fn validate_tx_against_state(
        &self,
        spec_id: SpecId,
        caller_nonce: u64,
        caller_balance: U256,
        caller_has_code: bool,
    ) -> Result<(), InvalidTransaction> {
        // EIP-3607: Reject transactions from senders with deployed code
        if !self.cfg.is_eip3607_disabled() && caller_has_code {
            return Err(InvalidTransaction::RejectCallerWithCode);
        }

        // Check that the transaction's nonce is correct
        if let Some(tx) = self.tx.nonce {
            let state = caller_nonce;
            match tx.cmp(&state) {
                Ordering::Greater => return Err(InvalidTransaction::NonceTooHigh { tx, state }),
                Ordering::Less => return Err(InvalidTransaction::NonceTooLow { tx, state }),
                _ => {}
            }
        }

        let mut balance_check = U256::from(self.tx.gas_limit)
            .checked_mul(self.tx.gas_price)
            .and_then(|gas_cost| gas_cost.checked_add(self.tx.value))
            .ok_or(InvalidTransaction::OverflowPaymentInTransaction)?;

        if spec_id.is_enabled_in(SpecId::CANCUN) {
            // if the tx is not a blob tx, this will be None, so we add zero
            let data_fee = self.calc_max_data_fee().unwrap_or_default();
            balance_check = balance_check
                .checked_add(data_fee)
                .ok_or(InvalidTransaction::OverflowPaymentInTransaction)?;
        }

        // Check if the account has enough balance for gas_limit*gas_price and
        // value transfer. The transfer itself is done later by the driver.
        if !self.cfg.is_balance_check_disabled() && balance_check > caller_balance {
            return Err(InvalidTransaction::LackOfFundForMaxFee {
                fee: Box::new(balance_check),
                balance: Box::new(caller_balance),
            });
        }

        Ok(())
    }
}

/// EVM configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CfgEnv {
    /// Chain ID of the EVM, it will be compared to the transaction's Chain ID.
    ///
    /// Chain ID is introduced in EIP-155.
    pub chain_id: u64,
    /// Whether bytecode created with CREATE/CREATE2 is analysed and a jump
    /// table built for it, or stored raw.
    ///
    /// Default: Analyse
    pub perf_analyse_created_bytecodes: AnalysisKind,
    /// If some it will effect EIP-170: Contract code size limit. Useful to
    /// increase this because of tests. By default it is 0x6000 (~25kb).
    pub limit_contract_code_size: Option<usize>,
    /// A hard memory limit in bytes beyond which memory cannot be resized.
    ///
    /// Defaults to `2^32 - 1` bytes, per EIP-1985.
    pub memory_limit: u64,
    /// Skip balance checks if true.
    pub disable_balance_check: bool,
    /// There are use cases where it's allowed to provide a gas limit that's
    /// higher than the block's gas limit.
    pub disable_block_gas_limit: bool,
    /// EIP-3607 rejects transactions from senders with deployed code. In
    /// development it can be desirable to simulate calls from contracts, which
    /// this setting allows.
    pub disable_eip3607: bool,
    /// Disables all gas refunds. This is useful when using chains that have
    /// gas refunds disabled, e.g. Avalanche (see EIP-3298).
    pub disable_gas_refund: bool,
    /// Disables base fee checks for EIP-1559 transactions. Useful for testing
    /// method calls with zero gas price.
    pub disable_base_fee: bool,
    /// Disables the payout of the reward to the beneficiary.
    pub disable_beneficiary_reward: bool,
}

impl CfgEnv {
    /// Returns max code size from [`Self::limit_contract_code_size`] if set,
    /// or the default [`MAX_CODE_SIZE`] value.
    pub fn max_code_size(&self) -> usize {
        self.limit_contract_code_size.unwrap_or(MAX_CODE_SIZE)
    }

    /// Sets the chain id.
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Returns the maximum number of blobs per block for the given spec.
    #[inline]
    pub fn blob_max_count(&self, spec_id: SpecId) -> u8 {
        // EIP-7691 raises the blob count in Prague.
        if spec_id.is_enabled_in(SpecId::PRAGUE) {
            9
        } else {
            6
        }
    }

    /// Returns `true` if EIP-3607 checking is disabled.
    pub fn is_eip3607_disabled(&self) -> bool {
        self.disable_eip3607
    }

    /// Returns `true` if balance checking is disabled.
    pub fn is_balance_check_disabled(&self) -> bool {
        self.disable_balance_check
    }

    /// Returns `true` if gas refunds are disabled.
    pub fn is_gas_refund_disabled(&self) -> bool {
        self.disable_gas_refund
    }

    /// Returns `true` if base fee checking is disabled.
    pub fn is_base_fee_check_disabled(&self) -> bool {
        self.disable_base_fee
    }

    /// Returns `true` if block gas limit checking is disabled.
    pub fn is_block_gas_limit_disabled(&self) -> bool {
        self.disable_block_gas_limit
    }

    /// Returns `true` if the beneficiary reward is disabled.
    pub fn is_beneficiary_reward_disabled(&self) -> bool {
        self.disable_beneficiary_reward
    }
}

impl Default for CfgEnv {
    fn default() -> Self {
        Self {
            chain_id: 1,
            perf_analyse_created_bytecodes: AnalysisKind::default(),
            limit_contract_code_size: None,
            memory_limit: (1 << 32) - 1,
            disable_balance_check: false,
            disable_block_gas_limit: false,
            disable_eip3607: false,
            disable_gas_refund: false,
            disable_base_fee: false,
            disable_beneficiary_reward: false,
        }
    }
}

/// The block environment.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockEnv {
    /// The number of ancestor blocks of this block (block height).
    pub number: U256,
    /// Coinbase or miner or address that created and signed the block.
    ///
    /// This is the receiver address of all the gas spent in the block.
    pub coinbase: Address,
    /// The timestamp of the block in seconds since the UNIX epoch.
    pub timestamp: U256,
    /// The gas limit of the block.
    pub gas_limit: U256,
    /// The base fee per gas, added in the London upgrade with [EIP-1559].
    ///
    /// [EIP-1559]: https://eips.ethereum.org/EIPS/eip-1559
    pub basefee: U256,
    /// The difficulty of the block.
    ///
    /// Unused after the Paris (AKA the merge) upgrade, and replaced by
    /// `prevrandao`.
    pub difficulty: U256,
    /// The output of the randomness beacon provided by the beacon chain.
    ///
    /// Replaces `difficulty` after the Paris (AKA the merge) upgrade with
    /// [EIP-4399].
    ///
    /// [EIP-4399]: https://eips.ethereum.org/EIPS/eip-4399
    pub prevrandao: Option<B256>,
    /// Excess blob gas and blob gasprice.
    ///
    /// Incorporated as part of the Cancun upgrade via [EIP-4844].
    ///
    /// [EIP-4844]: https://eips.ethereum.org/EIPS/eip-4844
    pub blob_excess_gas_and_price: Option<BlobExcessGasAndPrice>,
}

impl BlockEnv {
    /// Takes `blob_excess_gas`, saves it inside the env and calculates the blob
    /// gas price with [`BlobExcessGasAndPrice`].
    pub fn set_blob_excess_gas_and_price(&mut self, excess_blob_gas: u64, is_prague: bool) {
        self.blob_excess_gas_and_price =
            Some(BlobExcessGasAndPrice::new(excess_blob_gas, is_prague));
    }

    /// See [EIP-4844] and [`calc_blob_gasprice`].
    ///
    /// Returns `None` if `Cancun` is not enabled. This is enforced in
    /// [`Env::validate_block_env`].
    ///
    /// [EIP-4844]: https://eips.ethereum.org/EIPS/eip-4844
    #[inline]
    pub fn get_blob_gasprice(&self) -> Option<u128> {
        self.blob_excess_gas_and_price
            .as_ref()
            .map(|a| a.blob_gasprice)
    }

    /// Return the `blob_excess_gas` header field. See [EIP-4844].
    ///
    /// [EIP-4844]: https://eips.ethereum.org/EIPS/eip-4844
    #[inline]
    pub fn get_blob_excess_gas(&self) -> Option<u64> {
        self.blob_excess_gas_and_price
            .as_ref()
            .map(|a| a.excess_blob_gas)
    }
}

impl Default for BlockEnv {
    fn default() -> Self {
        Self {
            number: U256::ZERO,
            coinbase: Address::ZERO,
            timestamp: U256::from(1),
            gas_limit: U256::MAX,
            basefee: U256::ZERO,
            difficulty: U256::ZERO,
            prevrandao: Some(B256::ZERO),
            blob_excess_gas_and_price: Some(BlobExcessGasAndPrice::new(0, false)),
        }
    }
}

/// The transaction environment.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxEnv {
    /// Caller aka author aka transaction signer.
    pub caller: Address,
    /// The gas limit of the transaction.
    pub gas_limit: u64,
    /// The gas price of the transaction.
    pub gas_price: U256,
    /// The destination of the transaction.
    pub transact_to: TransactTo,
    /// The value sent to `transact_to`.
    pub value: U256,
    /// The data of the transaction.
    pub data: Bytes,
    /// The nonce of the transaction.
    ///
    /// Caution: if set to `None`, nonce validation against the account's nonce
    /// is skipped.
    pub nonce: Option<u64>,
    /// The chain ID of the transaction. If set to `None`, no checks are
    /// performed.
    ///
    /// Incorporated as part of the Spurious Dragon upgrade via [EIP-155].
    ///
    /// [EIP-155]: https://eips.ethereum.org/EIPS/eip-155
    pub chain_id: Option<u64>,
    /// A list of addresses and storage keys that the transaction plans to
    /// access, added in [EIP-2930].
    ///
    /// [EIP-2930]: https://eips.ethereum.org/EIPS/eip-2930
    pub access_list: Vec<AccessListItem>,
    /// The priority fee per gas, added in the London upgrade via [EIP-1559].
    ///
    /// [EIP-1559]: https://eips.ethereum.org/EIPS/eip-1559
    pub gas_priority_fee: Option<U256>,
    /// The list of blob versioned hashes. Per EIP there should be at least one
    /// blob present if [`Self::max_fee_per_blob_gas`] is `Some`.
    ///
    /// Incorporated as part of the Cancun upgrade via [EIP-4844].
    ///
    /// [EIP-4844]: https://eips.ethereum.org/EIPS/eip-4844
    pub blob_hashes: Vec<B256>,
    /// The max fee per blob gas, incorporated as part of the Cancun upgrade
    /// via [EIP-4844].
    ///
    /// [EIP-4844]: https://eips.ethereum.org/EIPS/eip-4844
    pub max_fee_per_blob_gas: Option<U256>,
}

impl TxEnv {
    /// See [EIP-4844], [`Env::calc_data_fee`], and [`Env::calc_max_data_fee`].
    ///
    /// [EIP-4844]: https://eips.ethereum.org/EIPS/eip-4844
    #[inline]
    pub fn get_total_blob_gas(&self) -> u64 {
        GAS_PER_BLOB * self.blob_hashes.len() as u64
    }
}

impl Default for TxEnv {
    fn default() -> Self {
        Self {
            caller: Address::ZERO,
            gas_limit: u64::MAX,
            gas_price: U256::ZERO,
            gas_priority_fee: None,
            transact_to: TransactTo::Call(Address::ZERO), // will do nothing
            value: U256::ZERO,
            data: Bytes::new(),
            chain_id: None,
            nonce: None,
            access_list: Vec::new(),
            blob_hashes: Vec::new(),
            max_fee_per_blob_gas: None,
        }
    }
}

/// Structure holding block blob excess gas and its calculated blob fee.
///
/// Incorporated as part of the Cancun upgrade via [EIP-4844].
///
/// [EIP-4844]: https://eips.ethereum.org/EIPS/eip-4844
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlobExcessGasAndPrice {
    /// The excess blob gas of the block.
    pub excess_blob_gas: u64,
    /// The calculated blob gas price based on `excess_blob_gas`, see
    /// [`calc_blob_gasprice`].
    pub blob_gasprice: u128,
}

impl BlobExcessGasAndPrice {
    /// Creates a new instance by calculating the blob gas price with
    /// [`calc_blob_gasprice`].
    pub fn new(excess_blob_gas: u64, is_prague: bool) -> Self {
        let blob_gasprice = calc_blob_gasprice(excess_blob_gas, is_prague);
        Self {
            excess_blob_gas,
            blob_gasprice,
        }
    }

    /// Calculate this block's excess gas and price from the parent excess gas
    /// and gas used, and the target blob gas per block.
    pub fn from_parent_and_target(
        parent_excess_blob_gas: u64,
        parent_blob_gas_used: u64,
        parent_target_blob_gas_per_block: u64,
        is_prague: bool,
    ) -> Self {
        Self::new(
            calc_excess_blob_gas(
                parent_excess_blob_gas,
                parent_blob_gas_used,
                parent_target_blob_gas_per_block,
            ),
            is_prague,
        )
    }
}

/// What bytecode analysis to perform.
#[derive(Clone, Default, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnalysisKind {
    /// Do not perform bytecode analysis.
    Raw,
    /// Perform bytecode analysis.
    #[default]
    Analyse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_tx_chain_id() {
        let mut env = Env::default();
        env.tx.chain_id = Some(1);
        env.cfg.chain_id = 2;
        assert_eq!(
            env.validate_tx(SpecId::LATEST),
            Err(InvalidTransaction::InvalidChainId)
        );
    }

    #[test]
    fn test_validate_tx_access_list() {
        let mut env = Env::default();
        env.tx.access_list = vec![AccessListItem {
            address: Address::ZERO,
            storage_keys: vec![],
        }];
        assert_eq!(
            env.validate_tx(SpecId::FRONTIER),
            Err(InvalidTransaction::AccessListNotSupported)
        );
        assert_eq!(env.validate_tx(SpecId::BERLIN), Ok(()));
    }

    #[test]
    fn test_validate_tx_blob_rules() {
        // blob fields must be unset before Cancun
        let mut env = Env::default();
        env.tx.max_fee_per_blob_gas = Some(U256::from(1));
        assert_eq!(
            env.validate_tx(SpecId::SHANGHAI),
            Err(InvalidTransaction::BlobVersionedHashesNotSupported)
        );

        // max fee without any blob hash
        let mut env = Env::default();
        env.tx.max_fee_per_blob_gas = Some(U256::from(1));
        assert_eq!(
            env.validate_tx(SpecId::CANCUN),
            Err(InvalidTransaction::EmptyBlobs)
        );

        // gas price above the willing maximum
        let mut env = Env::default();
        env.block.set_blob_excess_gas_and_price(10 * 1024 * 1024, false);
        env.tx.max_fee_per_blob_gas = Some(U256::from(1));
        env.tx.blob_hashes = vec![B256::with_last_byte(1)];
        assert_eq!(
            env.validate_tx(SpecId::CANCUN),
            Err(InvalidTransaction::BlobGasPriceGreaterThanMax)
        );
    }

    #[test]
    fn test_validate_tx_against_state_nonce() {
        let mut env = Env::default();
        env.tx.nonce = Some(2);
        assert_eq!(
            env.validate_tx_against_state(SpecId::LATEST, 1, U256::MAX, false),
            Err(InvalidTransaction::NonceTooHigh { tx: 2, state: 1 })
        );
        assert_eq!(
            env.validate_tx_against_state(SpecId::LATEST, 3, U256::MAX, false),
            Err(InvalidTransaction::NonceTooLow { tx: 2, state: 3 })
        );
    }
}
