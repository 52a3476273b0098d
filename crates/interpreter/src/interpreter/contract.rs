use crate::CallInputs;
use bytecode::Bytecode;
use primitives::{Address, Bytes, Env, TransactTo, B256, U256};

/// EVM contract information, immutable for the duration of its frame.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Contract {
    /// Contract call input data.
    pub input: Bytes,
    /// Bytecode that is being executed.
    ///
    /// Always analyzed: extended with STOP padding and carrying a jump table.
    pub bytecode: Bytecode,
    /// Bytecode hash, when known.
    pub hash: Option<B256>,
    /// Target address of the frame. Storage of this address is going to be
    /// modified.
    pub target_address: Address,
    /// Address of the account the bytecode was loaded from. This can be
    /// different from `target_address` in the case of DELEGATECALL or
    /// CALLCODE.
    pub bytecode_address: Option<Address>,
    /// Caller of the frame.
    pub caller: Address,
    /// Value sent to the contract from the transaction or from CALL opcodes.
    pub call_value: U256,
}

impl Contract {
    /// Instantiates a new contract, analyzing the given bytecode if necessary.
    #[inline]
    pub fn new(
        input: Bytes,
        bytecode: Bytecode,
        hash: Option<B256>,
        target_address: Address,
        bytecode_address: Option<Address>,
        caller: Address,
        call_value: U256,
    ) -> Self {
        let bytecode = bytecode.into_analyzed();

        Self {
            input,
            bytecode,
            hash,
            target_address,
            bytecode_address,
            caller,
            call_value,
        }
    }

    /// Creates a new contract from the given [`Env`].
    #[inline]
    pub fn new_env(env: &Env, bytecode: Bytecode, hash: Option<B256>) -> Self {
        let contract_address = match env.tx.transact_to {
            TransactTo::Call(caller) => caller,
            TransactTo::Create => Address::ZERO,
        };
        let bytecode_address = match env.tx.transact_to {
            TransactTo::Call(caller) => Some(caller),
            TransactTo::Create => None,
        };
        Self::new(
            env.tx.data.clone(),
            bytecode,
            hash,
            contract_address,
            bytecode_address,
            env.tx.caller,
            env.tx.value,
        )
    }

    /// Creates a new contract from the given call inputs.
    #[inline]
    pub fn new_with_context(
        input: Bytes,
        bytecode: Bytecode,
        hash: Option<B256>,
        call_context: &CallInputs,
    ) -> Self {
        Self::new(
            input,
            bytecode,
            hash,
            call_context.target_address,
            Some(call_context.bytecode_address),
            call_context.caller,
            call_context.call_value(),
        )
    }

    /// Returns whether the given position is a valid jump destination.
    #[inline]
    pub fn is_valid_jump(&self, pos: usize) -> bool {
        self.bytecode
            .legacy_jump_table()
            .map(|i| i.is_valid(pos))
            .unwrap_or(false)
    }
}
