use crate::{gas, interpreter::Interpreter, Host};
use primitives::U256;

/// EIP-1344: ChainID opcode
pub fn chainid<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    check!(interpreter, ISTANBUL);
    gas!(interpreter, gas::BASE);
    push!(interpreter, U256::from(host.env().cfg.chain_id));
}

pub fn coinbase<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    gas!(interpreter, gas::BASE);
    push_b256!(interpreter, host.env().block.coinbase.into_word());
}

pub fn timestamp<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    gas!(interpreter, gas::BASE);
    push!(interpreter, host.env().block.timestamp);
}

pub fn block_number<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    gas!(interpreter, gas::BASE);
    push!(interpreter, host.env().block.number);
}

pub fn difficulty<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    gas!(interpreter, gas::BASE);
    if interpreter.spec_id.is_enabled_in(primitives::SpecId::MERGE) {
        // After the merge, DIFFICULTY returns PREVRANDAO (EIP-4399).
        let prevrandao = host.env().block.prevrandao.unwrap_or_default();
        push_b256!(interpreter, prevrandao);
    } else {
        push!(interpreter, host.env().block.difficulty);
    }
}

pub fn gaslimit<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    gas!(interpreter, gas::BASE);
    push!(interpreter, host.env().block.gas_limit);
}

pub fn gasprice<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    gas!(interpreter, gas::BASE);
    push!(interpreter, host.env().effective_gas_price());
}

/// EIP-3198: BASEFEE opcode
pub fn basefee<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    check!(interpreter, LONDON);
    gas!(interpreter, gas::BASE);
    push!(interpreter, host.env().block.basefee);
}

pub fn origin<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    gas!(interpreter, gas::BASE);
    push_b256!(interpreter, host.env().tx.caller.into_word());
}

/// EIP-4844: Shard Blob Transactions
pub fn blob_hash<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    check!(interpreter, CANCUN);
    gas!(interpreter, gas::VERYLOW);
    popn_top!([], index, interpreter);
    let i = as_usize_saturated!(index);
    *index = match host.env().tx.blob_hashes.get(i) {
        Some(hash) => U256::from_be_bytes(hash.0),
        None => U256::ZERO,
    };
}

/// EIP-7516: BLOBBASEFEE opcode
pub fn blob_basefee<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    check!(interpreter, CANCUN);
    gas!(interpreter, gas::BASE);
    push!(
        interpreter,
        U256::from(host.env().block.get_blob_gasprice().unwrap_or_default())
    );
}

#[cfg(test)]
mod tests {
    use crate::{
        host::DummyHost, interpreter::Contract, table::make_instruction_table, Interpreter,
    };
    use bytecode::Bytecode;
    use primitives::{hex, Bytes, Env, SpecId, B256, U256};

    fn run_program_with_env(code: &[u8], env: Env, spec_id: SpecId) -> Interpreter {
        let contract = Contract {
            bytecode: Bytecode::new_raw(Bytes::copy_from_slice(code)).into_analyzed(),
            ..Default::default()
        };
        let mut interpreter = Interpreter::new(contract, 30_000_000, false, spec_id);
        let mut host = DummyHost::new(env);
        let table = make_instruction_table::<DummyHost>();
        let _ = interpreter.run(&table, &mut host);
        interpreter
    }

    #[test]
    fn env_opcodes_read_the_block() {
        let mut env = Env::default();
        env.cfg.chain_id = 42;
        env.block.number = U256::from(7);
        env.block.timestamp = U256::from(1234);

        // CHAINID, NUMBER, TIMESTAMP
        let interpreter = run_program_with_env(&hex!("46434200"), env, SpecId::LATEST);
        assert_eq!(
            interpreter.stack.data(),
            &vec![U256::from(42), U256::from(7), U256::from(1234)]
        );
    }

    #[test]
    fn difficulty_becomes_prevrandao_after_merge() {
        let mut env = Env::default();
        env.block.difficulty = U256::from(1000);
        env.block.prevrandao = Some(B256::with_last_byte(5));

        let interpreter = run_program_with_env(&hex!("4400"), env.clone(), SpecId::LONDON);
        assert_eq!(interpreter.stack.data(), &vec![U256::from(1000)]);

        let interpreter = run_program_with_env(&hex!("4400"), env, SpecId::MERGE);
        assert_eq!(interpreter.stack.data(), &vec![U256::from(5)]);
    }

    #[test]
    fn blob_hash_indexes_tx_hashes() {
        let mut env = Env::default();
        env.tx.blob_hashes = vec![B256::with_last_byte(9)];

        // PUSH1 0, BLOBHASH
        let interpreter = run_program_with_env(&hex!("60004900"), env.clone(), SpecId::CANCUN);
        assert_eq!(interpreter.stack.data(), &vec![U256::from(9)]);

        // out of range index pushes zero
        let interpreter = run_program_with_env(&hex!("60014900"), env, SpecId::CANCUN);
        assert_eq!(interpreter.stack.data(), &vec![U256::ZERO]);
    }
}
