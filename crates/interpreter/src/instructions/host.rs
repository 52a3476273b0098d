use crate::{gas, interpreter::Interpreter, Host, InstructionResult};
use core::cmp::min;
use primitives::{Address, Bytes, Log, LogData, B256, BLOCK_HASH_HISTORY, U256};

/// Pops an address from the stack, truncating the word to 20 bytes.
macro_rules! pop_address {
    ($interpreter:expr, $x:ident) => {
        popn!([temp], $interpreter);
        let $x = Address::from_word(B256::from(temp.to_be_bytes::<32>()));
    };
}

pub fn balance<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    pop_address!(interpreter, address);
    let Some(balance) = host.balance(address) else {
        interpreter.instruction_result = InstructionResult::FatalExternalError;
        return;
    };
    gas!(
        interpreter,
        gas::balance_cost(interpreter.spec_id, balance.is_cold)
    );
    push!(interpreter, balance.data);
}

/// `SELFBALANCE`, a cheap read of the executing account's own balance
/// (EIP-1884).
pub fn selfbalance<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    check!(interpreter, ISTANBUL);
    gas!(interpreter, gas::LOW);
    let Some(balance) = host.balance(interpreter.contract.target_address) else {
        interpreter.instruction_result = InstructionResult::FatalExternalError;
        return;
    };
    push!(interpreter, balance.data);
}

pub fn extcodesize<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    pop_address!(interpreter, address);
    let Some(code) = host.code(address) else {
        interpreter.instruction_result = InstructionResult::FatalExternalError;
        return;
    };
    gas!(
        interpreter,
        gas::extcodesize_cost(interpreter.spec_id, code.is_cold)
    );
    push!(interpreter, U256::from(code.data.len()));
}

/// EIP-1052: EXTCODEHASH opcode
pub fn extcodehash<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    check!(interpreter, CONSTANTINOPLE);
    pop_address!(interpreter, address);
    let Some(code_hash) = host.code_hash(address) else {
        interpreter.instruction_result = InstructionResult::FatalExternalError;
        return;
    };
    gas!(
        interpreter,
        gas::extcodehash_cost(interpreter.spec_id, code_hash.is_cold)
    );
    push_b256!(interpreter, code_hash.data);
}

pub fn extcodecopy<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    pop_address!(interpreter, address);
    popn!([memory_offset, code_offset, len_u256], interpreter);

    let Some(code) = host.code(address) else {
        interpreter.instruction_result = InstructionResult::FatalExternalError;
        return;
    };

    let len = as_usize_or_fail!(interpreter, len_u256);
    gas_or_fail!(
        interpreter,
        gas::extcodecopy_cost(interpreter.spec_id, len as u64, code.is_cold)
    );
    if len == 0 {
        return;
    }
    let memory_offset = as_usize_or_fail!(interpreter, memory_offset);
    let code_offset = min(as_usize_saturated!(code_offset), code.data.len());
    resize_memory!(interpreter, memory_offset, len);

    interpreter
        .shared_memory
        .set_data(memory_offset, code_offset, len, &code.data);
}

pub fn blockhash<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    gas!(interpreter, gas::BLOCKHASH);
    popn_top!([], number, interpreter);

    let block_number = host.env().block.number;
    let requested_number = as_u64_saturated!(number);

    let Some(diff) = as_u64_saturated!(block_number).checked_sub(requested_number) else {
        *number = U256::ZERO;
        return;
    };

    // Only the 256 most recent ancestors are addressable, and never the
    // current block itself.
    if diff == 0 || diff > BLOCK_HASH_HISTORY {
        *number = U256::ZERO;
        return;
    }

    let Some(hash) = host.block_hash(requested_number) else {
        interpreter.instruction_result = InstructionResult::FatalExternalError;
        return;
    };
    *number = U256::from_be_bytes(hash.0);
}

pub fn sload<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    popn_top!([], index, interpreter);

    let Some(value) = host.sload(interpreter.contract.target_address, *index) else {
        interpreter.instruction_result = InstructionResult::FatalExternalError;
        return;
    };
    gas!(
        interpreter,
        gas::sload_cost(interpreter.spec_id, value.is_cold)
    );
    *index = value.data;
}

pub fn sstore<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    require_non_staticcall!(interpreter);

    popn!([index, value], interpreter);

    let Some(state_load) = host.sstore(interpreter.contract.target_address, index, value) else {
        interpreter.instruction_result = InstructionResult::FatalExternalError;
        return;
    };

    gas_or_fail!(interpreter, {
        let remaining_gas = interpreter.gas.remaining();
        gas::sstore_cost(
            interpreter.spec_id,
            state_load.data.original_value,
            state_load.data.present_value,
            state_load.data.new_value,
            remaining_gas,
            state_load.is_cold,
        )
    });
    refund!(
        interpreter,
        gas::sstore_refund(
            interpreter.spec_id,
            state_load.data.original_value,
            state_load.data.present_value,
            state_load.data.new_value,
        )
    );
}

/// EIP-1153: Transient storage opcodes
///
/// Store value to transient storage.
pub fn tstore<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    check!(interpreter, CANCUN);
    require_non_staticcall!(interpreter);
    gas!(interpreter, gas::WARM_STORAGE_READ_COST);

    popn!([index, value], interpreter);

    host.tstore(interpreter.contract.target_address, index, value);
}

/// EIP-1153: Transient storage opcodes
///
/// Load value from transient storage.
pub fn tload<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    check!(interpreter, CANCUN);
    gas!(interpreter, gas::WARM_STORAGE_READ_COST);

    popn_top!([], index, interpreter);

    *index = host.tload(interpreter.contract.target_address, *index);
}

pub fn log<const N: usize, H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    require_non_staticcall!(interpreter);

    popn!([offset, len], interpreter);
    let len = as_usize_or_fail!(interpreter, len);
    gas_or_fail!(interpreter, gas::log_cost(N as u8, len as u64));
    let data = if len == 0 {
        Bytes::new()
    } else {
        let offset = as_usize_or_fail!(interpreter, offset);
        resize_memory!(interpreter, offset, len);
        Bytes::copy_from_slice(interpreter.shared_memory.slice(offset, len))
    };

    if interpreter.stack.len() < N {
        interpreter.instruction_result = InstructionResult::StackUnderflow;
        return;
    }

    let mut topics = Vec::with_capacity(N);
    for _ in 0..N {
        // Stack bounds are checked above.
        topics.push(B256::from(
            interpreter.stack.pop().unwrap().to_be_bytes::<32>(),
        ));
    }

    let log = Log {
        address: interpreter.contract.target_address,
        data: LogData::new(topics, data).expect("the topic count is bounded by the opcode"),
    };

    host.log(log);
}

pub fn selfdestruct<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    require_non_staticcall!(interpreter);
    pop_address!(interpreter, target);

    let Some(res) = host.selfdestruct(interpreter.contract.target_address, target) else {
        interpreter.instruction_result = InstructionResult::FatalExternalError;
        return;
    };

    // London removed the selfdestruct refund (EIP-3529); before that the
    // first destruction of an account credited 24000.
    if !interpreter.spec_id.is_enabled_in(primitives::SpecId::LONDON)
        && !res.data.previously_destroyed
    {
        refund!(interpreter, gas::SELFDESTRUCT)
    }
    gas!(interpreter, gas::selfdestruct_cost(interpreter.spec_id, res));

    interpreter.instruction_result = InstructionResult::SelfDestruct;
}

#[cfg(test)]
mod tests {
    use crate::{
        gas as gas_consts, host::DummyHost, interpreter::Contract, table::make_instruction_table,
        InstructionResult, Interpreter,
    };
    use bytecode::Bytecode;
    use primitives::{hex, Bytes, Env, SpecId, U256};

    fn run_program(code: &[u8], is_static: bool) -> (Interpreter, DummyHost) {
        let contract = Contract {
            bytecode: Bytecode::new_raw(Bytes::copy_from_slice(code)).into_analyzed(),
            ..Default::default()
        };
        let mut interpreter = Interpreter::new(contract, 30_000_000, is_static, SpecId::LATEST);
        let mut host = DummyHost::new(Env::default());
        let table = make_instruction_table::<DummyHost>();
        let _ = interpreter.run(&table, &mut host);
        (interpreter, host)
    }

    #[test]
    fn sstore_charges_set_plus_cold() {
        // PUSH1 1, PUSH1 0, SSTORE
        let (interpreter, host) = run_program(&hex!("6001600055"), false);
        assert_eq!(interpreter.instruction_result, InstructionResult::Stop);
        assert_eq!(host.storage.get(&U256::ZERO), Some(&U256::from(1)));
        // 3 + 3 + SSTORE_SET + COLD_SLOAD_COST
        assert_eq!(
            interpreter.gas.spent(),
            6 + gas_consts::SSTORE_SET + gas_consts::COLD_SLOAD_COST
        );
    }

    #[test]
    fn sload_cold_then_warm() {
        // PUSH1 0, SLOAD, POP, PUSH1 0, SLOAD
        let (interpreter, _) = run_program(&hex!("60005450600054"), false);
        assert_eq!(interpreter.instruction_result, InstructionResult::Stop);
        // 3 + 2100 + 2 + 3 + 100
        assert_eq!(
            interpreter.gas.spent(),
            3 + gas_consts::COLD_SLOAD_COST + 2 + 3 + gas_consts::WARM_STORAGE_READ_COST
        );
    }

    #[test]
    fn sstore_in_static_context_fails() {
        let (interpreter, host) = run_program(&hex!("6001600055"), true);
        assert_eq!(
            interpreter.instruction_result,
            InstructionResult::StateChangeDuringStaticCall
        );
        assert!(host.storage.is_empty());
    }

    #[test]
    fn tstore_tload_round_trip() {
        // PUSH1 7, PUSH1 1, TSTORE, PUSH1 1, TLOAD
        let (interpreter, host) = run_program(&hex!("600760015d60015c00"), false);
        assert_eq!(interpreter.instruction_result, InstructionResult::Stop);
        assert_eq!(interpreter.stack.data(), &vec![U256::from(7)]);
        assert_eq!(host.transient_storage.get(&U256::from(1)), Some(&U256::from(7)));
    }

    #[test]
    fn log_captures_topics_and_data() {
        // PUSH1 0xaa, PUSH1 0, MSTORE8
        // PUSH1 42 (topic), PUSH1 1 (len), PUSH1 0 (offset), LOG1
        let (interpreter, host) = run_program(&hex!("60aa600053602a60016000a100"), false);
        assert_eq!(interpreter.instruction_result, InstructionResult::Stop);
        assert_eq!(host.log.len(), 1);
        let log = &host.log[0];
        assert_eq!(log.data.topics().len(), 1);
        assert_eq!(log.data.topics()[0], primitives::B256::with_last_byte(42));
        assert_eq!(log.data.data.as_ref(), &[0xaa]);
    }

    #[test]
    fn log_in_static_context_fails() {
        let (interpreter, host) = run_program(&hex!("60006000a0"), true);
        assert_eq!(
            interpreter.instruction_result,
            InstructionResult::StateChangeDuringStaticCall
        );
        assert!(host.log.is_empty());
    }
}
