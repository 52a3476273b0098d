use crate::{gas, interpreter::Interpreter, Host, InstructionResult};
use core::cmp::min;
use primitives::{keccak256, B256, KECCAK_EMPTY, U256};

pub fn keccak256_instr<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    popn_top!([offset], top, interpreter);
    let len = as_usize_or_fail!(interpreter, top);
    gas_or_fail!(interpreter, gas::keccak256_cost(len as u64));
    let hash = if len == 0 {
        KECCAK_EMPTY
    } else {
        let from = as_usize_or_fail!(interpreter, offset);
        resize_memory!(interpreter, from, len);
        keccak256(interpreter.shared_memory.slice(from, len))
    };
    *top = U256::from_be_bytes(hash.0);
}

pub fn address<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::BASE);
    push_b256!(interpreter, interpreter.contract.target_address.into_word());
}

pub fn caller<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::BASE);
    push_b256!(interpreter, interpreter.contract.caller.into_word());
}

pub fn codesize<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::BASE);
    push!(interpreter, U256::from(interpreter.contract.bytecode.len()));
}

pub fn codecopy<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    popn!([memory_offset, code_offset, len], interpreter);
    let len = as_usize_or_fail!(interpreter, len);
    gas_or_fail!(interpreter, gas::verylowcopy_cost(len as u64));
    if len == 0 {
        return;
    }
    let memory_offset = as_usize_or_fail!(interpreter, memory_offset);
    let code_offset = as_usize_saturated!(code_offset);
    resize_memory!(interpreter, memory_offset, len);

    interpreter.shared_memory.set_data(
        memory_offset,
        code_offset,
        len,
        interpreter.contract.bytecode.original_byte_slice(),
    );
}

pub fn calldataload<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    popn_top!([], offset_ptr, interpreter);
    let mut word = B256::ZERO;
    let offset = as_usize_saturated!(offset_ptr);
    let input = &interpreter.contract.input;
    if offset < input.len() {
        let count = min(32, input.len() - offset);
        word[..count].copy_from_slice(&input[offset..offset + count]);
    }
    *offset_ptr = U256::from_be_bytes(word.0);
}

pub fn calldatasize<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::BASE);
    push!(interpreter, U256::from(interpreter.contract.input.len()));
}

pub fn callvalue<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::BASE);
    push!(interpreter, interpreter.contract.call_value);
}

pub fn calldatacopy<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    popn!([memory_offset, data_offset, len], interpreter);
    let len = as_usize_or_fail!(interpreter, len);
    gas_or_fail!(interpreter, gas::verylowcopy_cost(len as u64));
    if len == 0 {
        return;
    }
    let memory_offset = as_usize_or_fail!(interpreter, memory_offset);
    let data_offset = as_usize_saturated!(data_offset);
    resize_memory!(interpreter, memory_offset, len);

    interpreter.shared_memory.set_data(
        memory_offset,
        data_offset,
        len,
        &interpreter.contract.input,
    );
}

/// EIP-211: New opcodes: RETURNDATASIZE and RETURNDATACOPY
pub fn returndatasize<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    check!(interpreter, BYZANTIUM);
    gas!(interpreter, gas::BASE);
    push!(
        interpreter,
        U256::from(interpreter.return_data_buffer.len())
    );
}

/// EIP-211: New opcodes: RETURNDATASIZE and RETURNDATACOPY
pub fn returndatacopy<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    check!(interpreter, BYZANTIUM);
    popn!([memory_offset, offset, len], interpreter);
    let len = as_usize_or_fail!(interpreter, len);
    gas_or_fail!(interpreter, gas::verylowcopy_cost(len as u64));
    let data_offset = as_usize_saturated!(offset);
    let data_end = data_offset.saturating_add(len);

    // Reading past the return buffer is a hard error, unlike other copies.
    if data_end > interpreter.return_data_buffer.len() {
        interpreter.instruction_result = InstructionResult::OutOfOffset;
        return;
    }
    if len == 0 {
        return;
    }
    let memory_offset = as_usize_or_fail!(interpreter, memory_offset);
    resize_memory!(interpreter, memory_offset, len);
    interpreter.shared_memory.set(
        memory_offset,
        &interpreter.return_data_buffer[data_offset..data_end],
    );
}

pub fn gas<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::BASE);
    push!(interpreter, U256::from(interpreter.gas.remaining()));
}

#[cfg(test)]
mod tests {
    use crate::{
        host::DummyHost, interpreter::Contract, table::make_instruction_table, InstructionResult,
        Interpreter,
    };
    use bytecode::Bytecode;
    use primitives::{hex, keccak256, Bytes, Env, U256};

    fn run_with_input(code: &[u8], input: Bytes) -> Interpreter {
        let contract = Contract {
            bytecode: Bytecode::new_raw(Bytes::copy_from_slice(code)).into_analyzed(),
            input,
            ..Default::default()
        };
        let mut interpreter = Interpreter::new_simple(contract);
        let mut host = DummyHost::new(Env::default());
        let table = make_instruction_table::<DummyHost>();
        let _ = interpreter.run(&table, &mut host);
        interpreter
    }

    #[test]
    fn keccak256_of_memory() {
        // PUSH1 0xff, PUSH1 0, MSTORE8, PUSH1 1, PUSH1 0, KECCAK256
        let interpreter = run_with_input(&hex!("60ff6000536001600020"), Bytes::new());
        assert_eq!(interpreter.instruction_result, InstructionResult::Stop);
        let expected = keccak256([0xff]);
        assert_eq!(
            interpreter.stack.data(),
            &vec![U256::from_be_bytes(expected.0)]
        );
    }

    #[test]
    fn keccak256_of_empty_range() {
        // PUSH1 0, PUSH1 0, KECCAK256
        let interpreter = run_with_input(&hex!("6000600020"), Bytes::new());
        assert_eq!(
            interpreter.stack.data(),
            &vec![U256::from_be_bytes(primitives::KECCAK_EMPTY.0)]
        );
        // 3 + 3 + 30, no memory expansion
        assert_eq!(interpreter.gas.spent(), 36);
    }

    #[test]
    fn calldataload_zero_pads() {
        // PUSH1 2, CALLDATALOAD
        let interpreter = run_with_input(
            &hex!("60023500"),
            Bytes::from_static(&hex!("aabbccdd")),
        );
        let mut expected = [0u8; 32];
        expected[0] = 0xcc;
        expected[1] = 0xdd;
        assert_eq!(
            interpreter.stack.data(),
            &vec![U256::from_be_bytes(expected)]
        );

        // offset past the calldata yields zero
        let interpreter = run_with_input(
            &hex!("60203500"),
            Bytes::from_static(&hex!("aabbccdd")),
        );
        assert_eq!(interpreter.stack.data(), &vec![U256::ZERO]);
    }

    #[test]
    fn calldatacopy_zero_pads() {
        // PUSH1 8 (len), PUSH1 2 (data offset), PUSH1 0 (mem offset), CALLDATACOPY
        let interpreter = run_with_input(
            &hex!("6008600260003700"),
            Bytes::from_static(&hex!("aabbccdd")),
        );
        assert_eq!(
            interpreter.shared_memory.slice(0, 8),
            &hex!("ccdd000000000000")
        );
    }

    #[test]
    fn codecopy_copies_original_code() {
        // PUSH1 4 (len), PUSH1 0 (code offset), PUSH1 0 (mem offset), CODECOPY
        let code = hex!("6004600060003900");
        let interpreter = run_with_input(&code, Bytes::new());
        assert_eq!(interpreter.shared_memory.slice(0, 4), &code[..4]);
    }

    #[test]
    fn returndatacopy_out_of_bounds_fails() {
        // PUSH1 1 (len), PUSH1 0 (offset), PUSH1 0 (mem offset), RETURNDATACOPY
        // with an empty return buffer
        let interpreter = run_with_input(&hex!("6001600060003e00"), Bytes::new());
        assert_eq!(interpreter.instruction_result, InstructionResult::OutOfOffset);
    }
}
