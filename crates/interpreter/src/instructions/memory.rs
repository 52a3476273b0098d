use crate::{gas, interpreter::Interpreter, Host};
use core::cmp::max;
use primitives::U256;

pub fn mload<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    popn_top!([], top, interpreter);
    let offset = as_usize_or_fail!(interpreter, top);
    resize_memory!(interpreter, offset, 32);
    *top = interpreter.shared_memory.get_u256(offset);
}

pub fn mstore<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    popn!([offset, value], interpreter);
    let offset = as_usize_or_fail!(interpreter, offset);
    resize_memory!(interpreter, offset, 32);
    interpreter.shared_memory.set_u256(offset, value);
}

pub fn mstore8<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    popn!([offset, value], interpreter);
    let offset = as_usize_or_fail!(interpreter, offset);
    resize_memory!(interpreter, offset, 1);
    interpreter.shared_memory.set_byte(offset, value.byte(0))
}

pub fn msize<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::BASE);
    push!(interpreter, U256::from(interpreter.shared_memory.len()));
}

/// EIP-5656: MCOPY - Memory copying instruction
pub fn mcopy<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    check!(interpreter, CANCUN);
    popn!([dst, src, len], interpreter);

    let len = as_usize_or_fail!(interpreter, len);
    gas_or_fail!(interpreter, gas::verylowcopy_cost(len as u64));
    if len == 0 {
        return;
    }

    let dst = as_usize_or_fail!(interpreter, dst);
    let src = as_usize_or_fail!(interpreter, src);
    // Both ranges must fit; the copy itself handles overlap.
    resize_memory!(interpreter, max(dst, src), len);
    interpreter.shared_memory.copy(dst, src, len);
}

#[cfg(test)]
mod tests {
    use crate::{
        host::DummyHost, interpreter::Contract, table::make_instruction_table, InstructionResult,
        Interpreter,
    };
    use bytecode::Bytecode;
    use primitives::{hex, Bytes, Env, U256};

    fn run_program(code: &[u8]) -> Interpreter {
        let contract = Contract {
            bytecode: Bytecode::new_raw(Bytes::copy_from_slice(code)).into_analyzed(),
            ..Default::default()
        };
        let mut interpreter = Interpreter::new_simple(contract);
        let mut host = DummyHost::new(Env::default());
        let table = make_instruction_table::<DummyHost>();
        let _ = interpreter.run(&table, &mut host);
        interpreter
    }

    #[test]
    fn mstore_mload_round_trip() {
        // PUSH1 0x42, PUSH1 0, MSTORE, PUSH1 0, MLOAD
        let interpreter = run_program(&hex!("604260005260005100"));
        assert_eq!(interpreter.instruction_result, InstructionResult::Stop);
        assert_eq!(interpreter.stack.data(), &vec![U256::from(0x42)]);
        assert_eq!(interpreter.shared_memory.len(), 32);
    }

    #[test]
    fn mstore8_writes_lowest_byte_and_msize_is_word_aligned() {
        // PUSH2 0x0102, PUSH1 0, MSTORE8, MSIZE
        let interpreter = run_program(&hex!("6101026000535900"));
        assert_eq!(interpreter.instruction_result, InstructionResult::Stop);
        // only the least significant byte is written
        assert_eq!(interpreter.shared_memory.get_byte(0), 0x02);
        // and memory grows in 32-byte words
        assert_eq!(interpreter.stack.data(), &vec![U256::from(32)]);
    }

    #[test]
    fn mcopy_copies_with_overlap() {
        // PUSH1 0x11, PUSH1 0, MSTORE8
        // PUSH1 0x22, PUSH1 1, MSTORE8
        // PUSH1 2 (len), PUSH1 0 (src), PUSH1 1 (dst), MCOPY
        // PUSH1 0, MLOAD
        let interpreter = run_program(&hex!("601160005360226001536002600060015e60005100"));
        assert_eq!(interpreter.instruction_result, InstructionResult::Stop);
        let mut expected = [0u8; 32];
        expected[0] = 0x11;
        expected[1] = 0x11;
        expected[2] = 0x22;
        assert_eq!(
            interpreter.stack.data(),
            &vec![U256::from_be_bytes(expected)]
        );
    }
}
