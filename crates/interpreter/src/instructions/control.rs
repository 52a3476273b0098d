use crate::{
    gas, interpreter::Interpreter, Host, InstructionResult, InterpreterAction, InterpreterResult,
};
use primitives::{Bytes, U256};

pub fn jump<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::MID);
    popn!([target], interpreter);
    jump_inner(interpreter, target);
}

pub fn jumpi<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::HIGH);
    popn!([target, cond], interpreter);

    if !cond.is_zero() {
        jump_inner(interpreter, target);
    }
}

#[inline]
fn jump_inner(interpreter: &mut Interpreter, target: U256) {
    let target = as_usize_or_fail!(interpreter, target, InstructionResult::InvalidJump);
    if !interpreter.contract.is_valid_jump(target) {
        interpreter.instruction_result = InstructionResult::InvalidJump;
        return;
    }
    // The JUMPDEST at `target` is executed next; it charges its own gas.
    interpreter.program_counter = target;
}

pub fn jumpdest<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::JUMPDEST);
}

pub fn pc<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::BASE);
    // The counter already moved past this opcode; report where it was.
    push!(interpreter, U256::from(interpreter.program_counter - 1));
}

// RETURN and REVERT are free apart from the memory they touch.
#[inline]
fn return_inner(interpreter: &mut Interpreter, instruction_result: InstructionResult) {
    popn!([offset, len], interpreter);
    let len = as_usize_or_fail!(interpreter, len);
    // A zero-length window ignores the offset entirely.
    let mut output = Bytes::default();
    if len != 0 {
        let offset = as_usize_or_fail!(interpreter, offset);
        resize_memory!(interpreter, offset, len);
        output = Bytes::copy_from_slice(interpreter.shared_memory.slice(offset, len));
    }
    interpreter.instruction_result = instruction_result;
    interpreter.next_action = InterpreterAction::Return {
        result: InterpreterResult {
            output,
            gas: interpreter.gas,
            result: instruction_result,
        },
    };
}

pub fn ret<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    return_inner(interpreter, InstructionResult::Return);
}

/// EIP-140: REVERT instruction
pub fn revert<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    check!(interpreter, BYZANTIUM);
    return_inner(interpreter, InstructionResult::Revert);
}

pub fn stop<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    interpreter.instruction_result = InstructionResult::Stop;
}

pub fn invalid<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    interpreter.instruction_result = InstructionResult::InvalidFEOpcode;
}

pub fn unknown<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    interpreter.instruction_result = InstructionResult::OpcodeNotFound;
}

#[cfg(test)]
mod tests {
    use crate::{
        host::DummyHost, interpreter::Contract, table::make_instruction_table, InstructionResult,
        Interpreter,
    };
    use bytecode::Bytecode;
    use primitives::{hex, Bytes, Env, U256};

    fn run_program(code: &[u8]) -> (Interpreter, crate::InterpreterAction) {
        let contract = Contract {
            bytecode: Bytecode::new_raw(Bytes::copy_from_slice(code)).into_analyzed(),
            ..Default::default()
        };
        let mut interpreter = Interpreter::new_simple(contract);
        let mut host = DummyHost::new(Env::default());
        let table = make_instruction_table::<DummyHost>();
        let action = interpreter.run(&table, &mut host);
        (interpreter, action)
    }

    #[test]
    fn jump_to_valid_destination() {
        // PUSH1 4, JUMP, INVALID, JUMPDEST, PUSH1 1, STOP
        let (interpreter, _) = run_program(&hex!("600456fe5b600100"));
        assert_eq!(interpreter.instruction_result, InstructionResult::Stop);
        assert_eq!(interpreter.stack.data(), &vec![U256::from(1)]);
    }

    #[test]
    fn jump_into_push_immediate_is_invalid() {
        // PUSH1 1, JUMP; position 1 is the immediate `1`
        let (interpreter, _) = run_program(&hex!("600156"));
        assert_eq!(interpreter.instruction_result, InstructionResult::InvalidJump);
    }

    #[test]
    fn jump_out_of_bounds_is_invalid() {
        // PUSH2 0xffff, JUMP
        let (interpreter, _) = run_program(&hex!("61ffff56"));
        assert_eq!(interpreter.instruction_result, InstructionResult::InvalidJump);
    }

    #[test]
    fn jumpi_only_takes_branch_on_nonzero() {
        // PUSH1 0, PUSH1 6, JUMPI, STOP, ...padding..., JUMPDEST at 6 unreachable
        let (interpreter, _) = run_program(&hex!("6000600657005b60ff"));
        assert_eq!(interpreter.instruction_result, InstructionResult::Stop);
        assert!(interpreter.stack.data().is_empty());

        // PUSH1 1, PUSH1 6, JUMPI, STOP, ..., JUMPDEST, PUSH1 0xff
        let (interpreter, _) = run_program(&hex!("6001600657005b60ff"));
        assert_eq!(interpreter.instruction_result, InstructionResult::Stop);
        assert_eq!(interpreter.stack.data(), &vec![U256::from(0xff)]);
    }

    #[test]
    fn jump_loop_runs_out_of_gas() {
        // JUMPDEST, PUSH1 0, JUMP
        let (interpreter, action) = run_program(&hex!("5b600056"));
        assert_eq!(interpreter.instruction_result, InstructionResult::OutOfGas);
        let result = action.into_result_return().unwrap();
        assert_eq!(result.result, InstructionResult::OutOfGas);
        assert!(result.output.is_empty());
    }

    #[test]
    fn return_copies_memory_window() {
        // PUSH1 0xff, PUSH1 0, MSTORE, PUSH1 32, PUSH1 0, RETURN
        let (interpreter, action) = run_program(&hex!("60ff60005260206000f3"));
        assert_eq!(interpreter.instruction_result, InstructionResult::Return);
        let result = action.into_result_return().unwrap();
        let mut expected = [0u8; 32];
        expected[31] = 0xff;
        assert_eq!(result.output.as_ref(), &expected);
        // 3 + 3 + (3 + 3 memory expansion) + 3 + 3 + 0
        assert_eq!(result.gas.spent(), 18);
    }

    #[test]
    fn revert_keeps_output_and_remaining_gas() {
        // PUSH1 0, PUSH1 0, REVERT
        let (interpreter, action) = run_program(&hex!("60006000fd"));
        assert_eq!(interpreter.instruction_result, InstructionResult::Revert);
        let result = action.into_result_return().unwrap();
        assert_eq!(result.result, InstructionResult::Revert);
        assert!(result.output.is_empty());
        assert_eq!(result.gas.spent(), 6);
    }

    #[test]
    fn pc_pushes_current_position() {
        // PC, PC, STOP
        let (interpreter, _) = run_program(&hex!("585800"));
        assert_eq!(
            interpreter.stack.data(),
            &vec![U256::ZERO, U256::from(1)]
        );
    }
}
