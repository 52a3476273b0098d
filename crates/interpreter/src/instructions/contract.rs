mod call_helpers;

pub use call_helpers::{calc_call_gas, get_memory_input_and_out_ranges, resize_memory_and_return_range};

use crate::{
    gas, interpreter::Interpreter, CallInputs, CallScheme, CallValue, CreateInputs, CreateScheme,
    Host, InstructionResult, InterpreterAction,
};
use primitives::{Address, Bytes, B256, MAX_INITCODE_SIZE, U256};

/// Pops an address from the stack, truncating the word to 20 bytes.
macro_rules! pop_address {
    ($interpreter:expr, $x:ident) => {
        popn!([temp], $interpreter);
        let $x = Address::from_word(B256::from(temp.to_be_bytes::<32>()));
    };
}

pub fn create<const IS_CREATE2: bool, H: Host + ?Sized>(
    interpreter: &mut Interpreter,
    host: &mut H,
) {
    require_non_staticcall!(interpreter);

    // CREATE2 (EIP-1014) arrived with Petersburg.
    if IS_CREATE2 {
        check!(interpreter, PETERSBURG);
    }

    popn!([value, code_offset, len], interpreter);
    let len = as_usize_or_fail!(interpreter, len);

    let mut code = Bytes::new();
    if len != 0 {
        // Shanghai meters the initcode and caps it at twice the
        // deployed-code limit (EIP-3860).
        if interpreter.spec_id.is_enabled_in(primitives::SpecId::SHANGHAI) {
            let max_initcode_size = host
                .env()
                .cfg
                .limit_contract_code_size
                .map(|limit| limit.saturating_mul(2))
                .unwrap_or(MAX_INITCODE_SIZE);
            if len > max_initcode_size {
                interpreter.instruction_result = InstructionResult::CreateInitCodeSizeLimit;
                return;
            }
            gas!(interpreter, gas::initcode_cost(len as u64));
        }

        let code_offset = as_usize_or_fail!(interpreter, code_offset);
        resize_memory!(interpreter, code_offset, len);
        code = Bytes::copy_from_slice(interpreter.shared_memory.slice(code_offset, len));
    }

    // CREATE2 additionally pays for hashing the initcode.
    let scheme = if IS_CREATE2 {
        popn!([salt], interpreter);
        gas_or_fail!(interpreter, gas::create2_cost(len as u64));
        CreateScheme::Create2 { salt }
    } else {
        gas!(interpreter, gas::CREATE);
        CreateScheme::Create
    };

    let mut gas_limit = interpreter.gas.remaining();

    // Since Tangerine the creator keeps 1/64 of the remaining gas
    // (EIP-150).
    if interpreter.spec_id.is_enabled_in(primitives::SpecId::TANGERINE) {
        gas_limit -= gas_limit / 64
    }
    gas!(interpreter, gas_limit);

    // The driver executes the create and re-enters via
    // `insert_create_outcome`.
    interpreter.instruction_result = InstructionResult::CallOrCreate;
    interpreter.next_action = InterpreterAction::Create {
        inputs: Box::new(CreateInputs {
            caller: interpreter.contract.target_address,
            scheme,
            value,
            init_code: code,
            gas_limit,
        }),
    };
}

pub fn call<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    popn!([local_gas_limit], interpreter);
    pop_address!(interpreter, to);
    // Anything beyond 2^64 gas saturates; the 63/64 rule caps it anyway.
    let local_gas_limit = u64::try_from(local_gas_limit).unwrap_or(u64::MAX);

    popn!([value], interpreter);
    let has_transfer = !value.is_zero();
    if interpreter.is_static && has_transfer {
        interpreter.instruction_result = InstructionResult::CallNotAllowedInsideStatic;
        return;
    }

    let Some((input, return_memory_offset)) = get_memory_input_and_out_ranges(interpreter) else {
        return;
    };

    let Some(account_load) = host.load_account(to) else {
        interpreter.instruction_result = InstructionResult::FatalExternalError;
        return;
    };

    let Some(mut gas_limit) =
        calc_call_gas(interpreter, account_load, has_transfer, true, local_gas_limit)
    else {
        return;
    };

    gas!(interpreter, gas_limit);

    // A value-bearing call hands the callee a 2300 gas stipend on top.
    if has_transfer {
        gas_limit = gas_limit.saturating_add(gas::CALL_STIPEND);
    }

    interpreter.instruction_result = InstructionResult::CallOrCreate;
    interpreter.next_action = InterpreterAction::Call {
        inputs: Box::new(CallInputs {
            input,
            gas_limit,
            target_address: to,
            caller: interpreter.contract.target_address,
            bytecode_address: to,
            value: CallValue::Transfer(value),
            scheme: CallScheme::Call,
            is_static: interpreter.is_static,
            return_memory_offset,
        }),
    };
}

pub fn call_code<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    popn!([local_gas_limit], interpreter);
    pop_address!(interpreter, to);
    // Anything beyond 2^64 gas saturates; the 63/64 rule caps it anyway.
    let local_gas_limit = u64::try_from(local_gas_limit).unwrap_or(u64::MAX);

    popn!([value], interpreter);
    let has_transfer = !value.is_zero();

    let Some((input, return_memory_offset)) = get_memory_input_and_out_ranges(interpreter) else {
        return;
    };

    let Some(account_load) = host.load_account(to) else {
        interpreter.instruction_result = InstructionResult::FatalExternalError;
        return;
    };

    let Some(mut gas_limit) =
        calc_call_gas(interpreter, account_load, has_transfer, false, local_gas_limit)
    else {
        return;
    };

    gas!(interpreter, gas_limit);

    // A value-bearing call hands the callee a 2300 gas stipend on top.
    if has_transfer {
        gas_limit = gas_limit.saturating_add(gas::CALL_STIPEND);
    }

    // The value is transferred from the contract to itself; the code of `to`
    // runs in the current contract's storage context.
    interpreter.instruction_result = InstructionResult::CallOrCreate;
    interpreter.next_action = InterpreterAction::Call {
        inputs: Box::new(CallInputs {
            input,
            gas_limit,
            target_address: interpreter.contract.target_address,
            caller: interpreter.contract.target_address,
            bytecode_address: to,
            value: CallValue::Transfer(value),
            scheme: CallScheme::CallCode,
            is_static: interpreter.is_static,
            return_memory_offset,
        }),
    };
}

pub fn delegate_call<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    check!(interpreter, HOMESTEAD);
    popn!([local_gas_limit], interpreter);
    pop_address!(interpreter, to);
    // Anything beyond 2^64 gas saturates; the 63/64 rule caps it anyway.
    let local_gas_limit = u64::try_from(local_gas_limit).unwrap_or(u64::MAX);

    let Some((input, return_memory_offset)) = get_memory_input_and_out_ranges(interpreter) else {
        return;
    };

    let Some(account_load) = host.load_account(to) else {
        interpreter.instruction_result = InstructionResult::FatalExternalError;
        return;
    };

    let Some(gas_limit) = calc_call_gas(interpreter, account_load, false, false, local_gas_limit)
    else {
        return;
    };

    gas!(interpreter, gas_limit);

    // Keeps the current caller and value; only the code comes from `to`.
    interpreter.instruction_result = InstructionResult::CallOrCreate;
    interpreter.next_action = InterpreterAction::Call {
        inputs: Box::new(CallInputs {
            input,
            gas_limit,
            target_address: interpreter.contract.target_address,
            caller: interpreter.contract.caller,
            bytecode_address: to,
            value: CallValue::Apparent(interpreter.contract.call_value),
            scheme: CallScheme::DelegateCall,
            is_static: interpreter.is_static,
            return_memory_offset,
        }),
    };
}

pub fn static_call<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) {
    check!(interpreter, BYZANTIUM);
    popn!([local_gas_limit], interpreter);
    pop_address!(interpreter, to);
    // Anything beyond 2^64 gas saturates; the 63/64 rule caps it anyway.
    let local_gas_limit = u64::try_from(local_gas_limit).unwrap_or(u64::MAX);

    let Some((input, return_memory_offset)) = get_memory_input_and_out_ranges(interpreter) else {
        return;
    };

    let Some(account_load) = host.load_account(to) else {
        interpreter.instruction_result = InstructionResult::FatalExternalError;
        return;
    };

    let Some(gas_limit) = calc_call_gas(interpreter, account_load, false, false, local_gas_limit)
    else {
        return;
    };
    gas!(interpreter, gas_limit);

    interpreter.instruction_result = InstructionResult::CallOrCreate;
    interpreter.next_action = InterpreterAction::Call {
        inputs: Box::new(CallInputs {
            input,
            gas_limit,
            target_address: to,
            caller: interpreter.contract.target_address,
            bytecode_address: to,
            value: CallValue::Transfer(U256::ZERO),
            scheme: CallScheme::StaticCall,
            is_static: true,
            return_memory_offset,
        }),
    };
}

#[cfg(test)]
mod tests {
    use crate::{
        host::DummyHost, interpreter::Contract, table::make_instruction_table, InstructionResult,
        Interpreter, InterpreterAction,
    };
    use bytecode::Bytecode;
    use primitives::{hex, Bytes, Env, U256};

    fn run_program(code: &[u8], is_static: bool) -> (Interpreter, InterpreterAction) {
        let contract = Contract {
            bytecode: Bytecode::new_raw(Bytes::copy_from_slice(code)).into_analyzed(),
            ..Default::default()
        };
        let mut interpreter =
            Interpreter::new(contract, 30_000_000, is_static, primitives::SpecId::LATEST);
        let mut host = DummyHost::new(Env::default());
        let table = make_instruction_table::<DummyHost>();
        let action = interpreter.run(&table, &mut host);
        (interpreter, action)
    }

    #[test]
    fn call_surrenders_with_inputs() {
        // PUSH1 0 (out len), PUSH1 0 (out off), PUSH1 0 (in len),
        // PUSH1 0 (in off), PUSH1 0 (value), PUSH1 0xBB (to), PUSH2 0xffff (gas), CALL
        let (interpreter, action) =
            run_program(&hex!("6000600060006000600060bb61fffff1"), false);
        assert_eq!(interpreter.instruction_result, InstructionResult::CallOrCreate);
        let InterpreterAction::Call { inputs } = action else {
            panic!("expected call action, got {action:?}");
        };
        assert_eq!(inputs.target_address, primitives::Address::with_last_byte(0xbb));
        assert_eq!(inputs.gas_limit, 0xffff);
        assert!(inputs.input.is_empty());
        assert!(!inputs.is_static);
    }

    #[test]
    fn call_forwards_at_most_63_64ths() {
        // request far more gas than remains
        // PUSH1 0 x4, PUSH1 0 (value), PUSH1 0xBB, PUSH32 max, CALL
        let (interpreter, action) = run_program(
            &hex!(
                "6000600060006000600060bb"
                "7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
                "f1"
            ),
            false,
        );
        let InterpreterAction::Call { inputs } = action else {
            panic!("expected call action");
        };
        // 7 pushes and the warm call base cost leave 29_999_879 gas; the
        // callee gets 63/64 of that and the caller keeps the rest
        let remaining_before_forward = 30_000_000 - 7 * 3 - 100;
        assert_eq!(
            inputs.gas_limit,
            remaining_before_forward - remaining_before_forward / 64
        );
        assert_eq!(interpreter.gas.remaining(), remaining_before_forward / 64);
    }

    #[test]
    fn call_with_value_in_static_context_fails() {
        // PUSH1 0 x4, PUSH1 1 (value), PUSH1 0xBB, PUSH2 0xffff, CALL
        let (interpreter, _) = run_program(&hex!("6000600060006000600160bb61fffff1"), true);
        assert_eq!(
            interpreter.instruction_result,
            InstructionResult::CallNotAllowedInsideStatic
        );
    }

    #[test]
    fn staticcall_marks_child_static() {
        // PUSH1 0 x4, PUSH1 0xBB, PUSH2 0xffff, STATICCALL
        let (_, action) = run_program(&hex!("6000600060006000" "60bb61ffff" "fa"), false);
        let InterpreterAction::Call { inputs } = action else {
            panic!("expected call action");
        };
        assert!(inputs.is_static);
        assert_eq!(inputs.value.get(), U256::ZERO);
    }

    #[test]
    fn create_surrenders_with_init_code() {
        // PUSH1 0x01, PUSH1 0, MSTORE8, PUSH1 1 (len), PUSH1 0 (offset),
        // PUSH1 0 (value), CREATE
        let (interpreter, action) = run_program(&hex!("600160005360016000" "6000f0"), false);
        assert_eq!(interpreter.instruction_result, InstructionResult::CallOrCreate);
        let InterpreterAction::Create { inputs } = action else {
            panic!("expected create action, got {action:?}");
        };
        assert_eq!(inputs.init_code.as_ref(), &[0x01]);
        assert_eq!(inputs.value, U256::ZERO);
    }

    #[test]
    fn create_in_static_context_fails() {
        let (interpreter, _) = run_program(&hex!("600160006000f0"), true);
        assert_eq!(
            interpreter.instruction_result,
            InstructionResult::StateChangeDuringStaticCall
        );
    }
}
