use crate::{gas, interpreter::Interpreter, Host, InstructionResult};
use primitives::U256;

pub fn pop<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::BASE);
    if let Err(result) = interpreter.stack.pop() {
        interpreter.instruction_result = result;
    }
}

/// EIP-3855: PUSH0 instruction
///
/// Introduce a new instruction which pushes the constant value 0 onto the
/// stack.
pub fn push0<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    check!(interpreter, SHANGHAI);
    gas!(interpreter, gas::BASE);
    push!(interpreter, U256::ZERO);
}

pub fn push<const N: usize, H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    // The program counter already points to the first immediate byte, and the
    // analysis padding guarantees all `N` bytes are in bounds.
    let start = interpreter.program_counter;
    let slice = &interpreter.contract.bytecode.bytecode_slice()[start..start + N];
    if let Err(result) = interpreter.stack.push_slice(slice) {
        interpreter.instruction_result = result;
        return;
    }
    interpreter.program_counter += N;
}

pub fn dup<const N: usize, H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    if !interpreter.stack.dup(N) {
        // Distinguish the failure: a full stack overflows, a short one
        // underflows.
        interpreter.instruction_result = if interpreter.stack.len() < N {
            InstructionResult::StackUnderflow
        } else {
            InstructionResult::StackOverflow
        };
    }
}

pub fn swap<const N: usize, H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    if !interpreter.stack.swap(N) {
        interpreter.instruction_result = InstructionResult::StackUnderflow;
    }
}
