use super::i256::{i256_div, i256_mod};
use crate::{gas, interpreter::Interpreter, Host};
use primitives::U256;

pub fn add<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    popn_top!([op1], op2, interpreter);
    *op2 = op1.wrapping_add(*op2);
}

pub fn mul<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::LOW);
    popn_top!([op1], op2, interpreter);
    *op2 = op1.wrapping_mul(*op2);
}

pub fn sub<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::VERYLOW);
    popn_top!([op1], op2, interpreter);
    *op2 = op1.wrapping_sub(*op2);
}

pub fn div<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::LOW);
    popn_top!([op1], op2, interpreter);
    if !op2.is_zero() {
        *op2 = op1.wrapping_div(*op2);
    }
}

pub fn sdiv<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::LOW);
    popn_top!([op1], op2, interpreter);
    *op2 = i256_div(op1, *op2);
}

pub fn rem<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::LOW);
    popn_top!([op1], op2, interpreter);
    if !op2.is_zero() {
        *op2 = op1.wrapping_rem(*op2);
    }
}

pub fn smod<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::LOW);
    popn_top!([op1], op2, interpreter);
    *op2 = i256_mod(op1, *op2)
}

pub fn addmod<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::MID);
    popn_top!([op1, op2], op3, interpreter);
    *op3 = op1.add_mod(op2, *op3)
}

pub fn mulmod<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::MID);
    popn_top!([op1, op2], op3, interpreter);
    *op3 = op1.mul_mod(op2, *op3)
}

pub fn exp<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    let spec_id = interpreter.spec_id;
    popn_top!([op1], op2, interpreter);
    gas_or_fail!(interpreter, gas::exp_cost(spec_id, *op2));
    *op2 = op1.pow(*op2);
}

/// `SIGNEXTEND` treats the low `ext + 1` bytes of `x` as a signed integer and
/// spreads its sign bit across the rest of the word.
///
/// The sign bit sits at position `8·ext + 7`, counted from the least
/// significant bit, and `2^(8·ext + 7) - 1` masks everything below it. When
/// the sign bit is set the result is `x | !mask` (ones above), otherwise
/// `x & mask` (zeros above). An `ext` of 31 or more means the sign bit is
/// already the top of the word and `x` passes through unchanged.
pub fn signextend<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) {
    gas!(interpreter, gas::LOW);
    popn_top!([ext], x, interpreter);
    // For 31 we also don't need to do anything.
    if ext < U256::from(31) {
        let ext = ext.as_limbs()[0];
        let bit_index = (8 * ext + 7) as usize;
        let bit = x.bit(bit_index);
        let mask = (U256::from(1) << bit_index) - U256::from(1);
        *x = if bit { *x | !mask } else { *x & mask };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{host::DummyHost, interpreter::Contract, table::make_instruction_table};
    use bytecode::Bytecode;
    use primitives::{hex, Bytes, Env};

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
    fn push_push_add() {
        // PUSH1 1, PUSH1 2, ADD
        let interpreter = run_program(&hex!("6001600201"));
        assert_eq!(interpreter.instruction_result, crate::InstructionResult::Stop);
        assert_eq!(interpreter.stack.data(), &vec![U256::from(3)]);
        assert_eq!(interpreter.gas.spent(), 9);
    }

    #[test]
    fn div_by_zero_is_zero() {
        // PUSH1 0, PUSH1 7, DIV ; top = 7 / 0
        let interpreter = run_program(&hex!("6000600704"));
        assert_eq!(interpreter.stack.data(), &vec![U256::ZERO]);

        // PUSH1 0, PUSH1 7, MOD
        let interpreter = run_program(&hex!("6000600706"));
        assert_eq!(interpreter.stack.data(), &vec![U256::ZERO]);

        // PUSH1 0, PUSH1 7, SDIV
        let interpreter = run_program(&hex!("6000600705"));
        assert_eq!(interpreter.stack.data(), &vec![U256::ZERO]);

        // PUSH1 0, PUSH1 7, SMOD
        let interpreter = run_program(&hex!("6000600707"));
        assert_eq!(interpreter.stack.data(), &vec![U256::ZERO]);
    }

    #[test]
    fn signextend_of_byte_zero() {
        // PUSH1 0xFF, PUSH1 0, SIGNEXTEND -> all ones
        let interpreter = run_program(&hex!("60ff60000b"));
        assert_eq!(interpreter.stack.data(), &vec![U256::MAX]);

        // PUSH1 0x7F, PUSH1 0, SIGNEXTEND -> unchanged
        let interpreter = run_program(&hex!("607f60000b"));
        assert_eq!(interpreter.stack.data(), &vec![U256::from(0x7f)]);
    }

    #[test]
    fn addmod_mulmod() {
        // PUSH1 8, PUSH1 9, PUSH1 10, ADDMOD -> (10 + 9) % 8 = 3
        let interpreter = run_program(&hex!("60086009600a08"));
        assert_eq!(interpreter.stack.data(), &vec![U256::from(3)]);

        // PUSH1 8, PUSH1 9, PUSH1 10, MULMOD -> (10 * 9) % 8 = 2
        let interpreter = run_program(&hex!("60086009600a09"));
        assert_eq!(interpreter.stack.data(), &vec![U256::from(2)]);
    }

    #[test]
    fn exp_charges_per_exponent_byte() {
        // PUSH1 2, PUSH1 3, EXP -> 3 ** 2
        let interpreter = run_program(&hex!("600260030a"));
        assert_eq!(interpreter.stack.data(), &vec![U256::from(9)]);
        // 3 + 3 + (10 + 50)
        assert_eq!(interpreter.gas.spent(), 66);
    }
}
