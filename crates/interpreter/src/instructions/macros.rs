//! Utility macros to help implementing opcode instruction functions.

/// Fails the instruction if the current call is static.
#[macro_export]
macro_rules! require_non_staticcall {
    ($interpreter:expr) => {
        if $interpreter.is_static {
            $interpreter.instruction_result =
                $crate::InstructionResult::StateChangeDuringStaticCall;
            return;
        }
    };
}

/// Checks if the spec is enabled, and fails the instruction if it is not.
#[macro_export]
macro_rules! check {
    ($interpreter:expr, $min:ident) => {
        if !$interpreter
            .spec_id
            .is_enabled_in(::primitives::SpecId::$min)
        {
            $interpreter.instruction_result = $crate::InstructionResult::NotActivated;
            return;
        }
    };
}

/// Records a `gas` cost and fails the instruction if it would exceed the
/// available gas.
#[macro_export]
macro_rules! gas {
    ($interpreter:expr, $gas:expr) => {
        $crate::gas!($interpreter, $gas, ())
    };
    ($interpreter:expr, $gas:expr, $ret:expr) => {
        if !$interpreter.gas.record_cost($gas) {
            $interpreter.instruction_result = $crate::InstructionResult::OutOfGas;
            return $ret;
        }
    };
}

/// Records a `gas` cost that may have overflowed during calculation, and fails
/// the instruction on overflow or out-of-gas.
#[macro_export]
macro_rules! gas_or_fail {
    ($interpreter:expr, $gas:expr) => {
        $crate::gas_or_fail!($interpreter, $gas, ())
    };
    ($interpreter:expr, $gas:expr, $ret:expr) => {
        match $gas {
            Some(gas_used) => $crate::gas!($interpreter, gas_used, $ret),
            None => {
                $interpreter.instruction_result = $crate::InstructionResult::OutOfGas;
                return $ret;
            }
        }
    };
}

/// Records a gas refund.
#[macro_export]
macro_rules! refund {
    ($interpreter:expr, $gas:expr) => {
        $interpreter.gas.record_refund($gas)
    };
}

/// Resizes the interpreter memory if necessary. Fails the instruction if the
/// memory or gas limit is exceeded.
#[macro_export]
macro_rules! resize_memory {
    ($interpreter:expr, $offset:expr, $len:expr) => {
        $crate::resize_memory!($interpreter, $offset, $len, ())
    };
    ($interpreter:expr, $offset:expr, $len:expr, $ret:expr) => {
        match $crate::interpreter::resize_memory(
            &mut $interpreter.shared_memory,
            &mut $interpreter.gas,
            $offset,
            $len,
        ) {
            $crate::InstructionResult::Continue => {}
            result => {
                $interpreter.instruction_result = result;
                return $ret;
            }
        }
    };
}

/// Pops `n` values from the stack. Fails the instruction if they can't be
/// popped.
#[macro_export]
macro_rules! popn {
    ([ $($x:ident),* ], $interpreter:expr $(, $ret:expr)?) => {
        let Some([$( $x ),*]) = $interpreter.stack.popn() else {
            $interpreter.instruction_result = $crate::InstructionResult::StackUnderflow;
            return $($ret)?;
        };
    };
}

/// Pops `n` values from the stack and returns a mutable reference to the new
/// top. Fails the instruction on underflow.
#[macro_export]
macro_rules! popn_top {
    ([ $($x:ident),* ], $top:ident, $interpreter:expr $(, $ret:expr)?) => {
        let Some(([$( $x ),*], $top)) = $interpreter.stack.popn_top() else {
            $interpreter.instruction_result = $crate::InstructionResult::StackUnderflow;
            return $($ret)?;
        };
    };
}

/// Pushes a `U256` value onto the stack. Fails the instruction if the stack
/// is full.
#[macro_export]
macro_rules! push {
    ($interpreter:expr, $x:expr $(, $ret:expr)?) => {
        if !$interpreter.stack.push($x) {
            $interpreter.instruction_result = $crate::InstructionResult::StackOverflow;
            return $($ret)?;
        }
    };
}

/// Pushes a `B256` value onto the stack, converted to a word. Fails the
/// instruction if the stack is full.
#[macro_export]
macro_rules! push_b256 {
    ($interpreter:expr, $x:expr $(, $ret:expr)?) => {
        $crate::push!(
            $interpreter,
            ::primitives::U256::from_be_bytes($x.0)
            $(, $ret)?
        )
    };
}

/// Converts a `U256` value to a `u64`, saturating to `MAX` if the value is too
/// large.
#[macro_export]
macro_rules! as_u64_saturated {
    ($v:expr) => {
        match $v.as_limbs() {
            x => {
                if (x[1] == 0) & (x[2] == 0) & (x[3] == 0) {
                    x[0]
                } else {
                    u64::MAX
                }
            }
        }
    };
}

/// Converts a `U256` value to a `usize`, saturating to `MAX` if the value is
/// too large.
#[macro_export]
macro_rules! as_usize_saturated {
    ($v:expr) => {
        usize::try_from($crate::as_u64_saturated!($v)).unwrap_or(usize::MAX)
    };
}

/// Converts a `U256` value to a `usize`, failing the instruction if the value
/// is too large.
#[macro_export]
macro_rules! as_usize_or_fail {
    ($interpreter:expr, $v:expr) => {
        $crate::as_usize_or_fail_ret!($interpreter, $v, ())
    };
    ($interpreter:expr, $v:expr, $reason:expr) => {
        $crate::as_usize_or_fail_ret!($interpreter, $v, $reason, ())
    };
}

/// Converts a `U256` value to a `usize` and returns `ret` on failure, setting
/// the given reason.
#[macro_export]
macro_rules! as_usize_or_fail_ret {
    ($interpreter:expr, $v:expr, $ret:expr) => {
        $crate::as_usize_or_fail_ret!(
            $interpreter,
            $v,
            $crate::InstructionResult::InvalidOperandOOG,
            $ret
        )
    };
    ($interpreter:expr, $v:expr, $reason:expr, $ret:expr) => {
        match $v.as_limbs() {
            x => {
                if (x[0] > usize::MAX as u64) | (x[1] != 0) | (x[2] != 0) | (x[3] != 0) {
                    $interpreter.instruction_result = $reason;
                    return $ret;
                }
                x[0] as usize
            }
        }
    };
}
