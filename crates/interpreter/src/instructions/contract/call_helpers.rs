use crate::{gas, host::AccountLoad, interpreter::Interpreter, StateLoad};
use core::{cmp::min, ops::Range};
use primitives::{Bytes, SpecId, U256};

/// Pops the four memory arguments of a call, resizes memory for both ranges,
/// and returns the input bytes together with the caller's return window.
#[inline]
pub fn get_memory_input_and_out_ranges(
    interpreter: &mut Interpreter,
) -> Option<(Bytes, Range<usize>)> {
    popn!([in_offset, in_len, out_offset, out_len], interpreter, None);

    let in_range = resize_memory_and_return_range(interpreter, in_offset, in_len)?;

    let mut input = Bytes::new();
    if !in_range.is_empty() {
        input = Bytes::copy_from_slice(
            interpreter
                .shared_memory
                .slice(in_range.start, in_range.len()),
        );
    }

    let ret_range = resize_memory_and_return_range(interpreter, out_offset, out_len)?;
    Some((input, ret_range))
}

/// Resizes memory and returns the range of memory.
///
/// If `len` is 0 memory is not touched, and `usize::MAX` is returned as the
/// offset, so that using the range is certain to be detectable.
#[inline]
pub fn resize_memory_and_return_range(
    interpreter: &mut Interpreter,
    offset: U256,
    len: U256,
) -> Option<Range<usize>> {
    let len = as_usize_or_fail_ret!(interpreter, len, None);
    let offset = if len != 0 {
        let offset = as_usize_or_fail_ret!(interpreter, offset, None);
        resize_memory!(interpreter, offset, len, None);
        offset
    } else {
        usize::MAX // unrealistic value so we are sure it is not used
    };
    Some(offset..offset + len)
}

/// Charges the call base cost and computes the gas forwarded to the callee,
/// applying the EIP-150 63/64 rule.
#[inline]
pub fn calc_call_gas(
    interpreter: &mut Interpreter,
    account_load: StateLoad<AccountLoad>,
    has_transfer: bool,
    new_account_accounting: bool,
    local_gas_limit: u64,
) -> Option<u64> {
    let call_cost = gas::call_cost(
        interpreter.spec_id,
        has_transfer,
        account_load.is_cold,
        new_account_accounting && account_load.data.is_empty,
    );
    gas!(interpreter, call_cost, None);

    // Since Tangerine a call can forward at most 63/64 of what remains
    // (EIP-150), however much it asked for.
    let gas_limit = if interpreter.spec_id.is_enabled_in(SpecId::TANGERINE) {
        min(interpreter.gas.remaining_63_of_64_parts(), local_gas_limit)
    } else {
        local_gas_limit
    };

    Some(gas_limit)
}
