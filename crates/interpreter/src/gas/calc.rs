use super::constants::*;
use crate::host::{SelfDestructResult, StateLoad};
use primitives::{AccessListItem, SpecId, U256};

/// `const` Option `?`.
macro_rules! tri {
    ($e:expr) => {
        match $e {
            Some(v) => v,
            None => return None,
        }
    };
}

/// `SSTORE` opcode refund calculation.
#[allow(clippy::collapsible_else_if)]
#[inline]
pub fn sstore_refund(spec_id: SpecId, original: U256, current: U256, new: U256) -> i64 {
    if spec_id.is_enabled_in(SpecId::ISTANBUL) {
        // London cut the clearing refund down to the warm reset price
        // plus the access-list key charge (EIP-3529).
        let sstore_clears_schedule = if spec_id.is_enabled_in(SpecId::LONDON) {
            (SSTORE_RESET - COLD_SLOAD_COST + ACCESS_LIST_STORAGE_KEY) as i64
        } else {
            REFUND_SSTORE_CLEARS
        };
        if current == new {
            0
        } else {
            if original == current && new.is_zero() {
                sstore_clears_schedule
            } else {
                let mut refund = 0;

                if !original.is_zero() {
                    if current.is_zero() {
                        refund -= sstore_clears_schedule;
                    } else if new.is_zero() {
                        refund += sstore_clears_schedule;
                    }
                }

                if original == new {
                    let (gas_sstore_reset, gas_sload) = if spec_id.is_enabled_in(SpecId::BERLIN) {
                        (SSTORE_RESET - COLD_SLOAD_COST, WARM_STORAGE_READ_COST)
                    } else {
                        (SSTORE_RESET, sload_cost(spec_id, false))
                    };
                    if original.is_zero() {
                        refund += (SSTORE_SET - gas_sload) as i64;
                    } else {
                        refund += (gas_sstore_reset - gas_sload) as i64;
                    }
                }

                refund
            }
        }
    } else {
        if !current.is_zero() && new.is_zero() {
            REFUND_SSTORE_CLEARS
        } else {
            0
        }
    }
}

/// `CREATE2` opcode cost calculation.
#[inline]
pub const fn create2_cost(len: u64) -> Option<u64> {
    CREATE.checked_add(tri!(cost_per_word(len, KECCAK256WORD)))
}

#[inline]
const fn log2floor(value: U256) -> u64 {
    let mut l: u64 = 256;
    let mut i = 3;
    loop {
        if value.as_limbs()[i] == 0u64 {
            l -= 64;
        } else {
            l -= value.as_limbs()[i].leading_zeros() as u64;
            if l == 0 {
                return l;
            } else {
                return l - 1;
            }
        }
        if i == 0 {
            break;
        }
        i -= 1;
    }
    l
}

/// `EXP` opcode cost calculation.
#[inline]
pub fn exp_cost(spec_id: SpecId, power: U256) -> Option<u64> {
    if power.is_zero() {
        Some(EXP)
    } else {
        // The per-byte price of the exponent went from 10 to 50 with
        // EIP-160.
        let gas_byte = U256::from(if spec_id.is_enabled_in(SpecId::SPURIOUS_DRAGON) {
            50
        } else {
            10
        });
        let gas = U256::from(EXP)
            .checked_add(gas_byte.checked_mul(U256::from(log2floor(power) / 8 + 1))?)?;

        u64::try_from(gas).ok()
    }
}

/// `*COPY` opcodes cost calculation.
#[inline]
pub const fn verylowcopy_cost(len: u64) -> Option<u64> {
    VERYLOW.checked_add(tri!(cost_per_word(len, COPY)))
}

/// `EXTCODECOPY` opcode cost calculation.
#[inline]
pub const fn extcodecopy_cost(spec_id: SpecId, len: u64, is_cold: bool) -> Option<u64> {
    let base_gas = if spec_id.is_enabled_in(SpecId::BERLIN) {
        warm_cold_cost(is_cold)
    } else if spec_id.is_enabled_in(SpecId::TANGERINE) {
        700
    } else {
        20
    };
    base_gas.checked_add(tri!(cost_per_word(len, COPY)))
}

/// `BALANCE` opcode cost calculation.
#[inline]
pub const fn balance_cost(spec_id: SpecId, is_cold: bool) -> u64 {
    if spec_id.is_enabled_in(SpecId::BERLIN) {
        warm_cold_cost(is_cold)
    } else if spec_id.is_enabled_in(SpecId::ISTANBUL) {
        // EIP-1884 repricing
        700
    } else if spec_id.is_enabled_in(SpecId::TANGERINE) {
        400
    } else {
        20
    }
}

/// `EXTCODESIZE` opcode cost calculation.
#[inline]
pub const fn extcodesize_cost(spec_id: SpecId, is_cold: bool) -> u64 {
    if spec_id.is_enabled_in(SpecId::BERLIN) {
        warm_cold_cost(is_cold)
    } else if spec_id.is_enabled_in(SpecId::TANGERINE) {
        700
    } else {
        20
    }
}

/// `EXTCODEHASH` opcode cost calculation (EIP-1052).
#[inline]
pub const fn extcodehash_cost(spec_id: SpecId, is_cold: bool) -> u64 {
    if spec_id.is_enabled_in(SpecId::BERLIN) {
        warm_cold_cost(is_cold)
    } else if spec_id.is_enabled_in(SpecId::ISTANBUL) {
        700
    } else {
        400
    }
}

/// `LOG` opcode cost calculation.
#[inline]
pub const fn log_cost(n: u8, len: u64) -> Option<u64> {
    tri!(LOG.checked_add(tri!(LOGDATA.checked_mul(len)))).checked_add(LOGTOPIC * n as u64)
}

/// `KECCAK256` opcode cost calculation.
#[inline]
pub const fn keccak256_cost(len: u64) -> Option<u64> {
    KECCAK256.checked_add(tri!(cost_per_word(len, KECCAK256WORD)))
}

/// Calculates the cost of a buffer per word.
#[inline]
pub const fn cost_per_word(len: u64, multiple: u64) -> Option<u64> {
    multiple.checked_mul(len.div_ceil(32))
}

/// The EIP-3860 initcode meter: 2 gas per 32-byte word.
///
/// Cannot overflow, as callers cap the initcode length first.
#[inline]
pub const fn initcode_cost(len: u64) -> u64 {
    let Some(cost) = cost_per_word(len, INITCODE_WORD_COST) else {
        panic!("initcode cost overflow")
    };
    cost
}

/// `SLOAD` opcode cost calculation.
#[inline]
pub const fn sload_cost(spec_id: SpecId, is_cold: bool) -> u64 {
    if spec_id.is_enabled_in(SpecId::BERLIN) {
        if is_cold {
            COLD_SLOAD_COST
        } else {
            WARM_STORAGE_READ_COST
        }
    } else if spec_id.is_enabled_in(SpecId::ISTANBUL) {
        // EIP-1884 repricing
        ISTANBUL_SLOAD_GAS
    } else if spec_id.is_enabled_in(SpecId::TANGERINE) {
        // EIP-150 repricing
        200
    } else {
        50
    }
}

/// `SSTORE` opcode cost calculation.
///
/// Returns `None` under EIP-1706 when the remaining gas does not exceed the
/// call stipend.
#[inline]
pub fn sstore_cost(
    spec_id: SpecId,
    original: U256,
    current: U256,
    new: U256,
    gas: u64,
    is_cold: bool,
) -> Option<u64> {
    // EIP-1706: refuse the write when the remaining gas could not even
    // cover a stipend.
    if spec_id.is_enabled_in(SpecId::ISTANBUL) && gas <= CALL_STIPEND {
        return None;
    }

    if spec_id.is_enabled_in(SpecId::BERLIN) {
        let mut gas_cost =
            istanbul_sstore_cost::<WARM_STORAGE_READ_COST, WARM_SSTORE_RESET>(original, current, new);
        if is_cold {
            gas_cost += COLD_SLOAD_COST;
        }
        Some(gas_cost)
    } else if spec_id.is_enabled_in(SpecId::ISTANBUL) {
        Some(istanbul_sstore_cost::<ISTANBUL_SLOAD_GAS, SSTORE_RESET>(
            original, current, new,
        ))
    } else {
        Some(frontier_sstore_cost(current, new))
    }
}

/// EIP-2200 net metering: no-op and dirty writes cost a read, only the
/// first write away from the original value pays the full set/reset price.
#[inline]
fn istanbul_sstore_cost<const SLOAD_GAS: u64, const SSTORE_RESET_GAS: u64>(
    original: U256,
    current: U256,
    new: U256,
) -> u64 {
    if new == current {
        SLOAD_GAS
    } else if original == current && original.is_zero() {
        SSTORE_SET
    } else if original == current {
        SSTORE_RESET_GAS
    } else {
        SLOAD_GAS
    }
}

/// Before net metering there were only two prices: setting a zero slot and
/// everything else.
#[inline]
fn frontier_sstore_cost(current: U256, new: U256) -> u64 {
    if current.is_zero() && !new.is_zero() {
        SSTORE_SET
    } else {
        SSTORE_RESET
    }
}

/// `SELFDESTRUCT` opcode cost calculation.
#[inline]
pub const fn selfdestruct_cost(spec_id: SpecId, res: StateLoad<SelfDestructResult>) -> u64 {
    // Free before the Tangerine repricing, and the Berlin surcharge implies
    // Tangerine, so everything below is gated on it.
    if !spec_id.is_enabled_in(SpecId::TANGERINE) {
        return 0;
    }

    // The new-account topup narrowed with EIP-161: a missing target only
    // costs extra when the destruction actually funds it.
    let funds_new_account = if spec_id.is_enabled_in(SpecId::SPURIOUS_DRAGON) {
        res.data.had_value && !res.data.target_exists
    } else {
        !res.data.target_exists
    };

    let mut gas = 5000;
    if funds_new_account {
        gas += NEWACCOUNT;
    }
    if spec_id.is_enabled_in(SpecId::BERLIN) && res.is_cold {
        gas += COLD_ACCOUNT_ACCESS_COST;
    }
    gas
}

/// Gas cost of the `CALL` family, as the sum of three components: the
/// account access (cold/warm from Berlin), the value-transfer surcharge, and
/// the new-account surcharge.
#[inline]
pub const fn call_cost(
    spec_id: SpecId,
    transfers_value: bool,
    is_cold: bool,
    new_account_accounting: bool,
) -> u64 {
    let access_gas = if spec_id.is_enabled_in(SpecId::BERLIN) {
        warm_cold_cost(is_cold)
    } else if spec_id.is_enabled_in(SpecId::TANGERINE) {
        700
    } else {
        40
    };

    let transfer_gas = if transfers_value { CALLVALUE } else { 0 };

    // Since EIP-161, calling into the void only costs extra when value
    // actually lands there and brings the account to life.
    let new_account_gas = if !new_account_accounting {
        0
    } else if !spec_id.is_enabled_in(SpecId::SPURIOUS_DRAGON) || transfers_value {
        NEWACCOUNT
    } else {
        0
    };

    access_gas + transfer_gas + new_account_gas
}

/// Account access cost under EIP-2929: 2600 on the first touch in a
/// transaction, 100 afterwards.
#[inline]
pub const fn warm_cold_cost(is_cold: bool) -> u64 {
    if is_cold {
        COLD_ACCOUNT_ACCESS_COST
    } else {
        WARM_STORAGE_READ_COST
    }
}

/// Total price of a memory of `num_words` words: `3·w + w²/512`.
///
/// Callers charge the difference between the new and the old total.
#[inline]
pub const fn memory_gas(num_words: usize) -> u64 {
    let num_words = num_words as u64;
    MEMORY
        .saturating_mul(num_words)
        .saturating_add(num_words.saturating_mul(num_words) / 512)
}

/// Initial gas that is deducted for a transaction to be included.
///
/// The initial gas contains the base stipend, the gas for the input data and
/// the access list, and the EIP-3860 initcode meter.
pub fn validate_initial_tx_gas(
    spec_id: SpecId,
    input: &[u8],
    is_create: bool,
    access_list: &[AccessListItem],
) -> u64 {
    let mut initial_gas = 0;
    let zero_data_len = input.iter().filter(|v| **v == 0).count() as u64;
    let non_zero_data_len = input.len() as u64 - zero_data_len;

    // Calldata bytes are priced by content.
    initial_gas += zero_data_len * TRANSACTION_ZERO_DATA;
    // EIP-2028 lowered the non-zero byte price.
    initial_gas += non_zero_data_len
        * if spec_id.is_enabled_in(SpecId::ISTANBUL) {
            TRANSACTION_NON_ZERO_DATA_INIT
        } else {
            TRANSACTION_NON_ZERO_DATA_FRONTIER
        };

    // Every declared address and slot is paid for up front (EIP-2930).
    if spec_id.is_enabled_in(SpecId::BERLIN) {
        let accessed_slots: u64 = access_list
            .iter()
            .map(|item| item.storage_keys.len() as u64)
            .sum();
        initial_gas += access_list.len() as u64 * ACCESS_LIST_ADDRESS;
        initial_gas += accessed_slots * ACCESS_LIST_STORAGE_KEY;
    }

    // Base stipend; creates pay more from Homestead on (EIP-2).
    initial_gas += if is_create && spec_id.is_enabled_in(SpecId::HOMESTEAD) {
        53000
    } else {
        21000
    };

    // Shanghai also meters the initcode itself (EIP-3860).
    if spec_id.is_enabled_in(SpecId::SHANGHAI) && is_create {
        initial_gas += initcode_cost(input.len() as u64)
    }

    initial_gas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sload_repricings() {
        assert_eq!(sload_cost(SpecId::FRONTIER, false), 50);
        assert_eq!(sload_cost(SpecId::TANGERINE, false), 200);
        assert_eq!(sload_cost(SpecId::ISTANBUL, false), 800);
        assert_eq!(sload_cost(SpecId::BERLIN, true), COLD_SLOAD_COST);
        assert_eq!(sload_cost(SpecId::BERLIN, false), WARM_STORAGE_READ_COST);
    }

    #[test]
    fn sstore_net_metering() {
        let spec = SpecId::LATEST;
        let (zero, one, two) = (U256::ZERO, U256::from(1), U256::from(2));
        // fresh zero slot set to non-zero, warm
        assert_eq!(sstore_cost(spec, zero, zero, one, 10_000, false), Some(SSTORE_SET));
        // fresh zero slot set to non-zero, cold surcharge
        assert_eq!(
            sstore_cost(spec, zero, zero, one, 10_000, true),
            Some(SSTORE_SET + COLD_SLOAD_COST)
        );
        // reset of an untouched non-zero slot, warm
        assert_eq!(sstore_cost(spec, one, one, two, 10_000, false), Some(WARM_SSTORE_RESET));
        // no-op writes and dirty writes are priced as a warm read
        assert_eq!(sstore_cost(spec, one, two, two, 10_000, false), Some(WARM_STORAGE_READ_COST));
        assert_eq!(sstore_cost(spec, one, two, one, 10_000, false), Some(WARM_STORAGE_READ_COST));
        // EIP-1706 stipend guard
        assert_eq!(sstore_cost(spec, zero, zero, one, CALL_STIPEND, false), None);
    }

    #[test]
    fn sstore_refund_clearing() {
        let spec = SpecId::LATEST;
        let (zero, one) = (U256::ZERO, U256::from(1));
        // clearing a slot refunds the EIP-3529 schedule
        assert_eq!(sstore_refund(spec, one, one, zero), 4800);
        // un-clearing takes it back
        assert_eq!(sstore_refund(spec, one, zero, one), -4800);
        // restoring the original (zero) value of a freshly set slot
        assert_eq!(
            sstore_refund(spec, zero, one, zero),
            (SSTORE_SET - WARM_STORAGE_READ_COST) as i64
        );
        // pre-Istanbul only clearing refunds
        assert_eq!(sstore_refund(SpecId::BYZANTIUM, one, one, zero), REFUND_SSTORE_CLEARS);
        assert_eq!(sstore_refund(SpecId::BYZANTIUM, one, zero, one), 0);
    }

    #[test]
    fn exp_cost_per_byte_of_exponent() {
        assert_eq!(exp_cost(SpecId::LATEST, U256::ZERO), Some(EXP));
        assert_eq!(exp_cost(SpecId::LATEST, U256::from(255)), Some(EXP + 50));
        assert_eq!(exp_cost(SpecId::LATEST, U256::from(256)), Some(EXP + 100));
        assert_eq!(exp_cost(SpecId::HOMESTEAD, U256::from(256)), Some(EXP + 20));
    }

    #[test]
    fn call_cost_accounting() {
        // warm call with value to an existing account
        assert_eq!(
            call_cost(SpecId::LATEST, true, false, false),
            WARM_STORAGE_READ_COST + CALLVALUE
        );
        // cold call creating a new account
        assert_eq!(
            call_cost(SpecId::LATEST, true, true, true),
            COLD_ACCOUNT_ACCESS_COST + CALLVALUE + NEWACCOUNT
        );
        // after Spurious Dragon, no value means no new-account charge
        assert_eq!(
            call_cost(SpecId::LATEST, false, false, true),
            WARM_STORAGE_READ_COST
        );
        // before Spurious Dragon it is always charged
        assert_eq!(call_cost(SpecId::HOMESTEAD, false, false, true), 40 + NEWACCOUNT);
    }

    #[test]
    fn memory_gas_formula() {
        assert_eq!(memory_gas(0), 0);
        assert_eq!(memory_gas(1), 3);
        assert_eq!(memory_gas(32), 3 * 32 + 32 * 32 / 512);
        assert_eq!(memory_gas(512), 3 * 512 + 512 * 512 / 512);
    }

    #[test]
    fn initial_tx_gas_counts_data() {
        // 2 zero bytes + 2 non-zero bytes
        let input = [0x00, 0x00, 0x01, 0x02];
        assert_eq!(
            validate_initial_tx_gas(SpecId::LATEST, &input, false, &[]),
            21000 + 2 * 4 + 2 * 16
        );
        assert_eq!(
            validate_initial_tx_gas(SpecId::HOMESTEAD, &input, false, &[]),
            21000 + 2 * 4 + 2 * 68
        );
        // create adds the homestead stipend and the initcode meter
        assert_eq!(
            validate_initial_tx_gas(SpecId::LATEST, &input, true, &[]),
            53000 + 2 * 4 + 2 * 16 + initcode_cost(4)
        );
    }
}
