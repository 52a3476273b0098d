//! EVM gas calculation utilities.

mod calc;
mod constants;

pub use calc::*;
pub use constants::*;

/// Tracks the gas of one frame: the limit, what remains, and the refund
/// accumulator settled at transaction end.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gas {
    /// Gas limit the frame started with; never changes.
    limit: u64,
    /// The remaining gas.
    remaining: u64,
    /// Refunded gas. This is used only at the end of execution.
    refunded: i64,
    /// Memoisation of values for memory expansion cost.
    memory: MemoryGas,
}

impl Gas {
    /// Creates a new `Gas` struct with the given gas limit.
    #[inline]
    pub const fn new(limit: u64) -> Self {
        Self {
            limit,
            remaining: limit,
            refunded: 0,
            memory: MemoryGas::new(),
        }
    }

    /// Creates a new `Gas` struct with the given gas limit, but without any
    /// gas remaining.
    #[inline]
    pub const fn new_spent(limit: u64) -> Self {
        Self {
            limit,
            remaining: 0,
            refunded: 0,
            memory: MemoryGas::new(),
        }
    }

    /// Returns the gas limit.
    #[inline]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Returns the total amount of gas that was refunded.
    #[inline]
    pub const fn refunded(&self) -> i64 {
        self.refunded
    }

    /// Returns the total amount of gas spent.
    #[inline]
    pub const fn spent(&self) -> u64 {
        self.limit - self.remaining
    }

    /// Returns the amount of gas remaining.
    #[inline]
    pub const fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Returns the remaining gas after subtracting the 1/64th part, per the
    /// EIP-150 forwarding rule.
    #[inline]
    pub const fn remaining_63_of_64_parts(&self) -> u64 {
        self.remaining - self.remaining / 64
    }

    /// Erases a gas cost from the totals, crediting back unused gas of a
    /// finished subcall.
    #[inline]
    pub fn erase_cost(&mut self, returned: u64) {
        self.remaining += returned;
    }

    /// Spends all remaining gas.
    #[inline]
    pub fn spend_all(&mut self) {
        self.remaining = 0;
    }

    /// Records a refund value.
    ///
    /// `refund` can be negative but `self.refunded` should always be positive
    /// at the end of a transaction.
    #[inline]
    pub fn record_refund(&mut self, refund: i64) {
        self.refunded += refund;
    }

    /// Sets a refund value for the final refund.
    ///
    /// The max refund value is limited to the Nth part (depending on the fork)
    /// of the gas spent, per EIP-3529.
    #[inline]
    pub fn set_final_refund(&mut self, is_london: bool) {
        let max_refund_quotient = if is_london { 5 } else { 2 };
        self.refunded = (self.refunded() as u64).min(self.spent() / max_refund_quotient) as i64;
    }

    /// Sets a refund value, overriding the current one.
    #[inline]
    pub fn set_refund(&mut self, refund: i64) {
        self.refunded = refund;
    }

    /// Records an explicit cost.
    ///
    /// Returns `false` if the gas limit is exceeded; in that case no gas is
    /// deducted.
    #[inline]
    #[must_use = "prefer using `gas!` instead to return an out-of-gas error on failure"]
    pub fn record_cost(&mut self, cost: u64) -> bool {
        if let Some(new_remaining) = self.remaining.checked_sub(cost) {
            self.remaining = new_remaining;
            return true;
        }
        false
    }

    /// Records the gas cost of growing memory to `new_len` words.
    #[inline]
    #[must_use = "internally uses record_cost that flags out of gas error"]
    pub fn record_memory_expansion(&mut self, new_words: usize) -> MemoryExtensionResult {
        let Some(additional_cost) = self.memory.record_new_len(new_words) else {
            return MemoryExtensionResult::Same;
        };

        if !self.record_cost(additional_cost) {
            return MemoryExtensionResult::OutOfGas;
        }

        MemoryExtensionResult::Extended
    }
}

/// Result of attempting to record a memory expansion.
pub enum MemoryExtensionResult {
    /// Memory was extended.
    Extended,
    /// Memory size stayed the same.
    Same,
    /// Not enough gas to extend memory.
    OutOfGas,
}

/// Utility struct that speeds up the calculation of memory expansion costs.
///
/// Holds the current memory word count and its total expansion cost so that
/// only the delta has to be charged.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryGas {
    /// Current memory length in words.
    pub words_num: usize,
    /// Current memory expansion cost.
    pub expansion_cost: u64,
}

impl MemoryGas {
    /// New zero-length memory cost tracker.
    pub const fn new() -> Self {
        Self {
            words_num: 0,
            expansion_cost: 0,
        }
    }

    /// Records a new memory word count, returning the additional cost if the
    /// memory grew.
    #[inline]
    pub fn record_new_len(&mut self, new_num: usize) -> Option<u64> {
        if new_num <= self.words_num {
            return None;
        }
        self.words_num = new_num;
        let mut cost = crate::gas::calc::memory_gas(new_num);
        core::mem::swap(&mut self.expansion_cost, &mut cost);
        // `cost` holds the previous (smaller) total after the swap.
        Some(self.expansion_cost - cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_cost_fails_on_underflow_without_deducting() {
        let mut gas = Gas::new(100);
        assert!(gas.record_cost(60));
        assert_eq!(gas.remaining(), 40);
        assert!(!gas.record_cost(41));
        assert_eq!(gas.remaining(), 40);
        assert_eq!(gas.spent(), 60);
    }

    #[test]
    fn memory_expansion_charges_delta_only() {
        let mut gas = Gas::new(10_000);
        // 1 word: 3 * 1 + 1 * 1 / 512 = 3
        assert!(matches!(
            gas.record_memory_expansion(1),
            MemoryExtensionResult::Extended
        ));
        assert_eq!(gas.spent(), 3);
        // same length again is free
        assert!(matches!(
            gas.record_memory_expansion(1),
            MemoryExtensionResult::Same
        ));
        assert_eq!(gas.spent(), 3);
        // 32 words: 3 * 32 + 32 * 32 / 512 = 98, delta 95
        assert!(matches!(
            gas.record_memory_expansion(32),
            MemoryExtensionResult::Extended
        ));
        assert_eq!(gas.spent(), 98);
    }

    #[test]
    fn final_refund_is_capped() {
        let mut gas = Gas::new(100);
        let _ = gas.record_cost(100);
        gas.record_refund(1000);
        gas.set_final_refund(true);
        assert_eq!(gas.refunded(), 20);

        let mut gas = Gas::new(100);
        let _ = gas.record_cost(100);
        gas.record_refund(1000);
        gas.set_final_refund(false);
        assert_eq!(gas.refunded(), 50);
    }

    #[test]
    fn erase_cost_credits_back() {
        let mut gas = Gas::new(100);
        let _ = gas.record_cost(50);
        gas.erase_cost(30);
        assert_eq!(gas.remaining(), 80);
        assert_eq!(gas.spent(), 20);
    }
}
