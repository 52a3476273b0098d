//! EIP-4844 blob gas math.
//!
//! Only the excess-gas bookkeeping and the gas price exponential live here;
//! the point evaluation precompile is outside this crate.

/// Gas consumed per blob.
pub const GAS_PER_BLOB: u64 = 1 << 17;

/// Target blob gas consumed per block.
pub const TARGET_BLOB_GAS_PER_BLOCK: u64 = 3 * GAS_PER_BLOB;

/// Minimum gas price for a data blob.
pub const MIN_BLOB_GASPRICE: u64 = 1;

/// Controls the update rate of the blob base fee (Cancun value).
pub const BLOB_GASPRICE_UPDATE_FRACTION: u64 = 3338477;

/// Controls the update rate of the blob base fee from Prague (EIP-7691).
pub const BLOB_GASPRICE_UPDATE_FRACTION_PRAGUE: u64 = 5007716;

/// First byte of a versioned blob hash.
pub const VERSIONED_HASH_VERSION_KZG: u8 = 0x01;

/// Calculates the `excess_blob_gas` of the current block from the parent
/// header values, per [EIP-4844](https://eips.ethereum.org/EIPS/eip-4844).
#[inline]
pub const fn calc_excess_blob_gas(
    parent_excess_blob_gas: u64,
    parent_blob_gas_used: u64,
    parent_target_blob_gas_per_block: u64,
) -> u64 {
    (parent_excess_blob_gas + parent_blob_gas_used)
        .saturating_sub(parent_target_blob_gas_per_block)
}

/// Calculates the blob gas price from the block's excess blob gas.
#[inline]
pub fn calc_blob_gasprice(excess_blob_gas: u64, is_prague: bool) -> u128 {
    fake_exponential(
        MIN_BLOB_GASPRICE,
        excess_blob_gas,
        if is_prague {
            BLOB_GASPRICE_UPDATE_FRACTION_PRAGUE
        } else {
            BLOB_GASPRICE_UPDATE_FRACTION
        },
    )
}

/// Approximates `factor * e ** (numerator / denominator)` using Taylor
/// expansion, as prescribed by the EIP pseudocode.
///
/// # Panics
///
/// Panics if `denominator` is zero.
#[inline]
pub fn fake_exponential(factor: u64, numerator: u64, denominator: u64) -> u128 {
    assert_ne!(denominator, 0, "attempt to divide by zero");
    let factor = factor as u128;
    let numerator = numerator as u128;
    let denominator = denominator as u128;

    let mut i = 1;
    let mut output = 0;
    let mut numerator_accum = factor * denominator;
    while numerator_accum > 0 {
        output += numerator_accum;

        // Denominator is asserted as not zero at the start of the function.
        numerator_accum = (numerator_accum * numerator) / (denominator * i);
        i += 1;
    }
    output / denominator
}
