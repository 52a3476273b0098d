//! Hardfork identifiers and the ordering predicate that gates per-fork
//! behavior throughout the interpreter and the journal.
#![allow(non_camel_case_types)]

use core::str::FromStr;
pub use SpecId::*;

/// Specification IDs and their activation block.
///
/// Information was obtained from the [Ethereum Execution Specifications](https://github.com/ethereum/execution-specs).
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, enumn::N)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpecId {
    /// Frontier hard fork
    FRONTIER = 0,
    /// Frontier Thawing hard fork
    FRONTIER_THAWING,
    /// Homestead hard fork
    HOMESTEAD,
    /// DAO Fork hard fork
    DAO_FORK,
    /// Tangerine Whistle hard fork
    TANGERINE,
    /// Spurious Dragon hard fork
    SPURIOUS_DRAGON,
    /// Byzantium hard fork
    BYZANTIUM,
    /// Constantinople hard fork is overwritten with PETERSBURG
    CONSTANTINOPLE,
    /// Petersburg hard fork
    PETERSBURG,
    /// Istanbul hard fork
    ISTANBUL,
    /// Muir Glacier hard fork
    MUIR_GLACIER,
    /// Berlin hard fork
    BERLIN,
    /// London hard fork
    LONDON,
    /// Arrow Glacier hard fork
    ARROW_GLACIER,
    /// Gray Glacier hard fork
    GRAY_GLACIER,
    /// Paris/Merge hard fork
    MERGE,
    /// Shanghai hard fork
    SHANGHAI,
    /// Cancun hard fork
    CANCUN,
    /// Prague hard fork
    PRAGUE,
    /// Latest known hard fork
    #[default]
    LATEST = u8::MAX,
}

impl SpecId {
    /// Returns the [`SpecId`] for the given [`u8`], or `None` if the tag does
    /// not name a known fork.
    #[inline]
    pub fn try_from_u8(spec_id: u8) -> Option<Self> {
        Self::n(spec_id)
    }

    /// Returns `true` if the given specification ID is enabled in this spec.
    #[inline]
    pub const fn is_enabled_in(self, other: Self) -> bool {
        self as u8 >= other as u8
    }
}

/// Optimism specification IDs.
///
/// The L2 forks interleave with the Ethereum hardforks; the core treats this
/// enum as orthogonal metadata and [`OpSpecId::into_eth_spec`] yields the
/// equivalent Ethereum fork for gas and feature gating.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, enumn::N)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpSpecId {
    /// Bedrock (Merge-equivalent)
    BEDROCK = 100,
    /// Regolith
    REGOLITH,
    /// Canyon (Shanghai-equivalent)
    CANYON,
    /// Ecotone (Cancun-equivalent)
    ECOTONE,
    /// Latest known optimism fork
    #[default]
    LATEST = u8::MAX,
}

impl OpSpecId {
    /// Converts the [`OpSpecId`] into a [`SpecId`].
    pub const fn into_eth_spec(self) -> SpecId {
        match self {
            Self::BEDROCK | Self::REGOLITH => SpecId::MERGE,
            Self::CANYON => SpecId::SHANGHAI,
            Self::ECOTONE => SpecId::CANCUN,
            Self::LATEST => SpecId::LATEST,
        }
    }

    /// Returns `true` if the given specification ID is enabled in this spec.
    #[inline]
    pub const fn is_enabled_in(self, other: Self) -> bool {
        self as u8 >= other as u8
    }
}

/// String identifiers for hardforks.
pub mod name {
    /// String identifier for the Frontier hardfork
    pub const FRONTIER: &str = "Frontier";
    /// String identifier for the Frontier Thawing hardfork
    pub const FRONTIER_THAWING: &str = "Frontier Thawing";
    /// String identifier for the Homestead hardfork
    pub const HOMESTEAD: &str = "Homestead";
    /// String identifier for the DAO Fork hardfork
    pub const DAO_FORK: &str = "DAO Fork";
    /// String identifier for the Tangerine Whistle hardfork
    pub const TANGERINE: &str = "Tangerine";
    /// String identifier for the Spurious Dragon hardfork
    pub const SPURIOUS_DRAGON: &str = "Spurious";
    /// String identifier for the Byzantium hardfork
    pub const BYZANTIUM: &str = "Byzantium";
    /// String identifier for the Constantinople hardfork
    pub const CONSTANTINOPLE: &str = "Constantinople";
    /// String identifier for the Petersburg hardfork
    pub const PETERSBURG: &str = "Petersburg";
    /// String identifier for the Istanbul hardfork
    pub const ISTANBUL: &str = "Istanbul";
    /// String identifier for the Muir Glacier hardfork
    pub const MUIR_GLACIER: &str = "MuirGlacier";
    /// String identifier for the Berlin hardfork
    pub const BERLIN: &str = "Berlin";
    /// String identifier for the London hardfork
    pub const LONDON: &str = "London";
    /// String identifier for the Arrow Glacier hardfork
    pub const ARROW_GLACIER: &str = "Arrow Glacier";
    /// String identifier for the Gray Glacier hardfork
    pub const GRAY_GLACIER: &str = "Gray Glacier";
    /// String identifier for the Paris/Merge hardfork
    pub const MERGE: &str = "Merge";
    /// String identifier for the Shanghai hardfork
    pub const SHANGHAI: &str = "Shanghai";
    /// String identifier for the Cancun hardfork
    pub const CANCUN: &str = "Cancun";
    /// String identifier for the Prague hardfork
    pub const PRAGUE: &str = "Prague";
    /// String identifier for the latest hardfork
    pub const LATEST: &str = "Latest";
}

/// Error type for unknown hardfork names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnknownHardfork;

impl FromStr for SpecId {
    type Err = UnknownHardfork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            name::FRONTIER => Ok(Self::FRONTIER),
            name::FRONTIER_THAWING => Ok(Self::FRONTIER_THAWING),
            name::HOMESTEAD => Ok(Self::HOMESTEAD),
            name::DAO_FORK => Ok(Self::DAO_FORK),
            name::TANGERINE => Ok(Self::TANGERINE),
            name::SPURIOUS_DRAGON => Ok(Self::SPURIOUS_DRAGON),
            name::BYZANTIUM => Ok(Self::BYZANTIUM),
            name::CONSTANTINOPLE => Ok(Self::CONSTANTINOPLE),
            name::PETERSBURG => Ok(Self::PETERSBURG),
            name::ISTANBUL => Ok(Self::ISTANBUL),
            name::MUIR_GLACIER => Ok(Self::MUIR_GLACIER),
            name::BERLIN => Ok(Self::BERLIN),
            name::LONDON => Ok(Self::LONDON),
            name::ARROW_GLACIER => Ok(Self::ARROW_GLACIER),
            name::GRAY_GLACIER => Ok(Self::GRAY_GLACIER),
            name::MERGE => Ok(Self::MERGE),
            name::SHANGHAI => Ok(Self::SHANGHAI),
            name::CANCUN => Ok(Self::CANCUN),
            name::PRAGUE => Ok(Self::PRAGUE),
            name::LATEST => Ok(Self::LATEST),
            _ => Err(UnknownHardfork),
        }
    }
}

impl From<SpecId> for &'static str {
    fn from(spec_id: SpecId) -> Self {
        match spec_id {
            SpecId::FRONTIER => name::FRONTIER,
            SpecId::FRONTIER_THAWING => name::FRONTIER_THAWING,
            SpecId::HOMESTEAD => name::HOMESTEAD,
            SpecId::DAO_FORK => name::DAO_FORK,
            SpecId::TANGERINE => name::TANGERINE,
            SpecId::SPURIOUS_DRAGON => name::SPURIOUS_DRAGON,
            SpecId::BYZANTIUM => name::BYZANTIUM,
            SpecId::CONSTANTINOPLE => name::CONSTANTINOPLE,
            SpecId::PETERSBURG => name::PETERSBURG,
            SpecId::ISTANBUL => name::ISTANBUL,
            SpecId::MUIR_GLACIER => name::MUIR_GLACIER,
            SpecId::BERLIN => name::BERLIN,
            SpecId::LONDON => name::LONDON,
            SpecId::ARROW_GLACIER => name::ARROW_GLACIER,
            SpecId::GRAY_GLACIER => name::GRAY_GLACIER,
            SpecId::MERGE => name::MERGE,
            SpecId::SHANGHAI => name::SHANGHAI,
            SpecId::CANCUN => name::CANCUN,
            SpecId::PRAGUE => name::PRAGUE,
            SpecId::LATEST => name::LATEST,
        }
    }
}

impl core::fmt::Display for SpecId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", <&'static str>::from(*self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabled_matches_declaration_order() {
        assert!(SpecId::LONDON.is_enabled_in(SpecId::BERLIN));
        assert!(SpecId::LONDON.is_enabled_in(SpecId::LONDON));
        assert!(!SpecId::BERLIN.is_enabled_in(SpecId::LONDON));
        assert!(SpecId::LATEST.is_enabled_in(SpecId::PRAGUE));
        assert!(!SpecId::FRONTIER.is_enabled_in(SpecId::HOMESTEAD));
    }

    #[test]
    fn parse_u8_round_trips() {
        for spec in [FRONTIER, TANGERINE, BERLIN, CANCUN, LATEST] {
            assert_eq!(SpecId::try_from_u8(spec as u8), Some(spec));
        }
        assert_eq!(SpecId::try_from_u8(0x42), None);
    }

    #[test]
    fn op_spec_maps_to_eth_spec() {
        assert_eq!(OpSpecId::BEDROCK.into_eth_spec(), SpecId::MERGE);
        assert_eq!(OpSpecId::CANYON.into_eth_spec(), SpecId::SHANGHAI);
        assert_eq!(OpSpecId::ECOTONE.into_eth_spec(), SpecId::CANCUN);
        assert!(OpSpecId::ECOTONE.is_enabled_in(OpSpecId::REGOLITH));
    }
}
