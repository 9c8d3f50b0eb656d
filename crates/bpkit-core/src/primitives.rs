//! # Format Primitives
//!
//! Fixed constants of the blueprint exchange format and the combinator
//! memory layout. These are compiled in and never change at runtime.

/// Version marker prefixed to every exchange string.
///
/// Strings starting with any other character are decoded as unversioned.
pub const FORMAT_VERSION: char = '0';

/// Value of the `item` discriminator on a blueprint document.
pub const BLUEPRINT_ITEM: &str = "blueprint";

/// Root key holding the blueprint object.
pub const BLUEPRINT_KEY: &str = "blueprint";

/// Number of filter slots in one constant combinator section.
pub const SECTION_CAPACITY: u32 = 1000;

/// Number of quality tiers, and so the number of values packed per signal.
pub const QUALITY_TIERS: u32 = 5;

/// Comparator written on every constant combinator filter.
pub const FILTER_COMPARATOR: &str = "=";

/// Blueprint icons are numbered `1..=MAX_ICONS`.
pub const MAX_ICONS: u8 = 4;

// =============================================================================
// ENTITY NAMES
// =============================================================================

pub const CONSTANT_COMBINATOR: &str = "constant-combinator";
pub const DECIDER_COMBINATOR: &str = "decider-combinator";
pub const ARITHMETIC_COMBINATOR: &str = "arithmetic-combinator";

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length of an exchange string accepted by `decode` (64 MB).
///
/// Checked before any Base64 work is done.
pub const MAX_EXCHANGE_STRING_LEN: usize = 64 * 1024 * 1024;

/// Maximum size of the inflated JSON payload (256 MB).
///
/// A tiny zlib stream can expand without bound; inflation stops at this size.
pub const MAX_INFLATED_SIZE: u64 = 256 * 1024 * 1024;
