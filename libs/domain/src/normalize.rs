//! Address and transaction-hash normalization helpers (spec §4.5, §4.4.3).

use once_cell::sync::Lazy;
use regex::Regex;

/// Whether a chain's addresses are case-insensitive (Bitcoin, EVM hex chains)
/// or must preserve case (Cardano bech32/Byron, Solana base58). Adapters
/// declare this at registration time; the normalizer itself stays ignorant
/// of chain identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressCasing {
    CaseInsensitive,
    CasePreserving,
}

/// Trim and, depending on `casing`, lowercase an address.
pub fn normalize_address(addr: &str, casing: AddressCasing) -> String {
    let trimmed = addr.trim();
    match casing {
        AddressCasing::CaseInsensitive => trimmed.to_lowercase(),
        AddressCasing::CasePreserving => trimmed.to_string(),
    }
}

static LOG_INDEX_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"-(\d+)$").unwrap());
static HEX_HASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0x[0-9a-f]+$").unwrap());

/// A transaction hash split into its base value and an optional EVM
/// log-index suffix (`0xabc-3` -> base `0xabc`, suffix `Some(3)`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedHash {
    pub base: String,
    pub log_index: Option<u64>,
    pub is_hex: bool,
}

/// Strip a trailing `-<digits>` log-index suffix and classify hex-ness.
///
/// Hex hashes (`^0x[0-9a-f]+$` after lowercasing) are compared
/// case-insensitively; anything else (Solana base58, etc.) is compared
/// exact-case, so the base is left untouched for non-hex input.
///
/// Idempotent: `normalize_hash(normalize_hash(x).base) == normalize_hash(x)`
/// (law L1), and for hex hashes, case is irrelevant to the result (law L2).
pub fn normalize_hash(raw: &str) -> NormalizedHash {
    let trimmed = raw.trim();
    let (base, log_index) = match LOG_INDEX_SUFFIX.captures(trimmed) {
        Some(caps) => {
            let idx_str = caps.get(1).unwrap().as_str();
            let idx = idx_str.parse::<u64>().ok();
            let base = &trimmed[..trimmed.len() - caps.get(0).unwrap().as_str().len()];
            (base.to_string(), idx)
        }
        None => (trimmed.to_string(), None),
    };

    let lowered = base.to_lowercase();
    if HEX_HASH.is_match(&lowered) {
        NormalizedHash {
            base: lowered,
            log_index,
            is_hex: true,
        }
    } else {
        NormalizedHash {
            base,
            log_index,
            is_hex: false,
        }
    }
}

impl NormalizedHash {
    /// Equality under the comparison rule of §4.4.3: hex hashes compare
    /// case-insensitively (already lowercased by `normalize_hash`); non-hex
    /// hashes compare exact-case.
    pub fn bases_equal(&self, other: &NormalizedHash) -> bool {
        self.base == other.base
    }
}
