//! Capability boundary between the ownership scan and the key derivation
//! backend.

use crate::error::DerivationError;

/// Offset added to an index to request hardened derivation.
pub const HARDENED_KEY_START: u32 = 0x8000_0000;

/// Coin type identifiers a network uses in the `m/44'/<coin type>'` level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoinTypes {
    pub legacy: u32,
    pub slip0044: u32,
}

/// Hierarchical deterministic key derivation bound to one network.
pub trait KeyDerivation {
    type Key;

    /// Builds the root key for `seed`.
    fn master_key(&self, seed: &[u8]) -> Result<Self::Key, DerivationError>;

    /// Derives the child at `index`, hardened or not. `index` must be below
    /// [`HARDENED_KEY_START`].
    fn child(&self, key: &Self::Key, index: u32, hardened: bool) -> Result<Self::Key, DerivationError>;

    /// Renders the pay-to-pubkey-hash address string of `key`.
    fn address(&self, key: &Self::Key) -> Result<String, DerivationError>;

    fn coin_types(&self) -> CoinTypes;
}
