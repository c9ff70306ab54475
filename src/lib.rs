//! Repairs a Decred wallet seed mnemonic that has a few wrong words.
//!
//! The decoded mnemonic bytes are searched for substitutions that satisfy the
//! embedded checksum and derive a known wallet address.

pub mod checksum;
pub mod combinatorics;
pub mod config;
pub mod decred;
pub mod error;
pub mod mnemonic;
pub mod ownership;
pub mod progress;
pub mod provider;
pub mod search;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Args, Prepared, SearchConfig};
pub use decred::{DecredKeys, Network};
pub use error::{ConfigError, DecodeError, DerivationError, RecoveryError};
pub use ownership::{DerivationPath, Ownership, OwnershipVerifier};
pub use progress::ProgressObserver;
pub use search::{LeafVerifier, Seed, SeedSearch};

use combinatorics::count_iterations;

pub type DecredVerifier = OwnershipVerifier<DecredKeys>;

/// Sizes the observer, searches on the calling thread and marks the
/// observer complete. `candidate` is restored before this returns.
pub fn recover<V, O>(candidate: &mut [u8], depth: usize, verifier: &V, observer: &O) -> Option<Seed>
where
    V: LeafVerifier,
    O: ProgressObserver + ?Sized,
{
    observer.set_total(count_iterations(candidate.len(), depth));
    let found = SeedSearch::new(verifier, observer).find(candidate, depth);
    observer.complete();
    found
}

/// Like [`recover`], on the current rayon pool. Returns the same seed the
/// sequential search would.
pub fn recover_parallel<V, O>(candidate: &[u8], depth: usize, verifier: &V, observer: &O) -> Option<Seed>
where
    V: LeafVerifier + Sync,
    O: ProgressObserver + Sync + ?Sized,
{
    observer.set_total(count_iterations(candidate.len(), depth));
    let found = SeedSearch::new(verifier, observer).find_parallel(candidate, depth);
    observer.complete();
    found
}
