//! Backtracking search over byte substitutions.
//!
//! A search at depth `d` chooses `d` strictly increasing positions of the
//! candidate buffer and tries all 256 values at each, in ascending position
//! then ascending value order. Rewriting a byte with its own value is one of
//! the tries, so candidates with fewer than `d` effective changes are reached
//! as well, but no separate pass at a lower depth is made. The first
//! candidate that passes the checksum and owns the target address ends the
//! search.

use std::ops::{Deref, DerefMut};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::checksum::validate_seed;
use crate::ownership::{DerivationPath, Ownership, OwnershipVerifier, ScanFailure};
use crate::progress::ProgressObserver;
use crate::provider::KeyDerivation;

/// Decides whether a checksum-valid seed belongs to the wallet.
pub trait LeafVerifier {
    fn verify(&self, seed: &[u8]) -> Ownership;
}

impl<P: KeyDerivation> LeafVerifier for OwnershipVerifier<P> {
    fn verify(&self, seed: &[u8]) -> Ownership {
        OwnershipVerifier::verify(self, seed)
    }
}

impl<F> LeafVerifier for F
where
    F: Fn(&[u8]) -> Ownership,
{
    fn verify(&self, seed: &[u8]) -> Ownership {
        self(seed)
    }
}

/// Recovered seed, without its checksum byte.
#[derive(Clone, PartialEq, Eq)]
pub struct Seed(Vec<u8>);

impl Seed {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Seed({} bytes)", self.0.len())
    }
}

/// Result of evaluating one fully substituted candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafOutcome {
    Owned(DerivationPath),
    ChecksumFailed,
    NotOwned,
    Rejected(ScanFailure),
}

/// One substituted byte. Dropping it writes the original value back, so the
/// buffer is restored on every exit from a position, including unwinding.
struct Substitution<'a> {
    buffer: &'a mut [u8],
    idx: usize,
    original: u8,
}

impl<'a> Substitution<'a> {
    fn new(buffer: &'a mut [u8], idx: usize) -> Self {
        let original = buffer[idx];
        Self { buffer, idx, original }
    }

    fn set(&mut self, value: u8) {
        self.buffer[self.idx] = value;
    }
}

impl Deref for Substitution<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.buffer
    }
}

impl DerefMut for Substitution<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.buffer
    }
}

impl Drop for Substitution<'_> {
    fn drop(&mut self) {
        self.buffer[self.idx] = self.original;
    }
}

pub struct SeedSearch<'a, V, O: ?Sized> {
    verifier: &'a V,
    observer: &'a O,
}

impl<'a, V, O> SeedSearch<'a, V, O>
where
    V: LeafVerifier,
    O: ProgressObserver + ?Sized,
{
    pub fn new(verifier: &'a V, observer: &'a O) -> Self {
        Self { verifier, observer }
    }

    /// Searches candidates differing from `buffer` in exactly `depth`
    /// positions. `buffer` holds the same bytes again when this returns.
    pub fn find(&self, buffer: &mut [u8], depth: usize) -> Option<Seed> {
        self.search_from(buffer, 0, depth)
    }

    /// Substitutes `remaining_depth` more positions at or after `offset`.
    pub fn search_from(&self, buffer: &mut [u8], offset: usize, remaining_depth: usize) -> Option<Seed> {
        if remaining_depth == 0 {
            return self.leaf(buffer);
        }

        for idx in offset..buffer.len() {
            let mut substitution = Substitution::new(buffer, idx);
            for value in 0..=u8::MAX {
                substitution.set(value);
                if let Some(seed) = self.search_from(&mut substitution, idx + 1, remaining_depth - 1) {
                    return Some(seed);
                }
            }
        }

        None
    }

    /// Same result as [`SeedSearch::find`], with the top-level
    /// `(position, value)` pairs spread over the rayon pool. Each worker
    /// searches its own copy, so `buffer` is never modified.
    pub fn find_parallel(&self, buffer: &[u8], depth: usize) -> Option<Seed>
    where
        V: Sync,
        O: Sync,
    {
        if depth == 0 {
            return self.leaf(buffer);
        }

        let len = buffer.len();
        (0..len * 256).into_par_iter().find_map_first(|item| {
            let (idx, value) = (item / 256, (item % 256) as u8);
            let mut local = buffer.to_vec();
            local[idx] = value;
            self.search_from(&mut local, idx + 1, depth - 1)
        })
    }

    /// Checksum first; only checksum-valid candidates reach the verifier.
    pub fn evaluate(&self, candidate: &[u8]) -> LeafOutcome {
        if !validate_seed(candidate) {
            return LeafOutcome::ChecksumFailed;
        }

        let seed = &candidate[..candidate.len() - 1];
        match self.verifier.verify(seed) {
            Ownership::Owned(path) => LeafOutcome::Owned(path),
            Ownership::NotOwned => LeafOutcome::NotOwned,
            Ownership::Failed(failure) => LeafOutcome::Rejected(failure),
        }
    }

    fn leaf(&self, candidate: &[u8]) -> Option<Seed> {
        match self.evaluate(candidate) {
            LeafOutcome::Owned(path) => {
                info!(%path, "candidate owns the target address");
                return Some(Seed(candidate[..candidate.len() - 1].to_vec()));
            }
            LeafOutcome::ChecksumFailed => {}
            LeafOutcome::NotOwned => debug!("checksum matched, target address not derived"),
            LeafOutcome::Rejected(failure) => {
                warn!(path = %failure.path, error = %failure.source, "key derivation failed, rejecting candidate")
            }
        }

        self.observer.increment();
        None
    }
}
