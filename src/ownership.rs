//! Decides whether a candidate seed belongs to the wallet that owns the
//! target address, by walking the BIP44 hierarchy
//! `m/44'/<coin type>'/<account>'/<branch>/<address index>`.

use std::fmt;

use thiserror::Error;

use crate::config::SearchConfig;
use crate::error::DerivationError;
use crate::provider::KeyDerivation;

pub const PURPOSE: u32 = 44;

/// Address branch below an account key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    External = 0,
    Internal = 1,
}

impl Branch {
    /// Scan order: receiving addresses before change addresses.
    pub const ALL: [Branch; 2] = [Branch::External, Branch::Internal];

    pub fn index(self) -> u32 {
        self as u32
    }
}

/// Full path of one address key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivationPath {
    pub coin_type: u32,
    pub account: u32,
    pub branch: Branch,
    pub index: u32,
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "m/{}'/{}'/{}'/{}/{}",
            PURPOSE,
            self.coin_type,
            self.account,
            self.branch.index(),
            self.index
        )
    }
}

/// A derivation or address rendering failure and the path it happened at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("derivation failed at {path}: {source}")]
pub struct ScanFailure {
    pub path: String,
    #[source]
    pub source: DerivationError,
}

impl ScanFailure {
    fn new(path: impl Into<String>, source: DerivationError) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ownership {
    Owned(DerivationPath),
    NotOwned,
    /// Any failure ends the scan of the candidate; nothing after it is tried.
    Failed(ScanFailure),
}

pub struct OwnershipVerifier<P> {
    provider: P,
    config: SearchConfig,
}

impl<P: KeyDerivation> OwnershipVerifier<P> {
    pub fn new(provider: P, config: SearchConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Scans the slip0044 coin type, then the legacy one when allowed, and
    /// stops at the first address equal to the target.
    pub fn verify(&self, seed: &[u8]) -> Ownership {
        match self.scan(seed) {
            Ok(Some(path)) => Ownership::Owned(path),
            Ok(None) => Ownership::NotOwned,
            Err(failure) => Ownership::Failed(failure),
        }
    }

    fn scan(&self, seed: &[u8]) -> Result<Option<DerivationPath>, ScanFailure> {
        let master = self.provider.master_key(seed).map_err(|source| ScanFailure::new("m", source))?;
        let coin_types = self.provider.coin_types();

        if let Some(path) = self.scan_coin_type(&master, coin_types.slip0044)? {
            return Ok(Some(path));
        }

        if self.config.allow_legacy {
            return self.scan_coin_type(&master, coin_types.legacy);
        }

        Ok(None)
    }

    fn scan_coin_type(&self, master: &P::Key, coin_type: u32) -> Result<Option<DerivationPath>, ScanFailure> {
        let purpose_key = self
            .provider
            .child(master, PURPOSE, true)
            .map_err(|source| ScanFailure::new(format!("m/{PURPOSE}'"), source))?;
        let coin_type_key = self
            .provider
            .child(&purpose_key, coin_type, true)
            .map_err(|source| ScanFailure::new(format!("m/{PURPOSE}'/{coin_type}'"), source))?;

        for account in 0..self.config.account_limit {
            let account_key = self
                .provider
                .child(&coin_type_key, account, true)
                .map_err(|source| ScanFailure::new(format!("m/{PURPOSE}'/{coin_type}'/{account}'"), source))?;

            for branch in Branch::ALL {
                let branch_key = self
                    .provider
                    .child(&account_key, branch.index(), false)
                    .map_err(|source| {
                        let path = format!("m/{PURPOSE}'/{coin_type}'/{account}'/{}", branch.index());
                        ScanFailure::new(path, source)
                    })?;

                let path = DerivationPath {
                    coin_type,
                    account,
                    branch,
                    index: 0,
                };
                if let Some(path) = self.scan_branch(&branch_key, path)? {
                    return Ok(Some(path));
                }
            }
        }

        Ok(None)
    }

    fn scan_branch(&self, branch_key: &P::Key, path: DerivationPath) -> Result<Option<DerivationPath>, ScanFailure> {
        for index in 0..self.config.address_limit {
            let path = DerivationPath { index, ..path };
            let address_key = self
                .provider
                .child(branch_key, index, false)
                .map_err(|source| ScanFailure::new(path.to_string(), source))?;
            let address = self
                .provider
                .address(&address_key)
                .map_err(|source| ScanFailure::new(path.to_string(), source))?;

            if address == self.config.target_address {
                return Ok(Some(path));
            }
        }

        Ok(None)
    }
}
