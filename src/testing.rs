//! Deterministic key provider for exercising the search without elliptic
//! curve arithmetic.

use std::cell::{Cell, RefCell};

use sha2::{Digest, Sha256};

use crate::error::DerivationError;
use crate::ownership::{DerivationPath, PURPOSE};
use crate::provider::{CoinTypes, KeyDerivation, HARDENED_KEY_START};

pub(crate) const FAKE_COIN_TYPES: CoinTypes = CoinTypes {
    legacy: 20,
    slip0044: 42,
};

#[derive(Debug, Clone)]
pub(crate) struct FakeKey {
    tag: String,
    path: Vec<u32>,
}

/// Keys are a hash of the seed plus the child numbers walked so far; the
/// address is their textual form.
#[derive(Default)]
pub(crate) struct FakeKeys {
    fail_at: Option<Vec<u32>>,
    address_calls: Cell<usize>,
    coin_type_derivations: RefCell<Vec<u32>>,
}

impl FakeKeys {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// `child` fails when it would produce the key at `path` (child numbers
    /// with the hardened offset applied).
    pub(crate) fn failing_at(path: Vec<u32>) -> Self {
        Self {
            fail_at: Some(path),
            ..Self::default()
        }
    }

    pub(crate) fn address_calls(&self) -> usize {
        self.address_calls.get()
    }

    /// Coin types derived below the purpose key, in call order.
    pub(crate) fn coin_type_derivations(&self) -> Vec<u32> {
        self.coin_type_derivations.borrow().clone()
    }

    pub(crate) fn address_at(seed: &[u8], path: DerivationPath) -> String {
        let key = FakeKey {
            tag: seed_tag(seed),
            path: vec![
                PURPOSE + HARDENED_KEY_START,
                path.coin_type + HARDENED_KEY_START,
                path.account + HARDENED_KEY_START,
                path.branch.index(),
                path.index,
            ],
        };
        render(&key)
    }
}

fn seed_tag(seed: &[u8]) -> String {
    let digest = Sha256::digest(seed);
    hex::encode(&digest[..8])
}

fn render(key: &FakeKey) -> String {
    let path: Vec<String> = key.path.iter().map(u32::to_string).collect();
    format!("fake:{}:{}", key.tag, path.join("/"))
}

impl KeyDerivation for FakeKeys {
    type Key = FakeKey;

    fn master_key(&self, seed: &[u8]) -> Result<FakeKey, DerivationError> {
        if seed.len() < 16 {
            return Err(DerivationError::InvalidSeedLength {
                len: seed.len(),
                min: 16,
                max: 64,
            });
        }

        Ok(FakeKey {
            tag: seed_tag(seed),
            path: Vec::new(),
        })
    }

    fn child(&self, key: &FakeKey, index: u32, hardened: bool) -> Result<FakeKey, DerivationError> {
        if index >= HARDENED_KEY_START {
            return Err(DerivationError::IndexOutOfRange(index));
        }

        let number = if hardened { index + HARDENED_KEY_START } else { index };
        let mut path = key.path.clone();
        path.push(number);

        if key.path.len() == 1 {
            self.coin_type_derivations.borrow_mut().push(index);
        }
        if self.fail_at.as_ref() == Some(&path) {
            return Err(DerivationError::Provider(format!("injected failure at {path:?}")));
        }

        Ok(FakeKey {
            tag: key.tag.clone(),
            path,
        })
    }

    fn address(&self, key: &FakeKey) -> Result<String, DerivationError> {
        self.address_calls.set(self.address_calls.get() + 1);
        Ok(render(key))
    }

    fn coin_types(&self) -> CoinTypes {
        FAKE_COIN_TYPES
    }
}
