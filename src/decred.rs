//! BIP32 derivation over secp256k1 with Decred address rendering.

use base58::ToBase58;
use blake_hash::{Blake256, Digest as BlakeDigest};
use clap::ValueEnum;
use hmac::{Hmac, Mac};
use ripemd::Ripemd160;
use secp256k1::{All, PublicKey, Scalar, Secp256k1, SecretKey};
use sha2::{Digest, Sha512};

use crate::error::DerivationError;
use crate::provider::{CoinTypes, KeyDerivation, HARDENED_KEY_START};

type HmacSha512 = Hmac<Sha512>;

const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";
pub const MIN_SEED_BYTES: usize = 16;
pub const MAX_SEED_BYTES: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Network {
    #[value(name = "mainnet")]
    MainNet,
    #[value(name = "testnet")]
    TestNet3,
    #[value(name = "simnet")]
    SimNet,
}

impl Network {
    /// Two-byte prefix of secp256k1 pay-to-pubkey-hash addresses.
    pub fn pubkey_hash_addr_id(self) -> [u8; 2] {
        match self {
            Network::MainNet => [0x07, 0x3f],
            Network::TestNet3 => [0x0f, 0x21],
            Network::SimNet => [0x0e, 0x91],
        }
    }

    pub fn coin_types(self) -> CoinTypes {
        match self {
            Network::MainNet => CoinTypes { legacy: 20, slip0044: 42 },
            Network::TestNet3 => CoinTypes { legacy: 11, slip0044: 1 },
            Network::SimNet => CoinTypes { legacy: 115, slip0044: 1 },
        }
    }
}

/// Extended private key: secret scalar plus chain code.
#[derive(Clone)]
pub struct ExtendedKey {
    secret: SecretKey,
    chain_code: [u8; 32],
    /// Derived keys keep their secret in minimal big-endian form, as dcrd's
    /// `hdkeychain` stores them, so hardened children of a key with leading
    /// zero bytes hash fewer than 32 secret bytes.
    derived: bool,
}

impl ExtendedKey {
    /// Secret bytes as they enter a hardened child's HMAC.
    fn hardened_input(&self) -> Vec<u8> {
        let bytes = self.secret.secret_bytes();
        if !self.derived {
            return bytes.to_vec();
        }
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
        bytes[start..].to_vec()
    }
}

/// Splits an HMAC-SHA512 output into the key material and the chain code.
fn split_hmac_output(output: &[u8]) -> ([u8; 32], [u8; 32]) {
    let mut left = [0u8; 32];
    left.copy_from_slice(&output[..32]);
    let mut chain_code = [0u8; 32];
    chain_code.copy_from_slice(&output[32..]);
    (left, chain_code)
}

impl std::fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtendedKey").finish_non_exhaustive()
    }
}

pub struct DecredKeys {
    network: Network,
    secp: Secp256k1<All>,
}

impl DecredKeys {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            secp: Secp256k1::new(),
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Compressed SEC1 encoding of the public key for `key`.
    pub fn public_key(&self, key: &ExtendedKey) -> [u8; 33] {
        PublicKey::from_secret_key(&self.secp, &key.secret).serialize()
    }
}

impl KeyDerivation for DecredKeys {
    type Key = ExtendedKey;

    fn master_key(&self, seed: &[u8]) -> Result<ExtendedKey, DerivationError> {
        if !(MIN_SEED_BYTES..=MAX_SEED_BYTES).contains(&seed.len()) {
            return Err(DerivationError::InvalidSeedLength {
                len: seed.len(),
                min: MIN_SEED_BYTES,
                max: MAX_SEED_BYTES,
            });
        }

        let mut mac = HmacSha512::new_from_slice(MASTER_HMAC_KEY)
            .map_err(|e| DerivationError::Hmac(e.to_string()))?;
        mac.update(seed);
        let output = mac.finalize().into_bytes();

        let (left, chain_code) = split_hmac_output(&output);
        let secret = SecretKey::from_slice(&left).map_err(|_| DerivationError::UnusableSeed)?;

        Ok(ExtendedKey {
            secret,
            chain_code,
            derived: false,
        })
    }

    fn child(&self, key: &ExtendedKey, index: u32, hardened: bool) -> Result<ExtendedKey, DerivationError> {
        if index >= HARDENED_KEY_START {
            return Err(DerivationError::IndexOutOfRange(index));
        }

        let mut mac = HmacSha512::new_from_slice(&key.chain_code)
            .map_err(|e| DerivationError::Hmac(e.to_string()))?;
        let child_number = if hardened {
            mac.update(&[0u8]);
            mac.update(&key.hardened_input());
            index + HARDENED_KEY_START
        } else {
            mac.update(&self.public_key(key));
            index
        };
        mac.update(&child_number.to_be_bytes());
        let output = mac.finalize().into_bytes();

        let (left, chain_code) = split_hmac_output(&output);
        let unusable = DerivationError::UnusableChild { index: child_number };
        let tweak = Scalar::from_be_bytes(left).map_err(|_| unusable.clone())?;
        let secret = key.secret.add_tweak(&tweak).map_err(|_| unusable)?;

        Ok(ExtendedKey {
            secret,
            chain_code,
            derived: true,
        })
    }

    fn address(&self, key: &ExtendedKey) -> Result<String, DerivationError> {
        let public_key = self.public_key(key);
        let blake = Blake256::digest(&public_key[..]);
        let hash160 = Ripemd160::digest(&blake[..]);

        let mut payload = Vec::with_capacity(2 + 20 + 4);
        payload.extend_from_slice(&self.network.pubkey_hash_addr_id());
        payload.extend_from_slice(&hash160);

        let first = Blake256::digest(&payload[..]);
        let second = Blake256::digest(&first[..]);
        payload.extend_from_slice(&second[..4]);

        Ok(payload.to_base58())
    }

    fn coin_types(&self) -> CoinTypes {
        self.network.coin_types()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derive_path(keys: &DecredKeys, seed: &[u8], path: &[(u32, bool)]) -> ExtendedKey {
        let mut key = keys.master_key(seed).unwrap();
        for &(index, hardened) in path {
            key = keys.child(&key, index, hardened).unwrap();
        }
        key
    }

    // BIP32 test vector 1.
    const VECTOR_SEED: &str = "000102030405060708090a0b0c0d0e0f";

    #[test]
    fn test_bip32_vector_master() {
        let keys = DecredKeys::new(Network::MainNet);
        let seed = hex::decode(VECTOR_SEED).unwrap();
        let key = derive_path(&keys, &seed, &[]);
        assert_eq!(
            hex::encode(keys.public_key(&key)),
            "0339a36013301597daef41fbe593a02cc513d0b55527ec2df1050e2e8ff49c85c2"
        );
    }

    #[test]
    fn test_bip32_vector_hardened_then_normal() {
        let keys = DecredKeys::new(Network::MainNet);
        let seed = hex::decode(VECTOR_SEED).unwrap();

        let hardened = derive_path(&keys, &seed, &[(0, true)]);
        assert_eq!(
            hex::encode(keys.public_key(&hardened)),
            "035a784662a4a20a65bf6aab9ae98a6c068a81c52e4b032c0fb5400c706cfccc56"
        );

        let normal = derive_path(&keys, &seed, &[(0, true), (1, false)]);
        assert_eq!(
            hex::encode(keys.public_key(&normal)),
            "03501e454bf00751f24b1b489aa925215d66af2234e3891c3b21a52bedb3cd711c"
        );

        let deeper = derive_path(&keys, &seed, &[(0, true), (1, false), (2, true)]);
        assert_eq!(
            hex::encode(keys.public_key(&deeper)),
            "0357bfe1e341d01c69fe5654309956cbea516822fba8a601743a012a7896ee8dc2"
        );
    }

    #[test]
    fn test_seed_length_bounds() {
        let keys = DecredKeys::new(Network::MainNet);
        assert!(matches!(
            keys.master_key(&[0u8; 15]),
            Err(DerivationError::InvalidSeedLength { len: 15, .. })
        ));
        assert!(matches!(
            keys.master_key(&[0u8; 65]),
            Err(DerivationError::InvalidSeedLength { len: 65, .. })
        ));
        assert!(keys.master_key(&[0u8; 16]).is_ok());
        assert!(keys.master_key(&[0u8; 64]).is_ok());
    }

    #[test]
    fn test_child_index_must_fit_below_hardened_offset() {
        let keys = DecredKeys::new(Network::MainNet);
        let master = keys.master_key(&[1u8; 32]).unwrap();
        assert_eq!(
            keys.child(&master, HARDENED_KEY_START, false).unwrap_err(),
            DerivationError::IndexOutOfRange(HARDENED_KEY_START)
        );
    }

    #[test]
    fn test_hardened_and_normal_children_differ() {
        let keys = DecredKeys::new(Network::MainNet);
        let master = keys.master_key(&[1u8; 32]).unwrap();
        let hardened = keys.child(&master, 0, true).unwrap();
        let normal = keys.child(&master, 0, false).unwrap();
        assert_ne!(keys.public_key(&hardened), keys.public_key(&normal));
    }

    #[test]
    fn test_address_prefix_follows_network() {
        for (network, prefix) in [
            (Network::MainNet, "Ds"),
            (Network::TestNet3, "Ts"),
            (Network::SimNet, "Ss"),
        ] {
            let keys = DecredKeys::new(network);
            let key = derive_path(&keys, &[0u8; 32], &[(44, true), (0, true), (0, true), (0, false), (0, false)]);
            let address = keys.address(&key).unwrap();
            assert!(address.starts_with(prefix), "{address} does not start with {prefix}");
            assert_eq!(address.len(), 35);
        }
    }

    #[test]
    fn test_address_is_deterministic() {
        let keys = DecredKeys::new(Network::MainNet);
        let first = derive_path(&keys, &[9u8; 32], &[(44, true), (42, true)]);
        let second = derive_path(&keys, &[9u8; 32], &[(44, true), (42, true)]);
        assert_eq!(keys.address(&first).unwrap(), keys.address(&second).unwrap());
    }

    #[test]
    fn test_hardened_child_of_key_with_leading_zero_matches_hdkeychain() {
        let keys = DecredKeys::new(Network::MainNet);
        let mut seed = [0u8; 32];
        seed[28..].copy_from_slice(&271u32.to_be_bytes());

        let purpose = derive_path(&keys, &seed, &[(44, true)]);
        assert_eq!(
            hex::encode(purpose.secret.secret_bytes()),
            "000d5720d9a41cc2bba3bb971c31c635254d7704c119235aecc7e05d060a4f5a"
        );

        let coin_type = keys.child(&purpose, 42, true).unwrap();
        assert_eq!(
            hex::encode(keys.public_key(&coin_type)),
            "03e118e2194dedbd340f6955453679221df166c3926f5948cb49c5116b2e96ff39"
        );

        let address_key = derive_path(&keys, &seed, &[(44, true), (42, true), (0, true), (0, false), (0, false)]);
        assert_eq!(
            hex::encode(keys.public_key(&address_key)),
            "021758706cc1c1f6d4ad1341b1b62c2db144aa26ad42f0eb098711356dfe6e9cce"
        );
        assert_eq!(keys.address(&address_key).unwrap(), "DsYu5zWM5aDHxVhZqTjJxwykfexaKDdyH2C");
    }

    #[test]
    fn test_coin_types() {
        assert_eq!(Network::MainNet.coin_types(), CoinTypes { legacy: 20, slip0044: 42 });
        assert_eq!(DecredKeys::new(Network::TestNet3).coin_types().slip0044, 1);
        assert_eq!(DecredKeys::new(Network::SimNet).network(), Network::SimNet);
    }
}
