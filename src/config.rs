use clap::Parser;

use crate::decred::Network;
use crate::error::{ConfigError, RecoveryError};
use crate::mnemonic::decode_mnemonic;
use crate::provider::HARDENED_KEY_START;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Backup seed to recover/fix (required)
    #[arg(long = "backupSeed", default_value = "")]
    pub backup_seed: String,

    /// A public address that belongs to the wallet (required)
    #[arg(long = "addr", default_value = "")]
    pub addr: String,

    /// Max number of invalid words, recommended <=2
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub depth: i64,

    /// Max number of addresses per branch to check
    #[arg(long = "addrLimit", default_value_t = 128, allow_negative_numbers = true)]
    pub addr_limit: i64,

    /// Max number of wallet accounts to check
    #[arg(long = "accountLimit", default_value_t = 1, allow_negative_numbers = true)]
    pub account_limit: i64,

    /// Also scan the legacy coin type
    #[arg(long = "allowLegacy")]
    pub allow_legacy: bool,

    /// Network the address belongs to
    #[arg(long, value_enum, default_value_t = Network::MainNet)]
    pub network: Network,

    /// Number of search threads (0 = all available, 1 = sequential)
    #[arg(short, long, default_value_t = 1)]
    pub threads: usize,
}

/// Validated search limits and target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub max_depth: usize,
    pub address_limit: u32,
    pub account_limit: u32,
    pub allow_legacy: bool,
    pub target_address: String,
}

/// Everything needed to start a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepared {
    pub config: SearchConfig,
    /// Decoded backup seed, checksum byte included.
    pub candidate: Vec<u8>,
}

impl Args {
    /// Checks every argument and decodes the backup seed. Rejections are
    /// reported in flag order, before the mnemonic is decoded.
    pub fn validate(&self) -> Result<Prepared, RecoveryError> {
        let backup_seed = self.backup_seed.trim();
        if backup_seed.is_empty() {
            return Err(ConfigError::MissingBackupSeed.into());
        }

        let target_address = self.addr.trim();
        if target_address.is_empty() {
            return Err(ConfigError::MissingAddress.into());
        }

        let max_depth = usize::try_from(self.depth).map_err(|_| ConfigError::NegativeDepth(self.depth))?;
        if self.addr_limit <= 0 {
            return Err(ConfigError::NonPositiveAddressLimit(self.addr_limit).into());
        }
        if self.account_limit <= 0 {
            return Err(ConfigError::NonPositiveAccountLimit(self.account_limit).into());
        }
        let address_limit = index_limit(self.addr_limit).ok_or(ConfigError::AddressLimitTooLarge {
            value: self.addr_limit,
            max: HARDENED_KEY_START,
        })?;
        let account_limit = index_limit(self.account_limit).ok_or(ConfigError::AccountLimitTooLarge {
            value: self.account_limit,
            max: HARDENED_KEY_START,
        })?;

        let words: Vec<&str> = backup_seed.split_whitespace().collect();
        let candidate = decode_mnemonic(&words)?;
        if max_depth > candidate.len() {
            return Err(ConfigError::DepthExceedsSeed {
                depth: max_depth,
                len: candidate.len(),
            }
            .into());
        }

        Ok(Prepared {
            config: SearchConfig {
                max_depth,
                address_limit,
                account_limit,
                allow_legacy: self.allow_legacy,
                target_address: target_address.to_string(),
            },
            candidate,
        })
    }
}

/// Index counts must leave every index below the hardened offset.
fn index_limit(value: i64) -> Option<u32> {
    u32::try_from(value).ok().filter(|&limit| limit <= HARDENED_KEY_START)
}
