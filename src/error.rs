use thiserror::Error;

/// Errors raised before a search starts; nothing is searched once one occurs.
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Rejected command-line arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Please specify backupSeed")]
    MissingBackupSeed,

    #[error("Please specify addr")]
    MissingAddress,

    #[error("depth must be non negative number, got {0}")]
    NegativeDepth(i64),

    #[error("addrLimit must be positive number, got {0}")]
    NonPositiveAddressLimit(i64),

    #[error("accountLimit must be positive number, got {0}")]
    NonPositiveAccountLimit(i64),

    #[error("addrLimit must not exceed {max}, got {value}")]
    AddressLimitTooLarge { value: i64, max: u32 },

    #[error("accountLimit must not exceed {max}, got {value}")]
    AccountLimitTooLarge { value: i64, max: u32 },

    #[error("depth {depth} exceeds the {len} bytes decoded from backupSeed")]
    DepthExceedsSeed { depth: usize, len: usize },
}

/// A backup seed that does not decode with the PGP word list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("word {word} is not in the PGP word list")]
    UnknownWord { word: String },

    #[error("word {word} is not valid at position {position}, check for missing words")]
    MisplacedWord { word: String, position: usize },
}

/// Failure while deriving a key or rendering an address for one candidate.
///
/// Never fatal to a run: the candidate is treated as not owning the target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DerivationError {
    #[error("seed length {len} is outside the accepted range of {min} to {max} bytes")]
    InvalidSeedLength { len: usize, min: usize, max: usize },

    #[error("seed produces an unusable master key")]
    UnusableSeed,

    #[error("child index {0} is out of range")]
    IndexOutOfRange(u32),

    #[error("child {index} produces an unusable key")]
    UnusableChild { index: u32 },

    #[error("HMAC key rejected: {0}")]
    Hmac(String),

    #[error("key provider error: {0}")]
    Provider(String),
}
