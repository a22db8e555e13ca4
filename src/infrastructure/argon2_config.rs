use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::{error::HashError, models::hashed_password::HashedPassword};

/// The three members of the argon2 family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Argon2Variant {
    /// Data-independent memory access, resists side channels
    Argon2i,
    /// Data-dependent memory access, strongest against GPU cracking
    Argon2d,
    /// Hybrid of the two
    #[default]
    Argon2id,
}

impl Argon2Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Argon2i => "argon2i",
            Self::Argon2d => "argon2d",
            Self::Argon2id => "argon2id",
        }
    }

    pub(crate) fn algorithm(&self) -> argon2::Algorithm {
        match self {
            Self::Argon2i => argon2::Algorithm::Argon2i,
            Self::Argon2d => argon2::Algorithm::Argon2d,
            Self::Argon2id => argon2::Algorithm::Argon2id,
        }
    }
}

impl fmt::Display for Argon2Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Argon2Variant {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "argon2i" => Ok(Self::Argon2i),
            "argon2d" => Ok(Self::Argon2d),
            "argon2id" => Ok(Self::Argon2id),
            other => Err(HashError::configuration(
                "argon2 variant",
                format!("expected argon2i, argon2d or argon2id, got {other:?}"),
            )),
        }
    }
}

/// Form in which `Argon2PasswordHasher::hash_with` returns the digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputEncoding {
    /// Lowercase hex of the raw digest
    Hex,
    /// Raw digest bytes
    Binary,
    /// PHC string carrying variant, version, parameters and salt
    #[default]
    Encoded,
}

/// Result of `Argon2PasswordHasher::hash_with`
///
/// Only `Encoded` can be checked later with `verify`; the other two forms carry
/// neither salt nor parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argon2Output {
    Encoded(HashedPassword),
    Hex(String),
    Binary(Vec<u8>),
}

impl Argon2Output {
    pub fn into_encoded(self) -> Option<HashedPassword> {
        match self {
            Self::Encoded(hash) => Some(hash),
            _ => None,
        }
    }
}

pub const DEFAULT_SALT_LENGTH: usize = 32;
pub const DEFAULT_ITERATIONS: u32 = 3;
pub const DEFAULT_PARALLELISM: u32 = 2;
pub const DEFAULT_MEMORY_SIZE: u32 = 4096;
pub const DEFAULT_HASH_LENGTH: usize = 32;

// Bounds imposed by argon2 itself and by the 64-char PHC salt/output limits.
const MIN_SALT_LENGTH: usize = 8;
const MAX_SALT_LENGTH: usize = 48;
const MIN_HASH_LENGTH: usize = 4;
const MAX_HASH_LENGTH: usize = 64;
const MAX_PARALLELISM: u32 = 0x00FF_FFFF;

/// Tunable argon2 parameters
///
/// Carries no salt: a new one is drawn for every hash. To override settings
/// for a single call, build a new value:
///
/// ```
/// use password_handler::Argon2Config;
///
/// let config = Argon2Config {
///     iterations: 4,
///     memory_size: 8192,
///     ..Argon2Config::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Argon2Config {
    /// Salt size in bytes
    pub salt_length: usize,
    /// Number of passes over memory
    pub iterations: u32,
    /// Degree of parallelism (lanes)
    pub parallelism: u32,
    /// Memory in KiB
    pub memory_size: u32,
    /// Digest size in bytes
    pub hash_length: usize,
    pub output: OutputEncoding,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            salt_length: DEFAULT_SALT_LENGTH,
            iterations: DEFAULT_ITERATIONS,
            parallelism: DEFAULT_PARALLELISM,
            memory_size: DEFAULT_MEMORY_SIZE,
            hash_length: DEFAULT_HASH_LENGTH,
            output: OutputEncoding::Encoded,
        }
    }
}

impl Argon2Config {
    pub fn validate(&self) -> Result<(), HashError> {
        if !(MIN_SALT_LENGTH..=MAX_SALT_LENGTH).contains(&self.salt_length) {
            return Err(HashError::configuration(
                "argon2 salt length",
                format!(
                    "must be between {MIN_SALT_LENGTH} and {MAX_SALT_LENGTH} bytes, got {}",
                    self.salt_length
                ),
            ));
        }
        if self.iterations == 0 {
            return Err(HashError::configuration(
                "argon2 iterations",
                "must be at least 1",
            ));
        }
        if !(1..=MAX_PARALLELISM).contains(&self.parallelism) {
            return Err(HashError::configuration(
                "argon2 parallelism",
                format!("must be between 1 and {MAX_PARALLELISM}, got {}", self.parallelism),
            ));
        }
        // argon2 needs at least 8 KiB per lane
        if u64::from(self.memory_size) < 8 * u64::from(self.parallelism) {
            return Err(HashError::configuration(
                "argon2 memory size",
                format!(
                    "must be at least {} KiB for parallelism {}, got {}",
                    8 * u64::from(self.parallelism),
                    self.parallelism,
                    self.memory_size
                ),
            ));
        }
        if !(MIN_HASH_LENGTH..=MAX_HASH_LENGTH).contains(&self.hash_length) {
            return Err(HashError::configuration(
                "argon2 hash length",
                format!(
                    "must be between {MIN_HASH_LENGTH} and {MAX_HASH_LENGTH} bytes, got {}",
                    self.hash_length
                ),
            ));
        }
        Ok(())
    }

    pub(crate) fn params(&self) -> Result<argon2::Params, HashError> {
        argon2::Params::new(
            self.memory_size,
            self.iterations,
            self.parallelism,
            Some(self.hash_length),
        )
        .map_err(|e| HashError::configuration("argon2 parameters", e.to_string()))
    }
}
