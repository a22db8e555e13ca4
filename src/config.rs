use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    domain::{error::HashError, services::password_service::PasswordHasher},
    infrastructure::{
        argon2_config::{Argon2Config, Argon2Variant},
        argon2_password_hasher::Argon2PasswordHasher,
        bcrypt_password_hasher::{self, BcryptPasswordHasher},
    },
    usecase::password_handler::PasswordHandler,
};

pub const PASSWORD_HASHER: &str = "PASSWORD_HASHER";
pub const BCRYPT_COST: &str = "BCRYPT_COST";
pub const ARGON2_ITERATIONS: &str = "ARGON2_ITERATIONS";
pub const ARGON2_PARALLELISM: &str = "ARGON2_PARALLELISM";
pub const ARGON2_MEMORY_KIB: &str = "ARGON2_MEMORY_KIB";
pub const ARGON2_HASH_LENGTH: &str = "ARGON2_HASH_LENGTH";
pub const ARGON2_SALT_LENGTH: &str = "ARGON2_SALT_LENGTH";
pub const PASSWORD_PEPPER: &str = "PASSWORD_PEPPER";

/// Algorithm selected by the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HasherKind {
    Bcrypt,
    Argon2i,
    Argon2d,
    #[default]
    Argon2id,
}

impl FromStr for HasherKind {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bcrypt" => Ok(Self::Bcrypt),
            other => match other.parse::<Argon2Variant>() {
                Ok(Argon2Variant::Argon2i) => Ok(Self::Argon2i),
                Ok(Argon2Variant::Argon2d) => Ok(Self::Argon2d),
                Ok(Argon2Variant::Argon2id) => Ok(Self::Argon2id),
                Err(_) => Err(HashError::configuration(
                    "password hasher",
                    format!("expected bcrypt, argon2i, argon2d or argon2id, got {other:?}"),
                )),
            },
        }
    }
}

/// Operator configuration for the password hasher
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HasherSettings {
    pub algorithm: HasherKind,
    pub bcrypt_cost: u32,
    pub argon2: Argon2Config,
    /// Pepper mixed into argon2 hashes
    #[serde(skip_serializing)]
    pub secret: Option<String>,
}

impl Default for HasherSettings {
    fn default() -> Self {
        Self {
            algorithm: HasherKind::default(),
            bcrypt_cost: bcrypt_password_hasher::DEFAULT_COST,
            argon2: Argon2Config::default(),
            secret: None,
        }
    }
}

impl fmt::Debug for HasherSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HasherSettings")
            .field("algorithm", &self.algorithm)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("argon2", &self.argon2)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl HasherSettings {
    /// Read settings from the process environment, loading `.env` first when
    /// one exists.
    pub fn from_env() -> Result<Self, HashError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded environment file");
        }
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    /// Build settings from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HashError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let argon2 = Argon2Config {
            iterations: parse_var(&lookup, ARGON2_ITERATIONS, defaults.argon2.iterations)?,
            parallelism: parse_var(&lookup, ARGON2_PARALLELISM, defaults.argon2.parallelism)?,
            memory_size: parse_var(&lookup, ARGON2_MEMORY_KIB, defaults.argon2.memory_size)?,
            hash_length: parse_var(&lookup, ARGON2_HASH_LENGTH, defaults.argon2.hash_length)?,
            salt_length: parse_var(&lookup, ARGON2_SALT_LENGTH, defaults.argon2.salt_length)?,
            output: defaults.argon2.output,
        };

        Ok(Self {
            algorithm: parse_var(&lookup, PASSWORD_HASHER, defaults.algorithm)?,
            bcrypt_cost: parse_var(&lookup, BCRYPT_COST, defaults.bcrypt_cost)?,
            argon2,
            secret: lookup(PASSWORD_PEPPER).filter(|s| !s.is_empty()),
        })
    }

    pub fn build(&self) -> Result<Box<dyn PasswordHasher>, HashError> {
        let variant = match self.algorithm {
            HasherKind::Bcrypt => {
                if self.secret.is_some() {
                    return Err(HashError::configuration(
                        "password pepper",
                        "bcrypt does not take a secret",
                    ));
                }
                debug!(cost = self.bcrypt_cost, "using bcrypt password hasher");
                return Ok(Box::new(BcryptPasswordHasher::new(self.bcrypt_cost)?));
            }
            HasherKind::Argon2i => Argon2Variant::Argon2i,
            HasherKind::Argon2d => Argon2Variant::Argon2d,
            HasherKind::Argon2id => Argon2Variant::Argon2id,
        };

        debug!(%variant, "using argon2 password hasher");
        let mut hasher = Argon2PasswordHasher::new(variant).with_config(self.argon2.clone())?;
        if let Some(secret) = &self.secret {
            hasher = hasher.with_secret(secret.as_bytes());
        }
        Ok(Box::new(hasher))
    }

    pub fn handler(&self) -> Result<PasswordHandler<Box<dyn PasswordHasher>>, HashError> {
        Ok(PasswordHandler::new(self.build()?))
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, HashError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| HashError::configuration(key, format!("{raw:?}: {e}"))),
        _ => Ok(default),
    }
}
