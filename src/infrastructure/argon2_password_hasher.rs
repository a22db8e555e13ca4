use std::fmt;

use argon2::{
    Argon2, PasswordHash as Argon2Hash, Version,
    password_hash::{self, PasswordHasher as Argon2Hasher, PasswordVerifier, SaltString},
};
use tracing::{debug, warn};

use crate::{
    domain::{
        error::HashError, models::hashed_password::HashedPassword,
        services::password_service::PasswordHasher,
    },
    infrastructure::{
        argon2_config::{Argon2Config, Argon2Output, Argon2Variant, OutputEncoding},
        salt,
    },
};

/// argon2 adapter. Memory-hard; one of argon2i, argon2d or argon2id.
///
/// An optional secret (pepper) is mixed into every hash and must be supplied
/// again to verify.
#[derive(Clone, Default)]
pub struct Argon2PasswordHasher {
    variant: Argon2Variant,
    config: Argon2Config,
    secret: Option<Vec<u8>>,
}

impl Argon2PasswordHasher {
    pub fn new(variant: Argon2Variant) -> Self {
        Self {
            variant,
            config: Argon2Config::default(),
            secret: None,
        }
    }

    pub fn with_config(mut self, config: Argon2Config) -> Result<Self, HashError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn with_secret(mut self, secret: impl Into<Vec<u8>>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn variant(&self) -> Argon2Variant {
        self.variant
    }

    pub fn config(&self) -> &Argon2Config {
        &self.config
    }

    /// Hash with an explicit secret and, optionally, a one-off configuration.
    ///
    /// A fresh salt of `salt_length` bytes is drawn on every call. When
    /// `config` is `None` the hasher's own configuration is used.
    pub fn hash_with(
        &self,
        plain_password: &[u8],
        secret: Option<&[u8]>,
        config: Option<&Argon2Config>,
    ) -> Result<Argon2Output, HashError> {
        let config = match config {
            Some(config) => {
                config.validate()?;
                config
            }
            None => &self.config,
        };
        debug!(
            variant = %self.variant,
            m_cost = config.memory_size,
            t_cost = config.iterations,
            p_cost = config.parallelism,
            peppered = secret.is_some(),
            "hashing password with argon2"
        );

        let argon2 = self.argon2(secret, config)?;
        let salt = salt::generate_vec(config.salt_length)?;

        match config.output {
            OutputEncoding::Encoded => {
                let salt = SaltString::encode_b64(&salt)
                    .map_err(|e| HashError::HashingFailure(e.to_string()))?;
                let hash = argon2
                    .hash_password(plain_password, &salt)
                    .map_err(|e| HashError::HashingFailure(e.to_string()))?;
                Ok(Argon2Output::Encoded(HashedPassword::new(hash.to_string())))
            }
            OutputEncoding::Hex | OutputEncoding::Binary => {
                let mut digest = vec![0u8; config.hash_length];
                argon2
                    .hash_password_into(plain_password, &salt, &mut digest)
                    .map_err(|e| HashError::HashingFailure(e.to_string()))?;
                if config.output == OutputEncoding::Hex {
                    Ok(Argon2Output::Hex(hex::encode(&digest)))
                } else {
                    Ok(Argon2Output::Binary(digest))
                }
            }
        }
    }

    /// Verify with an explicit secret.
    ///
    /// Variant, version and cost parameters are read from the encoded hash, so
    /// a hash made under any configuration (or any argon2 variant) verifies.
    pub fn verify_with(
        &self,
        plain_password: &[u8],
        hashed_password: &HashedPassword,
        secret: Option<&[u8]>,
    ) -> Result<bool, HashError> {
        let parsed = parse(hashed_password)?;
        debug!(algorithm = %parsed.algorithm, "verifying password with argon2");

        // Algorithm, version and params passed here are replaced by the ones
        // embedded in the hash; only the secret carries over.
        let argon2 = match secret {
            Some(secret) => Argon2::new_with_secret(
                secret,
                argon2::Algorithm::default(),
                Version::default(),
                argon2::Params::default(),
            )
            .map_err(|e| HashError::configuration("argon2 secret", e.to_string()))?,
            None => Argon2::default(),
        };

        match argon2.verify_password(plain_password, &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => {
                warn!("stored argon2 hash carries unusable parameters");
                Err(HashError::MalformedHash(e.to_string()))
            }
        }
    }

    fn argon2<'k>(
        &self,
        secret: Option<&'k [u8]>,
        config: &Argon2Config,
    ) -> Result<Argon2<'k>, HashError> {
        let params = config.params()?;
        let algorithm = self.variant.algorithm();
        match secret {
            Some(secret) => Argon2::new_with_secret(secret, algorithm, Version::V0x13, params)
                .map_err(|e| HashError::configuration("argon2 secret", e.to_string())),
            None => Ok(Argon2::new(algorithm, Version::V0x13, params)),
        }
    }
}

impl fmt::Debug for Argon2PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argon2PasswordHasher")
            .field("variant", &self.variant)
            .field("config", &self.config)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, plain_password: &[u8]) -> Result<HashedPassword, HashError> {
        if self.config.output != OutputEncoding::Encoded {
            return Err(HashError::configuration(
                "argon2 output",
                "only the encoded form can be stored and verified; use hash_with for raw digests",
            ));
        }

        self.hash_with(plain_password, self.secret.as_deref(), None)?
            .into_encoded()
            .ok_or_else(|| HashError::HashingFailure("argon2 returned a raw digest".to_string()))
    }

    fn verify(
        &self,
        plain_password: &[u8],
        hashed_password: &HashedPassword,
    ) -> Result<bool, HashError> {
        self.verify_with(plain_password, hashed_password, self.secret.as_deref())
    }

    fn needs_rehash(&self, hashed_password: &HashedPassword) -> bool {
        let Ok(parsed) = parse(hashed_password) else {
            return true;
        };
        if parsed.algorithm.as_str() != self.variant.as_str() {
            return true;
        }
        if parsed.version != Some(u32::from(Version::V0x13)) {
            return true;
        }
        let Ok(params) = argon2::Params::try_from(&parsed) else {
            return true;
        };
        let hash_length = parsed.hash.map(|h| h.len()).unwrap_or_default();
        let mut salt_buf = [0u8; 64];
        let salt_length = parsed
            .salt
            .and_then(|salt| salt.decode_b64(&mut salt_buf).ok())
            .map(<[u8]>::len)
            .unwrap_or_default();

        params.m_cost() < self.config.memory_size
            || params.t_cost() < self.config.iterations
            || params.p_cost() != self.config.parallelism
            || hash_length != self.config.hash_length
            || salt_length < self.config.salt_length
    }
}

/// Parse a PHC string and make sure it belongs to the argon2 family.
fn parse(hashed_password: &HashedPassword) -> Result<Argon2Hash<'_>, HashError> {
    let parsed = Argon2Hash::new(hashed_password.as_str()).map_err(|e| {
        warn!("stored hash is not a PHC string");
        HashError::MalformedHash(e.to_string())
    })?;

    if argon2::Algorithm::try_from(parsed.algorithm).is_err() {
        warn!(algorithm = %parsed.algorithm, "stored hash is not an argon2 hash");
        return Err(HashError::MalformedHash(format!(
            "unsupported algorithm {}",
            parsed.algorithm
        )));
    }
    if parsed.salt.is_none() || parsed.hash.is_none() {
        warn!(algorithm = %parsed.algorithm, "stored argon2 hash is missing salt or digest");
        return Err(HashError::MalformedHash(
            "argon2 hash is missing salt or digest".to_string(),
        ));
    }

    Ok(parsed)
}
