use bcrypt::{BcryptError, Version};
use tracing::{debug, warn};

use crate::{
    domain::{
        error::HashError, models::hashed_password::HashedPassword,
        services::password_service::PasswordHasher,
    },
    infrastructure::salt,
};

pub const DEFAULT_COST: u32 = 10;
pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;

const SALT_LEN: usize = 16;

/// bcrypt adapter. CPU-hard, tuned by a single cost factor.
///
/// Passwords longer than 72 bytes are truncated by the algorithm itself.
#[derive(Debug, Clone)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    pub fn new(cost: u32) -> Result<Self, HashError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(HashError::configuration(
                "bcrypt cost",
                format!("must be between {MIN_COST} and {MAX_COST}, got {cost}"),
            ));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn hash(&self, plain_password: &[u8]) -> Result<HashedPassword, HashError> {
        debug!(cost = self.cost, "hashing password with bcrypt");

        let salt = salt::generate::<SALT_LEN>()?;
        let parts = bcrypt::hash_with_salt(plain_password, self.cost, salt).map_err(|e| match e {
            BcryptError::CostNotAllowed(cost) => {
                HashError::configuration("bcrypt cost", format!("{cost} is not allowed"))
            }
            other => HashError::HashingFailure(other.to_string()),
        })?;

        Ok(HashedPassword::new(parts.format_for_version(Version::TwoB)))
    }

    fn verify(
        &self,
        plain_password: &[u8],
        hashed_password: &HashedPassword,
    ) -> Result<bool, HashError> {
        debug!("verifying password with bcrypt");

        // bcrypt's messages quote the stored hash; keep only a fixed reason.
        bcrypt::verify(plain_password, hashed_password.as_str()).map_err(|e| {
            let reason = match e {
                BcryptError::InvalidHash(_) => "not a bcrypt hash",
                BcryptError::InvalidPrefix(_) => "unknown bcrypt prefix",
                BcryptError::InvalidCost(_) | BcryptError::CostNotAllowed(_) => "bad bcrypt cost",
                BcryptError::InvalidBase64(_) => "bad bcrypt salt or digest encoding",
                _ => return HashError::HashingFailure("bcrypt verification failed".to_string()),
            };
            warn!(reason, "stored hash is not a valid bcrypt hash");
            HashError::MalformedHash(reason.to_string())
        })
    }

    fn needs_rehash(&self, hashed_password: &HashedPassword) -> bool {
        // $2b$10$...
        let mut fields = hashed_password.as_str().split('$');
        let (Some(""), Some(prefix), Some(cost)) = (fields.next(), fields.next(), fields.next())
        else {
            return true;
        };
        if !matches!(prefix, "2a" | "2b" | "2x" | "2y") {
            return true;
        }
        match cost.parse::<u32>() {
            Ok(cost) => cost < self.cost,
            Err(_) => true,
        }
    }
}
