use std::sync::Arc;

use crate::domain::{error::HashError, models::hashed_password::HashedPassword};

/// Service for hashing and verifying passwords
///
/// Each algorithm family implements this independently. Implementations
/// generate a fresh salt on every `hash` call and read all parameters needed by
/// `verify` back out of the encoded hash.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plain text password
    fn hash(&self, plain_password: &[u8]) -> Result<HashedPassword, HashError>;

    /// Verify a plain text password against a hashed password
    ///
    /// `Ok(false)` means the password is wrong. `Err(HashError::MalformedHash)`
    /// means the stored hash does not belong to this algorithm family or is
    /// corrupt.
    fn verify(
        &self,
        plain_password: &[u8],
        hashed_password: &HashedPassword,
    ) -> Result<bool, HashError>;

    /// Whether a stored hash should be regenerated with the current settings
    fn needs_rehash(&self, hashed_password: &HashedPassword) -> bool;
}

impl<P: PasswordHasher + ?Sized> PasswordHasher for Box<P> {
    fn hash(&self, plain_password: &[u8]) -> Result<HashedPassword, HashError> {
        (**self).hash(plain_password)
    }

    fn verify(
        &self,
        plain_password: &[u8],
        hashed_password: &HashedPassword,
    ) -> Result<bool, HashError> {
        (**self).verify(plain_password, hashed_password)
    }

    fn needs_rehash(&self, hashed_password: &HashedPassword) -> bool {
        (**self).needs_rehash(hashed_password)
    }
}

impl<P: PasswordHasher + ?Sized> PasswordHasher for Arc<P> {
    fn hash(&self, plain_password: &[u8]) -> Result<HashedPassword, HashError> {
        (**self).hash(plain_password)
    }

    fn verify(
        &self,
        plain_password: &[u8],
        hashed_password: &HashedPassword,
    ) -> Result<bool, HashError> {
        (**self).verify(plain_password, hashed_password)
    }

    fn needs_rehash(&self, hashed_password: &HashedPassword) -> bool {
        (**self).needs_rehash(hashed_password)
    }
}
