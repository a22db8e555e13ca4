//! Pluggable password hashing.
//!
//! A [`PasswordHasher`] turns a plaintext password into a self-describing
//! encoded hash and checks attempts against it. bcrypt and the argon2 family
//! implement it; [`PasswordHandler`] owns one of them and is what the rest of
//! an application talks to.
//!
//! ```
//! use password_handler::{BcryptPasswordHasher, PasswordHandler};
//!
//! let handler = PasswordHandler::new(BcryptPasswordHasher::new(4)?);
//! let hash = handler.hash("testing password")?;
//!
//! assert!(handler.verify("testing password", &hash)?);
//! assert!(!handler.verify("Testing password", &hash)?);
//! # Ok::<(), password_handler::HashError>(())
//! ```
//!
//! `verify` answers `Ok(false)` for a wrong password and
//! `Err(HashError::MalformedHash)` for a stored hash it cannot read.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod usecase;

pub use config::{HasherKind, HasherSettings};
pub use domain::{
    error::HashError, models::hashed_password::HashedPassword,
    services::password_service::PasswordHasher,
};
pub use infrastructure::{
    argon2_config::{Argon2Config, Argon2Output, Argon2Variant, OutputEncoding},
    argon2_password_hasher::Argon2PasswordHasher,
    bcrypt_password_hasher::BcryptPasswordHasher,
};
pub use usecase::password_handler::PasswordHandler;
