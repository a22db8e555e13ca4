use std::sync::Arc;

use tracing::error;

use crate::domain::{
    error::HashError, models::hashed_password::HashedPassword,
    services::password_service::PasswordHasher,
};

/// Single entry point for password hashing in an application
///
/// Owns one hasher chosen at construction and forwards every call to it
/// without looking at or changing the result. Cloning shares the same hasher.
pub struct PasswordHandler<P: PasswordHasher> {
    password_hasher: Arc<P>,
}

impl<P: PasswordHasher> Clone for PasswordHandler<P> {
    fn clone(&self) -> Self {
        Self {
            password_hasher: Arc::clone(&self.password_hasher),
        }
    }
}

impl<P: PasswordHasher> PasswordHandler<P> {
    pub fn new(password_hasher: P) -> Self {
        Self {
            password_hasher: Arc::new(password_hasher),
        }
    }

    pub fn hasher(&self) -> &P {
        &self.password_hasher
    }

    pub fn hash(&self, password: &str) -> Result<HashedPassword, HashError> {
        self.password_hasher.hash(password.as_bytes())
    }

    pub fn verify(
        &self,
        password: &str,
        hashed_password: &HashedPassword,
    ) -> Result<bool, HashError> {
        self.password_hasher.verify(password.as_bytes(), hashed_password)
    }

    pub fn needs_rehash(&self, hashed_password: &HashedPassword) -> bool {
        self.password_hasher.needs_rehash(hashed_password)
    }
}

impl<P: PasswordHasher + 'static> PasswordHandler<P> {
    /// `hash` on tokio's blocking pool, for use from async code
    pub async fn hash_async(&self, password: String) -> Result<HashedPassword, HashError> {
        let password_hasher = Arc::clone(&self.password_hasher);
        tokio::task::spawn_blocking(move || password_hasher.hash(password.as_bytes()))
            .await
            .map_err(join_error)?
    }

    /// `verify` on tokio's blocking pool, for use from async code
    pub async fn verify_async(
        &self,
        password: String,
        hashed_password: HashedPassword,
    ) -> Result<bool, HashError> {
        let password_hasher = Arc::clone(&self.password_hasher);
        tokio::task::spawn_blocking(move || {
            password_hasher.verify(password.as_bytes(), &hashed_password)
        })
        .await
        .map_err(join_error)?
    }
}

fn join_error(e: tokio::task::JoinError) -> HashError {
    error!(error = %e, "password hashing task did not complete");
    HashError::HashingFailure(format!("hashing task did not complete: {e}"))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rstest::*;

    use super::*;
    use crate::infrastructure::{
        argon2_config::{Argon2Config, Argon2Variant},
        argon2_password_hasher::Argon2PasswordHasher,
        bcrypt_password_hasher::BcryptPasswordHasher,
    };

    // mock hasher: records calls, reverses the password as its "hash"
    #[derive(Default)]
    struct MockPasswordHasher {
        calls: AtomicUsize,
    }

    impl PasswordHasher for MockPasswordHasher {
        fn hash(&self, plain_password: &[u8]) -> Result<HashedPassword, HashError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut reversed = plain_password.to_vec();
            reversed.reverse();
            Ok(HashedPassword::new(format!(
                "$mock${}",
                String::from_utf8_lossy(&reversed)
            )))
        }

        fn verify(
            &self,
            plain_password: &[u8],
            hashed_password: &HashedPassword,
        ) -> Result<bool, HashError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let Some(reversed) = hashed_password.as_str().strip_prefix("$mock$") else {
                return Err(HashError::MalformedHash("not a mock hash".to_string()));
            };
            let expected: Vec<u8> = reversed.bytes().rev().collect();
            Ok(expected == plain_password)
        }

        fn needs_rehash(&self, _hashed_password: &HashedPassword) -> bool {
            false
        }
    }

    #[fixture]
    fn bcrypt_handler() -> PasswordHandler<BcryptPasswordHasher> {
        PasswordHandler::new(BcryptPasswordHasher::new(4).unwrap())
    }

    #[fixture]
    fn argon2_handler() -> PasswordHandler<Argon2PasswordHasher> {
        let config = Argon2Config {
            iterations: 1,
            parallelism: 1,
            memory_size: 64,
            ..Argon2Config::default()
        };
        PasswordHandler::new(
            Argon2PasswordHasher::new(Argon2Variant::Argon2id)
                .with_config(config)
                .unwrap(),
        )
    }

    #[test]
    fn test_forwards_without_transformation() {
        let handler = PasswordHandler::new(MockPasswordHasher::default());

        let hash = handler.hash("secret").unwrap();
        assert_eq!(hash.as_str(), "$mock$terces");
        assert!(handler.verify("secret", &hash).unwrap());
        assert!(!handler.verify("Secret", &hash).unwrap());
        assert_eq!(handler.hasher().calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_errors_propagate_unchanged() {
        let handler = PasswordHandler::new(MockPasswordHasher::default());
        let err = handler
            .verify("secret", &HashedPassword::from("$2b$whatever"))
            .unwrap_err();
        assert!(matches!(err, HashError::MalformedHash(msg) if msg == "not a mock hash"));
    }

    #[rstest]
    fn test_matches_direct_hasher_calls(bcrypt_handler: PasswordHandler<BcryptPasswordHasher>) {
        let hash = bcrypt_handler.hash("password").unwrap();
        let direct = bcrypt_handler.hasher();

        assert_eq!(
            bcrypt_handler.verify("password", &hash).unwrap(),
            direct.verify(b"password", &hash).unwrap()
        );
        assert_eq!(
            bcrypt_handler.verify("wrong", &hash).unwrap(),
            direct.verify(b"wrong", &hash).unwrap()
        );
        assert_eq!(bcrypt_handler.needs_rehash(&hash), direct.needs_rehash(&hash));
    }

    #[rstest]
    fn test_cross_algorithm_isolation(
        bcrypt_handler: PasswordHandler<BcryptPasswordHasher>,
        argon2_handler: PasswordHandler<Argon2PasswordHasher>,
    ) {
        let bcrypt_hash = bcrypt_handler.hash("password").unwrap();
        let argon2_hash = argon2_handler.hash("password").unwrap();

        assert!(argon2_handler
            .verify("password", &bcrypt_hash)
            .unwrap_err()
            .is_malformed_hash());
        assert!(bcrypt_handler
            .verify("password", &argon2_hash)
            .unwrap_err()
            .is_malformed_hash());
    }

    #[rstest]
    fn test_boxed_hasher(argon2_handler: PasswordHandler<Argon2PasswordHasher>) {
        let boxed: Box<dyn PasswordHasher> = Box::new(argon2_handler.hasher().clone());
        let handler = PasswordHandler::new(boxed);

        let hash = handler.hash("password").unwrap();
        assert!(handler.verify("password", &hash).unwrap());
        assert!(argon2_handler.verify("password", &hash).unwrap());
    }

    #[rstest]
    #[tokio::test]
    async fn test_async_hash_and_verify(argon2_handler: PasswordHandler<Argon2PasswordHasher>) {
        let hash = argon2_handler
            .hash_async("async password".to_string())
            .await
            .unwrap();

        assert!(argon2_handler
            .verify_async("async password".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!argon2_handler
            .verify_async("wrong".to_string(), hash)
            .await
            .unwrap());
    }

    #[rstest]
    #[tokio::test]
    async fn test_concurrent_use_of_one_handler(
        bcrypt_handler: PasswordHandler<BcryptPasswordHasher>,
    ) {
        let tasks: Vec<_> = (0..4)
            .map(|i| {
                let handler = bcrypt_handler.clone();
                tokio::spawn(async move {
                    let password = format!("password-{i}");
                    let hash = handler.hash_async(password.clone()).await.unwrap();
                    handler.verify_async(password, hash).await.unwrap()
                })
            })
            .collect();

        for task in tasks {
            assert!(task.await.unwrap());
        }
    }
}
