pub mod argon2_config;
pub mod argon2_password_hasher;
pub mod bcrypt_password_hasher;
pub mod salt;
