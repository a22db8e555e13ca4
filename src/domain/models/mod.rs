pub mod hashed_password;
