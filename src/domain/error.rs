use thiserror::Error;

/// Failures of a hash or verify call.
///
/// A wrong password is not an error: `verify` answers `Ok(false)` for it.
#[derive(Debug, Error)]
pub enum HashError {
    #[error("Invalid {parameter}: {message}")]
    Configuration {
        parameter: &'static str,
        message: String,
    },

    #[error("Secure random source unavailable: {0}")]
    EntropyUnavailable(String),

    #[error("Hashing failed: {0}")]
    HashingFailure(String),

    #[error("Malformed hash: {0}")]
    MalformedHash(String),
}

impl HashError {
    pub fn configuration(parameter: &'static str, message: impl Into<String>) -> Self {
        Self::Configuration {
            parameter,
            message: message.into(),
        }
    }

    pub fn is_malformed_hash(&self) -> bool {
        matches!(self, Self::MalformedHash(_))
    }
}
