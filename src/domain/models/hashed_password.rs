use std::fmt;

use serde::{Deserialize, Serialize};

/// Value object representing a self-describing encoded password hash
///
/// The string embeds algorithm, parameters, salt and digest. Only the hasher
/// that produced it looks inside.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// Create a new HashedPassword from an already hashed string
    pub fn new(hash: String) -> Self {
        Self(hash)
    }

    /// Get the hash as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for HashedPassword {
    fn from(hash: String) -> Self {
        Self(hash)
    }
}

impl From<&str> for HashedPassword {
    fn from(hash: &str) -> Self {
        Self(hash.to_string())
    }
}

impl AsRef<str> for HashedPassword {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Debug prints the algorithm tag only, never salt or digest.
impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.0.split('$').nth(1).unwrap_or("unknown");
        write!(f, "HashedPassword(${prefix}$..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_digest() {
        let hash = HashedPassword::from("$2b$10$abcdefghijklmnopqrstuuABCDEFGHIJKLMNOPQRSTUVWXYZ01234");
        let debug = format!("{hash:?}");
        assert_eq!(debug, "HashedPassword($2b$..)");
        assert!(!debug.contains("abcdefgh"));
    }

    #[test]
    fn test_serde_is_transparent() {
        let hash = HashedPassword::from("$argon2id$v=19$m=4096,t=3,p=2$c2FsdA$ZGlnZXN0");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, "\"$argon2id$v=19$m=4096,t=3,p=2$c2FsdA$ZGlnZXN0\"");
        let back: HashedPassword = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}
