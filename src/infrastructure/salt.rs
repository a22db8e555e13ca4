use rand_core::{OsRng, TryRngCore};

use crate::domain::error::HashError;

/// Draw a fixed-size salt from the operating system CSPRNG.
pub fn generate<const N: usize>() -> Result<[u8; N], HashError> {
    let mut salt = [0u8; N];
    fill(&mut salt)?;
    Ok(salt)
}

/// Draw a salt of a length only known at runtime.
pub fn generate_vec(len: usize) -> Result<Vec<u8>, HashError> {
    let mut salt = vec![0u8; len];
    fill(&mut salt)?;
    Ok(salt)
}

fn fill(dest: &mut [u8]) -> Result<(), HashError> {
    OsRng
        .try_fill_bytes(dest)
        .map_err(|e| HashError::EntropyUnavailable(e.to_string()))
}
