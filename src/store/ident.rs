//! Short, unguessable object identifiers.

use crate::error::{AppError, AppResult};

pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

// Largest multiple of 62 that fits in a byte; bytes at or above it are redrawn
// so every symbol stays equally likely.
const ACCEPT_BELOW: u8 = 248;

/// Generate a token of `length` symbols from [`ALPHABET`] using the OS CSPRNG.
///
/// No existence check is made against any shard: with the default length of 6
/// the space is 62^6 and collisions are accepted as negligible.
pub fn generate_id(length: usize) -> AppResult<String> {
    let mut out = String::with_capacity(length);
    let mut buf = [0u8; 32];
    while out.len() < length {
        getrandom::getrandom(&mut buf).map_err(|e| AppError::internal(format!("random source unavailable: {}", e)))?;
        for b in buf.iter().copied().filter(|b| *b < ACCEPT_BELOW) {
            out.push(ALPHABET[(b % 62) as usize] as char);
            if out.len() == length { break; }
        }
    }
    Ok(out)
}

/// True when `s` looks like a token produced by [`generate_id`] with the given length.
#[cfg(test)]
pub(crate) fn is_token(s: &str, length: usize) -> bool {
    s.len() == length && s.bytes().all(|b| b.is_ascii_alphanumeric())
}
