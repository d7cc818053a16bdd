//! Commit hash generation and unambiguous-prefix lookup.
//!
//! Every hash-taking command (`reset --hard`, `revert`, short-hash display)
//! goes through [`resolve_prefix`] so ambiguity is enforced in exactly one
//! place.

use indexmap::IndexMap;
use rand::Rng;
use sha2::{Digest, Sha256};

use super::Commit;

const HASH_LEN: usize = 7;

/// Generate a plausible short hex commit hash. Not a real content hash —
/// the crate explicitly doesn't model real cryptographic hashing — but
/// deterministic given its inputs plus a random nonce, so collisions across
/// a session are effectively impossible without needing a counter.
pub fn generate(message: &str, timestamp: i64) -> String {
    let nonce: u64 = rand::thread_rng().r#gen();
    let mut hasher = Sha256::new();
    hasher.update(nonce.to_le_bytes());
    hasher.update(timestamp.to_le_bytes());
    hasher.update(message.as_bytes());
    let digest = hasher.finalize();
    hex_prefix(&digest, HASH_LEN)
}

fn hex_prefix(bytes: &[u8], len: usize) -> String {
    let mut out = String::with_capacity(len);
    for byte in bytes {
        if out.len() >= len {
            break;
        }
        out.push_str(&format!("{byte:02x}"));
    }
    out.truncate(len);
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashLookupError {
    NotFound,
    Ambiguous,
}

/// Resolve an unambiguous hash prefix (including a full hash) against the
/// known commits. Empty matches are `NotFound`; more than one match is
/// `Ambiguous`.
pub fn resolve_prefix(
    commits: &IndexMap<String, Commit>,
    prefix: &str,
) -> Result<String, HashLookupError> {
    if prefix.is_empty() {
        return Err(HashLookupError::NotFound);
    }
    let matches: Vec<&String> = commits
        .keys()
        .filter(|hash| hash.starts_with(prefix))
        .collect();
    match matches.len() {
        0 => Err(HashLookupError::NotFound),
        1 => Ok(matches[0].clone()),
        _ => Err(HashLookupError::Ambiguous),
    }
}
