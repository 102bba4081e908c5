//! Monotonic ID generation and content hashing.

use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

/// Stable identifier for a block candidate/extracted block, e.g. `b_000001`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(String);

impl BlockId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generates monotonically increasing block IDs and event IDs for a single
/// processor instance. Not shared across processors or threads.
#[derive(Debug, Default)]
pub struct IdGenerator {
    next_block: u64,
    next_event: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            next_block: 0,
            next_event: 0,
        }
    }

    pub fn next_block_id(&mut self) -> BlockId {
        self.next_block += 1;
        BlockId(format!("b_{:06}", self.next_block))
    }

    pub fn next_event_id(&mut self) -> u64 {
        self.next_event += 1;
        self.next_event
    }
}

/// Milliseconds since the Unix epoch, used to timestamp events.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// First 8 hex chars of SHA-256 over the first 64 *characters* (not bytes)
/// of `raw_text`. Character-based slicing matches the original
/// implementation's `raw_text[:64]` Python string slice.
pub fn hash_id(raw_text: &str) -> String {
    let slice: String = raw_text.chars().take(64).collect();
    let digest = Sha256::digest(slice.as_bytes());
    let hex = format!("{:x}", digest);
    hex[..8].to_string()
}
