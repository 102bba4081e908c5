//! External-collaborator contract for shaping provider-specific chunks into
//! plain text before framing. Only [`IdentityAdapter`] ships here — a real
//! provider adapter (OpenAI/Gemini/etc. chunk-shape sniffing) is an external
//! collaborator the host application supplies.

use serde_json::{Map, Value};

/// How the processor should treat a chunk once an adapter has looked at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkCategory {
    /// The chunk carries text that should be framed into lines and fed
    /// through the block state machine.
    TextContent,
    /// The chunk should be emitted to the caller unchanged, bypassing
    /// framing entirely (e.g. a provider's own tool-call event).
    Passthrough,
}

/// Extracts text (and metadata) from a provider-specific chunk type `C`.
pub trait InputAdapter<C>: Send + Sync {
    /// Pull the text this chunk contributes to the stream, if any.
    fn extract_text(&self, chunk: &C) -> Option<String>;

    /// Whether this chunk signals the end of the underlying stream.
    fn is_complete(&self, chunk: &C) -> bool;

    /// How the processor should route this chunk.
    fn categorize(&self, chunk: &C) -> ChunkCategory;

    /// Any adapter-specific metadata associated with this chunk.
    fn get_metadata(&self, chunk: &C) -> Option<Map<String, Value>>;
}

/// The default adapter: chunks are already plain text, nothing is ever
/// passed through opaquely, and completion is signalled by stream end only.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityAdapter;

impl InputAdapter<String> for IdentityAdapter {
    fn extract_text(&self, chunk: &String) -> Option<String> {
        Some(chunk.clone())
    }

    fn is_complete(&self, _chunk: &String) -> bool {
        false
    }

    fn categorize(&self, _chunk: &String) -> ChunkCategory {
        ChunkCategory::TextContent
    }

    fn get_metadata(&self, _chunk: &String) -> Option<Map<String, Value>> {
        None
    }
}
