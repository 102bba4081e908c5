//! The event taxonomy emitted by [`crate::processor::Processor`].
//!
//! Every event is immutable, timestamped, and carries a stable `event_id`.
//! Block-scoped events additionally carry the `block_id` of the candidate
//! they describe.

use crate::ids::BlockId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::VecDeque;

/// Which part of a block a line currently belongs to. Sections only ever
/// advance forward: Header -> Metadata -> Content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Section {
    Header,
    Metadata,
    Content,
}

/// The `§7` error taxonomy. Carried as data on `Event::BlockError`, not as a
/// Rust error — block failures are reported in-band, not via `Result::Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// A syntax or registry validator rejected an otherwise well-formed block.
    ValidationFailed,
    /// The candidate's accumulated raw text exceeded `max_block_size`.
    SizeExceeded,
    /// The stream ended (or was finalized) with an open candidate.
    UnclosedBlock,
    /// The metadata or content schema failed to parse the accumulated text.
    ParseFailed,
    /// Metadata section is required by the syntax but was never accumulated.
    MissingMetadata,
    /// Content section is required by the syntax but was never accumulated.
    MissingContent,
    /// The underlying syntax markup itself (e.g. YAML) is malformed.
    SyntaxError,
    /// `block_type` was not found in the registry and `strict_types` is on.
    UnknownType,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::SizeExceeded => "SIZE_EXCEEDED",
            ErrorCode::UnclosedBlock => "UNCLOSED_BLOCK",
            ErrorCode::ParseFailed => "PARSE_FAILED",
            ErrorCode::MissingMetadata => "MISSING_METADATA",
            ErrorCode::MissingContent => "MISSING_CONTENT",
            ErrorCode::SyntaxError => "SYNTAX_ERROR",
            ErrorCode::UnknownType => "UNKNOWN_TYPE",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A fully extracted, validated block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedBlock {
    pub block_id: BlockId,
    pub block_type: Option<String>,
    pub metadata: Value,
    pub content: Value,
    pub syntax_name: String,
    pub raw_text: String,
    pub line_start: u64,
    pub line_end: u64,
    pub hash_id: String,
}

/// The complete event taxonomy. Passthrough (non-text) chunks from a
/// non-identity adapter are not part of this enum — they are wrapped in
/// [`crate::processor::StreamItem::Opaque`] alongside `Event`, since their
/// type depends on the adapter's native chunk type.
#[derive(Debug, Clone)]
pub enum Event {
    StreamStarted {
        event_id: u64,
        timestamp_ms: u64,
    },
    StreamFinished {
        event_id: u64,
        timestamp_ms: u64,
    },
    StreamError {
        event_id: u64,
        timestamp_ms: u64,
        message: String,
    },
    /// A raw line that did not belong to, open, or close any candidate.
    TextContent {
        event_id: u64,
        timestamp_ms: u64,
        line: String,
        line_number: u64,
    },
    /// An incremental slice of incoming text, independent of line boundaries.
    TextDelta {
        event_id: u64,
        timestamp_ms: u64,
        delta: String,
        inside_block: bool,
        section: Option<Section>,
        /// Provider-specific metadata from the originating chunk, via
        /// [`crate::adapter::InputAdapter::get_metadata`].
        metadata: Option<Map<String, Value>>,
    },
    BlockStart {
        event_id: u64,
        timestamp_ms: u64,
        block_id: BlockId,
        start_line: u64,
        syntax_name: String,
        inline_metadata: Option<Value>,
    },
    BlockHeaderDelta {
        event_id: u64,
        timestamp_ms: u64,
        block_id: BlockId,
        delta: String,
    },
    BlockMetadataDelta {
        event_id: u64,
        timestamp_ms: u64,
        block_id: BlockId,
        delta: String,
        is_boundary: bool,
    },
    BlockContentDelta {
        event_id: u64,
        timestamp_ms: u64,
        block_id: BlockId,
        delta: String,
    },
    BlockMetadataEnd {
        event_id: u64,
        timestamp_ms: u64,
        block_id: BlockId,
        metadata: Value,
    },
    BlockContentEnd {
        event_id: u64,
        timestamp_ms: u64,
        block_id: BlockId,
        raw_content: String,
        content: Value,
    },
    BlockEnd {
        event_id: u64,
        timestamp_ms: u64,
        block_id: BlockId,
        start_line: u64,
        end_line: u64,
        block: ExtractedBlock,
    },
    BlockError {
        event_id: u64,
        timestamp_ms: u64,
        block_id: BlockId,
        start_line: u64,
        end_line: u64,
        error_code: ErrorCode,
        message: String,
        recent_lines: VecDeque<String>,
    },
}

impl Event {
    /// The block this event is scoped to, if any.
    pub fn block_id(&self) -> Option<&BlockId> {
        match self {
            Event::BlockStart { block_id, .. }
            | Event::BlockHeaderDelta { block_id, .. }
            | Event::BlockMetadataDelta { block_id, .. }
            | Event::BlockContentDelta { block_id, .. }
            | Event::BlockMetadataEnd { block_id, .. }
            | Event::BlockContentEnd { block_id, .. }
            | Event::BlockEnd { block_id, .. }
            | Event::BlockError { block_id, .. } => Some(block_id),
            _ => None,
        }
    }
}
