//! # streamblocks
//!
//! A streaming structured-block extractor for chunked text. Feeds arbitrary
//! text chunks (as they arrive from an LLM, a socket, or anywhere else)
//! through a line framer and a block state machine, turning the stream into
//! three things as they happen:
//!
//! - pass-through text that belongs to no block,
//! - partial-progress deltas for blocks still being accumulated,
//! - fully parsed, schema-validated blocks once their closing marker arrives.
//!
//! A block is delimited by one of three built-in [`syntax`] styles —
//! inline-metadata preamble markers, delimiter markers wrapping a YAML
//! frontmatter section, or a markdown code fence with optional frontmatter —
//! and dispatched to a per-block-type [`Schema`](schema::Schema) through a
//! [`Registry`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use streamblocks::prelude::*;
//! use futures::{stream, StreamExt};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let syntax = Arc::new(DelimiterFrontmatterSyntax::new("frontmatter"));
//! let registry = Registry::new(syntax);
//! let config = ProcessorConfig::default();
//! let mut processor = Processor::new(registry, config);
//!
//! let chunks = stream::iter(vec![
//!     "!!start\n---\nid: a1\nblock_type: note\n---\nhello\n!!end\n".to_string(),
//! ]);
//!
//! let mut events = processor.process_stream(chunks).unwrap();
//! while let Some(item) = events.next().await {
//!     if let StreamItem::Event(event) = item {
//!         println!("{event:?}");
//!     }
//! }
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **framer**: turns arbitrarily-chunked text into complete lines.
//! - **candidate**: the mutable accumulator for a block still being parsed.
//! - **syntax**: pluggable marker-detection + parsing per framing style.
//! - **schema**: per-block-type metadata/content parsing capability.
//! - **registry**: binds one syntax to its registered block types.
//! - **state_machine**: drives candidates through their lifecycle, line by line.
//! - **adapter**: shapes provider-specific chunk types into plain text.
//! - **processor**: the public façade composing the pieces above.
//! - **event**: the event taxonomy emitted by the processor.
//! - **config**: processor tunables.
//! - **error**: programmer-error type for builder/constructor validation.
//! - **ids**: monotonic ID generation and content hashing.

mod adapter;
mod candidate;
mod config;
mod error;
mod event;
mod framer;
mod ids;
mod processor;
mod registry;
mod schema;
mod state_machine;
mod syntax;

pub use adapter::{ChunkCategory, IdentityAdapter, InputAdapter};
pub use config::{ProcessorConfig, ProcessorConfigBuilder};
pub use error::{Error, Result};
pub use event::{ErrorCode, Event, ExtractedBlock, Section};
pub use ids::BlockId;
pub use processor::{Processor, StreamItem};
pub use registry::{Registry, Validator};
pub use schema::{BaseSchema, Schema};
pub use syntax::{
    DelimiterFrontmatterSyntax, DelimiterPreambleSyntax, MarkdownFrontmatterSyntax, Syntax,
};

/// Convenience module bundling the types most callers need.
/// Import with `use streamblocks::prelude::*;`.
pub mod prelude {
    pub use crate::{
        BaseSchema, ChunkCategory, DelimiterFrontmatterSyntax, DelimiterPreambleSyntax, Error,
        ErrorCode, Event, ExtractedBlock, IdentityAdapter, InputAdapter, MarkdownFrontmatterSyntax,
        Processor, ProcessorConfig, Registry, Result, Schema, Section, StreamItem, Syntax,
    };
}
