//! Processor configuration.
//!
//! Mirrors the options-builder pattern used throughout this crate's
//! ancestry: required fields validated once at `build()`, everything else
//! defaulted, fluent setters taking `impl Into<T>`.

use crate::error::{Error, Result};

/// Tunables for a [`crate::processor::Processor`].
///
/// Build via [`ProcessorConfig::builder`] or use [`ProcessorConfig::default`]
/// to accept every default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// Lines longer than this are truncated before entering the state
    /// machine. Default 16,384.
    pub max_line_length: usize,

    /// A candidate whose accumulated raw text exceeds this many bytes is
    /// rejected with `ErrorCode::SizeExceeded`. Default 1,048,576.
    pub max_block_size: usize,

    /// Size of the diagnostic ring of recent lines attached to rejection
    /// events. Purely a diagnostic aid — does not affect extraction
    /// semantics. Default 5.
    pub lines_buffer: usize,

    /// Whether to emit `Event::TextDelta` for incoming text outside of line
    /// boundaries, in addition to line-level events. Default true.
    pub emit_text_deltas: bool,

    /// Whether a non-identity adapter's original chunks are passed through
    /// as `Event::Opaque` in addition to the derived text events. Default
    /// true.
    pub emit_original_events: bool,

    /// When true, a `block_type` with no registered schema is rejected with
    /// `ErrorCode::UnknownType`. When false (the default), it falls back to
    /// the base schema.
    pub strict_types: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            max_line_length: 16_384,
            max_block_size: 1_048_576,
            lines_buffer: 5,
            emit_text_deltas: true,
            emit_original_events: true,
            strict_types: false,
        }
    }
}

impl ProcessorConfig {
    pub fn builder() -> ProcessorConfigBuilder {
        ProcessorConfigBuilder::default()
    }
}

/// Fluent builder for [`ProcessorConfig`]. Every field has a sensible
/// default, so `build()` never fails on a bare `ProcessorConfigBuilder::default()`
/// — validation exists to catch internally-inconsistent values a caller sets
/// explicitly (e.g. a zero-sized buffer).
#[derive(Debug, Default, Clone)]
pub struct ProcessorConfigBuilder {
    max_line_length: Option<usize>,
    max_block_size: Option<usize>,
    lines_buffer: Option<usize>,
    emit_text_deltas: Option<bool>,
    emit_original_events: Option<bool>,
    strict_types: Option<bool>,
}

impl ProcessorConfigBuilder {
    pub fn max_line_length(mut self, value: usize) -> Self {
        self.max_line_length = Some(value);
        self
    }

    pub fn max_block_size(mut self, value: usize) -> Self {
        self.max_block_size = Some(value);
        self
    }

    pub fn lines_buffer(mut self, value: usize) -> Self {
        self.lines_buffer = Some(value);
        self
    }

    pub fn emit_text_deltas(mut self, value: bool) -> Self {
        self.emit_text_deltas = Some(value);
        self
    }

    pub fn emit_original_events(mut self, value: bool) -> Self {
        self.emit_original_events = Some(value);
        self
    }

    pub fn strict_types(mut self, value: bool) -> Self {
        self.strict_types = Some(value);
        self
    }

    pub fn build(self) -> Result<ProcessorConfig> {
        let defaults = ProcessorConfig::default();
        let config = ProcessorConfig {
            max_line_length: self.max_line_length.unwrap_or(defaults.max_line_length),
            max_block_size: self.max_block_size.unwrap_or(defaults.max_block_size),
            lines_buffer: self.lines_buffer.unwrap_or(defaults.lines_buffer),
            emit_text_deltas: self.emit_text_deltas.unwrap_or(defaults.emit_text_deltas),
            emit_original_events: self
                .emit_original_events
                .unwrap_or(defaults.emit_original_events),
            strict_types: self.strict_types.unwrap_or(defaults.strict_types),
        };

        if config.max_line_length == 0 {
            return Err(Error::config("max_line_length must be greater than zero"));
        }
        if config.max_block_size == 0 {
            return Err(Error::config("max_block_size must be greater than zero"));
        }

        Ok(config)
    }
}
