//! The `Syntax` contract: line-level marker detection plus block parsing,
//! parameterized so the state machine driving candidates through their
//! lifecycle stays syntax-agnostic.
//!
//! Detection is pure: a [`Syntax`] never mutates a [`Candidate`] itself (the
//! reference implementation does, toggling `candidate.current_section`
//! directly inside its detection method — a hidden aliasing hazard this
//! crate avoids). Instead [`DetectionResult`] describes what should happen
//! and [`crate::state_machine`] applies it explicitly.

pub mod frontmatter;
pub mod markdown;
pub mod preamble;

pub use frontmatter::DelimiterFrontmatterSyntax;
pub use markdown::MarkdownFrontmatterSyntax;
pub use preamble::DelimiterPreambleSyntax;

use crate::candidate::Candidate;
use crate::event::{ErrorCode, ExtractedBlock, Section};
use crate::schema::Schema;
use serde_json::{Map, Value};

/// What a syntax observed about a single line.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    /// The line opens a new candidate (only meaningful when no candidate
    /// was passed in).
    pub is_opening: bool,
    /// The line closes the candidate passed in.
    pub is_closing: bool,
    /// The line is a section-boundary marker (e.g. a frontmatter `---`)
    /// rather than data; it is recorded in the candidate's raw lines but
    /// never bucketed into metadata/content.
    pub is_metadata_boundary: bool,
    /// The section the candidate should move to, applied before bucketing.
    pub next_section: Option<Section>,
    /// Whether a non-boundary, non-closing line should be appended to the
    /// (possibly just-transitioned) section's bucket. `false` for syntaxes
    /// that silently discard filler lines (e.g. blank lines before
    /// markdown frontmatter).
    pub bucket: bool,
    /// Inline metadata extracted directly from an opening marker (preamble
    /// syntax only); `None` for syntaxes with a separate metadata section.
    pub metadata: Option<Map<String, Value>>,
}

impl Default for DetectionResult {
    fn default() -> Self {
        Self {
            is_opening: false,
            is_closing: false,
            is_metadata_boundary: false,
            next_section: None,
            bucket: true,
            metadata: None,
        }
    }
}

/// A parse failure paired with the `§7` error code it should be reported as.
#[derive(Debug, Clone)]
pub struct ParseFailure {
    pub code: ErrorCode,
    pub message: String,
}

impl ParseFailure {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

pub type ParseOutcome = Result<Value, ParseFailure>;

/// A syntax recognizes opening/closing markers for one block framing style
/// and knows how to parse a candidate's metadata and content independently,
/// since metadata resolves (and is reported) as soon as its section closes —
/// well before the block's closing marker arrives.
pub trait Syntax: Send + Sync {
    fn name(&self) -> &str;

    /// Detect markers in `line`. `candidate` is `None` when no block is
    /// currently open (looking for an opening marker) and `Some` otherwise.
    fn detect_line(&self, line: &str, candidate: Option<&Candidate>) -> DetectionResult;

    /// Pull the `block_type` tag out of a candidate's metadata so far.
    fn extract_block_type(&self, candidate: &Candidate) -> Option<String>;

    /// Parse a candidate's metadata section. Called once its section closes.
    fn parse_metadata(&self, candidate: &Candidate, schema: &dyn Schema) -> ParseOutcome;

    /// Parse a candidate's accumulated content. Called once the block closes.
    fn parse_content(&self, candidate: &Candidate, schema: &dyn Schema) -> ParseOutcome;

    /// Final, syntax-specific validation pass after parsing succeeds.
    fn validate_block(&self, _block: &ExtractedBlock) -> bool {
        true
    }
}

/// Shared defaulting logic for syntaxes with a YAML metadata section
/// (frontmatter and markdown): fill `id`/`block_type` when the accumulated
/// YAML omitted them, rather than failing the block outright.
pub(crate) fn default_metadata_fields(
    map: &mut Map<String, Value>,
    candidate: &Candidate,
    default_block_type: &str,
) {
    map.entry("id".to_string())
        .or_insert_with(|| Value::String(format!("block_{}", candidate.compute_hash())));
    map.entry("block_type".to_string())
        .or_insert_with(|| Value::String(default_block_type.to_string()));
}

/// Parse a joined YAML block into a JSON object map, tolerating an empty
/// or absent frontmatter section as `{}`.
pub(crate) fn parse_yaml_map(lines: &[String]) -> Result<Map<String, Value>, String> {
    if lines.is_empty() {
        return Ok(Map::new());
    }
    let joined = lines.join("\n");
    let value: Value = serde_yaml::from_str(&joined).map_err(|e| e.to_string())?;
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(format!("expected a YAML mapping, got {other:?}")),
    }
}
