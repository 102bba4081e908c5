//! A block candidate: the mutable accumulator a [`crate::state_machine`]
//! drives through its lifecycle while a block is still open.

use crate::event::Section;
use crate::ids::{hash_id, BlockId};
use serde_json::{Map, Value};

/// Lifecycle state of a candidate, advanced only forward by the state
/// machine. `Rejected` and `Completed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    HeaderDetected,
    AccumulatingMetadata,
    AccumulatingContent,
    ClosingDetected,
    Rejected,
    Completed,
}

/// A block still being accumulated from the stream.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub block_id: BlockId,
    pub start_line: u64,
    pub state: BlockState,
    pub section: Section,
    /// Every raw line seen for this candidate, including markers.
    pub lines: Vec<String>,
    pub metadata_lines: Vec<String>,
    pub content_lines: Vec<String>,
    /// Metadata extracted inline from the opening marker itself (preamble
    /// syntax); `None` for syntaxes with a separate metadata section.
    pub inline_metadata: Option<Map<String, Value>>,
    /// Parsed metadata, set once the metadata section closes (or, for a
    /// candidate that never leaves the header section, at closing time).
    /// A candidate resolves its metadata at most once.
    pub metadata_result: Option<Value>,
    /// Running total of `len(line) + 1` over `lines`, checked against
    /// `max_block_size` without re-joining the buffer on every line.
    pub size_bytes: usize,
}

impl Candidate {
    pub fn new(block_id: BlockId, start_line: u64) -> Self {
        Self {
            block_id,
            start_line,
            state: BlockState::HeaderDetected,
            section: Section::Header,
            lines: Vec::new(),
            metadata_lines: Vec::new(),
            content_lines: Vec::new(),
            inline_metadata: None,
            metadata_result: None,
            size_bytes: 0,
        }
    }

    /// Record a raw line against the candidate's full text and size budget.
    /// Does not decide which bucket (metadata/content) the line belongs to —
    /// callers append to `metadata_lines`/`content_lines` separately.
    pub fn push_line(&mut self, line: &str) {
        self.size_bytes += line.len() + 1;
        self.lines.push(line.to_string());
    }

    /// Move the candidate into a later section. Sections only ever advance;
    /// moving backward (or to the same section) is a no-op rather than an
    /// error, since syntaxes re-assert the current section on every line.
    pub fn advance_section(&mut self, next: Section) {
        if next > self.section {
            self.section = next;
        }
    }

    pub fn raw_text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn compute_hash(&self) -> String {
        hash_id(&self.raw_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_candidate() -> Candidate {
        let mut gen = crate::ids::IdGenerator::new();
        Candidate::new(gen.next_block_id(), 1)
    }

    #[test]
    fn test_new_candidate_starts_at_header() {
        let c = new_candidate();
        assert_eq!(c.state, BlockState::HeaderDetected);
        assert_eq!(c.section, Section::Header);
        assert!(c.lines.is_empty());
    }

    #[test]
    fn test_push_line_tracks_size() {
        let mut c = new_candidate();
        c.push_line("hello");
        c.push_line("world!");
        assert_eq!(c.size_bytes, 6 + 7);
        assert_eq!(c.raw_text(), "hello\nworld!");
    }

    #[test]
    fn test_advance_section_never_moves_backward() {
        let mut c = new_candidate();
        c.advance_section(Section::Content);
        assert_eq!(c.section, Section::Content);
        c.advance_section(Section::Header);
        assert_eq!(c.section, Section::Content);
    }

    #[test]
    fn test_compute_hash_matches_ids_hash_id() {
        let mut c = new_candidate();
        c.push_line("abc");
        assert_eq!(c.compute_hash(), hash_id("abc"));
    }
}
