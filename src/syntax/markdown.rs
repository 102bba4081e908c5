//! Code fence + optional YAML frontmatter: ` ```info_string` / `---` yaml
//! `---` / content / ` ``` `.

use super::{
    default_metadata_fields, parse_yaml_map, DetectionResult, ParseFailure, ParseOutcome, Syntax,
};
use crate::candidate::Candidate;
use crate::event::{ErrorCode, ExtractedBlock, Section};
use crate::schema::Schema;
use regex::Regex;

/// Markdown code fence framing, with an optional YAML frontmatter section
/// immediately inside the fence.
pub struct MarkdownFrontmatterSyntax {
    name: String,
    fence: String,
    info_string: Option<String>,
    opening_pattern: Regex,
    frontmatter_pattern: Regex,
}

impl MarkdownFrontmatterSyntax {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_fence(name, "```", None)
    }

    pub fn with_fence(
        name: impl Into<String>,
        fence: impl Into<String>,
        info_string: Option<String>,
    ) -> Self {
        let fence = fence.into();
        let escaped_fence = regex::escape(&fence);
        let escaped_info = info_string
            .as_deref()
            .map(regex::escape)
            .unwrap_or_default();
        let opening_pattern =
            Regex::new(&format!("^{escaped_fence}{escaped_info}")).expect("valid fence pattern");
        Self {
            name: name.into(),
            fence,
            info_string,
            opening_pattern,
            frontmatter_pattern: Regex::new(r"^---\s*$").expect("static pattern"),
        }
    }
}

impl Syntax for MarkdownFrontmatterSyntax {
    fn name(&self) -> &str {
        &self.name
    }

    fn detect_line(&self, line: &str, candidate: Option<&Candidate>) -> DetectionResult {
        match candidate {
            None => {
                if self.opening_pattern.is_match(line) {
                    DetectionResult {
                        is_opening: true,
                        ..Default::default()
                    }
                } else {
                    DetectionResult::default()
                }
            }
            Some(c) => match c.section {
                Section::Header => {
                    if self.frontmatter_pattern.is_match(line) {
                        DetectionResult {
                            is_metadata_boundary: true,
                            next_section: Some(Section::Metadata),
                            ..Default::default()
                        }
                    } else if line.trim().is_empty() {
                        // Blank lines before frontmatter are discarded filler.
                        DetectionResult {
                            bucket: false,
                            ..Default::default()
                        }
                    } else {
                        DetectionResult {
                            next_section: Some(Section::Content),
                            bucket: true,
                            ..Default::default()
                        }
                    }
                }
                Section::Metadata => {
                    if self.frontmatter_pattern.is_match(line) {
                        DetectionResult {
                            is_metadata_boundary: true,
                            next_section: Some(Section::Content),
                            ..Default::default()
                        }
                    } else {
                        DetectionResult {
                            bucket: true,
                            ..Default::default()
                        }
                    }
                }
                Section::Content => {
                    if line.trim() == self.fence {
                        DetectionResult {
                            is_closing: true,
                            ..Default::default()
                        }
                    } else {
                        DetectionResult {
                            bucket: true,
                            ..Default::default()
                        }
                    }
                }
            },
        }
    }

    fn extract_block_type(&self, candidate: &Candidate) -> Option<String> {
        parse_yaml_map(&candidate.metadata_lines)
            .ok()
            .and_then(|m| m.get("block_type").and_then(|v| v.as_str()).map(String::from))
            .or_else(|| self.info_string.clone())
    }

    fn parse_metadata(&self, candidate: &Candidate, schema: &dyn Schema) -> ParseOutcome {
        let mut metadata_map = parse_yaml_map(&candidate.metadata_lines)
            .map_err(|e| ParseFailure::new(ErrorCode::SyntaxError, format!("invalid YAML: {e}")))?;
        let default_type = self.info_string.as_deref().unwrap_or("markdown");
        default_metadata_fields(&mut metadata_map, candidate, default_type);

        schema
            .parse_metadata(&metadata_map)
            .map_err(|e| ParseFailure::new(ErrorCode::ParseFailed, format!("invalid metadata: {e}")))
    }

    fn parse_content(&self, candidate: &Candidate, schema: &dyn Schema) -> ParseOutcome {
        let content_text = candidate.content_lines.join("\n");
        schema
            .parse_content(&content_text)
            .map_err(|e| ParseFailure::new(ErrorCode::ParseFailed, format!("invalid content: {e}")))
    }

    fn validate_block(&self, _block: &ExtractedBlock) -> bool {
        true
    }
}
