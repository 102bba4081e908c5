//! `!!start` / YAML `---`...`---` frontmatter / `!!end`.

use super::{
    default_metadata_fields, parse_yaml_map, DetectionResult, ParseFailure, ParseOutcome, Syntax,
};
use crate::candidate::Candidate;
use crate::event::{ErrorCode, ExtractedBlock, Section};
use crate::schema::Schema;
use regex::Regex;

/// Delimiter markers wrapping a YAML frontmatter metadata section:
/// `!!start` / `---` / yaml / `---` / content / `!!end`.
pub struct DelimiterFrontmatterSyntax {
    name: String,
    start_delimiter: String,
    end_delimiter: String,
    frontmatter_pattern: Regex,
}

impl DelimiterFrontmatterSyntax {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_delimiters(name, "!!start", "!!end")
    }

    pub fn with_delimiters(
        name: impl Into<String>,
        start_delimiter: impl Into<String>,
        end_delimiter: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            start_delimiter: start_delimiter.into(),
            end_delimiter: end_delimiter.into(),
            frontmatter_pattern: Regex::new(r"^---\s*$").expect("static pattern"),
        }
    }
}

impl Syntax for DelimiterFrontmatterSyntax {
    fn name(&self) -> &str {
        &self.name
    }

    fn detect_line(&self, line: &str, candidate: Option<&Candidate>) -> DetectionResult {
        match candidate {
            None => {
                if line.trim() == self.start_delimiter {
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
                    } else {
                        // No frontmatter present: skip straight to content.
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
                    if line.trim() == self.end_delimiter {
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
    }

    fn parse_metadata(&self, candidate: &Candidate, schema: &dyn Schema) -> ParseOutcome {
        let mut metadata_map = parse_yaml_map(&candidate.metadata_lines)
            .map_err(|e| ParseFailure::new(ErrorCode::SyntaxError, format!("invalid YAML: {e}")))?;
        default_metadata_fields(&mut metadata_map, candidate, "unknown");

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::IdGenerator;
    use crate::schema::BaseSchema;

    fn new_candidate() -> Candidate {
        let mut gen = IdGenerator::new();
        Candidate::new(gen.next_block_id(), 1)
    }

    #[test]
    fn test_detect_opening() {
        let syntax = DelimiterFrontmatterSyntax::new("frontmatter");
        let result = syntax.detect_line("!!start", None);
        assert!(result.is_opening);
    }

    #[test]
    fn test_header_to_metadata_transition() {
        let syntax = DelimiterFrontmatterSyntax::new("frontmatter");
        let candidate = new_candidate();
        let result = syntax.detect_line("---", Some(&candidate));
        assert!(result.is_metadata_boundary);
        assert_eq!(result.next_section, Some(Section::Metadata));
    }

    #[test]
    fn test_header_without_frontmatter_skips_to_content() {
        let syntax = DelimiterFrontmatterSyntax::new("frontmatter");
        let candidate = new_candidate();
        let result = syntax.detect_line("plain content line", Some(&candidate));
        assert_eq!(result.next_section, Some(Section::Content));
        assert!(!result.is_metadata_boundary);
        assert!(result.bucket);
    }

    #[test]
    fn test_metadata_to_content_transition() {
        let syntax = DelimiterFrontmatterSyntax::new("frontmatter");
        let mut candidate = new_candidate();
        candidate.section = Section::Metadata;
        let result = syntax.detect_line("---", Some(&candidate));
        assert!(result.is_metadata_boundary);
        assert_eq!(result.next_section, Some(Section::Content));
    }

    #[test]
    fn test_closing_marker() {
        let syntax = DelimiterFrontmatterSyntax::new("frontmatter");
        let mut candidate = new_candidate();
        candidate.section = Section::Content;
        let result = syntax.detect_line("!!end", Some(&candidate));
        assert!(result.is_closing);
    }

    #[test]
    fn test_parse_metadata_with_yaml() {
        let syntax = DelimiterFrontmatterSyntax::new("frontmatter");
        let mut candidate = new_candidate();
        candidate.metadata_lines.push("id: b1".to_string());
        candidate.metadata_lines.push("block_type: note".to_string());

        let metadata = syntax.parse_metadata(&candidate, &BaseSchema).unwrap();
        assert_eq!(metadata["block_type"], "note");
    }

    #[test]
    fn test_parse_content_wraps_raw_text() {
        let syntax = DelimiterFrontmatterSyntax::new("frontmatter");
        let mut candidate = new_candidate();
        candidate.content_lines.push("hello".to_string());

        let content = syntax.parse_content(&candidate, &BaseSchema).unwrap();
        assert_eq!(content["raw_content"], "hello");
    }

    #[test]
    fn test_parse_metadata_defaults_missing_id_and_type() {
        let syntax = DelimiterFrontmatterSyntax::new("frontmatter");
        let candidate = new_candidate();

        let metadata = syntax.parse_metadata(&candidate, &BaseSchema).unwrap();
        assert_eq!(metadata["block_type"], "unknown");
        assert!(metadata["id"].as_str().unwrap().starts_with("block_"));
    }

    #[test]
    fn test_parse_metadata_invalid_yaml_is_syntax_error() {
        let syntax = DelimiterFrontmatterSyntax::new("frontmatter");
        let mut candidate = new_candidate();
        candidate.metadata_lines.push("key: [1, 2".to_string());

        let failure = syntax.parse_metadata(&candidate, &BaseSchema).unwrap_err();
        assert_eq!(failure.code, ErrorCode::SyntaxError);
    }
}
