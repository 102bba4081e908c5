//! `!!id:type[:params]` ... `!!end` — inline metadata, no separate section.

use super::{DetectionResult, ParseFailure, ParseOutcome, Syntax};
use crate::candidate::Candidate;
use crate::event::{ErrorCode, ExtractedBlock, Section};
use crate::schema::Schema;
use regex::Regex;
use serde_json::{Map, Value};

/// Delimiter syntax with inline metadata on the opening line:
/// `!!<id>:<type>[:param1:param2...]` ... `!!end`.
pub struct DelimiterPreambleSyntax {
    name: String,
    delimiter: String,
    opening_pattern: Regex,
    closing_pattern: Regex,
}

impl DelimiterPreambleSyntax {
    pub fn new(name: impl Into<String>) -> crate::error::Result<Self> {
        Self::with_delimiter(name, "!!")
    }

    pub fn with_delimiter(
        name: impl Into<String>,
        delimiter: impl Into<String>,
    ) -> crate::error::Result<Self> {
        let delimiter = delimiter.into();
        if delimiter.is_empty() {
            return Err(crate::error::Error::invalid_input(
                "delimiter must not be empty",
            ));
        }
        let escaped = regex::escape(&delimiter);
        let opening_pattern = Regex::new(&format!(r"^{escaped}(\w+):(\w+)(:.+)?$"))
            .map_err(|e| crate::error::Error::invalid_input(e.to_string()))?;
        let closing_pattern = Regex::new(&format!(r"^{escaped}end$"))
            .map_err(|e| crate::error::Error::invalid_input(e.to_string()))?;
        Ok(Self {
            name: name.into(),
            delimiter,
            opening_pattern,
            closing_pattern,
        })
    }
}

impl Syntax for DelimiterPreambleSyntax {
    fn name(&self) -> &str {
        &self.name
    }

    fn detect_line(&self, line: &str, candidate: Option<&Candidate>) -> DetectionResult {
        match candidate {
            None => {
                let Some(caps) = self.opening_pattern.captures(line) else {
                    return DetectionResult::default();
                };
                let block_id = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                let block_type = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
                let params = caps.get(3).map(|m| m.as_str());

                let mut metadata = Map::new();
                metadata.insert("id".to_string(), Value::String(block_id.to_string()));
                metadata.insert(
                    "block_type".to_string(),
                    Value::String(block_type.to_string()),
                );
                if let Some(params) = params {
                    // params includes the leading ':' separator.
                    for (i, part) in params[1..].split(':').enumerate() {
                        metadata.insert(format!("param_{i}"), Value::String(part.to_string()));
                    }
                }

                DetectionResult {
                    is_opening: true,
                    metadata: Some(metadata),
                    ..Default::default()
                }
            }
            Some(_) => {
                if self.closing_pattern.is_match(line) {
                    DetectionResult {
                        is_closing: true,
                        ..Default::default()
                    }
                } else {
                    // No separate metadata section: everything between the
                    // opening and closing markers is content.
                    DetectionResult {
                        next_section: Some(Section::Content),
                        bucket: true,
                        ..Default::default()
                    }
                }
            }
        }
    }

    fn extract_block_type(&self, candidate: &Candidate) -> Option<String> {
        candidate
            .inline_metadata
            .as_ref()
            .and_then(|m| m.get("block_type"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    fn parse_metadata(&self, candidate: &Candidate, schema: &dyn Schema) -> ParseOutcome {
        let Some(inline) = candidate.inline_metadata.as_ref() else {
            return Err(ParseFailure::new(
                ErrorCode::MissingMetadata,
                "missing metadata in preamble opening line",
            ));
        };
        schema
            .parse_metadata(inline)
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
    fn test_detect_opening_with_params() {
        let syntax = DelimiterPreambleSyntax::new("preamble").unwrap();
        let result = syntax.detect_line("!!file01:files_operations:src/main.py:C", None);
        assert!(result.is_opening);
        let md = result.metadata.unwrap();
        assert_eq!(md["id"], Value::String("file01".into()));
        assert_eq!(md["block_type"], Value::String("files_operations".into()));
        assert_eq!(md["param_0"], Value::String("src/main.py".into()));
        assert_eq!(md["param_1"], Value::String("C".into()));
    }

    #[test]
    fn test_detect_opening_without_params() {
        let syntax = DelimiterPreambleSyntax::new("preamble").unwrap();
        let result = syntax.detect_line("!!patch01:patch", None);
        assert!(result.is_opening);
        let md = result.metadata.unwrap();
        assert!(!md.contains_key("param_0"));
    }

    #[test]
    fn test_detect_no_match_returns_default() {
        let syntax = DelimiterPreambleSyntax::new("preamble").unwrap();
        let result = syntax.detect_line("just some text", None);
        assert!(!result.is_opening);
    }

    #[test]
    fn test_detect_closing() {
        let syntax = DelimiterPreambleSyntax::new("preamble").unwrap();
        let candidate = new_candidate();
        let result = syntax.detect_line("!!end", Some(&candidate));
        assert!(result.is_closing);
    }

    #[test]
    fn test_detect_body_line_moves_to_content() {
        let syntax = DelimiterPreambleSyntax::new("preamble").unwrap();
        let candidate = new_candidate();
        let result = syntax.detect_line("some content", Some(&candidate));
        assert_eq!(result.next_section, Some(Section::Content));
        assert!(result.bucket);
    }

    #[test]
    fn test_parse_metadata_and_content_roundtrip() {
        let syntax = DelimiterPreambleSyntax::new("preamble").unwrap();
        let mut candidate = new_candidate();
        let detection = syntax.detect_line("!!file01:files_operations:a.py", None);
        candidate.inline_metadata = detection.metadata;
        candidate.content_lines.push("line one".to_string());
        candidate.content_lines.push("line two".to_string());

        let metadata = syntax.parse_metadata(&candidate, &BaseSchema).unwrap();
        assert_eq!(metadata["id"], Value::String("file01".into()));

        let content = syntax.parse_content(&candidate, &BaseSchema).unwrap();
        assert_eq!(
            content["raw_content"],
            Value::String("line one\nline two".into())
        );
    }

    #[test]
    fn test_parse_metadata_missing_fails() {
        let syntax = DelimiterPreambleSyntax::new("preamble").unwrap();
        let candidate = new_candidate();
        let failure = syntax.parse_metadata(&candidate, &BaseSchema).unwrap_err();
        assert_eq!(failure.code, ErrorCode::MissingMetadata);
    }

    #[test]
    fn test_empty_delimiter_rejected() {
        let err = DelimiterPreambleSyntax::with_delimiter("preamble", "").unwrap_err();
        assert!(matches!(err, crate::error::Error::InvalidInput(_)));
    }
}
