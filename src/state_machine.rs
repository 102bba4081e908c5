//! Drives every open [`Candidate`] through its lifecycle, one framed line
//! at a time, and turns the result into the block event taxonomy.
//!
//! This is the direct analog of the reference processor's per-line
//! dispatch: each already-open candidate gets first refusal on a line
//! (closing / metadata-boundary / regular); only when no candidate is open
//! at all does a line get a chance to open a new one.

use crate::candidate::{BlockState, Candidate};
use crate::event::{ErrorCode, Event, ExtractedBlock, Section};
use crate::ids::{now_millis, IdGenerator};
use crate::registry::Registry;
use crate::schema::{BaseSchema, Schema};
use crate::config::ProcessorConfig;
use serde_json::Value;
use std::collections::VecDeque;

pub struct BlockStateMachine {
    registry: Registry,
    config: ProcessorConfig,
    candidates: Vec<Candidate>,
    ids: IdGenerator,
    recent_lines: VecDeque<String>,
}

impl BlockStateMachine {
    pub fn new(registry: Registry, config: ProcessorConfig) -> Self {
        Self {
            registry,
            config,
            candidates: Vec::new(),
            ids: IdGenerator::new(),
            recent_lines: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Number of candidates currently open. Always 0 or 1 in practice: a
    /// new candidate can only be opened once every existing one has closed.
    pub fn open_candidate_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn stream_started_event(&mut self) -> Event {
        Event::StreamStarted {
            event_id: self.ids.next_event_id(),
            timestamp_ms: now_millis(),
        }
    }

    pub fn stream_finished_event(&mut self) -> Event {
        Event::StreamFinished {
            event_id: self.ids.next_event_id(),
            timestamp_ms: now_millis(),
        }
    }

    pub fn stream_error_event(&mut self, message: String) -> Event {
        Event::StreamError {
            event_id: self.ids.next_event_id(),
            timestamp_ms: now_millis(),
            message,
        }
    }

    /// A delta of raw incoming text, independent of line boundaries.
    pub fn text_delta_event(
        &mut self,
        delta: String,
        metadata: Option<serde_json::Map<String, Value>>,
    ) -> Event {
        let inside_block = !self.candidates.is_empty();
        let section = self.candidates.last().map(|c| c.section);
        Event::TextDelta {
            event_id: self.ids.next_event_id(),
            timestamp_ms: now_millis(),
            delta,
            inside_block,
            section,
            metadata,
        }
    }

    /// Process one already-framed line, returning the events it produced.
    pub fn process_line(&mut self, line: &str, line_number: u64) -> Vec<Event> {
        self.remember_line(line);
        let mut events = Vec::new();
        let mut handled = false;

        let mut i = 0;
        while i < self.candidates.len() {
            handled = true;
            let detection = self
                .registry
                .syntax()
                .detect_line(line, Some(&self.candidates[i]));
            let mut candidate = self.candidates.remove(i);

            if detection.is_closing {
                candidate.push_line(line);
                candidate.state = BlockState::ClosingDetected;
                events.extend(self.extract_or_reject(candidate, line_number));
                continue;
            }

            if detection.is_metadata_boundary {
                if let Some(next) = detection.next_section {
                    candidate.advance_section(next);
                }
                candidate.push_line(line);
                events.push(self.metadata_boundary_event(&candidate, line));

                if candidate.section == Section::Content {
                    match self.resolve_metadata(&mut candidate, line_number) {
                        Ok(Some(metadata)) => {
                            events.push(self.metadata_end_event(candidate.block_id.clone(), metadata));
                        }
                        Ok(None) => {}
                        Err(rejection) => {
                            events.push(rejection);
                            continue;
                        }
                    }
                }
                self.candidates.insert(i, candidate);
                i += 1;
                continue;
            }

            // Regular line: apply any transition, resolve metadata if the
            // transition just entered the content section, bucket the line,
            // then check size.
            if let Some(next) = detection.next_section {
                candidate.advance_section(next);
            }

            if candidate.section == Section::Content {
                match self.resolve_metadata(&mut candidate, line_number) {
                    Ok(Some(metadata)) => {
                        events.push(self.metadata_end_event(candidate.block_id.clone(), metadata));
                    }
                    Ok(None) => {}
                    Err(rejection) => {
                        events.push(rejection);
                        continue;
                    }
                }
            }

            if detection.bucket {
                match candidate.section {
                    Section::Metadata => candidate.metadata_lines.push(line.to_string()),
                    Section::Content => candidate.content_lines.push(line.to_string()),
                    Section::Header => {}
                }
            }
            candidate.push_line(line);

            if candidate.size_bytes > self.config.max_block_size {
                events.push(self.rejection_event(
                    candidate.block_id.clone(),
                    candidate.start_line,
                    line_number,
                    ErrorCode::SizeExceeded,
                    format!(
                        "candidate exceeded max_block_size ({} bytes)",
                        self.config.max_block_size
                    ),
                ));
                continue;
            }

            events.push(self.section_delta_event(&candidate, line));
            self.candidates.insert(i, candidate);
            i += 1;
        }

        if !handled {
            let detection = self.registry.syntax().detect_line(line, None);
            if detection.is_opening {
                let block_id = self.ids.next_block_id();
                let mut candidate = Candidate::new(block_id.clone(), line_number);
                candidate.inline_metadata = detection.metadata.clone();
                candidate.push_line(line);
                tracing::debug!(block_id = %block_id, line = line_number, "block_candidate_created");

                events.push(Event::BlockStart {
                    event_id: self.ids.next_event_id(),
                    timestamp_ms: now_millis(),
                    block_id: block_id.clone(),
                    start_line: line_number,
                    syntax_name: self.registry.syntax().name().to_string(),
                    inline_metadata: detection.metadata.map(Value::Object),
                });

                // Preamble-style syntaxes carry their metadata inline on the
                // opening line; resolve it immediately rather than waiting
                // for a section boundary that will never arrive.
                if candidate.inline_metadata.is_some() {
                    match self.resolve_metadata(&mut candidate, line_number) {
                        Ok(Some(metadata)) => {
                            events.push(
                                self.metadata_end_event(candidate.block_id.clone(), metadata),
                            );
                            self.candidates.push(candidate);
                        }
                        Ok(None) => self.candidates.push(candidate),
                        Err(rejection) => events.push(rejection),
                    }
                } else {
                    self.candidates.push(candidate);
                }
            } else {
                events.push(Event::TextContent {
                    event_id: self.ids.next_event_id(),
                    timestamp_ms: now_millis(),
                    line: line.to_string(),
                    line_number,
                });
            }
        }

        events
    }

    /// Resolve a candidate's metadata exactly once, the first time it is
    /// called for a given candidate. Returns `Ok(None)` if already resolved,
    /// `Ok(Some(value))` the first time it succeeds, or `Err(event)` carrying
    /// the rejection event if the schema lookup or parse failed (the caller
    /// is responsible for dropping the candidate in that case).
    fn resolve_metadata(
        &mut self,
        candidate: &mut Candidate,
        line_number: u64,
    ) -> Result<Option<Value>, Event> {
        if candidate.metadata_result.is_some() {
            return Ok(None);
        }

        let block_type = self.registry.syntax().extract_block_type(candidate);
        let schema = match block_type.as_deref() {
            Some(bt) => match self.registry.get_schema(bt) {
                Some(schema) => Some(schema),
                None if self.config.strict_types => {
                    return Err(self.rejection_event(
                        candidate.block_id.clone(),
                        candidate.start_line,
                        line_number,
                        ErrorCode::UnknownType,
                        format!("unknown block type '{bt}'"),
                    ));
                }
                None => None,
            },
            None => None,
        };
        let base_schema = BaseSchema;
        let schema_ref: &dyn Schema = schema.as_deref().unwrap_or(&base_schema);

        match self.registry.syntax().parse_metadata(candidate, schema_ref) {
            Ok(value) => {
                candidate.metadata_result = Some(value.clone());
                Ok(Some(value))
            }
            Err(failure) => {
                tracing::warn!(block_id = %candidate.block_id, code = %failure.code, "block_rejected: metadata parse failure");
                Err(self.rejection_event(
                    candidate.block_id.clone(),
                    candidate.start_line,
                    line_number,
                    failure.code,
                    failure.message,
                ))
            }
        }
    }

    /// Reject every still-open candidate at end-of-stream.
    pub fn finalize(&mut self, line_number: u64) -> Vec<Event> {
        let remaining: Vec<Candidate> = self.candidates.drain(..).collect();
        remaining
            .into_iter()
            .map(|candidate| {
                tracing::warn!(block_id = %candidate.block_id, "block_rejected: unclosed at end of stream");
                self.rejection_event(
                    candidate.block_id,
                    candidate.start_line,
                    line_number,
                    ErrorCode::UnclosedBlock,
                    "stream ended without a closing marker".to_string(),
                )
            })
            .collect()
    }

    fn extract_or_reject(&mut self, mut candidate: Candidate, line_number: u64) -> Vec<Event> {
        let mut events = Vec::new();

        // A candidate whose body never transitioned into the content section
        // (e.g. a zero-body block) never had its metadata resolved early.
        let metadata = if let Some(metadata) = candidate.metadata_result.clone() {
            metadata
        } else {
            match self.resolve_metadata(&mut candidate, line_number) {
                Ok(Some(metadata)) => {
                    events.push(self.metadata_end_event(candidate.block_id.clone(), metadata.clone()));
                    metadata
                }
                Ok(None) => unreachable!("metadata_result checked above"),
                Err(rejection) => {
                    events.push(rejection);
                    return events;
                }
            }
        };

        let block_type = self.registry.syntax().extract_block_type(&candidate);
        let schema = block_type
            .as_deref()
            .and_then(|bt| self.registry.get_schema(bt));
        let base_schema = BaseSchema;
        let schema_ref: &dyn Schema = schema.as_deref().unwrap_or(&base_schema);

        let content = match self.registry.syntax().parse_content(&candidate, schema_ref) {
            Ok(content) => content,
            Err(failure) => {
                tracing::warn!(block_id = %candidate.block_id, code = %failure.code, "block_rejected: content parse failure");
                events.push(self.rejection_event(
                    candidate.block_id.clone(),
                    candidate.start_line,
                    line_number,
                    failure.code,
                    failure.message,
                ));
                return events;
            }
        };

        let raw_content = candidate.content_lines.join("\n");
        events.push(Event::BlockContentEnd {
            event_id: self.ids.next_event_id(),
            timestamp_ms: now_millis(),
            block_id: candidate.block_id.clone(),
            raw_content,
            content: content.clone(),
        });

        let extracted = ExtractedBlock {
            block_id: candidate.block_id.clone(),
            block_type,
            metadata,
            content,
            syntax_name: self.registry.syntax().name().to_string(),
            raw_text: candidate.raw_text(),
            line_start: candidate.start_line,
            line_end: line_number,
            hash_id: candidate.compute_hash(),
        };

        if !self.registry.syntax().validate_block(&extracted) {
            events.push(self.rejection_event(
                extracted.block_id,
                extracted.line_start,
                extracted.line_end,
                ErrorCode::ValidationFailed,
                "syntax validation failed".to_string(),
            ));
            return events;
        }
        if !self.registry.validate(&extracted) {
            events.push(self.rejection_event(
                extracted.block_id,
                extracted.line_start,
                extracted.line_end,
                ErrorCode::ValidationFailed,
                "registry validation failed".to_string(),
            ));
            return events;
        }

        tracing::debug!(block_id = %extracted.block_id, "block_extracted");
        events.push(Event::BlockEnd {
            event_id: self.ids.next_event_id(),
            timestamp_ms: now_millis(),
            block_id: extracted.block_id.clone(),
            start_line: extracted.line_start,
            end_line: extracted.line_end,
            block: extracted,
        });

        events
    }

    fn remember_line(&mut self, line: &str) {
        if self.config.lines_buffer == 0 {
            return;
        }
        if self.recent_lines.len() >= self.config.lines_buffer {
            self.recent_lines.pop_front();
        }
        self.recent_lines.push_back(line.to_string());
    }

    fn rejection_event(
        &mut self,
        block_id: crate::ids::BlockId,
        start_line: u64,
        end_line: u64,
        error_code: ErrorCode,
        message: String,
    ) -> Event {
        Event::BlockError {
            event_id: self.ids.next_event_id(),
            timestamp_ms: now_millis(),
            block_id,
            start_line,
            end_line,
            error_code,
            message,
            recent_lines: self.recent_lines.clone(),
        }
    }

    fn section_delta_event(&mut self, candidate: &Candidate, line: &str) -> Event {
        let block_id = candidate.block_id.clone();
        let event_id = self.ids.next_event_id();
        let timestamp_ms = now_millis();
        match candidate.section {
            Section::Header => Event::BlockHeaderDelta {
                event_id,
                timestamp_ms,
                block_id,
                delta: line.to_string(),
            },
            Section::Metadata => Event::BlockMetadataDelta {
                event_id,
                timestamp_ms,
                block_id,
                delta: line.to_string(),
                is_boundary: false,
            },
            Section::Content => Event::BlockContentDelta {
                event_id,
                timestamp_ms,
                block_id,
                delta: line.to_string(),
            },
        }
    }

    fn metadata_boundary_event(&mut self, candidate: &Candidate, line: &str) -> Event {
        Event::BlockMetadataDelta {
            event_id: self.ids.next_event_id(),
            timestamp_ms: now_millis(),
            block_id: candidate.block_id.clone(),
            delta: line.to_string(),
            is_boundary: true,
        }
    }

    fn metadata_end_event(&mut self, block_id: crate::ids::BlockId, metadata: Value) -> Event {
        Event::BlockMetadataEnd {
            event_id: self.ids.next_event_id(),
            timestamp_ms: now_millis(),
            block_id,
            metadata,
        }
    }
}
