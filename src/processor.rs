//! The public façade: composes [`LineFramer`], [`BlockStateMachine`] and an
//! [`InputAdapter`] into a single streaming pipeline.

use crate::adapter::{ChunkCategory, IdentityAdapter, InputAdapter};
use crate::config::ProcessorConfig;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::framer::LineFramer;
use crate::registry::Registry;
use crate::state_machine::BlockStateMachine;
use futures::{Stream, StreamExt};
use std::marker::PhantomData;
use std::pin::Pin;

/// Either a derived [`Event`] or an adapter chunk passed through unchanged.
/// Passthrough chunks only appear when a non-identity adapter categorizes a
/// chunk as [`ChunkCategory::Passthrough`].
#[derive(Debug, Clone)]
pub enum StreamItem<C> {
    Event(Event),
    Opaque(C),
}

impl<C> StreamItem<C> {
    pub fn event(self) -> Option<Event> {
        match self {
            StreamItem::Event(e) => Some(e),
            StreamItem::Opaque(_) => None,
        }
    }
}

/// Turns a stream of chunks of type `C` into a stream of [`StreamItem`]s.
///
/// `C` defaults to `String` with the [`IdentityAdapter`]; plug in a custom
/// [`InputAdapter`] to process provider-specific chunk types.
pub struct Processor<C = String, A = IdentityAdapter>
where
    A: InputAdapter<C>,
{
    framer: LineFramer,
    state_machine: BlockStateMachine,
    adapter: A,
    config: ProcessorConfig,
    line_counter: u64,
    consumed: bool,
    _chunk: PhantomData<C>,
}

impl Processor<String, IdentityAdapter> {
    /// A processor over plain `String` chunks using the identity adapter.
    pub fn new(registry: Registry, config: ProcessorConfig) -> Self {
        Self::with_adapter(registry, config, IdentityAdapter)
    }
}

impl<C, A> Processor<C, A>
where
    A: InputAdapter<C>,
{
    pub fn with_adapter(registry: Registry, config: ProcessorConfig, adapter: A) -> Self {
        Self {
            framer: LineFramer::new(config.max_line_length),
            state_machine: BlockStateMachine::new(registry, config.clone()),
            adapter,
            config,
            line_counter: 0,
            consumed: false,
            _chunk: PhantomData,
        }
    }

    pub fn line_number(&self) -> u64 {
        self.line_counter
    }

    /// Process a single incoming chunk synchronously.
    pub fn process_chunk(&mut self, chunk: C) -> Vec<StreamItem<C>> {
        let mut items = Vec::new();

        if matches!(self.adapter.categorize(&chunk), ChunkCategory::Passthrough) {
            if self.config.emit_original_events {
                items.push(StreamItem::Opaque(chunk));
            }
            return items;
        }

        let Some(text) = self.adapter.extract_text(&chunk) else {
            return items;
        };

        if self.config.emit_text_deltas && !text.is_empty() {
            let metadata = self.adapter.get_metadata(&chunk);
            items.push(StreamItem::Event(
                self.state_machine.text_delta_event(text.clone(), metadata),
            ));
        }

        for line in self.framer.push(&text) {
            self.line_counter += 1;
            let line_number = self.line_counter;
            items.extend(
                self.state_machine
                    .process_line(&line, line_number)
                    .into_iter()
                    .map(StreamItem::Event),
            );
        }

        items
    }

    /// Flush any buffered partial line and reject every still-open
    /// candidate. Call once after the input stream ends.
    pub fn finalize(&mut self) -> Vec<StreamItem<C>> {
        let mut items = Vec::new();

        if let Some(line) = self.framer.finalize() {
            self.line_counter += 1;
            let line_number = self.line_counter;
            items.extend(
                self.state_machine
                    .process_line(&line, line_number)
                    .into_iter()
                    .map(StreamItem::Event),
            );
        }

        let end_line = self.line_counter;
        items.extend(
            self.state_machine
                .finalize(end_line)
                .into_iter()
                .map(StreamItem::Event),
        );

        items
    }

    /// Drive an entire input stream to completion, yielding
    /// `StreamStarted` / ... / `StreamFinished` around the derived events.
    ///
    /// May only be called once per processor instance; a second call
    /// returns [`Error::AlreadyConsumed`].
    pub fn process_stream<'a, S>(
        &'a mut self,
        input: S,
    ) -> Result<Pin<Box<dyn Stream<Item = StreamItem<C>> + Send + 'a>>>
    where
        S: Stream<Item = C> + Send + 'a,
        C: Send + 'a,
    {
        if self.consumed {
            return Err(Error::AlreadyConsumed);
        }
        self.consumed = true;

        let stream: Pin<Box<dyn Stream<Item = StreamItem<C>> + Send + 'a>> =
            Box::pin(async_stream::stream! {
                yield StreamItem::Event(self.state_machine.stream_started_event());

                futures::pin_mut!(input);
                while let Some(chunk) = input.next().await {
                    for item in self.process_chunk(chunk) {
                        yield item;
                    }
                }

                for item in self.finalize() {
                    yield item;
                }

                yield StreamItem::Event(self.state_machine.stream_finished_event());
            });
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ErrorCode;
    use crate::syntax::DelimiterFrontmatterSyntax;
    use futures::stream;
    use std::sync::Arc;

    fn new_processor() -> Processor<String, IdentityAdapter> {
        let syntax = Arc::new(DelimiterFrontmatterSyntax::new("frontmatter"));
        let registry = Registry::new(syntax);
        Processor::new(registry, ProcessorConfig::default())
    }

    #[test]
    fn test_process_chunk_splits_into_lines() {
        let mut processor = new_processor();
        let items = processor.process_chunk("hello\nworld\n".to_string());
        let events: Vec<_> = items.into_iter().filter_map(StreamItem::event).collect();
        let text_contents = events
            .iter()
            .filter(|e| matches!(e, Event::TextContent { .. }))
            .count();
        assert_eq!(text_contents, 2);
    }

    #[test]
    fn test_process_chunk_emits_text_delta() {
        let mut processor = new_processor();
        let items = processor.process_chunk("partial".to_string());
        assert!(items
            .iter()
            .any(|i| matches!(i, StreamItem::Event(Event::TextDelta { .. }))));
    }

    #[test]
    fn test_finalize_rejects_unclosed_block() {
        let mut processor = new_processor();
        processor.process_chunk("!!start\n".to_string());
        let items = processor.finalize();
        let has_rejection = items.into_iter().any(|i| {
            matches!(
                i,
                StreamItem::Event(Event::BlockError {
                    error_code: ErrorCode::UnclosedBlock,
                    ..
                })
            )
        });
        assert!(has_rejection);
    }

    #[tokio::test]
    async fn test_process_stream_full_lifecycle() {
        let mut processor = new_processor();
        let chunks = stream::iter(vec![
            "!!start\n---\nid: b1\nblock_type: note\n---\nhello\n!!end\n".to_string(),
        ]);

        let mut output = processor.process_stream(chunks).unwrap();
        let mut events = Vec::new();
        while let Some(item) = output.next().await {
            if let StreamItem::Event(e) = item {
                events.push(e);
            }
        }

        assert!(matches!(events.first(), Some(Event::StreamStarted { .. })));
        assert!(matches!(events.last(), Some(Event::StreamFinished { .. })));
        assert!(events.iter().any(|e| matches!(e, Event::BlockEnd { .. })));
    }

    #[tokio::test]
    async fn test_process_stream_twice_errors() {
        let mut processor = new_processor();
        let first = stream::iter(Vec::<String>::new());
        drop(processor.process_stream(first).unwrap());

        let second = stream::iter(Vec::<String>::new());
        let err = processor.process_stream(second).unwrap_err();
        assert!(matches!(err, Error::AlreadyConsumed));
    }
}
