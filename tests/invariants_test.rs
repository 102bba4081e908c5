//! Property-style checks for the quantified invariants in spec §8.

use futures::{stream, StreamExt};
use std::sync::Arc;
use streamblocks::prelude::*;

fn frontmatter_processor() -> Processor<String, IdentityAdapter> {
    let syntax = Arc::new(DelimiterFrontmatterSyntax::new("frontmatter"));
    Processor::new(Registry::new(syntax), ProcessorConfig::default())
}

fn preamble_processor() -> Processor<String, IdentityAdapter> {
    let syntax = Arc::new(DelimiterPreambleSyntax::new("preamble").unwrap());
    Processor::new(Registry::new(syntax), ProcessorConfig::default())
}

async fn drive(processor: &mut Processor<String, IdentityAdapter>, chunks: Vec<&str>) -> Vec<Event> {
    let owned: Vec<String> = chunks.into_iter().map(String::from).collect();
    let mut output = processor.process_stream(stream::iter(owned)).unwrap();
    let mut events = Vec::new();
    while let Some(item) = output.next().await {
        if let StreamItem::Event(e) = item {
            events.push(e);
        }
    }
    events
}

/// Invariant 2: for every `block_id` that appears, exactly one `BlockStart`
/// precedes any other event carrying that id, and exactly one of
/// `BlockEnd`/`BlockError` is the last event carrying it.
#[tokio::test]
async fn invariant_block_start_precedes_and_terminal_event_is_unique() {
    let mut processor = frontmatter_processor();
    let events = drive(
        &mut processor,
        vec!["!!start\n---\nid: a\nblock_type: note\n---\nhello\n!!end\nplain\n"],
    )
    .await;

    use std::collections::HashMap;
    let mut first_index: HashMap<String, usize> = HashMap::new();
    let mut last_index: HashMap<String, usize> = HashMap::new();
    let mut first_is_start: HashMap<String, bool> = HashMap::new();

    for (idx, event) in events.iter().enumerate() {
        if let Some(block_id) = event.block_id() {
            let key = block_id.as_str().to_string();
            first_index.entry(key.clone()).or_insert(idx);
            if !first_is_start.contains_key(&key) {
                first_is_start.insert(key.clone(), matches!(event, Event::BlockStart { .. }));
            }
            last_index.insert(key, idx);
        }
    }

    assert!(!first_index.is_empty(), "expected at least one block_id in this run");
    for (block_id, is_start) in &first_is_start {
        assert!(is_start, "first event for {block_id} was not BlockStart");
    }
    for (block_id, &idx) in &last_index {
        let terminal_ok = matches!(
            events[idx],
            Event::BlockEnd { .. } | Event::BlockError { .. }
        );
        assert!(terminal_ok, "last event for {block_id} was not BlockEnd/BlockError");
    }
}

/// Invariant 3: for a successful `BlockEnd`, `line_start <= line_end`.
#[tokio::test]
async fn invariant_block_end_line_ordering() {
    let mut processor = preamble_processor();
    let events = drive(&mut processor, vec!["!!b1:note\nline one\nline two\n!!end\n"]).await;

    let found = events.iter().any(|e| match e {
        Event::BlockEnd {
            start_line,
            end_line,
            ..
        } => {
            assert!(start_line <= end_line);
            true
        }
        _ => false,
    });
    assert!(found, "expected a BlockEnd event");
}

/// Invariant 4: exceeding `max_block_size` always yields `SizeExceeded` and
/// never a `BlockEnd` for that candidate.
#[tokio::test]
async fn invariant_size_exceeded_never_completes() {
    let syntax = Arc::new(DelimiterPreambleSyntax::new("preamble").unwrap());
    let config = ProcessorConfig::builder().max_block_size(32).build().unwrap();
    let mut processor = Processor::new(Registry::new(syntax), config);

    let events = drive(
        &mut processor,
        vec!["!!b1:note\n", &"y".repeat(200), "\n!!end\n"],
    )
    .await;

    assert!(events
        .iter()
        .any(|e| matches!(e, Event::BlockError { error_code: ErrorCode::SizeExceeded, .. })));
    assert!(!events.iter().any(|e| matches!(e, Event::BlockEnd { .. })));
}

/// Invariant 6: `TextContent` never carries a line number inside an open
/// block's span.
#[tokio::test]
async fn invariant_text_content_never_overlaps_a_block() {
    let mut processor = preamble_processor();
    let events = drive(
        &mut processor,
        vec!["before\n!!b1:note\ninside\n!!end\nafter\n"],
    )
    .await;

    let mut start_line = None;
    let mut end_line = None;
    for event in &events {
        match event {
            Event::BlockStart { start_line: s, .. } => start_line = Some(*s),
            Event::BlockEnd { end_line: e, .. } => end_line = Some(*e),
            _ => {}
        }
    }
    let (start_line, end_line) = (start_line.unwrap(), end_line.unwrap());

    for event in &events {
        if let Event::TextContent { line_number, .. } = event {
            assert!(
                *line_number < start_line || *line_number > end_line,
                "TextContent at line {line_number} overlaps block span [{start_line}, {end_line}]"
            );
        }
    }
}

/// Boundary behaviour: a final line lacking a trailing newline is still
/// processed exactly once (no duplicate, no drop).
#[tokio::test]
async fn boundary_final_line_without_trailing_newline_processed_once() {
    let mut processor = preamble_processor();
    let events = drive(&mut processor, vec!["no trailing newline"]).await;

    let text_lines: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            Event::TextContent { line, .. } => Some(line.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(text_lines, vec!["no trailing newline".to_string()]);
}

/// Boundary behaviour: an opening marker with no subsequent bytes emits
/// `BlockStart` then, at end-of-stream, `BlockError(UNCLOSED_BLOCK)`.
#[tokio::test]
async fn boundary_opening_marker_with_no_body_is_unclosed_at_eof() {
    let mut processor = preamble_processor();
    let events = drive(&mut processor, vec!["!!b1:note\n"]).await;

    assert!(events.iter().any(|e| matches!(e, Event::BlockStart { .. })));
    assert!(events.iter().any(|e| matches!(
        e,
        Event::BlockError {
            error_code: ErrorCode::UnclosedBlock,
            ..
        }
    )));
}

/// Boundary behaviour: a never-opened stream emits only `TextContent` (plus
/// stream bookends and, if enabled, `TextDelta`s).
#[tokio::test]
async fn boundary_never_opened_stream_is_all_text_content() {
    let mut processor = preamble_processor();
    let events = drive(&mut processor, vec!["alpha\nbeta\ngamma\n"]).await;

    let text_count = events
        .iter()
        .filter(|e| matches!(e, Event::TextContent { .. }))
        .count();
    assert_eq!(text_count, 3);

    let other_non_bookend = events
        .iter()
        .filter(|e| {
            !matches!(
                e,
                Event::TextContent { .. }
                    | Event::TextDelta { .. }
                    | Event::StreamStarted { .. }
                    | Event::StreamFinished { .. }
            )
        })
        .count();
    assert_eq!(other_non_bookend, 0);
}
