//! Turns a stream of arbitrarily-chunked text into complete lines.
//!
//! Incoming text rarely lines up with line boundaries — a single input
//! chunk can span a fraction of a line or several. `LineFramer` buffers the
//! trailing incomplete segment across calls and only ever yields whole
//! lines (newline stripped), truncated to `max_line_length`.

pub struct LineFramer {
    pending: String,
    max_line_length: usize,
}

impl LineFramer {
    pub fn new(max_line_length: usize) -> Self {
        Self {
            pending: String::new(),
            max_line_length,
        }
    }

    /// Feed newly arrived text, returning every line it completes. Any
    /// trailing partial line is retained for the next call.
    pub fn push(&mut self, text: &str) -> Vec<String> {
        self.pending.push_str(text);
        self.drain_complete_lines()
    }

    fn drain_complete_lines(&mut self) -> Vec<String> {
        if !self.pending.contains('\n') {
            return Vec::new();
        }

        let ends_with_newline = self.pending.ends_with('\n');
        let mut parts: Vec<String> = self.pending.split('\n').map(str::to_string).collect();

        // `"a\n".split('\n')` yields `["a", ""]`; the trailing empty string
        // is an artifact of the split, not a pending partial line.
        if ends_with_newline {
            parts.pop();
            self.pending.clear();
        } else {
            self.pending = parts.pop().unwrap_or_default();
        }

        parts.into_iter().map(|l| self.truncate(l)).collect()
    }

    /// Flush any buffered partial line as a final line. Call once at
    /// end-of-stream; returns `None` if nothing is buffered.
    pub fn finalize(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            let line = std::mem::take(&mut self.pending);
            Some(self.truncate(line))
        }
    }

    fn truncate(&self, line: String) -> String {
        if line.chars().count() > self.max_line_length {
            line.chars().take(self.max_line_length).collect()
        } else {
            line
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_complete_line() {
        let mut framer = LineFramer::new(16_384);
        assert_eq!(framer.push("hello\n"), vec!["hello".to_string()]);
        assert_eq!(framer.finalize(), None);
    }

    #[test]
    fn test_chunk_splits_mid_line() {
        let mut framer = LineFramer::new(16_384);
        assert!(framer.push("hel").is_empty());
        assert_eq!(framer.push("lo\nworld"), vec!["hello".to_string()]);
        assert_eq!(framer.finalize(), Some("world".to_string()));
    }

    #[test]
    fn test_multiple_lines_in_one_chunk() {
        let mut framer = LineFramer::new(16_384);
        let lines = framer.push("a\nb\nc\n");
        assert_eq!(lines, vec!["a".to_string(), "b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_blank_lines_preserved() {
        let mut framer = LineFramer::new(16_384);
        let lines = framer.push("a\n\nb\n");
        assert_eq!(lines, vec!["a".to_string(), "".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_truncates_overlong_line() {
        let mut framer = LineFramer::new(4);
        let lines = framer.push("abcdefgh\n");
        assert_eq!(lines, vec!["abcd".to_string()]);
    }

    #[test]
    fn test_finalize_truncates_too() {
        let mut framer = LineFramer::new(4);
        framer.push("abcdefgh");
        assert_eq!(framer.finalize(), Some("abcd".to_string()));
    }

    #[test]
    fn test_finalize_empty_buffer_is_none() {
        let mut framer = LineFramer::new(16_384);
        framer.push("a\n");
        assert_eq!(framer.finalize(), None);
    }
}
