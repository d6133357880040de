//! Output sink consumed by the session engine.
//!
//! The renderer, pagination engine and error path all write through the
//! [`OutputSink`] trait so that the engine can be driven against a real
//! terminal or against an in-memory buffer in tests and embeddings.

use std::io::Write;

/// Sink for already-formatted shell output.
pub trait OutputSink: Send {
    /// Print a line of text (trailing newline added).
    fn print(&mut self, text: &str);

    /// Print text without a trailing newline.
    fn print_inline(&mut self, text: &str);

    /// Print an error report line.
    fn print_error(&mut self, text: &str) {
        self.print(text);
    }
}

/// Sink writing to the process stdout/stderr.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl StdoutSink {
    pub fn new() -> Self {
        Self
    }
}

impl OutputSink for StdoutSink {
    fn print(&mut self, text: &str) {
        println!("{text}");
    }

    fn print_inline(&mut self, text: &str) {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }

    fn print_error(&mut self, text: &str) {
        eprintln!("{text}");
    }
}

/// Sink collecting output in memory.
///
/// Used by the engine's tests and useful when embedding the session
/// engine without a terminal.
#[derive(Debug, Default)]
pub struct MemorySink {
    buffer: String,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything printed so far.
    pub fn contents(&self) -> &str {
        &self.buffer
    }

    /// Printed output split into lines.
    pub fn lines(&self) -> Vec<&str> {
        self.buffer.lines().collect()
    }

    /// Discard collected output.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl OutputSink for MemorySink {
    fn print(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    fn print_inline(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_lines() {
        let mut sink = MemorySink::new();
        sink.print("one");
        sink.print_inline("tw");
        sink.print_inline("o");
        sink.print("");
        assert_eq!(sink.lines(), vec!["one", "two"]);
    }

    #[test]
    fn test_memory_sink_clear() {
        let mut sink = MemorySink::new();
        sink.print("x");
        sink.clear();
        assert!(sink.contents().is_empty());
    }
}
