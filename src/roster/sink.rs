//! Output sinks for the human-readable load summary
//!
//! The summary is a side channel: the loader returns a [`Report`] and, separately,
//! writes a few lines describing it to whatever sink the caller passes in. The
//! server captures those lines in a [`BufferSink`] per request; the CLI prints
//! them with a [`StdoutSink`].
//!
//! [`Report`]: super::Report

/// Destination for summary lines
pub trait SummarySink: Send {
    /// Write one line (without a trailing newline)
    fn emit(&mut self, line: &str);
}

/// Prints each line to standard output
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl SummarySink for StdoutSink {
    fn emit(&mut self, line: &str) {
        println!("{line}");
    }
}

/// Collects lines in memory
#[derive(Debug, Default, Clone)]
pub struct BufferSink {
    lines: Vec<String>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines captured so far
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Join the captured lines with `\n`
    pub fn into_text(self) -> String {
        self.lines.join("\n")
    }
}

impl SummarySink for BufferSink {
    fn emit(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

/// Forwards each line to `tracing` at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl SummarySink for TracingSink {
    fn emit(&mut self, line: &str) {
        tracing::info!(target: "roster::summary", "{line}");
    }
}
