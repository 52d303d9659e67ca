//! Output formatting and the operation transcript.
//!
//! Every orchestrated step records a line in a [`Transcript`]. When the
//! transcript echoes (the CLI case), lines are printed as they arrive through
//! [`OutputFormatter`], which owns all coloring and progress bar styling.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;

/// Prints styled status lines.
///
/// - Success messages (green with ✓)
/// - Error messages (red with ✗, on stderr)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// ```no_run
    /// use atomize::output::OutputFormatter;
    /// OutputFormatter::success("Moved button → atoms/");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar for the import scan.
    ///
    /// ```no_run
    /// use atomize::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(100);
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("█▓░"));
        }
        pb
    }
}

/// Severity of a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Header,
    Info,
    Success,
    Warning,
    Error,
    Plain,
}

/// One recorded line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub level: Level,
    pub message: String,
}

impl fmt::Display for TranscriptLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.level {
            Level::Header => "==",
            Level::Info => "--",
            Level::Success => "ok",
            Level::Warning => "!!",
            Level::Error => "xx",
            Level::Plain => "  ",
        };
        write!(f, "{} {}", marker, self.message)
    }
}

/// Human-readable audit trail of one operation.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    lines: Vec<TranscriptLine>,
    echo: bool,
}

impl Transcript {
    /// A transcript that only records.
    pub fn new() -> Self {
        Self::default()
    }

    /// A transcript that also prints every line as it is recorded.
    pub fn echoing() -> Self {
        Self {
            lines: Vec::new(),
            echo: true,
        }
    }

    fn record(&mut self, level: Level, message: String) {
        if self.echo {
            match level {
                Level::Header => OutputFormatter::header(&message),
                Level::Info => OutputFormatter::info(&message),
                Level::Success => OutputFormatter::success(&message),
                Level::Warning => OutputFormatter::warning(&message),
                Level::Error => OutputFormatter::error(&message),
                Level::Plain => OutputFormatter::plain(&message),
            }
        }
        self.lines.push(TranscriptLine { level, message });
    }

    pub fn header(&mut self, message: impl Into<String>) {
        self.record(Level::Header, message.into());
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.record(Level::Info, message.into());
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.record(Level::Success, message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.record(Level::Warning, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.record(Level::Error, message.into());
    }

    pub fn plain(&mut self, message: impl Into<String>) {
        self.record(Level::Plain, message.into());
    }

    pub fn lines(&self) -> &[TranscriptLine] {
        &self.lines
    }

    pub fn has_errors(&self) -> bool {
        self.lines.iter().any(|line| line.level == Level::Error)
    }

    /// Messages of the error lines, in order.
    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter(|line| line.level == Level::Error)
            .map(|line| line.message.as_str())
    }

    pub fn count(&self, level: Level) -> usize {
        self.lines.iter().filter(|line| line.level == level).count()
    }

    /// Whether any line contains `needle`. Handy in tests.
    pub fn mentions(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.message.contains(needle))
    }

    /// A progress bar for `total` items, hidden unless the transcript echoes.
    pub fn progress_bar(&self, total: u64) -> ProgressBar {
        if self.echo {
            OutputFormatter::create_progress_bar(total)
        } else {
            ProgressBar::hidden()
        }
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_records_levels() {
        let mut transcript = Transcript::new();
        transcript.info("scanning");
        transcript.success("moved button");
        transcript.warning("pool not empty");

        assert_eq!(transcript.lines().len(), 3);
        assert_eq!(transcript.count(Level::Success), 1);
        assert!(!transcript.has_errors());
        assert!(transcript.mentions("button"));

        transcript.error("could not write");
        assert!(transcript.has_errors());
    }

    #[test]
    fn test_transcript_errors_in_order() {
        let mut transcript = Transcript::new();
        transcript.error("first");
        transcript.warning("skipped");
        transcript.error("second");
        assert_eq!(transcript.errors().collect::<Vec<_>>(), vec!["first", "second"]);
    }

    #[test]
    fn test_transcript_display() {
        let mut transcript = Transcript::new();
        transcript.success("done");
        transcript.error("failed");
        assert_eq!(transcript.to_string(), "ok done\nxx failed\n");
    }

    #[test]
    fn test_silent_transcript_hides_progress() {
        let transcript = Transcript::new();
        assert!(transcript.progress_bar(10).is_hidden());
    }
}
