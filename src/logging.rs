//! Timestamped line logger for the operator transcript
//!
//! Every logical event (check started, check result, check failure) becomes
//! one line on standard output, prefixed with a `[YYYY/MM/DD HH:MM:SS]`
//! timestamp. The sink is injectable so tests can capture the transcript in
//! memory instead of scraping stdout.

use chrono::Local;
use colored::Colorize;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// chrono format string for the transcript timestamp prefix
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

enum Sink {
    Stdout,
    Memory(Vec<String>),
}

/// Line-oriented transcript logger. Cheap to clone; clones share the sink.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<Mutex<Sink>>,
    use_color: bool,
}

impl Logger {
    /// Logger writing to standard output
    pub fn stdout(use_color: bool) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Sink::Stdout)),
            use_color,
        }
    }

    /// Logger capturing lines in memory, for tests
    pub fn memory() -> Self {
        Self {
            sink: Arc::new(Mutex::new(Sink::Memory(Vec::new()))),
            use_color: false,
        }
    }

    /// Log an informational line
    pub fn log(&self, message: &str) {
        self.write(message, false);
    }

    /// Log a check failure line. Rendered in red when color is enabled;
    /// failures are transcript content, not a reason to abort.
    pub fn failure(&self, message: &str) {
        self.write(message, true);
    }

    fn write(&self, message: &str, failure: bool) {
        let line = format!("[{}] {}", Local::now().format(TIMESTAMP_FORMAT), message);
        let mut sink = self.sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match &mut *sink {
            Sink::Stdout => {
                let rendered = if failure && self.use_color {
                    line.as_str().red().to_string()
                } else {
                    line
                };
                // Logging never fails the run.
                let _ = writeln!(io::stdout(), "{}", rendered);
            }
            Sink::Memory(lines) => lines.push(line),
        }
    }

    /// Transcript captured so far. Empty for stdout loggers.
    pub fn lines(&self) -> Vec<String> {
        let sink = self.sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match &*sink {
            Sink::Memory(lines) => lines.clone(),
            Sink::Stdout => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn test_lines_carry_timestamp_prefix() {
        let logger = Logger::memory();
        logger.log("Looking up address names");

        let lines = logger.lines();
        assert_eq!(lines.len(), 1);

        let prefix = Regex::new(r"^\[\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2}\] ").unwrap();
        assert!(
            prefix.is_match(&lines[0]),
            "unexpected line format: {}",
            lines[0]
        );
        assert!(lines[0].ends_with("Looking up address names"));
    }

    #[test]
    fn test_transcript_preserves_order() {
        let logger = Logger::memory();
        logger.log("first");
        logger.failure("second");
        logger.log("third");

        let lines = logger.lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("first"));
        assert!(lines[1].ends_with("second"));
        assert!(lines[2].ends_with("third"));
    }

    #[test]
    fn test_clones_share_the_sink() {
        let logger = Logger::memory();
        let clone = logger.clone();
        clone.log("from the clone");

        assert_eq!(logger.lines().len(), 1);
    }

    #[test]
    fn test_memory_failures_are_uncolored() {
        let logger = Logger::memory();
        logger.failure("Could not look up names: boom");

        let line = &logger.lines()[0];
        assert!(!line.contains('\u{1b}'), "memory transcript must stay plain");
    }
}
