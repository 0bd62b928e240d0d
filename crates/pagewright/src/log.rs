//! Logging collaborator.
//!
//! Components report their steps as nested sections. [`TracingLogger`] turns
//! them into `tracing` events; [`RecordingLogger`] keeps them for inspection.

use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::fmt::Debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::result::PageResult;

/// Logger collaborator used by components and triggers
pub trait Logger: Debug {
    /// Log an informational step
    fn info(&self, message: &str);

    /// Open a verification section
    fn start_section(&self, message: &str);

    /// Close the innermost open section
    fn end_section(&self);

    /// Capture a screenshot with an optional title
    fn screenshot(&self, title: Option<&str>);
}

/// Logger backed by `tracing` events
#[derive(Debug, Default)]
pub struct TracingLogger {
    depth: Cell<usize>,
}

impl TracingLogger {
    /// Create a new logger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current section nesting depth
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth.get()
    }
}

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(depth = self.depth.get(), "{message}");
    }

    fn start_section(&self, message: &str) {
        tracing::info!(depth = self.depth.get(), section = message, "section started");
        self.depth.set(self.depth.get() + 1);
    }

    fn end_section(&self) {
        self.depth.set(self.depth.get().saturating_sub(1));
        tracing::debug!(depth = self.depth.get(), "section finished");
    }

    fn screenshot(&self, title: Option<&str>) {
        tracing::info!(
            depth = self.depth.get(),
            title = title.unwrap_or_default(),
            "screenshot"
        );
    }
}

/// A single recorded log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogEntry {
    /// Informational step
    Info {
        /// Message text
        message: String,
    },
    /// Section opened
    SectionStart {
        /// Section message
        message: String,
    },
    /// Section closed
    SectionEnd,
    /// Screenshot requested
    Screenshot {
        /// Optional title
        title: Option<String>,
    },
}

/// Logger that records every entry in order
#[derive(Debug, Default)]
pub struct RecordingLogger {
    entries: RefCell<Vec<LogEntry>>,
}

impl RecordingLogger {
    /// Create a new recording logger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries recorded so far
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.borrow().clone()
    }

    /// Messages of every opened section
    #[must_use]
    pub fn sections(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter_map(|entry| match entry {
                LogEntry::SectionStart { message } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Titles of every requested screenshot
    #[must_use]
    pub fn screenshots(&self) -> Vec<Option<String>> {
        self.entries
            .borrow()
            .iter()
            .filter_map(|entry| match entry {
                LogEntry::Screenshot { title } => Some(title.clone()),
                _ => None,
            })
            .collect()
    }

    /// Whether every opened section was closed
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        let mut depth: isize = 0;
        for entry in self.entries.borrow().iter() {
            match entry {
                LogEntry::SectionStart { .. } => depth += 1,
                LogEntry::SectionEnd => depth -= 1,
                _ => {}
            }
            if depth < 0 {
                return false;
            }
        }
        depth == 0
    }

    /// Export entries as JSON
    pub fn to_json(&self) -> PageResult<String> {
        Ok(serde_json::to_string_pretty(&*self.entries.borrow())?)
    }

    fn push(&self, entry: LogEntry) {
        self.entries.borrow_mut().push(entry);
    }
}

impl Logger for RecordingLogger {
    fn info(&self, message: &str) {
        self.push(LogEntry::Info {
            message: message.to_string(),
        });
    }

    fn start_section(&self, message: &str) {
        self.push(LogEntry::SectionStart {
            message: message.to_string(),
        });
    }

    fn end_section(&self) {
        self.push(LogEntry::SectionEnd);
    }

    fn screenshot(&self, title: Option<&str>) {
        self.push(LogEntry::Screenshot {
            title: title.map(str::to_string),
        });
    }
}

/// Output format for [`init_tracing`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event, fields flattened
    Json,
}

/// Install a global subscriber writing to stderr, filtered by `filter`
/// (e.g. `"pagewright=debug"`).
///
/// Does nothing if a subscriber is already installed.
pub fn init_tracing(filter: &str, format: LogFormat) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    let _ = match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_order() {
        let log = RecordingLogger::new();
        log.start_section("Verify columns");
        log.info("looking");
        log.screenshot(Some("before"));
        log.end_section();

        assert_eq!(log.entries().len(), 4);
        assert_eq!(log.sections(), vec!["Verify columns".to_string()]);
        assert_eq!(log.screenshots(), vec![Some("before".to_string())]);
        assert!(log.is_balanced());
    }

    #[test]
    fn test_unbalanced_sections() {
        let log = RecordingLogger::new();
        log.start_section("open");
        assert!(!log.is_balanced());
    }

    #[test]
    fn test_json_export() {
        let log = RecordingLogger::new();
        log.screenshot(None);
        let json = log.to_json().unwrap();
        assert!(json.contains("\"type\": \"screenshot\""));
    }

    #[test]
    fn test_log_format_from_yaml() {
        let format: LogFormat = serde_yaml_ng::from_str("json").unwrap();
        assert_eq!(format, LogFormat::Json);
        assert_eq!(LogFormat::default(), LogFormat::Text);
    }

    #[test]
    fn test_tracing_logger_depth() {
        init_tracing("pagewright=debug", LogFormat::Json);
        let log = TracingLogger::new();
        log.start_section("outer");
        log.start_section("inner");
        assert_eq!(log.depth(), 2);
        log.end_section();
        log.end_section();
        log.end_section();
        assert_eq!(log.depth(), 0);
    }
}
