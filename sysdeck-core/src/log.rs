use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};

/// Number of entries a [`MemoryLogSink`] keeps unless configured otherwise.
pub const DEFAULT_MAX_LOG_ENTRIES: usize = 500;

/// Free-form key/value data attached to a log entry.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// A single immutable application log record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    /// Name of the component that produced the entry.
    pub source: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl LogEntry {
    fn mentions(&self, keyword_lower: &str) -> bool {
        self.message.to_lowercase().contains(keyword_lower)
            || self.source.to_lowercase().contains(keyword_lower)
    }
}

/// Write side of the application log, shared by every manager.
///
/// Recording never fails. Callers do not wait on anything but the in-memory
/// append.
pub trait LogSink: Send + Sync {
    fn record(&self, level: LogLevel, source: &str, message: &str, metadata: Option<Metadata>);

    fn info(&self, source: &str, message: &str, metadata: Option<Metadata>) {
        self.record(LogLevel::Info, source, message, metadata);
    }

    fn warn(&self, source: &str, message: &str, metadata: Option<Metadata>) {
        self.record(LogLevel::Warn, source, message, metadata);
    }

    fn error(&self, source: &str, message: &str, metadata: Option<Metadata>) {
        self.record(LogLevel::Error, source, message, metadata);
    }
}

/// Sink for infrastructural components that must not log into themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogSink;

impl LogSink for NullLogSink {
    fn record(&self, _level: LogLevel, _source: &str, _message: &str, _metadata: Option<Metadata>) {}
}

/// Structured search over the log. Every provided field must match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogFilter {
    pub source: Option<String>,
    pub level: Option<LogLevel>,
    /// Inclusive lower bound on the entry timestamp.
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the entry timestamp.
    pub end_date: Option<DateTime<Utc>>,
    /// Case-insensitive substring of the message or source.
    pub keyword: Option<String>,
}

impl LogFilter {
    fn matches(&self, entry: &LogEntry, keyword_lower: Option<&str>) -> bool {
        if let Some(source) = &self.source {
            if &entry.source != source {
                return false;
            }
        }
        if let Some(level) = self.level {
            if entry.level != level {
                return false;
            }
        }
        if let Some(start) = self.start_date {
            if entry.timestamp < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if entry.timestamp > end {
                return false;
            }
        }
        keyword_lower.map_or(true, |k| entry.mentions(k))
    }
}

/// Either a bare keyword or a structured filter.
#[derive(Debug, Clone)]
pub enum LogQuery {
    Keyword(String),
    Filter(LogFilter),
}

impl From<&str> for LogQuery {
    fn from(keyword: &str) -> Self {
        Self::Keyword(keyword.to_string())
    }
}

impl From<String> for LogQuery {
    fn from(keyword: String) -> Self {
        Self::Keyword(keyword)
    }
}

impl From<LogFilter> for LogQuery {
    fn from(filter: LogFilter) -> Self {
        Self::Filter(filter)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelCounts {
    pub info: usize,
    pub warn: usize,
    pub error: usize,
}

/// Aggregate view of the current log window.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogStats {
    pub total: usize,
    pub by_level: LevelCounts,
    /// Distinct sources, in the order they first appear.
    pub managers: Vec<String>,
}

/// Bounded in-memory log. Once `max_size` is exceeded the oldest entries are
/// evicted first.
pub struct MemoryLogSink {
    entries: Mutex<VecDeque<LogEntry>>,
    max_size: usize,
    clock: Arc<dyn Clock>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::with_max_size(DEFAULT_MAX_LOG_ENTRIES)
    }

    pub fn with_max_size(max_size: usize) -> Self {
        Self::with_clock(max_size, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(max_size: usize, clock: Arc<dyn Clock>) -> Self {
        let max_size = if max_size == 0 {
            DEFAULT_MAX_LOG_ENTRIES
        } else {
            max_size
        };
        Self {
            entries: Mutex::new(VecDeque::with_capacity(max_size.min(1024))),
            max_size,
            clock,
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Append an entry and return a copy of it.
    pub fn append(
        &self,
        level: LogLevel,
        source: &str,
        message: &str,
        metadata: Option<Metadata>,
    ) -> LogEntry {
        let entry = {
            let mut entries = self.lock();
            let mut timestamp = self.clock.now();
            if let Some(last) = entries.back() {
                timestamp = timestamp.max(last.timestamp);
            }

            let entry = LogEntry {
                id: Uuid::new_v4(),
                timestamp,
                level,
                source: source.to_string(),
                message: message.to_string(),
                metadata,
            };
            entries.push_back(entry.clone());
            while entries.len() > self.max_size {
                entries.pop_front();
            }
            entry
        };

        match level {
            LogLevel::Info => {
                tracing::debug!(source = %entry.source, entry_id = %entry.id, "{}", entry.message)
            }
            LogLevel::Warn => {
                tracing::warn!(source = %entry.source, entry_id = %entry.id, "{}", entry.message)
            }
            LogLevel::Error => {
                tracing::error!(source = %entry.source, entry_id = %entry.id, "{}", entry.message)
            }
        }

        entry
    }

    /// The last `limit` entries, oldest first.
    pub fn get_recent(&self, limit: usize) -> Vec<LogEntry> {
        let entries = self.lock();
        let skip = entries.len().saturating_sub(limit);
        entries.iter().skip(skip).cloned().collect()
    }

    /// Entries matching a keyword or a structured filter, in insertion order.
    pub fn search(&self, query: impl Into<LogQuery>) -> Vec<LogEntry> {
        let filter = match query.into() {
            LogQuery::Keyword(keyword) => LogFilter {
                keyword: Some(keyword),
                ..LogFilter::default()
            },
            LogQuery::Filter(filter) => filter,
        };
        let keyword_lower = filter
            .keyword
            .as_deref()
            .filter(|k| !k.is_empty())
            .map(str::to_lowercase);

        self.lock()
            .iter()
            .filter(|e| filter.matches(e, keyword_lower.as_deref()))
            .cloned()
            .collect()
    }

    /// Entries from exactly `source`, optionally only the last `limit` of them.
    pub fn get_by_manager(&self, source: &str, limit: Option<usize>) -> Vec<LogEntry> {
        let mut matched: Vec<LogEntry> = self
            .lock()
            .iter()
            .filter(|e| e.source == source)
            .cloned()
            .collect();
        if let Some(limit) = limit {
            let skip = matched.len().saturating_sub(limit);
            matched = matched.split_off(skip);
        }
        matched
    }

    pub fn clear(&self) {
        let cleared = {
            let mut entries = self.lock();
            let count = entries.len();
            entries.clear();
            count
        };
        tracing::info!(cleared, "Cleared application log");
    }

    pub fn get_stats(&self) -> LogStats {
        let entries = self.lock();
        let mut stats = LogStats {
            total: entries.len(),
            ..LogStats::default()
        };
        for entry in entries.iter() {
            match entry.level {
                LogLevel::Info => stats.by_level.info += 1,
                LogLevel::Warn => stats.by_level.warn += 1,
                LogLevel::Error => stats.by_level.error += 1,
            }
            if !stats.managers.iter().any(|m| m == &entry.source) {
                stats.managers.push(entry.source.clone());
            }
        }
        stats
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryLogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for MemoryLogSink {
    fn record(&self, level: LogLevel, source: &str, message: &str, metadata: Option<Metadata>) {
        self.append(level, source, message, metadata);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn zero_max_size_falls_back_to_default() {
        let sink = MemoryLogSink::with_max_size(0);
        assert_eq!(sink.max_size(), DEFAULT_MAX_LOG_ENTRIES);
    }

    #[test]
    fn timestamps_never_decrease_even_if_clock_does() {
        let clock = Arc::new(ManualClock::default());
        let sink = MemoryLogSink::with_clock(10, clock.clone());

        let first = sink.append(LogLevel::Info, "X", "a", None);
        clock.set(first.timestamp - chrono::Duration::seconds(30));
        let second = sink.append(LogLevel::Info, "X", "b", None);

        assert!(second.timestamp >= first.timestamp);
    }

    #[test]
    fn level_parsing_accepts_warning_alias() {
        assert_eq!(LogLevel::from_str("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str("Error"), Some(LogLevel::Error));
        assert_eq!(LogLevel::from_str("debug"), None);
    }
}
