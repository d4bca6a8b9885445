/// Severity of a trace message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TraceLevel {
    Verbose,
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for TraceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TraceLevel::Verbose => write!(f, "VERB"),
            TraceLevel::Info => write!(f, "INFO"),
            TraceLevel::Warning => write!(f, "WARN"),
            TraceLevel::Error => write!(f, "ERR "),
        }
    }
}

/// Diagnostic sink injected into components whose failures are observed
/// rather than propagated (report persistence, environment-file cleanup).
pub trait TraceWriter: Send + Sync {
    /// Record a message at the given level.
    fn write(&self, level: TraceLevel, message: &str);

    fn verbose(&self, message: &str) {
        self.write(TraceLevel::Verbose, message);
    }

    fn info(&self, message: &str) {
        self.write(TraceLevel::Info, message);
    }

    fn warning(&self, message: &str) {
        self.write(TraceLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.write(TraceLevel::Error, message);
    }
}

/// Forwards messages to the `tracing` crate at the matching level.
#[derive(Debug, Clone, Default)]
pub struct TracingTraceWriter;

impl TraceWriter for TracingTraceWriter {
    fn write(&self, level: TraceLevel, message: &str) {
        match level {
            TraceLevel::Verbose => tracing::debug!(target: "ghx", "{}", message),
            TraceLevel::Info => tracing::info!(target: "ghx", "{}", message),
            TraceLevel::Warning => tracing::warn!(target: "ghx", "{}", message),
            TraceLevel::Error => tracing::error!(target: "ghx", "{}", message),
        }
    }
}

/// Discards everything.
#[derive(Debug, Clone, Default)]
pub struct NullTraceWriter;

impl TraceWriter for NullTraceWriter {
    fn write(&self, _level: TraceLevel, _message: &str) {}
}

/// Keeps every message in memory so tests can assert on what was observed.
#[derive(Debug, Default)]
pub struct CollectingTraceWriter {
    messages: parking_lot::Mutex<Vec<(TraceLevel, String)>>,
}

impl CollectingTraceWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All collected messages, oldest first.
    pub fn messages(&self) -> Vec<(TraceLevel, String)> {
        self.messages.lock().clone()
    }

    /// Messages recorded at exactly `level`.
    pub fn messages_at(&self, level: TraceLevel) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Whether any message at `level` contains `needle`.
    pub fn contains(&self, level: TraceLevel, needle: &str) -> bool {
        self.messages
            .lock()
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }

    pub fn clear(&self) {
        self.messages.lock().clear();
    }
}

impl TraceWriter for CollectingTraceWriter {
    fn write(&self, level: TraceLevel, message: &str) {
        self.messages.lock().push((level, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_writer_keeps_order_and_levels() {
        let writer = CollectingTraceWriter::new();
        writer.info("starting");
        writer.warning("slow");
        writer.error("failed to write job run");
        writer.verbose("detail");

        let msgs = writer.messages();
        assert_eq!(msgs.len(), 4);
        assert_eq!(msgs[0], (TraceLevel::Info, "starting".into()));
        assert_eq!(msgs[2], (TraceLevel::Error, "failed to write job run".into()));
        assert_eq!(writer.messages_at(TraceLevel::Warning), vec!["slow".to_string()]);
        assert!(writer.contains(TraceLevel::Error, "job run"));
        assert!(!writer.contains(TraceLevel::Info, "job run"));

        writer.clear();
        assert!(writer.messages().is_empty());
    }

    #[test]
    fn null_writer_does_not_panic() {
        let writer = NullTraceWriter;
        writer.info("test");
        writer.error("test");
    }

    #[test]
    fn levels_are_ordered_by_severity() {
        assert!(TraceLevel::Verbose < TraceLevel::Info);
        assert!(TraceLevel::Warning < TraceLevel::Error);
        assert_eq!(TraceLevel::Error.to_string(), "ERR ");
    }
}
