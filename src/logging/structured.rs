use std::collections::BTreeMap;
use tracing::{debug, error, info, trace, warn};

/// Context information attached to every message of a logger
#[derive(Debug, Clone)]
pub struct LogContext {
    /// Component name (e.g., "coordinator", "http", "web")
    pub component: String,
    /// Additional context fields, rendered in key order
    pub extra_fields: BTreeMap<String, String>,
}

impl LogContext {
    /// Create a new log context
    pub fn new(component: &str) -> Self {
        Self {
            component: component.to_string(),
            extra_fields: BTreeMap::new(),
        }
    }

    /// Add extra field
    pub fn with_field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.extra_fields.insert(key.to_string(), value.into());
        self
    }
}

/// Structured logger with context
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    pub(crate) context: LogContext,
}

impl StructuredLogger {
    pub fn new(context: LogContext) -> Self {
        Self { context }
    }

    /// Derive a logger carrying one more context field
    pub fn with_field(&self, key: &str, value: impl Into<String>) -> Self {
        Self::new(self.context.clone().with_field(key, value))
    }

    pub fn info(&self, message: &str) {
        let fields = self.format_fields();
        info!(%fields, "{}", message);
    }
    pub fn warn(&self, message: &str) {
        let fields = self.format_fields();
        warn!(%fields, "{}", message);
    }
    pub fn error(&self, message: &str) {
        let fields = self.format_fields();
        error!(%fields, "{}", message);
    }
    pub fn debug(&self, message: &str) {
        let fields = self.format_fields();
        debug!(%fields, "{}", message);
    }
    pub fn trace(&self, message: &str) {
        let fields = self.format_fields();
        trace!(%fields, "{}", message);
    }

    fn format_fields(&self) -> String {
        let mut fields = vec![format!("component={}", self.context.component)];
        for (key, value) in &self.context.extra_fields {
            fields.push(format!("{}={}", key, value));
        }
        fields.join(",")
    }
}

/// Create a logger for a specific component
pub fn get_logger(component: &str) -> StructuredLogger {
    StructuredLogger::new(LogContext::new(component))
}

/// Create a logger with full context
pub fn get_logger_with_context(context: LogContext) -> StructuredLogger {
    StructuredLogger::new(context)
}
