//! Request-scoped structured logging.
//!
//! A [`RequestLogger`] is handed to the pipeline by its caller, so every
//! event of one overlay run carries the same request id and operation.

use tracing::{error, info, warn};
use uuid::Uuid;

/// Logger carrying a request id and operation name.
#[derive(Debug, Clone)]
pub struct RequestLogger {
    request_id: String,
    operation: String,
}

impl RequestLogger {
    /// Create a logger for an explicit request id.
    pub fn new(request_id: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            operation: operation.into(),
        }
    }

    /// Create a logger with a fresh random request id.
    pub fn generate(operation: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4().to_string(), operation)
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn log_start(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Request started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Request progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Request warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Request error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Request completed: {}", message
        );
    }
}
