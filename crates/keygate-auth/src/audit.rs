//! Audit records for key resolution
//!
//! One record per resolution. Records carry where the key came from and what
//! it resolved to, never the key itself.

use crate::request::KeySource;
use keygate_core::AuthorizationLevel;
use std::time::SystemTime;

#[derive(Debug, Clone)]
pub struct ResolutionAudit {
    pub level: AuthorizationLevel,
    pub source: KeySource,
    pub function: Option<String>,
    pub store: &'static str,
    pub error: Option<String>,
    pub timestamp: SystemTime,
}

impl ResolutionAudit {
    pub fn new(source: KeySource, function: Option<&str>, store: &'static str) -> Self {
        Self {
            level: AuthorizationLevel::Anonymous,
            source,
            function: function.map(str::to_string),
            store,
            error: None,
            timestamp: SystemTime::now(),
        }
    }

    pub fn with_level(mut self, level: AuthorizationLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_error(mut self, error: String) -> Self {
        self.error = Some(error);
        self
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    /// Emit the record through `tracing`
    pub fn log(&self) {
        let function = self.function.as_deref().unwrap_or("-");

        if let Some(error) = &self.error {
            tracing::warn!(
                source = %self.source,
                function = %function,
                store = %self.store,
                error = %error,
                timestamp = ?self.timestamp,
                "Key resolution failed"
            );
        } else if !self.level.is_anonymous() {
            tracing::info!(
                level = %self.level,
                source = %self.source,
                function = %function,
                store = %self.store,
                timestamp = ?self.timestamp,
                "Key resolved"
            );
        } else if self.source != KeySource::Absent {
            tracing::info!(
                level = %self.level,
                source = %self.source,
                function = %function,
                store = %self.store,
                timestamp = ?self.timestamp,
                "Presented key matched no configured key"
            );
        } else {
            tracing::debug!(
                level = %self.level,
                function = %function,
                "No key presented"
            );
        }
    }
}
