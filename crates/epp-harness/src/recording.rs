//! Audit sink that keeps every record for later assertions.

use std::sync::{Mutex, PoisonError};

use epp_core::{AuditRecord, AuditSink};

/// Owned copy of one [`AuditRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedExchange {
    /// Operation label.
    pub label: String,
    /// Client transaction id.
    pub cl_trid: String,
    /// Sanitized request document.
    pub request: String,
    /// Result codes, empty when the reply did not parse.
    pub codes: Vec<u16>,
}

/// Collects exchanges in order.
#[derive(Debug, Default)]
pub struct RecordingAudit {
    exchanges: Mutex<Vec<RecordedExchange>>,
}

impl RecordingAudit {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far.
    pub fn exchanges(&self) -> Vec<RecordedExchange> {
        self.exchanges.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Labels in order.
    pub fn labels(&self) -> Vec<String> {
        self.exchanges().into_iter().map(|e| e.label).collect()
    }
}

impl AuditSink for RecordingAudit {
    fn record(&self, record: &AuditRecord<'_>) {
        let exchange = RecordedExchange {
            label: record.label.to_string(),
            cl_trid: record.cl_trid.to_string(),
            request: record.request.to_string(),
            codes: record.response.map(|r| r.codes()).unwrap_or_default(),
        };
        self.exchanges.lock().unwrap_or_else(PoisonError::into_inner).push(exchange);
    }
}
