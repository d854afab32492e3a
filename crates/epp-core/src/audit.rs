//! Audit collaborator.
//!
//! The session reports every command/response pair to an [`AuditSink`]
//! owned by the caller. Requests arrive already sanitized: the login
//! identifier and password are blanked before the sink ever sees them.

use epp_proto::Response;

/// One command/response exchange.
#[derive(Debug, Clone, Copy)]
pub struct AuditRecord<'a> {
    /// Operation label given to `execute`.
    pub label: &'a str,
    /// Client transaction id of the command.
    pub cl_trid: &'a str,
    /// Sanitized request document.
    pub request: &'a str,
    /// Parsed response, or `None` when the reply could not be parsed.
    pub response: Option<&'a Response>,
}

/// Receiver of audit records. Written to, never read, by the session.
pub trait AuditSink: Send + Sync {
    /// Record one exchange.
    fn record(&self, record: &AuditRecord<'_>);
}

/// Emits each record as a `debug` event on the `epp::audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAudit;

impl AuditSink for TracingAudit {
    fn record(&self, record: &AuditRecord<'_>) {
        match record.response {
            Some(response) => tracing::debug!(
                target: "epp::audit",
                label = record.label,
                cl_trid = record.cl_trid,
                request = record.request,
                codes = ?response.codes(),
                sv_trid = response.sv_trid.as_deref().unwrap_or_default(),
                "exchange"
            ),
            None => tracing::debug!(
                target: "epp::audit",
                label = record.label,
                cl_trid = record.cl_trid,
                request = record.request,
                "exchange without parsable response"
            ),
        }
    }
}

/// Discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAudit;

impl AuditSink for NoopAudit {
    fn record(&self, _record: &AuditRecord<'_>) {}
}
