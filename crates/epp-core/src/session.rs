//! EPP session.
//!
//! A [`Session`] owns one transport and is the single choke point for
//! traffic: every command is written, its response read and interpreted,
//! before the next may be sent.
//!
//! # State machine
//!
//! ```text
//! Connected ──login──> Authenticated ──logout──> Connected
//!     │                      │
//!     └──── connection error / close ────> Closed
//! ```
//!
//! # Invariants
//!
//! - No command other than login is sent before login succeeds
//! - Transaction ids are strictly increasing within a session
//! - Logout performs at most one round trip and never fails locally
//! - After a connection error nothing more is written to the transport

use std::sync::Arc;

use epp_proto::{ClTrid, Command, FrameError, Greeting, Login, Response, Services};
use tracing::{debug, info, warn};

use crate::{
    audit::{AuditRecord, AuditSink},
    config::{Credential, EndpointConfig},
    env::Environment,
    error::EppError,
    transport::{Connector, Transport},
};

/// Authentication state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Transport open, greeting received, not logged in.
    Connected,
    /// Login succeeded.
    Authenticated,
    /// Transport closed or failed. Terminal.
    Closed,
}

/// One registry session over an exclusively owned transport.
pub struct Session<T: Transport, E: Environment> {
    transport: T,
    env: E,
    audit: Arc<dyn AuditSink>,
    prefix: String,
    greeting: Greeting,
    state: SessionState,
    last_token: u64,
}

impl<T: Transport, E: Environment> Session<T, E> {
    /// Connect and read the server greeting. The session starts unauthenticated.
    pub fn connect<C>(connector: &C, config: &EndpointConfig, env: E, audit: Arc<dyn AuditSink>) -> Result<Self, EppError>
    where
        C: Connector<Transport = T>,
    {
        let transport = connector.connect(config)?;
        Self::from_transport(transport, &config.registrar_prefix, env, audit)
    }

    /// Wrap an already connected transport and read the server greeting.
    pub fn from_transport(mut transport: T, prefix: &str, env: E, audit: Arc<dyn AuditSink>) -> Result<Self, EppError> {
        let payload = transport.receive()?;
        let greeting = Greeting::parse(&payload).map_err(|source| EppError::parse("greeting", source))?;
        info!(server = %greeting.server_id, "connected to registry");

        Ok(Self {
            transport,
            env,
            audit,
            prefix: prefix.to_string(),
            greeting,
            state: SessionState::Connected,
            last_token: 0,
        })
    }

    /// Server greeting received on connect.
    pub fn greeting(&self) -> &Greeting {
        &self.greeting
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True after a successful login and before logout.
    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    /// Environment the session draws time and randomness from.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Authenticate, declaring `services`. A no-op when already logged in.
    pub fn login(&mut self, credential: &Credential, services: &Services) -> Result<(), EppError> {
        match self.state {
            SessionState::Closed => return Err(EppError::SessionClosed),
            SessionState::Authenticated => {
                debug!("login skipped: already authenticated");
                return Ok(());
            },
            SessionState::Connected => {},
        }

        for uri in &services.object_uris {
            if !self.greeting.object_uris.is_empty() && !self.greeting.supports(uri) {
                warn!(uri = %uri, "object URI not announced in greeting");
            }
        }

        let command = Command::Login(Login {
            client_id: credential.client_id.clone(),
            password: credential.password.clone(),
            services: services.clone(),
        });
        self.round_trip(&command, "login")?;

        self.state = SessionState::Authenticated;
        info!(client_id = %credential.client_id, "logged in");
        Ok(())
    }

    /// Send `command`, wait for its response and interpret it.
    ///
    /// `label` names the operation in errors and audit records.
    pub fn execute(&mut self, command: &Command, label: &str) -> Result<Response, EppError> {
        match self.state {
            SessionState::Closed => return Err(EppError::SessionClosed),
            SessionState::Connected => return Err(EppError::NotAuthenticated),
            SessionState::Authenticated => {},
        }
        if command.is_session_control() {
            return Err(EppError::validation("login and logout are issued by the session itself"));
        }

        self.round_trip(command, label)
    }

    /// End the authenticated session.
    ///
    /// Safe to call any number of times; only the first call while
    /// authenticated touches the network. Failures are logged, not returned.
    pub fn logout(&mut self) {
        if self.state != SessionState::Authenticated {
            return;
        }

        match self.round_trip(&Command::Logout, "logout") {
            Ok(_) => info!("logged out"),
            Err(e) => warn!(error = %e, "logout failed"),
        }
        if self.state == SessionState::Authenticated {
            self.state = SessionState::Connected;
        }
    }

    /// Log out (best effort) and release the transport.
    pub fn close(mut self) {
        self.logout();
        if let Err(e) = self.transport.close() {
            warn!(error = %e, "closing transport failed");
        }
        self.state = SessionState::Closed;
    }

    fn round_trip(&mut self, command: &Command, label: &str) -> Result<Response, EppError> {
        let token = self.next_token();
        let cl_trid = ClTrid::new(&self.prefix, command.category(), token);
        let request = command.to_xml(&cl_trid);
        debug!(label, cl_trid = %cl_trid, "sending command");

        if let Err(e) = self.transport.send(request.as_bytes()) {
            return Err(self.poison(e));
        }
        let payload = match self.transport.receive() {
            Ok(payload) => payload,
            Err(e) => return Err(self.poison(e)),
        };

        let parsed = Response::parse(&payload);
        let sanitized = match command {
            Command::Login(_) => command.redacted().to_xml(&cl_trid),
            _ => request,
        };
        self.audit.record(&AuditRecord {
            label,
            cl_trid: cl_trid.as_str(),
            request: &sanitized,
            response: parsed.as_ref().ok(),
        });

        let response = parsed.map_err(|source| EppError::parse(label, source))?;
        if let Some(echo) = response.cl_trid.as_deref().filter(|echo| *echo != cl_trid.as_str()) {
            warn!(label, sent = %cl_trid, echoed = echo, "clTRID mismatch");
        }

        if let Some(message) = response.failure_message() {
            let codes: Vec<u16> = response.failures().map(|r| r.code).collect();
            debug!(label, ?codes, %message, "registry reported failure");
            return Err(EppError::Protocol { label: label.to_string(), codes, message });
        }

        Ok(response)
    }

    /// Millisecond clock reading, bumped past the previous token if needed.
    fn next_token(&mut self) -> u64 {
        let now = u64::try_from(self.env.now().timestamp_millis()).unwrap_or(0);
        let token = now.max(self.last_token.saturating_add(1));
        self.last_token = token;
        token
    }

    fn poison(&mut self, error: FrameError) -> EppError {
        warn!(error = %error, "connection failed; session closed");
        self.state = SessionState::Closed;
        EppError::Connection(error)
    }
}

impl<T: Transport, E: Environment> std::fmt::Debug for Session<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("prefix", &self.prefix)
            .field("server", &self.greeting.server_id)
            .field("state", &self.state)
            .field("last_token", &self.last_token)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::{collections::VecDeque, sync::Mutex};

    use bytes::Bytes;
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;

    #[derive(Clone)]
    struct FrozenEnv;

    impl Environment for FrozenEnv {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        }

        fn random_bytes(&self, buffer: &mut [u8]) {
            buffer.fill(7);
        }
    }

    #[derive(Default)]
    struct Script {
        replies: VecDeque<Result<Vec<u8>, FrameError>>,
        sent: Vec<String>,
    }

    struct ScriptedTransport(Arc<Mutex<Script>>);

    impl Transport for ScriptedTransport {
        fn send(&mut self, payload: &[u8]) -> Result<(), FrameError> {
            self.0.lock().unwrap().sent.push(String::from_utf8(payload.to_vec()).unwrap());
            Ok(())
        }

        fn receive(&mut self) -> Result<Bytes, FrameError> {
            let reply = self.0.lock().unwrap().replies.pop_front();
            reply.unwrap_or(Err(FrameError::ConnectionClosed { received: 0, expected: 4 })).map(Bytes::from)
        }

        fn close(&mut self) -> Result<(), FrameError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingAudit(Mutex<Vec<(String, String, bool)>>);

    impl AuditSink for RecordingAudit {
        fn record(&self, record: &AuditRecord<'_>) {
            self.0.lock().unwrap().push((
                record.label.to_string(),
                record.request.to_string(),
                record.response.is_some(),
            ));
        }
    }

    const GREETING: &str = r#"<epp xmlns="urn:ietf:params:xml:ns:epp-1.0"><greeting><svID>Test Registry</svID><svcMenu><objURI>urn:ietf:params:xml:ns:domain-1.0</objURI></svcMenu></greeting></epp>"#;

    fn reply(results: &[(u16, &str)]) -> Result<Vec<u8>, FrameError> {
        let results: String = results
            .iter()
            .map(|(code, msg)| format!(r#"<result code="{code}"><msg>{msg}</msg></result>"#))
            .collect();
        Ok(format!(r#"<epp xmlns="urn:ietf:params:xml:ns:epp-1.0"><response>{results}</response></epp>"#)
            .into_bytes())
    }

    fn session(
        replies: Vec<Result<Vec<u8>, FrameError>>,
    ) -> (Session<ScriptedTransport, FrozenEnv>, Arc<Mutex<Script>>, Arc<RecordingAudit>) {
        let mut queue: VecDeque<_> = replies.into();
        queue.push_front(Ok(GREETING.as_bytes().to_vec()));
        let script = Arc::new(Mutex::new(Script { replies: queue, sent: Vec::new() }));
        let audit = Arc::new(RecordingAudit::default());
        let session =
            Session::from_transport(ScriptedTransport(Arc::clone(&script)), "ABC", FrozenEnv, audit.clone()).unwrap();
        (session, script, audit)
    }

    fn credential() -> Credential {
        Credential::new("registrar-id", "pa<ss")
    }

    fn info() -> Command {
        Command::DomainInfo { name: "example.lv".to_string() }
    }

    #[test]
    fn greeting_is_read_on_connect() {
        let (session, _, _) = session(vec![]);
        assert_eq!(session.greeting().server_id, "Test Registry");
        assert_eq!(session.state(), SessionState::Connected);
    }

    #[test]
    fn command_before_login_is_not_sent() {
        let (mut session, script, _) = session(vec![]);

        let err = session.execute(&info(), "domain-info").unwrap_err();
        assert!(matches!(err, EppError::NotAuthenticated));
        assert!(script.lock().unwrap().sent.is_empty());
    }

    #[test]
    fn login_then_execute() {
        let (mut session, script, _) = session(vec![reply(&[(1000, "ok")]), reply(&[(1000, "ok")])]);

        session.login(&credential(), &Services::default()).unwrap();
        assert!(session.is_authenticated());
        let response = session.execute(&info(), "domain-info").unwrap();
        assert!(response.is_success());

        let sent = &script.lock().unwrap().sent;
        assert!(sent[0].contains("<pw><![CDATA[pa<ss]]></pw>"));
        assert!(sent[0].contains("<clTRID>ABC-login-"));
        assert!(sent[1].contains("<clTRID>ABC-domain-info-"));
    }

    #[test]
    fn failed_login_stays_unauthenticated() {
        let (mut session, _, _) = session(vec![reply(&[(2200, "Authentication error")])]);

        let err = session.login(&credential(), &Services::default()).unwrap_err();
        assert_eq!(err.to_string(), "Authentication error");
        assert!(!session.is_authenticated());
    }

    #[test]
    fn failing_results_become_protocol_error() {
        let (mut session, _, _) = session(vec![
            reply(&[(1000, "ok")]),
            reply(&[(2302, "Object exists"), (2306, "Parameter value policy error")]),
        ]);
        session.login(&credential(), &Services::default()).unwrap();

        match session.execute(&info(), "domain-info").unwrap_err() {
            EppError::Protocol { label, codes, message } => {
                assert_eq!(label, "domain-info");
                assert_eq!(codes, vec![2302, 2306]);
                assert_eq!(message, "Object exists; Parameter value policy error");
            },
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(session.is_authenticated());
    }

    #[test]
    fn failure_with_unreadable_payload_is_protocol_error() {
        let failure = r#"<epp xmlns="urn:ietf:params:xml:ns:epp-1.0"><response><result code="2303"><msg>Object does not exist</msg></result><resData><domain:infData xmlns:domain="urn:ietf:params:xml:ns:domain-1.0"/></resData></response></epp>"#;
        let (mut session, _, _) = session(vec![reply(&[(1000, "ok")]), Ok(failure.as_bytes().to_vec())]);
        session.login(&credential(), &Services::default()).unwrap();

        let err = session.execute(&info(), "domain-info").unwrap_err();
        assert!(matches!(err, EppError::Protocol { ref codes, .. } if codes == &vec![2303]));
        assert_eq!(err.to_string(), "Object does not exist");
        assert!(session.is_authenticated());
    }

    #[test]
    fn logout_twice_is_one_round_trip() {
        let (mut session, script, _) = session(vec![reply(&[(1000, "ok")]), reply(&[(1500, "bye")])]);
        session.login(&credential(), &Services::default()).unwrap();

        session.logout();
        session.logout();

        let sent = &script.lock().unwrap().sent;
        assert_eq!(sent.iter().filter(|s| s.contains("<logout/>")).count(), 1);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn failed_logout_is_swallowed() {
        let (mut session, _, _) = session(vec![reply(&[(1000, "ok")]), reply(&[(2400, "Command failed")])]);
        session.login(&credential(), &Services::default()).unwrap();

        session.logout();
        assert_eq!(session.state(), SessionState::Connected);
    }

    #[test]
    fn transaction_ids_increase_under_frozen_clock() {
        let (mut session, script, _) =
            session(vec![reply(&[(1000, "ok")]), reply(&[(1000, "ok")]), reply(&[(1000, "ok")])]);
        session.login(&credential(), &Services::default()).unwrap();
        session.execute(&info(), "domain-info").unwrap();
        session.execute(&info(), "domain-info").unwrap();

        let tokens: Vec<u64> = script
            .lock()
            .unwrap()
            .sent
            .iter()
            .map(|doc| {
                let start = doc.find("<clTRID>").unwrap() + "<clTRID>".len();
                let end = doc.find("</clTRID>").unwrap();
                doc[start..end].rsplit('-').next().unwrap().parse().unwrap()
            })
            .collect();
        assert_eq!(tokens, vec![1_735_689_600_000, 1_735_689_600_001, 1_735_689_600_002]);
    }

    #[test]
    fn connection_error_closes_session() {
        let (mut session, script, _) = session(vec![reply(&[(1000, "ok")])]);
        session.login(&credential(), &Services::default()).unwrap();

        let err = session.execute(&info(), "domain-info").unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(session.state(), SessionState::Closed);

        let err = session.execute(&info(), "domain-info").unwrap_err();
        assert!(matches!(err, EppError::SessionClosed));
        session.logout();
        assert_eq!(script.lock().unwrap().sent.len(), 2);
    }

    #[test]
    fn malformed_response_is_parse_error() {
        let (mut session, _, audit) = session(vec![reply(&[(1000, "ok")]), Ok(b"not xml".to_vec())]);
        session.login(&credential(), &Services::default()).unwrap();

        let err = session.execute(&info(), "domain-info").unwrap_err();
        assert!(matches!(err, EppError::Parse { ref label, .. } if label == "domain-info"));
        assert!(!audit.0.lock().unwrap()[1].2);
    }

    #[test]
    fn session_control_rejected_by_execute() {
        let (mut session, _, _) = session(vec![reply(&[(1000, "ok")])]);
        session.login(&credential(), &Services::default()).unwrap();

        assert!(matches!(session.execute(&Command::Logout, "logout"), Err(EppError::Validation { .. })));
    }

    #[test]
    fn audit_never_sees_credentials() {
        let (mut session, _, audit) = session(vec![reply(&[(1000, "ok")]), reply(&[(1500, "bye")])]);
        session.login(&credential(), &Services::default()).unwrap();
        session.close();

        let records = audit.0.lock().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].0, "login");
        assert!(!records[0].1.contains("registrar-id"));
        assert!(!records[0].1.contains("pa<ss"));
        assert_eq!(records[1].0, "logout");
    }
}
