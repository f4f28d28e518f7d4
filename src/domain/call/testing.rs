//! Recording collaborators for unit tests

use super::machine::{SessionDeps, StateMachine};
use super::session::CallType;
use crate::config::TimerConfig;
use crate::domain::ports::{CallLog, MediaProxy, Orchestrator, SignalingProxy, SignalingProxyFactory, Tone};
use crate::domain::shared::{Result, SessionId};
use crate::domain::timer::testing::ManualTimerFactory;
use crate::domain::timer::ExpiryCallback;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Ordered record of every collaborator call
#[derive(Default)]
pub struct Journal(Mutex<Vec<String>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| *e == entry).count()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

pub struct FakeOrchestrator(pub Arc<Journal>);

impl Orchestrator for FakeOrchestrator {
    fn update_gui(&self, session: SessionId) {
        self.0.push(format!("gui:{}", session));
    }

    fn destroy_session(&self, session: SessionId) {
        self.0.push(format!("destroy:{}", session));
    }

    fn activate_pending_action(&self) {
        self.0.push("pending");
    }
}

pub struct FakeSignaling {
    id: Mutex<SessionId>,
    journal: Arc<Journal>,
}

impl SignalingProxy for FakeSignaling {
    fn session_id(&self) -> SessionId {
        *self.id.lock().unwrap()
    }

    fn set_session_id(&self, session: SessionId) {
        *self.id.lock().unwrap() = session;
    }

    fn setup(&self, number: &str, _name: &str) {
        self.journal.push(format!("sig:setup:{}", number));
    }

    fn alerting(&self) {
        self.journal.push("sig:alerting");
    }

    fn connect(&self) {
        self.journal.push("sig:connect");
    }

    fn reject(&self) {
        self.journal.push("sig:reject");
    }

    fn release(&self) {
        self.journal.push("sig:release");
    }

    fn hold(&self) {
        self.journal.push("sig:hold");
    }

    fn retrieve(&self) {
        self.journal.push("sig:retrieve");
    }
}

pub struct FakeSignalingFactory {
    journal: Arc<Journal>,
    pub created: Mutex<Vec<Arc<FakeSignaling>>>,
}

impl SignalingProxyFactory for FakeSignalingFactory {
    fn create(&self, session: SessionId) -> Arc<dyn SignalingProxy> {
        let proxy = Arc::new(FakeSignaling {
            id: Mutex::new(session),
            journal: self.journal.clone(),
        });
        self.created.lock().unwrap().push(proxy.clone());
        proxy
    }
}

pub struct FakeMedia(pub Arc<Journal>);

impl MediaProxy for FakeMedia {
    fn play_tone(&self, tone: Tone) {
        self.0.push(format!("tone:{:?}", tone).to_lowercase());
    }

    fn stop_tone(&self) {
        self.0.push("tone:stop");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedCall {
    pub call_type: CallType,
    pub number: String,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub duration: Duration,
}

#[derive(Default)]
pub struct FakeCallLog {
    pub calls: Mutex<Vec<LoggedCall>>,
    pub saves: Mutex<usize>,
}

impl FakeCallLog {
    pub fn calls(&self) -> Vec<LoggedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl CallLog for FakeCallLog {
    fn add_call(
        &self,
        call_type: CallType,
        number: &str,
        name: &str,
        timestamp: DateTime<Utc>,
        duration: Duration,
    ) {
        self.calls.lock().unwrap().push(LoggedCall {
            call_type,
            number: number.to_string(),
            name: name.to_string(),
            timestamp,
            duration,
        });
    }

    fn save(&self) -> Result<()> {
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }
}

/// Machine wired to recording fakes
pub struct Harness {
    pub machine: StateMachine,
    pub journal: Arc<Journal>,
    pub timers: ManualTimerFactory,
    pub signaling: Arc<FakeSignalingFactory>,
    pub call_log: Arc<FakeCallLog>,
}

impl Harness {
    pub fn new(session: SessionId) -> Self {
        Self::build(session, |journal| {
            let orchestrator: Arc<dyn Orchestrator> = Arc::new(FakeOrchestrator(journal));
            Some(orchestrator)
        })
    }

    pub fn without_orchestrator(session: SessionId) -> Self {
        Self::build(session, |_| None)
    }

    pub fn with_orchestrator(session: SessionId, orchestrator: Arc<dyn Orchestrator>) -> Self {
        Self::build(session, move |_| Some(orchestrator))
    }

    fn build(
        session: SessionId,
        orchestrator: impl FnOnce(Arc<Journal>) -> Option<Arc<dyn Orchestrator>>,
    ) -> Self {
        let journal = Arc::new(Journal::default());
        let timers = ManualTimerFactory::default();
        let signaling = Arc::new(FakeSignalingFactory {
            journal: journal.clone(),
            created: Mutex::new(Vec::new()),
        });
        let call_log = Arc::new(FakeCallLog::default());

        let orchestrator = orchestrator(journal.clone());

        let deps = SessionDeps {
            orchestrator,
            signaling: signaling.clone(),
            timers: Arc::new(timers.clone()),
            media: Arc::new(FakeMedia(journal.clone())),
            call_log: call_log.clone(),
            timer_config: TimerConfig::default(),
        };
        let on_expiry: ExpiryCallback = Arc::new(|_, _| {});

        Self {
            machine: StateMachine::new(session, deps, on_expiry),
            journal,
            timers,
            signaling,
            call_log,
        }
    }

    pub fn proxy(&self) -> Arc<FakeSignaling> {
        self.signaling.created.lock().unwrap()[0].clone()
    }
}
