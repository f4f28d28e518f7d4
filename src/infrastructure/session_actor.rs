//! Per-session actor
//!
//! One tokio task per call session owns the [`StateMachine`]. Signaling
//! events, timer expiries, queries and teardown all arrive on the same
//! channel and are applied one at a time, so a timer firing can never
//! interleave with a concurrently delivered signaling event. Sessions do not
//! share any state and run fully in parallel. Dropping every handle without
//! calling `destroy` still tears the session down.

use crate::domain::call::{
    CallEvent, CallSnapshot, ReleaseOrigin, SessionDeps, SetupRequest, StateId, StateMachine,
};
use crate::domain::shared::{FsmError, Result, SessionId};
use crate::domain::timer::{ExpiryCallback, TimerKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

enum Command {
    Event(CallEvent),
    TimerExpired { kind: TimerKind, epoch: u64 },
    Bind(SessionId),
    SetThreeParty(bool),
    StartTimer(TimerKind, oneshot::Sender<bool>),
    StopTimer(TimerKind, oneshot::Sender<bool>),
    ActivatePendingAction,
    Snapshot(oneshot::Sender<CallSnapshot>),
    Destroy(oneshot::Sender<()>),
}

/// Cloneable handle to a running session actor
#[derive(Clone)]
pub struct SessionHandle {
    session: SessionId,
    tx: mpsc::UnboundedSender<Command>,
    destroyed: Arc<AtomicBool>,
}

/// Spawn a session actor on the current runtime.
///
/// The returned join handle completes once the session has been destroyed
/// or every handle has been dropped.
pub fn spawn_session(session: SessionId, deps: SessionDeps) -> (SessionHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();

    // Weak so that pending timers do not keep the actor alive
    let weak = tx.downgrade();
    let on_expiry: ExpiryCallback = Arc::new(move |kind, epoch| {
        if let Some(tx) = weak.upgrade() {
            let _ = tx.send(Command::TimerExpired { kind, epoch });
        }
    });

    let machine = StateMachine::new(session, deps, on_expiry);
    let task = tokio::spawn(run(machine, rx));

    let handle = SessionHandle {
        session,
        tx,
        destroyed: Arc::new(AtomicBool::new(false)),
    };
    (handle, task)
}

async fn run(mut machine: StateMachine, mut rx: mpsc::UnboundedReceiver<Command>) {
    info!("Session {} actor started", machine.session());

    let mut destroyed = false;
    while let Some(command) = rx.recv().await {
        match command {
            Command::Event(event) => {
                machine.handle_event(event);
            }
            Command::TimerExpired { kind, epoch } => {
                machine.on_timer_expired(kind, epoch);
            }
            Command::Bind(session) => machine.bind(session),
            Command::SetThreeParty(enabled) => machine.set_three_party(enabled),
            Command::StartTimer(kind, reply) => {
                let _ = reply.send(machine.start_timer(kind));
            }
            Command::StopTimer(kind, reply) => {
                let _ = reply.send(machine.stop_timer(kind));
            }
            Command::ActivatePendingAction => machine.activate_pending_action(),
            Command::Snapshot(reply) => {
                let _ = reply.send(machine.snapshot());
            }
            Command::Destroy(reply) => {
                machine.destroy();
                destroyed = true;
                let _ = reply.send(());
                break;
            }
        }
    }

    // Every handle dropped without an explicit destroy
    if !destroyed {
        warn!(
            "Session {}: all handles dropped without destroy, tearing down",
            machine.session()
        );
        machine.destroy();
    }

    debug!("Session {} actor stopped", machine.session());
}

impl SessionHandle {
    /// Slot id the session was spawned with
    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    fn send(&self, command: Command) -> Result<()> {
        self.tx
            .send(command)
            .map_err(|_| FsmError::SessionClosed(self.session.to_string()))
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.send(make(reply))?;
        response
            .await
            .map_err(|_| FsmError::SessionClosed(self.session.to_string()))
    }

    /// Queue an event for the active state
    pub fn dispatch(&self, event: CallEvent) -> Result<()> {
        self.send(Command::Event(event))
    }

    pub fn dial(&self, number: impl Into<String>, name: impl Into<String>) -> Result<()> {
        self.dispatch(CallEvent::Setup(SetupRequest::outgoing(number, name)))
    }

    pub fn incoming(&self, number: impl Into<String>, name: impl Into<String>) -> Result<()> {
        self.dispatch(CallEvent::Setup(SetupRequest::incoming(number, name)))
    }

    pub fn remote_alerting(&self) -> Result<()> {
        self.dispatch(CallEvent::Alerting)
    }

    pub fn accept(&self) -> Result<()> {
        self.dispatch(CallEvent::Accept)
    }

    pub fn reject(&self) -> Result<()> {
        self.dispatch(CallEvent::Reject)
    }

    pub fn hold(&self) -> Result<()> {
        self.dispatch(CallEvent::HoldRequest)
    }

    pub fn retrieve(&self) -> Result<()> {
        self.dispatch(CallEvent::RetrieveRequest)
    }

    pub fn release(&self, origin: ReleaseOrigin) -> Result<()> {
        self.dispatch(CallEvent::Release(origin))
    }

    pub fn bind(&self, session: SessionId) -> Result<()> {
        self.send(Command::Bind(session))
    }

    pub fn set_three_party(&self, enabled: bool) -> Result<()> {
        self.send(Command::SetThreeParty(enabled))
    }

    pub fn activate_pending_action(&self) -> Result<()> {
        self.send(Command::ActivatePendingAction)
    }

    pub async fn start_timer(&self, kind: TimerKind) -> Result<bool> {
        self.request(|reply| Command::StartTimer(kind, reply)).await
    }

    pub async fn stop_timer(&self, kind: TimerKind) -> Result<bool> {
        self.request(|reply| Command::StopTimer(kind, reply)).await
    }

    pub async fn snapshot(&self) -> Result<CallSnapshot> {
        self.request(Command::Snapshot).await
    }

    pub async fn state(&self) -> Result<StateId> {
        Ok(self.snapshot().await?.state)
    }

    /// Tear the session down and wait until teardown has completed.
    ///
    /// Only the first successful call on any clone of the handle is
    /// honoured. If the actor is already gone the guard is left unset.
    pub async fn destroy(&self) -> Result<()> {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return Err(FsmError::AlreadyDestroyed(self.session.to_string()));
        }
        let result = self.request(Command::Destroy).await;
        if result.is_err() {
            self.destroyed.store(false, Ordering::SeqCst);
        }
        result
    }
}
