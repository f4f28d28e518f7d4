//! Call state machine
//!
//! Owns the call data, the current state, the session's timers and the
//! collaborator handles. Every mutation of a session goes through here; the
//! caller is responsible for serializing access (see
//! `infrastructure::session_actor`).

use super::event::CallEvent;
use super::session::{CallSession, CallType};
use super::state::StateId;
use crate::config::TimerConfig;
use crate::domain::ports::{CallLog, MediaProxy, Orchestrator, SignalingProxy, SignalingProxyFactory};
use crate::domain::shared::SessionId;
use crate::domain::timer::{ExpiryCallback, TimerFactory, TimerKind, TimerRegistry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Handles a state machine is constructed with
///
/// Cloneable so an orchestrator can reuse one set for every session.
#[derive(Clone)]
pub struct SessionDeps {
    /// Absent in isolated setups; timers are then not created.
    pub orchestrator: Option<Arc<dyn Orchestrator>>,
    pub signaling: Arc<dyn SignalingProxyFactory>,
    pub timers: Arc<dyn TimerFactory>,
    pub media: Arc<dyn MediaProxy>,
    pub call_log: Arc<dyn CallLog>,
    pub timer_config: TimerConfig,
}

/// Point-in-time view of a session for UI refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSnapshot {
    pub session: SessionId,
    pub state: StateId,
    pub call_type: CallType,
    pub calling_number: String,
    pub calling_name: String,
    pub incoming: bool,
    pub is_held: bool,
    pub is_3pty: bool,
    pub counting: bool,
    pub hold_requested: bool,
    pub retrieve_requested: bool,
    pub timestamp: DateTime<Utc>,
    pub runtime_duration: Duration,
    pub duration: Duration,
}

pub struct StateMachine {
    call: CallSession,
    current: StateId,
    timers: TimerRegistry,
    orchestrator: Option<Arc<dyn Orchestrator>>,
    signaling: Arc<dyn SignalingProxy>,
    media: Arc<dyn MediaProxy>,
    call_log: Arc<dyn CallLog>,
    #[cfg(test)]
    pub(crate) journal: Vec<Phase>,
}

#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Exit(StateId),
    Enter(StateId),
}

impl StateMachine {
    pub fn new(session: SessionId, deps: SessionDeps, on_expiry: ExpiryCallback) -> Self {
        let mut timers = TimerRegistry::new();
        if deps.orchestrator.is_some() {
            for kind in TimerKind::ALL {
                timers.insert(deps.timers.create(
                    kind,
                    deps.timer_config.interval(kind),
                    on_expiry.clone(),
                ));
            }
        } else {
            warn!("Session {} has no orchestrator; timers disabled", session);
        }

        let signaling = deps.signaling.create(session);
        signaling.set_session_id(session);

        Self {
            call: CallSession::new(session),
            current: StateId::Idle,
            timers,
            orchestrator: deps.orchestrator,
            signaling,
            media: deps.media,
            call_log: deps.call_log,
            #[cfg(test)]
            journal: Vec::new(),
        }
    }

    pub fn state(&self) -> StateId {
        self.current
    }

    pub fn session(&self) -> SessionId {
        self.call.session
    }

    pub fn call(&self) -> &CallSession {
        &self.call
    }

    pub(crate) fn call_mut(&mut self) -> &mut CallSession {
        &mut self.call
    }

    pub(crate) fn signaling(&self) -> &Arc<dyn SignalingProxy> {
        &self.signaling
    }

    pub(crate) fn media(&self) -> &Arc<dyn MediaProxy> {
        &self.media
    }

    /// Attach the session to an orchestrator slot.
    pub fn bind(&mut self, session: SessionId) {
        info!("Session {} bound to slot {}", self.call.session, session);
        self.call.session = session;
        self.signaling.set_session_id(session);
    }

    pub fn set_three_party(&mut self, enabled: bool) {
        self.call.is_3pty = enabled;
        self.notify_gui();
    }

    /// Exit the current state, switch, and enter `target`.
    ///
    /// Re-entering the current state still runs exit and entry.
    pub fn change_state(&mut self, target: StateId) {
        let from = self.current;
        info!("Session {}: {} -> {}", self.call.session, from, target);

        from.handler().on_exit(self, target);
        #[cfg(test)]
        self.journal.push(Phase::Exit(from));

        self.current = target;

        #[cfg(test)]
        self.journal.push(Phase::Enter(target));
        target.handler().on_entry(self, from);

        self.notify_gui();
    }

    /// Route an event to the current state. Returns true if it caused a transition.
    pub fn handle_event(&mut self, event: CallEvent) -> bool {
        let handler = self.current.handler();
        let next = match &event {
            CallEvent::Setup(request) => handler.on_setup(&mut self.call, request),
            CallEvent::Alerting => handler.on_alerting(&mut self.call),
            CallEvent::Accept => handler.on_accept(&mut self.call),
            CallEvent::Reject => handler.on_reject(&mut self.call),
            CallEvent::HoldRequest => handler.on_hold_request(&mut self.call),
            CallEvent::RetrieveRequest => handler.on_retrieve_request(&mut self.call),
            CallEvent::Release(origin) => handler.on_release(&mut self.call, *origin),
            CallEvent::NoReplyTimerExpired => handler.on_no_reply_timer_expired(&mut self.call),
            CallEvent::ReleasedTimerExpired => handler.on_released_timer_expired(&mut self.call),
        };

        match next {
            Some(target) => {
                self.change_state(target);
                true
            }
            None => {
                debug!(
                    "Session {}: {} ignored in {}",
                    self.call.session,
                    event.name(),
                    self.current
                );
                false
            }
        }
    }

    /// Deliver a timer fire. Stale fires are dropped.
    pub fn on_timer_expired(&mut self, kind: TimerKind, epoch: u64) -> bool {
        if !self.timers.accept_expiry(kind, epoch) {
            return false;
        }
        info!("Session {}: {} timer expired in {}", self.call.session, kind, self.current);
        self.handle_event(CallEvent::timer_expired(kind))
    }

    pub fn start_timer(&mut self, kind: TimerKind) -> bool {
        let started = self.timers.start(kind);
        if started {
            debug!("Session {}: {} timer started", self.call.session, kind);
        }
        started
    }

    pub fn stop_timer(&mut self, kind: TimerKind) -> bool {
        let stopped = self.timers.stop(kind);
        if stopped {
            debug!("Session {}: {} timer stopped", self.call.session, kind);
        }
        stopped
    }

    pub fn stop_all_timers(&mut self) {
        self.timers.stop_all();
    }

    pub fn is_timer_running(&self, kind: TimerKind) -> bool {
        self.timers.is_running(kind)
    }

    pub fn runtime_duration(&self) -> Duration {
        self.call.runtime_duration()
    }

    pub fn activate_pending_action(&self) {
        if !self.call.session.is_bound() {
            return;
        }
        if let Some(orchestrator) = &self.orchestrator {
            orchestrator.activate_pending_action();
        }
    }

    /// Tear the session down: finalize, log, reset, go Idle and release the slot.
    ///
    /// Must be called at most once per session.
    pub fn destroy(&mut self) {
        let session = self.call.session;
        info!("Session {}: destroying in {}", session, self.current);

        self.media.stop_tone();
        self.stop_all_timers();
        self.call.stop_counting();

        if self.call.should_log() {
            self.call_log.add_call(
                self.call.call_type,
                &self.call.calling_number,
                &self.call.calling_name,
                self.call.timestamp,
                self.call.duration,
            );
            if let Err(e) = self.call_log.save() {
                warn!("Session {}: failed to save call log: {}", session, e);
            }
        }

        self.call.calling_number.clear();
        self.call.incoming = false;
        self.change_state(StateId::Idle);

        if session.is_bound() {
            if let Some(orchestrator) = &self.orchestrator {
                orchestrator.destroy_session(session);
            }
        }
    }

    pub fn snapshot(&self) -> CallSnapshot {
        CallSnapshot {
            session: self.call.session,
            state: self.current,
            call_type: self.call.call_type,
            calling_number: self.call.calling_number.clone(),
            calling_name: self.call.calling_name.clone(),
            incoming: self.call.incoming,
            is_held: self.call.is_held,
            is_3pty: self.call.is_3pty,
            counting: self.call.counting,
            hold_requested: self.call.hold_requested,
            retrieve_requested: self.call.retrieve_requested,
            timestamp: self.call.timestamp,
            runtime_duration: self.call.runtime_duration(),
            duration: self.call.duration,
        }
    }

    fn notify_gui(&self) {
        if !self.call.session.is_bound() {
            return;
        }
        if let Some(orchestrator) = &self.orchestrator {
            orchestrator.update_gui(self.call.session);
        }
    }
}
