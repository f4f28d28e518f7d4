//! The seven call state handlers

use super::event::{CallDirection, ReleaseOrigin, SetupRequest};
use super::machine::StateMachine;
use super::session::{CallSession, CallType, ReleaseCause};
use super::state::{CallState, StateId};
use crate::domain::ports::Tone;
use crate::domain::timer::TimerKind;
use tracing::debug;

/// No call in progress
pub struct Idle;

/// Outgoing setup sent, waiting for the far end
pub struct Connecting;

/// Far end is ringing
pub struct Alerting;

/// Talking
pub struct Active;

/// Call ended, waiting out the released timer
pub struct Released;

/// Incoming call ringing locally
pub struct Incoming;

/// Call on hold
pub struct Holding;

impl CallState for Idle {
    fn id(&self) -> StateId {
        StateId::Idle
    }

    fn on_entry(&self, machine: &mut StateMachine, _from: StateId) {
        machine.stop_all_timers();
        machine.call_mut().clear_transient_flags();
    }

    fn on_setup(&self, call: &mut CallSession, request: &SetupRequest) -> Option<StateId> {
        match request.direction {
            CallDirection::Outgoing => {
                call.begin(CallType::Dialed, &request.number, &request.name, false);
                Some(StateId::Connecting)
            }
            CallDirection::Incoming => {
                call.begin(CallType::Received, &request.number, &request.name, true);
                Some(StateId::Incoming)
            }
        }
    }

    fn on_release(&self, _call: &mut CallSession, _origin: ReleaseOrigin) -> Option<StateId> {
        None
    }
}

impl CallState for Connecting {
    fn id(&self) -> StateId {
        StateId::Connecting
    }

    fn on_entry(&self, machine: &mut StateMachine, _from: StateId) {
        let session = machine.session();
        let signaling = machine.signaling();
        signaling.set_session_id(session);
        let call = machine.call();
        signaling.setup(call.calling_number(), call.calling_name());
        machine.start_timer(TimerKind::NoReply);
    }

    fn on_alerting(&self, _call: &mut CallSession) -> Option<StateId> {
        Some(StateId::Alerting)
    }

    fn on_accept(&self, _call: &mut CallSession) -> Option<StateId> {
        Some(StateId::Active)
    }

    fn on_reject(&self, call: &mut CallSession) -> Option<StateId> {
        call.release_cause = Some(ReleaseCause::RemoteReject);
        Some(StateId::Released)
    }

    fn on_no_reply_timer_expired(&self, call: &mut CallSession) -> Option<StateId> {
        call.release_cause = Some(ReleaseCause::NoReply);
        Some(StateId::Released)
    }
}

impl CallState for Alerting {
    fn id(&self) -> StateId {
        StateId::Alerting
    }

    fn on_entry(&self, machine: &mut StateMachine, _from: StateId) {
        // Normally already armed by Connecting
        machine.start_timer(TimerKind::NoReply);
        machine.media().play_tone(Tone::Ringback);
    }

    fn on_exit(&self, machine: &mut StateMachine, _to: StateId) {
        machine.media().stop_tone();
    }

    fn on_accept(&self, _call: &mut CallSession) -> Option<StateId> {
        Some(StateId::Active)
    }

    fn on_reject(&self, call: &mut CallSession) -> Option<StateId> {
        call.release_cause = Some(ReleaseCause::RemoteReject);
        Some(StateId::Released)
    }

    fn on_no_reply_timer_expired(&self, call: &mut CallSession) -> Option<StateId> {
        call.release_cause = Some(ReleaseCause::NoReply);
        Some(StateId::Released)
    }
}

impl CallState for Incoming {
    fn id(&self) -> StateId {
        StateId::Incoming
    }

    fn on_entry(&self, machine: &mut StateMachine, _from: StateId) {
        let session = machine.session();
        machine.signaling().set_session_id(session);
        machine.signaling().alerting();
        machine.media().play_tone(Tone::Ring);
        machine.start_timer(TimerKind::NoReply);
    }

    fn on_exit(&self, machine: &mut StateMachine, _to: StateId) {
        machine.media().stop_tone();
    }

    fn on_accept(&self, _call: &mut CallSession) -> Option<StateId> {
        Some(StateId::Active)
    }

    fn on_reject(&self, call: &mut CallSession) -> Option<StateId> {
        call.release_cause = Some(ReleaseCause::LocalReject);
        Some(StateId::Released)
    }

    fn on_no_reply_timer_expired(&self, call: &mut CallSession) -> Option<StateId> {
        call.release_cause = Some(ReleaseCause::NoReply);
        Some(StateId::Released)
    }
}

impl CallState for Active {
    fn id(&self) -> StateId {
        StateId::Active
    }

    fn on_entry(&self, machine: &mut StateMachine, from: StateId) {
        machine.stop_timer(TimerKind::NoReply);
        match from {
            StateId::Incoming => machine.signaling().connect(),
            StateId::Holding => {
                machine.signaling().retrieve();
                let call = machine.call_mut();
                call.is_held = false;
                call.hold_requested = false;
                call.retrieve_requested = false;
            }
            _ => {}
        }
        machine.call_mut().start_counting();
    }

    fn on_hold_request(&self, call: &mut CallSession) -> Option<StateId> {
        call.hold_requested = true;
        Some(StateId::Holding)
    }
}

impl CallState for Holding {
    fn id(&self) -> StateId {
        StateId::Holding
    }

    fn on_entry(&self, machine: &mut StateMachine, _from: StateId) {
        machine.signaling().hold();
        let call = machine.call_mut();
        call.is_held = true;
        call.stop_counting();
    }

    fn on_retrieve_request(&self, call: &mut CallSession) -> Option<StateId> {
        call.retrieve_requested = true;
        Some(StateId::Active)
    }
}

impl CallState for Released {
    fn id(&self) -> StateId {
        StateId::Released
    }

    fn on_entry(&self, machine: &mut StateMachine, from: StateId) {
        machine.stop_all_timers();

        let call = machine.call_mut();
        call.stop_counting();
        let cause = call.release_cause;
        if call.incoming
            && from.is_unanswered()
            && matches!(
                cause,
                Some(ReleaseCause::RemoteRelease) | Some(ReleaseCause::NoReply)
            )
        {
            call.call_type = CallType::Missed;
        }
        debug!(
            "Session {} released from {} ({:?})",
            call.session, from, cause
        );

        match cause {
            Some(ReleaseCause::LocalRelease) | Some(ReleaseCause::NoReply) => {
                machine.signaling().release()
            }
            Some(ReleaseCause::LocalReject) => machine.signaling().reject(),
            Some(ReleaseCause::RemoteRelease) | Some(ReleaseCause::RemoteReject) => {
                machine.media().play_tone(Tone::Busy)
            }
            None => {}
        }

        machine.start_timer(TimerKind::Released);
    }

    fn on_exit(&self, machine: &mut StateMachine, _to: StateId) {
        machine.stop_timer(TimerKind::Released);
        machine.media().stop_tone();
        machine.activate_pending_action();
    }

    fn on_release(&self, _call: &mut CallSession, _origin: ReleaseOrigin) -> Option<StateId> {
        None
    }

    fn on_released_timer_expired(&self, _call: &mut CallSession) -> Option<StateId> {
        Some(StateId::Idle)
    }
}
