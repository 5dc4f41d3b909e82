// Author: Dustin Pilgrim
// License: MIT

use crate::core::{
    action::Action,
    error::{Error, EventError, StateError},
    events::{ActivityKind, Event},
    state::{ActiveSession, SessionOwner, State},
};

use super::{Manager, SignOutReason};

impl Manager {
    pub fn handle_event(&mut self, state: &mut State, event: Event) -> Result<Vec<Action>, Error> {
        let now_ms = event.now_ms();
        let mut out = Vec::new();

        match event {
            Event::Tick { .. } => {
                out.extend(self.advance(state, now_ms));
            }

            Event::UserActivity { kind, .. } => {
                if kind == ActivityKind::DomainEvent {
                    tracing::trace!("activity: bay event");
                }
                out.extend(self.record_activity(state, now_ms));
            }

            Event::AcknowledgePresence { .. } => {
                out.extend(self.record_activity(state, now_ms));
            }

            Event::TriggerPrompt { .. } => {
                if state.signing_out() {
                    return Err(Error::InvalidState(StateError::SignOutInProgress));
                }
                if !state.is_kiosk_context() {
                    return Err(Error::InvalidState(StateError::NotKioskContext));
                }

                self.prompt_now(state, now_ms);
            }

            Event::ForceSignOut { .. } => {
                out.extend(self.begin_sign_out(state, SignOutReason::Requested));
            }

            Event::SignOutCompleted { .. } => {
                self.finish_sign_out(state, now_ms);

                self.arm_no_profile_timer(state, now_ms, true);
                out.extend(self.reschedule(state, now_ms));
            }

            Event::RouteChanged { path, .. } => {
                let path = path.trim();
                if path.is_empty() {
                    return Err(Error::InvalidEvent(EventError::EmptyRoute));
                }

                out.extend(self.change_route(state, path, now_ms));
            }

            Event::ProfilesChanged {
                linked_accounts,
                guest_profiles,
                ..
            } => {
                let had_profiles = state.has_profiles();
                state.set_profile_counts(linked_accounts, guest_profiles);

                // Dropping back to zero starts a fresh window.
                let restart = had_profiles && !state.has_profiles();
                self.arm_no_profile_timer(state, now_ms, restart);
                self.guard_splash(state, now_ms);
            }

            Event::SessionStarted {
                session_id,
                owner,
                started_at_ms,
                ..
            } => {
                let id = session_id.trim();
                if id.is_empty() {
                    return Err(Error::InvalidEvent(EventError::EmptySessionId));
                }

                match owner {
                    Some(owner) => tracing::info!("session: {} started ({:?})", id, owner),
                    None => tracing::info!("session: {} started (owner unknown)", id),
                }

                state.set_session(Some(ActiveSession {
                    id: id.to_string(),
                    owner,
                }));
                self.guard_splash(state, now_ms);

                out.push(Action::WriteRecoveryBreadcrumb {
                    session_id: id.to_string(),
                    started_at_ms,
                });
            }

            Event::SessionClaimed { .. } => {
                if !state.set_session_owner(SessionOwner::User) {
                    return Err(Error::InvalidEvent(EventError::NoActiveSession));
                }
                tracing::info!("session: claimed by a user");
            }

            Event::SessionCleared { .. } => {
                if let Some(session) = state.take_session() {
                    tracing::info!("session: {} cleared", session.id);
                }
                self.guard_splash(state, now_ms);
            }
        }

        Ok(out)
    }
}
