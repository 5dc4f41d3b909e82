// Author: Dustin Pilgrim
// License: MIT

use crate::core::{
    action::Action,
    config::RouteClass,
    state::{Phase, State},
};

use super::Manager;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutReason {
    Requested,
    CountdownElapsed,
    HardTimeout,
}

impl SignOutReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignOutReason::Requested => "requested",
            SignOutReason::CountdownElapsed => "countdown elapsed",
            SignOutReason::HardTimeout => "hard timeout",
        }
    }
}

impl Manager {
    /// Kiosk-wide sign-out. Only the first trigger while one is in flight
    /// produces actions.
    pub(super) fn begin_sign_out(&self, state: &mut State, reason: SignOutReason) -> Vec<Action> {
        if state.signing_out() {
            tracing::debug!("sign-out: already in flight, ignoring ({})", reason.as_str());
            return Vec::new();
        }

        tracing::info!("sign-out: starting ({})", reason.as_str());

        state.set_signing_out(true);
        state.collapse_to_active();
        state.timers_mut().clear_all();

        let mut out = Vec::new();

        if let Some(session) = state.take_session() {
            out.push(Action::CloseSession {
                session_id: session.id.clone(),
                owner: session.owner,
            });
            out.push(Action::ClearRecoveryBreadcrumb {
                session_id: session.id,
            });
        }

        out.extend([
            Action::ClearSession,
            Action::ClearAuthentication,
            Action::ClearLinkedAccounts,
            Action::ClearGuestProfiles,
            Action::ClearPlayerSelections,
        ]);
        state.set_profile_counts(0, 0);

        let home = self.cfg.routes.home_route.clone();
        state.set_route(home.clone(), RouteClass::Splash);
        out.push(Action::ReplaceRoute { path: home });

        out.push(Action::CompleteSignOut);
        state.mark_signed_out();

        out
    }

    pub(super) fn finish_sign_out(&self, state: &mut State, now_ms: u64) {
        if !state.signing_out() {
            tracing::debug!("sign-out: completion without a sign-out in flight");
        }

        state.set_signing_out(false);
        state.set_phase(Phase::Active);
        state.set_last_activity_ms(now_ms);

        tracing::info!("sign-out: complete");
    }
}
