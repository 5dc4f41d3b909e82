// Author: Dustin Pilgrim
// License: MIT

use crate::core::{
    action::Action,
    config::RouteClass,
    state::{Phase, State},
};

use super::{Manager, SignOutReason};

const TICK_MS: u64 = 1000;

impl Manager {
    /// Recognized activity: collapse to `Active` and restart every timer.
    pub(super) fn record_activity(&self, state: &mut State, now_ms: u64) -> Vec<Action> {
        if state.signing_out() {
            return Vec::new();
        }

        state.set_last_activity_ms(now_ms);

        if state.phase() != Phase::Active {
            tracing::info!("idle: activity while {}, back to active", state.phase().as_str());
            state.collapse_to_active();
        }

        self.arm_no_profile_timer(state, now_ms, true);
        self.reschedule(state, now_ms)
    }

    /// Re-derive the prompt, countdown and hard-timeout deadlines from
    /// `last_activity_ms`, then fire whatever is already past due.
    pub(super) fn reschedule(&self, state: &mut State, now_ms: u64) -> Vec<Action> {
        if state.signing_out() {
            return Vec::new();
        }

        state.collapse_to_active();
        state.timers_mut().clear_idle();

        let base = state.last_activity_ms();
        let cfg = &self.cfg;

        // The splash screen shows no prompt, but a session or profiles left
        // behind still get signed out.
        if state.route_class() == RouteClass::Splash {
            if !state.has_occupant() {
                return Vec::new();
            }
            state.timers_mut().hard_timeout_due_ms = Some(base.saturating_add(cfg.sign_out_after_ms));
            return self.advance(state, now_ms);
        }

        let timers = state.timers_mut();
        timers.prompt_due_ms = Some(base.saturating_add(cfg.prompt_after_ms));
        timers.countdown_due_ms = Some(base.saturating_add(cfg.countdown_after_ms));
        timers.hard_timeout_due_ms = Some(base.saturating_add(cfg.sign_out_after_ms));

        self.advance(state, now_ms)
    }

    /// Demo entry point: enter `Prompted` now, with the remaining deadlines
    /// placed as if `prompt_after_ms` had just elapsed.
    pub(super) fn prompt_now(&self, state: &mut State, now_ms: u64) {
        let cfg = &self.cfg;

        state.set_last_activity_ms(now_ms.saturating_sub(cfg.prompt_after_ms));
        state.collapse_to_active();

        let timers = state.timers_mut();
        timers.clear_idle();
        timers.countdown_due_ms =
            Some(now_ms.saturating_add(cfg.countdown_after_ms.saturating_sub(cfg.prompt_after_ms)));
        timers.hard_timeout_due_ms =
            Some(now_ms.saturating_add(cfg.sign_out_after_ms.saturating_sub(cfg.prompt_after_ms)));

        state.set_phase(Phase::Prompted);
        tracing::info!("idle: prompt opened manually");
    }

    /// Fire every deadline that is due at `now_ms`, in schedule order.
    pub(super) fn advance(&self, state: &mut State, now_ms: u64) -> Vec<Action> {
        if state.signing_out() {
            return Vec::new();
        }

        if state.timers().no_profile_due_ms.is_some_and(|due| due <= now_ms) {
            state.timers_mut().no_profile_due_ms = None;
            return self.return_home(state, now_ms);
        }

        if state.timers().prompt_due_ms.is_some_and(|due| due <= now_ms) {
            state.timers_mut().prompt_due_ms = None;

            if state.is_kiosk_context() && state.phase() == Phase::Active {
                state.set_phase(Phase::Prompted);
                tracing::info!("idle: prompting for presence");
            }
        }

        if let Some(due) = state.timers().countdown_due_ms.filter(|due| *due <= now_ms) {
            state.timers_mut().countdown_due_ms = None;

            if state.is_kiosk_context() {
                self.start_countdown(state, due);
            }
        }

        if state.phase() == Phase::CountingDown {
            while let Some(tick) = state.timers().tick_due_ms.filter(|t| *t <= now_ms) {
                let remaining = state.countdown_remaining_secs().saturating_sub(1);
                state.set_countdown_remaining_secs(remaining);

                if remaining == 0 {
                    state.timers_mut().tick_due_ms = None;
                    return self.begin_sign_out(state, SignOutReason::CountdownElapsed);
                }

                state.timers_mut().tick_due_ms = Some(tick.saturating_add(TICK_MS));
            }
        }

        if state.timers().hard_timeout_due_ms.is_some_and(|due| due <= now_ms) {
            return self.begin_sign_out(state, SignOutReason::HardTimeout);
        }

        Vec::new()
    }

    /// Replaces any running countdown. Ticks are anchored to `started_at_ms`
    /// so a late observation catches up one second at a time.
    fn start_countdown(&self, state: &mut State, started_at_ms: u64) {
        let secs = self.cfg.countdown_seconds();

        state.set_phase(Phase::CountingDown);
        state.set_countdown_remaining_secs(secs);
        state.timers_mut().tick_due_ms = (secs > 0).then_some(started_at_ms.saturating_add(TICK_MS));

        tracing::info!("idle: countdown started ({secs}s)");
    }

    /// Keep the empty-play-screen timer in line with route and profiles.
    /// `restart` pushes an armed deadline out to a full window from now.
    pub(super) fn arm_no_profile_timer(&self, state: &mut State, now_ms: u64, restart: bool) {
        let window = self.cfg.no_profile_return_ms.filter(|ms| *ms > 0);

        let eligible = !state.signing_out()
            && self.cfg.routes.is_play_route(state.route())
            && !state.has_profiles();

        let timers = state.timers_mut();

        match window {
            Some(window) if eligible => {
                if restart || timers.no_profile_due_ms.is_none() {
                    timers.no_profile_due_ms = Some(now_ms.saturating_add(window));
                }
            }
            _ => timers.no_profile_due_ms = None,
        }
    }

    fn return_home(&self, state: &mut State, now_ms: u64) -> Vec<Action> {
        let home = self.cfg.routes.home_route.clone();
        tracing::info!("idle: empty play screen left unattended, returning to {home}");

        state.set_route(home.clone(), RouteClass::Splash);
        state.timers_mut().no_profile_due_ms = None;

        let mut out = vec![Action::ReplaceRoute { path: home }];
        out.extend(self.reschedule(state, now_ms));
        out
    }

    /// Keep the splash-screen hard timeout in line with who is on the bay.
    /// A first occupant arriving on the splash screen starts a full window.
    pub(super) fn guard_splash(&self, state: &mut State, now_ms: u64) {
        if state.signing_out() || state.route_class() != RouteClass::Splash {
            return;
        }

        let occupied = state.has_occupant();
        let sign_out_after_ms = self.cfg.sign_out_after_ms;
        let timers = state.timers_mut();

        if !occupied {
            timers.hard_timeout_due_ms = None;
        } else if timers.hard_timeout_due_ms.is_none() {
            timers.hard_timeout_due_ms = Some(now_ms.saturating_add(sign_out_after_ms));
        }
    }

    pub(super) fn change_route(&self, state: &mut State, path: &str, now_ms: u64) -> Vec<Action> {
        let class = self.cfg.routes.classify(path);
        let prev = state.route_class();
        let was_play = self.cfg.routes.is_play_route(state.route());

        state.set_route(path, class);

        if state.signing_out() {
            return Vec::new();
        }

        match (prev, class) {
            (_, RouteClass::Splash) => {
                state.timers_mut().no_profile_due_ms = None;
                self.reschedule(state, now_ms)
            }

            // Leaving the splash screen starts a new visit.
            (RouteClass::Splash, _) => self.record_activity(state, now_ms),

            (_, RouteClass::NonKiosk) => {
                if state.phase() != Phase::Active {
                    tracing::info!("idle: left kiosk context, hiding prompt (hard timeout kept)");
                }
                state.collapse_to_active();
                self.arm_no_profile_timer(state, now_ms, !was_play);
                Vec::new()
            }

            (_, RouteClass::Kiosk) => {
                self.arm_no_profile_timer(state, now_ms, !was_play);
                self.reschedule(state, now_ms)
            }
        }
    }
}
