// Author: Dustin Pilgrim
// License: MIT

mod engine;
mod schedule;
mod sign_out;
mod snapshot;

pub use sign_out::SignOutReason;

use crate::core::{action::Action, config::IdleConfig, state::State};

/// The idle lifecycle coordinator.
///
/// Owns no clock and no timers: every input arrives as an `Event` carrying
/// `now_ms`, deadlines live in `State`, and side effects come back as
/// `Action`s for the runtime to execute.
#[derive(Debug)]
pub struct Manager {
    cfg: IdleConfig,
}

impl Manager {
    pub fn new(cfg: IdleConfig) -> Self {
        Self { cfg }
    }

    pub fn cfg(&self) -> &IdleConfig {
        &self.cfg
    }

    /// Arm the timers for the route the state starts on.
    pub fn start(&self, state: &mut State, now_ms: u64) -> Vec<Action> {
        let class = self.cfg.routes.classify(state.route());
        let route = state.route().to_string();
        state.set_route(route, class);
        state.set_last_activity_ms(now_ms);

        self.arm_no_profile_timer(state, now_ms, true);
        self.reschedule(state, now_ms)
    }

    /// Cancel everything. Nothing fires afterwards until `start` again.
    pub fn dispose(&self, state: &mut State) {
        state.collapse_to_active();
        state.timers_mut().clear_all();
    }

    /// Swap in a reloaded config and re-derive every deadline from the
    /// existing activity timestamp.
    pub fn apply_config(&mut self, state: &mut State, cfg: IdleConfig, now_ms: u64) -> Vec<Action> {
        self.cfg = cfg;

        let class = self.cfg.routes.classify(state.route());
        let route = state.route().to_string();
        state.set_route(route, class);

        self.arm_no_profile_timer(state, now_ms, true);
        self.reschedule(state, now_ms)
    }
}
