// Author: Dustin Pilgrim
// License: MIT

use serde::Serialize;

use crate::core::config::RouteClass;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Active,
    Prompted,
    CountingDown,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Active => "active",
            Phase::Prompted => "prompted",
            Phase::CountingDown => "counting_down",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOwner {
    Guest,
    User,
}

impl SessionOwner {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "guest" => Some(SessionOwner::Guest),
            "user" => Some(SessionOwner::User),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    pub id: String,
    pub owner: Option<SessionOwner>,
}

/// Independently cancellable deadlines (ms, same clock as events).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timers {
    pub prompt_due_ms: Option<u64>,
    pub countdown_due_ms: Option<u64>,
    pub hard_timeout_due_ms: Option<u64>,
    pub tick_due_ms: Option<u64>,
    pub no_profile_due_ms: Option<u64>,
}

impl Timers {
    /// Cancel the prompt/countdown/hard-timeout/tick set.
    /// The no-profile timer is separate and left alone.
    pub fn clear_idle(&mut self) {
        self.prompt_due_ms = None;
        self.countdown_due_ms = None;
        self.hard_timeout_due_ms = None;
        self.tick_due_ms = None;
    }

    pub fn clear_all(&mut self) {
        self.clear_idle();
        self.no_profile_due_ms = None;
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        [
            self.prompt_due_ms,
            self.countdown_due_ms,
            self.hard_timeout_due_ms,
            self.tick_due_ms,
            self.no_profile_due_ms,
        ]
        .into_iter()
        .flatten()
        .min()
    }
}

#[derive(Debug, Clone)]
pub struct State {
    // Activity
    last_activity_ms: u64,

    // Visible warning sequence
    phase: Phase,
    countdown_remaining_secs: u64,

    // Where the kiosk UI currently is
    route: String,
    route_class: RouteClass,

    // Who is on the bay
    session: Option<ActiveSession>,
    linked_accounts: u32,
    guest_profiles: u32,

    // Re-entrancy guard for the sign-out sequence
    signing_out: bool,
    sign_out_count: u64,

    timers: Timers,
}

impl State {
    pub fn new(now_ms: u64, route: impl Into<String>, route_class: RouteClass) -> Self {
        Self {
            last_activity_ms: now_ms,
            phase: Phase::Active,
            countdown_remaining_secs: 0,
            route: route.into(),
            route_class,
            session: None,
            linked_accounts: 0,
            guest_profiles: 0,
            signing_out: false,
            sign_out_count: 0,
            timers: Timers::default(),
        }
    }

    // ---------------- getters ----------------

    pub fn last_activity_ms(&self) -> u64 {
        self.last_activity_ms
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn countdown_remaining_secs(&self) -> u64 {
        self.countdown_remaining_secs
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn route_class(&self) -> RouteClass {
        self.route_class
    }

    pub fn is_kiosk_context(&self) -> bool {
        self.route_class == RouteClass::Kiosk
    }

    pub fn session(&self) -> Option<&ActiveSession> {
        self.session.as_ref()
    }

    pub fn linked_accounts(&self) -> u32 {
        self.linked_accounts
    }

    pub fn guest_profiles(&self) -> u32 {
        self.guest_profiles
    }

    pub fn has_profiles(&self) -> bool {
        self.linked_accounts > 0 || self.guest_profiles > 0
    }

    /// Someone's data is still on the bay.
    pub fn has_occupant(&self) -> bool {
        self.session.is_some() || self.has_profiles()
    }

    pub fn signing_out(&self) -> bool {
        self.signing_out
    }

    pub fn sign_out_count(&self) -> u64 {
        self.sign_out_count
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn modal_visible(&self) -> bool {
        self.is_kiosk_context() && self.phase != Phase::Active
    }

    // ---------------- setters ----------------

    pub fn set_last_activity_ms(&mut self, v: u64) {
        self.last_activity_ms = v;
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        if phase != Phase::CountingDown {
            self.countdown_remaining_secs = 0;
        }
    }

    pub fn set_countdown_remaining_secs(&mut self, v: u64) {
        self.countdown_remaining_secs = v;
    }

    pub fn set_route(&mut self, route: impl Into<String>, class: RouteClass) {
        self.route = route.into();
        self.route_class = class;
    }

    pub fn set_session(&mut self, session: Option<ActiveSession>) {
        self.session = session;
    }

    pub fn take_session(&mut self) -> Option<ActiveSession> {
        self.session.take()
    }

    pub fn set_session_owner(&mut self, owner: SessionOwner) -> bool {
        match self.session.as_mut() {
            Some(s) => {
                s.owner = Some(owner);
                true
            }
            None => false,
        }
    }

    pub fn set_profile_counts(&mut self, linked_accounts: u32, guest_profiles: u32) {
        self.linked_accounts = linked_accounts;
        self.guest_profiles = guest_profiles;
    }

    pub fn set_signing_out(&mut self, v: bool) {
        self.signing_out = v;
    }

    pub fn mark_signed_out(&mut self) {
        self.sign_out_count = self.sign_out_count.wrapping_add(1);
    }

    pub fn timers_mut(&mut self) -> &mut Timers {
        &mut self.timers
    }

    // ---------------- cycle control ----------------

    /// Collapse the visible sequence: hide the modal and stop the ticking.
    pub fn collapse_to_active(&mut self) {
        self.set_phase(Phase::Active);
        self.timers.tick_due_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_due_picks_earliest_deadline() {
        let timers = Timers {
            prompt_due_ms: Some(300),
            countdown_due_ms: Some(480),
            hard_timeout_due_ms: Some(600),
            tick_due_ms: None,
            no_profile_due_ms: Some(120),
        };
        assert_eq!(timers.next_due_ms(), Some(120));
        assert_eq!(Timers::default().next_due_ms(), None);
    }

    #[test]
    fn clear_idle_keeps_no_profile_timer() {
        let mut timers = Timers {
            prompt_due_ms: Some(1),
            countdown_due_ms: Some(2),
            hard_timeout_due_ms: Some(3),
            tick_due_ms: Some(4),
            no_profile_due_ms: Some(5),
        };
        timers.clear_idle();
        assert_eq!(timers.next_due_ms(), Some(5));
        timers.clear_all();
        assert_eq!(timers, Timers::default());
    }

    #[test]
    fn leaving_countdown_zeroes_remaining() {
        let mut state = State::new(0, "/play", RouteClass::Kiosk);
        state.set_phase(Phase::CountingDown);
        state.set_countdown_remaining_secs(42);
        state.collapse_to_active();
        assert_eq!(state.phase(), Phase::Active);
        assert_eq!(state.countdown_remaining_secs(), 0);
    }

    #[test]
    fn parses_owner() {
        assert_eq!(SessionOwner::parse("User"), Some(SessionOwner::User));
        assert_eq!(SessionOwner::parse(" guest "), Some(SessionOwner::Guest));
        assert_eq!(SessionOwner::parse("admin"), None);
    }
}
