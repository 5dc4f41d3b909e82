// Author: Dustin Pilgrim
// License: MIT

use crate::core::state::SessionOwner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    /// Pointer, key, touch or scroll input.
    Generic,
    /// Activity reported by the bay itself (a detected shot) with no UI input.
    DomainEvent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Tick {
        now_ms: u64,
    },

    UserActivity {
        kind: ActivityKind,
        now_ms: u64,
    },

    /// "I'm still here" from the prompt/countdown dialog.
    AcknowledgePresence {
        now_ms: u64,
    },

    /// Demo entry point: open the prompt as if the prompt delay just elapsed.
    TriggerPrompt {
        now_ms: u64,
    },

    /// "End session now" from the dialog, or a manual sign-out.
    ForceSignOut {
        now_ms: u64,
    },

    /// Sent back by the runtime once local cleanup and navigation are done.
    SignOutCompleted {
        now_ms: u64,
    },

    RouteChanged {
        path: String,
        now_ms: u64,
    },

    ProfilesChanged {
        linked_accounts: u32,
        guest_profiles: u32,
        now_ms: u64,
    },

    SessionStarted {
        session_id: String,
        /// `None` when the UI does not know yet; looked up at sign-out.
        owner: Option<SessionOwner>,
        started_at_ms: u64,
        now_ms: u64,
    },

    /// A guest session was claimed by a signed-in user.
    SessionClaimed {
        now_ms: u64,
    },

    SessionCleared {
        now_ms: u64,
    },
}

impl Event {
    pub fn now_ms(&self) -> u64 {
        match self {
            Event::Tick { now_ms }
            | Event::UserActivity { now_ms, .. }
            | Event::AcknowledgePresence { now_ms }
            | Event::TriggerPrompt { now_ms }
            | Event::ForceSignOut { now_ms }
            | Event::SignOutCompleted { now_ms }
            | Event::RouteChanged { now_ms, .. }
            | Event::ProfilesChanged { now_ms, .. }
            | Event::SessionStarted { now_ms, .. }
            | Event::SessionClaimed { now_ms }
            | Event::SessionCleared { now_ms } => *now_ms,
        }
    }
}
