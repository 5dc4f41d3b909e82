// Author: Dustin Pilgrim
// License: MIT

use crate::core::state::SessionOwner;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Mark the remote session ended, then sync it if it is user-owned.
    ///
    /// Best-effort and detached: the runtime must not wait on it before
    /// running the local cleanup actions that follow.
    CloseSession {
        session_id: String,
        /// `None` means the runtime has to ask the session service.
        owner: Option<SessionOwner>,
    },

    WriteRecoveryBreadcrumb {
        session_id: String,
        started_at_ms: u64,
    },

    /// Remove the breadcrumb, but only if it still points at `session_id`.
    ClearRecoveryBreadcrumb {
        session_id: String,
    },

    ClearSession,
    ClearAuthentication,
    ClearLinkedAccounts,
    ClearGuestProfiles,
    ClearPlayerSelections,

    /// Non-reversible navigation (no back-stack entry).
    ReplaceRoute {
        path: String,
    },

    /// The runtime answers with `Event::SignOutCompleted` once every
    /// preceding action has been dispatched.
    CompleteSignOut,
}
