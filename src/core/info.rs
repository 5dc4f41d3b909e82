// Author: Dustin Pilgrim
// License: MIT

use serde::Serialize;

use crate::core::state::{Phase, SessionOwner};

/// What the presentation layer needs to render the idle dialog.
///
/// - `Active`: render nothing.
/// - `Prompted`: "still there?" without a countdown.
/// - `CountingDown`: the same prompt with a live MM:SS countdown.
///
/// Published with emit-on-change, so equality is the change test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModalView {
    pub phase: Phase,
    pub modal_visible: bool,
    pub show_countdown: bool,
    pub countdown_remaining_secs: u64,
    pub countdown_text: String,
    pub route: String,
    pub kiosk_context: bool,
    pub signing_out: bool,
}

/// Snapshot returned from the daemon for `bayguard info`.
#[derive(Debug, Clone, Serialize)]
pub struct InfoSnapshot {
    #[serde(flatten)]
    pub view: ModalView,

    pub idle_for_ms: u64,
    pub session_id: Option<String>,
    pub session_owner: Option<SessionOwner>,
    pub linked_accounts: u32,
    pub guest_profiles: u32,
    pub sign_out_count: u64,
    pub next_deadline_in_ms: Option<u64>,

    #[serde(skip_serializing)]
    pub pretty_text: String,
}
