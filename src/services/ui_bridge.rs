// Author: Dustin Pilgrim
// License: MIT

use serde::Serialize;
use tokio::sync::broadcast;

pub const DIRECTIVE_CAPACITY: usize = 64;

/// Instruction for the kiosk UI, streamed to `subscribe` clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "directive", rename_all = "snake_case")]
pub enum Directive {
    ClearSession,
    ClearAuthentication,
    ClearLinkedAccounts,
    ClearGuestProfiles,
    ClearPlayerSelections,
    ReplaceRoute { path: String },
}

/// Client-side state the kiosk keeps for the current visit.
pub trait KioskStores: Send + Sync {
    fn clear_session(&self);
    fn clear_authentication(&self);
    fn clear_linked_accounts(&self);
    fn clear_guest_profiles(&self);
    fn clear_player_selections(&self);
}

pub trait Navigator: Send + Sync {
    /// Replace the current route without leaving a history entry.
    fn replace_route(&self, path: &str);
}

#[derive(Debug, Clone)]
pub struct UiBridge {
    tx: broadcast::Sender<Directive>,
}

impl UiBridge {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(DIRECTIVE_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Directive> {
        self.tx.subscribe()
    }

    fn publish(&self, d: Directive) {
        tracing::debug!("ui: {:?}", d);
        // No subscribers is fine: the UI picks up state on connect.
        let _ = self.tx.send(d);
    }
}

impl Default for UiBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl KioskStores for UiBridge {
    fn clear_session(&self) {
        self.publish(Directive::ClearSession);
    }

    fn clear_authentication(&self) {
        self.publish(Directive::ClearAuthentication);
    }

    fn clear_linked_accounts(&self) {
        self.publish(Directive::ClearLinkedAccounts);
    }

    fn clear_guest_profiles(&self) {
        self.publish(Directive::ClearGuestProfiles);
    }

    fn clear_player_selections(&self) {
        self.publish(Directive::ClearPlayerSelections);
    }
}

impl Navigator for UiBridge {
    fn replace_route(&self, path: &str) {
        self.publish(Directive::ReplaceRoute {
            path: path.to_string(),
        });
    }
}
