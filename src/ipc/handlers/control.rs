// Author: Dustin Pilgrim
// License: MIT

use tokio::sync::mpsc;

use crate::core::events::{ActivityKind, Event};
use crate::core::manager_msg::ManagerMsg;
use crate::core::utils::now_ms;

use super::request;

/// `activity` for UI input, `activity shot` for a shot detected by the bay.
pub async fn handle_activity(args: &str, tx: &mpsc::Sender<ManagerMsg>) -> String {
    let kind = match args {
        "" => ActivityKind::Generic,
        "shot" => ActivityKind::DomainEvent,
        other => return format!("ERROR: unknown activity kind '{other}' (expected: shot)"),
    };

    request(
        tx,
        Event::UserActivity {
            kind,
            now_ms: now_ms(),
        },
    )
    .await
}

pub async fn handle_acknowledge(tx: &mpsc::Sender<ManagerMsg>) -> String {
    request(tx, Event::AcknowledgePresence { now_ms: now_ms() }).await
}

/// Demo trigger: close the dialog as if the user answered it.
pub async fn handle_dismiss(tx: &mpsc::Sender<ManagerMsg>) -> String {
    request(tx, Event::AcknowledgePresence { now_ms: now_ms() }).await
}

/// Demo trigger: open the dialog without waiting for the prompt delay.
pub async fn handle_prompt(tx: &mpsc::Sender<ManagerMsg>) -> String {
    request(tx, Event::TriggerPrompt { now_ms: now_ms() }).await
}

pub async fn handle_sign_out(tx: &mpsc::Sender<ManagerMsg>) -> String {
    request(tx, Event::ForceSignOut { now_ms: now_ms() }).await
}
