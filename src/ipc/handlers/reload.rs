// Author: Dustin Pilgrim
// License: MIT

use tokio::sync::{mpsc, oneshot};

use crate::core::manager_msg::ManagerMsg;

/// Handle `bayguard reload` (no args).
///
/// The daemon re-reads its config file and re-derives every deadline from
/// the last activity. A config that fails to load or validate is rejected
/// and the running one stays.
pub async fn handle_reload(tx: &mpsc::Sender<ManagerMsg>) -> String {
    let (reply_tx, reply_rx) = oneshot::channel();

    if tx
        .send(ManagerMsg::ReloadConfig { reply: reply_tx })
        .await
        .is_err()
    {
        return "ERROR: bayguard daemon not running".to_string();
    }

    match reply_rx.await {
        Ok(Ok(msg)) if !msg.trim().is_empty() => msg.trim_end().to_string(),
        Ok(Ok(_)) => "Configuration reloaded".to_string(),
        Ok(Err(e)) if !e.trim().is_empty() => format!("ERROR: {}", e.trim_end()),
        Ok(Err(_)) => "ERROR: reload failed".to_string(),
        Err(_) => "ERROR: No response from daemon".to_string(),
    }
}
