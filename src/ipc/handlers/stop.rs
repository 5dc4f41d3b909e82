// Author: Dustin Pilgrim
// License: MIT

use tokio::sync::{mpsc, oneshot};

use crate::core::manager_msg::ManagerMsg;

/// Ask the daemon to exit; replies once it has acknowledged.
pub async fn handle_stop(tx: &mpsc::Sender<ManagerMsg>) -> String {
    let (reply_tx, reply_rx) = oneshot::channel();

    if tx
        .send(ManagerMsg::StopDaemon { reply: reply_tx })
        .await
        .is_err()
    {
        return "ERROR: bayguard daemon not running".to_string();
    }

    match reply_rx.await {
        Ok(Ok(msg)) if !msg.trim().is_empty() => msg.trim_end().to_string(),
        Ok(Ok(_)) => "Stopping bayguard daemon".to_string(),
        Ok(Err(e)) => format!("ERROR: {}", e.trim_end()),
        Err(_) => "ERROR: No response from daemon".to_string(),
    }
}
