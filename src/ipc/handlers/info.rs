// Author: Dustin Pilgrim
// License: MIT

use tokio::sync::{mpsc, oneshot};

use crate::core::manager_msg::ManagerMsg;

pub async fn handle_info(as_json: bool, tx: &mpsc::Sender<ManagerMsg>) -> String {
    let (reply_tx, reply_rx) = oneshot::channel();

    if tx.send(ManagerMsg::GetInfo { reply: reply_tx }).await.is_err() {
        return "ERROR: bayguard daemon not running".to_string();
    }

    let snap = match reply_rx.await {
        Ok(s) => s,
        Err(_) => return "ERROR: No response from daemon".to_string(),
    };

    if as_json {
        serde_json::to_string(&snap).unwrap_or_else(|e| format!("ERROR: {e}"))
    } else {
        snap.pretty_text
    }
}
