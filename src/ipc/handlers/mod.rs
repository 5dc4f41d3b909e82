// Author: Dustin Pilgrim
// License: MIT

pub mod control;
pub mod info;
pub mod kiosk;
pub mod reload;
pub mod stop;
pub mod subscribe;

use tokio::sync::{mpsc, oneshot};

use crate::core::{events::Event, manager_msg::ManagerMsg};

/// Send an event and wait for the daemon's verdict.
/// Replies are `OK` or `ERROR: <reason>`.
pub async fn request(tx: &mpsc::Sender<ManagerMsg>, event: Event) -> String {
    let (reply_tx, reply_rx) = oneshot::channel();

    if tx
        .send(ManagerMsg::Request {
            event,
            reply: reply_tx,
        })
        .await
        .is_err()
    {
        return "ERROR: bayguard daemon not running".to_string();
    }

    match reply_rx.await {
        Ok(Ok(())) => "OK".to_string(),
        Ok(Err(e)) => format!("ERROR: {e}"),
        Err(_) => "ERROR: No response from daemon".to_string(),
    }
}
