// Author: Dustin Pilgrim
// License: MIT

use crate::core::events::Event;
use crate::core::manager_msg::ManagerMsg;
use crate::core::utils::now_ms;

use tokio::sync::mpsc::Sender;
use tokio::sync::watch;
use tokio::time::{Duration, MissedTickBehavior, interval};

/// Scheduler tolerance: deadlines are observed at most this late.
pub const TICK_INTERVAL: Duration = Duration::from_millis(200);

pub async fn run_ticker(tx: Sender<ManagerMsg>, mut shutdown: watch::Receiver<bool>) {
    tracing::debug!("ticker started ({}ms)", TICK_INTERVAL.as_millis());

    let mut every = interval(TICK_INTERVAL);
    every.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }

            _ = every.tick() => {
                let now_ms = now_ms();
                // If the daemon is gone, stop.
                if tx.send(ManagerMsg::Event(Event::Tick { now_ms })).await.is_err() {
                    tracing::warn!("ticker stopping (receiver dropped)");
                    break;
                }
            }
        }
    }
}
