// Author: Dustin Pilgrim
// License: MIT

use tokio::sync::oneshot;

use crate::core::{events::Event, info::InfoSnapshot};

#[derive(Debug)]
pub enum ManagerMsg {
    Event(Event),

    /// An event whose outcome the sender wants to hear about.
    Request {
        event: Event,
        reply: oneshot::Sender<Result<(), String>>,
    },

    GetInfo { reply: oneshot::Sender<InfoSnapshot> },

    ReloadConfig {
        reply: oneshot::Sender<Result<String, String>>,
    },

    StopDaemon {
        reply: oneshot::Sender<Result<String, String>>,
    },
}
