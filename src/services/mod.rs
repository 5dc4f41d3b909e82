// Author: Dustin Pilgrim
// License: MIT

pub mod recovery;
pub mod session_api;
pub mod ticker;
pub mod ui_bridge;
