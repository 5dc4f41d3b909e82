// Author: Dustin Pilgrim
// License: MIT

use std::time::Duration;

use crate::core::{
    info::{InfoSnapshot, ModalView},
    state::{Phase, State},
    utils::{format_countdown, format_duration},
};

use super::Manager;

impl Manager {
    pub fn view(&self, state: &State) -> ModalView {
        let phase = state.phase();

        ModalView {
            phase,
            modal_visible: state.modal_visible(),
            show_countdown: phase == Phase::CountingDown,
            countdown_remaining_secs: state.countdown_remaining_secs(),
            countdown_text: format_countdown(state.countdown_remaining_secs()),
            route: state.route().to_string(),
            kiosk_context: state.is_kiosk_context(),
            signing_out: state.signing_out(),
        }
    }

    pub fn snapshot(&self, state: &State, now_ms: u64) -> InfoSnapshot {
        let view = self.view(state);
        let idle_for_ms = now_ms.saturating_sub(state.last_activity_ms());
        let next_deadline_in_ms = state
            .timers()
            .next_due_ms()
            .map(|due| due.saturating_sub(now_ms));

        let session = state.session();

        let mut pretty = String::new();
        pretty.push_str(&format!("Phase:            {}\n", view.phase.as_str()));
        if view.show_countdown {
            pretty.push_str(&format!("Countdown:        {}\n", view.countdown_text));
        }
        pretty.push_str(&format!(
            "Route:            {} ({})\n",
            view.route,
            if view.kiosk_context { "kiosk" } else { "not tracked" }
        ));
        pretty.push_str(&format!(
            "Idle for:         {}\n",
            format_duration(Duration::from_millis(idle_for_ms))
        ));
        pretty.push_str(&format!(
            "Last activity:    {}\n",
            render_local_time(state.last_activity_ms())
        ));
        if let Some(ms) = next_deadline_in_ms {
            pretty.push_str(&format!(
                "Next deadline in: {}\n",
                format_duration(Duration::from_millis(ms))
            ));
        }
        match session {
            Some(s) => {
                let owner = match s.owner {
                    Some(o) => format!("{o:?}").to_lowercase(),
                    None => "unknown".to_string(),
                };
                pretty.push_str(&format!("Session:          {} ({owner})\n", s.id));
            }
            None => pretty.push_str("Session:          none\n"),
        }
        pretty.push_str(&format!(
            "Profiles:         {} linked, {} guest\n",
            state.linked_accounts(),
            state.guest_profiles()
        ));
        pretty.push_str(&format!("Sign-outs:        {}", state.sign_out_count()));
        if state.signing_out() {
            pretty.push_str(" (signing out)");
        }

        InfoSnapshot {
            view,
            idle_for_ms,
            session_id: session.map(|s| s.id.clone()),
            session_owner: session.and_then(|s| s.owner),
            linked_accounts: state.linked_accounts(),
            guest_profiles: state.guest_profiles(),
            sign_out_count: state.sign_out_count(),
            next_deadline_in_ms,
            pretty_text: pretty,
        }
    }
}

fn render_local_time(ms: u64) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(ms as i64)
        .map(|dt| dt.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}
