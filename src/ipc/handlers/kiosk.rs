// Author: Dustin Pilgrim
// License: MIT

use tokio::sync::mpsc;

use crate::core::events::Event;
use crate::core::manager_msg::ManagerMsg;
use crate::core::state::SessionOwner;
use crate::core::utils::now_ms;

use super::request;

pub const SESSION_HELP_MESSAGE: &str = r#"Usage:
  bayguard session start <id> [guest|user] [started_at_ms]

An omitted owner is looked up from the session API at sign-out.
  bayguard session claim
  bayguard session clear
"#;

pub async fn handle_route(args: &str, tx: &mpsc::Sender<ManagerMsg>) -> String {
    if args.is_empty() {
        return "ERROR: usage: route <path>".to_string();
    }

    request(
        tx,
        Event::RouteChanged {
            path: args.to_string(),
            now_ms: now_ms(),
        },
    )
    .await
}

pub async fn handle_profiles(args: &str, tx: &mpsc::Sender<ManagerMsg>) -> String {
    let mut it = args.split_whitespace();

    let (Some(linked), Some(guests), None) = (it.next(), it.next(), it.next()) else {
        return "ERROR: usage: profiles <linked_accounts> <guest_profiles>".to_string();
    };

    let (Ok(linked_accounts), Ok(guest_profiles)) = (linked.parse::<u32>(), guests.parse::<u32>())
    else {
        return "ERROR: profile counts must be non-negative integers".to_string();
    };

    request(
        tx,
        Event::ProfilesChanged {
            linked_accounts,
            guest_profiles,
            now_ms: now_ms(),
        },
    )
    .await
}

pub async fn handle_session(args: &str, tx: &mpsc::Sender<ManagerMsg>) -> String {
    let mut it = args.split_whitespace();
    let now_ms = now_ms();

    let event = match it.next() {
        Some("start") => match parse_start(it.collect(), now_ms) {
            Ok(ev) => ev,
            Err(e) => return format!("ERROR: {e}\n\n{SESSION_HELP_MESSAGE}"),
        },
        Some("claim") => Event::SessionClaimed { now_ms },
        Some("clear") => Event::SessionCleared { now_ms },
        Some("help") | Some("--help") | Some("-h") => return SESSION_HELP_MESSAGE.to_string(),
        _ => return format!("ERROR: missing or unknown session command\n\n{SESSION_HELP_MESSAGE}"),
    };

    request(tx, event).await
}

fn parse_start(args: Vec<&str>, now_ms: u64) -> Result<Event, String> {
    let (id, owner, started) = match args.as_slice() {
        [id] => (*id, None, None),
        // A lone number after the id is the start time.
        [id, arg] if arg.parse::<u64>().is_ok() => (*id, None, Some(*arg)),
        [id, owner] => (*id, Some(*owner), None),
        [id, owner, started] => (*id, Some(*owner), Some(*started)),
        _ => return Err("session start takes an id, an optional owner and an optional start time".into()),
    };

    let owner = match owner {
        Some(o) => Some(
            SessionOwner::parse(o)
                .ok_or_else(|| format!("unknown owner '{o}' (expected guest or user)"))?,
        ),
        None => None,
    };

    let started_at_ms = match started {
        Some(s) => s
            .parse::<u64>()
            .map_err(|_| format!("started_at_ms must be milliseconds since the epoch, got '{s}'"))?,
        None => now_ms,
    };

    Ok(Event::SessionStarted {
        session_id: id.to_string(),
        owner,
        started_at_ms,
        now_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(args: &[&str]) -> Result<Event, String> {
        parse_start(args.to_vec(), 1_000)
    }

    #[test]
    fn owner_is_optional() {
        assert_eq!(
            start(&["s1"]),
            Ok(Event::SessionStarted {
                session_id: "s1".to_string(),
                owner: None,
                started_at_ms: 1_000,
                now_ms: 1_000,
            })
        );
        assert_eq!(
            start(&["s1", "42"]),
            Ok(Event::SessionStarted {
                session_id: "s1".to_string(),
                owner: None,
                started_at_ms: 42,
                now_ms: 1_000,
            })
        );
    }

    #[test]
    fn explicit_owner_and_start_time() {
        assert_eq!(
            start(&["s1", "user", "42"]),
            Ok(Event::SessionStarted {
                session_id: "s1".to_string(),
                owner: Some(SessionOwner::User),
                started_at_ms: 42,
                now_ms: 1_000,
            })
        );
        assert!(start(&["s1", "admin"]).is_err());
        assert!(start(&[]).is_err());
    }
}
