// Author: Dustin Pilgrim
// License: MIT

use crate::cli::{Command, SessionCommand};

type AnyError = Box<dyn std::error::Error + Send + Sync>;

pub async fn run(cmd: Command) -> Result<(), AnyError> {
    match cmd {
        Command::Watch => {
            let res = crate::ipc::client::stream_lines("subscribe", |line| println!("{line}")).await;
            if let Err(e) = res {
                eprintln!("bayguard: {e}");
            }
            Ok(())
        }

        Command::Info { json } => {
            let msg = if json { "info --json" } else { "info" };

            match crate::ipc::client::send_raw(msg).await {
                Ok(resp) => {
                    if !resp.is_empty() {
                        println!("{resp}");
                    }
                }
                Err(e) => {
                    if json {
                        // Status bars expect JSON on stdout even when the daemon is down.
                        println!(r#"{{"phase":"not_running","modal_visible":false}}"#);
                    } else {
                        eprintln!("bayguard: {e}");
                    }
                }
            }
            Ok(())
        }

        other => {
            let (msg, done) = ipc_request(&other);

            match crate::ipc::client::send_raw(&msg).await {
                Ok(resp) => {
                    let out = resp.trim_end();
                    if out.is_empty() || out == "OK" {
                        println!("{done}");
                    } else {
                        println!("{out}");
                    }
                }
                Err(e) => eprintln!("bayguard: {e}"),
            }
            Ok(())
        }
    }
}

/// Socket request line for a one-shot command, plus what to print on `OK`.
fn ipc_request(cmd: &Command) -> (String, &'static str) {
    match cmd {
        Command::Activity { shot: false } => ("activity".into(), "Activity recorded"),
        Command::Activity { shot: true } => ("activity shot".into(), "Shot recorded"),
        Command::Acknowledge => ("acknowledge".into(), "Presence acknowledged"),
        Command::Prompt => ("prompt".into(), "Prompt opened"),
        Command::Dismiss => ("dismiss".into(), "Prompt dismissed"),
        Command::SignOut => ("sign-out".into(), "Signing out"),
        Command::Route { path } => (format!("route {path}"), "Route updated"),
        Command::Profiles { linked, guests } => {
            (format!("profiles {linked} {guests}"), "Profiles updated")
        }
        Command::Session(SessionCommand::Start {
            id,
            owner,
            started_at_ms,
        }) => {
            let mut msg = format!("session start {id}");
            if let Some(owner) = owner {
                msg.push_str(&format!(" {owner}"));
            }
            if let Some(ms) = started_at_ms {
                msg.push_str(&format!(" {ms}"));
            }
            (msg, "Session started")
        }
        Command::Session(SessionCommand::Claim) => ("session claim".into(), "Session claimed"),
        Command::Session(SessionCommand::Clear) => ("session clear".into(), "Session cleared"),
        Command::Reload => ("reload".into(), "Configuration reloaded"),
        Command::Stop => ("stop".into(), "Stopping bayguard daemon"),
        Command::Info { json: true } => ("info --json".into(), ""),
        Command::Info { json: false } => ("info".into(), ""),
        Command::Watch => ("subscribe".into(), ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;

    fn request_for(argv: &[&str]) -> String {
        let args = Args::try_parse_from(argv).unwrap();
        ipc_request(&args.command.unwrap()).0
    }

    #[test]
    fn subcommands_map_to_socket_requests() {
        assert_eq!(request_for(&["bayguard", "activity"]), "activity");
        assert_eq!(request_for(&["bayguard", "activity", "--shot"]), "activity shot");
        assert_eq!(request_for(&["bayguard", "sign-out"]), "sign-out");
        assert_eq!(request_for(&["bayguard", "route", "/play"]), "route /play");
        assert_eq!(request_for(&["bayguard", "profiles", "1", "0"]), "profiles 1 0");
        assert_eq!(
            request_for(&["bayguard", "session", "start", "s1", "guest"]),
            "session start s1 guest"
        );
        assert_eq!(
            request_for(&["bayguard", "session", "start", "s1", "user", "99"]),
            "session start s1 user 99"
        );
        assert_eq!(
            request_for(&["bayguard", "session", "start", "s1"]),
            "session start s1"
        );
        assert_eq!(request_for(&["bayguard", "session", "claim"]), "session claim");
    }

    #[test]
    fn no_subcommand_runs_the_daemon() {
        let args = Args::try_parse_from(["bayguard", "-v", "-c", "/tmp/x.rune"]).unwrap();
        assert!(args.command.is_none());
        assert!(args.verbose);
    }

    #[test]
    fn negative_profile_counts_are_rejected() {
        assert!(Args::try_parse_from(["bayguard", "profiles", "-1", "0"]).is_err());
    }
}
