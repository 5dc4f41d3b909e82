// Author: Dustin Pilgrim
// License: MIT

use tokio::sync::{mpsc, watch};

use crate::core::{info::ModalView, manager_msg::ManagerMsg};
use crate::services::ui_bridge::UiBridge;

use super::handlers::{control, info, kiosk, reload, stop};

/// What a connection handler can reach: the daemon's inbox, the latest
/// view, and the UI directive stream.
#[derive(Clone)]
pub struct IpcContext {
    pub tx: mpsc::Sender<ManagerMsg>,
    pub view: watch::Receiver<ModalView>,
    pub ui: UiBridge,
}

pub async fn route_command(cmd: &str, ctx: &IpcContext) -> String {
    let (head, args) = match cmd.split_once(char::is_whitespace) {
        Some((h, rest)) => (h, rest.trim()),
        None => (cmd, ""),
    };

    match head {
        "activity" => control::handle_activity(args, &ctx.tx).await,
        "acknowledge" => control::handle_acknowledge(&ctx.tx).await,
        "dismiss" => control::handle_dismiss(&ctx.tx).await,
        "prompt" => control::handle_prompt(&ctx.tx).await,
        "sign-out" | "signout" => control::handle_sign_out(&ctx.tx).await,

        "route" => kiosk::handle_route(args, &ctx.tx).await,
        "profiles" => kiosk::handle_profiles(args, &ctx.tx).await,
        "session" => kiosk::handle_session(args, &ctx.tx).await,

        "info" => info::handle_info(args.contains("--json"), &ctx.tx).await,
        "reload" => reload::handle_reload(&ctx.tx).await,
        "stop" => stop::handle_stop(&ctx.tx).await,

        _ => {
            tracing::warn!("ipc: unknown command: {cmd}");
            format!("ERROR: Unknown command '{cmd}'")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::{ActivityKind, Event};
    use crate::core::state::SessionOwner;

    /// Answers every request with `Ok(())` and records the events.
    fn ctx_with_fake_daemon() -> (IpcContext, mpsc::Receiver<Event>) {
        let (tx, mut rx) = mpsc::channel::<ManagerMsg>(8);
        let (seen_tx, seen_rx) = mpsc::channel::<Event>(8);

        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                match msg {
                    ManagerMsg::Request { event, reply } => {
                        let _ = seen_tx.send(event).await;
                        let _ = reply.send(Ok(()));
                    }
                    ManagerMsg::Event(event) => {
                        let _ = seen_tx.send(event).await;
                    }
                    _ => {}
                }
            }
        });

        let (_view_tx, view) = watch::channel(ModalView::default());
        let ctx = IpcContext {
            tx,
            view,
            ui: UiBridge::new(),
        };
        (ctx, seen_rx)
    }

    #[tokio::test]
    async fn shot_activity_is_a_domain_event() {
        let (ctx, mut seen) = ctx_with_fake_daemon();

        let out = route_command("activity shot", &ctx).await;
        assert_eq!(out, "OK");
        assert!(matches!(
            seen.recv().await,
            Some(Event::UserActivity {
                kind: ActivityKind::DomainEvent,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn session_start_parses_owner_and_start_time() {
        let (ctx, mut seen) = ctx_with_fake_daemon();

        let out = route_command("session start s_42 user 1700000000000", &ctx).await;
        assert_eq!(out, "OK");

        match seen.recv().await {
            Some(Event::SessionStarted {
                session_id,
                owner,
                started_at_ms,
                ..
            }) => {
                assert_eq!(session_id, "s_42");
                assert_eq!(owner, Some(SessionOwner::User));
                assert_eq!(started_at_ms, 1_700_000_000_000);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn bad_arguments_are_reported_without_reaching_the_daemon() {
        let (ctx, mut seen) = ctx_with_fake_daemon();

        assert!(route_command("profiles one 2", &ctx).await.starts_with("ERROR"));
        assert!(route_command("session start s1 admin", &ctx).await.starts_with("ERROR"));
        assert!(route_command("route", &ctx).await.starts_with("ERROR"));
        assert!(route_command("activity wiggle", &ctx).await.starts_with("ERROR"));
        assert!(route_command("frobnicate", &ctx).await.starts_with("ERROR"));

        assert!(seen.try_recv().is_err());
    }

    #[tokio::test]
    async fn route_and_profiles_are_forwarded() {
        let (ctx, mut seen) = ctx_with_fake_daemon();

        route_command("route /play", &ctx).await;
        route_command("profiles 1 2", &ctx).await;

        assert!(matches!(
            seen.recv().await,
            Some(Event::RouteChanged { path, .. }) if path == "/play"
        ));
        assert!(matches!(
            seen.recv().await,
            Some(Event::ProfilesChanged {
                linked_accounts: 1,
                guest_profiles: 2,
                ..
            })
        ));
    }
}
