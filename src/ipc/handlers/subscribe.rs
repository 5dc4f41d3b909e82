// Author: Dustin Pilgrim
// License: MIT

use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast::error::RecvError;

use crate::core::info::ModalView;
use crate::ipc::router::IpcContext;

#[derive(Serialize)]
struct ViewLine<'a> {
    view: &'a ModalView,
}

/// `subscribe`: one JSON line for the current view, then one per view
/// change and per UI directive, until the client hangs up.
pub async fn stream_updates<W>(out: &mut W, ctx: &IpcContext) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut view = ctx.view.clone();
    let mut directives = ctx.ui.subscribe();

    let current = view.borrow_and_update().clone();
    if write_json(out, &ViewLine { view: &current }).await.is_err() {
        return Ok(());
    }

    loop {
        let sent = tokio::select! {
            changed = view.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = view.borrow_and_update().clone();
                write_json(out, &ViewLine { view: &current }).await
            }

            d = directives.recv() => match d {
                Ok(d) => write_json(out, &d).await,
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!("ipc: subscriber fell behind, {n} directives dropped");
                    continue;
                }
                Err(RecvError::Closed) => break,
            },
        };

        if sent.is_err() {
            tracing::debug!("ipc: subscriber disconnected");
            break;
        }
    }

    Ok(())
}

async fn write_json<W, T>(out: &mut W, value: &T) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut line = serde_json::to_vec(value)?;
    line.push(b'\n');
    out.write_all(&line).await?;
    out.flush().await
}
