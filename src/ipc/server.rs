// Author: Dustin Pilgrim
// License: MIT

use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    net::{UnixListener, UnixStream},
    time::{Duration, timeout},
};

use super::router::{IpcContext, route_command};

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_REQUEST_BYTES: u64 = 1024;

/// Binds the control socket and serves it until the process exits.
pub async fn spawn_ipc_server(ctx: IpcContext) -> Result<(), String> {
    let path = super::socket_path()?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("failed to create {}: {e}", parent.display()))?;
    }

    // The single-instance lock is already held, so a leftover socket is stale.
    if path.exists() {
        let _ = std::fs::remove_file(&path);
    }

    let listener =
        UnixListener::bind(&path).map_err(|e| format!("failed to bind {}: {e}", path.display()))?;

    tracing::info!("ipc: listening on {}", path.display());

    tokio::spawn(serve(listener, ctx));
    Ok(())
}

pub async fn serve(listener: UnixListener, ctx: IpcContext) {
    loop {
        match listener.accept().await {
            Ok((stream, _addr)) => {
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, ctx).await {
                        tracing::warn!("ipc: connection error: {e}");
                    }
                });
            }
            Err(e) => tracing::error!("ipc: failed to accept connection: {e}"),
        }
    }
}

async fn handle_connection(stream: UnixStream, ctx: IpcContext) -> std::io::Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half.take(MAX_REQUEST_BYTES));

    let mut line = String::new();
    match timeout(CONNECTION_TIMEOUT, reader.read_line(&mut line)).await {
        Ok(res) => {
            res?;
        }
        Err(_) => {
            tracing::warn!("ipc: connection timed out before sending a command");
            return Ok(());
        }
    }

    let cmd = line.trim();
    if cmd.is_empty() {
        return Ok(());
    }

    if cmd == "subscribe" {
        tracing::debug!("ipc: subscriber connected");
        return super::handlers::subscribe::stream_updates(&mut write_half, &ctx).await;
    }

    tracing::debug!("ipc: received command: {cmd}");

    let work = async {
        let response = route_command(cmd, &ctx).await;
        write_half.write_all(response.as_bytes()).await?;
        write_half.flush().await?;
        write_half.shutdown().await
    };

    match timeout(CONNECTION_TIMEOUT, work).await {
        Ok(res) => res,
        Err(_) => {
            tracing::warn!("ipc: connection timed out after {}s", CONNECTION_TIMEOUT.as_secs());
            Ok(())
        }
    }
}
