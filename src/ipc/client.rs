// Author: Dustin Pilgrim
// License: MIT

use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    net::UnixStream,
    time::{Duration, timeout},
};

const IO_TIMEOUT: Duration = Duration::from_secs(2);

async fn connect_and_send(cmd: &str) -> Result<UnixStream, String> {
    let path = crate::ipc::socket_path()?;

    if !path.exists() {
        return Err("daemon not running".to_string());
    }

    let mut stream = match timeout(IO_TIMEOUT, UnixStream::connect(&path)).await {
        Ok(Ok(s)) => s,
        Ok(Err(e)) => return Err(format!("failed to connect to {}: {e}", path.display())),
        Err(_) => return Err("timeout connecting to daemon".to_string()),
    };

    let line = format!("{}\n", cmd.trim());
    timeout(IO_TIMEOUT, stream.write_all(line.as_bytes()))
        .await
        .map_err(|_| "timeout writing to daemon".to_string())?
        .map_err(|e| format!("write failed: {e}"))?;

    Ok(stream)
}

/// One request, one response.
pub async fn send_raw(cmd: &str) -> Result<String, String> {
    let mut stream = connect_and_send(cmd).await?;

    timeout(IO_TIMEOUT, stream.shutdown())
        .await
        .map_err(|_| "timeout finalizing request".to_string())?
        .map_err(|e| format!("shutdown failed: {e}"))?;

    // Requests wait on the daemon loop, so allow more than the I/O timeout.
    let mut resp = Vec::new();
    timeout(IO_TIMEOUT * 5, stream.read_to_end(&mut resp))
        .await
        .map_err(|_| "timeout reading response".to_string())?
        .map_err(|e| format!("read failed: {e}"))?;

    Ok(String::from_utf8_lossy(&resp).to_string())
}

/// Send `cmd` and hand every response line to `on_line` until the daemon
/// closes the connection.
pub async fn stream_lines<F>(cmd: &str, mut on_line: F) -> Result<(), String>
where
    F: FnMut(&str),
{
    let stream = connect_and_send(cmd).await?;
    let mut lines = BufReader::new(stream).lines();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| format!("read failed: {e}"))?
    {
        on_line(&line);
    }

    Ok(())
}
