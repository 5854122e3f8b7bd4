//! Newline-delimited JSON-RPC over a byte stream (stdio in production)

use super::protocol::JsonRpcResponse;
use super::server::McpServer;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Serve requests from `reader` until EOF, writing one response per line.
///
/// Each request runs on its own task, so a slow provider call never blocks
/// other invocations. Responses are written whole through a single writer
/// task; their order follows completion, not arrival. Returns the writer
/// once all in-flight requests have answered.
pub async fn serve<R, W>(server: Arc<McpServer>, reader: R, writer: W) -> io::Result<W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<JsonRpcResponse>();

    let writer_task = tokio::spawn(async move {
        let mut writer = writer;
        while let Some(response) = rx.recv().await {
            let mut line = serde_json::to_string(&response)?;
            line.push('\n');
            writer.write_all(line.as_bytes()).await?;
            writer.flush().await?;
        }
        Ok::<W, io::Error>(writer)
    });

    let mut lines = reader.lines();
    let mut in_flight = JoinSet::new();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let server = Arc::clone(&server);
        let tx = tx.clone();
        in_flight.spawn(async move {
            if let Some(response) = server.handle_line(&line).await {
                // Receiver only closes if the writer failed; that error surfaces below.
                let _ = tx.send(response);
            }
        });
    }
    debug!("Input closed, waiting for {} in-flight requests", in_flight.len());

    while in_flight.join_next().await.is_some() {}
    drop(tx);

    writer_task
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
}

pub async fn serve_stdio(server: Arc<McpServer>) -> io::Result<()> {
    info!("Serving MCP over stdio");
    serve(server, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;
    info!("stdin closed, shutting down");
    Ok(())
}
