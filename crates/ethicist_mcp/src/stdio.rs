//! Newline-delimited JSON-RPC over stdin/stdout.
//!
//! Each request runs on its own task; responses funnel through one writer
//! task so lines never interleave. Logs must go to stderr.

use crate::protocol::{error_codes, JsonRpcError, JsonRpcResponse};
use crate::server::McpServer;
use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

pub async fn run_stdio(server: McpServer) -> Result<()> {
    tracing::info!("MCP stdio transport started");
    serve(server, tokio::io::stdin(), tokio::io::stdout()).await?;
    tracing::info!("MCP stdio transport stopped (stdin closed)");
    Ok(())
}

/// Serve until `reader` hits EOF and every in-flight request has answered.
pub async fn serve<R, W>(server: McpServer, reader: R, writer: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<JsonRpcResponse>(64);

    let writer_task = tokio::spawn(async move {
        let mut writer = writer;
        while let Some(response) = rx.recv().await {
            let mut bytes = serde_json::to_vec(&response).context("Failed to encode response")?;
            bytes.push(b'\n');
            writer
                .write_all(&bytes)
                .await
                .context("Failed to write response")?;
            writer.flush().await.context("Failed to flush output")?;
        }
        Ok::<(), anyhow::Error>(())
    });

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .await
            .context("Failed to read input")?;
        if n == 0 {
            break;
        }
        let line = match std::str::from_utf8(&buf) {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                tracing::warn!("Input line is not valid UTF-8: {}", e);
                let error = JsonRpcError::new(
                    error_codes::PARSE_ERROR,
                    format!("Parse error: invalid UTF-8: {}", e),
                );
                if tx.send(JsonRpcResponse::failure(None, error)).await.is_err() {
                    tracing::warn!("Output closed; dropping response");
                }
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }
        let server = server.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Some(response) = server.handle_raw(&line).await {
                if tx.send(response).await.is_err() {
                    tracing::warn!("Output closed; dropping response");
                }
            }
        });
    }

    // Writer finishes once the last in-flight task drops its sender
    drop(tx);
    writer_task.await.context("Writer task panicked")??;
    Ok(())
}
