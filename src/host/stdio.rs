//! Stdin/stdout JSON bridge for the search host.
//!
//! Reads newline-delimited JSON [`CommandEnvelope`] messages from stdin,
//! dispatches them to a [`SearchHost`], and writes [`ResponseEnvelope`] and
//! [`EventEnvelope`] messages as newline-delimited JSON to stdout.
//!
//! Stdout is exclusively reserved for the JSON protocol; all diagnostic
//! output (tracing, logs) must be routed to stderr.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::error::{HostError, Result};
use crate::host::SearchHost;
use crate::host::contract::{Command, CommandEnvelope, EventEnvelope, ResponseEnvelope};

type SharedWriter<W> = Arc<Mutex<BufWriter<W>>>;

/// Run the bridge on the process's stdin and stdout until stdin closes or
/// a `stop` command is received.
pub async fn run_stdio_bridge(host: SearchHost) -> Result<()> {
    run_bridge(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), host).await
}

/// Run the bridge over arbitrary streams.
///
/// Two concurrent activities operate in parallel:
///
/// 1. **Reader** -- reads commands line by line. Session commands are
///    answered inline; one-shot searches run on their own tasks so a slow
///    search never blocks typing.
/// 2. **Event forwarder** -- writes a `state` event for every session
///    snapshot change.
///
/// On EOF, outstanding searches are allowed to finish; after `stop` they
/// are cancelled. Either way their responses are flushed before the
/// forwarder is stopped.
pub async fn run_bridge<R, W>(input: R, output: W, host: SearchHost) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let writer = Arc::new(Mutex::new(BufWriter::new(output)));

    let event_writer = Arc::clone(&writer);
    let mut snapshots = host.subscribe();
    let event_handle = tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let event = EventEnvelope::State(snapshots.borrow_and_update().clone());
            match serde_json::to_string(&event) {
                Ok(json) => {
                    let mut w = event_writer.lock().await;
                    if let Err(e) = write_line(&mut w, &json).await {
                        tracing::warn!(
                            error = %e,
                            "failed to write state event; stopping event forwarder"
                        );
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to serialize state event; skipping");
                }
            }
        }
    });

    let mut searches = JoinSet::new();
    let reader_result = run_reader(input, &host, &writer, &mut searches).await;

    while let Some(joined) = searches.join_next().await {
        if let Err(e) = joined {
            tracing::warn!(error = %e, "search task failed");
        }
    }
    event_handle.abort();
    let _ = event_handle.await;

    reader_result
}

async fn run_reader<R, W>(
    mut input: R,
    host: &SearchHost,
    writer: &SharedWriter<W>,
    searches: &mut JoinSet<()>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let mut line = String::new();
    loop {
        line.clear();
        let bytes_read = input
            .read_line(&mut line)
            .await
            .map_err(|e| HostError::Channel(format!("failed to read from stdin: {e}")))?;

        if bytes_read == 0 {
            tracing::info!("stdin closed (EOF); shutting down stdio bridge");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let envelope: CommandEnvelope = match serde_json::from_str(trimmed) {
            Ok(env) => env,
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse command envelope");
                let response = ResponseEnvelope::bad_request(
                    "parse-error",
                    format!("failed to parse command envelope: {e}"),
                );
                send(writer, &response).await?;
                continue;
            }
        };

        match envelope.command {
            Command::Search { .. } => {
                let host = host.clone();
                let writer = Arc::clone(writer);
                searches.spawn(async move {
                    let response = host.handle(envelope).await;
                    if let Err(e) = send(&writer, &response).await {
                        tracing::warn!(error = %e, "failed to write search response");
                    }
                });
            }
            Command::Stop => {
                let response = host.handle(envelope).await;
                send(writer, &response).await?;
                tracing::info!("stop received; shutting down stdio bridge");
                break;
            }
            _ => {
                let response = host.handle(envelope).await;
                send(writer, &response).await?;
            }
        }
    }
    Ok(())
}

async fn send<W>(writer: &SharedWriter<W>, response: &ResponseEnvelope) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let json = serde_json::to_string(response)?;
    let mut w = writer.lock().await;
    write_line(&mut w, &json).await
}

/// Write a single JSON line to the buffered writer and flush.
async fn write_line<W>(writer: &mut BufWriter<W>, json: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(json.as_bytes())
        .await
        .map_err(|e| HostError::Channel(format!("failed to write to stdout: {e}")))?;
    writer
        .write_all(b"\n")
        .await
        .map_err(|e| HostError::Channel(format!("failed to write newline to stdout: {e}")))?;
    writer
        .flush()
        .await
        .map_err(|e| HostError::Channel(format!("failed to flush stdout: {e}")))?;
    Ok(())
}
