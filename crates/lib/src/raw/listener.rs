//! TCP listener for the line protocol: one spawned task per connection.
//!
//! A session reads lines until the client half-closes, posts the assembled message to
//! the gateway, writes back a single reply and closes.

use super::assemble::assemble;
use super::parser::LineParser;
use crate::config::RawConfig;
use crate::gateway::{Deliver, GatewayClient};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

/// Short random token used only to correlate a session's log lines.
pub fn correlation_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Bind the configured socket and serve sessions until accept fails.
pub async fn run_listener(config: &RawConfig) -> Result<()> {
    let gateway = GatewayClient::new(config.gateway_url.clone(), config.timeout())
        .context("building gateway client")?;
    let listener = TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("binding to {}", config.listen))?;
    log::info!("gateway url : {}", config.gateway_url);
    log::info!("listening on: {}", config.listen);
    serve(listener, Arc::new(gateway)).await
}

/// Accept loop. Never waits on a session; returns only when accept itself fails.
pub async fn serve(listener: TcpListener, gateway: Arc<dyn Deliver>) -> Result<()> {
    loop {
        let (stream, peer) = listener.accept().await.context("accepting connection")?;
        let gateway = gateway.clone();
        tokio::spawn(async move {
            let rid = correlation_id();
            log::info!("[{}] accepted: {}", rid, peer);
            if let Err(e) = run_session(stream, gateway.as_ref(), &rid).await {
                log::warn!("[{}] connection error: {}", rid, e);
            }
        });
    }
}

/// Drive one session over any byte stream. The only error returned is a failure to
/// write the reply back; read errors end parsing and the message is still sent.
pub async fn run_session<S>(stream: S, gateway: &dyn Deliver, rid: &str) -> std::io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);
    let mut parser = LineParser::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => parser.feed(&line_text(&buf)),
            Err(e) => {
                log::warn!("[{}] read failed, sending what was received: {}", rid, e);
                break;
            }
        }
    }

    let reply = match assemble(parser.finish()).to_json() {
        Ok(payload) => {
            log::info!("[{}] sending: {}", rid, payload);
            match gateway.deliver(payload).await {
                Ok(body) => {
                    log::info!("[{}] resp: {}", rid, body);
                    body
                }
                Err(e) => {
                    log::warn!("[{}] {}", rid, e);
                    format!("Failed: {}", e)
                }
            }
        }
        Err(e) => format!("Failed: {}", e),
    };

    writer.write_all(reply.as_bytes()).await?;
    writer.shutdown().await
}

/// Strip the line terminator (`\n` or `\r\n`); invalid UTF-8 is replaced, not rejected.
fn line_text(buf: &[u8]) -> String {
    let mut end = buf.len();
    if end > 0 && buf[end - 1] == b'\n' {
        end -= 1;
        if end > 0 && buf[end - 1] == b'\r' {
            end -= 1;
        }
    }
    String::from_utf8_lossy(&buf[..end]).into_owned()
}
