// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned completion stream bodies and a raw TCP server for failure modes
//! wiremock cannot produce.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tracing::debug;

/// One `data: ` record carrying `text` as delta content, with its blank line.
pub fn sse_chunk(text: &str) -> String {
    let record = serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion.chunk",
        "choices": [{"index": 0, "delta": {"content": text}, "finish_reason": null}]
    });
    format!("data: {record}\n\n")
}

/// A full body: a role-only opening record, one record per fragment, a
/// `finish_reason` record, and the `[DONE]` sentinel.
pub fn sse_body(fragments: &[&str]) -> String {
    let mut body = String::from(
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\"}}]}\n\n",
    );
    for fragment in fragments {
        body.push_str(&sse_chunk(fragment));
    }
    body.push_str("data: {\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n");
    body.push_str("data: [DONE]\n\n");
    body
}

/// What the raw server does after writing its chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnding {
    /// Close the connection mid-body, producing a body read error.
    Abort,
    /// Keep the connection open without sending anything else.
    Stall,
}

/// A one-route HTTP/1.1 server that answers every request with a chunked
/// `text/event-stream` response, writes `chunks`, then ends as configured.
pub struct RawStreamServer {
    url: String,
    task: JoinHandle<()>,
}

impl RawStreamServer {
    /// Serves with status 200.
    pub async fn start(chunks: Vec<String>, ending: StreamEnding) -> std::io::Result<Self> {
        Self::start_with_status(200, chunks, ending).await
    }

    pub async fn start_with_status(
        status: u16,
        chunks: Vec<String>,
        ending: StreamEnding,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("http://{}", listener.local_addr()?);
        let task = tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let chunks = chunks.clone();
                tokio::spawn(async move {
                    if let Err(e) = serve(socket, status, &chunks, ending).await {
                        debug!(error = %e, "raw stream connection ended");
                    }
                });
            }
        });
        Ok(Self { url, task })
    }

    /// Base URL, suitable for `ChatSettings::new`.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for RawStreamServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(
    mut socket: TcpStream,
    status: u16,
    chunks: &[String],
    ending: StreamEnding,
) -> std::io::Result<()> {
    read_request(&mut socket).await?;

    let head = format!(
        "HTTP/1.1 {status} Canned\r\ncontent-type: text/event-stream\r\ntransfer-encoding: chunked\r\n\r\n"
    );
    socket.write_all(head.as_bytes()).await?;
    for chunk in chunks {
        if chunk.is_empty() {
            continue;
        }
        let framed = format!("{:x}\r\n{chunk}\r\n", chunk.len());
        socket.write_all(framed.as_bytes()).await?;
    }
    socket.flush().await?;

    match ending {
        StreamEnding::Abort => socket.shutdown().await,
        StreamEnding::Stall => {
            // Park until the client goes away.
            let mut buf = [0u8; 64];
            while socket.read(&mut buf).await? > 0 {}
            Ok(())
        }
    }
}

/// Reads headers and a `content-length` body so closing the socket later
/// does not reset unread client data.
async fn read_request(socket: &mut TcpStream) -> std::io::Result<()> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut buf).await?;
        if n == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "client closed before sending headers",
            ));
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&data[..header_end]).to_ascii_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let mut body_read = data.len() - header_end;
    while body_read < content_length {
        let n = socket.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        body_read += n;
    }
    Ok(())
}
