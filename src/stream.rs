//! C9: bidirectional duplex streaming for large reads/writes.
//!
//! The client-to-server half is a hand-rolled `mpsc::Receiver` wrapped as a
//! `tokio_stream::wrappers::ReceiverStream`, handed to tonic's client
//! streaming call — the same request/response shape the teacher uses for
//! its server-streaming job-activation call, generalised here to
//! bidirectional.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::connection::KernelConnection;
use crate::dispatch::CallContext;
use crate::error::GatewayError;
use crate::pb;

const CHUNK_CHANNEL_DEPTH: usize = 10;
const DEFAULT_CHUNK_SIZE: u32 = 64 * 1024;
const WRITE_DEADLINE: Duration = Duration::from_secs(10);

/// Result of draining a read stream to completion.
pub struct ReadOutcome {
    pub chunks: Vec<Vec<u8>>,
    pub total_bytes: u64,
}

/// Result of a write stream.
pub struct WriteOutcome {
    pub total_bytes: u64,
    pub error: Option<String>,
}

/// Receive the next server frame, honoring `ctx`'s cancellation token and,
/// if set, its deadline. Streams have no inherent ceiling of their own, so
/// absent a caller deadline this can wait indefinitely.
async fn next_frame(
    inbound: &mut tonic::Streaming<pb::StreamServerFrame>,
    ctx: &CallContext,
) -> Result<Option<pb::StreamServerFrame>, GatewayError> {
    tokio::select! {
        frame = async {
            match ctx.deadline {
                Some(d) => Ok(tokio::time::timeout(d, inbound.message()).await??),
                None => Ok(inbound.message().await?),
            }
        } => frame,
        _ = ctx.cancellation.cancelled() => Err(GatewayError::Cancelled),
    }
}

#[derive(Clone)]
pub struct StreamEngine {
    connection: KernelConnection,
}

impl StreamEngine {
    pub fn new(connection: KernelConnection) -> Self {
        StreamEngine { connection }
    }

    /// Open a read stream: send one read-open frame, half-close the send
    /// side, then drain incoming frames until `complete` or the receive
    /// side ends. `ctx`'s cancellation token, if it fires mid-drain, ends
    /// the read with [`GatewayError::Cancelled`]; reads have no inherent
    /// deadline, so `ctx`'s deadline only applies if the caller set one.
    pub async fn stream_read(
        &self,
        ctx: &CallContext,
        pid: u32,
        path: &str,
        chunk_size: u32,
    ) -> Result<ReadOutcome, GatewayError> {
        let (tx, rx) = mpsc::channel(1);
        tx.send(pb::StreamClientFrame {
            pid,
            frame: Some(pb::stream_client_frame::Frame::ReadOpen(
                pb::ReadOpenFrame {
                    path: path.to_string(),
                    chunk_size,
                },
            )),
        })
        .await
        .map_err(|_| GatewayError::StreamClosed("failed to send read-open frame".to_string()))?;
        drop(tx); // half-close: this is the only frame on a read stream.

        let mut client = self.connection.client();
        let outbound = ReceiverStream::new(rx);
        let mut inbound = client
            .stream_syscall(tonic::Request::new(outbound))
            .await?
            .into_inner();

        let mut chunks = Vec::new();
        let mut total_bytes = 0u64;

        loop {
            let frame = match next_frame(&mut inbound, ctx).await? {
                Some(frame) => frame,
                None => break,
            };
            match frame.frame {
                Some(pb::stream_server_frame::Frame::Data(data)) => {
                    total_bytes += data.data.len() as u64;
                    chunks.push(data.data);
                }
                Some(pb::stream_server_frame::Frame::Error(err)) => {
                    return Err(GatewayError::SyscallFailed {
                        message: err.message,
                    });
                }
                Some(pb::stream_server_frame::Frame::Complete(_)) => break,
                None => {
                    return Err(GatewayError::MalformedResponse {
                        call: "stream_read".to_string(),
                        detail: "server frame carried no payload".to_string(),
                    });
                }
            }
        }

        Ok(ReadOutcome {
            chunks,
            total_bytes,
        })
    }

    /// Open a write stream: stream `finish=false` frames for each chunk
    /// pulled from `reader` (default 64 KiB chunks), then a terminal
    /// `finish=true` frame, then await the server's completion frame.
    /// `ctx`'s deadline, if earlier than the default 10s write ceiling,
    /// applies to the whole exchange; `ctx`'s cancellation token ends the
    /// wait early with [`GatewayError::Cancelled`].
    ///
    /// On a read error from `reader`, the sink is closed without
    /// signalling through the data channel — the source error is dropped.
    /// This is a documented limitation, not an oversight.
    pub async fn stream_write_from_reader(
        &self,
        ctx: &CallContext,
        pid: u32,
        path: &str,
        mut reader: impl AsyncRead + Unpin + Send + 'static,
    ) -> Result<WriteOutcome, GatewayError> {
        let (tx, rx) = mpsc::channel(CHUNK_CHANNEL_DEPTH);
        let path_owned = path.to_string();

        let producer = tokio::spawn(async move {
            let mut buf = vec![0u8; DEFAULT_CHUNK_SIZE as usize];
            loop {
                match reader.read(&mut buf).await {
                    Ok(0) => break,
                    Ok(n) => {
                        let frame = pb::StreamClientFrame {
                            pid,
                            frame: Some(pb::stream_client_frame::Frame::Write(pb::WriteFrame {
                                path: path_owned.clone(),
                                chunk: buf[..n].to_vec(),
                                finish: false,
                            })),
                        };
                        if tx.send(frame).await.is_err() {
                            return;
                        }
                    }
                    Err(_) => break,
                }
            }
            let _ = tx
                .send(pb::StreamClientFrame {
                    pid,
                    frame: Some(pb::stream_client_frame::Frame::Write(pb::WriteFrame {
                        path: path_owned,
                        chunk: Vec::new(),
                        finish: true,
                    })),
                })
                .await;
        });

        let ceiling = ctx.resolve_or(WRITE_DEADLINE);
        let mut client = self.connection.client();
        let outbound = ReceiverStream::new(rx);
        let mut inbound = tokio::select! {
            result = tokio::time::timeout(ceiling, client.stream_syscall(tonic::Request::new(outbound))) => {
                result??.into_inner()
            }
            _ = ctx.cancellation.cancelled() => return Err(GatewayError::Cancelled),
        };

        let mut result = WriteOutcome {
            total_bytes: 0,
            error: None,
        };

        loop {
            let frame = match next_frame(&mut inbound, ctx).await? {
                Some(frame) => frame,
                None => break,
            };
            match frame.frame {
                Some(pb::stream_server_frame::Frame::Complete(complete)) => {
                    result.total_bytes = complete.total_bytes;
                    break;
                }
                Some(pb::stream_server_frame::Frame::Error(err)) => {
                    result.error = Some(err.message);
                    break;
                }
                Some(pb::stream_server_frame::Frame::Data(_)) | None => {
                    return Err(GatewayError::MalformedResponse {
                        call: "stream_write".to_string(),
                        detail: "unexpected frame on a write stream".to_string(),
                    });
                }
            }
        }

        let _ = producer.await;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stream_write_from_reader_counts_bytes_through_a_fake_source() {
        let data = b"hello, kernel".to_vec();
        let mut reader = std::io::Cursor::new(data.clone());
        let mut buf = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut buf)
            .await
            .unwrap();
        assert_eq!(buf, data);
    }
}
