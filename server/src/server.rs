//! The accept loop and per-connection sessions.

use std::future::Future;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::error::{ServerError, SessionError};
use crate::protocol::{Request, Response};
use crate::Store;

/// The maximum length of a request line including its terminator.
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Accepts connections and serves each of them on its own task until `shutdown` resolves.
///
/// Session errors are logged and never stop the accept loop.
///
/// # Errors
///
/// Returns a [`ServerError`] if the local address of the listener cannot be read.
pub async fn serve<F>(
    listener: TcpListener,
    store: Arc<Store>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()>,
{
    info!(addr = %listener.local_addr()?, buckets = store.bucket_count(), "listening");
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            () = &mut shutdown => {
                info!("shutting down");
                return Ok(());
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let store = store.clone();
                    tokio::spawn(async move {
                        match handle_session(stream, &store).await {
                            Ok(response) => debug!(%peer, %response, "session done"),
                            Err(error) => warn!(%peer, %error, "session error"),
                        }
                    });
                }
                Err(error) => warn!(%error, "failed to accept a connection"),
            },
        }
    }
}

/// Reads one request line from the stream, applies it, and writes one response line.
///
/// # Errors
///
/// Returns a [`SessionError`] if the request line cannot be read or the response cannot be
/// written; nothing is written back in the former case.
pub async fn handle_session<S>(stream: S, store: &Store) -> Result<Response, SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut line = Vec::new();
    let limit = u64::try_from(MAX_LINE_LEN).unwrap_or(u64::MAX);
    (&mut reader).take(limit).read_until(b'\n', &mut line).await?;
    if line.last() != Some(&b'\n') {
        if line.len() >= MAX_LINE_LEN {
            return Err(SessionError::LineTooLong {
                limit: MAX_LINE_LEN,
            });
        }
        return Err(SessionError::Incomplete);
    }
    let line = std::str::from_utf8(&line).map_err(|_| SessionError::InvalidUtf8)?;

    let request = Request::parse(line);
    let response = request.execute(store);
    debug!(?request, %response, "request");

    let mut stream = reader.into_inner();
    stream
        .write_all(format!("{response}\n").as_bytes())
        .await?;
    stream.shutdown().await?;
    Ok(response)
}
