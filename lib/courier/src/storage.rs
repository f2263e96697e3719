//! Writing response bodies to the filesystem.

use std::path::Path;

use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::{BodySink, Result, StreamingBody};

/// Write a body stream to `destination`, creating or truncating it.
///
/// Returns the number of bytes written once the file has been flushed.
///
/// # Errors
///
/// Returns [`Error::Storage`](crate::Error::Storage) if the file cannot be
/// created or written, and the stream's own error if reading the body fails.
/// A partially written file is left in place.
pub async fn write_to_file(mut body: StreamingBody, destination: &Path) -> Result<u64> {
    let mut file = File::create(destination).await?;
    let mut written: u64 = 0;

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    debug!(destination = %destination.display(), written, "response body stored");
    Ok(written)
}

/// [`BodySink`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSink;

impl BodySink for FileSink {
    async fn write(&self, body: StreamingBody, destination: &Path) -> Result<u64> {
        write_to_file(body, destination).await
    }
}
