//! Newline-delimited JSON framing over any async byte stream

use crate::protocol::ProtocolError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Longest line accepted from a peer
pub const MAX_FRAME_BYTES: usize = 4 * 1024 * 1024;

/// Serializes `message` as one JSON line and flushes it
pub async fn write_frame<W, T>(writer: &mut W, message: &T) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut line = serde_json::to_vec(message)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one raw line; `Ok(None)` means the peer closed the stream cleanly
///
/// The line is returned as bytes so that invalid UTF-8 surfaces as a
/// decode error rather than an IO error. A line longer than
/// [`MAX_FRAME_BYTES`] is discarded up to its newline and reported as
/// [`ProtocolError::FrameTooLarge`], leaving the stream at the next frame.
pub async fn read_line<R>(reader: &mut R) -> Result<Option<Vec<u8>>, ProtocolError>
where
    R: AsyncBufRead + Unpin,
{
    read_bounded_line(reader, MAX_FRAME_BYTES).await
}

async fn read_bounded_line<R>(
    reader: &mut R,
    max_bytes: usize,
) -> Result<Option<Vec<u8>>, ProtocolError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    let read = (&mut *reader)
        .take(max_bytes as u64 + 1)
        .read_until(b'\n', &mut line)
        .await?;

    if read == 0 {
        return Ok(None);
    }

    if line.last() == Some(&b'\n') || line.len() <= max_bytes {
        return Ok(Some(line));
    }

    let discarded = skip_past_newline(reader).await?;
    Err(ProtocolError::FrameTooLarge(line.len() + discarded))
}

/// Consumes input up to and including the next newline without buffering it
async fn skip_past_newline<R>(reader: &mut R) -> Result<usize, ProtocolError>
where
    R: AsyncBufRead + Unpin,
{
    let mut skipped = 0;

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(skipped);
        }

        match available.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                reader.consume(pos + 1);
                return Ok(skipped + pos + 1);
            }
            None => {
                let len = available.len();
                reader.consume(len);
                skipped += len;
            }
        }
    }
}

/// Decodes one JSON line; trailing whitespace and the newline are ignored
pub fn decode<T: DeserializeOwned>(line: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(line)?)
}

/// Reads and decodes one frame; `Ok(None)` on clean end of stream
pub async fn read_frame<R, T>(reader: &mut R) -> Result<Option<T>, ProtocolError>
where
    R: AsyncBufRead + Unpin,
    T: DeserializeOwned,
{
    match read_line(reader).await? {
        Some(line) => decode(&line).map(Some),
        None => Ok(None),
    }
}
