//! Newline-delimited JSON framing.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Longest line [`read_message`] accepts, in bytes, excluding the newline.
pub const MAX_FRAME_LEN: usize = 8 * 1024 * 1024;

/// Errors raised while reading or writing framed messages.
#[derive(Debug, Error)]
pub enum CodecError {
	/// The underlying stream failed.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
	/// A line did not hold a valid message.
	#[error("malformed message: {0}")]
	Json(#[from] serde_json::Error),
	/// A line ran past [`MAX_FRAME_LEN`]. The stream is left mid-line.
	#[error("message longer than {limit} bytes")]
	FrameTooLong {
		/// The limit that was exceeded.
		limit: usize,
	},
}

/// Reads the next message, skipping blank lines.
///
/// Returns `Ok(None)` at end of stream. `buf` is reused between calls and
/// never grows past [`MAX_FRAME_LEN`] plus one byte.
pub async fn read_message<R, T>(reader: &mut R, buf: &mut String) -> Result<Option<T>, CodecError>
where
	R: AsyncBufRead + Unpin,
	T: DeserializeOwned,
{
	read_message_limited(reader, buf, MAX_FRAME_LEN).await
}

async fn read_message_limited<R, T>(reader: &mut R, buf: &mut String, limit: usize) -> Result<Option<T>, CodecError>
where
	R: AsyncBufRead + Unpin,
	T: DeserializeOwned,
{
	loop {
		buf.clear();
		let bytes_read = (&mut *reader).take(limit as u64 + 1).read_line(buf).await?;
		if bytes_read == 0 {
			return Ok(None);
		}
		if bytes_read > limit && !buf.ends_with('\n') {
			return Err(CodecError::FrameTooLong { limit });
		}

		let line = buf.trim();
		if line.is_empty() {
			continue;
		}

		return Ok(Some(serde_json::from_str(line)?));
	}
}

/// Writes `msg` as a single line and flushes.
pub async fn write_message<W, T>(writer: &mut W, msg: &T) -> Result<(), CodecError>
where
	W: AsyncWrite + Unpin,
	T: Serialize,
{
	let mut line = serde_json::to_string(msg)?;
	line.push('\n');
	writer.write_all(line.as_bytes()).await?;
	writer.flush().await?;
	Ok(())
}
