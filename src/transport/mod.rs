//! Newline-delimited transport tap
//!
//! A thin framed reader over any `AsyncRead`, yielding one line at a time
//! with its byte length so the transport lane can apply size policy. The
//! canonical ACP transport is LF-separated UTF-8; carriage returns are
//! stripped for tolerance of Windows-captured streams.

use futures::StreamExt;
use thiserror::Error;
use tokio::io::AsyncRead;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};

/// Why the tap stopped yielding frames
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    /// A line exceeded the configured frame limit
    #[error("frame exceeds {max_frame_bytes} bytes")]
    FrameTooLong { max_frame_bytes: usize },
}

/// One line read from the byte stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapFrame {
    pub line: String,
    /// Byte length of the line, excluding the separator
    pub raw_len: usize,
}

/// A line-framed reader with an optional frame-size limit
#[derive(Debug)]
pub struct FrameTap<R> {
    inner: FramedRead<R, LinesCodec>,
    max_frame_bytes: Option<usize>,
}

impl<R: AsyncRead + Unpin> FrameTap<R> {
    pub fn new(reader: R, max_frame_bytes: Option<usize>) -> Self {
        let codec = match max_frame_bytes {
            Some(limit) => LinesCodec::new_with_max_length(limit),
            None => LinesCodec::new(),
        };
        FrameTap {
            inner: FramedRead::new(reader, codec),
            max_frame_bytes,
        }
    }

    /// The next frame, or `None` at end of stream
    pub async fn next_frame(&mut self) -> Option<Result<TapFrame, TransportError>> {
        loop {
            let frame = match self.inner.next().await? {
                Ok(mut line) => {
                    if line.ends_with('\r') {
                        line.pop();
                    }
                    if line.trim().is_empty() {
                        continue;
                    }
                    let raw_len = line.len();
                    Ok(TapFrame { line, raw_len })
                }
                Err(LinesCodecError::MaxLineLengthExceeded) => Err(TransportError::FrameTooLong {
                    max_frame_bytes: self.max_frame_bytes.unwrap_or(0),
                }),
                Err(LinesCodecError::Io(err)) => Err(TransportError::Io(err)),
            };
            return Some(frame);
        }
    }
}
