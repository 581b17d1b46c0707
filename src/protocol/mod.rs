//! Remote call protocol between workers and the coordinator
//!
//! Each call is one JSON object on its own line, answered by exactly one
//! JSON line. See [`Request`] and [`Response`] for the message shapes.

mod codec;
mod messages;

pub use codec::{decode, read_frame, read_line, write_frame, MAX_FRAME_BYTES};
pub use messages::{CrawlTask, Request, Response};

use thiserror::Error;

/// Errors raised while encoding or decoding frames
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Frame of {0} bytes exceeds the limit")]
    FrameTooLarge(usize),
}
