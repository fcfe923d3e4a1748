use crate::token::DecodeError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to read one telemetry source; the affected metric shows a placeholder.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed {what} in {}", path.display())]
    Malformed { path: PathBuf, what: &'static str },

    #[error("interface {0} not listed")]
    NoInterface(String),

    #[error("battery query failed: {0}")]
    Battery(#[from] battery::Error),

    #[error("wpa_supplicant control request failed: {0}")]
    Wpa(std::io::Error),

    #[error("mixer query failed: {0}")]
    Mixer(String),
}

/// Failure to publish a rendered line.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("cannot open X display: {0}")]
    Display(#[from] x11rb::errors::ConnectError),

    #[error("X display has no screen {0}")]
    NoScreen(usize),

    #[error("X connection failed: {0}")]
    X11(#[from] x11rb::errors::ConnectionError),

    #[error("X request failed: {0}")]
    X11Reply(#[from] x11rb::errors::ReplyError),

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("status line does not decode: {0}")]
    Decode(#[from] DecodeError),

    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}
