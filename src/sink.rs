use crate::config::SinkKind;
use crate::console::render_preview;
use crate::error::SinkError;
use crate::metrics::now_timestamp_ms;
use crate::token::{decode_stream, Span};
use crossterm::cursor::MoveToColumn;
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use serde::Serialize;
use std::io::Write;
use tracing::debug;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{AtomEnum, PropMode, Window};
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

pub trait StatusSink {
    fn publish(&mut self, line: &[u8]) -> Result<(), SinkError>;
}

impl<S: StatusSink + ?Sized> StatusSink for Box<S> {
    fn publish(&mut self, line: &[u8]) -> Result<(), SinkError> {
        (**self).publish(line)
    }
}

pub type BoxedSink = Box<dyn StatusSink + Send>;

pub fn from_kind(kind: SinkKind) -> BoxedSink {
    match kind {
        SinkKind::Root => Box::new(RootWindow::default()),
        SinkKind::Stdout => Box::new(RawLines(std::io::stdout())),
        SinkKind::Terminal => Box::new(TerminalPreview(std::io::stdout())),
        SinkKind::Json => Box::new(JsonLines(std::io::stdout())),
    }
}

/// Stores the line as the X root window name, where dwm reads its status.
///
/// The connection is opened on first use and dropped after a failure, so the
/// next tick reconnects.
#[derive(Default)]
pub struct RootWindow {
    display: Option<String>,
    conn: Option<(RustConnection, Window)>,
}

impl RootWindow {
    /// `None` uses `$DISPLAY`.
    pub fn new(display: Option<String>) -> Self {
        Self {
            display,
            conn: None,
        }
    }
}

fn open_root(display: Option<&str>) -> Result<(RustConnection, Window), SinkError> {
    let (conn, screen) = x11rb::connect(display)?;
    let root = conn
        .setup()
        .roots
        .get(screen)
        .map(|s| s.root)
        .ok_or(SinkError::NoScreen(screen))?;
    debug!("Connected to X screen {}", screen);
    Ok((conn, root))
}

fn store_name(conn: &RustConnection, root: Window, line: &[u8]) -> Result<(), SinkError> {
    conn.change_property8(
        PropMode::REPLACE,
        root,
        AtomEnum::WM_NAME,
        AtomEnum::STRING,
        line,
    )?
    .check()?;
    Ok(())
}

impl StatusSink for RootWindow {
    fn publish(&mut self, line: &[u8]) -> Result<(), SinkError> {
        let (conn, root) = match self.conn.take() {
            Some(open) => open,
            None => open_root(self.display.as_deref())?,
        };
        store_name(&conn, root, line)?;
        self.conn = Some((conn, root));
        Ok(())
    }
}

/// Raw status bytes followed by a newline.
pub struct RawLines<W>(pub W);

impl<W: Write> StatusSink for RawLines<W> {
    fn publish(&mut self, line: &[u8]) -> Result<(), SinkError> {
        self.0.write_all(line)?;
        self.0.write_all(b"\n")?;
        self.0.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
struct TickReport {
    timestamp_ms: u128,
    spans: Vec<Span>,
}

/// Decoded spans as one JSON object per line.
pub struct JsonLines<W>(pub W);

impl<W: Write> StatusSink for JsonLines<W> {
    fn publish(&mut self, line: &[u8]) -> Result<(), SinkError> {
        let report = TickReport {
            timestamp_ms: now_timestamp_ms(),
            spans: decode_stream(line)?,
        };
        serde_json::to_writer(&mut self.0, &report)?;
        self.0.write_all(b"\n")?;
        self.0.flush()?;
        Ok(())
    }
}

/// Redraws a coloured preview in place on the current terminal line.
pub struct TerminalPreview<W>(pub W);

impl<W: Write> StatusSink for TerminalPreview<W> {
    fn publish(&mut self, line: &[u8]) -> Result<(), SinkError> {
        let spans = decode_stream(line)?;
        self.0.queue(MoveToColumn(0))?;
        self.0.queue(Clear(ClearType::CurrentLine))?;
        write!(self.0, "{}", render_preview(&spans, true))?;
        self.0.flush()?;
        Ok(())
    }
}
