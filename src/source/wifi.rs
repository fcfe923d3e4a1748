use crate::error::SourceError;
use crate::metrics::{WifiReading, WifiState};
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

static CLIENT_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Queries the first control socket under `ctrl_dir` that accepts a connection.
///
/// `None` when the directory is missing or nothing in it is reachable. A
/// connected socket that fails to answer is an error.
pub fn wifi(ctrl_dir: &Path) -> Result<Option<WifiReading>, SourceError> {
    let entries = match std::fs::read_dir(ctrl_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SourceError::Io {
                path: ctrl_dir.to_path_buf(),
                source,
            })
        }
    };
    for entry in entries.flatten() {
        let server = entry.path();
        let client = ClientSocket::bind().map_err(SourceError::Wpa)?;
        if let Err(e) = client.socket.connect(&server) {
            debug!("Control socket {} not reachable: {}", server.display(), e);
            continue;
        }
        let reply = client.request(b"STATUS").map_err(SourceError::Wpa)?;
        return Ok(Some(parse_status(&reply)));
    }
    Ok(None)
}

/// Client end of a control connection; the bound path is removed on drop.
struct ClientSocket {
    socket: UnixDatagram,
    path: PathBuf,
}

impl ClientSocket {
    fn bind() -> std::io::Result<Self> {
        let n = CLIENT_COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!("dwmstatus-wpa-{}-{n}", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let socket = UnixDatagram::bind(&path)?;
        socket.set_read_timeout(Some(REQUEST_TIMEOUT))?;
        Ok(Self { socket, path })
    }

    fn request(&self, command: &[u8]) -> std::io::Result<String> {
        self.socket.send(command)?;
        let mut buf = vec![0u8; 4096];
        let len = self.socket.recv(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf[..len]).into_owned())
    }
}

impl Drop for ClientSocket {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Parses the `key=value` lines of a `STATUS` reply.
pub fn parse_status(reply: &str) -> WifiReading {
    let mut reading = WifiReading {
        state: WifiState::Off,
        ssid: String::new(),
    };
    for line in reply.lines() {
        match line.split_once('=') {
            Some(("ssid", ssid)) => reading.ssid = ssid.to_string(),
            Some(("wpa_state", state)) => reading.state = WifiState::from_wpa_state(state),
            _ => {}
        }
    }
    reading
}
