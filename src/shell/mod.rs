//! Interactive reverse shell over a WebSocket.
//!
//! One thread reads input lines into a channel; the calling thread owns
//! the socket, forwards queued lines as text messages and writes whatever
//! the server sends to the output.  The socket is read with a short
//! timeout so both directions make progress on that one thread.

use std::io::{self, BufRead, ErrorKind, Write};
use std::net::TcpStream;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use crate::config::Settings;
use crate::errors::{NucError, Result};

/// How long `read` blocks before the relay checks for input again.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long to wait for the server to close after `exit` or end of input.
pub const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Line that ends the session.
const EXIT_COMMAND: &str = "exit";

/// Pick the WebSocket URL: explicit flag, then settings, then derived
/// from the API URL.
pub fn resolve_url(flag: Option<&str>, settings: &Settings) -> Result<String> {
    if let Some(url) = flag.or(settings.shell_url.as_deref()) {
        return Ok(url.to_string());
    }
    derive_ws_url(&settings.api_url)
}

/// `http://host` → `ws://host/ws`, `https://host` → `wss://host/ws`.
pub fn derive_ws_url(api_url: &str) -> Result<String> {
    let base = api_url.trim_end_matches('/');
    if let Some(rest) = base.strip_prefix("https://") {
        Ok(format!("wss://{rest}/ws"))
    } else if let Some(rest) = base.strip_prefix("http://") {
        Ok(format!("ws://{rest}/ws"))
    } else {
        Err(NucError::ConfigError(format!(
            "cannot derive a WebSocket URL from '{api_url}'"
        )))
    }
}

/// Connect to `url` and relay stdin/stdout until the session ends.
pub fn run(url: &str) -> Result<()> {
    tracing::debug!(%url, "connecting to shell");
    let (mut socket, response) = tungstenite::connect(url).map_err(ws_error)?;
    tracing::debug!(status = %response.status(), "shell connected");

    set_read_timeout(&mut socket, POLL_INTERVAL)?;

    let lines = spawn_line_reader(io::BufReader::new(io::stdin()));
    let stdout = io::stdout();
    let mut out = stdout.lock();
    relay(&mut socket, &lines, &mut out)
}

/// Apply a read timeout to the TCP stream under a client socket.
fn set_read_timeout(
    socket: &mut WebSocket<MaybeTlsStream<TcpStream>>,
    timeout: Duration,
) -> Result<()> {
    match socket.get_mut() {
        MaybeTlsStream::Plain(stream) => stream.set_read_timeout(Some(timeout))?,
        MaybeTlsStream::Rustls(stream) => stream.sock.set_read_timeout(Some(timeout))?,
        _ => {
            return Err(NucError::WebSocket(
                "unsupported stream type for shell session".into(),
            ))
        }
    }
    Ok(())
}

/// Read lines from `input` on a background thread.
///
/// The channel disconnects when the input hits end-of-file or fails.
pub fn spawn_line_reader<R>(input: R) -> Receiver<String>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in input.lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Relay between queued input lines and a connected socket.
///
/// The underlying stream must have a read timeout set; otherwise input is
/// only forwarded when the server sends something.  Returns once the
/// connection is closed, or once the close grace period after `exit` or
/// end of input runs out.
pub fn relay<S, W>(socket: &mut WebSocket<S>, lines: &Receiver<String>, out: &mut W) -> Result<()>
where
    S: io::Read + io::Write,
    W: Write,
{
    let mut closing_since: Option<Instant> = None;

    loop {
        if closing_since.is_none() {
            closing_since = forward_input(socket, lines)?;
        }

        if let Some(since) = closing_since {
            if since.elapsed() >= CLOSE_GRACE {
                tracing::debug!("server did not close in time, leaving");
                return Ok(());
            }
        }

        match socket.read() {
            Ok(Message::Text(text)) => {
                out.write_all(text.as_str().as_bytes())?;
                out.flush()?;
            }
            Ok(Message::Binary(data)) => {
                out.write_all(&data)?;
                out.flush()?;
            }
            Ok(Message::Close(frame)) => {
                tracing::debug!(?frame, "server closed the shell");
            }
            Ok(_) => {}
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                return Ok(());
            }
            Err(tungstenite::Error::Io(e))
                if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
            Err(e) if closing_since.is_some() => {
                tracing::debug!(error = %e, "error while closing shell");
                return Ok(());
            }
            Err(e) => return Err(ws_error(e)),
        }
    }
}

/// Send every queued line.  Returns the moment closing began, if it did.
fn forward_input<S>(socket: &mut WebSocket<S>, lines: &Receiver<String>) -> Result<Option<Instant>>
where
    S: io::Read + io::Write,
{
    loop {
        match lines.try_recv() {
            Ok(line) => {
                let command = line.trim();
                socket
                    .send(Message::text(command.to_string()))
                    .map_err(ws_error)?;
                if command == EXIT_COMMAND {
                    return Ok(Some(Instant::now()));
                }
            }
            Err(TryRecvError::Empty) => return Ok(None),
            Err(TryRecvError::Disconnected) => {
                tracing::debug!("input closed, closing shell");
                socket.close(None).map_err(ws_error)?;
                return Ok(Some(Instant::now()));
            }
        }
    }
}

fn ws_error(e: tungstenite::Error) -> NucError {
    match e {
        tungstenite::Error::Io(io_err) => NucError::Io(io_err),
        other => NucError::WebSocket(other.to_string()),
    }
}
