//! Relay tests against an in-process WebSocket server.

use std::io::Cursor;
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use nuc::shell::{relay, spawn_line_reader, CLOSE_GRACE, POLL_INTERVAL};
use tungstenite::{Message, WebSocket};

/// Start a one-connection server; `handler` drives the accepted socket.
fn serve<F>(handler: F) -> String
where
    F: FnOnce(WebSocket<TcpStream>) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let Ok(ws) = tungstenite::accept(stream) else {
            panic!("server handshake failed");
        };
        handler(ws);
    });

    format!("ws://{addr}/ws")
}

fn connect(url: &str) -> WebSocket<TcpStream> {
    let addr = url.trim_start_matches("ws://").trim_end_matches("/ws");
    let stream = TcpStream::connect(addr).unwrap();
    let Ok((mut ws, _)) = tungstenite::client(url, stream) else {
        panic!("client handshake failed");
    };
    ws.get_mut().set_read_timeout(Some(POLL_INTERVAL)).unwrap();
    ws
}

/// Answer every command with `ran <cmd>` and close after `exit`.
fn fake_shell(mut ws: WebSocket<TcpStream>) {
    loop {
        match ws.read() {
            Ok(Message::Text(cmd)) if cmd.as_str() == "exit" => {
                let _ = ws.close(None);
            }
            Ok(Message::Text(cmd)) => {
                let reply = format!("ran {}\n", cmd.as_str());
                if ws.send(Message::text(reply)).is_err() {
                    return;
                }
            }
            Ok(_) => {}
            Err(_) => return,
        }
    }
}

#[test]
fn exit_is_forwarded_and_server_close_ends_session() {
    let url = serve(fake_shell);
    let mut ws = connect(&url);
    let lines = spawn_line_reader(Cursor::new("  whoami  \nexit\n"));

    let mut out = Vec::new();
    relay(&mut ws, &lines, &mut out).unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "ran whoami\n");
}

#[test]
fn end_of_input_closes_the_socket() {
    let url = serve(fake_shell);
    let mut ws = connect(&url);
    let lines = spawn_line_reader(Cursor::new("pwd\n"));

    let mut out = Vec::new();
    relay(&mut ws, &lines, &mut out).unwrap();

    assert!(String::from_utf8(out).unwrap().contains("ran pwd"));
}

#[test]
fn server_hangup_ends_session_while_input_is_open() {
    let url = serve(|mut ws| {
        ws.send(Message::text("bye\n")).unwrap();
        let _ = ws.close(None);
        while ws.read().is_ok() {}
    });
    let mut ws = connect(&url);

    let (_keep_open, lines) = mpsc::channel::<String>();
    let mut out = Vec::new();
    relay(&mut ws, &lines, &mut out).unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "bye\n");
}

#[test]
fn silent_server_is_abandoned_after_grace_period() {
    let url = serve(|mut ws| {
        // Swallow everything and never close.
        while let Ok(msg) = ws.read() {
            if matches!(msg, Message::Text(ref t) if t.as_str() == "exit") {
                thread::sleep(CLOSE_GRACE * 3);
                return;
            }
        }
    });
    let mut ws = connect(&url);
    let lines = spawn_line_reader(Cursor::new("exit\n"));

    let started = Instant::now();
    let mut out = Vec::new();
    relay(&mut ws, &lines, &mut out).unwrap();

    let elapsed = started.elapsed();
    assert!(elapsed >= CLOSE_GRACE, "left after {elapsed:?}");
    assert!(elapsed < CLOSE_GRACE * 3, "waited {elapsed:?}");
    assert!(out.is_empty());
}
