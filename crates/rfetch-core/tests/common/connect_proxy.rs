//! HTTP proxy that accepts every CONNECT with `200 Connection established`.
//!
//! What happens inside the tunnel is scripted: either the proxy hangs up
//! (the client's TLS handshake then fails), or it plays a plain-HTTP origin
//! that answers with a fixed status.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub enum Tunnel {
    /// Close the connection right after the CONNECT reply.
    Close,
    /// Answer the tunneled request with this status and a short body.
    Respond(u16),
}

pub struct ConnectProxy {
    pub url: String,
    connects: Arc<AtomicUsize>,
}

impl ConnectProxy {
    /// Number of CONNECT requests accepted so far.
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

pub fn start(tunnel: Tunnel) -> ConnectProxy {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let connects = Arc::new(AtomicUsize::new(0));
    let connects_srv = Arc::clone(&connects);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let connects = Arc::clone(&connects_srv);
            thread::spawn(move || handle(stream, tunnel, &connects));
        }
    });
    ConnectProxy {
        url: format!("http://127.0.0.1:{}", port),
        connects,
    }
}

fn handle(mut stream: TcpStream, tunnel: Tunnel, connects: &AtomicUsize) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let Some(head) = read_head(&mut stream) else {
        return;
    };
    if !head.starts_with("CONNECT ") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }
    connects.fetch_add(1, Ordering::SeqCst);
    if stream
        .write_all(b"HTTP/1.1 200 Connection established\r\n\r\n")
        .is_err()
    {
        return;
    }
    match tunnel {
        Tunnel::Close => {}
        Tunnel::Respond(status) => {
            if read_head(&mut stream).is_none() {
                return;
            }
            let body = format!("origin {}\n", status);
            let response = format!(
                "HTTP/1.1 {} Origin\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
    }
}

/// Read up to and including the blank line that ends a request head.
fn read_head(stream: &mut TcpStream) -> Option<String> {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        match stream.read(&mut byte) {
            Ok(1) => head.push(byte[0]),
            _ => return None,
        }
        if head.len() > 64 * 1024 {
            return None;
        }
    }
    String::from_utf8(head).ok()
}
