//! Minimal scriptable worker stub over a real socket.
//!
//! The stub speaks just enough HTTP for probe tests: while responding it
//! answers every request with a fixed status code; while silent it accepts
//! the connection and closes it without a response, which the probe client
//! observes as a failed request. Arming the kill behavior makes a hit on the
//! kill path silence the stub and drop the connection unanswered, mimicking
//! a worker that dies before it can reply.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub struct WorkerStub {
    addr: SocketAddr,
    responding: Arc<AtomicBool>,
    dies_on_kill: Arc<AtomicBool>,
    status_code: Arc<AtomicU16>,
    task: JoinHandle<()>,
}

impl WorkerStub {
    /// Bind to an ephemeral port, initially silent.
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind worker stub");
        let addr = listener.local_addr().expect("stub addr");

        let responding = Arc::new(AtomicBool::new(false));
        let dies_on_kill = Arc::new(AtomicBool::new(false));
        let status_code = Arc::new(AtomicU16::new(200));

        let task = {
            let responding = Arc::clone(&responding);
            let dies_on_kill = Arc::clone(&dies_on_kill);
            let status_code = Arc::clone(&status_code);
            tokio::spawn(async move {
                loop {
                    let Ok((sock, _)) = listener.accept().await else {
                        break;
                    };
                    let responding = Arc::clone(&responding);
                    let dies_on_kill = Arc::clone(&dies_on_kill);
                    let status_code = Arc::clone(&status_code);
                    tokio::spawn(async move {
                        handle(sock, &responding, &dies_on_kill, &status_code).await;
                    });
                }
            })
        };

        Self {
            addr,
            responding,
            dies_on_kill,
            status_code,
            task,
        }
    }

    /// Bind a stub that answers every request immediately.
    pub async fn responding() -> Self {
        let stub = Self::bind().await;
        stub.set_responding(true);
        stub
    }

    #[must_use]
    pub fn netloc(&self) -> String {
        self.addr.to_string()
    }

    pub fn set_responding(&self, responding: bool) {
        self.responding.store(responding, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_responding(&self) -> bool {
        self.responding.load(Ordering::SeqCst)
    }

    /// Answer with this status code instead of 200.
    pub fn respond_with(&self, code: u16) {
        self.status_code.store(code, Ordering::SeqCst);
    }

    /// Die (go silent, drop the connection unanswered) when the kill path
    /// is hit.
    pub fn arm_kill(&self) {
        self.dies_on_kill.store(true, Ordering::SeqCst);
    }
}

impl Drop for WorkerStub {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn handle(
    mut sock: TcpStream,
    responding: &AtomicBool,
    dies_on_kill: &AtomicBool,
    status_code: &AtomicU16,
) {
    let mut buf = vec![0u8; 1024];
    let n = sock.read(&mut buf).await.unwrap_or(0);
    let request = String::from_utf8_lossy(&buf[..n]).into_owned();
    let path = request.split_whitespace().nth(1).unwrap_or("/");

    if path.starts_with("/kill") && dies_on_kill.load(Ordering::SeqCst) {
        responding.store(false, Ordering::SeqCst);
        return;
    }

    if responding.load(Ordering::SeqCst) {
        let code = status_code.load(Ordering::SeqCst);
        let response =
            format!("HTTP/1.1 {code} X\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
        let _ = sock.write_all(response.as_bytes()).await;
    }
}

/// A netloc nothing is listening on.
pub async fn refused_netloc() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind throwaway listener");
    let addr = listener.local_addr().expect("throwaway addr");
    drop(listener);
    addr.to_string()
}
