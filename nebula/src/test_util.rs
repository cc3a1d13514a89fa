// Copyright (c) 2020-present, UMD Database Group.
//
// This program is free software: you can use, redistribute, and/or modify
// it under the terms of the GNU Affero General Public License, version 3
// or later ("AGPL"), as published by the Free Software Foundation.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

//! Utils for testing against a coordinator without running one.

use crate::error::Result;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// A request received by the [`MockCoordinator`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method, e.g. `POST`.
    pub method: String,
    /// Path including the query string.
    pub target: String,
    /// Request body.
    pub body:   String,
}

#[derive(Debug, Clone)]
struct Route {
    method: String,
    path:   String,
    status: u16,
    body:   Value,
}

#[derive(Debug, Default)]
struct State {
    routes:   Vec<Route>,
    requests: Vec<RecordedRequest>,
}

/// A minimal HTTP/1.1 server on `127.0.0.1` answering canned JSON replies.
///
/// Several replies registered for the same route are served in order; the
/// last one is repeated. Unknown routes get a 404.
pub struct MockCoordinator {
    port:   u16,
    state:  Arc<Mutex<State>>,
    handle: JoinHandle<()>,
}

impl MockCoordinator {
    /// Binds an ephemeral port and starts serving.
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        let state = Arc::new(Mutex::new(State::default()));
        let shared = state.clone();
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let state = shared.clone();
                tokio::spawn(async move {
                    if let Err(e) = serve(stream, state).await {
                        log::debug!("mock coordinator: {}", e);
                    }
                });
            }
        });
        Ok(MockCoordinator {
            port,
            state,
            handle,
        })
    }

    /// The port the mock listens on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Registers a reply for `method path`.
    pub async fn respond(&self, method: &str, path: &str, status: u16, body: Value) {
        self.state.lock().await.routes.push(Route {
            method: method.to_string(),
            path:   path.to_string(),
            status,
            body,
        });
    }

    /// Returns the requests received so far.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().await.requests.clone()
    }
}

impl Drop for MockCoordinator {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(stream: TcpStream, state: Arc<Mutex<State>>) -> Result<()> {
    let (read, mut write) = stream.into_split();
    let mut reader = BufReader::new(read);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    let mut body = vec![0; content_length];
    reader.read_exact(&mut body).await?;

    let path = target.split('?').next().unwrap_or_default().to_string();
    let (status, reply) = {
        let mut state = state.lock().await;
        state.requests.push(RecordedRequest {
            method: method.clone(),
            target: target.clone(),
            body:   String::from_utf8_lossy(&body).into_owned(),
        });
        let matching: Vec<usize> = state
            .routes
            .iter()
            .enumerate()
            .filter(|(_, r)| r.method == method && r.path == path)
            .map(|(i, _)| i)
            .collect();
        match matching.as_slice() {
            [] => (404, json!({ "message": format!("no route for {} {}", method, path) })),
            [only] => {
                let route = &state.routes[*only];
                (route.status, route.body.clone())
            }
            [first, ..] => {
                let route = state.routes.remove(*first);
                (route.status, route.body)
            }
        }
    };

    let payload = reply.to_string();
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        if status < 400 { "OK" } else { "Error" },
        payload.len(),
        payload
    );
    write.write_all(response.as_bytes()).await?;
    write.shutdown().await?;
    Ok(())
}
