//! HTTP front end.
//!
//! tiny_http accepts on a blocking thread and forwards each request over a
//! channel; every request is then answered from its own tokio task, and
//! shutdown waits for the tasks still answering.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use serde_json::Value;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::api::ReleaseApi;

pub const HEALTH_PATH: &str = "/health";
pub const ALL_SLOTS_PATH: &str = "/device/all";
pub const LATEST_RELEASE_PATH: &str = "/device/latestRelease";

const REQUEST_QUEUE: usize = 64;

/// Status code and JSON body of a response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub body: Value,
}

impl HttpReply {
    fn json<T: Serialize>(status: u16, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self { status, body },
            Err(err) => {
                warn!("failed to serialize response body: {err}");
                Self::error(500, "Internal server error")
            }
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: serde_json::json!({ "error": message }),
        }
    }
}

/// Answer one request. The query string plays no part in routing.
pub async fn route(api: &ReleaseApi, method: &Method, url: &str) -> HttpReply {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let known = matches!(path, HEALTH_PATH | ALL_SLOTS_PATH | LATEST_RELEASE_PATH);
    if !known {
        return HttpReply::error(404, "Not found");
    }
    if *method != Method::Get {
        return HttpReply::error(405, "Method not allowed");
    }

    match path {
        HEALTH_PATH => HttpReply::json(200, &serde_json::json!({ "status": "ok" })),
        ALL_SLOTS_PATH => match api.all_slots().await {
            Ok(slots) => HttpReply::json(200, &slots),
            Err(err) => HttpReply::error(err.status_code(), err.public_message()),
        },
        _ => match api.latest_release().await {
            Ok(slot) => HttpReply::json(200, &slot),
            Err(err) => HttpReply::error(err.status_code(), err.public_message()),
        },
    }
}

pub fn bind(addr: SocketAddr) -> io::Result<Server> {
    Server::http(addr).map_err(io::Error::other)
}

/// Address a bound server actually listens on.
pub fn local_addr(server: &Server) -> Option<SocketAddr> {
    server.server_addr().to_ip()
}

/// Serve requests until `shutdown` flips to `true` or its sender goes away.
pub async fn serve(
    api: ReleaseApi,
    server: Server,
    mut shutdown: watch::Receiver<bool>,
) -> io::Result<()> {
    let server = Arc::new(server);
    let stopping = Arc::new(AtomicBool::new(false));
    let (tx, mut rx) = mpsc::channel::<Request>(REQUEST_QUEUE);

    let accept_server = Arc::clone(&server);
    let accept_stopping = Arc::clone(&stopping);
    let acceptor = tokio::task::spawn_blocking(move || {
        loop {
            match accept_server.recv() {
                Ok(request) => {
                    if tx.blocking_send(request).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    if accept_stopping.load(Ordering::SeqCst) {
                        break;
                    }
                    warn!("accept error: {err}");
                }
            }
        }
    });

    if let Some(addr) = local_addr(&server) {
        info!("release service listening on http://{addr}");
    }

    let mut in_flight = JoinSet::new();
    while !*shutdown.borrow() {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            request = rx.recv() => match request {
                Some(request) => {
                    let api = api.clone();
                    in_flight.spawn(async move { handle(&api, request).await });
                }
                None => break,
            },
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                if let Err(err) = joined {
                    warn!("request task failed: {err}");
                }
            }
        }
    }

    stopping.store(true, Ordering::SeqCst);
    drop(rx);
    server.unblock();
    acceptor.await.map_err(io::Error::other)?;
    if !in_flight.is_empty() {
        debug!(pending = in_flight.len(), "waiting for in-flight requests");
    }
    while let Some(joined) = in_flight.join_next().await {
        if let Err(err) = joined {
            warn!("request task failed: {err}");
        }
    }
    info!("release service stopped");
    Ok(())
}

async fn handle(api: &ReleaseApi, request: Request) {
    let method = request.method().clone();
    let url = request.url().to_string();
    let reply = route(api, &method, &url).await;
    debug!(%method, url = %url, status = reply.status, "request served");

    let mut response =
        Response::from_string(reply.body.to_string()).with_status_code(StatusCode(reply.status));
    for (name, value) in [
        ("Content-Type", "application/json"),
        ("Access-Control-Allow-Origin", "*"),
    ] {
        if let Ok(header) = Header::from_bytes(name, value) {
            response.add_header(header);
        }
    }
    if let Err(err) = request.respond(response) {
        warn!("failed to send response: {err}");
    }
}
