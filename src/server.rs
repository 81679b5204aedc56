//! HTTP server and graceful shutdown.
//!
//! The server owns the sockets; the [`Router`] owns everything else. Each
//! request read off a connection is turned into a [`Request`], handed to
//! [`Router::dispatch`], and the single [`Response`] it returns is written
//! back.
//!
//! # Graceful shutdown
//!
//! On **SIGTERM** or **Ctrl-C** (or when the future given to
//! [`Server::serve_with_shutdown`] resolves) the server:
//! 1. Stops accepting new connections.
//! 2. Tells every open connection to finish: requests already in flight
//!    are answered, idle keep-alive connections are closed.
//! 3. Returns from `serve` once every connection is gone, which lets `main`
//!    exit cleanly.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::error::Error;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// Environment variable read by [`Server::from_env`].
pub const ADDR_ENV: &str = "ABSOL_ADDR";

/// Address used by [`Server::from_env`] when [`ADDR_ENV`] is unset.
pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";

enum Bind {
    Addr(SocketAddr),
    Listener(TcpListener),
}

/// The HTTP server.
pub struct Server {
    bind: Bind,
}

impl Server {
    /// Configures the server to bind to `addr` when it starts serving.
    ///
    /// ```rust
    /// use absol::Server;
    ///
    /// assert!(Server::bind("0.0.0.0:3000").is_ok());
    /// assert!(Server::bind("not an address").is_err());
    /// ```
    pub fn bind(addr: &str) -> Result<Self, Error> {
        let parsed = addr.parse().map_err(|source| Error::InvalidAddress {
            addr: addr.to_owned(),
            source,
        })?;
        Ok(Self { bind: Bind::Addr(parsed) })
    }

    /// Like [`bind`](Server::bind), with the address taken from `ABSOL_ADDR`
    /// (default `0.0.0.0:3000`).
    pub fn from_env() -> Result<Self, Error> {
        Self::bind(&addr_from(std::env::var(ADDR_ENV).ok()))
    }

    /// Serves on a listener that is already bound. Useful with port `0`.
    pub fn from_listener(listener: TcpListener) -> Self {
        Self { bind: Bind::Listener(listener) }
    }

    /// Accepts connections and dispatches them through `router` until SIGTERM
    /// or Ctrl-C, then drains in-flight connections and returns.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Like [`serve`](Server::serve), but stops when `signal` resolves instead
    /// of on OS signals.
    pub async fn serve_with_shutdown<F>(self, router: Router, signal: F) -> Result<(), Error>
    where
        F: Future<Output = ()> + Send,
    {
        let listener = match self.bind {
            Bind::Addr(addr) => TcpListener::bind(addr).await?,
            Bind::Listener(listener) => listener,
        };
        let addr = listener.local_addr()?;

        // Shared across connection tasks; registration is over by now.
        let router = Arc::new(router);

        info!(%addr, "absol listening");

        let builder = ConnBuilder::new(TokioExecutor::new());
        // Every connection is watched so shutdown can close idle keep-alive ones.
        let graceful = GracefulShutdown::new();
        let mut tasks = tokio::task::JoinSet::new();

        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a signal stops accepting immediately,
                // even if more connections are queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let io = TokioIo::new(stream);

                    // Called once per request on the connection.
                    let svc = service_fn(move |req| {
                        let router = Arc::clone(&router);
                        async move { handle(&router, req).await }
                    });

                    let conn = graceful.watch(builder.serve_connection(io, svc).into_owned());

                    tasks.spawn(async move {
                        if let Err(e) = conn.await {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        graceful.shutdown().await;
        while tasks.join_next().await.is_some() {}

        info!("absol stopped");
        Ok(())
    }
}

fn addr_from(var: Option<String>) -> String {
    var.filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ADDR.to_owned())
}

// ── Request handling ──────────────────────────────────────────────────────────

/// Converts one hyper request, routes it, and converts the response back.
///
/// Never fails towards hyper: an unreadable body becomes a `400`.
async fn handle(
    router: &Router,
    req: hyper::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes().to_vec(),
        Err(e) => {
            warn!(method = %parts.method, path = %parts.uri.path(), "failed to read request body: {e}");
            return Ok(Response::status(StatusCode::BAD_REQUEST).into_inner());
        }
    };

    let headers = parts.headers.iter()
        .filter_map(|(name, value)| {
            value.to_str().ok().map(|v| (name.as_str().to_owned(), v.to_owned()))
        })
        .collect();

    let request = Request::from_parts(
        parts.method.as_str().to_owned(),
        parts.uri.path().to_owned(),
        headers,
        body,
    );

    Ok(router.dispatch(request).await.into_inner())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C only on non-Unix).
///
/// If a handler cannot be installed the failure is logged and that arm never
/// fires; the server keeps running rather than exiting at startup.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_address_falls_back_to_default() {
        assert_eq!(addr_from(None), DEFAULT_ADDR);
        assert_eq!(addr_from(Some("  ".to_owned())), DEFAULT_ADDR);
        assert_eq!(addr_from(Some("127.0.0.1:8080".to_owned())), "127.0.0.1:8080");
    }

    #[test]
    fn bind_rejects_malformed_addresses() {
        let err = Server::bind("localhost").err().unwrap();
        assert!(matches!(err, Error::InvalidAddress { ref addr, .. } if addr == "localhost"));
    }

    #[test]
    fn from_env_reports_a_malformed_variable() {
        // SAFETY: no other test in this binary reads or writes ABSOL_ADDR.
        unsafe { std::env::set_var(ADDR_ENV, "not-an-address") };
        let res = Server::from_env();
        unsafe { std::env::remove_var(ADDR_ENV) };

        let err = res.err().unwrap();
        assert!(matches!(err, Error::InvalidAddress { ref addr, .. } if addr == "not-an-address"));
    }
}
