//! HTTP/1 server loop.
//!
//! Request bodies are collected into [`Bytes`] before dispatch so the same
//! [`AppService`] handles network requests and synthetic test requests.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use http::{Request, Response};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::app::AppService;
use crate::error::Error;
use crate::response::{BoxBody, IntoResponse};

/// Largest request body accepted, in bytes.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Pause after a failed `accept` (e.g. `EMFILE`) before trying again.
pub const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Resolves a `host:port` string, including hostnames such as
/// `localhost` and bracketed IPv6 literals, to the first socket address.
pub async fn resolve_addr(addr: &str) -> std::io::Result<SocketAddr> {
    let invalid = |reason: String| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("invalid address '{}': {}", addr, reason),
        )
    };

    tokio::net::lookup_host(addr)
        .await
        .map_err(|e| invalid(e.to_string()))?
        .next()
        .ok_or_else(|| invalid("no addresses found".to_string()))
}

/// Serves `service` on `addr` until Ctrl-C is received.
pub async fn serve(service: AppService, addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_with_shutdown(service, listener, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
        }
    })
    .await
}

/// Serves `service` on an already bound listener until `shutdown` resolves,
/// then lets open connections finish their in-flight requests.
pub async fn serve_with_shutdown(
    service: AppService,
    listener: TcpListener,
    shutdown: impl Future<Output = ()>,
) -> std::io::Result<()> {
    info!(addr = %listener.local_addr()?, "pomodoro listening");

    let (stop_tx, stop_rx) = watch::channel(false);
    let mut connections = JoinSet::new();
    tokio::pin!(shutdown);

    loop {
        while connections.try_join_next().is_some() {}

        tokio::select! {
            result = listener.accept() => {
                let (stream, peer) = match result {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        accept_failed(&e).await;
                        continue;
                    }
                };

                let service = service.clone();
                let mut stop_rx = stop_rx.clone();

                connections.spawn(async move {
                    let svc = service_fn(move |req: Request<Incoming>| {
                        let service = service.clone();
                        async move { Ok::<_, Infallible>(dispatch(&service, req).await) }
                    });

                    let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), svc);
                    tokio::pin!(conn);

                    tokio::select! {
                        result = conn.as_mut() => {
                            if let Err(e) = result {
                                debug!(error = %e, %peer, "connection closed with error");
                            }
                        }
                        _ = stop_rx.changed() => {
                            conn.as_mut().graceful_shutdown();
                            if let Err(e) = conn.await {
                                debug!(error = %e, %peer, "connection closed during shutdown");
                            }
                        }
                    }
                });
            }
            _ = &mut shutdown => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    drop(listener);
    let _ = stop_tx.send(true);
    while connections.join_next().await.is_some() {}

    info!("server stopped");
    Ok(())
}

async fn accept_failed(error: &std::io::Error) {
    warn!(error = %error, "failed to accept connection");
    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
}

async fn dispatch(service: &AppService, req: Request<Incoming>) -> Response<BoxBody> {
    let (parts, body) = req.into_parts();

    match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => {
            let body: Bytes = collected.to_bytes();
            service.call(Request::from_parts(parts, body)).await
        }
        Err(e) => reject_body(e),
    }
}

/// Maps a body read failure to `413` when the limit was hit, `400` otherwise.
fn reject_body(error: BoxError) -> Response<BoxBody> {
    warn!(error = %error, "failed to read request body");

    if error.downcast_ref::<LengthLimitError>().is_some() {
        Error::payload_too_large(format!(
            "request body exceeds {} bytes",
            MAX_BODY_BYTES
        ))
        .into_response()
    } else {
        Error::bad_request("request body could not be read").into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use crate::router::Router;
    use http_body_util::Full;
    use hyper_util::rt::TokioExecutor;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_serves_over_tcp_and_stops() {
        let service = App::new()
            .router(Router::new().get("/", |_, _, _| async { "Pomodoro over TCP" }))
            .into_service();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let server = tokio::spawn(serve_with_shutdown(service, listener, async move {
            let _ = stop_rx.await;
        }));

        let client = hyper_util::client::legacy::Client::builder(TokioExecutor::new())
            .build_http::<Full<Bytes>>();
        let response = client
            .get(format!("http://{}/", addr).parse().unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), http::StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"Pomodoro over TCP");

        drop(client);
        stop_tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_resolve_addr_accepts_hostnames_and_ipv6() {
        let addr = resolve_addr("[::1]:3000").await.unwrap();
        assert_eq!(addr, "[::1]:3000".parse::<SocketAddr>().unwrap());

        let addr = resolve_addr("localhost:3000").await.unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 3000);
    }

    #[tokio::test]
    async fn test_resolve_addr_rejects_garbage() {
        let err = resolve_addr("pomodoro").await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
        assert!(err.to_string().starts_with("invalid address 'pomodoro'"));
    }

    #[tokio::test]
    async fn test_oversized_body_is_payload_too_large() {
        let error = Limited::new(Full::new(Bytes::from(vec![0u8; 16])), 4)
            .collect()
            .await
            .unwrap_err();

        let response = reject_body(error);
        assert_eq!(response.status(), http::StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_broken_body_is_bad_request() {
        let response = reject_body("connection reset by peer".into());
        assert_eq!(response.status(), http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test(start_paused = true)]
    async fn test_accept_failure_backs_off() {
        let started = tokio::time::Instant::now();
        accept_failed(&std::io::Error::other("too many open files")).await;
        assert!(started.elapsed() >= ACCEPT_RETRY_DELAY);
    }
}
