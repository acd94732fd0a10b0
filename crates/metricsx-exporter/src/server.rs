//! Standalone exposition listener.
//!
//! `start` returns once the socket is bound; serving runs on a spawned task.
//! `stop` signals graceful shutdown and waits for the task up to the context
//! deadline. In-flight requests keep draining after a deadline miss.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use metricsx_core::error::{MetricsError, Result};
use metricsx_core::Context;

struct Running {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
    local_addr: SocketAddr,
}

#[derive(Default)]
pub struct ExpositionServer {
    running: Mutex<Option<Running>>,
}

impl ExpositionServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.running.lock().await.as_ref().map(|r| r.local_addr)
    }

    pub async fn start(&self, ctx: &Context, port: u16, router: Router) -> Result<SocketAddr> {
        let mut slot = self.running.lock().await;
        if slot.is_some() {
            return Err(MetricsError::Transport("metrics server already started".into()));
        }
        if ctx.is_expired() {
            return Err(MetricsError::DeadlineExceeded);
        }

        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let bind = TcpListener::bind(addr);
        let bound = match ctx.remaining() {
            Some(left) => timeout(left, bind)
                .await
                .map_err(|_| MetricsError::DeadlineExceeded)?,
            None => bind.await,
        };
        let listener =
            bound.map_err(|e| MetricsError::Transport(format!("bind {addr} failed: {e}")))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| MetricsError::Transport(format!("local addr: {e}")))?;

        let (shutdown, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let served = axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = rx.await;
                })
                .await;
            if let Err(e) = served {
                tracing::error!(error = %e, "metrics HTTP server error");
            }
        });

        *slot = Some(Running {
            shutdown,
            task,
            local_addr,
        });
        Ok(local_addr)
    }

    /// No-op when nothing is running.
    pub async fn stop(&self, ctx: &Context) -> Result<()> {
        let Some(running) = self.running.lock().await.take() else {
            return Ok(());
        };

        tracing::info!(addr = %running.local_addr, "stopping metrics HTTP server");
        let _ = running.shutdown.send(());

        let mut task = running.task;
        let joined = match ctx.remaining() {
            Some(left) => timeout(left, &mut task)
                .await
                .map_err(|_| MetricsError::DeadlineExceeded)?,
            None => task.await,
        };
        joined.map_err(|e| MetricsError::Transport(format!("metrics server task: {e}")))
    }
}
