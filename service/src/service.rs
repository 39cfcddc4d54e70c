use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::dispatch::{GestureDispatcher, GestureOutcome};
use crate::gesture::GestureDescription;
use crate::receiver::{Broadcast, GestureRequest};

type AppState = Arc<GestureAdapter>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to bind {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

// Every operation is fire and forget; the outcome is only ever visible in
// the log.
pub struct GestureAdapter {
    dispatcher: Arc<dyn GestureDispatcher>,
}

impl GestureAdapter {
    pub fn new(dispatcher: Arc<dyn GestureDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn handle(&self, request: GestureRequest) {
        match request {
            GestureRequest::Click(click) => {
                self.perform_click(click.x, click.y, click.duration_ms)
            }
            GestureRequest::Swipe(swipe) => self.perform_swipe(
                swipe.start_x,
                swipe.start_y,
                swipe.end_x,
                swipe.end_y,
                swipe.duration_ms,
            ),
        }
    }

    pub fn perform_click(&self, x: f32, y: f32, duration_ms: i64) {
        info!(x, y, duration_ms, "performing click");
        self.submit(GestureDescription::tap(x, y, duration_ms), "click");
    }

    pub fn perform_swipe(
        &self,
        start_x: f32,
        start_y: f32,
        end_x: f32,
        end_y: f32,
        duration_ms: i64,
    ) {
        info!(start_x, start_y, end_x, end_y, duration_ms, "performing swipe");
        self.submit(
            GestureDescription::line(start_x, start_y, end_x, end_y, duration_ms),
            "swipe",
        );
    }

    fn submit(&self, gesture: GestureDescription, kind: &'static str) {
        match self.dispatcher.dispatch(gesture) {
            Ok(done) => {
                tokio::spawn(async move {
                    match done.await {
                        Ok(GestureOutcome::Completed) => info!("{kind} gesture completed"),
                        Ok(GestureOutcome::Cancelled) => warn!("{kind} gesture cancelled"),
                        Err(_) => warn!("{kind} gesture result dropped"),
                    }
                });
            }
            Err(error) => warn!(%error, "failed to submit {kind} gesture"),
        }
    }
}

// The exclusive bind on the loopback port is what keeps the service
// single-instance; shutdown (or drop) releases the intake registration.
pub struct GestureService {
    addr: SocketAddr,
    adapter: AppState,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl GestureService {
    pub async fn bind(addr: SocketAddr, adapter: GestureAdapter) -> Result<Self, ServiceError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServiceError::Bind { addr, source })?;
        let addr = listener
            .local_addr()
            .map_err(|source| ServiceError::Bind { addr, source })?;

        let adapter = Arc::new(adapter);
        let app = router(adapter.clone());
        let (shutdown, signal) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = signal.await;
            });
            if let Err(error) = serve.await {
                warn!(%error, "gesture service stopped serving");
            }
        });

        info!(%addr, "gesture service bound");
        Ok(Self {
            addr,
            adapter,
            shutdown: Some(shutdown),
            task: Some(task),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn adapter(&self) -> &Arc<GestureAdapter> {
        &self.adapter
    }

    pub async fn shutdown(mut self) {
        if let Some(trigger) = self.shutdown.take() {
            let _ = trigger.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        info!("gesture service shut down");
    }
}

impl Drop for GestureService {
    fn drop(&mut self) {
        // Abnormal teardown still releases the listener.
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/broadcast", post(broadcast))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn broadcast(State(state): State<AppState>, Json(message): Json<Broadcast>) -> StatusCode {
    match GestureRequest::from_broadcast(&message) {
        Some(request) => state.handle(request),
        None => debug!(action = %message.action, "ignoring unrecognized broadcast action"),
    }
    // Nothing is reported back to the sender, even for dropped actions.
    StatusCode::OK
}
