//! JSON control surface for an external renderer.
//!
//! The simulation ticks on a background task in real time; every tick the
//! latest [`WorldSnapshot`] is pushed to `/api/events` subscribers. Pointer
//! events arrive as pixel coordinates and go through the same mutators a
//! local front end would call.

use std::{
    convert::Infallible,
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use anyhow::{anyhow, Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::broadcast};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use tracing::{error, info, warn};

use crate::{
    engine::Simulation,
    scenario::Scenario,
    terrain::CellState,
    world::WorldSnapshot,
};

/// Shortest wall-clock pause between two ticks.
const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);
/// Longest one, matching the largest time step a scenario accepts.
const MAX_TICK_INTERVAL: Duration = Duration::from_secs(3_600);

pub struct WebServerConfig {
    pub scenario: Scenario,
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
struct AppState {
    simulation: Arc<Mutex<Simulation>>,
    broadcaster: broadcast::Sender<String>,
}

impl AppState {
    fn lock(&self) -> Result<MutexGuard<'_, Simulation>, StatusCode> {
        self.simulation.lock().map_err(|_| {
            error!("simulation lock poisoned");
            StatusCode::INTERNAL_SERVER_ERROR
        })
    }
}

/// Pixel coordinates on the renderer's surface.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PointerEvent {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventOutcome {
    pub accepted: bool,
    pub cell: Option<(usize, usize)>,
    pub state: Option<CellState>,
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig {
        scenario,
        host,
        port,
    } = config;

    let dt = scenario.dt_seconds;
    let simulation = Simulation::new(scenario).context("Failed to set up simulation")?;
    let simulation = Arc::new(Mutex::new(simulation));
    let (tx, _) = broadcast::channel::<String>(64);

    let sim_for_loop = simulation.clone();
    let tx_for_loop = tx.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick_period(dt));
        loop {
            interval.tick().await;
            match advance(&sim_for_loop, dt) {
                Ok(payload) => {
                    // no subscribers is fine
                    let _ = tx_for_loop.send(payload);
                }
                Err(err) => {
                    error!("simulation loop stopped: {err:#}");
                    break;
                }
            }
        }
    });

    let router = router(AppState {
        simulation,
        broadcaster: tx,
    });

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid listen address {host}:{port}"))?;

    info!("ecosystem API live at http://{addr} (Ctrl+C to stop)");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/state", get(current_state))
        .route("/api/events", get(stream_events))
        .route("/api/click", post(primary_click))
        .route("/api/drag", post(drag))
        .route("/api/reset", post(reset))
        .with_state(state)
}

/// Wall-clock pause between ticks for a time step of `dt` seconds.
fn tick_period(dt: f32) -> Duration {
    Duration::try_from_secs_f32(dt)
        .unwrap_or(MAX_TICK_INTERVAL)
        .clamp(MIN_TICK_INTERVAL, MAX_TICK_INTERVAL)
}

fn advance(simulation: &Mutex<Simulation>, dt: f32) -> Result<String> {
    let mut simulation = simulation
        .lock()
        .map_err(|_| anyhow!("simulation lock poisoned"))?;
    simulation.tick(dt)?;
    Ok(serde_json::to_string(&simulation.snapshot())?)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down web API");
}

async fn current_state(State(state): State<AppState>) -> Result<Json<WorldSnapshot>, StatusCode> {
    let simulation = state.lock()?;
    Ok(Json(simulation.snapshot()))
}

async fn primary_click(
    State(state): State<AppState>,
    Json(event): Json<PointerEvent>,
) -> Result<Json<EventOutcome>, StatusCode> {
    let mut simulation = state.lock()?;
    let cell = simulation.on_primary_click(event.x, event.y);
    Ok(Json(EventOutcome {
        accepted: cell.is_some(),
        cell,
        state: None,
    }))
}

async fn drag(
    State(state): State<AppState>,
    Json(event): Json<PointerEvent>,
) -> Result<Json<EventOutcome>, StatusCode> {
    let mut simulation = state.lock()?;
    let new_state = simulation.on_drag(event.x, event.y);
    Ok(Json(EventOutcome {
        accepted: new_state.is_some(),
        cell: None,
        state: new_state,
    }))
}

async fn reset(State(state): State<AppState>) -> Result<Json<WorldSnapshot>, StatusCode> {
    let mut simulation = state.lock()?;
    simulation.on_reset().map_err(|err| {
        warn!("reset failed: {err}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(simulation.snapshot()))
}

async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.broadcaster.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(payload) => Some(Ok(Event::default().data(payload))),
        Err(_) => None,
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(2))
            .text("keep-alive"),
    )
}
