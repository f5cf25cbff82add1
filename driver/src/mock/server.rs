use crate::mock::model::{MockScenario, ReceivedRequest};
use anyhow::{Context, Result};
use bytes::Buf;
use futures_util::{StreamExt, TryStreamExt};
use snapcore::api::request::{FIELD_CONF_THRES, FIELD_IMAGE, FIELD_IOU_THRES};
use std::{
    net::SocketAddr,
    sync::{mpsc, Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use tokio::sync::oneshot;
use warp::{http::StatusCode, multipart::FormData, Filter};

/// Largest upload the mock accepts before answering 413.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;

pub fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

#[derive(Debug)]
struct MockError;

impl warp::reject::Reject for MockError {}

struct MockState {
    scenario: MockScenario,
    received: Vec<ReceivedRequest>,
}

type SharedState = Arc<RwLock<MockState>>;

/// Stand-in detection endpoint serving `POST /detect` and `GET /requests`.
///
/// The server runs on its own thread and stops when dropped.
pub struct MockServer {
    addr: SocketAddr,
    state: SharedState,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockServer {
    pub fn spawn(scenario: MockScenario, bind: SocketAddr, max_upload_bytes: u64) -> Result<Self> {
        let state = Arc::new(RwLock::new(MockState {
            scenario,
            received: Vec::new(),
        }));
        let routes = routes(state.clone(), max_upload_bytes);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let (addr_tx, addr_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    let _ = addr_tx.send(Err(anyhow::anyhow!("building mock runtime: {}", err)));
                    return;
                }
            };
            runtime.block_on(async move {
                let bound = warp::serve(routes).try_bind_with_graceful_shutdown(bind, async move {
                    let _ = shutdown_rx.await;
                });
                match bound {
                    Ok((addr, server)) => {
                        let _ = addr_tx.send(Ok(addr));
                        server.await;
                    }
                    Err(err) => {
                        let _ = addr_tx.send(Err(anyhow::anyhow!("binding {}: {}", bind, err)));
                    }
                }
            });
        });

        let addr = addr_rx
            .recv()
            .context("mock server thread exited before binding")??;
        log::info!("mock detection endpoint listening on http://{}/detect", addr);

        Ok(Self {
            addr,
            state,
            shutdown: Some(shutdown_tx),
        })
    }

    /// Binds an ephemeral localhost port.
    #[cfg(test)]
    pub fn spawn_local(scenario: MockScenario) -> Result<Self> {
        Self::spawn(
            scenario,
            SocketAddr::from(([127, 0, 0, 1], 0)),
            DEFAULT_MAX_UPLOAD_BYTES,
        )
    }

    pub fn detect_url(&self) -> String {
        format!("http://{}/detect", self.addr)
    }

    #[cfg(test)]
    pub fn set_scenario(&self, scenario: MockScenario) {
        if let Ok(mut guard) = self.state.write() {
            guard.scenario = scenario;
        }
    }

    #[cfg(test)]
    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.state
            .read()
            .map(|guard| guard.received.clone())
            .unwrap_or_default()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

fn routes(
    state: SharedState,
    max_upload_bytes: u64,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let state_filter = warp::any().map(move || state.clone());

    let detect_route = warp::path("detect")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::multipart::form().max_length(max_upload_bytes))
        .and(state_filter.clone())
        .and_then(handle_detect);

    let requests_route = warp::path("requests")
        .and(warp::get())
        .and(state_filter)
        .map(|state: SharedState| {
            let received = state
                .read()
                .map(|guard| guard.received.clone())
                .unwrap_or_default();
            warp::reply::json(&received)
        });

    detect_route.or(requests_route)
}

async fn handle_detect(
    form: FormData,
    state: SharedState,
) -> Result<warp::reply::WithStatus<warp::reply::Json>, warp::Rejection> {
    let received = read_form(form).await.map_err(|err| {
        log::warn!("mock endpoint could not read form: {}", err);
        warp::reject::custom(MockError)
    })?;

    let scenario = {
        let mut guard = state.write().map_err(|_| warp::reject::custom(MockError))?;
        guard.received.push(received);
        guard.scenario.clone()
    };

    let body = scenario.body().map_err(|err| {
        log::warn!("mock scenario failed: {}", err);
        warp::reject::custom(MockError)
    })?;
    let status =
        StatusCode::from_u16(scenario.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    log::debug!("mock endpoint answering {}", status);

    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}

/// Parts are drained one at a time; the next part is only available once the
/// previous body has been read.
async fn read_form(mut form: FormData) -> Result<ReceivedRequest, warp::Error> {
    let mut received = ReceivedRequest::default();
    while let Some(part) = form.try_next().await? {
        let name = part.name().to_string();
        let file_name = part.filename().map(str::to_string);
        let data = part_bytes(part).await?;
        match name.as_str() {
            FIELD_IMAGE => {
                received.image_bytes = data.len();
                received.image_name = file_name;
            }
            FIELD_CONF_THRES => received.conf_thres = parse_number(&data),
            FIELD_IOU_THRES => received.iou_thres = parse_number(&data),
            other => log::debug!("mock endpoint ignoring field {}", other),
        }
    }
    Ok(received)
}

async fn part_bytes(part: warp::multipart::Part) -> Result<Vec<u8>, warp::Error> {
    let mut stream = Box::pin(part.stream());
    let mut data = Vec::new();
    while let Some(buf) = stream.next().await {
        let mut buf = buf?;
        while buf.has_remaining() {
            let len = {
                let chunk = buf.chunk();
                data.extend_from_slice(chunk);
                chunk.len()
            };
            buf.advance(len);
        }
    }
    Ok(data)
}

fn parse_number(data: &[u8]) -> Option<f32> {
    std::str::from_utf8(data).ok()?.trim().parse().ok()
}
