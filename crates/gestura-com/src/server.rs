use crate::framing::{self, BOUNDARY};
use crate::session::{self, SessionStore};
use crate::{ComError, PipelineFactory};
use gestura_camera::{CameraProbe, CameraSelection, DEFAULT_MAX_CAMERAS, enumerate_cameras};
use gestura_core::SharedPrediction;
use http::{HeaderValue, Method, Request, Response, StatusCode, header};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Frames buffered between a pipeline and its connection.
const FRAME_BUFFER: usize = 2;

#[derive(Serialize)]
struct PredictionBody<'a> {
    prediction: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    GetCameras,
    SetCamera,
    GetPrediction,
    VideoFeed,
}

impl Route {
    fn from_path(path: &str) -> Option<Self> {
        match path {
            "/get_cameras" => Some(Route::GetCameras),
            "/set_camera" => Some(Route::SetCamera),
            "/get_prediction" => Some(Route::GetPrediction),
            "/video_feed" => Some(Route::VideoFeed),
            _ => None,
        }
    }

    fn method(&self) -> Method {
        match self {
            Route::SetCamera => Method::POST,
            _ => Method::GET,
        }
    }

    fn allow(&self) -> &'static str {
        match self {
            Route::SetCamera => "POST",
            _ => "GET",
        }
    }
}

/// Request handling state shared by all connections.
pub struct GestureService<F, P> {
    factory: Arc<F>,
    probe: Arc<P>,
    sessions: SessionStore,
    prediction: SharedPrediction,
    max_cameras: u32,
}

impl<F, P> GestureService<F, P>
where
    F: PipelineFactory,
    P: CameraProbe + Send + Sync + 'static,
{
    pub fn new(factory: F, probe: P, prediction: SharedPrediction) -> Self {
        Self {
            factory: Arc::new(factory),
            probe: Arc::new(probe),
            sessions: SessionStore::new(),
            prediction,
            max_cameras: DEFAULT_MAX_CAMERAS,
        }
    }

    /// Number of device indices `/get_cameras` probes.
    pub fn with_max_cameras(mut self, max_cameras: u32) -> Self {
        self.max_cameras = max_cameras;
        self
    }

    /// Number of client sessions whose camera choice is remembered.
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.sessions = SessionStore::with_capacity(max_sessions);
        self
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn prediction(&self) -> &SharedPrediction {
        &self.prediction
    }

    async fn serve(&self, stream: TcpStream, peer: SocketAddr) -> Result<(), ComError> {
        let (read_half, mut writer) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        let request = match framing::read_request(&mut reader).await {
            Ok(request) => request,
            Err(ComError::ConnectionClosed) => return Ok(()),
            Err(e) => {
                log::warn!("{}: rejecting request: {}", peer, e);
                let status = match e {
                    ComError::RequestTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
                    _ => StatusCode::BAD_REQUEST,
                };
                let response = text_response(status, &e.to_string(), None)?;
                return framing::write_response(&mut writer, &response).await;
            }
        };
        log::debug!("{}: {} {}", peer, request.method(), request.uri());

        let (session, issued) = match session::session_from_headers(request.headers()) {
            Some(id) => (id, None),
            None => {
                let id = session::new_session_id();
                (id.clone(), Some(id))
            }
        };
        let cookie = issued.as_deref();

        let Some(route) = Route::from_path(request.uri().path()) else {
            let response = text_response(StatusCode::NOT_FOUND, "Not Found", cookie)?;
            return framing::write_response(&mut writer, &response).await;
        };
        if *request.method() != route.method() {
            let mut response =
                text_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed", cookie)?;
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(route.allow()));
            return framing::write_response(&mut writer, &response).await;
        }

        match route {
            Route::GetCameras => {
                let response = self.get_cameras(cookie).await?;
                framing::write_response(&mut writer, &response).await
            }
            Route::SetCamera => {
                let response = self.set_camera(&request, &session, cookie).await?;
                framing::write_response(&mut writer, &response).await
            }
            Route::GetPrediction => {
                let body = PredictionBody {
                    prediction: self.prediction.label(),
                };
                let response = json_response(&body, cookie)?;
                framing::write_response(&mut writer, &response).await
            }
            Route::VideoFeed => {
                let selection = self.sessions.selection(&session).await;
                self.video_feed(&mut writer, selection, cookie, peer).await
            }
        }
    }

    async fn get_cameras(&self, cookie: Option<&str>) -> Result<Response<Vec<u8>>, ComError> {
        let probe = self.probe.clone();
        let max_cameras = self.max_cameras;
        let cameras = tokio::task::spawn_blocking(move || enumerate_cameras(&*probe, max_cameras))
            .await
            .map_err(|e| ComError::Io(std::io::Error::other(e)))?;
        log::info!("available cameras: {:?}", cameras);
        json_response(&cameras, cookie)
    }

    async fn set_camera(
        &self,
        request: &Request<Vec<u8>>,
        session: &str,
        cookie: Option<&str>,
    ) -> Result<Response<Vec<u8>>, ComError> {
        let parsed = framing::form_value(request.body(), "camera_id")
            .ok_or_else(|| "missing camera_id".to_string())
            .and_then(|value| {
                value
                    .parse::<CameraSelection>()
                    .map_err(|e| e.to_string())
            });
        match parsed {
            Ok(selection) => {
                self.sessions.set_selection(session, selection).await;
                log::info!("session selected {}", selection);
                text_response(StatusCode::OK, "Camera ID set successfully", cookie)
            }
            Err(reason) => {
                log::warn!("rejected camera selection: {}", reason);
                text_response(StatusCode::BAD_REQUEST, &reason, cookie)
            }
        }
    }

    async fn video_feed(
        &self,
        writer: &mut OwnedWriteHalf,
        selection: CameraSelection,
        cookie: Option<&str>,
        peer: SocketAddr,
    ) -> Result<(), ComError> {
        let factory = self.factory.clone();
        let prediction = self.prediction.clone();
        let opened = tokio::task::spawn_blocking(move || factory.open(selection, prediction))
            .await
            .map_err(|e| ComError::Io(std::io::Error::other(e)))?;

        let pipeline = match opened {
            Ok(pipeline) => pipeline,
            Err(e) => {
                log::warn!("{}: cannot open {}: {}", peer, selection, e);
                let response = text_response(
                    StatusCode::SERVICE_UNAVAILABLE,
                    &format!("{} unavailable: {}", selection, e),
                    cookie,
                )?;
                return framing::write_response(writer, &response).await;
            }
        };

        let mut head = Response::builder()
            .status(StatusCode::OK)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/x-mixed-replace; boundary={BOUNDARY}"),
            )
            .header(header::CACHE_CONTROL, "no-cache")
            .header(header::CONNECTION, "close");
        if let Some(id) = cookie {
            head = head.header(header::SET_COOKIE, session::session_cookie(id));
        }
        framing::write_head(writer, &head.body(())?).await?;
        log::info!("{}: streaming {}", peer, selection);

        let (tx, mut rx) = mpsc::channel(FRAME_BUFFER);
        let task = tokio::spawn(pipeline.run(tx));

        let mut sent = 0u64;
        while let Some(jpeg) = rx.recv().await {
            let part = framing::multipart_part(&jpeg);
            if let Err(e) = writer.write_all(&part).await {
                log::info!("{}: client went away after {} frames: {}", peer, sent, e);
                break;
            }
            sent += 1;
        }
        // closing the receiver stops the pipeline within one frame
        drop(rx);
        if let Err(e) = task.await {
            log::error!("{}: pipeline task failed: {}", peer, e);
        }
        writer.shutdown().await.ok();
        Ok(())
    }
}

fn text_response(
    status: StatusCode,
    body: &str,
    cookie: Option<&str>,
) -> Result<Response<Vec<u8>>, ComError> {
    response(status, "text/plain; charset=utf-8", body.as_bytes().to_vec(), cookie)
}

fn json_response<T: Serialize + ?Sized>(
    value: &T,
    cookie: Option<&str>,
) -> Result<Response<Vec<u8>>, ComError> {
    let body = serde_json::to_vec(value)
        .map_err(|e| ComError::Io(std::io::Error::other(e)))?;
    response(StatusCode::OK, "application/json", body, cookie)
}

fn response(
    status: StatusCode,
    content_type: &str,
    body: Vec<u8>,
    cookie: Option<&str>,
) -> Result<Response<Vec<u8>>, ComError> {
    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, body.len())
        .header(header::CONNECTION, "close");
    if let Some(id) = cookie {
        builder = builder.header(header::SET_COOKIE, session::session_cookie(id));
    }
    Ok(builder.body(body)?)
}

/// HTTP server. Stops accepting connections when dropped; sessions already
/// streaming run to completion.
pub struct Server<F, P> {
    service: Arc<GestureService<F, P>>,
    accept_task: JoinHandle<()>,
    local_addr: SocketAddr,
}

impl<F, P> Server<F, P>
where
    F: PipelineFactory,
    P: CameraProbe + Send + Sync + 'static,
{
    /// Bind a TCP listener and start accepting connections, one task each.
    pub async fn bind(
        addr: impl ToSocketAddrs,
        service: GestureService<F, P>,
    ) -> Result<Self, ComError> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let service = Arc::new(service);
        let accept_service = service.clone();

        let accept_task = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, peer)) => {
                        let service = accept_service.clone();
                        tokio::spawn(async move {
                            if let Err(e) = service.serve(stream, peer).await {
                                log::warn!("{}: connection error: {}", peer, e);
                            }
                        });
                    }
                    Err(e) => {
                        log::warn!("accept error: {}", e);
                        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                    }
                }
            }
        });

        log::info!("listening on {}", local_addr);
        Ok(Self {
            service,
            accept_task,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn service(&self) -> &GestureService<F, P> {
        &self.service
    }
}

impl<F, P> Drop for Server<F, P> {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}
