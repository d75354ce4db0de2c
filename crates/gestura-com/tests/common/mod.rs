#![allow(dead_code)]

use gestura_base::Tensor;
use gestura_camera::{Camera, CameraError, CameraProbe, CameraSelection};
use gestura_com::{GestureService, PipelineFactory, Server};
use gestura_core::{Pipeline, PipelineConfig, PipelineError, SharedPrediction};
use gestura_infer::{
    GestureClassifier, HandLandmarkSet, HandLandmarks, HandLandmarker, InferError, Landmark,
    ProbabilityVector,
};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{Duration, timeout};

pub struct FiniteCamera {
    pub remaining: usize,
}

impl Camera for FiniteCamera {
    async fn recv(&mut self) -> Result<Option<Tensor<u8>>, CameraError> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        // pace frames like a real device
        tokio::time::sleep(Duration::from_millis(5)).await;
        Ok(Some(Tensor::new(vec![48, 64, 3], vec![90; 48 * 64 * 3]).unwrap()))
    }
}

pub struct RightHand;

impl HandLandmarker for RightHand {
    fn detect(&mut self, _frame: &Tensor<u8>) -> Result<HandLandmarks, InferError> {
        Ok(HandLandmarks {
            left: None,
            right: Some(HandLandmarkSet::new(vec![Landmark::new(0.5, 0.5, 0.0); 21])),
        })
    }
}

pub struct Fixed(pub ProbabilityVector);

impl GestureClassifier for Fixed {
    fn classify(&mut self, _features: &Tensor<f32>) -> Result<ProbabilityVector, InferError> {
        Ok(self.0)
    }
}

/// Opens `frames`-long sessions on the listed devices and records every open.
pub struct MockFactory {
    pub devices: HashSet<u32>,
    pub frames: usize,
    pub probabilities: ProbabilityVector,
    pub opened: Arc<Mutex<Vec<CameraSelection>>>,
}

impl MockFactory {
    pub fn new(devices: &[u32], frames: usize) -> Self {
        Self {
            devices: devices.iter().copied().collect(),
            frames,
            probabilities: ProbabilityVector::new([0.05, 0.05, 0.85, 0.05]),
            opened: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl PipelineFactory for MockFactory {
    type Camera = FiniteCamera;
    type Detector = RightHand;
    type Classifier = Fixed;

    fn open(
        &self,
        selection: CameraSelection,
        prediction: SharedPrediction,
    ) -> Result<Pipeline<FiniteCamera, RightHand, Fixed>, PipelineError> {
        self.opened.lock().unwrap().push(selection);
        if !self.devices.contains(&selection.index()) {
            return Err(PipelineError::Camera(CameraError::Device(format!(
                "/dev/video{} not found",
                selection.index()
            ))));
        }
        Ok(Pipeline::new(
            FiniteCamera {
                remaining: self.frames,
            },
            RightHand,
            Fixed(self.probabilities),
            prediction,
            PipelineConfig::default(),
        ))
    }
}

pub struct SetProbe(pub HashSet<u32>);

impl CameraProbe for SetProbe {
    fn probe(&self, index: u32) -> bool {
        self.0.contains(&index)
    }
}

pub type TestServer = Server<MockFactory, SetProbe>;
pub type TestService = GestureService<MockFactory, SetProbe>;

pub async fn start(factory: MockFactory, devices: &[u32]) -> (TestServer, SharedPrediction) {
    start_with(factory, devices, |service| service).await
}

/// Like [`start`], with the service adjusted before binding.
pub async fn start_with(
    factory: MockFactory,
    devices: &[u32],
    configure: impl FnOnce(TestService) -> TestService,
) -> (TestServer, SharedPrediction) {
    let prediction = SharedPrediction::new();
    let service = configure(GestureService::new(
        factory,
        SetProbe(devices.iter().copied().collect()),
        prediction.clone(),
    ));
    let server = Server::bind("127.0.0.1:0", service).await.expect("bind failed");
    (server, prediction)
}

pub struct RawResponse {
    pub status: u16,
    pub head: String,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<String> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.eq_ignore_ascii_case(name).then(|| value.trim().to_string())
        })
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// `name=value` of the issued session cookie.
    pub fn session_cookie(&self) -> Option<String> {
        self.header("set-cookie")
            .and_then(|value| value.split(';').next().map(str::to_string))
    }
}

/// Sends raw bytes and reads until the server closes the connection.
pub async fn exchange(addr: SocketAddr, request: &[u8]) -> RawResponse {
    let mut stream = TcpStream::connect(addr).await.expect("connect failed");
    stream.write_all(request).await.expect("write failed");
    let mut raw = Vec::new();
    timeout(Duration::from_secs(10), stream.read_to_end(&mut raw))
        .await
        .expect("response timed out")
        .expect("read failed");
    parse_response(raw)
}

pub fn parse_response(raw: Vec<u8>) -> RawResponse {
    let split = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("no end of head");
    let head = String::from_utf8(raw[..split].to_vec()).expect("head not utf-8");
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .expect("no status code");
    RawResponse {
        status,
        head,
        body: raw[split + 4..].to_vec(),
    }
}

pub fn get(path: &str, cookie: Option<&str>) -> Vec<u8> {
    let cookie = cookie.map(|c| format!("Cookie: {c}\r\n")).unwrap_or_default();
    format!("GET {path} HTTP/1.1\r\nHost: localhost\r\n{cookie}\r\n").into_bytes()
}

pub fn post_form(path: &str, body: &str, cookie: Option<&str>) -> Vec<u8> {
    let cookie = cookie.map(|c| format!("Cookie: {c}\r\n")).unwrap_or_default();
    format!(
        "POST {path} HTTP/1.1\r\nHost: localhost\r\n{cookie}Content-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    )
    .into_bytes()
}
