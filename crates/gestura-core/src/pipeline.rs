use crate::{
    GestureHistory, HistorySmoother, PipelineConfig, PipelineError, SharedPrediction,
    encode_keypoints, overlay, select_keypoints,
};
use gestura_base::Tensor;
use gestura_camera::Camera;
use gestura_infer::{GestureClassifier, HandLandmarker};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Device acquired, no frame processed yet.
    Opening,
    Streaming,
    Closed,
}

/// Why [`Pipeline::run`] stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineExit {
    /// The camera could not supply more frames.
    EndOfStream,
    /// The frame consumer went away.
    Disconnected,
}

/// Everything after frame acquisition. Runs on the blocking pool.
struct Stages<D, K> {
    detector: D,
    classifier: K,
    smoother: HistorySmoother,
    prediction: SharedPrediction,
    config: PipelineConfig,
    frames: u64,
}

impl<D, K> Stages<D, K>
where
    D: HandLandmarker,
    K: GestureClassifier,
{
    fn process(&mut self, mut frame: Tensor<u8>) -> Result<Vec<u8>, PipelineError> {
        let hands = self.detector.detect(&frame)?;
        let selection = select_keypoints(&hands, self.config.tie_break());
        let features = encode_keypoints(&selection)?;
        let probabilities = self.classifier.classify(&features)?;

        if let Some(gesture) = self.smoother.observe(&probabilities) {
            self.prediction.publish(gesture);
        }

        overlay::render(&mut frame, &hands, &probabilities, self.smoother.history())?;
        let resized = gestura_image::resize(&frame, self.config.output_size())?;
        let jpeg = gestura_image::encode_jpeg(&resized, self.config.jpeg_quality())?;

        self.frames += 1;
        Ok(jpeg)
    }
}

/// One streaming session: camera in, annotated JPEG frames out.
///
/// Frames are awaited on the runtime; detection, classification and
/// encoding run on tokio's blocking pool so readers of the shared
/// prediction are never stalled by inference. The camera is owned by the
/// pipeline and released when it is dropped, on every exit path of
/// [`run`](Self::run).
pub struct Pipeline<C, D, K> {
    camera: C,
    stages: Arc<Mutex<Stages<D, K>>>,
    config: PipelineConfig,
    state: PipelineState,
}

impl<C, D, K> Pipeline<C, D, K>
where
    C: Camera,
    D: HandLandmarker + Send + 'static,
    K: GestureClassifier + Send + 'static,
{
    pub fn new(
        camera: C,
        detector: D,
        classifier: K,
        prediction: SharedPrediction,
        config: PipelineConfig,
    ) -> Self {
        let smoother = HistorySmoother::new(config.threshold(), config.history_capacity());
        Self {
            camera,
            stages: Arc::new(Mutex::new(Stages {
                detector,
                classifier,
                smoother,
                prediction,
                config: config.clone(),
                frames: 0,
            })),
            config,
            state: PipelineState::Opening,
        }
    }

    fn stages(&self) -> MutexGuard<'_, Stages<D, K>> {
        // a poisoned lock means a frame task panicked; the state is still readable
        self.stages.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Runs one frame through every stage on the blocking pool.
    pub async fn process(&self, frame: Tensor<u8>) -> Result<Vec<u8>, PipelineError> {
        let stages = self.stages.clone();
        tokio::task::spawn_blocking(move || {
            stages
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .process(frame)
        })
        .await
        .map_err(|e| PipelineError::Task(e.to_string()))?
    }

    /// Pulls and processes the next frame, `None` once the camera is exhausted.
    pub async fn step(&mut self) -> Result<Option<Vec<u8>>, PipelineError> {
        let Some(frame) = self.camera.recv().await? else {
            return Ok(None);
        };
        self.state = PipelineState::Streaming;
        self.process(frame).await.map(Some)
    }

    /// Streams frames into `frames` until the camera ends or the receiver is dropped.
    ///
    /// Stage failures end the session with the error. The pipeline (and with it
    /// the device) is released before this returns.
    pub async fn run(mut self, frames: mpsc::Sender<Vec<u8>>) -> Result<PipelineExit, PipelineError> {
        log::info!("pipeline opened");
        let result = self.stream(&frames).await;
        self.state = PipelineState::Closed;

        let count = self.frames();
        match &result {
            Ok(PipelineExit::EndOfStream) => {
                log::info!("pipeline closed: end of stream after {} frames", count)
            }
            Ok(PipelineExit::Disconnected) => {
                log::info!("pipeline closed: consumer disconnected after {} frames", count)
            }
            Err(e) => log::error!("pipeline failed after {} frames: {}", count, e),
        }
        result
    }

    async fn stream(&mut self, frames: &mpsc::Sender<Vec<u8>>) -> Result<PipelineExit, PipelineError> {
        loop {
            if frames.is_closed() {
                return Ok(PipelineExit::Disconnected);
            }
            let Some(jpeg) = self.step().await? else {
                return Ok(PipelineExit::EndOfStream);
            };
            if frames.send(jpeg).await.is_err() {
                return Ok(PipelineExit::Disconnected);
            }
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Snapshot of the accepted gesture history.
    pub fn history(&self) -> GestureHistory {
        self.stages().smoother.history().clone()
    }

    /// Frames processed so far.
    pub fn frames(&self) -> u64 {
        self.stages().frames
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}
