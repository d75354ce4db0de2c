use gestura_camera::{Camera, CameraSelection};
use gestura_core::{Pipeline, PipelineError, SharedPrediction};
use gestura_infer::{GestureClassifier, HandLandmarker};

/// Opens a pipeline for one streaming session.
///
/// `open` may block (device and model loading); the server calls it on the
/// blocking pool. A failure is reported to the client as 503.
pub trait PipelineFactory: Send + Sync + 'static {
    type Camera: Camera + Send + 'static;
    type Detector: HandLandmarker + Send + 'static;
    type Classifier: GestureClassifier + Send + 'static;

    fn open(
        &self,
        selection: CameraSelection,
        prediction: SharedPrediction,
    ) -> Result<Pipeline<Self::Camera, Self::Detector, Self::Classifier>, PipelineError>;
}
