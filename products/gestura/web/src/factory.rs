use crate::ServerConfig;
use gestura_camera::{CameraConfig, CameraSelection, V4l2Camera};
use gestura_com::PipelineFactory;
use gestura_core::{Pipeline, PipelineConfig, PipelineError, SharedPrediction};
use gestura_infer::{ModelSource, OnnxBackend, OnnxGestureClassifier, OnnxHandLandmarker};
use std::path::PathBuf;

/// Opens a V4L2 camera and loads the three ONNX models for every session.
pub struct OnnxPipelineFactory {
    backend: OnnxBackend,
    palm_model: PathBuf,
    landmark_model: PathBuf,
    classifier_model: PathBuf,
    pipeline: PipelineConfig,
}

impl OnnxPipelineFactory {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            backend: OnnxBackend::new(config.device.clone()),
            palm_model: config.palm_model.clone(),
            landmark_model: config.landmark_model.clone(),
            classifier_model: config.classifier_model.clone(),
            pipeline: PipelineConfig::default().with_tie_break(config.tie_break),
        }
    }
}

impl PipelineFactory for OnnxPipelineFactory {
    type Camera = V4l2Camera;
    type Detector = OnnxHandLandmarker;
    type Classifier = OnnxGestureClassifier;

    fn open(
        &self,
        selection: CameraSelection,
        prediction: SharedPrediction,
    ) -> Result<Pipeline<V4l2Camera, OnnxHandLandmarker, OnnxGestureClassifier>, PipelineError>
    {
        // models first, so a missing model never holds the device
        let detector = OnnxHandLandmarker::new(
            ModelSource::File(self.palm_model.clone()),
            ModelSource::File(self.landmark_model.clone()),
            &self.backend,
        )?;
        let classifier = OnnxGestureClassifier::new(
            ModelSource::File(self.classifier_model.clone()),
            &self.backend,
        )?;
        let camera = V4l2Camera::new(CameraConfig::for_selection(selection))?;

        Ok(Pipeline::new(
            camera,
            detector,
            classifier,
            prediction,
            self.pipeline.clone(),
        ))
    }
}
