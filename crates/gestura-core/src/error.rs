use gestura_base::TensorError;
use gestura_camera::CameraError;
use gestura_image::ImageError;
use gestura_infer::InferError;
use std::fmt;

#[derive(Debug)]
pub enum PipelineError {
    Camera(CameraError),
    Infer(InferError),
    Image(ImageError),
    Tensor(TensorError),
    Config(String),
    /// A frame task on the blocking pool panicked or was cancelled.
    Task(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Camera(err) => write!(f, "camera: {err}"),
            PipelineError::Infer(err) => write!(f, "inference: {err}"),
            PipelineError::Image(err) => write!(f, "image: {err}"),
            PipelineError::Tensor(err) => write!(f, "keypoints: {err}"),
            PipelineError::Config(msg) => write!(f, "invalid configuration: {msg}"),
            PipelineError::Task(msg) => write!(f, "frame task: {msg}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Camera(err) => Some(err),
            PipelineError::Infer(err) => Some(err),
            PipelineError::Image(err) => Some(err),
            PipelineError::Tensor(err) => Some(err),
            PipelineError::Config(_) | PipelineError::Task(_) => None,
        }
    }
}

impl From<CameraError> for PipelineError {
    fn from(err: CameraError) -> Self {
        PipelineError::Camera(err)
    }
}

impl From<InferError> for PipelineError {
    fn from(err: InferError) -> Self {
        PipelineError::Infer(err)
    }
}

impl From<ImageError> for PipelineError {
    fn from(err: ImageError) -> Self {
        PipelineError::Image(err)
    }
}

impl From<TensorError> for PipelineError {
    fn from(err: TensorError) -> Self {
        PipelineError::Tensor(err)
    }
}
