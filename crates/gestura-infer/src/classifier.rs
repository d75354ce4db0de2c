use crate::{Backend, InferError, ModelSource, ProbabilityVector, Session};
use gestura_base::Tensor;

/// Maps a `[1, 21, 3, 1]` keypoint tensor to gesture scores.
pub trait GestureClassifier {
    fn classify(&mut self, features: &Tensor<f32>) -> Result<ProbabilityVector, InferError>;
}

/// Gesture classifier backed by a single-input, single-output model.
pub struct OnnxGestureClassifier {
    session: Box<dyn Session>,
}

impl OnnxGestureClassifier {
    pub fn new(model: ModelSource, backend: &dyn Backend) -> Result<Self, InferError> {
        Self::from_session(backend.load_model(model)?)
    }

    pub fn from_session(session: Box<dyn Session>) -> Result<Self, InferError> {
        if session.input_names().is_empty() || session.output_names().is_empty() {
            return Err(InferError::ModelLoad(
                "classifier model needs an input and an output".to_string(),
            ));
        }
        Ok(Self { session })
    }
}

impl GestureClassifier for OnnxGestureClassifier {
    fn classify(&mut self, features: &Tensor<f32>) -> Result<ProbabilityVector, InferError> {
        let input_name = self.session.input_names()[0].clone();
        let output_name = self.session.output_names()[0].clone();

        let outputs = self
            .session
            .run(&[(input_name.as_str(), features.clone())])?;
        let scores = outputs
            .get(&output_name)
            .ok_or(InferError::MissingOutput(output_name))?;

        ProbabilityVector::from_slice(&scores.data)
    }
}
