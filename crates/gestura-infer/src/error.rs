use crate::Device;
use gestura_base::TensorError;
use std::fmt;

#[derive(Debug)]
pub enum InferError {
    ModelLoad(String),
    Backend(String),
    UnsupportedDevice(Device),
    InvalidDevice(String),
    InvalidInput {
        name: String,
        expected_names: Vec<String>,
    },
    MissingOutput(String),
    ShapeMismatch {
        expected: String,
        got: String,
    },
    Tensor(TensorError),
}

impl fmt::Display for InferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferError::ModelLoad(msg) => write!(f, "model load error: {msg}"),
            InferError::Backend(msg) => write!(f, "backend error: {msg}"),
            InferError::UnsupportedDevice(device) => write!(f, "unsupported device: {device}"),
            InferError::InvalidDevice(input) => write!(f, "invalid device: {input:?}"),
            InferError::InvalidInput {
                name,
                expected_names,
            } => write!(f, "invalid input {name:?}, model expects {expected_names:?}"),
            InferError::MissingOutput(name) => write!(f, "missing output: {name}"),
            InferError::ShapeMismatch { expected, got } => {
                write!(f, "shape mismatch: expected {expected}, got {got}")
            }
            InferError::Tensor(err) => write!(f, "tensor error: {err}"),
        }
    }
}

impl std::error::Error for InferError {}

impl From<TensorError> for InferError {
    fn from(err: TensorError) -> Self {
        InferError::Tensor(err)
    }
}
