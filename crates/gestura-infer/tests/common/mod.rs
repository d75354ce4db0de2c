use gestura_base::Tensor;
use gestura_infer::{InferError, Session};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Session returning fixed outputs and recording the inputs it was given.
///
/// Outputs queued with [`then`](Self::then) are returned first, one per run.
pub struct MockSession {
    pub input_names: Vec<String>,
    pub output_names: Vec<String>,
    pub outputs: HashMap<String, Tensor<f32>>,
    pub queued: VecDeque<HashMap<String, Tensor<f32>>>,
    pub seen: Arc<Mutex<Vec<(String, Tensor<f32>)>>>,
}

impl MockSession {
    pub fn new(input: &str, outputs: Vec<(&str, Tensor<f32>)>) -> Self {
        Self {
            input_names: vec![input.to_string()],
            output_names: outputs.iter().map(|(name, _)| name.to_string()).collect(),
            outputs: named(outputs),
            queued: VecDeque::new(),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn then(mut self, outputs: Vec<(&str, Tensor<f32>)>) -> Self {
        self.queued.push_back(named(outputs));
        self
    }
}

fn named(outputs: Vec<(&str, Tensor<f32>)>) -> HashMap<String, Tensor<f32>> {
    outputs
        .into_iter()
        .map(|(name, tensor)| (name.to_string(), tensor))
        .collect()
}

impl Session for MockSession {
    fn run(
        &mut self,
        inputs: &[(&str, Tensor<f32>)],
    ) -> Result<HashMap<String, Tensor<f32>>, InferError> {
        let mut seen = self.seen.lock().unwrap();
        for (name, tensor) in inputs {
            seen.push((name.to_string(), tensor.clone()));
        }
        Ok(self
            .queued
            .pop_front()
            .unwrap_or_else(|| self.outputs.clone()))
    }

    fn input_names(&self) -> &[String] {
        &self.input_names
    }

    fn output_names(&self) -> &[String] {
        &self.output_names
    }
}
