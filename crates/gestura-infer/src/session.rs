use crate::InferError;
use gestura_base::Tensor;
use std::collections::HashMap;

/// A loaded model. `output_names` preserves the model's declared output order.
pub trait Session: Send {
    fn run(
        &mut self,
        inputs: &[(&str, Tensor<f32>)],
    ) -> Result<HashMap<String, Tensor<f32>>, InferError>;
    fn input_names(&self) -> &[String];
    fn output_names(&self) -> &[String];
}

/// Looks up a named output and checks its element count.
pub(crate) fn expect_output<'a>(
    outputs: &'a HashMap<String, Tensor<f32>>,
    name: &str,
    len: usize,
) -> Result<&'a Tensor<f32>, InferError> {
    let tensor = outputs
        .get(name)
        .ok_or_else(|| InferError::MissingOutput(name.to_string()))?;
    if tensor.len() != len {
        return Err(InferError::ShapeMismatch {
            expected: format!("{} values in '{}'", len, name),
            got: format!("{:?}", tensor.shape),
        });
    }
    Ok(tensor)
}
