use crate::{PipelineError, Selection};
use gestura_base::Tensor;
use gestura_infer::HAND_LANDMARK_COUNT;

/// Classifier input shape: batch, landmarks, coordinates, channel.
pub const KEYPOINT_SHAPE: [usize; 4] = [1, HAND_LANDMARK_COUNT, 3, 1];

/// Flattens the selected hand into a `[1, 21, 3, 1]` tensor, zeros when no
/// hand is selected.
///
/// A selected hand without exactly 21 landmarks is an error.
pub fn encode_keypoints(selection: &Selection<'_>) -> Result<Tensor<f32>, PipelineError> {
    match selection {
        Selection::None => Ok(Tensor::zeros(KEYPOINT_SHAPE.to_vec())?),
        Selection::Hand(_, hand) => {
            let data = hand.iter().flat_map(|lm| [lm.x, lm.y, lm.z]).collect();
            Ok(Tensor::new(KEYPOINT_SHAPE.to_vec(), data)?)
        }
    }
}
