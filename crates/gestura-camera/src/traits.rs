use crate::CameraError;
use gestura_base::Tensor;
use std::future::Future;

/// Async camera trait for frame capture.
///
/// `recv` yields RGB frames as `Tensor<u8>` with shape `[height, width, 3]`.
/// `Ok(None)` means the device can no longer supply frames; it is the normal
/// end of a stream, not an error. Dropping the camera releases the device.
pub trait Camera {
    fn recv(&mut self) -> impl Future<Output = Result<Option<Tensor<u8>>, CameraError>> + Send;
}
