use gestura_base::Tensor;
use gestura_camera::{Camera, CameraError};

// Yields `remaining` frames, then reports end of stream
struct MockCamera {
    remaining: usize,
    frame_count: usize,
}

impl MockCamera {
    fn new(remaining: usize) -> Self {
        Self {
            remaining,
            frame_count: 0,
        }
    }
}

impl Camera for MockCamera {
    async fn recv(&mut self) -> Result<Option<Tensor<u8>>, CameraError> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        self.frame_count += 1;
        Tensor::new(vec![2, 2, 3], vec![0u8; 12])
            .map(Some)
            .map_err(|e| CameraError::Stream(e.to_string()))
    }
}

#[tokio::test]
async fn test_camera_trait_mock_implementation() {
    let mut cam = MockCamera::new(2);

    let frame1 = cam.recv().await.unwrap().unwrap();
    assert_eq!(frame1.shape, vec![2, 2, 3]);
    assert_eq!(cam.frame_count, 1);

    let frame2 = cam.recv().await.unwrap().unwrap();
    assert_eq!(frame2.shape, vec![2, 2, 3]);
    assert_eq!(cam.frame_count, 2);
}

#[tokio::test]
async fn test_camera_end_of_stream_is_not_an_error() {
    let mut cam = MockCamera::new(1);
    assert!(cam.recv().await.unwrap().is_some());
    assert!(cam.recv().await.unwrap().is_none());
    assert!(cam.recv().await.unwrap().is_none());
}

#[tokio::test]
async fn test_camera_trait_polymorphism() {
    async fn drain(camera: &mut impl Camera) -> Result<Vec<Tensor<u8>>, CameraError> {
        let mut frames = Vec::new();
        while let Some(frame) = camera.recv().await? {
            frames.push(frame);
        }
        Ok(frames)
    }

    let mut cam = MockCamera::new(3);
    let frames = drain(&mut cam).await.unwrap();
    assert_eq!(frames.len(), 3);
    assert_eq!(cam.frame_count, 3);
}

#[tokio::test]
async fn test_camera_recv_future_is_send() {
    let handle = tokio::spawn(async move {
        let mut cam = MockCamera::new(1);
        cam.recv().await.map(|frame| frame.is_some())
    });
    assert!(handle.await.unwrap().unwrap());
}
