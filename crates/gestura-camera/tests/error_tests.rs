use gestura_camera::CameraError;
use gestura_image::ImageError;

#[test]
fn test_io_error_becomes_device_error() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such device");
    let err: CameraError = io.into();
    assert!(matches!(err, CameraError::Device(_)));
    assert!(err.to_string().contains("no such device"));
}

#[test]
fn test_image_error_becomes_decode_error() {
    let err: CameraError = ImageError::Decode("truncated".to_string()).into();
    assert!(matches!(err, CameraError::Decode(_)));
    assert!(err.to_string().starts_with("decode error"));
}

#[test]
fn test_error_display() {
    assert_eq!(
        CameraError::Stream("gone".to_string()).to_string(),
        "stream error: gone"
    );
    assert_eq!(
        CameraError::InvalidSelection("x".to_string()).to_string(),
        "invalid camera selection: \"x\""
    );
}
