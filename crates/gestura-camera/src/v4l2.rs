use crate::{Camera, CameraConfig, CameraError, CameraProbe};
use gestura_base::{Tensor, Vec2};
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;
use v4l::buffer::Type;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, Format, FourCC};

type FrameResult = Result<Tensor<u8>, CameraError>;

#[derive(Clone, Copy, Debug, PartialEq)]
enum PixelFormat {
    Mjpeg,
    Yuyv,
}

/// V4L2 camera. Frames are captured and decoded on a dedicated thread.
pub struct V4l2Camera {
    config: CameraConfig,
    device: Option<Device>,
    format: Format,
    pixel_format: PixelFormat,
    receiver: Option<mpsc::Receiver<FrameResult>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for V4l2Camera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("V4l2Camera")
            .field("config", &self.config)
            .field("pixel_format", &self.pixel_format)
            .field("receiver", &self.receiver.is_some())
            .field("thread_handle", &self.thread_handle.is_some())
            .finish()
    }
}

impl Camera for V4l2Camera {
    async fn recv(&mut self) -> Result<Option<Tensor<u8>>, CameraError> {
        self.ensure_started()?;

        let receiver = self
            .receiver
            .as_mut()
            .ok_or_else(|| CameraError::Channel("receiver not initialized".to_string()))?;

        // capture failures arrive as Err, a closed channel is a clean stop
        match receiver.recv().await {
            Some(frame) => frame.map(Some),
            None => Ok(None),
        }
    }
}

impl Drop for V4l2Camera {
    fn drop(&mut self) {
        // dropping the receiver makes the next blocking_send fail
        drop(self.receiver.take());

        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
        log::debug!("released {}", self.config.device_path());
    }
}

impl V4l2Camera {
    /// Open the configured device.
    ///
    /// MJPEG is requested first, packed YUYV is accepted as a fallback.
    /// Returns `CameraError::Device` if the device cannot be opened or
    /// supports neither format.
    pub fn new(config: CameraConfig) -> Result<Self, CameraError> {
        let device = Device::with_path(config.device_path())?;

        let (format, pixel_format) = Self::negotiate_format(&device, &config)?;

        let params = v4l::video::capture::Parameters::with_fps(config.fps());
        if let Err(e) = Capture::set_params(&device, &params) {
            log::warn!("{}: cannot set {} fps: {}", config.device_path(), config.fps(), e);
        }

        log::info!(
            "opened {} at {}x{} ({:?})",
            config.device_path(),
            format.width,
            format.height,
            pixel_format
        );

        Ok(Self {
            config,
            device: Some(device),
            format,
            pixel_format,
            receiver: None,
            thread_handle: None,
        })
    }

    fn negotiate_format(
        device: &Device,
        config: &CameraConfig,
    ) -> Result<(Format, PixelFormat), CameraError> {
        for (fourcc, pixel_format) in [
            (FourCC::new(b"MJPG"), PixelFormat::Mjpeg),
            (FourCC::new(b"YUYV"), PixelFormat::Yuyv),
        ] {
            let requested = Format::new(config.width(), config.height(), fourcc);
            let format = Capture::set_format(device, &requested)?;
            if format.fourcc == fourcc {
                return Ok((format, pixel_format));
            }
        }
        Err(CameraError::Device(format!(
            "{} supports neither MJPEG nor YUYV",
            config.device_path()
        )))
    }

    fn ensure_started(&mut self) -> Result<(), CameraError> {
        if self.receiver.is_some() {
            return Ok(());
        }

        let device = self
            .device
            .take()
            .ok_or_else(|| CameraError::Device("device already consumed".to_string()))?;

        let buffer_count = self.config.buffer_count();
        let (tx, rx) = mpsc::channel(buffer_count as usize);
        let path = self.config.device_path();
        let size = Vec2::new(self.format.width as usize, self.format.height as usize);
        let pixel_format = self.pixel_format;

        let handle = thread::spawn(move || {
            Self::capture_loop(device, tx, buffer_count, size, pixel_format);
            log::debug!("{}: capture stopped", path);
        });

        self.receiver = Some(rx);
        self.thread_handle = Some(handle);

        Ok(())
    }

    fn capture_loop(
        device: Device,
        tx: mpsc::Sender<FrameResult>,
        buffer_count: u32,
        size: Vec2<usize>,
        pixel_format: PixelFormat,
    ) {
        let mut stream = match MmapStream::with_buffers(&device, Type::VideoCapture, buffer_count) {
            Ok(stream) => stream,
            Err(e) => {
                log::warn!("cannot start streaming: {}", e);
                let _ = tx.blocking_send(Err(CameraError::Stream(e.to_string())));
                return;
            }
        };

        pump_frames(&tx, || {
            let (data, metadata) =
                CaptureStream::next(&mut stream).map_err(|e| CameraError::Stream(e.to_string()))?;

            // the mapped buffer is only valid until the next call
            let used = (metadata.bytesused as usize).min(data.len());
            let data = &data[..used];

            let frame = match pixel_format {
                PixelFormat::Mjpeg => gestura_image::decode_rgb(data),
                PixelFormat::Yuyv => gestura_image::yuyv_to_rgb(size, data),
            };
            match frame {
                Ok(frame) => Ok(Some(frame)),
                Err(e) => {
                    log::warn!("dropping corrupt frame: {}", e);
                    Ok(None)
                }
            }
        });
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }
}

/// Forwards frames from `next` until the receiver is dropped or capture fails.
///
/// `Ok(None)` from `next` skips a frame. A failure is sent to the receiver
/// and ends the loop.
fn pump_frames(
    tx: &mpsc::Sender<FrameResult>,
    mut next: impl FnMut() -> Result<Option<Tensor<u8>>, CameraError>,
) {
    loop {
        let item = match next() {
            Ok(Some(frame)) => Ok(frame),
            Ok(None) => continue,
            Err(e) => {
                log::warn!("capture failed: {}", e);
                Err(e)
            }
        };
        let failed = item.is_err();
        if tx.blocking_send(item).is_err() || failed {
            return;
        }
    }
}

/// Probes `/dev/video<index>` by opening it and reading its capture format.
#[derive(Clone, Copy, Debug, Default)]
pub struct V4l2Probe;

impl CameraProbe for V4l2Probe {
    fn probe(&self, index: u32) -> bool {
        match Device::new(index as usize) {
            Ok(device) => Capture::format(&device).is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Tensor<u8> {
        Tensor::new(vec![1, 1, 3], vec![1, 2, 3]).unwrap()
    }

    #[test]
    fn test_pump_forwards_capture_error() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut calls = 0;
        let pump = thread::spawn(move || {
            pump_frames(&tx, || {
                calls += 1;
                match calls {
                    1 => Ok(Some(frame())),
                    2 => Ok(None),
                    3 => Ok(Some(frame())),
                    _ => Err(CameraError::Stream("unplugged".to_string())),
                }
            })
        });
        pump.join().unwrap();

        assert!(rx.blocking_recv().unwrap().is_ok());
        assert!(rx.blocking_recv().unwrap().is_ok());
        assert!(matches!(
            rx.blocking_recv(),
            Some(Err(CameraError::Stream(msg))) if msg == "unplugged"
        ));
        // the pump stopped after the failure
        assert!(rx.blocking_recv().is_none());
    }

    #[test]
    fn test_pump_stops_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let pump = thread::spawn(move || pump_frames(&tx, || Ok(Some(frame()))));
        pump.join().unwrap();
    }
}
