/// Number of device indices probed when listing cameras.
pub const DEFAULT_MAX_CAMERAS: u32 = 10;

/// Checks whether a capture device can be opened.
pub trait CameraProbe {
    fn probe(&self, index: u32) -> bool;
}

impl<F: Fn(u32) -> bool> CameraProbe for F {
    fn probe(&self, index: u32) -> bool {
        self(index)
    }
}

/// Returns, in ascending order, the indices in `0..max_cameras` that open.
///
/// Devices that fail to open are left out without error.
pub fn enumerate_cameras(probe: &impl CameraProbe, max_cameras: u32) -> Vec<u32> {
    let cameras: Vec<u32> = (0..max_cameras).filter(|&index| probe.probe(index)).collect();
    log::debug!("probed {} camera indices, available: {:?}", max_cameras, cameras);
    cameras
}
