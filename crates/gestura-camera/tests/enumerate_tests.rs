use gestura_camera::{CameraProbe, DEFAULT_MAX_CAMERAS, enumerate_cameras};
use std::cell::RefCell;
use std::collections::HashSet;

struct MockProbe {
    openable: HashSet<u32>,
    probed: RefCell<Vec<u32>>,
}

impl MockProbe {
    fn new(openable: &[u32]) -> Self {
        Self {
            openable: openable.iter().copied().collect(),
            probed: RefCell::new(Vec::new()),
        }
    }
}

impl CameraProbe for MockProbe {
    fn probe(&self, index: u32) -> bool {
        self.probed.borrow_mut().push(index);
        self.openable.contains(&index)
    }
}

#[test]
fn test_enumerate_skips_devices_that_fail_to_open() {
    let probe = MockProbe::new(&[0, 2]);
    assert_eq!(enumerate_cameras(&probe, 3), vec![0, 2]);
}

#[test]
fn test_enumerate_probes_every_index_in_order() {
    let probe = MockProbe::new(&[7, 3]);
    let cameras = enumerate_cameras(&probe, DEFAULT_MAX_CAMERAS);
    assert_eq!(cameras, vec![3, 7]);
    assert_eq!(*probe.probed.borrow(), (0..10).collect::<Vec<_>>());
}

#[test]
fn test_enumerate_ignores_devices_beyond_limit() {
    let probe = MockProbe::new(&[1, 12]);
    assert_eq!(enumerate_cameras(&probe, DEFAULT_MAX_CAMERAS), vec![1]);
}

#[test]
fn test_enumerate_with_no_devices() {
    assert!(enumerate_cameras(&MockProbe::new(&[]), DEFAULT_MAX_CAMERAS).is_empty());
    assert!(enumerate_cameras(&MockProbe::new(&[0]), 0).is_empty());
}

#[test]
fn test_closure_probe() {
    let cameras = enumerate_cameras(&|index: u32| index % 2 == 1, 6);
    assert_eq!(cameras, vec![1, 3, 5]);
}
