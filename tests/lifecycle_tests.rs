//! End-to-end lifecycle behavior against a mock host: mount, animate,
//! resize, unmount, plus the failure and idempotence laws.

use std::cell::RefCell;
use std::rc::Rc;

use backdrop::animation::{AnimationHandle, FrameScheduler};
use backdrop::error::{DrawError, MountError, SetupError};
use backdrop::lifecycle::{Backdrop, LifecycleState};
use backdrop::scene::SceneGraph;
use backdrop::surface::{DrawTarget, SurfaceBinder};
use backdrop::viewport::Viewport;

#[derive(Default)]
struct MockScheduler {
    next: u64,
    scheduled: u64,
    cancelled: Vec<AnimationHandle>,
}

impl FrameScheduler for MockScheduler {
    fn schedule(&mut self) -> AnimationHandle {
        let handle = AnimationHandle::from_raw(self.next);
        self.next += 1;
        self.scheduled += 1;
        handle
    }

    fn cancel(&mut self, handle: AnimationHandle) {
        self.cancelled.push(handle);
    }
}

/// Shared observation log so tests can inspect the target after it has been
/// boxed away into the backdrop.
#[derive(Default)]
struct TargetLog {
    size: (u32, u32),
    draws: usize,
    releases: usize,
}

struct MockTarget {
    log: Rc<RefCell<TargetLog>>,
    released: bool,
}

impl DrawTarget for MockTarget {
    fn draw(&mut self, _scene: &SceneGraph) -> Result<(), DrawError> {
        self.log.borrow_mut().draws += 1;
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) {
        self.log.borrow_mut().size = (viewport.width, viewport.height);
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.log.borrow_mut().releases += 1;
        }
        self.log.borrow_mut().size = (0, 0);
    }

    fn dimensions(&self) -> (u32, u32) {
        self.log.borrow().size
    }
}

enum BindOutcome {
    Succeed,
    MissingMountPoint,
    GpuUnavailable,
}

struct MockBinder {
    outcome: BindOutcome,
    log: Rc<RefCell<TargetLog>>,
}

impl MockBinder {
    fn new(outcome: BindOutcome) -> (Self, Rc<RefCell<TargetLog>>) {
        let log = Rc::new(RefCell::new(TargetLog::default()));
        (
            Self {
                outcome,
                log: log.clone(),
            },
            log,
        )
    }
}

impl SurfaceBinder for MockBinder {
    fn bind(&mut self, viewport: Viewport) -> Result<Box<dyn DrawTarget>, SetupError> {
        match self.outcome {
            BindOutcome::Succeed => {
                self.log.borrow_mut().size = (viewport.width, viewport.height);
                Ok(Box::new(MockTarget {
                    log: self.log.clone(),
                    released: false,
                }))
            }
            BindOutcome::MissingMountPoint => Err(MountError::Missing.into()),
            BindOutcome::GpuUnavailable => {
                Err(SetupError::SurfaceCreation("no adapter".into()))
            }
        }
    }
}

fn mounted_backdrop() -> (Backdrop, MockScheduler, Rc<RefCell<TargetLog>>) {
    let mut backdrop = Backdrop::new();
    let mut scheduler = MockScheduler::default();
    let (mut binder, log) = MockBinder::new(BindOutcome::Succeed);

    backdrop
        .mount(&mut binder, &mut scheduler, Viewport::new(1024, 768))
        .expect("mount should succeed");

    (backdrop, scheduler, log)
}

#[test]
fn test_mount_reaches_running_with_expected_state() {
    let (backdrop, scheduler, log) = mounted_backdrop();

    assert_eq!(backdrop.state(), LifecycleState::Running);
    assert!(backdrop.is_loaded());
    assert_eq!(backdrop.live_objects(), 15);
    assert!(backdrop.pending_frame().is_some());
    assert!(backdrop.viewport_registered());
    assert_eq!(backdrop.surface_dimensions(), (1024, 768));
    assert_eq!(scheduler.scheduled, 1);

    let camera = backdrop.scene().unwrap().camera;
    assert!((camera.aspect - 1024.0 / 768.0).abs() < 1e-3);
    assert_eq!(log.borrow().draws, 0);
}

#[test]
fn test_resize_updates_camera_and_surface_but_not_objects() {
    let (mut backdrop, _scheduler, log) = mounted_backdrop();

    let before: Vec<_> = backdrop.scene().unwrap().objects().to_vec();

    backdrop.handle_resize(Viewport::new(800, 600));

    let camera = backdrop.scene().unwrap().camera;
    assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
    assert_eq!(log.borrow().size, (800, 600));
    assert_eq!(backdrop.scene().unwrap().objects(), &before[..]);
}

#[test]
fn test_tick_mutates_then_draws_then_reschedules() {
    let (mut backdrop, mut scheduler, log) = mounted_backdrop();

    let before: Vec<_> = backdrop.scene().unwrap().objects().to_vec();
    let ran = backdrop.tick(0.016, &mut scheduler).unwrap();

    assert!(ran);
    assert_eq!(log.borrow().draws, 1);
    assert_eq!(scheduler.scheduled, 2);
    assert!(backdrop.pending_frame().is_some());

    let after = backdrop.scene().unwrap().objects();
    for (a, b) in after.iter().zip(before.iter()) {
        assert!(a.rotation.x > b.rotation.x);
        assert!(a.rotation.y > b.rotation.y);
    }
}

#[test]
fn test_immediate_unmount_releases_everything() {
    let (mut backdrop, mut scheduler, log) = mounted_backdrop();

    // Zero ticks elapsed; the first frame is still pending.
    backdrop.unmount(&mut scheduler);

    assert_eq!(backdrop.state(), LifecycleState::Unmounted);
    assert!(!backdrop.is_loaded());
    assert_eq!(backdrop.live_objects(), 0);
    assert!(backdrop.pending_frame().is_none());
    assert!(!backdrop.viewport_registered());
    assert_eq!(backdrop.surface_dimensions(), (0, 0));
    assert_eq!(log.borrow().releases, 1);
    assert_eq!(scheduler.cancelled.len(), 1);
}

#[test]
fn test_unmounting_twice_is_a_no_op() {
    let (mut backdrop, mut scheduler, log) = mounted_backdrop();

    backdrop.unmount(&mut scheduler);
    backdrop.unmount(&mut scheduler);

    assert_eq!(backdrop.state(), LifecycleState::Unmounted);
    assert_eq!(log.borrow().releases, 1);
    assert_eq!(scheduler.cancelled.len(), 1);
}

#[test]
fn test_unmount_before_mount_is_a_no_op() {
    let mut backdrop = Backdrop::new();
    let mut scheduler = MockScheduler::default();

    backdrop.unmount(&mut scheduler);

    assert_eq!(backdrop.state(), LifecycleState::Unmounted);
    assert!(scheduler.cancelled.is_empty());
}

#[test]
fn test_ticks_after_unmount_do_nothing() {
    let (mut backdrop, mut scheduler, log) = mounted_backdrop();

    backdrop.unmount(&mut scheduler);
    let ran = backdrop.tick(0.5, &mut scheduler).unwrap();

    assert!(!ran);
    assert_eq!(log.borrow().draws, 0);
}

#[test]
fn test_missing_mount_point_fails_back_to_unmounted() {
    let mut backdrop = Backdrop::new();
    let mut scheduler = MockScheduler::default();
    let (mut binder, _log) = MockBinder::new(BindOutcome::MissingMountPoint);

    let err = backdrop
        .mount(&mut binder, &mut scheduler, Viewport::new(1024, 768))
        .unwrap_err();

    assert!(matches!(err, SetupError::Mount(MountError::Missing)));
    assert_eq!(backdrop.state(), LifecycleState::Unmounted);
    assert!(!backdrop.is_loaded());
    assert_eq!(backdrop.live_objects(), 0);
    assert!(backdrop.pending_frame().is_none());
    assert_eq!(scheduler.scheduled, 0);

    // The machine can still mount against a valid mount point afterwards.
    let (mut binder, _log) = MockBinder::new(BindOutcome::Succeed);
    backdrop
        .mount(&mut binder, &mut scheduler, Viewport::new(1024, 768))
        .expect("fresh mount should succeed");
    assert_eq!(backdrop.state(), LifecycleState::Running);
}

#[test]
fn test_surface_failure_leaves_partial_state_cleanable() {
    let mut backdrop = Backdrop::new();
    let mut scheduler = MockScheduler::default();
    let (mut binder, _log) = MockBinder::new(BindOutcome::GpuUnavailable);

    let err = backdrop
        .mount(&mut binder, &mut scheduler, Viewport::new(640, 480))
        .unwrap_err();

    assert!(matches!(err, SetupError::SurfaceCreation(_)));
    assert_eq!(backdrop.state(), LifecycleState::Mounting);
    assert!(!backdrop.is_loaded());
    assert!(backdrop.pending_frame().is_none());

    // Defensive teardown reclaims the partially-built scene.
    backdrop.unmount(&mut scheduler);
    assert_eq!(backdrop.state(), LifecycleState::Unmounted);
    assert_eq!(backdrop.live_objects(), 0);
}

#[test]
fn test_mount_while_mounted_is_rejected() {
    let (mut backdrop, mut scheduler, _log) = mounted_backdrop();
    let (mut binder, _other) = MockBinder::new(BindOutcome::Succeed);

    let err = backdrop
        .mount(&mut binder, &mut scheduler, Viewport::new(640, 480))
        .unwrap_err();

    assert!(matches!(err, SetupError::AlreadyMounted));
    // Invariant: still exactly one surface and one pending frame.
    assert_eq!(backdrop.state(), LifecycleState::Running);
    assert_eq!(scheduler.scheduled, 1);
}

#[test]
fn test_remount_generates_a_fresh_object_set() {
    let (mut backdrop, mut scheduler, _log) = mounted_backdrop();

    let first: Vec<_> = backdrop.scene().unwrap().objects().to_vec();
    backdrop.unmount(&mut scheduler);

    let (mut binder, _log2) = MockBinder::new(BindOutcome::Succeed);
    backdrop
        .mount(&mut binder, &mut scheduler, Viewport::new(1024, 768))
        .expect("remount should succeed");

    assert!(backdrop.is_loaded());
    assert_eq!(backdrop.live_objects(), 15);
    // 15 objects with freshly randomized poses; colliding with the
    // previous set would take a broken random source.
    assert_ne!(backdrop.scene().unwrap().objects(), &first[..]);
}

#[test]
fn test_full_session_mount_resize_unmount() {
    let mut backdrop = Backdrop::new();
    let mut scheduler = MockScheduler::default();
    let (mut binder, log) = MockBinder::new(BindOutcome::Succeed);

    backdrop
        .mount(&mut binder, &mut scheduler, Viewport::new(1024, 768))
        .unwrap();
    assert!((backdrop.scene().unwrap().camera.aspect - 1.333).abs() < 1e-3);
    assert_eq!(backdrop.surface_dimensions(), (1024, 768));
    assert_eq!(backdrop.live_objects(), 15);
    assert!(backdrop.is_loaded());

    backdrop.handle_resize(Viewport::new(800, 600));
    assert!((backdrop.scene().unwrap().camera.aspect - 800.0 / 600.0).abs() < 1e-6);
    assert_eq!(log.borrow().size, (800, 600));

    backdrop.unmount(&mut scheduler);
    assert_eq!(backdrop.live_objects(), 0);
    assert!(!backdrop.viewport_registered());
    assert!(backdrop.pending_frame().is_none());
}
