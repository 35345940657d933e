extern crate inspect_detect;

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use image::RgbImage;
use inspect_detect::capture_session::{CaptureSession, FrameSource, SessionStatus};
use inspect_detect::common::InspectionFrame;
use common::{hood_hit, StubBackend, StubHit, StubModel, UnavailableBackend};

/// Camera stub: the first `warmup` calls report no frame yet.
struct Camera {
    calls: AtomicUsize,
    warmup: usize,
}

impl FrameSource for Camera {
    fn latest_frame(&self) -> Option<InspectionFrame> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.warmup {
            return None;
        }
        Some(InspectionFrame::from(RgbImage::new(1280, 960)))
    }
}

fn front_model() -> StubModel {
    StubModel {
        hits: vec![
            hood_hit(),
            StubHit { anchor: 300, class: 8, score: 0.66, cxcywh: [320., 560., 500., 80.] },
        ],
        transposed: false,
        delay_ms: 0,
        panics: false,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn session_publishes_results_until_stopped() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_model(dir.path(), "parts.onnx", &front_model());
    let mut session = CaptureSession::<StubBackend>::new(common::config_for(&path), "Front").unwrap();
    assert_eq!(session.status(), SessionStatus::Idle);

    let camera = Arc::new(Camera { calls: AtomicUsize::new(0), warmup: 2 });
    session.start(Arc::clone(&camera)).await.unwrap();
    assert_eq!(session.status(), SessionStatus::Ready);
    assert!(session.is_ready());

    let results = session.results();
    let first = tokio::task::spawn_blocking(move || results.recv_timeout(Duration::from_secs(5)))
        .await
        .unwrap()
        .unwrap();
    assert!(first.is_valid);
    assert_eq!(first.detected_parts, vec!["hood", "front_bumper"]);
    assert_eq!(session.latest_result().map(|r| r.is_valid), Some(true));

    session.set_position("Rear");
    assert_eq!(session.position(), "Rear");

    session.stop().await;
    assert_eq!(session.status(), SessionStatus::Stopped);
    assert!(!session.is_ready());
    assert!(!session.is_running());

    // No new cycles once stopped.
    let seen = camera.calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(camera.calls.load(Ordering::SeqCst), seen);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn closure_frame_source_drives_validation() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_model(dir.path(), "parts.onnx", &front_model());
    let mut session = CaptureSession::<StubBackend>::new(common::config_for(&path), "Left Rear Door").unwrap();

    let source = Arc::new(|| Some(InspectionFrame::from(RgbImage::new(640, 480))));
    session.start(source).await.unwrap();

    let results = session.results();
    let result = tokio::task::spawn_blocking(move || results.recv_timeout(Duration::from_secs(5)))
        .await
        .unwrap()
        .unwrap();
    assert!(!result.is_valid);
    assert!(result.message.starts_with("Wrong parts detected"));

    session.stop().await;
}

#[tokio::test]
async fn load_failure_is_reported_in_status() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_model(dir.path(), "parts.onnx", &front_model());
    let mut session = CaptureSession::<UnavailableBackend>::new(common::config_for(&path), "Front").unwrap();

    let camera = Arc::new(Camera { calls: AtomicUsize::new(0), warmup: 0 });
    assert!(session.start(camera).await.is_err());
    assert!(matches!(session.status(), SessionStatus::LoadFailed(_)));
    assert!(!session.is_running());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unread_results_do_not_pile_up() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_model(dir.path(), "parts.onnx", &front_model());
    let mut session = CaptureSession::<StubBackend>::new(common::config_for(&path), "Front").unwrap();

    let camera = Arc::new(Camera { calls: AtomicUsize::new(0), warmup: 0 });
    session.start(Arc::clone(&camera)).await.unwrap();

    // Twenty-odd ticks with nobody reading.
    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert!(camera.calls.load(Ordering::SeqCst) > 5);
    assert!(session.pending_results() <= 1);

    session.stop().await;
    assert_eq!(session.pending_results(), 1);
    let newest = session.results().try_recv().unwrap();
    assert!(newest.is_valid);
    assert!(session.results().try_recv().is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn crashed_cycle_is_reported_in_status() {
    let dir = tempfile::tempdir().unwrap();
    let model = StubModel { panics: true, ..front_model() };
    let path = common::write_model(dir.path(), "parts.onnx", &model);
    let mut session = CaptureSession::<StubBackend>::new(common::config_for(&path), "Front").unwrap();

    let camera = Arc::new(Camera { calls: AtomicUsize::new(0), warmup: 0 });
    session.start(camera).await.unwrap();

    let mut waited = 0;
    while session.is_running() && waited < 50 {
        tokio::time::sleep(Duration::from_millis(50)).await;
        waited += 1;
    }
    assert!(!session.is_running());
    assert!(matches!(session.status(), SessionStatus::CycleFailed(_)));
    assert!(session.latest_result().is_none());

    session.stop().await;
    assert_eq!(session.status(), SessionStatus::Stopped);
}
