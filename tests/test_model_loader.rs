extern crate inspect_detect;

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use inspect_detect::common::InspectError;
use inspect_detect::data::{EngineOptions, RawOutput, X};
use inspect_detect::detection_runners::{load_model, ModelBackend, ModelLoader};
use common::{hood_hit, StubBackend, StubModel, UnavailableBackend};

static BUILDS: AtomicUsize = AtomicUsize::new(0);

/// Counts how often a backend gets built.
#[derive(Debug)]
struct CountingBackend(StubBackend);

impl ModelBackend for CountingBackend {
    fn runtime_available(options: &EngineOptions) -> bool {
        StubBackend::runtime_available(options)
    }

    fn from_bytes(bytes: &[u8], options: &EngineOptions) -> Result<Self, InspectError> {
        BUILDS.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(50));
        StubBackend::from_bytes(bytes, options).map(Self)
    }

    fn run(&mut self, input: &X) -> Result<RawOutput, InspectError> {
        self.0.run(input)
    }
}

static POLLS: AtomicUsize = AtomicUsize::new(0);

/// Runtime that shows up on the third availability check.
#[derive(Debug)]
struct LateBackend(StubBackend);

impl ModelBackend for LateBackend {
    fn runtime_available(_options: &EngineOptions) -> bool {
        POLLS.fetch_add(1, Ordering::SeqCst) >= 2
    }

    fn from_bytes(bytes: &[u8], options: &EngineOptions) -> Result<Self, InspectError> {
        StubBackend::from_bytes(bytes, options).map(Self)
    }

    fn run(&mut self, input: &X) -> Result<RawOutput, InspectError> {
        self.0.run(input)
    }
}

/// Reports class names embedded in the model.
#[derive(Debug)]
struct NamedBackend(StubBackend);

impl ModelBackend for NamedBackend {
    fn runtime_available(_options: &EngineOptions) -> bool {
        true
    }

    fn from_bytes(bytes: &[u8], options: &EngineOptions) -> Result<Self, InspectError> {
        StubBackend::from_bytes(bytes, options).map(Self)
    }

    fn run(&mut self, input: &X) -> Result<RawOutput, InspectError> {
        self.0.run(input)
    }

    fn class_names(&self) -> Option<Vec<String>> {
        Some(vec!["hood".to_string(), "wheel".to_string()])
    }
}

fn hood_model() -> StubModel {
    StubModel { hits: vec![hood_hit()], transposed: false, delay_ms: 0, panics: false }
}

#[tokio::test]
async fn concurrent_loads_share_one_build() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_model(dir.path(), "parts.onnx", &hood_model());
    let loader = Arc::new(ModelLoader::<CountingBackend>::new(common::options_for(&path)));

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let loader = Arc::clone(&loader);
            tokio::spawn(async move { loader.load().await })
        })
        .collect();
    let mut handles = Vec::new();
    for task in tasks {
        handles.push(task.await.unwrap().unwrap());
    }

    assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
    assert!(handles.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert!(loader.is_ready());
}

#[tokio::test]
async fn failed_load_can_be_retried() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("late.onnx");
    let loader = ModelLoader::<StubBackend>::new(common::options_for(&path));

    match loader.load().await {
        Err(InspectError::ModelLoad(_)) => {}
        other => panic!("expected ModelLoad error, got {other:?}"),
    }
    assert!(!loader.is_ready());

    common::write_model(dir.path(), "late.onnx", &hood_model());
    assert!(loader.load().await.is_ok());
    assert!(loader.is_ready());
}

#[tokio::test]
async fn empty_model_file_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.onnx");
    std::fs::write(&path, b"").unwrap();

    let loader = ModelLoader::<StubBackend>::new(common::options_for(&path));
    assert!(matches!(loader.load().await, Err(InspectError::ModelLoad(_))));
}

#[tokio::test]
async fn unavailable_runtime_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_model(dir.path(), "parts.onnx", &hood_model());

    let loader = ModelLoader::<UnavailableBackend>::new(common::options_for(&path));
    assert!(matches!(loader.load().await, Err(InspectError::RuntimeUnavailable(_))));
}

#[tokio::test]
async fn runtime_is_polled_until_available() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_model(dir.path(), "parts.onnx", &hood_model());

    let options = common::options_for(&path).with_runtime_wait(Duration::from_secs(5));
    let handle = load_model::<LateBackend>(&options).await.unwrap();
    assert!(handle.is_ready());
    assert!(POLLS.load(Ordering::SeqCst) >= 3);
}

#[tokio::test]
async fn embedded_names_must_match_configured_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_model(dir.path(), "parts.onnx", &hood_model());

    let result = load_model::<NamedBackend>(&common::options_for(&path)).await;
    assert!(matches!(result, Err(InspectError::ModelLoad(_))));

    let options = common::options_for(&path).with_names(&["hood", "wheel"]);
    let handle = load_model::<NamedBackend>(&options).await.unwrap();
    assert_eq!(handle.names(), &["hood".to_string(), "wheel".to_string()]);
}

#[tokio::test]
async fn disposed_handle_is_not_ready() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_model(dir.path(), "parts.onnx", &hood_model());
    let mut loader = ModelLoader::<StubBackend>::new(common::options_for(&path));

    let handle = loader.load().await.unwrap();
    let x = X::from_shape_vec(&[1, 640, 640, 3], vec![0.0; 640 * 640 * 3]).unwrap();
    assert!(handle.infer(&x).is_ok());

    loader.dispose();
    assert!(!loader.is_ready());
    assert!(!handle.is_ready());
    assert!(matches!(handle.infer(&x), Err(InspectError::NotReady)));
}

#[tokio::test]
async fn overlapping_inference_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let slow = StubModel { hits: vec![hood_hit()], transposed: false, delay_ms: 300, panics: false };
    let path = common::write_model(dir.path(), "slow.onnx", &slow);
    let loader = ModelLoader::<StubBackend>::new(common::options_for(&path));
    let handle = loader.load().await.unwrap();

    let x = X::from_shape_vec(&[1, 640, 640, 3], vec![0.0; 640 * 640 * 3]).unwrap();
    let (first, second) = std::thread::scope(|s| {
        let busy = s.spawn(|| handle.infer(&x));
        while !handle.is_busy() {
            std::thread::yield_now();
        }
        let rejected = handle.infer(&x);
        (busy.join().unwrap(), rejected)
    });

    assert!(first.is_ok());
    assert!(matches!(second, Err(InspectError::CycleInFlight)));
    assert!(!handle.is_busy());
}
