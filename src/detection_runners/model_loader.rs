//! Lifecycle-scoped ownership of the loaded detection model.
//!
//! A [`ModelLoader`] is created by whoever owns the capture screen. It loads
//! the model at most once (concurrent callers share the in-flight load), hands
//! out a shared [`ModelHandle`], and releases the backend on `dispose`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tokio::time::Instant;
use crate::common::InspectError;
use crate::data::{EngineOptions, X};
use crate::detection_runners::ort_detector::raw_output::{PredictionTensor, RawOutput};

const RUNTIME_POLL: Duration = Duration::from_millis(100);

/// A runtime able to execute the detection model.
pub trait ModelBackend: Send + Sized + 'static {
    /// Whether the native runtime can be used yet. Polled until
    /// `EngineOptions::runtime_wait` runs out.
    fn runtime_available(options: &EngineOptions) -> bool;

    /// Builds the backend from the complete model file held in memory.
    fn from_bytes(bytes: &[u8], options: &EngineOptions) -> Result<Self, InspectError>;

    fn run(&mut self, input: &X) -> Result<RawOutput, InspectError>;

    /// Class names embedded in the model, if any.
    fn class_names(&self) -> Option<Vec<String>> {
        None
    }
}

/// Shared handle to a loaded model. Cheap to clone through `Arc`.
#[derive(Debug)]
pub struct ModelHandle<B> {
    backend: Mutex<Option<B>>,
    in_flight: AtomicBool,
    names: Vec<String>,
    input_size: u32,
    channels: usize,
    anchors: usize,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, InspectError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| InspectError::CycleInFlight)?;
        Ok(Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<B: ModelBackend> ModelHandle<B> {
    pub fn new(backend: B, names: Vec<String>, options: &EngineOptions) -> Self {
        Self {
            backend: Mutex::new(Some(backend)),
            in_flight: AtomicBool::new(false),
            names,
            input_size: options.input_size,
            channels: options.output_channels,
            anchors: options.anchors,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.backend.lock().is_some()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn input_size(&self) -> u32 {
        self.input_size
    }

    /// Runs the model and normalizes its output to `[1, C, A]`.
    ///
    /// Fails with `CycleInFlight` if another call is still running on this
    /// handle and with `NotReady` once the handle has been disposed.
    pub fn infer(&self, input: &X) -> Result<PredictionTensor, InspectError> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;
        let mut backend = self.backend.lock();
        let engine = backend.as_mut().ok_or(InspectError::NotReady)?;
        let raw = engine.run(input)?;
        raw.normalize(self.channels, self.anchors)
    }

    /// Drops the backend and the native buffers behind it.
    pub fn dispose(&self) {
        if self.backend.lock().take().is_some() {
            log::info!("Model disposed");
        }
    }
}

#[derive(Debug)]
pub struct ModelLoader<B: ModelBackend> {
    options: EngineOptions,
    cell: OnceCell<Arc<ModelHandle<B>>>,
}

impl<B: ModelBackend> ModelLoader<B> {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            options,
            cell: OnceCell::new(),
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Loads the model, or returns the already loaded handle. Concurrent callers
    /// await the same load. A failed load leaves nothing cached, so calling
    /// again retries.
    pub async fn load(&self) -> Result<Arc<ModelHandle<B>>, InspectError> {
        self.cell
            .get_or_try_init(|| load_model::<B>(&self.options))
            .await
            .map(Arc::clone)
    }

    pub fn get(&self) -> Option<Arc<ModelHandle<B>>> {
        self.cell.get().cloned()
    }

    pub fn is_ready(&self) -> bool {
        self.cell.get().is_some_and(|h| h.is_ready())
    }

    pub fn dispose(&mut self) {
        if let Some(handle) = self.cell.take() {
            handle.dispose();
        }
    }
}

impl<B: ModelBackend> Drop for ModelLoader<B> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Loads a model outside any [`ModelLoader`]. The caller owns the handle.
pub async fn load_model<B: ModelBackend>(options: &EngineOptions) -> Result<Arc<ModelHandle<B>>, InspectError> {
    wait_for_runtime::<B>(options).await?;

    let path = options.model_path.clone();
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| InspectError::ModelLoad(format!("{}: {e}", path.display())))?;
    if bytes.is_empty() {
        return Err(InspectError::ModelLoad(format!("{} is empty", path.display())));
    }

    let opts = options.clone();
    let backend = tokio::task::spawn_blocking(move || B::from_bytes(&bytes, &opts))
        .await
        .map_err(|e| InspectError::ModelLoad(format!("Model build task failed: {e}")))??;

    let names = resolve_names(backend.class_names(), &options.names)?;
    log::info!(
        "Model loaded from {} | Device: {} | Classes: {} | Input: {}x{}",
        path.display(), options.device, names.len(), options.input_size, options.input_size
    );

    Ok(Arc::new(ModelHandle::new(backend, names, options)))
}

async fn wait_for_runtime<B: ModelBackend>(options: &EngineOptions) -> Result<(), InspectError> {
    let start = Instant::now();
    loop {
        let opts = options.clone();
        let available = tokio::task::spawn_blocking(move || B::runtime_available(&opts))
            .await
            .unwrap_or(false);
        if available {
            return Ok(());
        }
        if start.elapsed() >= options.runtime_wait {
            return Err(InspectError::RuntimeUnavailable(options.runtime_wait));
        }
        tokio::time::sleep(RUNTIME_POLL).await;
    }
}

// Configured names win; names embedded in the model only have to agree in count.
fn resolve_names(parsed: Option<Vec<String>>, configured: &[String]) -> Result<Vec<String>, InspectError> {
    match parsed {
        Some(parsed) if parsed.len() != configured.len() => Err(InspectError::ModelLoad(format!(
            "The lengths of parsed class names: {} and configured class names: {} do not match.",
            parsed.len(),
            configured.len(),
        ))),
        _ => Ok(configured.to_vec()),
    }
}
