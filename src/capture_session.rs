//! Periodic detection loop bound to one capture screen.
//!
//! The session owns the model for as long as the screen is open: `start`
//! loads it, a tokio interval drives one cycle per tick, and `stop` ends the
//! loop and disposes the model. Each cycle grabs the newest frame, runs the
//! detector on a blocking thread, validates against the current position and
//! publishes the [`ValidationResult`].

use std::sync::Arc;
use std::time::Duration;
use crossbeam_channel::Receiver;
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use crate::common::{InspectError, InspectionFrame, ModelConfig};
use crate::data::CycleChannels;
use crate::detection_runners::{ModelBackend, ModelLoader, OrtEngine, PartDetector};
use crate::part_validation::{self, ValidationResult};

/// Supplies the newest frame from the camera preview. `None` while the
/// video surface has no data yet.
pub trait FrameSource: Send + Sync + 'static {
    fn latest_frame(&self) -> Option<InspectionFrame>;
}

impl<F> FrameSource for F
where
    F: Fn() -> Option<InspectionFrame> + Send + Sync + 'static,
{
    fn latest_frame(&self) -> Option<InspectionFrame> {
        self()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Loading,
    Ready,
    LoadFailed(String),
    /// The cycle loop ended on its own after a detection task crashed.
    CycleFailed(String),
    Stopped,
}

struct CycleLoop<B: ModelBackend, S> {
    detector: PartDetector<B>,
    source: Arc<S>,
    position: Arc<RwLock<String>>,
    latest: Arc<Mutex<Option<ValidationResult>>>,
    status: Arc<Mutex<SessionStatus>>,
    channels: CycleChannels,
    interval: Duration,
}

pub struct CaptureSession<B: ModelBackend = OrtEngine> {
    config: ModelConfig,
    loader: ModelLoader<B>,
    position: Arc<RwLock<String>>,
    status: Arc<Mutex<SessionStatus>>,
    latest: Arc<Mutex<Option<ValidationResult>>>,
    channels: CycleChannels,
    shutdown: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

impl<B: ModelBackend> CaptureSession<B> {
    pub fn new(config: ModelConfig, position: &str) -> Result<Self, InspectError> {
        config.validate()?;
        let loader = ModelLoader::new(config.engine_options()?);

        Ok(Self {
            config,
            loader,
            position: Arc::new(RwLock::new(position.to_string())),
            status: Arc::new(Mutex::new(SessionStatus::Idle)),
            latest: Arc::new(Mutex::new(None)),
            channels: CycleChannels::new(),
            shutdown: None,
            task: None,
        })
    }

    pub fn status(&self) -> SessionStatus {
        self.status.lock().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.loader.is_ready()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn position(&self) -> String {
        self.position.read().clone()
    }

    /// Changes the position subsequent cycles validate against.
    pub fn set_position(&self, position: &str) {
        *self.position.write() = position.to_string();
    }

    /// Receiver for the newest unread cycle result. A result nobody reads
    /// is replaced by the next one.
    pub fn results(&self) -> Receiver<ValidationResult> {
        self.channels.result_rx.clone()
    }

    /// Number of published results not yet received, at most one.
    pub fn pending_results(&self) -> usize {
        self.channels.pending()
    }

    pub fn latest_result(&self) -> Option<ValidationResult> {
        self.latest.lock().clone()
    }

    /// Loads the model (once) and starts the cycle loop. Calling `start`
    /// while a loop is running is a no-op.
    pub async fn start<S: FrameSource>(&mut self, source: Arc<S>) -> Result<(), InspectError> {
        if self.is_running() {
            return Ok(());
        }

        *self.status.lock() = SessionStatus::Loading;
        let handle = match self.loader.load().await {
            Ok(handle) => handle,
            Err(err) => {
                log::error!("Capture session could not load the model: {err}");
                *self.status.lock() = SessionStatus::LoadFailed(err.to_string());
                return Err(err);
            }
        };
        *self.status.lock() = SessionStatus::Ready;

        let cycle = CycleLoop {
            detector: PartDetector::new(handle, &self.config),
            source,
            position: Arc::clone(&self.position),
            latest: Arc::clone(&self.latest),
            status: Arc::clone(&self.status),
            channels: self.channels.clone(),
            interval: self.config.inference_interval(),
        };
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        self.shutdown = Some(shutdown_tx);
        self.task = Some(tokio::spawn(cycle.run(shutdown_rx)));

        log::info!(
            "Capture session started | Position: {} | Interval: {:?}",
            self.position(), self.config.inference_interval()
        );
        Ok(())
    }

    /// Ends the cycle loop, waits for an in-flight cycle to finish and
    /// releases the model.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(true);
        }
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                log::warn!("Capture loop ended abnormally: {err}");
            }
        }
        self.loader.dispose();
        *self.status.lock() = SessionStatus::Stopped;
        log::info!("Capture session stopped");
    }
}

impl<B: ModelBackend> Drop for CaptureSession<B> {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(true);
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl<B: ModelBackend, S: FrameSource> CycleLoop<B, S> {
    async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {}
            }
            if *shutdown.borrow() {
                break;
            }
            if !self.detector.is_ready() {
                log::warn!("Model no longer ready, ending capture loop");
                *self.status.lock() = SessionStatus::Stopped;
                break;
            }

            let Some(frame) = self.source.latest_frame() else {
                log::trace!("No frame available, skipping cycle");
                continue;
            };
            if frame.width() == 0 || frame.height() == 0 {
                log::trace!("Video surface not ready, skipping cycle");
                continue;
            }

            let detector = self.detector;
            let joined = tokio::task::spawn_blocking(move || {
                let mut detector = detector;
                let result = detector.detect(&frame);
                (detector, result)
            })
            .await;

            let detections = match joined {
                Ok((detector, result)) => {
                    self.detector = detector;
                    match result {
                        Ok(detections) => detections,
                        Err(err) => {
                            log::error!("Detection cycle failed: {err}");
                            Vec::new()
                        }
                    }
                }
                Err(err) => {
                    log::error!("Detection task panicked: {err}");
                    *self.status.lock() = SessionStatus::CycleFailed(err.to_string());
                    break;
                }
            };

            let position = self.position.read().clone();
            let result = part_validation::validate(&position, detections);
            log::debug!("{} | valid: {} | parts: {:?}", position, result.is_valid, result.detected_parts);

            *self.latest.lock() = Some(result.clone());
            self.channels.publish(result);
        }
    }
}
