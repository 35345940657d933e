use crossbeam_channel::{Receiver, Sender, TrySendError};
use crate::part_validation::ValidationResult;

/// Single-slot channel carrying validation results from the capture loop to
/// whoever renders the capture guidance. Only the newest result is kept.
#[derive(Debug, Clone)]
pub struct CycleChannels {
    pub result_tx: Sender<ValidationResult>,
    pub result_rx: Receiver<ValidationResult>,
}

impl CycleChannels {
    pub fn new() -> Self {
        let (result_tx, result_rx) = crossbeam_channel::bounded(1);
        Self { result_tx, result_rx }
    }

    /// Replaces any unread result with `result`.
    pub fn publish(&self, result: ValidationResult) {
        let mut pending = result;
        loop {
            match self.result_tx.try_send(pending) {
                Ok(()) | Err(TrySendError::Disconnected(_)) => return,
                Err(TrySendError::Full(back)) => {
                    let _ = self.result_rx.try_recv();
                    pending = back;
                }
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.result_rx.len()
    }
}

impl Default for CycleChannels {
    fn default() -> Self {
        Self::new()
    }
}
