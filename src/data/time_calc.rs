use std::time::Duration;

/// Accumulated per-stage timings of the inference cycle
/// (index 0 = preprocess, 1 = inference, 2 = postprocess).
#[derive(Debug, Default, Clone)]
pub struct TimeCalc {
    runs: usize,
    stages: Vec<Duration>,
}

#[allow(dead_code)]
impl TimeCalc {
    pub fn add_or_push(&mut self, stage: usize, x: Duration) {
        match self.stages.get_mut(stage) {
            Some(elem) => *elem += x,
            None => {
                self.stages.resize(stage, Duration::ZERO);
                self.stages.push(x);
            }
        }
    }

    /// Marks the end of one full cycle.
    pub fn finish_run(&mut self) {
        self.runs += 1;
    }

    pub fn runs(&self) -> usize {
        self.runs
    }

    pub fn total(&self) -> Duration {
        self.stages.iter().sum::<Duration>()
    }

    pub fn avg(&self) -> Duration {
        if self.runs == 0 {
            return Duration::ZERO;
        }
        self.total() / self.runs as u32
    }

    pub fn avg_i(&self, stage: usize) -> Duration {
        match self.stages.get(stage) {
            Some(d) if self.runs > 0 => *d / self.runs as u32,
            _ => Duration::ZERO,
        }
    }

    pub fn clear(&mut self) {
        self.runs = 0;
        self.stages.clear();
    }
}
