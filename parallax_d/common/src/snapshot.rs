use api::PoseSample;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Copy, Default)]
struct Published {
    sample: PoseSample,
    sequence: u64,
}

/// Latest published pose, shared between the sampling and render loops.
///
/// There is one writer. Readers copy the value out under the read lock, so a
/// sample is never observed half-written.
#[derive(Debug, Clone, Default)]
pub struct PoseChannel {
    inner: Arc<RwLock<Published>>,
}

impl PoseChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, sample: PoseSample) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        guard.sample = sample;
        guard.sequence += 1;
    }

    /// Neutral pose until the first publish.
    pub fn latest(&self) -> PoseSample {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).sample
    }

    /// Number of publishes so far; readers compare it to skip stale frames.
    pub fn sequence(&self) -> u64 {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).sequence
    }

    pub fn has_sample(&self) -> bool {
        self.sequence() > 0
    }
}
