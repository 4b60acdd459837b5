use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::metrics::MetricsSnapshot;
use super::mode::SamplingMode;

/// The single shared snapshot, guarded by one mutex.
///
/// Every write (collector updates and mode changes) and every multi-field
/// read goes through the same lock, so readers never see a half-applied
/// update. Clones share the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct SharedSnapshot {
    inner: Arc<Mutex<MetricsSnapshot>>,
}

impl SharedSnapshot {
    pub fn new(snapshot: MetricsSnapshot) -> Self {
        Self {
            inner: Arc::new(Mutex::new(snapshot)),
        }
    }

    pub fn with_mode(mode: SamplingMode) -> Self {
        Self::new(MetricsSnapshot::with_mode(mode))
    }

    /// Run `f` against the snapshot while holding the lock.
    pub fn read<T>(&self, f: impl FnOnce(&MetricsSnapshot) -> T) -> T {
        f(&*self.inner.lock())
    }

    /// Mutate the snapshot while holding the lock.
    pub fn update<T>(&self, f: impl FnOnce(&mut MetricsSnapshot) -> T) -> T {
        f(&mut *self.inner.lock())
    }

    /// Consistent copy of the whole snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.read(|s| s.clone())
    }

    pub fn set_mode(&self, mode: SamplingMode) {
        self.update(|s| s.set_mode(mode));
        log::debug!("Sampling mode set to {}", mode);
    }

    pub fn mode(&self) -> SamplingMode {
        self.read(|s| s.mode)
    }

    /// Interval the collector should sleep for right now.
    pub fn poll_interval(&self) -> Duration {
        self.read(|s| Duration::from_secs_f64(s.poll_interval_secs.max(0.0)))
    }
}
