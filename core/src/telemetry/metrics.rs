use std::sync::Mutex;

/// Counters for layer loads, shared between the controller and whoever reports on it.
pub struct LoadMetrics {
    inner: Mutex<LoadSnapshot>,
}

/// Point-in-time copy of the load counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSnapshot {
    pub loaded: usize,
    pub empty: usize,
    pub failed: usize,
}

impl LoadSnapshot {
    pub fn attempts(&self) -> usize {
        self.loaded + self.empty + self.failed
    }
}

impl LoadMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(LoadSnapshot::default()),
        }
    }

    pub fn record_loaded(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.loaded += 1;
        }
    }

    pub fn record_empty(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.empty += 1;
        }
    }

    pub fn record_failed(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.failed += 1;
        }
    }

    pub fn snapshot(&self) -> LoadSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            LoadSnapshot::default()
        }
    }
}

impl Default for LoadMetrics {
    fn default() -> Self {
        Self::new()
    }
}
