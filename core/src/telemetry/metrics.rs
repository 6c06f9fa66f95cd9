use crate::prelude::Observer;
use crate::telemetry::log::LogManager;
use serde::Serialize;
use std::sync::Mutex;

/// Observer that counts processed frames, projected objects and warnings before
/// forwarding messages to a [`LogManager`].
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
    logger: LogManager,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub frames: usize,
    pub objects: usize,
    pub warnings: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
            logger: LogManager::new(),
        }
    }

    pub fn snapshot(&self) -> Metrics {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            Metrics::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for MetricsRecorder {
    fn debug(&self, message: &str) {
        self.logger.debug(message);
    }

    fn info(&self, message: &str) {
        self.logger.info(message);
    }

    fn warn(&self, message: &str) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.warnings += 1;
        }
        self.logger.warn(message);
    }

    fn record_frame(&self, objects: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.frames += 1;
            metrics.objects += objects;
        }
    }
}
