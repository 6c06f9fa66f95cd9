use crate::prelude::Observer;
use log::{debug, info, warn};

/// Observer that forwards everything to the `log` facade.
pub struct LogManager {
    target: &'static str,
}

impl LogManager {
    pub fn new() -> Self {
        Self::with_target("georefcore")
    }

    pub fn with_target(target: &'static str) -> Self {
        Self { target }
    }

    pub fn record(&self, message: &str) {
        info!(target: self.target, "{}", message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for LogManager {
    fn debug(&self, message: &str) {
        debug!(target: self.target, "{}", message);
    }

    fn info(&self, message: &str) {
        self.record(message);
    }

    fn warn(&self, message: &str) {
        warn!(target: self.target, "{}", message);
    }
}
