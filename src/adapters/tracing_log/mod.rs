// Tracing log adapter - LogPort on top of the tracing macros

use tracing::{debug, error, info, warn};

use crate::ports::*;

/// Forwards port messages to the installed tracing subscriber
#[derive(Debug, Clone)]
pub struct TracingLogAdapter {
    min_level: LogLevel,
}

impl TracingLogAdapter {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }

    fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }
}

impl Default for TracingLogAdapter {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

impl LogPort for TracingLogAdapter {
    fn info(&self, message: &str) {
        if self.enabled(LogLevel::Info) {
            info!("{}", message);
        }
    }

    fn warn(&self, message: &str) {
        if self.enabled(LogLevel::Warn) {
            warn!("{}", message);
        }
    }

    fn error(&self, message: &str) {
        if self.enabled(LogLevel::Error) {
            error!("{}", message);
        }
    }

    fn debug(&self, message: &str) {
        if self.enabled(LogLevel::Debug) {
            debug!("{}", message);
        }
    }
}
