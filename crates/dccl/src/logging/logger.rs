// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Global logger instance.
//!
//! Lazily initialized singleton; before [`init_logger`] runs, every log
//! call is a silent no-op.

use super::output::{LogLevel, Output};
use std::io;
use std::sync::{Arc, Mutex, OnceLock};

static LOGGER: OnceLock<Arc<Mutex<GlobalLogger>>> = OnceLock::new();

struct GlobalLogger {
    output: Arc<dyn Output>,
    level_filter: LogLevel,
}

impl GlobalLogger {
    fn log(&self, level: LogLevel, message: &str) -> io::Result<()> {
        if level < self.level_filter {
            return Ok(());
        }
        self.output.write(level, message)
    }
}

/// Install the global logger.
///
/// Only the first call takes effect; later calls are ignored.
pub fn init_logger(output: Arc<dyn Output>, level: LogLevel) {
    let _ = LOGGER.get_or_init(|| {
        Arc::new(Mutex::new(GlobalLogger {
            output,
            level_filter: level,
        }))
    });
}

/// Route one message through the global logger (called by the macros).
#[doc(hidden)]
pub fn log_message(level: LogLevel, message: &str) -> io::Result<()> {
    match LOGGER.get() {
        Some(logger) => logger
            .lock()
            .map_err(|_| io::Error::other("global logger mutex poisoned"))?
            .log(level, message),
        None => Ok(()),
    }
}

/// Flush the global logger's output; safe before initialization.
pub fn flush_logger() -> io::Result<()> {
    match LOGGER.get() {
        Some(logger) => logger
            .lock()
            .map_err(|_| io::Error::other("global logger mutex poisoned"))?
            .output
            .flush(),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::ConsoleOutput;

    #[test]
    fn test_log_before_init_is_noop() {
        assert!(log_message(LogLevel::Info, "nobody listening").is_ok());
        assert!(flush_logger().is_ok());
    }

    #[test]
    fn test_init_and_log() {
        init_logger(Arc::new(ConsoleOutput::new(LogLevel::Warning)), LogLevel::Warning);
        assert!(log_message(LogLevel::Debug, "filtered").is_ok());
        assert!(log_message(LogLevel::Error, "passes").is_ok());
    }
}
