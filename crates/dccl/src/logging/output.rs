// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Log output backends: console (stderr) and file.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::sync::Mutex;

/// Severity level for filtering and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Detailed development information.
    Debug = 0,
    /// Normal operation.
    Info = 1,
    /// Potentially harmful situations.
    Warning = 2,
    /// Error conditions.
    Error = 3,
}

impl LogLevel {
    /// Fixed-width tag for message prefixes.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO ",
            Self::Warning => "WARN ",
            Self::Error => "ERROR",
        }
    }
}

/// Destination for formatted log messages.
pub trait Output: Send + Sync {
    /// Write one message.
    fn write(&self, level: LogLevel, message: &str) -> io::Result<()>;

    /// Flush buffered output.
    fn flush(&self) -> io::Result<()>;
}

/// Writes to stderr with a level prefix.
pub struct ConsoleOutput {
    level_filter: LogLevel,
}

impl ConsoleOutput {
    /// Console output with a minimum level.
    pub fn new(level_filter: LogLevel) -> Self {
        Self { level_filter }
    }
}

impl Output for ConsoleOutput {
    fn write(&self, level: LogLevel, message: &str) -> io::Result<()> {
        if level < self.level_filter {
            return Ok(());
        }
        eprintln!("[{}] {}", level.as_str(), message);
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        io::stderr().flush()
    }
}

/// Appends to a file with a level prefix.
pub struct FileOutput {
    file: Mutex<std::fs::File>,
    level_filter: LogLevel,
}

impl FileOutput {
    /// Create (truncating) the log file at `path`.
    pub fn new(path: &str, level_filter: LogLevel) -> io::Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(Self {
            file: Mutex::new(file),
            level_filter,
        })
    }
}

impl Output for FileOutput {
    fn write(&self, level: LogLevel, message: &str) -> io::Result<()> {
        if level < self.level_filter {
            return Ok(());
        }
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("file output mutex poisoned"))?;
        writeln!(file, "[{}] {}", level.as_str(), message)
    }

    fn flush(&self) -> io::Result<()> {
        self.file
            .lock()
            .map_err(|_| io::Error::other("file output mutex poisoned"))?
            .flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_console_write() {
        let out = ConsoleOutput::new(LogLevel::Info);
        assert!(out.write(LogLevel::Error, "test").is_ok());
        assert!(out.write(LogLevel::Debug, "filtered").is_ok());
        assert!(out.flush().is_ok());
    }

    #[test]
    fn test_file_output() {
        let path = std::env::temp_dir().join("dccl_logging_test.log");
        let out = FileOutput::new(path.to_str().unwrap(), LogLevel::Debug).unwrap();
        assert!(out.write(LogLevel::Info, "a message").is_ok());
        assert!(out.flush().is_ok());
        let _ = std::fs::remove_file(path);
    }
}
