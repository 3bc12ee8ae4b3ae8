//! Process-wide severity gate for engine diagnostics.
//!
//! Records pass the gate iff their level is at or below the configured one
//! and the gate is not [`LogLevel::None`]; accepted records are forwarded as
//! `tracing` events with target `trustpin`, so whatever subscriber the host
//! application installs renders them with its own timestamp format.

use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

/// Diagnostic verbosity, ordered `None < Error < Info < Debug`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    None = 0,
    Error = 1,
    Info = 2,
    Debug = 3,
}

static CURRENT: AtomicU8 = AtomicU8::new(LogLevel::Error as u8);

/// Set the process-wide log level.
pub fn set_log_level(level: LogLevel) {
    CURRENT.store(level as u8, Ordering::Relaxed);
}

/// The current process-wide log level.
pub fn log_level() -> LogLevel {
    match CURRENT.load(Ordering::Relaxed) {
        0 => LogLevel::None,
        1 => LogLevel::Error,
        2 => LogLevel::Info,
        _ => LogLevel::Debug,
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "error" => Ok(Self::Error),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

pub(crate) fn enabled(level: LogLevel) -> bool {
    let current = log_level();
    current != LogLevel::None && level <= current
}

pub(crate) fn error(message: &str) {
    if enabled(LogLevel::Error) {
        tracing::error!(target: "trustpin", "{message}");
    }
}

pub(crate) fn info(message: &str) {
    if enabled(LogLevel::Info) {
        tracing::info!(target: "trustpin", "{message}");
    }
}

pub(crate) fn debug(message: &str) {
    if enabled(LogLevel::Debug) {
        tracing::debug!(target: "trustpin", "{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(LogLevel::None < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Debug);
    }

    #[test]
    fn gate_honors_current_level() {
        set_log_level(LogLevel::Info);
        assert!(enabled(LogLevel::Error));
        assert!(enabled(LogLevel::Info));
        assert!(!enabled(LogLevel::Debug));

        set_log_level(LogLevel::None);
        assert!(!enabled(LogLevel::Error));

        set_log_level(LogLevel::Error);
    }

    #[test]
    fn parses_level_names() {
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("ERROR".parse::<LogLevel>().unwrap(), LogLevel::Error);
        assert_eq!("None".parse::<LogLevel>().unwrap(), LogLevel::None);
        assert!("verbose".parse::<LogLevel>().is_err());
    }
}
