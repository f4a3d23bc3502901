use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Custom error type for the monitoring engine
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Metric collection failed: {0}")]
    Collection(String),

    #[error("Cannot read log file {path:?}: {source}")]
    LogAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("State file is corrupt: {0}")]
    StateCorruption(String),

    #[error("Failed to write state file {path:?}: {source}")]
    StateWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Alert dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Notification delivery failures, returned by `AlertDispatcher::send`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("invalid message: {0}")]
    Message(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Result type alias for the monitoring engine
pub type Result<T> = std::result::Result<T, MonitorError>;

impl MonitorError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        MonitorError::Config(msg.into())
    }

    pub fn collection<S: Into<String>>(msg: S) -> Self {
        MonitorError::Collection(msg.into())
    }

    pub fn state_corruption<S: Into<String>>(msg: S) -> Self {
        MonitorError::StateCorruption(msg.into())
    }
}

impl DispatchError {
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        DispatchError::Transport(msg.into())
    }

    pub fn message<S: Into<String>>(msg: S) -> Self {
        DispatchError::Message(msg.into())
    }
}
