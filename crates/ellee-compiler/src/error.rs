//! Errors produced while compiling effects.

use std::path::PathBuf;
use std::time::Duration;

use ellee_locator::LocateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Install {0} first")]
    ToolchainMissing(String),

    #[error("--esphome must point to a checkout of https://github.com/esphome/esphome (looked in {0})")]
    CheckoutMissing(PathBuf),

    #[error(transparent)]
    Locate(#[from] LocateError),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {after:?}")]
    Timeout { program: String, after: Duration },

    #[error("Compilation failed: {status}\n{stderr}")]
    CompilerFailed { status: String, stderr: String },

    #[error("{program} exited with {status}")]
    ProcessFailed { program: String, status: String },

    #[error("formatting error")]
    Fmt(#[from] std::fmt::Error),
}

impl CompileError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CompileError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;
