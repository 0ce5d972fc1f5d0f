use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::api::ShaderStage;

/// GPU object creation failure.
#[derive(Debug, Error)]
pub enum GlError {
    #[error("failed to create {object}: {message}")]
    Create {
        object: &'static str,
        message: String,
    },
}

/// Failure while building a shader program.
///
/// Every variant is fatal to the build it came from; the builder releases
/// whatever GPU objects it created before reporting.
#[derive(Debug, Error)]
pub enum ShaderError {
    /// Source file could not be opened or read.
    #[error("failed to read {stage} source {}: {source}", .path.display())]
    Io {
        stage: ShaderStage,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Fewer or more bytes were read than the file reported.
    #[error("short read on {}: expected {expected} bytes, read {read}", .path.display())]
    LengthMismatch {
        path: PathBuf,
        expected: u64,
        read: u64,
    },

    #[error("{0} was already added to this program")]
    DuplicateStage(ShaderStage),

    #[error("failed to create {stage}: {message}")]
    CreateShader { stage: ShaderStage, message: String },

    #[error("failed to compile {stage}: {log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("failed to create program: {0}")]
    CreateProgram(String),

    #[error("shader failed to link: {0}")]
    Link(String),

    #[error("no shader stages were added")]
    NoStages,

    #[error("program has not been linked")]
    NotLinked,

    #[error("program is already linked")]
    AlreadyLinked,
}
