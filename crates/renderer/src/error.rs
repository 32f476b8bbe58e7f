use std::path::PathBuf;

use shadergen::Stage;

use crate::cache::ProgramId;

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to read shader at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to compile {stage} stage '{name}':\n{log}")]
    Compile {
        name: String,
        stage: Stage,
        log: String,
        /// The text handed to the driver.
        code: String,
    },
    #[error("failed to link program '{name}':\n{log}")]
    Link { name: String, log: String },
    #[error("no program with id {0}")]
    UnknownProgram(ProgramId),
}
