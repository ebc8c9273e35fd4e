use std::path::PathBuf;

use thiserror::Error;

use super::{SourceLanguage, Stage};

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to read shader asset {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{name}:{line}:{column}: {message}")]
    Compile {
        name: String,
        /// 1-based; 0 when the compiler reported no location.
        line: u32,
        column: u32,
        message: String,
    },

    #[error("{name}: no {stage:?} entry point named `{entry_point}`")]
    MissingEntryPoint {
        name: String,
        entry_point: String,
        stage: Stage,
    },

    #[error("{name}: {language:?} source cannot be compiled by this backend")]
    WrongLanguage {
        name: String,
        language: SourceLanguage,
    },
}
