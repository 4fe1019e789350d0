use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building the intermediate model.
///
/// Any of these aborts the whole run; no partial model is returned.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Failed to read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to list directory `{path}`: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load the Go grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),

    #[error("Failed to parse `{path}`")]
    ParseFailed { path: PathBuf },

    #[error("Syntax error in `{path}` at line {line}, column {column}")]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
    },

    #[error("`{path}` has no package clause")]
    MissingPackage { path: PathBuf },

    #[error("Entry path `{path}` has no parent directory")]
    NoParentDirectory { path: PathBuf },
}

/// Errors raised while rendering one artifact.
///
/// These stop the artifact being rendered; other artifacts are still attempted.
#[derive(Debug, Error)]
pub enum EmissionError {
    #[error("No primary interface was found in the root package")]
    NoPrimaryInterface,

    #[error("Template `{template}` references unknown placeholder `{placeholder}`")]
    UnresolvedPlaceholder {
        template: &'static str,
        placeholder: String,
    },

    #[error("Template `{template}` has an unterminated placeholder")]
    UnterminatedPlaceholder { template: &'static str },

    #[error("{owner} has a member without a name")]
    UnnamedMember { owner: String },
}

/// Errors raised while persisting an artifact.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output file '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Umbrella error for the generation pipeline.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Failed to emit {artifact}: {source}")]
    Emission {
        artifact: &'static str,
        #[source]
        source: EmissionError,
    },

    #[error(transparent)]
    Output(#[from] OutputError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}
