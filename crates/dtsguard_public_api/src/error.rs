use std::path::PathBuf;

use dtsguard_core::FrontEndError;
use thiserror::Error;

/// Hard failures of a public API run. Any of these aborts the run.
#[derive(Error, Debug)]
pub enum PublicApiError {
    #[error("not a declaration file: {}", .path.display())]
    NotADeclarationFile { path: PathBuf },

    #[error("entry file not found: {}", .path.display())]
    EntryFileNotFound { path: PathBuf },

    #[error(
        "module identifier '{identifier}' is not allowed ({}:{line}:{column}); add it to the allowed module identifiers",
        .file.display()
    )]
    UnlistedModuleIdentifier { identifier: String, file: PathBuf, line: usize, column: usize },

    #[error("'{alias}' re-exports '{target}' under a different name, renamed re-exports are not supported")]
    AliasRenamed { alias: String, target: String },

    #[error("invalid strip export pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error(transparent)]
    FrontEnd(#[from] FrontEndError),
}

/// Convenience alias for results using `PublicApiError`.
pub type Result<T> = std::result::Result<T, PublicApiError>;
