use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading and parsing declaration files.
#[derive(Error, Debug)]
pub enum FrontEndError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}
