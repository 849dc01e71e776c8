use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("malformed dataset: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("dataset contains no nodes")]
    NoNodes,
    #[error("failed to read dataset {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("color `{0}` is not a #rgb or #rrggbb hex value")]
    BadFormat(String),
}
