use thiserror::Error;

/// Collaborator-facing failures.
///
/// The parser and both analysis pipelines never error on messy input:
/// unparseable lines are dropped and missing-field fixtures hard-stop
/// as data, not exceptions. `CoreError` only covers re-derivation from
/// stored history, where a config snapshot may no longer decode.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("config snapshot decode failed: {0}")]
    ConfigSnapshot(#[from] serde_json::Error),

    #[error("recompute failed: {0}")]
    Recompute(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
