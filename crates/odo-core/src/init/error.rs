//! Selection error conditions

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("unable to determine the devfile location")]
    NoDevfileLocation,

    #[error("starter project {0:?} not found in devfile")]
    StarterProjectNotFound(String),
}
