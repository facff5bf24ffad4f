use std::collections::TryReserveError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("failed to allocate a directory of {slots} slots")]
    AllocFailed {
        slots: usize,
        #[source]
        source: TryReserveError,
    },
    #[error("{requested} entries exceed the maximum directory capacity")]
    CapacityOverflow { requested: usize },
}
