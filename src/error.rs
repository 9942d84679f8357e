use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid dimension: {0}")]
  InvalidDimension(String),

  #[error("cannot put item because max number of items has been exceeded (max = {capacity})")]
  CapacityExceeded { capacity: usize },

  #[error("index ({row},{col}) is out of range for a {nrows}x{ncols} matrix")]
  IndexOutOfRange {
    row: usize,
    col: usize,
    nrows: usize,
    ncols: usize,
  },

  #[error("dimension mismatch: {0}")]
  DimensionMismatch(String),

  #[error("invalid set of known equations: {0}")]
  InvalidKnownSet(String),

  #[error("factorization or solve failed: {0}")]
  SingularOrFactorizationFailed(String),

  #[error("unknown solver `{0}`")]
  UnknownSolver(String),

  #[error("sparsity pattern mismatch: {0}")]
  PatternMismatch(String),

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
