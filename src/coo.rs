//! Coordinate (triplet) format builder.

use crate::{
  csc::CscMatrix,
  error::{Error, Result},
};

use common::{linalg::nalgebra::Matrix, Complex64, Scalar};

/// Append-only list of `(row, col, value)` entries with a fixed capacity.
///
/// Duplicate entries are legal and are summed when the builder is compiled
/// into a [`CscMatrix`]. No aggregation happens at insertion time.
#[derive(Debug, Clone)]
pub struct CooMatrix<T = f64> {
  nrows: usize,
  ncols: usize,
  capacity: usize,
  triplets: Vec<(usize, usize, T)>,
}

impl<T: Scalar> CooMatrix<T> {
  /// Allocates a builder for an `nrows x ncols` matrix holding up to `capacity` entries.
  pub fn new(nrows: usize, ncols: usize, capacity: usize) -> Result<Self> {
    if nrows < 1 || ncols < 1 {
      return Err(Error::InvalidDimension(format!(
        "a {nrows}x{ncols} triplet matrix must have at least one row and one column"
      )));
    }
    Ok(Self::with_shape(nrows, ncols, capacity))
  }

  /// Same as [`Self::new`] but allows empty dimensions,
  /// as needed for the blocks of a partition without known (or unknown) equations.
  pub(crate) fn with_shape(nrows: usize, ncols: usize, capacity: usize) -> Self {
    Self {
      nrows,
      ncols,
      capacity,
      triplets: Vec::with_capacity(capacity),
    }
  }

  pub fn nrows(&self) -> usize {
    self.nrows
  }
  pub fn ncols(&self) -> usize {
    self.ncols
  }
  pub fn capacity(&self) -> usize {
    self.capacity
  }
  /// Number of entries inserted since the last reset, repetitions included.
  pub fn len(&self) -> usize {
    self.triplets.len()
  }
  pub fn is_empty(&self) -> bool {
    self.triplets.is_empty()
  }
  pub fn triplets(&self) -> &[(usize, usize, T)] {
    &self.triplets
  }

  /// Appends an entry without checking its indices.
  #[inline]
  pub fn put(&mut self, r: usize, c: usize, v: T) -> Result<()> {
    if self.triplets.len() >= self.capacity {
      return Err(Error::CapacityExceeded {
        capacity: self.capacity,
      });
    }
    self.triplets.push((r, c, v));
    Ok(())
  }

  /// Appends an entry after checking that `(r, c)` lies inside the matrix.
  pub fn put_checked(&mut self, r: usize, c: usize, v: T) -> Result<()> {
    if r >= self.nrows || c >= self.ncols {
      return Err(Error::IndexOutOfRange {
        row: r,
        col: c,
        nrows: self.nrows,
        ncols: self.ncols,
      });
    }
    self.put(r, c, v)
  }

  /// Restarts insertion. The allocated storage is kept.
  pub fn reset(&mut self) {
    self.triplets.clear();
  }

  /// Re-initialises `self` as an `n x n` matrix with `v` on the diagonal.
  pub fn set_diagonal(&mut self, n: usize, v: T) -> Result<()> {
    *self = Self::new(n, n, n)?;
    for i in 0..n {
      self.put(i, i, v)?;
    }
    Ok(())
  }

  /// Puts `a` and its transpose into `self` as the off-diagonal blocks
  /// `[. aᵀ; a .]`, with `a` starting at row `a.ncols()`.
  pub fn put_mat_and_mat_t(&mut self, a: &CooMatrix<T>) -> Result<()> {
    self.check_fits_mat_and_mat_t(a.nrows, a.ncols)?;
    let offset = a.ncols;
    for &(r, c, v) in &a.triplets {
      self.put(offset + r, c, v)?;
      self.put(c, offset + r, v)?;
    }
    Ok(())
  }

  /// Compressed-column version of [`Self::put_mat_and_mat_t`].
  pub fn put_csc_and_csc_t(&mut self, a: &CscMatrix<T>) -> Result<()> {
    self.check_fits_mat_and_mat_t(a.nrows(), a.ncols())?;
    let offset = a.ncols();
    for (r, c, v) in a.triplet_iter() {
      self.put(offset + r, c, v)?;
      self.put(c, offset + r, v)?;
    }
    Ok(())
  }

  fn check_fits_mat_and_mat_t(&self, nrows: usize, ncols: usize) -> Result<()> {
    let size = nrows + ncols;
    if size > self.nrows || size > self.ncols {
      return Err(Error::DimensionMismatch(format!(
        "cannot put a {nrows}x{ncols} matrix and its transpose into a {}x{} matrix",
        self.nrows, self.ncols
      )));
    }
    Ok(())
  }

  /// Fails on the first entry put outside of the matrix by the unchecked [`Self::put`].
  pub fn check_indices(&self) -> Result<()> {
    match self
      .triplets
      .iter()
      .find(|&&(r, c, _)| r >= self.nrows || c >= self.ncols)
    {
      Some(&(row, col, _)) => Err(Error::IndexOutOfRange {
        row,
        col,
        nrows: self.nrows,
        ncols: self.ncols,
      }),
      None => Ok(()),
    }
  }

  /// Dense matrix with duplicate entries summed.
  pub fn to_dense(&self) -> Result<Matrix<T>> {
    self.check_indices()?;
    let mut dense = Matrix::zeros(self.nrows, self.ncols);
    for &(r, c, v) in &self.triplets {
      dense[(r, c)] += v;
    }
    Ok(dense)
  }
}

impl CooMatrix<Complex64> {
  /// Appends a complex entry given by its real and imaginary parts.
  pub fn put_complex(&mut self, r: usize, c: usize, re: f64, im: f64) -> Result<()> {
    self.put(r, c, Complex64::new(re, im))
  }
}
