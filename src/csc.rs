//! Compressed-column sparse matrix.

use crate::error::{Error, Result};

use common::{linalg::nalgebra::Matrix, Complex64, Scalar};

/// Sparse matrix in compressed-column (CSC) format.
///
/// Within a column every row index appears at most once. Rows of a column are
/// kept in the order the compiler first encountered them, not necessarily
/// sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct CscMatrix<T = f64> {
  nrows: usize,
  ncols: usize,
  /// `col_ptr[j]..col_ptr[j+1]` is the range of column `j` in `row_idx` and `values`.
  col_ptr: Vec<usize>,
  row_idx: Vec<usize>,
  values: Vec<T>,
}

impl<T: Scalar> CscMatrix<T> {
  /// All-zero matrix without stored entries.
  pub fn zeros(nrows: usize, ncols: usize) -> Self {
    Self {
      nrows,
      ncols,
      col_ptr: vec![0; ncols + 1],
      row_idx: Vec::new(),
      values: Vec::new(),
    }
  }

  /// Assembles a matrix from raw compressed-column arrays after checking all invariants.
  pub fn from_parts(
    nrows: usize,
    ncols: usize,
    col_ptr: Vec<usize>,
    row_idx: Vec<usize>,
    values: Vec<T>,
  ) -> Result<Self> {
    if col_ptr.len().checked_sub(1) != Some(ncols) {
      return Err(Error::DimensionMismatch(format!(
        "len(col_ptr) must be equal to ncols+1. {} != {ncols}+1",
        col_ptr.len(),
      )));
    }
    let nnz = row_idx.len();
    if values.len() != nnz {
      return Err(Error::DimensionMismatch(format!(
        "len(values) must be equal to len(row_idx) == nnz. {} != {nnz}",
        values.len()
      )));
    }
    if col_ptr[0] != 0 || col_ptr[ncols] != nnz || col_ptr.windows(2).any(|w| w[0] > w[1]) {
      return Err(Error::PatternMismatch(format!(
        "col_ptr must increase monotonically from 0 to nnz = {nnz}"
      )));
    }

    // Sorted copy of each column, so that the check never allocates `nrows`.
    let mut rows = Vec::new();
    for j in 0..ncols {
      rows.clear();
      rows.extend_from_slice(&row_idx[col_ptr[j]..col_ptr[j + 1]]);
      if let Some(&r) = rows.iter().find(|&&r| r >= nrows) {
        return Err(Error::IndexOutOfRange {
          row: r,
          col: j,
          nrows,
          ncols,
        });
      }
      rows.sort_unstable();
      if let Some(w) = rows.windows(2).find(|w| w[0] == w[1]) {
        return Err(Error::PatternMismatch(format!(
          "row {} appears twice in column {j}",
          w[0]
        )));
      }
    }

    Ok(Self::from_parts_unchecked(
      nrows, ncols, col_ptr, row_idx, values,
    ))
  }

  pub(crate) fn from_parts_unchecked(
    nrows: usize,
    ncols: usize,
    col_ptr: Vec<usize>,
    row_idx: Vec<usize>,
    values: Vec<T>,
  ) -> Self {
    debug_assert_eq!(col_ptr.len(), ncols + 1);
    debug_assert_eq!(row_idx.len(), values.len());
    Self {
      nrows,
      ncols,
      col_ptr,
      row_idx,
      values,
    }
  }

  pub fn into_parts(self) -> (usize, usize, Vec<usize>, Vec<usize>, Vec<T>) {
    (
      self.nrows,
      self.ncols,
      self.col_ptr,
      self.row_idx,
      self.values,
    )
  }

  pub fn nrows(&self) -> usize {
    self.nrows
  }
  pub fn ncols(&self) -> usize {
    self.ncols
  }
  pub fn nnz(&self) -> usize {
    self.row_idx.len()
  }
  pub fn col_ptr(&self) -> &[usize] {
    &self.col_ptr
  }
  pub fn row_idx(&self) -> &[usize] {
    &self.row_idx
  }
  pub fn values(&self) -> &[T] {
    &self.values
  }

  /// Mutable access to the values only, for updates that keep the sparsity pattern.
  pub fn values_mut(&mut self) -> &mut [T] {
    &mut self.values
  }

  /// Range of column `j` within [`Self::row_idx`] and [`Self::values`].
  #[inline]
  pub fn col_range(&self, j: usize) -> std::ops::Range<usize> {
    self.col_ptr[j]..self.col_ptr[j + 1]
  }

  pub fn triplet_iter(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
    (0..self.ncols).flat_map(move |j| {
      self
        .col_range(j)
        .map(move |k| (self.row_idx[k], j, self.values[k]))
    })
  }

  /// Stored value at `(i, j)`, zero if the entry is structurally absent.
  pub fn get(&self, i: usize, j: usize) -> Result<T> {
    if i >= self.nrows || j >= self.ncols {
      return Err(Error::IndexOutOfRange {
        row: i,
        col: j,
        nrows: self.nrows,
        ncols: self.ncols,
      });
    }
    Ok(
      self
        .col_range(j)
        .find(|&k| self.row_idx[k] == i)
        .map_or_else(T::zero, |k| self.values[k]),
    )
  }

  /// Matrix with the same sparsity pattern and all values set to zero.
  pub fn init_similar(&self) -> Self {
    Self::from_parts_unchecked(
      self.nrows,
      self.ncols,
      self.col_ptr.clone(),
      self.row_idx.clone(),
      vec![T::zero(); self.nnz()],
    )
  }

  /// Whether every diagonal entry `(i, i)` is structurally present.
  pub fn has_full_diagonal(&self) -> bool {
    let ndiag = self.nrows.min(self.ncols);
    (0..ndiag).all(|j| self.col_range(j).any(|k| self.row_idx[k] == j))
  }

  pub fn to_dense(&self) -> Matrix<T> {
    let mut dense = Matrix::zeros(self.nrows, self.ncols);
    for (r, c, v) in self.triplet_iter() {
      dense[(r, c)] = v;
    }
    dense
  }

  /// Converts into a `nalgebra-sparse` matrix, which sorts the rows of each column.
  pub fn to_nalgebra_csc(&self) -> Result<nas::CscMatrix<T>> {
    nas::CscMatrix::try_from_unsorted_csc_data(
      self.nrows,
      self.ncols,
      self.col_ptr.clone(),
      self.row_idx.clone(),
      self.values.clone(),
    )
    .map_err(|err| Error::PatternMismatch(err.to_string()))
  }
}

impl CscMatrix<f64> {
  /// Complex matrix with the same sparsity pattern and all values set to zero.
  pub fn init_similar_complex(&self) -> CscMatrix<Complex64> {
    CscMatrix::from_parts_unchecked(
      self.nrows,
      self.ncols,
      self.col_ptr.clone(),
      self.row_idx.clone(),
      vec![Complex64::new(0.0, 0.0); self.nnz()],
    )
  }
}

impl CscMatrix<Complex64> {
  /// Values as two parallel arrays `(re, im)`.
  pub fn split_values(&self) -> (Vec<f64>, Vec<f64>) {
    self.values.iter().map(|z| (z.re, z.im)).unzip()
  }

  /// Values as one interleaved array `[re0, im0, re1, im1, ...]`.
  pub fn interleaved_values(&self) -> Vec<f64> {
    self.values.iter().flat_map(|z| [z.re, z.im]).collect()
  }

  /// Assembles a complex matrix whose values are given as parallel real and imaginary arrays.
  pub fn from_split_parts(
    nrows: usize,
    ncols: usize,
    col_ptr: Vec<usize>,
    row_idx: Vec<usize>,
    re: &[f64],
    im: &[f64],
  ) -> Result<Self> {
    if re.len() != im.len() {
      return Err(Error::DimensionMismatch(format!(
        "real and imaginary parts differ in length. {} != {}",
        re.len(),
        im.len()
      )));
    }
    let values = re
      .iter()
      .zip(im)
      .map(|(&re, &im)| Complex64::new(re, im))
      .collect();
    Self::from_parts(nrows, ncols, col_ptr, row_idx, values)
  }

  /// Assembles a complex matrix whose values are given interleaved as `[re0, im0, re1, im1, ...]`.
  pub fn from_interleaved_parts(
    nrows: usize,
    ncols: usize,
    col_ptr: Vec<usize>,
    row_idx: Vec<usize>,
    values: &[f64],
  ) -> Result<Self> {
    if values.len() % 2 != 0 {
      return Err(Error::DimensionMismatch(format!(
        "interleaved complex values must have even length, got {}",
        values.len()
      )));
    }
    let values = values
      .chunks_exact(2)
      .map(|z| Complex64::new(z[0], z[1]))
      .collect();
    Self::from_parts(nrows, ncols, col_ptr, row_idx, values)
  }
}
