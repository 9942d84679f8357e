//! Conversion from triplet to compressed-column format.
//!
//! The conversion runs in two passes. The symbolic pass buckets the entries
//! by column (stable, so insertion order is kept inside a column), assigns
//! every distinct row of a column the next free slot and records, for every
//! triplet, the slot it lands in. The numeric pass zeroes the values and
//! accumulates the triplets in insertion order.
//!
//! Duplicate `(row, col)` entries are therefore always summed, never
//! overwritten, and the summation order of a cell is its insertion order.

use crate::{
  coo::CooMatrix,
  csc::CscMatrix,
  error::{Error, Result},
  marker::RowMarker,
};

use common::{util::offsets_from_counts, Scalar};

/// Reusable scratch space for COO to CSC conversions.
///
/// A compiler may be reused across matrices of any shape,
/// but must not be shared between concurrent conversions.
#[derive(Debug, Default, Clone)]
pub struct Compiler {
  marker: RowMarker,
  order: Vec<usize>,
  next: Vec<usize>,
}

impl Compiler {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn compile<T: Scalar>(&mut self, coo: &CooMatrix<T>) -> Result<CscMatrix<T>> {
    self.compile_with_map(coo).map(|(csc, _)| csc)
  }

  /// Compiles `coo` and additionally returns the slot of every triplet in the
  /// compiled matrix, which allows [`refill`]ing the values later on.
  pub fn compile_with_map<T: Scalar>(
    &mut self,
    coo: &CooMatrix<T>,
  ) -> Result<(CscMatrix<T>, Vec<usize>)> {
    let (col_ptr, row_idx, coo2csc) = self.symbolic(coo)?;
    let nnz = row_idx.len();
    let mut csc = CscMatrix::from_parts_unchecked(
      coo.nrows(),
      coo.ncols(),
      col_ptr,
      row_idx,
      vec![T::zero(); nnz],
    );
    accumulate(csc.values_mut(), coo, &coo2csc);

    tracing::trace!(
      nrows = coo.nrows(),
      ncols = coo.ncols(),
      ntriplets = coo.len(),
      nnz,
      "compiled triplet matrix"
    );
    Ok((csc, coo2csc))
  }

  fn symbolic<T: Scalar>(
    &mut self,
    coo: &CooMatrix<T>,
  ) -> Result<(Vec<usize>, Vec<usize>, Vec<usize>)> {
    let nrows = coo.nrows();
    let ncols = coo.ncols();
    let triplets = coo.triplets();
    coo.check_indices()?;

    // Bucket the triplets by column.
    let mut counts = vec![0; ncols];
    for &(_, c, _) in triplets {
      counts[c] += 1;
    }
    let bucket_ptr = offsets_from_counts(counts);

    self.next.clear();
    self.next.extend_from_slice(&bucket_ptr[..ncols]);
    self.order.clear();
    self.order.resize(triplets.len(), 0);
    for (k, &(_, c, _)) in triplets.iter().enumerate() {
      self.order[self.next[c]] = k;
      self.next[c] += 1;
    }

    // Distinct rows per column, in order of first appearance.
    let mut col_ptr = Vec::with_capacity(ncols + 1);
    let mut row_idx = Vec::with_capacity(triplets.len());
    let mut coo2csc = vec![0; triplets.len()];
    col_ptr.push(0);
    self.marker.prepare(nrows);
    for j in 0..ncols {
      self.marker.next_generation();
      for &k in &self.order[bucket_ptr[j]..bucket_ptr[j + 1]] {
        let r = triplets[k].0;
        coo2csc[k] = match self.marker.slot(r) {
          Some(slot) => slot,
          None => {
            let slot = row_idx.len();
            self.marker.mark(r, slot);
            row_idx.push(r);
            slot
          }
        };
      }
      col_ptr.push(row_idx.len());
    }
    row_idx.shrink_to_fit();

    Ok((col_ptr, row_idx, coo2csc))
  }
}

/// Compiles `coo` with a throwaway [`Compiler`].
pub fn compile<T: Scalar>(coo: &CooMatrix<T>) -> Result<CscMatrix<T>> {
  Compiler::new().compile(coo)
}

/// Value-only update of a matrix compiled by [`Compiler::compile_with_map`]
/// from a triplet matrix with the same pattern, e.g. across Newton iterations.
///
/// The triplets must be the same `(row, col)` sequence as during compilation.
/// Otherwise `csc` is left untouched and [`Error::PatternMismatch`] is returned.
pub fn refill<T: Scalar>(
  csc: &mut CscMatrix<T>,
  coo: &CooMatrix<T>,
  coo2csc: &[usize],
) -> Result<()> {
  if coo.nrows() != csc.nrows() || coo.ncols() != csc.ncols() {
    return Err(Error::PatternMismatch(format!(
      "a {}x{} triplet matrix cannot refill a {}x{} matrix",
      coo.nrows(),
      coo.ncols(),
      csc.nrows(),
      csc.ncols()
    )));
  }
  if coo.len() != coo2csc.len() {
    return Err(Error::PatternMismatch(format!(
      "the triplet matrix holds {} entries but the map was built for {}",
      coo.len(),
      coo2csc.len()
    )));
  }
  for (&(r, c, _), &slot) in coo.triplets().iter().zip(coo2csc) {
    if c >= csc.ncols() || !csc.col_range(c).contains(&slot) || csc.row_idx()[slot] != r {
      return Err(Error::PatternMismatch(format!(
        "entry ({r},{c}) has no slot in the compiled pattern"
      )));
    }
  }
  accumulate(csc.values_mut(), coo, coo2csc);
  Ok(())
}

fn accumulate<T: Scalar>(values: &mut [T], coo: &CooMatrix<T>, coo2csc: &[usize]) {
  values.fill(T::zero());
  for (&(_, _, v), &slot) in coo.triplets().iter().zip(coo2csc) {
    values[slot] += v;
  }
}
