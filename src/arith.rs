//! Sparse matrix arithmetic: pattern-union addition, matrix-vector products
//! and the residual-correction matrices of implicit Runge-Kutta schemes.
//!
//! No operation broadcasts. Incompatible shapes fail with
//! [`Error::DimensionMismatch`].

use crate::{
  coo::CooMatrix,
  csc::CscMatrix,
  error::{Error, Result},
  marker::RowMarker,
};

use common::{linalg::nalgebra::Matrix, Complex64, Scalar};

fn check_same_shape<T: Scalar, U: Scalar>(
  what: &str,
  a: &CscMatrix<T>,
  b: &CscMatrix<U>,
) -> Result<()> {
  if a.nrows() != b.nrows() || a.ncols() != b.ncols() {
    return Err(Error::DimensionMismatch(format!(
      "{what}: matrices must have the same dimensions. {}x{} != {}x{}",
      a.nrows(),
      a.ncols(),
      b.nrows(),
      b.ncols()
    )));
  }
  Ok(())
}

fn check_same_pattern<T: Scalar, U: Scalar>(
  what: &str,
  a: &CscMatrix<T>,
  b: &CscMatrix<U>,
) -> Result<()> {
  check_same_shape(what, a, b)?;
  if a.col_ptr() != b.col_ptr() || a.row_idx() != b.row_idx() {
    return Err(Error::PatternMismatch(format!(
      "{what}: matrices must share the same sparsity pattern"
    )));
  }
  Ok(())
}

fn check_len(what: &str, len: usize, expected: usize) -> Result<()> {
  if len != expected {
    return Err(Error::DimensionMismatch(format!(
      "length of {what} must be equal to {expected}, got {len}"
    )));
  }
  Ok(())
}

// matrix-matrix ---------------------------------------------------------------

/// Allocates the union pattern `c` of `a` and `b` for computing `c := α*a + β*b`.
///
/// Returns `(c, a2c, b2c)` where `a2c[k]` (resp. `b2c[k]`) is the slot in `c`
/// of the `k`-th stored entry of `a` (resp. `b`). The rows of a column of `c`
/// are the rows of `a` followed by the rows only `b` has, in their stored order.
/// The values of `c` are zero.
pub fn add_pattern<T: Scalar>(
  a: &CscMatrix<T>,
  b: &CscMatrix<T>,
) -> Result<(CscMatrix<T>, Vec<usize>, Vec<usize>)> {
  check_same_shape("add_pattern", a, b)?;
  let nrows = a.nrows();
  let ncols = a.ncols();

  let mut marker = RowMarker::default();
  marker.prepare(nrows);

  // Exact number of nonzeros of the union.
  let mut nnz = 0;
  for j in 0..ncols {
    marker.next_generation();
    for &r in a.row_idx()[a.col_range(j)]
      .iter()
      .chain(&b.row_idx()[b.col_range(j)])
    {
      if marker.slot(r).is_none() {
        marker.mark(r, nnz);
        nnz += 1;
      }
    }
  }

  let mut col_ptr = Vec::with_capacity(ncols + 1);
  let mut row_idx = Vec::with_capacity(nnz);
  let mut a2c = vec![0; a.nnz()];
  let mut b2c = vec![0; b.nnz()];
  col_ptr.push(0);
  for j in 0..ncols {
    marker.next_generation();
    for (src, dst) in [(a, &mut a2c), (b, &mut b2c)] {
      for k in src.col_range(j) {
        let r = src.row_idx()[k];
        dst[k] = match marker.slot(r) {
          Some(slot) => slot,
          None => {
            let slot = row_idx.len();
            marker.mark(r, slot);
            row_idx.push(r);
            slot
          }
        };
      }
    }
    col_ptr.push(row_idx.len());
  }

  let c = CscMatrix::from_parts_unchecked(nrows, ncols, col_ptr, row_idx, vec![T::zero(); nnz]);
  Ok((c, a2c, b2c))
}

fn check_add_maps<T: Scalar>(
  c: &CscMatrix<T>,
  a: &CscMatrix<T>,
  b: &CscMatrix<T>,
  a2c: &[usize],
  b2c: &[usize],
) -> Result<()> {
  check_same_shape("add_values", c, a)?;
  check_same_shape("add_values", c, b)?;
  check_len("a2c", a2c.len(), a.nnz())?;
  check_len("b2c", b2c.len(), b.nnz())?;
  if let Some(&slot) = a2c.iter().chain(b2c).find(|&&slot| slot >= c.nnz()) {
    return Err(Error::PatternMismatch(format!(
      "slot {slot} is out of range for a matrix with {} nonzeros",
      c.nnz()
    )));
  }
  Ok(())
}

/// Computes `c := α*a + β*b` on the union pattern made by [`add_pattern`].
///
/// The values of `c` are zeroed first. If the arguments are inconsistent,
/// `c` is left all-zero and an error is returned.
#[allow(clippy::too_many_arguments)]
pub fn add_values<T: Scalar>(
  c: &mut CscMatrix<T>,
  alpha: T,
  a: &CscMatrix<T>,
  beta: T,
  b: &CscMatrix<T>,
  a2c: &[usize],
  b2c: &[usize],
) -> Result<()> {
  c.values_mut().fill(T::zero());
  check_add_maps(c, a, b, a2c, b2c)?;
  let cx = c.values_mut();
  for (&v, &slot) in a.values().iter().zip(a2c) {
    cx[slot] += alpha * v;
  }
  for (&v, &slot) in b.values().iter().zip(b2c) {
    cx[slot] += beta * v;
  }
  Ok(())
}

/// Adds two real matrices with two sets of coefficients, producing
///
/// ```text
/// r :=  γ     *a + μ*b
/// c := (α+βi)*a + μ*b
/// ```
///
/// `r` is allocated by [`add_pattern`] and `c` by [`CscMatrix::init_similar_complex`] of `r`.
#[allow(clippy::too_many_arguments)]
pub fn add_values_r2c(
  c: &mut CscMatrix<Complex64>,
  r: &mut CscMatrix<f64>,
  alpha: f64,
  beta: f64,
  gamma: f64,
  a: &CscMatrix<f64>,
  mu: f64,
  b: &CscMatrix<f64>,
  a2c: &[usize],
  b2c: &[usize],
) -> Result<()> {
  r.values_mut().fill(0.0);
  c.values_mut().fill(Complex64::new(0.0, 0.0));
  check_same_pattern("add_values_r2c", r, c)?;
  check_add_maps(r, a, b, a2c, b2c)?;
  let rx = r.values_mut();
  let cx = c.values_mut();
  for (&v, &slot) in a.values().iter().zip(a2c) {
    rx[slot] += gamma * v;
    cx[slot] += Complex64::new(alpha * v, beta * v);
  }
  for (&v, &slot) in b.values().iter().zip(b2c) {
    rx[slot] += mu * v;
    cx[slot] += Complex64::new(mu * v, 0.0);
  }
  Ok(())
}

/// Computes `r := α*a + β*I` where `r` has the sparsity pattern of `a`.
///
/// Diagonal entries missing from the pattern of `a` are not created.
pub fn add_identity<T: Scalar>(
  r: &mut CscMatrix<T>,
  alpha: T,
  a: &CscMatrix<T>,
  beta: T,
) -> Result<()> {
  check_same_pattern("add_identity", r, a)?;
  for j in 0..a.ncols() {
    for k in a.col_range(j) {
      let mut v = alpha * a.values()[k];
      if a.row_idx()[k] == j {
        v += beta;
      }
      r.values_mut()[k] = v;
    }
  }
  Ok(())
}

/// Allocates the residual-correction matrices `(R, C)` of [`set_rc`] with the pattern of `j`.
pub fn init_rc(j: &CscMatrix<f64>) -> Result<(CscMatrix<f64>, CscMatrix<Complex64>)> {
  if j.nrows() != j.ncols() {
    return Err(Error::DimensionMismatch(format!(
      "residual correction needs a square matrix, got {}x{}",
      j.nrows(),
      j.ncols()
    )));
  }
  if !j.has_full_diagonal() {
    return Err(Error::PatternMismatch(
      "residual correction needs all diagonal entries to be present".to_string(),
    ));
  }
  Ok((j.init_similar(), j.init_similar_complex()))
}

/// Sets the residual-correction matrices
///
/// ```text
/// R :=  γ     *I - J
/// C := (α+βi)*I - J
/// ```
pub fn set_rc(
  r: &mut CscMatrix<f64>,
  c: &mut CscMatrix<Complex64>,
  alpha: f64,
  beta: f64,
  gamma: f64,
  j: &CscMatrix<f64>,
) -> Result<()> {
  check_same_pattern("set_rc", r, j)?;
  check_same_pattern("set_rc", c, j)?;
  for col in 0..j.ncols() {
    for k in j.col_range(col) {
      let v = j.values()[k];
      if j.row_idx()[k] == col {
        r.values_mut()[k] = gamma - v;
        c.values_mut()[k] = Complex64::new(alpha - v, beta);
      } else {
        r.values_mut()[k] = -v;
        c.values_mut()[k] = Complex64::new(-v, 0.0);
      }
    }
  }
  Ok(())
}

/// Dense `b := α * a * aᵀ`, which is symmetric.
pub fn mat_mat_tr_mul<T: Scalar>(b: &mut Matrix<T>, alpha: T, a: &CscMatrix<T>) -> Result<()> {
  if b.nrows() != a.nrows() || b.ncols() != a.nrows() {
    return Err(Error::DimensionMismatch(format!(
      "b must be {}x{}, got {}x{}",
      a.nrows(),
      a.nrows(),
      b.nrows(),
      b.ncols()
    )));
  }
  b.fill(T::zero());
  for j in 0..a.ncols() {
    for k in a.col_range(j) {
      for l in a.col_range(j) {
        b[(a.row_idx()[k], a.row_idx()[l])] += alpha * a.values()[k] * a.values()[l];
      }
    }
  }
  Ok(())
}

// matrix-vector ---------------------------------------------------------------

fn check_mat_vec<T: Scalar>(
  y: &[T],
  a: &CscMatrix<T>,
  x: &[T],
  transpose: bool,
) -> Result<()> {
  let (ny, nx) = if transpose {
    (a.ncols(), a.nrows())
  } else {
    (a.nrows(), a.ncols())
  };
  if y.len() != ny || x.len() != nx {
    let op = if transpose { "aᵀ" } else { "a" };
    return Err(Error::DimensionMismatch(format!(
      "y_({}) := {op}_({}x{}) * x_({}) requires y_({ny}) and x_({nx})",
      y.len(),
      a.nrows(),
      a.ncols(),
      x.len()
    )));
  }
  Ok(())
}

/// `y := α * a * x`, or `y := α * aᵀ * x` if `transpose`. `y` is zeroed first.
pub fn mat_vec<T: Scalar>(
  y: &mut [T],
  alpha: T,
  a: &CscMatrix<T>,
  x: &[T],
  transpose: bool,
) -> Result<()> {
  check_mat_vec(y, a, x, transpose)?;
  y.fill(T::zero());
  mat_vec_add_unchecked(y, alpha, a, x, transpose);
  Ok(())
}

/// `y += α * a * x`, or `y += α * aᵀ * x` if `transpose`.
///
/// Accumulates into `y`, e.g. to sum the products of several matrices.
pub fn mat_vec_add<T: Scalar>(
  y: &mut [T],
  alpha: T,
  a: &CscMatrix<T>,
  x: &[T],
  transpose: bool,
) -> Result<()> {
  check_mat_vec(y, a, x, transpose)?;
  mat_vec_add_unchecked(y, alpha, a, x, transpose);
  Ok(())
}

fn mat_vec_add_unchecked<T: Scalar>(
  y: &mut [T],
  alpha: T,
  a: &CscMatrix<T>,
  x: &[T],
  transpose: bool,
) {
  let ai = a.row_idx();
  let ax = a.values();
  for j in 0..a.ncols() {
    for k in a.col_range(j) {
      if transpose {
        y[j] += alpha * ax[k] * x[ai[k]];
      } else {
        y[ai[k]] += alpha * ax[k] * x[j];
      }
    }
  }
}

/// `v += a * (α*u + β*w)`.
pub fn mat_vec_add_x<T: Scalar>(
  v: &mut [T],
  a: &CscMatrix<T>,
  alpha: T,
  u: &[T],
  beta: T,
  w: &[T],
) -> Result<()> {
  check_mat_vec(v, a, u, false)?;
  check_mat_vec(v, a, w, false)?;
  for j in 0..a.ncols() {
    let uw = alpha * u[j] + beta * w[j];
    for k in a.col_range(j) {
      v[a.row_idx()[k]] += a.values()[k] * uw;
    }
  }
  Ok(())
}

// triplet-triplet -------------------------------------------------------------

/// `c := α*a + β*b` by concatenating the scaled entries of `a` and `b` into `c`.
///
/// `c` is restarted first and must be able to hold the entries of both.
pub fn coo_add<T: Scalar>(
  c: &mut CooMatrix<T>,
  alpha: T,
  a: &CooMatrix<T>,
  beta: T,
  b: &CooMatrix<T>,
) -> Result<()> {
  check_coo_add(c, a, b)?;
  c.reset();
  for &(r, col, v) in a.triplets() {
    c.put(r, col, alpha * v)?;
  }
  for &(r, col, v) in b.triplets() {
    c.put(r, col, beta * v)?;
  }
  Ok(())
}

/// `c := (α+βi)*a + μ*b` from two real triplet matrices.
pub fn coo_add_r2c(
  c: &mut CooMatrix<Complex64>,
  alpha: f64,
  beta: f64,
  a: &CooMatrix<f64>,
  mu: f64,
  b: &CooMatrix<f64>,
) -> Result<()> {
  check_coo_add(c, a, b)?;
  c.reset();
  for &(r, col, v) in a.triplets() {
    c.put_complex(r, col, alpha * v, beta * v)?;
  }
  for &(r, col, v) in b.triplets() {
    c.put_complex(r, col, mu * v, 0.0)?;
  }
  Ok(())
}

fn check_coo_add<T: Scalar, U: Scalar>(
  c: &CooMatrix<T>,
  a: &CooMatrix<U>,
  b: &CooMatrix<U>,
) -> Result<()> {
  let shape = (c.nrows(), c.ncols());
  if (a.nrows(), a.ncols()) != shape || (b.nrows(), b.ncols()) != shape {
    return Err(Error::DimensionMismatch(format!(
      "cannot add a {}x{} and a {}x{} matrix into a {}x{} matrix",
      a.nrows(),
      a.ncols(),
      b.nrows(),
      b.ncols(),
      c.nrows(),
      c.ncols()
    )));
  }
  if a.len() + b.len() > c.capacity() {
    return Err(Error::CapacityExceeded {
      capacity: c.capacity(),
    });
  }
  Ok(())
}

fn check_coo_mat_vec<T: Scalar>(
  y: &[T],
  a: &CooMatrix<T>,
  x: &[T],
  transpose: bool,
) -> Result<()> {
  let (ny, nx) = if transpose {
    (a.ncols(), a.nrows())
  } else {
    (a.nrows(), a.ncols())
  };
  check_len("y", y.len(), ny)?;
  check_len("x", x.len(), nx)?;
  a.check_indices()
}

/// `y := a * x` directly on the triplets of `a`.
pub fn coo_mat_vec<T: Scalar>(y: &mut [T], a: &CooMatrix<T>, x: &[T]) -> Result<()> {
  check_coo_mat_vec(y, a, x, false)?;
  y.fill(T::zero());
  for &(r, c, v) in a.triplets() {
    y[r] += v * x[c];
  }
  Ok(())
}

/// `y := aᵀ * x` directly on the triplets of `a`.
pub fn coo_mat_tr_vec<T: Scalar>(y: &mut [T], a: &CooMatrix<T>, x: &[T]) -> Result<()> {
  check_coo_mat_vec(y, a, x, true)?;
  y.fill(T::zero());
  for &(r, c, v) in a.triplets() {
    y[c] += v * x[r];
  }
  Ok(())
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::compile::compile;

  use approx::assert_relative_eq;
  use common::linalg::nalgebra::{assert_mat_eq, Vector};

  fn coo(nrows: usize, ncols: usize, entries: &[(usize, usize, f64)]) -> CooMatrix {
    let mut a = CooMatrix::new(nrows, ncols, entries.len()).unwrap();
    for &(r, c, v) in entries {
      a.put(r, c, v).unwrap();
    }
    a
  }

  fn sample_a() -> CscMatrix {
    compile(&coo(
      3,
      3,
      &[(0, 0, 1.0), (2, 0, 2.0), (1, 1, 3.0), (0, 2, 4.0)],
    ))
    .unwrap()
  }

  fn sample_b() -> CscMatrix {
    compile(&coo(
      3,
      3,
      &[(1, 0, 5.0), (0, 0, 6.0), (2, 2, 7.0), (1, 1, -3.0)],
    ))
    .unwrap()
  }

  #[test]
  fn add_pattern_unites_columns() {
    let (a, b) = (sample_a(), sample_b());
    let (c, a2c, b2c) = add_pattern(&a, &b).unwrap();
    assert_eq!(c.col_ptr(), &[0, 3, 4, 6]);
    assert_eq!(c.row_idx(), &[0, 2, 1, 1, 0, 2]);
    assert_eq!(a2c, vec![0, 1, 3, 4]);
    assert_eq!(b2c, vec![2, 0, 3, 5]);
    assert!(c.values().iter().all(|&v| v == 0.0));
  }

  #[test]
  fn add_values_matches_dense_sum() {
    let (a, b) = (sample_a(), sample_b());
    let (mut c, a2c, b2c) = add_pattern(&a, &b).unwrap();
    add_values(&mut c, 2.0, &a, -1.0, &b, &a2c, &b2c).unwrap();
    let expected = a.to_dense() * 2.0 - b.to_dense();
    assert_mat_eq(&c.to_dense(), &expected, None);
    assert_eq!(c.nnz(), 6);
    assert_eq!(c.get(1, 1).unwrap(), 9.0);
  }

  #[test]
  fn add_values_commutes() {
    let (a, b) = (sample_a(), sample_b());
    let (mut ab, a2ab, b2ab) = add_pattern(&a, &b).unwrap();
    let (mut ba, b2ba, a2ba) = add_pattern(&b, &a).unwrap();
    add_values(&mut ab, 1.0, &a, 1.0, &b, &a2ab, &b2ab).unwrap();
    add_values(&mut ba, 1.0, &b, 1.0, &a, &b2ba, &a2ba).unwrap();
    assert_mat_eq(&ab.to_dense(), &ba.to_dense(), Some(0.0));
  }

  #[test]
  fn add_values_zeroes_output_on_error() {
    let (a, b) = (sample_a(), sample_b());
    let (mut c, a2c, b2c) = add_pattern(&a, &b).unwrap();
    add_values(&mut c, 1.0, &a, 1.0, &b, &a2c, &b2c).unwrap();
    let result = add_values(&mut c, 1.0, &a, 1.0, &b, &a2c[..2], &b2c);
    assert!(matches!(result, Err(Error::DimensionMismatch(_))));
    assert!(c.values().iter().all(|&v| v == 0.0));

    let bogus = vec![99; a.nnz()];
    let result = add_values(&mut c, 1.0, &a, 1.0, &b, &bogus, &b2c);
    assert!(matches!(result, Err(Error::PatternMismatch(_))));
    assert!(c.values().iter().all(|&v| v == 0.0));
  }

  #[test]
  fn add_pattern_rejects_shape_mismatch() {
    let a = sample_a();
    let b = compile(&coo(3, 2, &[(0, 0, 1.0)])).unwrap();
    assert!(matches!(
      add_pattern(&a, &b),
      Err(Error::DimensionMismatch(_))
    ));
  }

  #[test]
  fn add_values_r2c_real_and_complex() {
    let (a, b) = (sample_a(), sample_b());
    let (mut r, a2c, b2c) = add_pattern(&a, &b).unwrap();
    let mut c = r.init_similar_complex();
    add_values_r2c(&mut c, &mut r, 1.0, 2.0, 3.0, &a, 0.5, &b, &a2c, &b2c).unwrap();
    assert_eq!(r.get(0, 0).unwrap(), 3.0 * 1.0 + 0.5 * 6.0);
    assert_eq!(c.get(0, 0).unwrap(), Complex64::new(1.0 + 3.0, 2.0));
    assert_eq!(c.get(1, 0).unwrap(), Complex64::new(2.5, 0.0));
    assert_eq!(c.get(0, 2).unwrap(), Complex64::new(4.0, 8.0));
  }

  #[test]
  fn add_identity_touches_diagonal_only() {
    let a = sample_a();
    let mut r = a.init_similar();
    add_identity(&mut r, 2.0, &a, 10.0).unwrap();
    assert_eq!(r.get(0, 0).unwrap(), 12.0);
    assert_eq!(r.get(1, 1).unwrap(), 16.0);
    assert_eq!(r.get(2, 0).unwrap(), 4.0);
    assert_eq!(r.get(0, 2).unwrap(), 8.0);
    // (2,2) is not part of the pattern of a.
    assert_eq!(r.get(2, 2).unwrap(), 0.0);
  }

  #[test]
  fn residual_correction() {
    let j = compile(&coo(
      2,
      2,
      &[(0, 0, 1.0), (1, 0, 2.0), (0, 1, 3.0), (1, 1, 4.0)],
    ))
    .unwrap();
    let (mut r, mut c) = init_rc(&j).unwrap();
    set_rc(&mut r, &mut c, 5.0, 6.0, 7.0, &j).unwrap();
    assert_mat_eq(&r.to_dense(), &na::dmatrix![6.0, -3.0; -2.0, 3.0], None);
    assert_eq!(c.get(0, 0).unwrap(), Complex64::new(4.0, 6.0));
    assert_eq!(c.get(1, 1).unwrap(), Complex64::new(1.0, 6.0));
    assert_eq!(c.get(1, 0).unwrap(), Complex64::new(-2.0, 0.0));

    let sparse_diag = compile(&coo(2, 2, &[(0, 0, 1.0), (0, 1, 1.0)])).unwrap();
    assert!(matches!(
      init_rc(&sparse_diag),
      Err(Error::PatternMismatch(_))
    ));
  }

  #[test]
  fn mat_vec_and_transpose() {
    let a = sample_a();
    let dense = a.to_dense();
    let x = [1.0, -2.0, 0.5];

    let mut y = [99.0; 3];
    mat_vec(&mut y, 2.0, &a, &x, false).unwrap();
    let expected = &dense * Vector::from_column_slice(&x) * 2.0;
    assert_relative_eq!(Vector::from_column_slice(&y), expected);

    mat_vec(&mut y, 1.0, &a, &x, true).unwrap();
    let expected = dense.transpose() * Vector::from_column_slice(&x);
    assert_relative_eq!(Vector::from_column_slice(&y), expected);

    let mut acc = [1.0; 3];
    mat_vec_add(&mut acc, 1.0, &a, &x, true).unwrap();
    assert_relative_eq!(
      Vector::from_column_slice(&acc),
      expected.add_scalar(1.0)
    );
  }

  #[test]
  fn mat_vec_rejects_wrong_lengths() {
    let a = compile(&coo(2, 3, &[(0, 0, 1.0)])).unwrap();
    let mut y = [0.0; 2];
    assert!(mat_vec(&mut y, 1.0, &a, &[1.0; 3], false).is_ok());
    assert!(matches!(
      mat_vec(&mut y, 1.0, &a, &[1.0; 2], false),
      Err(Error::DimensionMismatch(_))
    ));
    assert!(matches!(
      mat_vec(&mut y, 1.0, &a, &[1.0; 2], true),
      Err(Error::DimensionMismatch(_))
    ));
    let mut yt = [0.0; 3];
    assert!(mat_vec(&mut yt, 1.0, &a, &[1.0; 2], true).is_ok());
  }

  #[test]
  fn mat_vec_add_x_combines_vectors() {
    let a = sample_a();
    let u = [1.0, 2.0, 3.0];
    let w = [-1.0, 0.0, 1.0];
    let mut v = [0.0; 3];
    mat_vec_add_x(&mut v, &a, 2.0, &u, 3.0, &w).unwrap();
    // a * [-1, 4, 9]
    assert_eq!(v, [-1.0 + 36.0, 12.0, -2.0]);
  }

  #[test]
  fn mat_mat_tr_mul_is_symmetric() {
    let a = sample_a();
    let mut b = Matrix::zeros(3, 3);
    mat_mat_tr_mul(&mut b, 0.5, &a).unwrap();
    let dense = a.to_dense();
    assert_mat_eq(&b, &(&dense * dense.transpose() * 0.5), None);
    assert_mat_eq(&b, &b.transpose(), Some(0.0));
  }

  #[test]
  fn coo_operations() {
    let a = coo(2, 2, &[(0, 0, 1.0), (1, 0, 2.0)]);
    let b = coo(2, 2, &[(0, 0, 3.0), (1, 1, 4.0)]);

    let mut c = CooMatrix::new(2, 2, 4).unwrap();
    coo_add(&mut c, 2.0, &a, -1.0, &b).unwrap();
    assert_mat_eq(&c.to_dense().unwrap(), &na::dmatrix![-1.0, 0.0; 4.0, -4.0], None);

    let mut tiny = CooMatrix::new(2, 2, 3).unwrap();
    assert!(matches!(
      coo_add(&mut tiny, 1.0, &a, 1.0, &b),
      Err(Error::CapacityExceeded { capacity: 3 })
    ));

    let mut z = CooMatrix::new(2, 2, 4).unwrap();
    coo_add_r2c(&mut z, 1.0, 2.0, &a, 3.0, &b).unwrap();
    let z = z.to_dense().unwrap();
    assert_eq!(z[(0, 0)], Complex64::new(10.0, 2.0));
    assert_eq!(z[(1, 1)], Complex64::new(12.0, 0.0));

    let mut y = [0.0; 2];
    coo_mat_vec(&mut y, &c, &[1.0, 2.0]).unwrap();
    assert_eq!(y, [-1.0, -4.0]);
    coo_mat_tr_vec(&mut y, &c, &[1.0, 2.0]).unwrap();
    assert_eq!(y, [7.0, -8.0]);
    assert!(matches!(
      coo_mat_vec(&mut y, &c, &[1.0]),
      Err(Error::DimensionMismatch(_))
    ));
  }

  #[test]
  fn coo_products_reject_unchecked_out_of_range() {
    let a = coo(2, 2, &[(0, 0, 1.0), (5, 0, 1.0)]);
    let mut y = [7.0; 2];
    assert!(matches!(
      coo_mat_vec(&mut y, &a, &[1.0, 1.0]),
      Err(Error::IndexOutOfRange { row: 5, col: 0, .. })
    ));
    assert!(matches!(
      coo_mat_tr_vec(&mut y, &a, &[1.0, 1.0]),
      Err(Error::IndexOutOfRange { row: 5, col: 0, .. })
    ));
    assert_eq!(y, [7.0; 2]);
  }
}
