use super::{check_init, check_rhs, check_square, SolverConfig, SparseSolver};
use crate::{
  csc::CscMatrix,
  error::{Error, Result},
};

use common::{Complex64, Scalar};

use faer::{complex_native::c64, solvers::SpSolver};

use std::panic::{catch_unwind, AssertUnwindSafe};

type SparseMatrixFaer = faer::sparse::SparseColMat<usize, f64>;
type SparseMatrixFaerComplex = faer::sparse::SparseColMat<usize, c64>;

/// `faer` expects the rows of each column sorted, so the pattern goes through `nalgebra-sparse`.
fn csc2faer_parts<T: Scalar, E>(
  a: &CscMatrix<T>,
  convert: impl Fn(T) -> E,
) -> Result<(faer::sparse::SymbolicSparseColMat<usize>, Vec<E>)> {
  let a = a.to_nalgebra_csc()?;
  let nrows = a.nrows();
  let ncols = a.ncols();
  let (col_ptrs, row_indices, values) = a.disassemble();

  let symbolic =
    faer::sparse::SymbolicSparseColMat::new_checked(nrows, ncols, col_ptrs, None, row_indices);
  Ok((symbolic, values.into_iter().map(convert).collect()))
}

fn csc2faer(a: &CscMatrix) -> Result<SparseMatrixFaer> {
  let (symbolic, values) = csc2faer_parts(a, |v| v)?;
  Ok(faer::sparse::SparseColMat::new(symbolic, values))
}

fn csc2faer_complex(a: &CscMatrix<Complex64>) -> Result<SparseMatrixFaerComplex> {
  let (symbolic, values) = csc2faer_parts(a, |z| c64::new(z.re, z.im))?;
  Ok(faer::sparse::SparseColMat::new(symbolic, values))
}

/// Runs a `faer` factorization, turning both its errors and its panics
/// (raised on some structurally singular inputs) into
/// [`Error::SingularOrFactorizationFailed`].
fn factorize_with<F, R, E>(name: &str, f: F) -> Result<R>
where
  F: FnOnce() -> std::result::Result<R, E>,
  E: std::fmt::Debug,
{
  match catch_unwind(AssertUnwindSafe(f)) {
    Ok(Ok(raw)) => Ok(raw),
    Ok(Err(err)) => Err(Error::SingularOrFactorizationFailed(format!("{name}: {err:?}"))),
    Err(_) => Err(Error::SingularOrFactorizationFailed(format!(
      "{name}: factorization aborted"
    ))),
  }
}

fn copy_finite(name: &str, sol: &[f64], x: &mut [f64]) -> Result<()> {
  if sol.iter().any(|v| !v.is_finite()) {
    return Err(Error::SingularOrFactorizationFailed(format!(
      "{name}: solution is not finite, the matrix is probably singular"
    )));
  }
  x.copy_from_slice(sol);
  Ok(())
}

/// Sparse LU of `faer`.
#[derive(Default)]
pub struct FaerLu {
  n: Option<usize>,
  verbose: bool,
  raw: Option<faer::sparse::linalg::solvers::Lu<usize, f64>>,
}

impl SparseSolver<f64> for FaerLu {
  fn init(&mut self, a: &CscMatrix, config: &SolverConfig) -> Result<()> {
    check_square(a)?;
    self.n = Some(a.nrows());
    self.verbose = config.verbose;
    self.raw = None;
    Ok(())
  }

  fn factorize(&mut self, a: &CscMatrix) -> Result<()> {
    let n = check_init(self.n, a)?;
    self.raw = None;
    if n > 0 && a.nnz() == 0 {
      return Err(Error::SingularOrFactorizationFailed(
        "faer LU: matrix has no nonzeros".to_string(),
      ));
    }
    let mat = csc2faer(a)?;
    let raw = factorize_with("faer LU", || mat.sp_lu())?;
    if self.verbose {
      tracing::info!(n, nnz = a.nnz(), "faer LU factorization done");
    }
    self.raw = Some(raw);
    Ok(())
  }

  fn solve(&self, x: &mut [f64], b: &[f64]) -> Result<()> {
    let (Some(n), Some(raw)) = (self.n, &self.raw) else {
      return Err(Error::SingularOrFactorizationFailed(
        "faer LU: solve called before factorization".to_string(),
      ));
    };
    check_rhs(n, x, b)?;
    let sol = raw.solve(faer::col::from_slice(b));
    copy_finite("faer LU", sol.as_slice(), x)
  }
}

/// Sparse LU of `faer` for complex matrices.
#[derive(Default)]
pub struct FaerComplexLu {
  n: Option<usize>,
  verbose: bool,
  raw: Option<faer::sparse::linalg::solvers::Lu<usize, c64>>,
}

impl SparseSolver<Complex64> for FaerComplexLu {
  fn init(&mut self, a: &CscMatrix<Complex64>, config: &SolverConfig) -> Result<()> {
    check_square(a)?;
    self.n = Some(a.nrows());
    self.verbose = config.verbose;
    self.raw = None;
    Ok(())
  }

  fn factorize(&mut self, a: &CscMatrix<Complex64>) -> Result<()> {
    let n = check_init(self.n, a)?;
    self.raw = None;
    if n > 0 && a.nnz() == 0 {
      return Err(Error::SingularOrFactorizationFailed(
        "faer complex LU: matrix has no nonzeros".to_string(),
      ));
    }
    let mat = csc2faer_complex(a)?;
    let raw = factorize_with("faer complex LU", || mat.sp_lu())?;
    if self.verbose {
      tracing::info!(n, nnz = a.nnz(), "faer complex LU factorization done");
    }
    self.raw = Some(raw);
    Ok(())
  }

  fn solve(&self, x: &mut [Complex64], b: &[Complex64]) -> Result<()> {
    let (Some(n), Some(raw)) = (self.n, &self.raw) else {
      return Err(Error::SingularOrFactorizationFailed(
        "faer complex LU: solve called before factorization".to_string(),
      ));
    };
    check_rhs(n, x, b)?;
    let rhs: Vec<c64> = b.iter().map(|z| c64::new(z.re, z.im)).collect();
    let sol = raw.solve(faer::col::from_slice(&rhs));
    if sol.as_slice().iter().any(|z| !(z.re.is_finite() && z.im.is_finite())) {
      return Err(Error::SingularOrFactorizationFailed(
        "faer complex LU: solution is not finite, the matrix is probably singular".to_string(),
      ));
    }
    for (xi, z) in x.iter_mut().zip(sol.as_slice()) {
      *xi = Complex64::new(z.re, z.im);
    }
    Ok(())
  }
}

/// Sparse Cholesky of `faer`. Only the upper triangle of the matrix is read.
#[derive(Default)]
pub struct FaerCholesky {
  n: Option<usize>,
  verbose: bool,
  raw: Option<faer::sparse::linalg::solvers::Cholesky<usize, f64>>,
}

impl SparseSolver<f64> for FaerCholesky {
  fn init(&mut self, a: &CscMatrix, config: &SolverConfig) -> Result<()> {
    check_square(a)?;
    if !config.sym_pos_def {
      tracing::debug!("faer Cholesky used without the positive definite flag");
    }
    self.n = Some(a.nrows());
    self.verbose = config.verbose;
    self.raw = None;
    Ok(())
  }

  fn factorize(&mut self, a: &CscMatrix) -> Result<()> {
    let n = check_init(self.n, a)?;
    self.raw = None;
    let mat = csc2faer(a)?;
    let raw = factorize_with("faer Cholesky", || mat.sp_cholesky(faer::Side::Upper))?;
    if self.verbose {
      tracing::info!(n, nnz = a.nnz(), "faer Cholesky factorization done");
    }
    self.raw = Some(raw);
    Ok(())
  }

  fn solve(&self, x: &mut [f64], b: &[f64]) -> Result<()> {
    let (Some(n), Some(raw)) = (self.n, &self.raw) else {
      return Err(Error::SingularOrFactorizationFailed(
        "faer Cholesky: solve called before factorization".to_string(),
      ));
    };
    check_rhs(n, x, b)?;
    let sol = raw.solve(faer::col::from_slice(b));
    copy_finite("faer Cholesky", sol.as_slice(), x)
  }
}

#[cfg(test)]
mod test {
  use super::{FaerCholesky, FaerComplexLu, FaerLu};
  use crate::{
    compile::compile,
    coo::CooMatrix,
    error::Error,
    solver::{SolverConfig, SparseSolver},
  };

  use approx::assert_relative_eq;
  use common::Complex64;

  #[test]
  fn lu_on_unsorted_pattern() {
    // Rows are inserted in descending order within each column.
    let mut a = CooMatrix::new(3, 3, 6).unwrap();
    a.put(2, 0, 1.0).unwrap();
    a.put(0, 0, 2.0).unwrap();
    a.put(1, 1, 3.0).unwrap();
    a.put(2, 2, 4.0).unwrap();
    a.put(0, 2, 1.0).unwrap();
    let a = compile(&a).unwrap();
    assert_eq!(a.row_idx()[..2], [2, 0]);

    let mut lu = FaerLu::default();
    lu.init(&a, &SolverConfig::default()).unwrap();
    lu.factorize(&a).unwrap();
    let mut x = [0.0; 3];
    // x = [1, 2, 3]
    lu.solve(&mut x, &[5.0, 6.0, 13.0]).unwrap();
    assert_relative_eq!(x.as_slice(), [1.0, 2.0, 3.0].as_slice(), epsilon = 1e-12);
  }

  #[test]
  fn cholesky_rejects_indefinite() {
    let mut a = CooMatrix::new(2, 2, 2).unwrap();
    a.put(0, 0, 1.0).unwrap();
    a.put(1, 1, -1.0).unwrap();
    let a = compile(&a).unwrap();
    let mut chol = FaerCholesky::default();
    chol.init(&a, &SolverConfig::default()).unwrap();
    assert!(matches!(
      chol.factorize(&a),
      Err(Error::SingularOrFactorizationFailed(_))
    ));
  }

  #[test]
  fn solve_before_factorize_fails() {
    let lu = FaerLu::default();
    let mut x = [0.0; 1];
    assert!(matches!(
      lu.solve(&mut x, &[1.0]),
      Err(Error::SingularOrFactorizationFailed(_))
    ));
  }

  #[test]
  fn complex_lu_matches_known_solution() {
    let i = Complex64::i();
    let one = Complex64::new(1.0, 0.0);
    let mut a = CooMatrix::new(3, 3, 6).unwrap();
    a.put(2, 0, i).unwrap();
    a.put(0, 0, 2.0 * one).unwrap();
    a.put(1, 1, one + i).unwrap();
    a.put(0, 2, -i).unwrap();
    a.put(2, 2, 3.0 * one).unwrap();
    a.put(1, 2, one).unwrap();
    let a = compile(&a).unwrap();

    // x = [1, i, 2]
    let x_expected = [one, i, 2.0 * one];
    let mut b = [Complex64::new(0.0, 0.0); 3];
    for (r, c, v) in a.triplet_iter() {
      b[r] += v * x_expected[c];
    }

    let mut lu = FaerComplexLu::default();
    lu.init(&a, &SolverConfig::default()).unwrap();
    lu.factorize(&a).unwrap();
    let mut x = [Complex64::new(0.0, 0.0); 3];
    lu.solve(&mut x, &b).unwrap();
    for (xi, ei) in x.iter().zip(&x_expected) {
      assert!((xi - ei).norm() < 1e-12);
    }
  }

  #[test]
  fn complex_lu_rejects_empty_matrix() {
    let a = compile(&CooMatrix::<Complex64>::new(2, 2, 0).unwrap()).unwrap();
    let mut lu = FaerComplexLu::default();
    lu.init(&a, &SolverConfig::default()).unwrap();
    assert!(matches!(
      lu.factorize(&a),
      Err(Error::SingularOrFactorizationFailed(_))
    ));
  }
}
