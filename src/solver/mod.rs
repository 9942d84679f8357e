//! Direct solvers for sparse linear systems.
//!
//! Backends implement [`SparseSolver`] and are picked through [`SolverKind`],
//! which is passed around explicitly instead of being looked up in a global registry.

mod dense;
mod faer;

pub use self::{
  dense::DenseLu,
  faer::{FaerCholesky, FaerComplexLu, FaerLu},
};

use crate::{
  compile::compile,
  coo::CooMatrix,
  csc::CscMatrix,
  error::{Error, Result},
};

use common::{Complex64, Scalar};

use std::{fmt, str::FromStr};

/// Options handed to [`SparseSolver::init`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolverConfig {
  /// The matrix is structurally and numerically symmetric.
  pub symmetric: bool,
  /// The matrix is symmetric positive definite.
  pub sym_pos_def: bool,
  /// Report the stages of the solver at `info` level.
  pub verbose: bool,
}

/// A direct solver for `a * x = b`.
///
/// The life cycle is `init` once per sparsity pattern, `factorize` whenever the
/// values changed and `solve` for as many right-hand sides as needed.
/// Resources are released on drop.
pub trait SparseSolver<T: Scalar> {
  fn init(&mut self, a: &CscMatrix<T>, config: &SolverConfig) -> Result<()>;
  fn factorize(&mut self, a: &CscMatrix<T>) -> Result<()>;
  fn solve(&self, x: &mut [T], b: &[T]) -> Result<()>;
}

/// The available solver backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverKind {
  /// Sparse LU of `faer`. Supports complex matrices.
  FaerLu,
  /// Sparse Cholesky of `faer`, for symmetric positive definite matrices.
  FaerCholesky,
  /// Dense LU of `nalgebra`. Supports complex matrices.
  DenseLu,
}

impl SolverKind {
  pub const ALL: [SolverKind; 3] = [Self::FaerLu, Self::FaerCholesky, Self::DenseLu];

  pub fn name(self) -> &'static str {
    match self {
      Self::FaerLu => "faer-lu",
      Self::FaerCholesky => "faer-cholesky",
      Self::DenseLu => "dense-lu",
    }
  }

  /// Instantiates the backend for scalar type `T`.
  pub fn build<T: BuildSolver>(self) -> Result<Box<dyn SparseSolver<T>>> {
    T::build_solver(self)
  }
}

impl fmt::Display for SolverKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for SolverKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|kind| kind.name() == s)
      .ok_or_else(|| Error::UnknownSolver(s.to_string()))
  }
}

/// Scalars for which solvers can be built.
pub trait BuildSolver: Scalar + 'static {
  fn build_solver(kind: SolverKind) -> Result<Box<dyn SparseSolver<Self>>>;
}

impl BuildSolver for f64 {
  fn build_solver(kind: SolverKind) -> Result<Box<dyn SparseSolver<Self>>> {
    Ok(match kind {
      SolverKind::FaerLu => Box::<FaerLu>::default(),
      SolverKind::FaerCholesky => Box::<FaerCholesky>::default(),
      SolverKind::DenseLu => Box::<DenseLu<f64>>::default(),
    })
  }
}

impl BuildSolver for Complex64 {
  fn build_solver(kind: SolverKind) -> Result<Box<dyn SparseSolver<Self>>> {
    match kind {
      SolverKind::FaerLu => Ok(Box::<FaerComplexLu>::default()),
      SolverKind::DenseLu => Ok(Box::<DenseLu<Complex64>>::default()),
      SolverKind::FaerCholesky => Err(Error::UnknownSolver(format!(
        "{kind} (no complex implementation)"
      ))),
    }
  }
}

/// Solves `a * x = b` in one go and returns `x`.
///
/// The triplet matrix is compiled, factorized with a fresh solver of the given
/// kind and dropped afterwards.
pub fn solve_lin_sys<T: BuildSolver>(a: &CooMatrix<T>, b: &[T], kind: SolverKind) -> Result<Vec<T>> {
  let a = compile(a)?;
  let config = SolverConfig {
    sym_pos_def: kind == SolverKind::FaerCholesky,
    symmetric: kind == SolverKind::FaerCholesky,
    ..Default::default()
  };
  let mut solver = kind.build::<T>()?;
  solver.init(&a, &config)?;
  solver.factorize(&a)?;
  let mut x = vec![T::zero(); a.ncols()];
  solver.solve(&mut x, b)?;
  Ok(x)
}

fn check_square<T: Scalar>(a: &CscMatrix<T>) -> Result<()> {
  if a.nrows() != a.ncols() {
    return Err(Error::DimensionMismatch(format!(
      "a linear system needs a square matrix, got {}x{}",
      a.nrows(),
      a.ncols()
    )));
  }
  Ok(())
}

fn check_init<T: Scalar>(n: Option<usize>, a: &CscMatrix<T>) -> Result<usize> {
  let n = n.ok_or_else(|| {
    Error::SingularOrFactorizationFailed("solver must be initialized before factorization".into())
  })?;
  if a.nrows() != n || a.ncols() != n {
    return Err(Error::DimensionMismatch(format!(
      "solver was initialized for {n}x{n} but got a {}x{} matrix",
      a.nrows(),
      a.ncols()
    )));
  }
  Ok(n)
}

fn check_rhs<T: Scalar>(n: usize, x: &[T], b: &[T]) -> Result<()> {
  if x.len() != n || b.len() != n {
    return Err(Error::DimensionMismatch(format!(
      "x and b must have length {n}, got {} and {}",
      x.len(),
      b.len()
    )));
  }
  Ok(())
}
