use super::{check_init, check_rhs, check_square, SolverConfig, SparseSolver};
use crate::{
  csc::CscMatrix,
  error::{Error, Result},
};

use common::{linalg::nalgebra::Vector, Scalar};

/// Dense LU factorization with partial pivoting.
///
/// Densifies the matrix, so only suited for small systems,
/// but works for every scalar type, complex ones included.
#[derive(Debug)]
pub struct DenseLu<T: Scalar> {
  n: Option<usize>,
  verbose: bool,
  lu: Option<na::linalg::LU<T, na::Dyn, na::Dyn>>,
}

impl<T: Scalar> Default for DenseLu<T> {
  fn default() -> Self {
    Self {
      n: None,
      verbose: false,
      lu: None,
    }
  }
}

impl<T: Scalar> SparseSolver<T> for DenseLu<T> {
  fn init(&mut self, a: &CscMatrix<T>, config: &SolverConfig) -> Result<()> {
    check_square(a)?;
    self.n = Some(a.nrows());
    self.verbose = config.verbose;
    self.lu = None;
    Ok(())
  }

  fn factorize(&mut self, a: &CscMatrix<T>) -> Result<()> {
    let n = check_init(self.n, a)?;
    let lu = a.to_dense().lu();
    if !lu.is_invertible() {
      self.lu = None;
      return Err(Error::SingularOrFactorizationFailed(
        "dense LU: matrix is singular".to_string(),
      ));
    }
    if self.verbose {
      tracing::info!(n, "dense LU factorization done");
    }
    self.lu = Some(lu);
    Ok(())
  }

  fn solve(&self, x: &mut [T], b: &[T]) -> Result<()> {
    let (Some(n), Some(lu)) = (self.n, &self.lu) else {
      return Err(Error::SingularOrFactorizationFailed(
        "dense LU: solve called before factorization".to_string(),
      ));
    };
    check_rhs(n, x, b)?;
    let sol = lu
      .solve(&Vector::from_column_slice(b))
      .ok_or_else(|| Error::SingularOrFactorizationFailed("dense LU: solve failed".to_string()))?;
    x.copy_from_slice(sol.as_slice());
    Ok(())
  }
}
