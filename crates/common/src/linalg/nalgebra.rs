use crate::Scalar;

pub type Vector<T = f64> = na::DVector<T>;
pub type Matrix<T = f64> = na::DMatrix<T>;

/// Euclidean norm of the residual `a * x - b`.
pub fn residual_norm<T: Scalar>(a: &Matrix<T>, x: &[T], b: &[T]) -> T::RealField {
  assert!(a.ncols() == x.len() && a.nrows() == b.len());
  let x = Vector::from_column_slice(x);
  let b = Vector::from_column_slice(b);
  (a * x - b).norm()
}

/// Largest absolute componentwise difference of two equally long slices.
pub fn max_abs_diff<T: Scalar>(a: &[T], b: &[T]) -> T::RealField {
  assert_eq!(a.len(), b.len());
  a.iter()
    .zip(b)
    .map(|(&x, &y)| (x - y).modulus())
    .fold(na::zero(), |max: T::RealField, d| if d > max { d } else { max })
}

pub fn assert_mat_eq<T: Scalar>(a: &Matrix<T>, b: &Matrix<T>, tol: Option<f64>) {
  let tol: T::RealField = na::convert(tol.unwrap_or(10e-12));
  assert_eq!(a.shape(), b.shape(), "Matrix shapes differ.");
  let diff = a - b;
  let error = diff.norm();
  if error > tol {
    println!("Matrix a={a:.3}");
    println!("Matrix b={b:.3}");
    println!("a-b={diff:.3}");
    panic!("Matrices not equal.");
  }
}
