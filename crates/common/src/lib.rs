extern crate nalgebra as na;

pub mod linalg;
pub mod util;

pub use num_complex::Complex64;

/// Scalar stored in sparse matrices and dense vectors.
///
/// Blanket-implemented for every copyable [`na::ComplexField`],
/// which covers `f64` and [`Complex64`].
pub trait Scalar: na::ComplexField + Copy {}
impl<T: na::ComplexField + Copy> Scalar for T {}
