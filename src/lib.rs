extern crate nalgebra as na;
extern crate nalgebra_sparse as nas;

pub mod arith;
pub mod compile;
pub mod coo;
pub mod csc;
pub mod equations;
pub mod error;
pub mod io;
pub mod solver;

mod marker;

pub use common::{Complex64, Scalar};

pub use crate::{
  compile::{compile, refill, Compiler},
  coo::CooMatrix,
  csc::CscMatrix,
  equations::{Block, Equations, PartitionedSystem},
  error::{Error, Result},
  solver::{solve_lin_sys, SolverConfig, SolverKind, SparseSolver},
};
