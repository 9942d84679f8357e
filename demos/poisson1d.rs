//! Solves `-u'' = f` on the unit interval with linear finite elements.
//! The dirichlet values at both ends are prescribed equations.
//!
//! Usage: `cargo run --example poisson1d [solver] [ncells]`

extern crate nalgebra as na;

use common::linalg::nalgebra::max_abs_diff;
use lse::{solver::SolverKind, Equations, SolverConfig};

use std::f64::consts::PI;

fn main() -> lse::Result<()> {
  tracing_subscriber::fmt::init();

  let mut args = std::env::args().skip(1);
  let kind: SolverKind = args.next().as_deref().unwrap_or("faer-cholesky").parse()?;
  let ncells: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(1000);

  // Exact solution u(x) = sin(pi x) + x.
  let exact_sol = |x: f64| (PI * x).sin() + x;
  let load = |x: f64| PI * PI * (PI * x).sin();

  // Mesh of the unit interval [0, 1].
  let nnodes = ncells + 1;
  let h = (nnodes as f64 - 1.0).recip();
  let coord = |i: usize| i as f64 * h;

  let eqs = Equations::new(nnodes, &[0, nnodes - 1])?;
  println!("{eqs}");

  // Four entries per cell. Only the two boundary cells reach into Auk, Aku and Akk.
  let hints = [4 * ncells, 2, 2, 2];
  let mut sys = eqs.alloc::<f64>(Some(hints), true, true);

  // Element matrix of the laplacian on a cell of width h.
  let elmat = na::matrix![1.0, -1.0; -1.0, 1.0] / h;

  sys.start();
  for icell in 0..ncells {
    let dofs = [icell, icell + 1];
    for (il, &i) in dofs.iter().enumerate() {
      for (jl, &j) in dofs.iter().enumerate() {
        sys.put(i, j, elmat[(il, jl)])?;
      }
    }
  }

  let config = SolverConfig {
    symmetric: true,
    sym_pos_def: true,
    verbose: true,
  };
  let mut solver = kind.build::<f64>()?;
  // Lumped load vector.
  sys.solve_once(
    solver.as_mut(),
    &config,
    0.0,
    |i, _| exact_sol(coord(i)),
    |i, _| h * load(coord(i)),
  )?;

  let galsol = sys.solution()?;
  let exact: Vec<_> = (0..nnodes).map(|i| exact_sol(coord(i))).collect();
  let error = max_abs_diff(&galsol, &exact);
  println!("solver = {kind}, ncells = {ncells}, max nodal error = {error:e}");
  println!("boundary reactions = {:?}", sys.bk());

  Ok(())
}
