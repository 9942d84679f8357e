//! A chain of springs clamped at its left end and pulled at its right end
//! by a prescribed displacement. Solves for the interior displacements and
//! reports the support reactions, then repeats the solve for a sequence of
//! load steps reusing the assembled system.

extern crate nalgebra as na;

use lse::{
  io::{self, ComplexLayout},
  solver::SolverKind,
  CscMatrix, Equations, SolverConfig,
};

fn main() -> lse::Result<()> {
  tracing_subscriber::fmt::init();

  let stiffness = [100.0, 200.0, 50.0, 400.0];
  let nnodes = stiffness.len() + 1;
  let last = nnodes - 1;

  let eqs = Equations::new(nnodes, &[0, last])?;
  println!("{eqs:#}");
  let mut sys = eqs.alloc::<f64>(None, true, true);

  sys.start();
  for (e, &k) in stiffness.iter().enumerate() {
    let (i, j) = (e, e + 1);
    sys.put(i, i, k)?;
    sys.put(i, j, -k)?;
    sys.put(j, i, -k)?;
    sys.put(j, j, k)?;
  }

  let mut solver = SolverKind::FaerLu.build::<f64>()?;
  let config = SolverConfig::default();
  for step in 1..=4 {
    let t = step as f64 * 0.25;
    sys.solve_once(
      solver.as_mut(),
      &config,
      t,
      |i, t| if i == last { 0.01 * t } else { 0.0 },
      |_, _| 0.0,
    )?;
    let x = na::DVector::from_vec(sys.solution()?);
    println!(
      "t = {t:.2}: displacements = {:.6}, reactions = {:?}",
      x.transpose(),
      sys.bk()
    );
  }

  // The reactions of a free body in equilibrium cancel.
  let total: f64 = sys.bk().iter().sum();
  println!("sum of reactions = {total:e}");

  // Round trip of the compressed stiffness block through the interchange format.
  if let Some(blocks) = sys.compiled() {
    let path = std::env::temp_dir().join("reactions_auu.bin");
    io::save_csc(&path, &blocks.auu, ComplexLayout::default())?;
    let auu: CscMatrix = io::load_csc(&path)?;
    assert_eq!(&auu, &blocks.auu);
    println!("wrote Auu ({} nonzeros) to {}", auu.nnz(), path.display());
  }

  Ok(())
}
