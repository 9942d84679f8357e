//! Partitioning of a linear system into unknown and known (prescribed) equations.
//!
//! With the equations reordered as `[u, k]`, the system `A x = b` reads
//!
//! ```text
//! [ Auu Auk ] [ xu ]   [ bu ]
//! [ Aku Akk ] [ xk ] = [ bk ]
//! ```
//!
//! where `xk` and `bu` are given. The reduced system `Auu xu = bu - Auk xk`
//! yields `xu`, after which the reactions `bk = Aku xu + Akk xk` follow.

use crate::{
  arith,
  compile::Compiler,
  coo::CooMatrix,
  csc::CscMatrix,
  error::{Error, Result},
  solver::{SolverConfig, SparseSolver},
};

use common::{linalg::nalgebra::Matrix, util::sorted_unique, Scalar};

use itertools::Itertools;
use std::fmt;

/// One of the four blocks of a partitioned matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Block {
  Uu,
  Uk,
  Ku,
  Kk,
}

#[derive(Debug, Clone, Copy)]
enum Local {
  Unknown(usize),
  Known(usize),
}

/// Index maps between the full numbering `0..n` and the unknown and known partitions.
///
/// Both partitions keep the relative order of the full numbering,
/// so `utof` and `ktof` are increasing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equations {
  utof: Vec<usize>,
  ftou: Vec<Option<usize>>,
  ktof: Vec<usize>,
  ftok: Vec<Option<usize>>,
}

impl Equations {
  /// Partitions `0..n` into the equations listed in `known` and all others.
  pub fn new(n: usize, known: &[usize]) -> Result<Self> {
    if n < 1 {
      return Err(Error::InvalidDimension(
        "the number of equations must be at least 1".to_string(),
      ));
    }
    if let Some(&k) = known.iter().find(|&&k| k >= n) {
      return Err(Error::InvalidKnownSet(format!(
        "known equation {k} is out of range 0..{n}"
      )));
    }
    let known = sorted_unique(known).map_err(|k| {
      Error::InvalidKnownSet(format!("known equation {k} is listed more than once"))
    })?;

    let nk = known.len();
    let mut utof = Vec::with_capacity(n - nk);
    let mut ktof = Vec::with_capacity(nk);
    let mut ftou = vec![None; n];
    let mut ftok = vec![None; n];
    for f in 0..n {
      if known.binary_search(&f).is_ok() {
        ftok[f] = Some(ktof.len());
        ktof.push(f);
      } else {
        ftou[f] = Some(utof.len());
        utof.push(f);
      }
    }

    tracing::debug!(n, nu = utof.len(), nk, "partitioned equations");
    Ok(Self {
      utof,
      ftou,
      ktof,
      ftok,
    })
  }

  pub fn n(&self) -> usize {
    self.ftou.len()
  }
  pub fn nu(&self) -> usize {
    self.utof.len()
  }
  pub fn nk(&self) -> usize {
    self.ktof.len()
  }

  /// Full index of every unknown equation.
  pub fn utof(&self) -> &[usize] {
    &self.utof
  }
  /// Unknown index of every full equation, `None` for known ones.
  pub fn ftou(&self) -> &[Option<usize>] {
    &self.ftou
  }
  /// Full index of every known equation.
  pub fn ktof(&self) -> &[usize] {
    &self.ktof
  }
  /// Known index of every full equation, `None` for unknown ones.
  pub fn ftok(&self) -> &[Option<usize>] {
    &self.ftok
  }

  pub fn is_known(&self, f: usize) -> bool {
    self.ftok.get(f).is_some_and(Option::is_some)
  }

  #[inline]
  fn local(&self, f: usize) -> Option<Local> {
    match (self.ftou.get(f)?, self.ftok.get(f)?) {
      (Some(u), _) => Some(Local::Unknown(*u)),
      (None, Some(k)) => Some(Local::Known(*k)),
      (None, None) => None,
    }
  }

  /// Block and local indices of the full entry `(i, j)`.
  #[inline]
  pub fn locate(&self, i: usize, j: usize) -> Result<(Block, usize, usize)> {
    let out_of_range = || Error::IndexOutOfRange {
      row: i,
      col: j,
      nrows: self.n(),
      ncols: self.n(),
    };
    let li = self.local(i).ok_or_else(out_of_range)?;
    let lj = self.local(j).ok_or_else(out_of_range)?;
    Ok(match (li, lj) {
      (Local::Unknown(r), Local::Unknown(c)) => (Block::Uu, r, c),
      (Local::Unknown(r), Local::Known(c)) => (Block::Uk, r, c),
      (Local::Known(r), Local::Unknown(c)) => (Block::Ku, r, c),
      (Local::Known(r), Local::Known(c)) => (Block::Kk, r, c),
    })
  }

  fn check_parts(&self, full: usize, u: usize, k: usize) -> Result<()> {
    if full != self.n() || u != self.nu() || k != self.nk() {
      return Err(Error::DimensionMismatch(format!(
        "vectors of length (full={full}, u={u}, k={k}) do not fit (n={}, nu={}, nk={})",
        self.n(),
        self.nu(),
        self.nk()
      )));
    }
    Ok(())
  }

  /// Scatters the partitions `u` and `k` into `full`.
  pub fn join_vector<T: Scalar>(&self, full: &mut [T], u: &[T], k: &[T]) -> Result<()> {
    self.check_parts(full.len(), u.len(), k.len())?;
    for (&f, &v) in self.utof.iter().zip(u) {
      full[f] = v;
    }
    for (&f, &v) in self.ktof.iter().zip(k) {
      full[f] = v;
    }
    Ok(())
  }

  /// Gathers `full` into its partitions `u` and `k`.
  pub fn split_vector<T: Scalar>(&self, u: &mut [T], k: &mut [T], full: &[T]) -> Result<()> {
    self.check_parts(full.len(), u.len(), k.len())?;
    for (v, &f) in u.iter_mut().zip(&self.utof) {
      *v = full[f];
    }
    for (v, &f) in k.iter_mut().zip(&self.ktof) {
      *v = full[f];
    }
    Ok(())
  }

  /// Splits a dense full matrix into its four blocks.
  ///
  /// Without k blocks only `uu` and `uk` are extracted.
  pub fn split_dense<T: Scalar>(&self, a: &Matrix<T>, with_k_blocks: bool) -> Result<DenseBlocks<T>> {
    if a.nrows() != self.n() || a.ncols() != self.n() {
      return Err(Error::DimensionMismatch(format!(
        "expected a {n}x{n} matrix, got {}x{}",
        a.nrows(),
        a.ncols(),
        n = self.n()
      )));
    }
    let block = |rows: &[usize], cols: &[usize]| {
      Matrix::from_fn(rows.len(), cols.len(), |i, j| a[(rows[i], cols[j])])
    };
    Ok(DenseBlocks {
      uu: block(&self.utof, &self.utof),
      uk: block(&self.utof, &self.ktof),
      ku: with_k_blocks.then(|| block(&self.ktof, &self.utof)),
      kk: with_k_blocks.then(|| block(&self.ktof, &self.ktof)),
    })
  }

  /// Allocates the assembly buffers of the partitioned system.
  ///
  /// `hints` are the triplet capacities of `[Auu, Auk, Aku, Akk]` and default to
  /// the dense block sizes. Without k blocks, contributions to rows of known
  /// equations are dropped and the reactions `bk` are not computed.
  /// With `with_vectors` the four vectors are allocated right away,
  /// otherwise on the first solve.
  pub fn alloc<T: Scalar>(
    self,
    hints: Option<[usize; 4]>,
    with_k_blocks: bool,
    with_vectors: bool,
  ) -> PartitionedSystem<T> {
    let (nu, nk) = (self.nu(), self.nk());
    let [huu, huk, hku, hkk] = hints.unwrap_or([nu * nu, nu * nk, nk * nu, nk * nk]);
    let k_rows = with_k_blocks.then(|| KRows {
      aku: CooMatrix::with_shape(nk, nu, hku),
      akk: CooMatrix::with_shape(nk, nk, hkk),
    });
    let alloc_vec = |len: usize| {
      if with_vectors {
        vec![T::zero(); len]
      } else {
        Vec::new()
      }
    };
    PartitionedSystem {
      auu: CooMatrix::with_shape(nu, nu, huu),
      auk: CooMatrix::with_shape(nu, nk, huk),
      k_rows,
      compiler: Compiler::new(),
      compiled: None,
      xu: alloc_vec(nu),
      xk: alloc_vec(nk),
      bu: alloc_vec(nu),
      bk: alloc_vec(if with_k_blocks { nk } else { 0 }),
      eqs: self,
    }
  }
}

impl fmt::Display for Equations {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "N = {}, Nu = {}, Nk = {}", self.n(), self.nu(), self.nk())?;
    if f.alternate() {
      let signed = |map: &[Option<usize>]| {
        map
          .iter()
          .map(|i| i.map_or(-1, |i| i as isize))
          .join(", ")
      };
      writeln!(f)?;
      writeln!(f, "UtoF = [{}]", self.utof.iter().join(", "))?;
      writeln!(f, "FtoU = [{}]", signed(&self.ftou))?;
      writeln!(f, "KtoF = [{}]", self.ktof.iter().join(", "))?;
      write!(f, "FtoK = [{}]", signed(&self.ftok))?;
    }
    Ok(())
  }
}

/// Dense blocks of a partitioned matrix, see [`Equations::split_dense`].
#[derive(Debug, Clone, PartialEq)]
pub struct DenseBlocks<T: Scalar = f64> {
  pub uu: Matrix<T>,
  pub uk: Matrix<T>,
  pub ku: Option<Matrix<T>>,
  pub kk: Option<Matrix<T>>,
}

/// Compressed blocks of a partitioned matrix, see [`PartitionedSystem::compile`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledBlocks<T: Scalar = f64> {
  pub auu: CscMatrix<T>,
  pub auk: CscMatrix<T>,
  pub aku: Option<CscMatrix<T>>,
  pub akk: Option<CscMatrix<T>>,
}

#[derive(Debug, Clone)]
struct KRows<T: Scalar> {
  aku: CooMatrix<T>,
  akk: CooMatrix<T>,
}

/// A partitioned linear system under assembly.
///
/// Entries are put with full indices and routed into the triplet builders of
/// the four blocks. The builders are restarted by [`Self::start`], so the same
/// system can be re-assembled and re-solved, e.g. once per time step.
#[derive(Debug, Clone)]
pub struct PartitionedSystem<T: Scalar = f64> {
  eqs: Equations,
  auu: CooMatrix<T>,
  auk: CooMatrix<T>,
  k_rows: Option<KRows<T>>,
  compiler: Compiler,
  compiled: Option<CompiledBlocks<T>>,
  xu: Vec<T>,
  xk: Vec<T>,
  bu: Vec<T>,
  bk: Vec<T>,
}

impl<T: Scalar> PartitionedSystem<T> {
  pub fn equations(&self) -> &Equations {
    &self.eqs
  }
  pub fn has_k_blocks(&self) -> bool {
    self.k_rows.is_some()
  }

  /// Triplet builder of `block`, `None` for absent k blocks.
  pub fn coo(&self, block: Block) -> Option<&CooMatrix<T>> {
    match block {
      Block::Uu => Some(&self.auu),
      Block::Uk => Some(&self.auk),
      Block::Ku => self.k_rows.as_ref().map(|k| &k.aku),
      Block::Kk => self.k_rows.as_ref().map(|k| &k.akk),
    }
  }

  /// Blocks as compressed by the last [`Self::compile`] or [`Self::solve_once`].
  pub fn compiled(&self) -> Option<&CompiledBlocks<T>> {
    self.compiled.as_ref()
  }

  /// Restarts the assembly of all blocks.
  pub fn start(&mut self) {
    self.auu.reset();
    self.auk.reset();
    if let Some(k) = &mut self.k_rows {
      k.aku.reset();
      k.akk.reset();
    }
  }

  /// Adds `v` to the full entry `(i, j)`.
  #[inline]
  pub fn put(&mut self, i: usize, j: usize, v: T) -> Result<()> {
    let (block, r, c) = self.eqs.locate(i, j)?;
    match (block, &mut self.k_rows) {
      (Block::Uu, _) => self.auu.put(r, c, v),
      (Block::Uk, _) => self.auk.put(r, c, v),
      (Block::Ku, Some(k)) => k.aku.put(r, c, v),
      (Block::Kk, Some(k)) => k.akk.put(r, c, v),
      (Block::Ku | Block::Kk, None) => Ok(()),
    }
  }

  /// Compresses the assembled blocks.
  pub fn compile(&mut self) -> Result<&CompiledBlocks<T>> {
    let blocks = self.compile_blocks()?;
    Ok(self.compiled.insert(blocks))
  }

  fn compile_blocks(&mut self) -> Result<CompiledBlocks<T>> {
    let compiler = &mut self.compiler;
    let (aku, akk) = match &self.k_rows {
      Some(k) => (Some(compiler.compile(&k.aku)?), Some(compiler.compile(&k.akk)?)),
      None => (None, None),
    };
    Ok(CompiledBlocks {
      auu: compiler.compile(&self.auu)?,
      auk: compiler.compile(&self.auk)?,
      aku,
      akk,
    })
  }

  /// Solves the assembled system at time `t`.
  ///
  /// The prescribed values are `xk[k] = calc_xk(ktof[k], t)` and the right-hand side of
  /// the unknown equations is `bu[u] = calc_bu(utof[u], t)`. Afterwards [`Self::xu`] holds
  /// the solution and, with k blocks, [`Self::bk`] the reactions.
  /// Errors of the solver are propagated unchanged.
  pub fn solve_once(
    &mut self,
    solver: &mut dyn SparseSolver<T>,
    config: &SolverConfig,
    t: f64,
    calc_xk: impl Fn(usize, f64) -> T,
    calc_bu: impl Fn(usize, f64) -> T,
  ) -> Result<()> {
    let (nu, nk) = (self.eqs.nu(), self.eqs.nk());
    self.xu.resize(nu, T::zero());
    self.xk.resize(nk, T::zero());
    self.bu.resize(nu, T::zero());
    self.bk.resize(if self.has_k_blocks() { nk } else { 0 }, T::zero());

    for (x, &f) in self.xk.iter_mut().zip(&self.eqs.ktof) {
      *x = calc_xk(f, t);
    }
    for (b, &f) in self.bu.iter_mut().zip(&self.eqs.utof) {
      *b = calc_bu(f, t);
    }

    let blocks = self.compile_blocks()?;
    tracing::debug!(
      nu,
      nk,
      nnz_uu = blocks.auu.nnz(),
      nnz_uk = blocks.auk.nnz(),
      "compiled partitioned system"
    );

    // bu' = bu - Auk xk
    let mut rhs = self.bu.clone();
    arith::mat_vec_add(&mut rhs, -T::one(), &blocks.auk, &self.xk, false)?;

    if nu > 0 {
      solver.init(&blocks.auu, config)?;
      solver.factorize(&blocks.auu)?;
      solver.solve(&mut self.xu, &rhs)?;
    }

    // bk = Aku xu + Akk xk
    if let (Some(aku), Some(akk)) = (&blocks.aku, &blocks.akk) {
      arith::mat_vec(&mut self.bk, T::one(), aku, &self.xu, false)?;
      arith::mat_vec_add(&mut self.bk, T::one(), akk, &self.xk, false)?;
    }

    tracing::debug!(t, "solved partitioned system");
    self.compiled = Some(blocks);
    Ok(())
  }

  pub fn xu(&self) -> &[T] {
    &self.xu
  }
  pub fn xk(&self) -> &[T] {
    &self.xk
  }
  pub fn bu(&self) -> &[T] {
    &self.bu
  }
  /// Reactions of the known equations. Empty without k blocks.
  pub fn bk(&self) -> &[T] {
    &self.bk
  }

  /// Full solution vector `x` joined from `xu` and `xk`.
  pub fn solution(&self) -> Result<Vec<T>> {
    let mut x = vec![T::zero(); self.eqs.n()];
    self.eqs.join_vector(&mut x, &self.xu, &self.xk)?;
    Ok(x)
  }

  /// Full right-hand side `b` joined from `bu` and `bk`.
  ///
  /// Needs the reactions `bk`, so a system allocated without k blocks
  /// fails as soon as it has known equations.
  pub fn rhs(&self) -> Result<Vec<T>> {
    if !self.has_k_blocks() && self.eqs.nk() > 0 {
      return Err(Error::DimensionMismatch(format!(
        "the right-hand side of the {} known equations needs the k blocks",
        self.eqs.nk()
      )));
    }
    let mut b = vec![T::zero(); self.eqs.n()];
    self.eqs.join_vector(&mut b, &self.bu, &self.bk)?;
    Ok(b)
  }
}

#[cfg(test)]
mod test {
  use super::{Block, Equations};
  use crate::{
    error::Error,
    solver::{DenseLu, SolverConfig},
  };

  use approx::assert_relative_eq;
  use common::linalg::nalgebra::{assert_mat_eq, Matrix};

  #[test]
  fn maps_keep_relative_order() {
    let eqs = Equations::new(9, &[0, 6, 3]).unwrap();
    assert_eq!(eqs.nu(), 6);
    assert_eq!(eqs.nk(), 3);
    assert_eq!(eqs.utof(), &[1, 2, 4, 5, 7, 8]);
    assert_eq!(eqs.ktof(), &[0, 3, 6]);
    assert_eq!(
      eqs.ftou(),
      &[None, Some(0), Some(1), None, Some(2), Some(3), None, Some(4), Some(5)]
    );
    assert_eq!(
      eqs.ftok(),
      &[Some(0), None, None, Some(1), None, None, Some(2), None, None]
    );
  }

  #[test]
  fn maps_are_complete() {
    for known in [vec![], vec![0, 1, 2, 3], vec![2], vec![3, 0]] {
      let eqs = Equations::new(4, &known).unwrap();
      assert_eq!(eqs.nu() + eqs.nk(), 4);
      for f in 0..4 {
        match (eqs.ftou()[f], eqs.ftok()[f]) {
          (Some(u), None) => assert_eq!(eqs.utof()[u], f),
          (None, Some(k)) => assert_eq!(eqs.ktof()[k], f),
          other => panic!("equation {f} is mapped as {other:?}"),
        }
      }
    }
  }

  #[test]
  fn rejects_invalid_known_sets() {
    assert!(matches!(
      Equations::new(0, &[]),
      Err(Error::InvalidDimension(_))
    ));
    assert!(matches!(
      Equations::new(3, &[3]),
      Err(Error::InvalidKnownSet(_))
    ));
    assert!(matches!(
      Equations::new(3, &[1, 2, 1]),
      Err(Error::InvalidKnownSet(_))
    ));
  }

  #[test]
  fn locate_routes_into_blocks() {
    let eqs = Equations::new(5, &[4, 2]).unwrap();
    assert_eq!(eqs.locate(0, 3).unwrap(), (Block::Uu, 0, 2));
    assert_eq!(eqs.locate(1, 4).unwrap(), (Block::Uk, 1, 1));
    assert_eq!(eqs.locate(2, 1).unwrap(), (Block::Ku, 0, 1));
    assert_eq!(eqs.locate(4, 2).unwrap(), (Block::Kk, 1, 0));
    assert!(matches!(
      eqs.locate(0, 5),
      Err(Error::IndexOutOfRange { row: 0, col: 5, .. })
    ));
  }

  fn full_5x5() -> Matrix {
    Matrix::from_fn(5, 5, |i, j| (10 * (i + 1) + j + 1) as f64)
  }

  #[test]
  fn put_assembles_blocks() {
    let eqs = Equations::new(5, &[4, 2]).unwrap();
    let full = full_5x5();
    let mut sys = eqs.alloc::<f64>(None, true, true);
    for _ in 0..2 {
      sys.start();
      for i in 0..5 {
        for j in 0..5 {
          sys.put(i, j, full[(i, j)]).unwrap();
        }
      }
    }
    assert_eq!(sys.coo(Block::Uu).unwrap().len(), 9);

    let blocks = sys.compile().unwrap().clone();
    #[rustfmt::skip]
    let uu = na::dmatrix![
      11.0, 12.0, 14.0;
      21.0, 22.0, 24.0;
      41.0, 42.0, 44.0;
    ];
    #[rustfmt::skip]
    let uk = na::dmatrix![
      13.0, 15.0;
      23.0, 25.0;
      43.0, 45.0;
    ];
    #[rustfmt::skip]
    let ku = na::dmatrix![
      31.0, 32.0, 34.0;
      51.0, 52.0, 54.0;
    ];
    #[rustfmt::skip]
    let kk = na::dmatrix![
      33.0, 35.0;
      53.0, 55.0;
    ];
    assert_mat_eq(&blocks.auu.to_dense(), &uu, None);
    assert_mat_eq(&blocks.auk.to_dense(), &uk, None);
    assert_mat_eq(&blocks.aku.unwrap().to_dense(), &ku, None);
    assert_mat_eq(&blocks.akk.unwrap().to_dense(), &kk, None);

    let dense = sys.equations().split_dense(&full, true).unwrap();
    assert_mat_eq(&dense.uu, &uu, None);
    assert_mat_eq(&dense.uk, &uk, None);
    assert_mat_eq(&dense.ku.unwrap(), &ku, None);
    assert_mat_eq(&dense.kk.unwrap(), &kk, None);

    let dense = sys.equations().split_dense(&full, false).unwrap();
    assert!(dense.ku.is_none() && dense.kk.is_none());
  }

  #[test]
  fn without_k_blocks_known_rows_are_dropped() {
    let eqs = Equations::new(3, &[1]).unwrap();
    let mut sys = eqs.alloc::<f64>(None, false, false);
    sys.put(1, 0, 1.0).unwrap();
    sys.put(1, 1, 1.0).unwrap();
    sys.put(0, 1, 2.0).unwrap();
    assert!(sys.coo(Block::Ku).is_none());
    assert_eq!(sys.coo(Block::Uk).unwrap().len(), 1);
    assert!(matches!(
      sys.put(0, 3, 1.0),
      Err(Error::IndexOutOfRange { .. })
    ));
  }

  #[test]
  fn put_fails_beyond_hints() {
    let eqs = Equations::new(2, &[1]).unwrap();
    let mut sys = eqs.alloc::<f64>(Some([1, 0, 0, 0]), true, false);
    sys.put(0, 0, 1.0).unwrap();
    assert!(matches!(
      sys.put(0, 0, 1.0),
      Err(Error::CapacityExceeded { capacity: 1 })
    ));
    assert!(matches!(
      sys.put(1, 1, 1.0),
      Err(Error::CapacityExceeded { capacity: 0 })
    ));
  }

  #[test]
  fn join_and_split_are_inverse() {
    let full: Vec<f64> = (0..6).map(|i| i as f64 * 1.5 - 2.0).collect();
    for known in [vec![], vec![5, 0, 2], vec![0, 1, 2, 3, 4, 5]] {
      let eqs = Equations::new(6, &known).unwrap();
      let mut u = vec![0.0; eqs.nu()];
      let mut k = vec![0.0; eqs.nk()];
      eqs.split_vector(&mut u, &mut k, &full).unwrap();
      let mut joined = vec![f64::NAN; 6];
      eqs.join_vector(&mut joined, &u, &k).unwrap();
      assert_eq!(joined, full);
    }

    let eqs = Equations::new(6, &[1]).unwrap();
    let mut u = vec![0.0; 4];
    let mut k = vec![0.0; 1];
    assert!(matches!(
      eqs.split_vector(&mut u, &mut k, &full),
      Err(Error::DimensionMismatch(_))
    ));
  }

  #[test]
  fn display() {
    let eqs = Equations::new(4, &[2]).unwrap();
    assert_eq!(eqs.to_string(), "N = 4, Nu = 3, Nk = 1");
    assert_eq!(
      format!("{eqs:#}"),
      "N = 4, Nu = 3, Nk = 1\n\
       UtoF = [0, 1, 3]\n\
       FtoU = [0, 1, -1, 2]\n\
       KtoF = [2]\n\
       FtoK = [-1, -1, 0, -1]"
    );
  }

  #[rustfmt::skip]
  fn scenario_matrix() -> Matrix {
    na::dmatrix![
       1.0, 3.0,-2.0, 11.0, 0.0;
       3.0, 5.0, 6.0,  4.0, 1.0;
       2.0, 4.0, 3.0, -3.0, 0.0;
      -1.0, 2.0, 3.0,  2.0, 1.0;
       4.0, 1.0,-3.0,  5.0, 0.0;
    ]
  }

  #[test]
  fn solve_with_known_equations() {
    let a = scenario_matrix();
    let eqs = Equations::new(5, &[3, 4]).unwrap();
    let mut sys = eqs.alloc::<f64>(None, true, false);
    sys.start();
    for i in 0..5 {
      for j in 0..5 {
        if a[(i, j)] != 0.0 {
          sys.put(i, j, a[(i, j)]).unwrap();
        }
      }
    }

    let bu = [5.0, 7.0, 8.0];
    let mut solver = DenseLu::default();
    sys
      .solve_once(
        &mut solver,
        &SolverConfig::default(),
        0.0,
        |_, _| 0.0,
        |f, _| bu[f],
      )
      .unwrap();
    assert_relative_eq!(sys.xu(), [-15.0, 8.0, 2.0].as_slice(), epsilon = 1e-12);
    assert_relative_eq!(sys.bk(), [37.0, -58.0].as_slice(), epsilon = 1e-12);
    assert_relative_eq!(
      sys.solution().unwrap().as_slice(),
      [-15.0, 8.0, 2.0, 0.0, 0.0].as_slice(),
      epsilon = 1e-12
    );
    assert_relative_eq!(
      sys.rhs().unwrap().as_slice(),
      [5.0, 7.0, 8.0, 37.0, -58.0].as_slice(),
      epsilon = 1e-12
    );
  }

  #[test]
  fn solve_with_prescribed_values() {
    // x = [1, 2, 3] with x1 = 2 prescribed.
    #[rustfmt::skip]
    let a = na::dmatrix![
      4.0, 1.0, 0.0;
      1.0, 4.0, 1.0;
      0.0, 1.0, 4.0;
    ];
    let x = na::dvector![1.0, 2.0, 3.0];
    let b = &a * &x;

    let eqs = Equations::new(3, &[1]).unwrap();
    let mut sys = eqs.alloc::<f64>(None, true, true);
    for i in 0..3 {
      for j in 0..3 {
        sys.put(i, j, a[(i, j)]).unwrap();
      }
    }
    let mut solver = DenseLu::default();
    sys
      .solve_once(
        &mut solver,
        &SolverConfig::default(),
        1.0,
        |f, t| x[f] * t,
        |f, _| b[f],
      )
      .unwrap();
    assert_relative_eq!(sys.solution().unwrap().as_slice(), x.as_slice(), epsilon = 1e-12);
    assert_relative_eq!(sys.rhs().unwrap().as_slice(), b.as_slice(), epsilon = 1e-12);
  }

  #[test]
  fn rhs_needs_k_blocks() {
    let eqs = Equations::new(2, &[1]).unwrap();
    let mut sys = eqs.alloc::<f64>(None, false, false);
    sys.put(0, 0, 2.0).unwrap();
    sys.put(0, 1, 1.0).unwrap();
    let mut solver = DenseLu::default();
    sys
      .solve_once(
        &mut solver,
        &SolverConfig::default(),
        0.0,
        |_, _| 3.0,
        |_, _| 5.0,
      )
      .unwrap();
    assert_eq!(sys.solution().unwrap(), vec![1.0, 3.0]);
    assert!(sys.bk().is_empty());
    assert!(matches!(sys.rhs(), Err(Error::DimensionMismatch(_))));
  }

  #[test]
  fn all_known_needs_no_solver() {
    let eqs = Equations::new(2, &[0, 1]).unwrap();
    let mut sys = eqs.alloc::<f64>(None, true, false);
    sys.put(0, 0, 2.0).unwrap();
    sys.put(1, 0, 1.0).unwrap();
    sys.put(1, 1, 3.0).unwrap();
    let mut solver = DenseLu::default();
    sys
      .solve_once(
        &mut solver,
        &SolverConfig::default(),
        0.0,
        |f, _| (f + 1) as f64,
        |_, _| unreachable!(),
      )
      .unwrap();
    assert!(sys.xu().is_empty());
    assert_eq!(sys.bk(), &[2.0, 7.0]);
  }
}
