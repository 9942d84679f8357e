pub trait CumsumExt {
  fn cumsum(self) -> impl Iterator<Item = usize>;
}
impl<I: IntoIterator<Item = usize>> CumsumExt for I {
  fn cumsum(self) -> impl Iterator<Item = usize> {
    self.into_iter().scan(0, |acc, x| {
      *acc += x;
      Some(*acc)
    })
  }
}

/// Exclusive prefix sum: `[0, c0, c0+c1, ...]` of length `counts.len() + 1`.
pub fn offsets_from_counts(counts: impl IntoIterator<Item = usize>) -> Vec<usize> {
  std::iter::once(0).chain(counts.cumsum()).collect()
}

/// Sorted copy of `indices`.
///
/// Fails with the first value (in sorted order) that occurs more than once.
pub fn sorted_unique(indices: &[usize]) -> Result<Vec<usize>, usize> {
  let mut sorted = indices.to_vec();
  sorted.sort_unstable();
  match sorted.windows(2).find(|w| w[0] == w[1]) {
    Some(w) => Err(w[0]),
    None => Ok(sorted),
  }
}
