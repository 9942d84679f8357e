//! Dense row marker shared by the column sweeps of the compiler and the
//! sparse addition.
//!
//! Each row remembers the generation in which it was last touched together
//! with the slot it was assigned then. Starting a new column only bumps the
//! generation, so no O(nrows) reset happens between columns.

#[derive(Debug, Default, Clone)]
pub(crate) struct RowMarker {
  stamps: Vec<usize>,
  slots: Vec<usize>,
  generation: usize,
}

impl RowMarker {
  /// Prepares the marker for matrices with `nrows` rows.
  ///
  /// Storage is kept when the marker is reused for a matrix of the same or smaller height.
  pub fn prepare(&mut self, nrows: usize) {
    if self.stamps.len() < nrows {
      self.stamps.resize(nrows, 0);
      self.slots.resize(nrows, 0);
    }
    // Fresh generation so that stamps of a previous matrix never match.
    self.next_generation();
  }

  pub fn next_generation(&mut self) {
    self.generation += 1;
  }

  /// Slot assigned to `row` during the current generation.
  #[inline]
  pub fn slot(&self, row: usize) -> Option<usize> {
    (self.stamps[row] == self.generation).then_some(self.slots[row])
  }

  #[inline]
  pub fn mark(&mut self, row: usize, slot: usize) {
    self.stamps[row] = self.generation;
    self.slots[row] = slot;
  }
}

#[cfg(test)]
mod test {
  use super::RowMarker;

  #[test]
  fn generations_isolate_columns() {
    let mut marker = RowMarker::default();
    marker.prepare(4);
    assert_eq!(marker.slot(2), None);
    marker.mark(2, 7);
    assert_eq!(marker.slot(2), Some(7));

    marker.next_generation();
    assert_eq!(marker.slot(2), None);

    marker.prepare(6);
    assert_eq!(marker.slot(5), None);
    marker.mark(5, 0);
    assert_eq!(marker.slot(5), Some(0));
  }
}
