/// Where point indices went after a removal.
///
/// Point identity is positional, so anyone holding an index across a removal
/// (a selection, a pinned point) must pass it through [`IndexRemap::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRemap {
    map: Vec<Option<usize>>,
}

impl IndexRemap {
    /// Nothing moved.
    pub fn identity(count: usize) -> Self {
        Self {
            map: (0..count).map(Some).collect(),
        }
    }

    /// Compaction of `keep.len()` points down to the ones flagged `true`.
    pub(crate) fn from_keep_mask(keep: &[bool]) -> Self {
        let mut next = 0;
        let map = keep
            .iter()
            .map(|&k| {
                if k {
                    next += 1;
                    Some(next - 1)
                } else {
                    None
                }
            })
            .collect();
        Self { map }
    }

    /// New index of the point formerly at `old`, `None` if it was removed.
    pub fn apply(&self, old: usize) -> Option<usize> {
        self.map.get(old).copied().flatten()
    }

    /// Remap an optional index, clearing it if the point is gone.
    pub fn apply_opt(&self, old: Option<usize>) -> Option<usize> {
        old.and_then(|i| self.apply(i))
    }

    /// Number of points removed.
    pub fn removed(&self) -> usize {
        self.map.iter().filter(|m| m.is_none()).count()
    }

    pub fn is_identity(&self) -> bool {
        self.map.iter().enumerate().all(|(i, m)| *m == Some(i))
    }
}
