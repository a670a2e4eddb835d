//! The original-to-replacement declaration map shared by the cloner and the rebinder.

use crate::CloneError;
use astclone_ir::DeclId;
use std::collections::HashMap;

/// Maps an original declaration to the declaration that replaces it.
///
/// Entries come from two places: the caller may seed the map before cloning (for instance
/// parameter to parameter), and the declaration cloner records every variable it clones. A
/// declaration is recorded at most once per map.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeclSubstitutionMap {
    map: HashMap<DeclId, DeclId>,
}

impl DeclSubstitutionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a caller-provided substitution, replacing any earlier seed for `original`.
    pub fn seed(&mut self, original: DeclId, replacement: DeclId) -> Option<DeclId> {
        self.map.insert(original, replacement)
    }

    /// Records that `original` was cloned as `clone`.
    pub fn record(&mut self, original: DeclId, clone: DeclId) -> Result<(), CloneError> {
        if self.map.contains_key(&original) {
            return Err(CloneError::AlreadyCloned(original));
        }
        self.map.insert(original, clone);
        Ok(())
    }

    pub fn get(&self, original: DeclId) -> Option<DeclId> {
        self.map.get(&original).copied()
    }

    pub fn contains(&self, original: DeclId) -> bool {
        self.map.contains_key(&original)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeclId, DeclId)> + '_ {
        self.map.iter().map(|(k, v)| (*k, *v))
    }
}

impl FromIterator<(DeclId, DeclId)> for DeclSubstitutionMap {
    fn from_iter<I: IntoIterator<Item = (DeclId, DeclId)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_append_only() {
        let mut map = DeclSubstitutionMap::new();
        map.record(DeclId(1), DeclId(10)).unwrap();
        assert_eq!(
            map.record(DeclId(1), DeclId(11)),
            Err(CloneError::AlreadyCloned(DeclId(1)))
        );
        assert_eq!(map.get(DeclId(1)), Some(DeclId(10)));
    }

    #[test]
    fn seeded_entries_block_recording() {
        let mut map: DeclSubstitutionMap = [(DeclId(1), DeclId(2))].into_iter().collect();
        assert_eq!(map.seed(DeclId(3), DeclId(4)), None);
        assert_eq!(map.len(), 2);
        assert!(map.record(DeclId(3), DeclId(5)).is_err());
        assert_eq!(map.get(DeclId(7)), None);
    }
}
