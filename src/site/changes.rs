use std::{collections::BTreeSet, fmt};

use crate::site::SiteId;

/// Ids of the sites whose tracked fields were modified by one or more stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    ids: BTreeSet<SiteId>,
}

impl ChangeSet {
    pub fn new() -> Self { Self::default() }

    /// Record a changed site. Returns false if it was already recorded.
    #[inline] pub fn insert(&mut self, id: SiteId) -> bool { self.ids.insert(id) }

    #[inline] pub fn contains(&self, id: SiteId) -> bool { self.ids.contains(&id) }

    #[inline] pub fn len(&self) -> usize { self.ids.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.ids.is_empty() }

    /// Ids in ascending row order.
    pub fn iter(&self) -> impl Iterator<Item = SiteId> + '_ { self.ids.iter().copied() }

    /// Fold another stage's changes into this one.
    pub fn merge(&mut self, other: &ChangeSet) {
        self.ids.extend(other.ids.iter().copied());
    }
}

impl FromIterator<SiteId> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = SiteId>>(iter: I) -> Self {
        Self { ids: iter.into_iter().collect() }
    }
}

impl fmt::Display for ChangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, id) in self.ids.iter().enumerate() {
            if i > 0 { write!(f, ", ")?; }
            write!(f, "{id}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_deduplicates_and_orders() {
        let mut forward: ChangeSet = [SiteId::new(4), SiteId::new(1)].into_iter().collect();
        let spatial: ChangeSet = [SiteId::new(1), SiteId::new(2)].into_iter().collect();

        forward.merge(&spatial);

        assert_eq!(forward.len(), 3);
        assert_eq!(forward.iter().map(|id| id.row()).collect::<Vec<_>>(), vec![1, 2, 4]);
        assert_eq!(forward.to_string(), "[1, 2, 4]");
    }
}
