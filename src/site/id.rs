use std::fmt;

/// Stable key for a site, assigned once at load time.
/// Holds the zero-based row position in the input file, so reports stay
/// correct even if records are later filtered or reordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SiteId(usize);

impl SiteId {
    #[inline] pub fn new(row: usize) -> Self { Self(row) }

    /// Row position in the input file.
    #[inline] pub fn row(&self) -> usize { self.0 }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
