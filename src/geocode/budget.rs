/// Ceiling on metered API calls for one pipeline run.
///
/// Callers check [`CallBudget::remaining`] before a request and
/// [`CallBudget::consume`] after a successful one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallBudget {
    limit: usize,
    used: usize,
}

impl CallBudget {
    pub fn new(limit: usize) -> Self {
        Self { limit, used: 0 }
    }

    #[inline] pub fn limit(&self) -> usize { self.limit }

    #[inline] pub fn used(&self) -> usize { self.used }

    #[inline] pub fn remaining(&self) -> usize { self.limit.saturating_sub(self.used) }

    #[inline] pub fn is_exhausted(&self) -> bool { self.remaining() == 0 }

    /// Take one call from the budget. Returns false, and takes nothing, once exhausted.
    pub fn consume(&mut self) -> bool {
        if self.is_exhausted() { return false }
        self.used += 1;
        true
    }
}
