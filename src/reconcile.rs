use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    boundary::BoundaryAttributes,
    site::{ChangeSet, SiteRecord, is_unset},
};

/// Which source wins when a record field and the containing polygon disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Precedence {
    /// Keep the record's value; fall back to the polygon only when the field is unset.
    #[default]
    RecordFirst,
    /// Prefer the polygon whenever it has a value; keep the record's value otherwise.
    BoundaryFirst,
}

impl Precedence {
    /// Choose the final value for one field.
    pub fn merge(self, current: Option<&str>, boundary: Option<&str>) -> Option<String> {
        let boundary = boundary.map(str::trim).filter(|b| !b.is_empty());
        let pick_boundary = match self {
            Precedence::RecordFirst => is_unset(current),
            Precedence::BoundaryFirst => true,
        };
        match boundary {
            Some(b) if pick_boundary => Some(b.to_string()),
            _ => current.map(str::to_string),
        }
    }
}

/// Merge joined polygon attributes into ward (← `ward`) and constituency
/// (← `subcounty`). `matches` is aligned with `records`.
pub(crate) fn reconcile(
    records: &mut [SiteRecord],
    matches: &[Option<&BoundaryAttributes>],
    precedence: Precedence,
) -> ChangeSet {
    debug_assert_eq!(records.len(), matches.len());
    let mut changes = ChangeSet::new();

    for (record, matched) in records.iter_mut().zip(matches) {
        let ward = precedence.merge(record.ward.as_deref(), matched.and_then(|a| a.ward.as_deref()));
        let constituency = precedence.merge(
            record.constituency.as_deref(),
            matched.and_then(|a| a.subcounty.as_deref()),
        );

        if ward != record.ward || constituency != record.constituency {
            changes.insert(record.id);
            record.ward = ward;
            record.constituency = constituency;
        }
    }

    info!(changed = changes.len(), ?precedence, "boundary reconciliation done");
    changes
}
