mod changes;
mod id;
mod record;
mod table;

pub use changes::ChangeSet;
pub use id::SiteId;
pub(crate) use record::format_coordinates;
pub use record::{SiteRecord, is_unset, parse_coordinates};
pub use table::SiteTable;
