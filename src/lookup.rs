use std::{collections::BTreeMap, path::Path};

use anyhow::{Context, Result};

use crate::geocode::status::NOT_FOUND;

/// Bundled table; intentionally partial.
const DEFAULT_TABLE: &str = include_str!("../data/admin_lookup.json");

/// County → sub-county → known ward names, used to turn a reverse-geocoded
/// (county, ward) pair into (sub-county, ward).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminLookup {
    counties: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl AdminLookup {
    /// The table shipped with the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_json(DEFAULT_TABLE).context("[lookup] Bundled lookup table is invalid")
    }

    /// Parse `{"County": {"Sub-county": ["Ward", ...]}}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let counties = serde_json::from_str(json)
            .context("[lookup] Expected an object of county -> sub-county -> [ward]")?;
        Ok(Self { counties })
    }

    /// Read a table from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("[lookup] Failed to read lookup table: {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("[lookup] Invalid lookup table: {}", path.display()))
    }

    #[inline] pub fn county_count(&self) -> usize { self.counties.len() }

    /// Find the sub-county whose ward list contains `ward` exactly.
    /// Sub-counties are scanned in name order; unknown pairs give `("Not Found", "Not Found")`.
    pub fn lookup_subcounty_ward(&self, county: &str, ward: &str) -> (String, String) {
        self.counties.get(county)
            .and_then(|subcounties| {
                subcounties.iter()
                    .find(|(_, wards)| wards.iter().any(|w| w == ward))
                    .map(|(subcounty, _)| (subcounty.clone(), ward.to_string()))
            })
            .unwrap_or_else(|| (NOT_FOUND.to_string(), NOT_FOUND.to_string()))
    }
}
