use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::reconcile::Precedence;

/// Default Google-compatible geocoding endpoint.
pub(crate) const DEFAULT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Which geocoding stage runs before the spatial join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Fill missing coordinates from the site address.
    #[default]
    Forward,
    /// Fill missing constituency/ward from the coordinates and the lookup table.
    Reverse,
}

/// Column names of the site register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub region: String,
    pub county: String,
    pub site_name: String,
    pub coordinates: String,
    pub ward: String,
    pub constituency: String,
    /// Status column written by the geocoding stage; defaults depend on the mode.
    pub status: Option<String>,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            region: "REGION".to_string(),
            county: "COUNTY".to_string(),
            site_name: "SITENAME".to_string(),
            coordinates: "SITECOORDINATES".to_string(),
            ward: "WARD".to_string(),
            constituency: "CONSTITUENCY".to_string(),
            status: None,
        }
    }
}

impl ColumnMap {
    /// Resolve the status column name for a mode.
    pub fn status_for(&self, mode: Mode) -> &str {
        match (&self.status, mode) {
            (Some(name), _) => name,
            (None, Mode::Forward) => "GEOCODE_STATUS",
            (None, Mode::Reverse) => "STATUS",
        }
    }
}

/// Attribute names in the boundary layer, and how to reproject it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryFields {
    pub county: String,
    /// Matched against the register's constituency column.
    pub subcounty: String,
    pub ward: String,
    /// PROJ.4 definition of the layer's CRS; overrides the `.prj` sidecar.
    pub source_proj4: Option<String>,
}

impl Default for BoundaryFields {
    fn default() -> Self {
        Self {
            county: "county".to_string(),
            subcounty: "subcounty".to_string(),
            ward: "ward".to_string(),
            source_proj4: None,
        }
    }
}

/// Run configuration, read from TOML and overridden from the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Intermediate file written after the geocoding stage.
    pub partial_output: Option<PathBuf>,
    /// Boundary shapefile, or a directory holding one.
    pub boundaries: Option<PathBuf>,
    /// JSON county → sub-county → wards table; the bundled table is used if unset.
    pub lookup: Option<PathBuf>,
    pub api_key: String,
    pub endpoint: String,
    /// Ceiling on successful metered API calls for the run.
    pub max_requests: usize,
    pub timeout_secs: u64,
    /// WHATWG encoding label for both input and output files.
    pub encoding: String,
    pub mode: Mode,
    pub precedence: Precedence,
    pub columns: ColumnMap,
    pub boundary: BoundaryFields,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from("Sites.csv"),
            output: PathBuf::from("updated_sites.csv"),
            partial_output: None,
            boundaries: None,
            lookup: None,
            api_key: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_requests: 5,
            timeout_secs: 10,
            encoding: "ISO-8859-1".to_string(),
            mode: Mode::default(),
            precedence: Precedence::default(),
            columns: ColumnMap::default(),
            boundary: BoundaryFields::default(),
        }
    }
}

impl Config {
    /// Read a TOML config file; missing keys take their defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("[config] Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("[config] Invalid config file: {}", path.display()))
    }

    /// Parse config from a TOML string.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Where the partial result goes: explicit path, or the reverse-mode default next to the output.
    pub fn partial_output_path(&self) -> Option<PathBuf> {
        match (&self.partial_output, self.mode) {
            (Some(path), _) => Some(path.clone()),
            (None, Mode::Reverse) => Some(self.output.with_file_name("updated_sites_partial.csv")),
            (None, Mode::Forward) => None,
        }
    }

    /// Check for settings that would make the run meaningless.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.timeout_secs > 0, "[config] timeout_secs must be positive");
        ensure!(
            encoding_rs::Encoding::for_label(self.encoding.as_bytes()).is_some(),
            "[config] Unknown text encoding: {}", self.encoding
        );
        let c = &self.columns;
        let names = [&c.region, &c.county, &c.site_name, &c.coordinates, &c.ward, &c.constituency];
        ensure!(names.iter().all(|n| !n.is_empty()), "[config] Column names must not be empty");
        ensure!(c.ward != c.constituency, "[config] Ward and constituency columns must differ");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(r#"
            input = "facilities.csv"
            mode = "reverse"
            precedence = "boundary-first"
            max_requests = 50

            [columns]
            coordinates = "GPS"

            [boundary]
            subcounty = "SUBCOUNTY"
        "#).unwrap();

        assert_eq!(config.input, PathBuf::from("facilities.csv"));
        assert_eq!(config.output, PathBuf::from("updated_sites.csv"));
        assert_eq!(config.mode, Mode::Reverse);
        assert_eq!(config.precedence, Precedence::BoundaryFirst);
        assert_eq!(config.max_requests, 50);
        assert_eq!(config.columns.coordinates, "GPS");
        assert_eq!(config.columns.ward, "WARD");
        assert_eq!(config.boundary.subcounty, "SUBCOUNTY");
        assert_eq!(config.boundary.ward, "ward");
        assert_eq!(config.columns.status_for(config.mode), "STATUS");
    }

    #[test]
    fn reverse_mode_writes_partial_next_to_output() {
        let mut config = Config { output: PathBuf::from("out/final.csv"), ..Default::default() };
        assert_eq!(config.partial_output_path(), None);

        config.mode = Mode::Reverse;
        assert_eq!(config.partial_output_path(), Some(PathBuf::from("out/updated_sites_partial.csv")));
    }

    #[test]
    fn rejects_unknown_encoding() {
        assert!(Config::from_toml_str(r#"encoding = "klingon-8""#).is_err());
        assert!(Config::from_toml_str(r#"encoding = "utf-8""#).is_ok());
    }
}
