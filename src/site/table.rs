use std::path::Path;

use anyhow::{Context, Result};
use polars::{frame::DataFrame, prelude::{Column, DataType}};
use tracing::{debug, warn};

use crate::{config::ColumnMap, io, site::{SiteId, SiteRecord}};

/// The site register: the raw frame for pass-through columns, plus one
/// typed record per row for the columns the pipeline works on.
#[derive(Debug, Clone)]
pub struct SiteTable {
    frame: DataFrame,
    records: Vec<SiteRecord>,
    columns: ColumnMap,
}

impl SiteTable {
    /// Load the register from an encoded CSV file. A decode failure is fatal.
    pub fn read_csv(path: &Path, encoding: &str, columns: &ColumnMap) -> Result<Self> {
        let frame = io::csv::read_csv(path, encoding)?;
        Self::from_frame(frame, columns)
            .with_context(|| format!("[site::table] Failed to load sites from {}", path.display()))
    }

    /// Load the register from CSV text.
    pub fn from_csv_str(csv: &str, columns: &ColumnMap) -> Result<Self> {
        Self::from_frame(io::csv::read_csv_string(csv)?, columns)
    }

    /// Build records from a frame; a configured column that is missing reads as absent.
    pub(crate) fn from_frame(frame: DataFrame, columns: &ColumnMap) -> Result<Self> {
        let height = frame.height();

        let read = |name: &str| -> Result<Vec<Option<String>>> {
            let Ok(column) = frame.column(name) else {
                warn!(column = name, "column not found in input; treating every value as absent");
                return Ok(vec![None; height]);
            };
            let series = column.as_materialized_series().cast(&DataType::String)?;
            Ok(series.str()?.into_iter()
                .map(|v| v.filter(|s| !s.is_empty()).map(str::to_string))
                .collect())
        };

        let mut region = read(&columns.region)?.into_iter();
        let mut county = read(&columns.county)?.into_iter();
        let mut site_name = read(&columns.site_name)?.into_iter();
        let mut coordinates = read(&columns.coordinates)?.into_iter();
        let mut ward = read(&columns.ward)?.into_iter();
        let mut constituency = read(&columns.constituency)?.into_iter();

        let records = (0..height)
            .map(|row| SiteRecord {
                id: SiteId::new(row),
                region: region.next().flatten(),
                county: county.next().flatten(),
                site_name: site_name.next().flatten(),
                coordinates: coordinates.next().flatten(),
                ward: ward.next().flatten(),
                constituency: constituency.next().flatten(),
                status: None,
            })
            .collect::<Vec<_>>();

        debug!(rows = records.len(), "loaded site register");
        Ok(Self { frame, records, columns: columns.clone() })
    }

    #[inline] pub fn len(&self) -> usize { self.records.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.records.is_empty() }

    #[inline] pub fn records(&self) -> &[SiteRecord] { &self.records }

    #[inline] pub fn records_mut(&mut self) -> &mut [SiteRecord] { &mut self.records }

    #[inline] pub fn columns(&self) -> &ColumnMap { &self.columns }

    /// Look up a record by its load-time id.
    pub fn get(&self, id: SiteId) -> Option<&SiteRecord> {
        self.records.get(id.row()).filter(|r| r.id == id)
            .or_else(|| self.records.iter().find(|r| r.id == id))
    }

    /// Rebuild the frame with the updated tracked columns and a status column.
    /// Columns not known to the pipeline pass through unchanged and in order.
    ///
    /// A tracked column missing from the input is only appended once some
    /// record holds a value for it; the status column is always written.
    pub fn to_frame(&self, status_column: &str) -> Result<DataFrame> {
        let mut frame = self.frame.clone();

        let tracked = [
            (self.columns.coordinates.as_str(), self.collect(|r| r.coordinates.clone())),
            (self.columns.ward.as_str(), self.collect(|r| r.ward.clone())),
            (self.columns.constituency.as_str(), self.collect(|r| r.constituency.clone())),
        ];
        let mut columns = Vec::with_capacity(tracked.len() + 1);
        for (name, values) in tracked {
            if frame.column(name).is_err() && values.iter().all(Option::is_none) {
                debug!(column = name, "tracked column absent from input and still empty; not written");
                continue;
            }
            columns.push((name, values));
        }
        columns.push((status_column, self.collect(|r| r.status.clone())));

        for (name, values) in columns {
            frame.with_column(Column::new(name.into(), values))
                .with_context(|| format!("[site::table] Failed to set column {name}"))?;
        }
        Ok(frame)
    }

    /// Write the register as CSV in the given encoding.
    pub fn write_csv(&self, path: &Path, encoding: &str, status_column: &str) -> Result<()> {
        let mut frame = self.to_frame(status_column)?;
        io::csv::write_csv(&mut frame, path, encoding)
    }

    fn collect(&self, f: impl Fn(&SiteRecord) -> Option<String>) -> Vec<Option<String>> {
        self.records.iter().map(f).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITES: &str = "\
REGION,COUNTY,SITENAME,SITECOORDINATES,WARD,CONSTITUENCY,OWNER
Nairobi,Nairobi,Kibera Health Centre,\"-1.3127,36.7869\",Not Found,,MOH
Coast,Mombasa,Port Reitz Hospital,\"0,0\",,,MOH
";

    #[test]
    fn loads_tracked_columns_with_ids() {
        let table = SiteTable::from_csv_str(SITES, &ColumnMap::default()).unwrap();

        assert_eq!(table.len(), 2);
        let first = &table.records()[0];
        assert_eq!(first.id, SiteId::new(0));
        assert_eq!(first.site_name.as_deref(), Some("Kibera Health Centre"));
        assert_eq!(first.ward.as_deref(), Some("Not Found"));
        assert_eq!(first.constituency, None);
        assert!(first.has_valid_coordinates());
        assert!(!table.records()[1].has_valid_coordinates());
        assert_eq!(table.get(SiteId::new(1)).unwrap().county.as_deref(), Some("Mombasa"));
    }

    #[test]
    fn missing_column_reads_as_absent() {
        let table = SiteTable::from_csv_str("SITENAME,COUNTY\nA,B\n", &ColumnMap::default()).unwrap();
        assert_eq!(table.records()[0].coordinates, None);
        assert_eq!(table.records()[0].ward, None);
    }

    #[test]
    fn absent_columns_stay_out_of_output_until_filled() {
        let mut table = SiteTable::from_csv_str("SITENAME,SITECOORDINATES\nA,\"-1.3127,36.7869\"\n", &ColumnMap::default()).unwrap();

        let names = |frame: &DataFrame| frame.get_column_names().iter().map(|n| n.to_string()).collect::<Vec<_>>();
        let frame = table.to_frame("GEOCODE_STATUS").unwrap();
        assert_eq!(names(&frame), vec!["SITENAME", "SITECOORDINATES", "GEOCODE_STATUS"]);

        table.records_mut()[0].ward = Some("Kibra".into());
        let frame = table.to_frame("GEOCODE_STATUS").unwrap();
        assert_eq!(names(&frame), vec!["SITENAME", "SITECOORDINATES", "WARD", "GEOCODE_STATUS"]);
    }

    #[test]
    fn frame_keeps_other_columns_and_adds_status() {
        let mut table = SiteTable::from_csv_str(SITES, &ColumnMap::default()).unwrap();
        table.records_mut()[0].ward = Some("Kibra".into());
        table.records_mut()[0].status = Some("AlreadyFilled".into());

        let frame = table.to_frame("GEOCODE_STATUS").unwrap();
        let names = frame.get_column_names().iter().map(|n| n.to_string()).collect::<Vec<_>>();
        assert_eq!(names, vec![
            "REGION", "COUNTY", "SITENAME", "SITECOORDINATES", "WARD", "CONSTITUENCY", "OWNER", "GEOCODE_STATUS",
        ]);

        let ward = frame.column("WARD").unwrap().as_materialized_series().str().unwrap().get(0);
        assert_eq!(ward, Some("Kibra"));
        let status = frame.column("GEOCODE_STATUS").unwrap().as_materialized_series().str().unwrap().get(1);
        assert_eq!(status, None);
    }
}
