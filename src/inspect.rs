use std::{collections::BTreeMap, fmt, path::{Path, PathBuf}};

use anyhow::Result;

use crate::{common, io};

/// Structural summary of a boundary shapefile.
#[derive(Debug, Clone, Default)]
pub struct LayerSummary {
    pub path: PathBuf,
    pub records: usize,
    /// Shape count per geometry family.
    pub geometry: BTreeMap<&'static str, usize>,
    /// Attribute field names and types, in file order of the first record.
    pub fields: Vec<(String, &'static str)>,
    /// WKT from the `.prj` sidecar.
    pub crs: Option<String>,
    /// Attribute values of the first few records.
    pub sample: Vec<Vec<(String, String)>>,
}

/// Summarize a boundary layer without reprojecting it.
pub fn inspect_layer(path: &Path, sample_size: usize) -> Result<LayerSummary> {
    let shp_path = common::find_shapefile(path)?;
    let items = io::shp::read_shapefile(&shp_path)?;

    let mut geometry: BTreeMap<&'static str, usize> = BTreeMap::new();
    for (shape, _) in &items {
        *geometry.entry(io::shp::shape_kind(shape)).or_default() += 1;
    }

    let fields = items.first()
        .map(|(_, record)| {
            let mut fields = record.clone().into_iter()
                .map(|(name, value)| (name, io::shp::field_type_name(&value)))
                .collect::<Vec<_>>();
            fields.sort_by(|a, b| a.0.cmp(&b.0));
            fields
        })
        .unwrap_or_default();

    let sample = items.iter()
        .take(sample_size)
        .map(|(_, record)| {
            let mut row = record.clone().into_iter()
                .map(|(name, value)| (name, io::shp::field_display(&value)))
                .collect::<Vec<_>>();
            row.sort_by(|a, b| a.0.cmp(&b.0));
            row
        })
        .collect();

    Ok(LayerSummary {
        crs: io::shp::read_prj(&shp_path),
        path: shp_path,
        records: items.len(),
        geometry,
        fields,
        sample,
    })
}

impl fmt::Display for LayerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Layer: {}", self.path.display())?;
        writeln!(f, "Number of records: {}", self.records)?;

        writeln!(f, "Geometry mix:")?;
        for (kind, count) in &self.geometry {
            writeln!(f, "  - {kind}: {count}")?;
        }

        writeln!(f, "Attribute columns:")?;
        for (name, ty) in &self.fields {
            writeln!(f, "  - {name} ({ty})")?;
        }

        writeln!(f, "Coordinate reference system:")?;
        writeln!(f, "  {}", self.crs.as_deref().unwrap_or("(no .prj sidecar)"))?;

        writeln!(f, "Sample records:")?;
        for (i, row) in self.sample.iter().enumerate() {
            let values = row.iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(f, "  [{i}] {values}")?;
        }
        Ok(())
    }
}
