//! Shapefile reading operations.

use std::path::Path;

use anyhow::{Context, Result};
use shapefile::{Reader, Shape, dbase::{FieldValue, Record}};

/// Reads all shapes + attribute records from a given `.shp` file path.
pub(crate) fn read_shapefile(path: &Path) -> Result<Vec<(Shape, Record)>> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("[io::shp] Failed to open shapefile: {}", path.display()))?;

    let mut items = Vec::with_capacity(reader.shape_count()?);
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result.context("[io::shp] Error reading shape+record")?;
        items.push((shape, record));
    }
    Ok(items)
}

/// Reads the `.prj` sidecar (WKT), if there is one.
pub(crate) fn read_prj(shp_path: &Path) -> Option<String> {
    let prj = shp_path.with_extension("prj");
    std::fs::read_to_string(prj).ok()
        .map(|wkt| wkt.trim().to_string())
        .filter(|wkt| !wkt.is_empty())
}

/// Get the trimmed value of a text field, or None if it is empty or not text.
pub(crate) fn character_field(record: &Record, field: &str) -> Option<String> {
    match record.get(field) {
        Some(FieldValue::Character(Some(s))) | Some(FieldValue::Memo(s)) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        _ => None,
    }
}

/// Short type name of a dBase field value.
pub(crate) fn field_type_name(value: &FieldValue) -> &'static str {
    match value {
        FieldValue::Character(_) => "Character",
        FieldValue::Numeric(_) => "Numeric",
        FieldValue::Logical(_) => "Logical",
        FieldValue::Date(_) => "Date",
        FieldValue::Float(_) => "Float",
        FieldValue::Integer(_) => "Integer",
        FieldValue::Currency(_) => "Currency",
        FieldValue::DateTime(_) => "DateTime",
        FieldValue::Double(_) => "Double",
        FieldValue::Memo(_) => "Memo",
        #[allow(unreachable_patterns)]
        _ => "Other",
    }
}

/// Display form of a dBase field value; nulls render empty.
pub(crate) fn field_display(value: &FieldValue) -> String {
    match value {
        FieldValue::Character(Some(s)) => s.trim().to_string(),
        FieldValue::Memo(s) => s.trim().to_string(),
        FieldValue::Numeric(Some(n)) => n.to_string(),
        FieldValue::Float(Some(n)) => n.to_string(),
        FieldValue::Integer(n) => n.to_string(),
        FieldValue::Double(n) => n.to_string(),
        FieldValue::Currency(n) => n.to_string(),
        FieldValue::Logical(Some(b)) => b.to_string(),
        FieldValue::Date(Some(d)) => format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day()),
        FieldValue::DateTime(dt) => format!("{dt:?}"),
        _ => String::new(),
    }
}

/// Geometry family of a shape, for summaries.
pub(crate) fn shape_kind(shape: &Shape) -> &'static str {
    match shape {
        Shape::NullShape => "Null",
        Shape::Point(_) | Shape::PointM(_) | Shape::PointZ(_) => "Point",
        Shape::Multipoint(_) | Shape::MultipointM(_) | Shape::MultipointZ(_) => "Multipoint",
        Shape::Polyline(_) | Shape::PolylineM(_) | Shape::PolylineZ(_) => "Polyline",
        Shape::Polygon(_) | Shape::PolygonM(_) | Shape::PolygonZ(_) => "Polygon",
        Shape::Multipatch(_) => "Multipatch",
    }
}
