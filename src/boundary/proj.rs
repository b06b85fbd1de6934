use anyhow::{Context, Result, anyhow, bail};
use geo::{Coord, MapCoords, MultiPolygon};
use proj4rs::{proj::Proj as Proj4, transform::transform};

/// Target CRS for all boundary geometry: EPSG:4326, WGS84 long/lat.
const WGS84_PROJ4: &str = "+proj=longlat +datum=WGS84 +no_defs +type=crs";

/// How a layer's coordinates get to WGS84 long/lat.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Reprojection {
    /// Already geographic; used as-is.
    Identity,
    /// Transform from the given PROJ.4 source definition.
    FromProj4(String),
}

impl Reprojection {
    /// Decide from an explicit PROJ.4 override and the `.prj` WKT sidecar.
    /// Projected layers without an override cannot be used.
    pub(crate) fn detect(source_proj4: Option<&str>, prj_wkt: Option<&str>) -> Result<Self> {
        if let Some(proj4) = source_proj4.map(str::trim).filter(|s| !s.is_empty()) {
            return Ok(Self::FromProj4(proj4.to_string()));
        }
        match prj_wkt {
            None => Ok(Self::Identity),
            Some(wkt) if wkt.trim_start().to_ascii_uppercase().starts_with("PROJCS") => bail!(
                "[boundary::proj] Layer uses a projected CRS; set boundary.source_proj4 to reproject it"
            ),
            Some(_) => Ok(Self::Identity),
        }
    }

    /// Re-express shapes in WGS84 long/lat degrees.
    pub(crate) fn apply(&self, shapes: Vec<MultiPolygon<f64>>) -> Result<Vec<MultiPolygon<f64>>> {
        let Self::FromProj4(source) = self else { return Ok(shapes) };

        let from = Proj4::from_proj_string(source)
            .map_err(|e| anyhow!("{e:?}"))
            .with_context(|| format!("[boundary::proj] failed to build source PROJ.4: {source}"))?;
        let to = Proj4::from_proj_string(WGS84_PROJ4)
            .map_err(|e| anyhow!("{e:?}"))
            .with_context(|| format!("[boundary::proj] failed to build target PROJ.4: {WGS84_PROJ4}"))?;
        let source_is_geographic = is_geographic(source);

        // Geographic input goes in as radians; output is always radians.
        shapes.iter()
            .map(|shape| shape.try_map_coords(|coord: Coord<f64>| {
                let mut point = if source_is_geographic {
                    (coord.x.to_radians(), coord.y.to_radians(), 0.0)
                } else {
                    (coord.x, coord.y, 0.0)
                };
                transform(&from, &to, &mut point)
                    .map_err(|e| anyhow!("[boundary::proj] CRS transform failed at ({}, {}): {e:?}", coord.x, coord.y))?;
                Ok(Coord { x: point.0.to_degrees(), y: point.1.to_degrees() })
            }))
            .collect()
    }
}

fn is_geographic(proj4: &str) -> bool {
    proj4.split_whitespace().any(|token| matches!(token, "+proj=longlat" | "+proj=latlong" | "+proj=lonlat" | "+proj=latlon"))
}
