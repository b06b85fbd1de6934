//! Administrative boundary polygons and the point-in-polygon join.

mod polygon;
mod proj;

use std::path::Path;

use anyhow::{Context, Result, ensure};
use geo::{BoundingRect, MultiPolygon, Point, Within};
use rstar::{AABB, RTree, primitives::{GeomWithData, Rectangle}};
use tracing::{debug, info, warn};

use crate::{common, config::BoundaryFields, io, site::SiteRecord};

pub(crate) use polygon::shape_to_multipolygon;
pub(crate) use proj::Reprojection;

/// Bounding rectangle of one polygon, tagged with its index in the layer.
type PolygonEnvelope = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// Administrative labels carried by one boundary polygon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundaryAttributes {
    pub county: Option<String>,
    pub subcounty: Option<String>,
    pub ward: Option<String>,
}

/// Boundary polygons in WGS84 long/lat with an R-tree over their bounding boxes.
#[derive(Debug, Clone)]
pub struct BoundaryLayer {
    shapes: Vec<MultiPolygon<f64>>,
    attributes: Vec<BoundaryAttributes>,
    rtree: RTree<PolygonEnvelope>,
}

impl BoundaryLayer {
    /// Construct a layer from polygons already in WGS84 long/lat and their attributes.
    pub fn new(shapes: Vec<MultiPolygon<f64>>, attributes: Vec<BoundaryAttributes>) -> Result<Self> {
        ensure!(
            shapes.len() == attributes.len(),
            "[boundary] {} shapes but {} attribute rows", shapes.len(), attributes.len()
        );
        let rtree = RTree::bulk_load(
            shapes.iter().enumerate()
                .filter_map(|(i, shape)| shape.bounding_rect().map(|rect| {
                    PolygonEnvelope::new(Rectangle::from_corners(rect.min().into(), rect.max().into()), i)
                }))
                .collect()
        );
        Ok(Self { shapes, attributes, rtree })
    }

    /// Load a shapefile (or a directory holding one) and re-express it in WGS84 long/lat.
    pub fn read_shapefile(path: &Path, fields: &BoundaryFields) -> Result<Self> {
        let shp_path = common::find_shapefile(path)?;
        let reprojection = Reprojection::detect(
            fields.source_proj4.as_deref(),
            io::shp::read_prj(&shp_path).as_deref(),
        ).with_context(|| format!("[boundary] Cannot place {} in WGS84", shp_path.display()))?;

        let items = io::shp::read_shapefile(&shp_path)?;
        let mut shapes = Vec::with_capacity(items.len());
        let mut attributes = Vec::with_capacity(items.len());
        let mut skipped = 0usize;

        for (shape, record) in &items {
            let Some(mp) = shape_to_multipolygon(shape) else {
                skipped += 1;
                continue;
            };
            shapes.push(mp);
            attributes.push(BoundaryAttributes {
                county: io::shp::character_field(record, &fields.county),
                subcounty: io::shp::character_field(record, &fields.subcounty),
                ward: io::shp::character_field(record, &fields.ward),
            });
        }
        if skipped > 0 {
            warn!(skipped, path = %shp_path.display(), "ignored non-polygon shapes in boundary layer");
        }
        if attributes.iter().all(|a| a.ward.is_none() && a.subcounty.is_none()) && !attributes.is_empty() {
            warn!(ward = %fields.ward, subcounty = %fields.subcounty,
                "no boundary polygon has the configured ward/subcounty fields; check boundary field names");
        }

        let shapes = reprojection.apply(shapes)?;
        info!(polygons = shapes.len(), path = %shp_path.display(), ?reprojection, "loaded boundary layer");
        Self::new(shapes, attributes)
    }

    #[inline] pub fn len(&self) -> usize { self.shapes.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.shapes.is_empty() }

    #[inline] pub fn attributes(&self) -> &[BoundaryAttributes] { &self.attributes }

    /// Index of the first polygon (in layer order) that strictly contains `point`.
    /// Points on a polygon's boundary are not within it.
    pub fn locate_point(&self, point: Point<f64>) -> Option<usize> {
        let envelope = AABB::from_point([point.x(), point.y()]);
        self.rtree.locate_in_envelope_intersecting(&envelope)
            .map(|envelope| envelope.data)
            .filter(|&idx| point.is_within(&self.shapes[idx]))
            .min()
    }

    /// Attributes of the polygon containing `(lat, lng)`.
    pub fn locate(&self, lat: f64, lng: f64) -> Option<&BoundaryAttributes> {
        self.locate_point(Point::new(lng, lat))
            .map(|idx| &self.attributes[idx])
    }

    /// Left join of sites onto polygons: one entry per record, None where the
    /// record has no usable point or falls outside every polygon.
    pub fn join<'a>(&'a self, records: &[SiteRecord]) -> Vec<Option<&'a BoundaryAttributes>> {
        let matches = records.iter()
            .map(|record| record.point()
                .and_then(|point| self.locate_point(point))
                .map(|idx| &self.attributes[idx]))
            .collect::<Vec<_>>();

        debug!(
            sites = records.len(),
            matched = matches.iter().filter(|m| m.is_some()).count(),
            "spatial join done"
        );
        matches
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use geo::{MultiPolygon, polygon};

    use super::*;

    fn attrs(county: &str, subcounty: &str, ward: &str) -> BoundaryAttributes {
        BoundaryAttributes {
            county: Some(county.into()),
            subcounty: Some(subcounty.into()),
            ward: Some(ward.into()),
        }
    }

    /// Two side-by-side wards in Nairobi sharing the edge lng = 36.79.
    pub(crate) fn nairobi_wards() -> BoundaryLayer {
        let kibra = MultiPolygon(vec![polygon![
            (x: 36.76, y: -1.33), (x: 36.79, y: -1.33), (x: 36.79, y: -1.30), (x: 36.76, y: -1.30),
        ]]);
        let woodley = MultiPolygon(vec![polygon![
            (x: 36.79, y: -1.33), (x: 36.82, y: -1.33), (x: 36.82, y: -1.30), (x: 36.79, y: -1.30),
        ]]);
        BoundaryLayer::new(
            vec![kibra, woodley],
            vec![
                attrs("Nairobi", "Kibra", "Kibra"),
                attrs("Nairobi", "Kibra", "Woodley/Kenyatta Golf Course"),
            ],
        ).unwrap()
    }
}
