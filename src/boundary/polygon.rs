use geo::{Coord, LineString, MultiPolygon, Polygon};
use shapefile::{PolygonRing, Shape};

/// Convert a polygon-type shape into a geo::MultiPolygon<f64>, dropping any M/Z values.
/// Returns None for non-polygon shapes.
pub(crate) fn shape_to_multipolygon(shape: &Shape) -> Option<MultiPolygon<f64>> {
    /// Collect one ring's x/y pairs as a closed LineString.
    fn ring<P>(points: &[P], xy: impl Fn(&P) -> (f64, f64)) -> LineString<f64> {
        let mut coords = points.iter()
            .map(|p| { let (x, y) = xy(p); Coord { x, y } })
            .collect::<Vec<_>>();
        if let (Some(first), Some(last)) = (coords.first().copied(), coords.last().copied()) {
            if first != last { coords.push(first) }
        }
        LineString(coords)
    }

    /// Shapefiles store each outer ring followed by its holes.
    fn group<P>(rings: &[PolygonRing<P>], xy: impl Fn(&P) -> (f64, f64) + Copy) -> MultiPolygon<f64> {
        let mut polygons = Vec::new();
        let mut exterior: Option<LineString<f64>> = None;
        let mut holes = Vec::new();

        for r in rings {
            match r {
                PolygonRing::Outer(points) => {
                    if let Some(ext) = exterior.take() {
                        polygons.push(Polygon::new(ext, std::mem::take(&mut holes)));
                    }
                    exterior = Some(ring(points, xy));
                }
                PolygonRing::Inner(points) => holes.push(ring(points, xy)),
            }
        }
        if let Some(ext) = exterior {
            polygons.push(Polygon::new(ext, holes));
        }
        MultiPolygon(polygons)
    }

    match shape {
        Shape::Polygon(p) => Some(group(p.rings(), |pt| (pt.x, pt.y))),
        Shape::PolygonM(p) => Some(group(p.rings(), |pt| (pt.x, pt.y))),
        Shape::PolygonZ(p) => Some(group(p.rings(), |pt| (pt.x, pt.y))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, Contains, Point};
    use shapefile::Point as ShpPoint;

    fn pts(coords: &[(f64, f64)]) -> Vec<ShpPoint> {
        coords.iter().map(|&(x, y)| ShpPoint { x, y }).collect()
    }

    #[test]
    fn outer_ring_with_hole() {
        let shape = Shape::Polygon(shapefile::Polygon::with_rings(vec![
            PolygonRing::Outer(pts(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)])),
            PolygonRing::Inner(pts(&[(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0), (4.0, 4.0)])),
        ]));

        let mp = shape_to_multipolygon(&shape).unwrap();

        assert_eq!(mp.0.len(), 1);
        assert_eq!(mp.0[0].interiors().len(), 1);
        assert!((mp.unsigned_area() - 96.0).abs() < 1e-9);
        assert!(mp.contains(&Point::new(2.0, 2.0)));
        assert!(!mp.contains(&Point::new(5.0, 5.0)));
    }

    #[test]
    fn non_polygon_shapes_are_skipped() {
        assert!(shape_to_multipolygon(&Shape::NullShape).is_none());
        assert!(shape_to_multipolygon(&Shape::Point(ShpPoint { x: 1.0, y: 2.0 })).is_none());
    }
}
