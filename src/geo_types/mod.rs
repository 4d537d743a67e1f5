use std::fmt::{self, Display};
use std::iter::Sum;
use std::ops::Add;

use geo::BoundingRect;
use geo_types::{Coord, Geometry, LineString, MultiLineString, Point, Rect};

/// Fitting geometry onto a page: centering, scaling, rotating-to-fit.
pub mod fit;

/// Polygon shading (parallel-line infill) for filled shapes.
pub mod shade;

/// SVG import and plot-preview rendering.
pub mod svg;

pub use fit::{rotate_around, Fit};
pub use shade::Shade;

/// Trait that implements a distance function between two [`geo_types::Point`] structs.
/// Also includes a length function which returns the length of a [`geo_types::Point`]
/// as if it were a Vector.
pub trait PointDistance {
    /// Return the scalar distance between two points.
    fn distance(&self, other: &Self) -> f64;

    /// Treat the point as a vector and return its scalar length.
    fn length(&self) -> f64;
}

impl PointDistance for Point<f64> {
    fn distance(&self, other: &Point<f64>) -> f64 {
        (*self - *other).length()
    }

    fn length(&self) -> f64 {
        self.x().hypot(self.y())
    }
}

impl PointDistance for Coord<f64> {
    fn distance(&self, other: &Coord<f64>) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// Total length of a path, vertex to vertex.
pub fn path_length(path: &LineString<f64>) -> f64 {
    path.0.windows(2).map(|w| w[0].distance(&w[1])).sum()
}

/// Total pen-down length of a layer.
pub fn down_length(layer: &MultiLineString<f64>) -> f64 {
    layer.iter().map(path_length).sum()
}

/// Flattens any geometry down to the strokes a single pen pass will plot.
/// Polygons become their exterior plus interior rings; collections are
/// walked recursively. If you want a filled polygon, see [`Shade`].
pub fn flatten_lines(geom: &Geometry<f64>) -> MultiLineString<f64> {
    let mut lines: Vec<LineString<f64>> = vec![];
    flatten_into(geom, &mut lines);
    MultiLineString::new(lines)
}

fn flatten_into(geom: &Geometry<f64>, out: &mut Vec<LineString<f64>>) {
    match geom {
        Geometry::LineString(ls) => out.push(ls.clone()),
        Geometry::Line(line) => out.push(LineString::new(vec![line.start, line.end])),
        Geometry::MultiLineString(mls) => out.extend(mls.iter().cloned()),
        Geometry::Polygon(poly) => {
            out.push(poly.exterior().clone());
            out.extend(poly.interiors().iter().cloned());
        }
        Geometry::MultiPolygon(polys) => {
            for poly in polys {
                flatten_into(&Geometry::Polygon(poly.clone()), out);
            }
        }
        Geometry::Rect(rect) => out.push(rect.to_polygon().exterior().clone()),
        Geometry::Triangle(tri) => out.push(tri.to_polygon().exterior().clone()),
        Geometry::GeometryCollection(gc) => {
            for sub in gc {
                flatten_into(sub, out);
            }
        }
        // Points have no extent; nothing to plot.
        Geometry::Point(_) | Geometry::MultiPoint(_) => {}
    }
}

/// Width and height of the bounding box of a geometry; (0, 0) when empty.
pub fn size<G>(geom: &G) -> (f64, f64)
where
    G: BoundingRect<f64, Output = Option<Rect<f64>>>,
{
    match geom.bounding_rect() {
        Some(rect) => (rect.width(), rect.height()),
        None => (0.0, 0.0),
    }
}

/// Total distance travelled by the pen while lifted, assuming it starts at
/// the origin and jumps between successive path endpoints. Improved by
/// merging and/or reordering paths with the [`crate::optimizer::Optimizer`].
pub fn up_length(layer: &MultiLineString<f64>) -> f64 {
    let mut distance = 0.0;
    let mut pen_position = Coord { x: 0.0, y: 0.0 };
    for path in layer {
        let (Some(start), Some(end)) = (path.0.first(), path.0.last()) else {
            continue;
        };
        distance += pen_position.distance(start);
        pen_position = *end;
    }
    distance
}

/// Pen travel statistics for a drawing or a single layer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Metrics {
    /// Distance covered with the pen on the page, in inches.
    pub pen_down: f64,
    /// Distance covered with the pen lifted, in inches.
    pub pen_up: f64,
    /// Number of discrete paths (each one costs a pen lift).
    pub path_count: usize,
}

impl Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} paths, pen down: {:.2}, pen up: {:.2}",
            self.path_count, self.pen_down, self.pen_up
        )
    }
}

impl Add for Metrics {
    type Output = Metrics;

    fn add(self, other: Metrics) -> Metrics {
        Metrics {
            pen_down: self.pen_down + other.pen_down,
            pen_up: self.pen_up + other.pen_up,
            path_count: self.path_count + other.path_count,
        }
    }
}

impl Sum for Metrics {
    fn sum<I: Iterator<Item = Metrics>>(iter: I) -> Metrics {
        iter.fold(Metrics::default(), Add::add)
    }
}

/// Pen travel statistics for a single layer.
pub fn metrics_lines(layer: &MultiLineString<f64>) -> Metrics {
    Metrics {
        pen_down: down_length(layer),
        pen_up: up_length(layer),
        path_count: layer.0.len(),
    }
}

/// Pen travel statistics for any geometry. Collections are treated as
/// multi-layer drawings and accumulate layer by layer.
pub fn metrics(geom: &Geometry<f64>) -> Metrics {
    match geom {
        Geometry::GeometryCollection(gc) => {
            gc.iter().map(|layer| metrics_lines(&flatten_lines(layer))).sum()
        }
        other => metrics_lines(&flatten_lines(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{coord, polygon, GeometryCollection};

    #[test]
    fn test_point_distance() {
        let d = Point::new(10.0, 0.0).distance(&Point::new(0.0, 10.0));
        assert!((d - 200.0_f64.sqrt()).abs() < 1e-9);
        assert!((Point::new(3.0, 4.0).length() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_flatten_polygon_rings() {
        let poly = polygon![
            exterior: [
                (x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 4.0), (x: 0.0, y: 4.0), (x: 0.0, y: 0.0)],
            interiors: [[
                (x: 1.0, y: 1.0), (x: 3.0, y: 1.0), (x: 3.0, y: 3.0), (x: 1.0, y: 3.0), (x: 1.0, y: 1.0)]],
        ];
        let flat = flatten_lines(&Geometry::Polygon(poly));
        assert_eq!(flat.0.len(), 2);
    }

    #[test]
    fn test_flatten_nested_collection() {
        let gc = Geometry::GeometryCollection(GeometryCollection::new_from(vec![
            Geometry::LineString(LineString::new(vec![
                coord! {x: 0.0, y: 0.0},
                coord! {x: 1.0, y: 0.0},
            ])),
            Geometry::GeometryCollection(GeometryCollection::new_from(vec![Geometry::Point(
                Point::new(5.0, 5.0),
            )])),
        ]));
        let flat = flatten_lines(&gc);
        assert_eq!(flat.0.len(), 1);
    }

    #[test]
    fn test_up_length_from_origin() {
        let layer = MultiLineString::new(vec![
            LineString::new(vec![coord! {x: 3.0, y: 4.0}, coord! {x: 3.0, y: 5.0}]),
            LineString::new(vec![coord! {x: 3.0, y: 5.0}, coord! {x: 0.0, y: 5.0}]),
        ]);
        // 5in out to the first path, then the layers abut.
        assert!((up_length(&layer) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_metrics_display() {
        let m = Metrics {
            pen_down: 486.614,
            pen_up: 82.138,
            path_count: 88,
        };
        assert_eq!(m.to_string(), "88 paths, pen down: 486.61, pen up: 82.14");
    }

    #[test]
    fn test_metrics_sum() {
        let layer = MultiLineString::new(vec![LineString::new(vec![
            coord! {x: 0.0, y: 0.0},
            coord! {x: 3.0, y: 4.0},
        ])]);
        let gc = Geometry::GeometryCollection(GeometryCollection::new_from(vec![
            Geometry::MultiLineString(layer.clone()),
            Geometry::MultiLineString(layer),
        ]));
        let m = metrics(&gc);
        assert_eq!(m.path_count, 2);
        assert!((m.pen_down - 10.0).abs() < 1e-9);
    }
}
