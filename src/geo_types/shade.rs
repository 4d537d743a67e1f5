use geo::{BooleanOps, BoundingRect, Centroid};
use geo_types::{coord, LineString, MultiLineString, MultiPolygon, Polygon};

use super::rotate_around;

/// Parallel-line infill. All a plotter can draw is lines, so "filling" a
/// polygon means sweeping it with strokes one pen-width (or so) apart.
pub trait Shade {
    /// Fill with parallel lines at `angle` radians, `spacing` apart.
    /// `offset` shifts the whole family of lines up/down as a fraction of
    /// the spacing. The outline itself is not included.
    fn shade(&self, angle: f64, spacing: f64, offset: f64) -> MultiLineString<f64>;
}

impl Shade for MultiPolygon<f64> {
    fn shade(&self, angle: f64, spacing: f64, offset: f64) -> MultiLineString<f64> {
        let Some(origin) = self.centroid() else {
            return MultiLineString::new(vec![]);
        };
        if spacing <= 0.0 {
            return MultiLineString::new(vec![]);
        }
        // Rotate to axis-aligned, sweep horizontals, clip, rotate back.
        let flat = rotate_around(self, -angle, origin);
        let Some(bounds) = flat.bounding_rect() else {
            return MultiLineString::new(vec![]);
        };
        let (min, max) = (bounds.min(), bounds.max());
        let mut lines: Vec<LineString<f64>> = vec![];
        let mut y = min.y + offset * spacing;
        let mut count = 0u32;
        while y < max.y {
            // Alternate direction so consecutive strokes stay neighbors.
            if count % 2 == 0 {
                lines.push(LineString::new(vec![
                    coord! {x: min.x, y: y},
                    coord! {x: max.x, y: y},
                ]));
            } else {
                lines.push(LineString::new(vec![
                    coord! {x: max.x, y: y},
                    coord! {x: min.x, y: y},
                ]));
            }
            y += spacing;
            count += 1;
        }
        let clipped = flat.clip(&MultiLineString::new(lines), false);
        rotate_around(&clipped, angle, origin)
    }
}

impl Shade for Polygon<f64> {
    fn shade(&self, angle: f64, spacing: f64, offset: f64) -> MultiLineString<f64> {
        MultiPolygon::new(vec![self.clone()]).shade(angle, spacing, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_types::{down_length, path_length};
    use geo::Intersects;
    use geo_types::polygon;

    fn square() -> Polygon<f64> {
        polygon![
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
            (x: 0.0, y: 10.0),
            (x: 0.0, y: 0.0),
        ]
    }

    #[test]
    fn test_shade_square_horizontal() {
        let fill = square().shade(0.0, 1.0, 0.5);
        assert_eq!(fill.0.len(), 10);
        for line in &fill {
            assert!((path_length(line) - 10.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_shade_stays_inside() {
        let poly = square();
        let fill = poly.shade(0.7, 0.25, 0.5);
        assert!(fill.intersects(&poly));
        let bounds = fill.bounding_rect().unwrap();
        assert!(bounds.min().x >= -1e-6 && bounds.max().x <= 10.0 + 1e-6);
        assert!(bounds.min().y >= -1e-6 && bounds.max().y <= 10.0 + 1e-6);
    }

    #[test]
    fn test_shade_spacing_scales_ink() {
        let coarse = down_length(&square().shade(0.0, 2.0, 0.5));
        let fine = down_length(&square().shade(0.0, 0.5, 0.5));
        assert!(fine > coarse * 2.0);
    }

    #[test]
    fn test_shade_hole_left_empty() {
        let donut = Polygon::new(
            LineString::new(vec![
                coord! {x: 0.0, y: 0.0},
                coord! {x: 10.0, y: 0.0},
                coord! {x: 10.0, y: 10.0},
                coord! {x: 0.0, y: 10.0},
                coord! {x: 0.0, y: 0.0},
            ]),
            vec![LineString::new(vec![
                coord! {x: 4.0, y: 4.0},
                coord! {x: 6.0, y: 4.0},
                coord! {x: 6.0, y: 6.0},
                coord! {x: 4.0, y: 6.0},
                coord! {x: 4.0, y: 4.0},
            ])],
        );
        let solid = down_length(&square().shade(0.0, 0.5, 0.5));
        let holed = down_length(&donut.shade(0.0, 0.5, 0.5));
        assert!(holed < solid);
    }
}
