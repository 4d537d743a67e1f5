use geo::{BoundingRect, Rotate, Scale, Translate};
use geo_types::{Point, Rect};

use super::size;

/// Arranging geometry on a page: translate it to the middle of a rectangle,
/// or scale (and optionally rotate) it until it fills one.
///
/// All rectangles are anchored with their upper-left corner at the origin
/// unless an explicit corner is given.
pub trait Fit: Sized {
    /// Translate (but never scale) to the center of a `width` x `height`
    /// rectangle whose upper-left corner sits at `(x, y)`.
    fn centered_at(&self, width: f64, height: f64, x: f64, y: f64) -> Self;

    /// [`Fit::centered_at`] with the rectangle corner at the origin.
    fn centered(&self, width: f64, height: f64) -> Self {
        self.centered_at(width, height, 0.0, 0.0)
    }

    /// Scale up or down to exactly fit a bounding box, leaving `padding`
    /// empty on all sides, then center in it. A zero `width` or `height`
    /// leaves that axis unconstrained.
    fn scale_to_fit(&self, width: f64, height: f64, padding: f64) -> Self;

    /// Like [`Fit::scale_to_fit`], but also scans rotations (`increment`
    /// radians apart over a half turn) and keeps whichever orientation
    /// covers the most page area.
    fn rotate_and_scale_to_fit(&self, width: f64, height: f64, padding: f64, increment: f64)
        -> Self;
}

impl<G> Fit for G
where
    G: BoundingRect<f64, Output = Option<Rect<f64>>>,
    G: Translate<f64> + Scale<f64> + Rotate<f64>,
    G: Clone,
{
    fn centered_at(&self, width: f64, height: f64, x: f64, y: f64) -> Self {
        let Some(bounds) = self.bounding_rect() else {
            return self.clone();
        };
        let center = bounds.center();
        self.translate(x + width / 2.0 - center.x, y + height / 2.0 - center.y)
    }

    fn scale_to_fit(&self, width: f64, height: f64, padding: f64) -> Self {
        let (w, h) = size(self);
        let scale = if w == 0.0 || width == 0.0 {
            if h == 0.0 {
                return self.clone();
            }
            (height - padding * 2.0) / h
        } else if h == 0.0 || height == 0.0 {
            (width - padding * 2.0) / w
        } else {
            f64::min((width - padding * 2.0) / w, (height - padding * 2.0) / h)
        };
        self.scale(scale).centered(width, height)
    }

    fn rotate_and_scale_to_fit(
        &self,
        width: f64,
        height: f64,
        padding: f64,
        increment: f64,
    ) -> Self {
        let mut best = self.scale_to_fit(width, height, padding);
        let mut biggest = {
            let (w, h) = size(&best);
            w * h
        };
        let mut angle = increment;
        while angle < std::f64::consts::PI {
            let rotated = self.rotate_around_center(angle.to_degrees());
            let scaled = rotated.scale_to_fit(width, height, padding);
            let (w, h) = size(&scaled);
            if w * h > biggest {
                biggest = w * h;
                best = scaled;
            }
            angle += increment;
        }
        best
    }
}

/// Rotate a geometry around an explicit point, angle in radians.
pub fn rotate_around<G>(geom: &G, angle: f64, origin: Point<f64>) -> G
where
    G: Rotate<f64>,
{
    geom.rotate_around_point(angle.to_degrees(), origin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{coord, LineString, MultiLineString};

    fn unit_square_at(x: f64, y: f64) -> MultiLineString<f64> {
        MultiLineString::new(vec![LineString::new(vec![
            coord! {x: x, y: y},
            coord! {x: x + 1.0, y: y},
            coord! {x: x + 1.0, y: y + 1.0},
            coord! {x: x, y: y + 1.0},
            coord! {x: x, y: y},
        ])])
    }

    #[test]
    fn test_centered() {
        let sq = unit_square_at(17.0, -3.0).centered(8.0, 10.0);
        let bounds = sq.bounding_rect().unwrap();
        assert!((bounds.center().x - 4.0).abs() < 1e-9);
        assert!((bounds.center().y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_scale_to_fit_with_padding() {
        let sq = unit_square_at(0.0, 0.0).scale_to_fit(10.0, 6.0, 1.0);
        let (w, h) = size(&sq);
        // Square drawing, so the tighter axis (height) binds.
        assert!((h - 4.0).abs() < 1e-9);
        assert!((w - 4.0).abs() < 1e-9);
        let bounds = sq.bounding_rect().unwrap();
        assert!((bounds.center().x - 5.0).abs() < 1e-9);
        assert!((bounds.center().y - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_scale_to_fit_free_width() {
        let sq = unit_square_at(0.0, 0.0).scale_to_fit(0.0, 6.0, 0.0);
        let (_, h) = size(&sq);
        assert!((h - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotate_around_quarter_turn() {
        let sq = unit_square_at(1.0, 0.0);
        let turned = rotate_around(&sq, std::f64::consts::FRAC_PI_2, Point::new(0.0, 0.0));
        let bounds = turned.bounding_rect().unwrap();
        assert!((bounds.min().x - -1.0).abs() < 1e-9);
        assert!((bounds.min().y - 1.0).abs() < 1e-9);
        assert!((bounds.max().x - 0.0).abs() < 1e-9);
        assert!((bounds.max().y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotate_and_scale_beats_plain_fit() {
        // A long diagonal bar fits a wide page better once straightened out.
        let bar = MultiLineString::new(vec![LineString::new(vec![
            coord! {x: 0.0, y: 0.0},
            coord! {x: 10.0, y: 10.0},
        ])]);
        let plain = bar.scale_to_fit(20.0, 2.0, 0.0);
        let rotated = bar.rotate_and_scale_to_fit(20.0, 2.0, 0.0, 0.02);
        let (pw, ph) = size(&plain);
        let (rw, rh) = size(&rotated);
        assert!(rw * rh >= pw * ph);
    }
}
