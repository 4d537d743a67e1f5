//! Multi-layer drawings. A [`Drawing`] is an ordered stack of layers, one
//! [`MultiLineString`] per pen (or pen color); the plotter pauses between
//! layers so you can swap pens. All of the page-fitting operations act on
//! the drawing as a whole, so layers stay registered with each other.

use std::io;
use std::path::Path;

use geo::{BoundingRect, Scale, Translate};
use geo_types::{coord, Geometry, GeometryCollection, MultiLineString, Point, Rect};
use svg::Document;

use crate::geo_types::svg::{render_svg, RenderOptions};
use crate::geo_types::{
    down_length, flatten_lines, metrics_lines, rotate_around, up_length, Metrics, PointDistance,
};
use crate::optimizer::Optimizer;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Drawing {
    layers: Vec<MultiLineString<f64>>,
}

impl Drawing {
    pub fn new() -> Drawing {
        Drawing { layers: vec![] }
    }

    /// Append a layer of raw strokes.
    pub fn add_layer(&mut self, lines: MultiLineString<f64>) -> &mut Self {
        self.layers.push(lines);
        self
    }

    /// Append any geometry as a new layer, flattened to pen strokes.
    pub fn add_geometry(&mut self, geometry: &Geometry<f64>) -> &mut Self {
        self.layers.push(flatten_lines(geometry));
        self
    }

    /// Swap out the strokes of an existing layer. Out-of-range indices are
    /// ignored, on the theory that a missing pen is better than a panic
    /// halfway through a plot script.
    pub fn replace_layer(&mut self, index: usize, lines: MultiLineString<f64>) -> &mut Self {
        if let Some(layer) = self.layers.get_mut(index) {
            *layer = lines;
        }
        self
    }

    pub fn layers(&self) -> &[MultiLineString<f64>] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&MultiLineString<f64>> {
        self.layers.get(index)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(|layer| layer.0.is_empty())
    }

    /// All strokes of all layers as a single [`MultiLineString`].
    pub fn flatten(&self) -> MultiLineString<f64> {
        MultiLineString::new(
            self.layers
                .iter()
                .flat_map(|layer| layer.0.iter().cloned())
                .collect(),
        )
    }

    /// Collapse every layer into one, keeping layer order.
    pub fn merged(&self) -> Drawing {
        Drawing {
            layers: vec![self.flatten()],
        }
    }

    /// Stack several drawings into one, appending their layers in order.
    pub fn stack(drawings: &[Drawing]) -> Drawing {
        Drawing {
            layers: drawings
                .iter()
                .flat_map(|drawing| drawing.layers.iter().cloned())
                .collect(),
        }
    }

    /// Combine with another drawing layer by layer, so both drawings'
    /// layer 0 is plotted with pen 0, and so on.
    pub fn merge(&self, other: &Drawing) -> Drawing {
        let mut layers = self.layers.clone();
        for (i, layer) in other.layers.iter().enumerate() {
            match layers.get_mut(i) {
                Some(existing) => existing.0.extend(layer.0.iter().cloned()),
                None => layers.push(layer.clone()),
            }
        }
        Drawing { layers }
    }

    /// Bounding box across every layer.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        let mut bounds: Option<Rect<f64>> = None;
        for layer in &self.layers {
            let Some(layer_bounds) = layer.bounding_rect() else {
                continue;
            };
            bounds = Some(match bounds {
                None => layer_bounds,
                Some(so_far) => Rect::new(
                    coord! {
                        x: so_far.min().x.min(layer_bounds.min().x),
                        y: so_far.min().y.min(layer_bounds.min().y),
                    },
                    coord! {
                        x: so_far.max().x.max(layer_bounds.max().x),
                        y: so_far.max().y.max(layer_bounds.max().y),
                    },
                ),
            });
        }
        bounds
    }

    /// Width and height of the whole drawing.
    pub fn size(&self) -> (f64, f64) {
        match self.bounds() {
            Some(rect) => (rect.width(), rect.height()),
            None => (0.0, 0.0),
        }
    }

    /// Distance drawn with the pen down, summed over all layers.
    pub fn down_length(&self) -> f64 {
        self.layers.iter().map(down_length).sum()
    }

    /// Pen-up travel for a full plot. Each layer starts and ends at the
    /// origin, which is where the device homes for a pen change.
    pub fn up_length(&self) -> f64 {
        self.layers
            .iter()
            .map(|layer| {
                let home = match layer.0.last().and_then(|path| path.0.last()) {
                    Some(end) => end.distance(&coord! {x: 0.0, y: 0.0}),
                    None => 0.0,
                };
                up_length(layer) + home
            })
            .sum()
    }

    /// How many times the pen gets lifted over the whole plot.
    pub fn pen_lifts(&self) -> usize {
        self.layers.iter().map(|layer| layer.0.len()).sum()
    }

    pub fn metrics(&self) -> Metrics {
        self.layers.iter().map(metrics_lines).sum()
    }

    fn map_layers<F>(&self, f: F) -> Drawing
    where
        F: Fn(&MultiLineString<f64>) -> MultiLineString<f64>,
    {
        Drawing {
            layers: self.layers.iter().map(f).collect(),
        }
    }

    pub fn translate(&self, x: f64, y: f64) -> Drawing {
        self.map_layers(|layer| layer.translate(x, y))
    }

    /// Scale uniformly around the drawing's own center.
    pub fn scale(&self, factor: f64) -> Drawing {
        let Some(bounds) = self.bounds() else {
            return self.clone();
        };
        let origin = bounds.center();
        self.map_layers(|layer| layer.scale_around_point(factor, factor, origin))
    }

    /// Rotate by `angle` radians around the drawing's own center.
    pub fn rotate(&self, angle: f64) -> Drawing {
        let Some(bounds) = self.bounds() else {
            return self.clone();
        };
        let origin = Point::from(bounds.center());
        self.map_layers(|layer| rotate_around(layer, angle, origin))
    }

    /// Translate (never scale) the drawing to the center of a
    /// `width` x `height` page anchored at the origin.
    pub fn centered(&self, width: f64, height: f64) -> Drawing {
        let Some(bounds) = self.bounds() else {
            return self.clone();
        };
        let center = bounds.center();
        self.translate(width / 2.0 - center.x, height / 2.0 - center.y)
    }

    /// Scale to exactly fit a page, leaving `padding` blank on every side,
    /// then center on it. A zero `width` or `height` leaves that axis
    /// unconstrained.
    pub fn scale_to_fit(&self, width: f64, height: f64, padding: f64) -> Drawing {
        let (w, h) = self.size();
        let factor = if w == 0.0 || width == 0.0 {
            if h == 0.0 {
                return self.clone();
            }
            (height - padding * 2.0) / h
        } else if h == 0.0 || height == 0.0 {
            (width - padding * 2.0) / w
        } else {
            f64::min((width - padding * 2.0) / w, (height - padding * 2.0) / h)
        };
        self.scale(factor).centered(width, height)
    }

    /// Like [`Drawing::scale_to_fit`], but also tries rotations (steps of
    /// `increment` radians over a half turn) and keeps whichever angle gives
    /// an aspect ratio closest to the page's, so the drawing prints largest.
    pub fn rotate_and_scale_to_fit(
        &self,
        width: f64,
        height: f64,
        padding: f64,
        increment: f64,
    ) -> Drawing {
        let desired_ratio = (width - padding * 2.0) / (height - padding * 2.0);
        let mut best_angle = 0.0;
        let mut best_error = f64::INFINITY;
        let mut angle = 0.0;
        while angle < std::f64::consts::PI {
            let (w, h) = self.rotate(angle).size();
            let error = (w / h - desired_ratio).abs() / desired_ratio;
            if error < best_error {
                best_error = error;
                best_angle = angle;
            }
            angle += increment;
        }
        self.rotate(best_angle).scale_to_fit(width, height, padding)
    }

    /// Run the optimizer over each layer independently.
    pub fn optimize(&self, optimizer: &Optimizer) -> Drawing {
        self.map_layers(|layer| optimizer.optimize(layer))
    }

    /// Render a preview of the drawing on a `width` x `height` inch page.
    pub fn render(&self, width: f64, height: f64, options: &RenderOptions) -> Document {
        render_svg(&self.layers, width, height, options)
    }

    /// Render and write straight to an `.svg` file.
    pub fn save_svg<P: AsRef<Path>>(
        &self,
        path: P,
        width: f64,
        height: f64,
        options: &RenderOptions,
    ) -> io::Result<()> {
        svg::save(path, &self.render(width, height, options))
    }
}

impl From<MultiLineString<f64>> for Drawing {
    fn from(lines: MultiLineString<f64>) -> Drawing {
        Drawing {
            layers: vec![lines],
        }
    }
}

impl From<Geometry<f64>> for Drawing {
    fn from(geometry: Geometry<f64>) -> Drawing {
        Drawing {
            layers: vec![flatten_lines(&geometry)],
        }
    }
}

/// Each member of the collection becomes its own layer.
impl From<GeometryCollection<f64>> for Drawing {
    fn from(collection: GeometryCollection<f64>) -> Drawing {
        Drawing {
            layers: collection.iter().map(flatten_lines).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{coord, LineString};

    fn square_layer(x: f64, y: f64, side: f64) -> MultiLineString<f64> {
        MultiLineString::new(vec![LineString::new(vec![
            coord! {x: x, y: y},
            coord! {x: x + side, y: y},
            coord! {x: x + side, y: y + side},
            coord! {x: x, y: y + side},
            coord! {x: x, y: y},
        ])])
    }

    fn two_layer_drawing() -> Drawing {
        let mut drawing = Drawing::new();
        drawing.add_layer(square_layer(0.0, 0.0, 1.0));
        drawing.add_layer(square_layer(2.0, 0.0, 1.0));
        drawing
    }

    #[test]
    fn test_bounds_spans_layers() {
        let drawing = two_layer_drawing();
        let bounds = drawing.bounds().unwrap();
        assert_eq!(bounds.min(), coord! {x: 0.0, y: 0.0});
        assert_eq!(bounds.max(), coord! {x: 3.0, y: 1.0});
        assert_eq!(drawing.size(), (3.0, 1.0));
    }

    #[test]
    fn test_layers_stay_registered_when_fitting() {
        let drawing = two_layer_drawing().scale_to_fit(8.0, 8.0, 1.0);
        // Width 3 scales onto 6 usable inches, so each square doubles.
        let (w, h) = drawing.size();
        assert!((w - 6.0).abs() < 1e-9);
        assert!((h - 2.0).abs() < 1e-9);
        let gap = drawing.layer(1).unwrap().bounding_rect().unwrap().min().x
            - drawing.layer(0).unwrap().bounding_rect().unwrap().max().x;
        assert!((gap - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotate_and_scale_to_fit_prefers_better_angle() {
        let bar = Drawing::from(MultiLineString::new(vec![LineString::new(vec![
            coord! {x: 0.0, y: 0.0},
            coord! {x: 10.0, y: 10.0},
        ])]));
        let plain = bar.scale_to_fit(20.0, 2.0, 0.0);
        let fitted = bar.rotate_and_scale_to_fit(20.0, 2.0, 0.0, 0.01);
        assert!(fitted.down_length() >= plain.down_length());
        let (w, h) = fitted.size();
        assert!(w <= 20.0 + 1e-9);
        assert!(h <= 2.0 + 1e-9);
    }

    #[test]
    fn test_merge_is_layerwise() {
        let merged = two_layer_drawing().merge(&two_layer_drawing());
        assert_eq!(merged.layer_count(), 2);
        assert_eq!(merged.layer(0).unwrap().0.len(), 2);
    }

    #[test]
    fn test_stack_appends_layers() {
        let stacked = Drawing::stack(&[two_layer_drawing(), two_layer_drawing()]);
        assert_eq!(stacked.layer_count(), 4);
    }

    #[test]
    fn test_up_length_includes_homing() {
        let mut drawing = Drawing::new();
        drawing.add_layer(MultiLineString::new(vec![LineString::new(vec![
            coord! {x: 3.0, y: 4.0},
            coord! {x: 3.0, y: 8.0},
        ])]));
        // Out to the start (5), then home from the end (sqrt(73)).
        let expected = 5.0 + (3.0f64 * 3.0 + 8.0 * 8.0).sqrt();
        assert!((drawing.up_length() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_pen_lifts() {
        assert_eq!(two_layer_drawing().pen_lifts(), 2);
    }
}
