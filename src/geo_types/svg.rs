//! SVG import (paths only, the way plotters like them) and plot-preview
//! rendering with one distinguishable color per layer.

use std::path::Path as FsPath;

use csscolorparser::Color;
use geo_types::{
    coord, Geometry, GeometryCollection, LineString, MultiLineString, Polygon,
};
use kurbo::{CubicBez, ParamCurve, Point as BezPoint, QuadBez};
use log::debug;
use rand::Rng;
use svg::node::element::path::{Command, Data, Position};
use svg::node::element::{tag, Path};
use svg::parser::Event;
use svg::Document;

use crate::errors::SvgImportError;

/// Points sampled along each Bezier segment on import.
const CURVE_SAMPLES: usize = 64;

/// The first eight layers get these; they were picked for maximum
/// distinguishability. Anything past eight gets a random color and no
/// guarantees about legibility.
pub const LAYER_COLORS: [&str; 8] = [
    "#0000ff", // blue
    "#ff0000", // red
    "#005221", // dark green
    "#ff7b00", // orange
    "#088e95", // aqua
    "#ff00ff", // fuchsia
    "#9efd38", // lime
    "#ce5171", // hot pink
];

/// Import an SVG into geometry: every `<path>` element becomes a
/// [`Polygon`] (when it closes) or a [`LineString`], with Bezier curves
/// flattened by fixed-step sampling. Transforms, strokes and anything
/// that is not a path are ignored.
pub fn load_svg<P: AsRef<FsPath>>(path: P) -> Result<GeometryCollection<f64>, SvgImportError> {
    let mut content = String::new();
    let mut shapes: Vec<Geometry<f64>> = vec![];
    for event in svg::open(path, &mut content)? {
        match event {
            Event::Tag(tag::Path, _, attributes) => {
                let Some(d) = attributes.get("d") else {
                    continue;
                };
                let data =
                    Data::parse(d).map_err(|err| SvgImportError::Parse(err.to_string()))?;
                shapes.extend(path_data_to_shapes(&data));
            }
            Event::Error(err) => return Err(SvgImportError::Parse(err.to_string())),
            _ => {}
        }
    }
    if shapes.is_empty() {
        return Err(SvgImportError::NullGeometry);
    }
    Ok(GeometryCollection::new_from(shapes))
}

struct PathBuilder {
    current: Vec<(f64, f64)>,
    rings: Vec<LineString<f64>>,
    opens: Vec<LineString<f64>>,
    position: (f64, f64),
    subpath_start: (f64, f64),
}

impl PathBuilder {
    fn new() -> Self {
        PathBuilder {
            current: vec![],
            rings: vec![],
            opens: vec![],
            position: (0.0, 0.0),
            subpath_start: (0.0, 0.0),
        }
    }

    fn flush_open(&mut self) {
        if self.current.len() > 1 {
            let coords = self
                .current
                .iter()
                .map(|(x, y)| coord! {x: *x, y: *y})
                .collect();
            self.opens.push(LineString::new(coords));
        }
        self.current.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.flush_open();
        self.position = (x, y);
        self.subpath_start = (x, y);
        self.current.push((x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        if self.current.is_empty() {
            self.current.push(self.position);
        }
        self.position = (x, y);
        self.current.push((x, y));
    }

    fn close(&mut self) {
        if self.current.len() > 1 {
            let mut pts = std::mem::take(&mut self.current);
            if *pts.last().unwrap() != self.subpath_start {
                pts.push(self.subpath_start);
            }
            let coords = pts.iter().map(|(x, y)| coord! {x: *x, y: *y}).collect();
            self.rings.push(LineString::new(coords));
        } else {
            self.current.clear();
        }
        self.position = self.subpath_start;
    }

    fn shapes(mut self) -> Vec<Geometry<f64>> {
        self.flush_open();
        let mut out: Vec<Geometry<f64>> = vec![];
        if !self.rings.is_empty() {
            let exterior = self.rings.remove(0);
            out.push(Geometry::Polygon(Polygon::new(exterior, self.rings)));
        }
        out.extend(self.opens.into_iter().map(Geometry::LineString));
        out
    }
}

fn resolve(position: &Position, base: (f64, f64), x: f64, y: f64) -> (f64, f64) {
    match position {
        Position::Absolute => (x, y),
        Position::Relative => (base.0 + x, base.1 + y),
    }
}

fn sample_cubic(builder: &mut PathBuilder, c1: (f64, f64), c2: (f64, f64), end: (f64, f64)) {
    let bez = CubicBez::new(
        BezPoint::new(builder.position.0, builder.position.1),
        BezPoint::new(c1.0, c1.1),
        BezPoint::new(c2.0, c2.1),
        BezPoint::new(end.0, end.1),
    );
    for i in 1..=CURVE_SAMPLES {
        let p = bez.eval(i as f64 / CURVE_SAMPLES as f64);
        builder.line_to(p.x, p.y);
    }
}

fn sample_quad(builder: &mut PathBuilder, c: (f64, f64), end: (f64, f64)) {
    let bez = QuadBez::new(
        BezPoint::new(builder.position.0, builder.position.1),
        BezPoint::new(c.0, c.1),
        BezPoint::new(end.0, end.1),
    );
    for i in 1..=CURVE_SAMPLES {
        let p = bez.eval(i as f64 / CURVE_SAMPLES as f64);
        builder.line_to(p.x, p.y);
    }
}

fn path_data_to_shapes(data: &Data) -> Vec<Geometry<f64>> {
    let mut builder = PathBuilder::new();
    for command in data.iter() {
        match command {
            Command::Move(pos, params) => {
                let mut pairs = params.chunks_exact(2);
                if let Some(p) = pairs.next() {
                    let (x, y) = resolve(pos, builder.position, p[0] as f64, p[1] as f64);
                    builder.move_to(x, y);
                }
                // Extra coordinate pairs after a move are implicit line-tos.
                for p in pairs {
                    let (x, y) = resolve(pos, builder.position, p[0] as f64, p[1] as f64);
                    builder.line_to(x, y);
                }
            }
            Command::Line(pos, params) => {
                for p in params.chunks_exact(2) {
                    let (x, y) = resolve(pos, builder.position, p[0] as f64, p[1] as f64);
                    builder.line_to(x, y);
                }
            }
            Command::HorizontalLine(pos, params) => {
                for p in params.iter() {
                    let x = match pos {
                        Position::Absolute => *p as f64,
                        Position::Relative => builder.position.0 + *p as f64,
                    };
                    builder.line_to(x, builder.position.1);
                }
            }
            Command::VerticalLine(pos, params) => {
                for p in params.iter() {
                    let y = match pos {
                        Position::Absolute => *p as f64,
                        Position::Relative => builder.position.1 + *p as f64,
                    };
                    builder.line_to(builder.position.0, y);
                }
            }
            Command::CubicCurve(pos, params) => {
                for p in params.chunks_exact(6) {
                    let base = builder.position;
                    let c1 = resolve(pos, base, p[0] as f64, p[1] as f64);
                    let c2 = resolve(pos, base, p[2] as f64, p[3] as f64);
                    let end = resolve(pos, base, p[4] as f64, p[5] as f64);
                    sample_cubic(&mut builder, c1, c2, end);
                }
            }
            Command::QuadraticCurve(pos, params) => {
                for p in params.chunks_exact(4) {
                    let base = builder.position;
                    let c = resolve(pos, base, p[0] as f64, p[1] as f64);
                    let end = resolve(pos, base, p[2] as f64, p[3] as f64);
                    sample_quad(&mut builder, c, end);
                }
            }
            Command::SmoothCubicCurve(pos, params) => {
                // Control-point reflection is not tracked; chord to the end.
                debug!("smooth cubic segment approximated by its chord");
                for p in params.chunks_exact(4) {
                    let end = resolve(pos, builder.position, p[2] as f64, p[3] as f64);
                    builder.line_to(end.0, end.1);
                }
            }
            Command::SmoothQuadraticCurve(pos, params) => {
                debug!("smooth quadratic segment approximated by its chord");
                for p in params.chunks_exact(2) {
                    let end = resolve(pos, builder.position, p[0] as f64, p[1] as f64);
                    builder.line_to(end.0, end.1);
                }
            }
            Command::EllipticalArc(pos, params) => {
                debug!("elliptical arc approximated by its chord");
                for p in params.chunks_exact(7) {
                    let end = resolve(pos, builder.position, p[5] as f64, p[6] as f64);
                    builder.line_to(end.0, end.1);
                }
            }
            Command::Close => builder.close(),
        }
    }
    builder.shapes()
}

/// Convert a layer into SVG path data, scaled by `dpi`.
pub trait ToPathData {
    fn to_path_data(&self, dpi: f64) -> Data;
}

impl ToPathData for MultiLineString<f64> {
    fn to_path_data(&self, dpi: f64) -> Data {
        let mut svg_data = Data::new();
        for line in self {
            for point in line.points().take(1) {
                svg_data = svg_data.move_to((point.x() * dpi, point.y() * dpi));
            }
            for point in line.points().skip(1) {
                svg_data = svg_data.line_to((point.x() * dpi, point.y() * dpi));
            }
        }
        svg_data
    }
}

/// Knobs for the preview renderer.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Screen pixels per plotter inch.
    pub dpi: f64,
    /// Stroke width in screen pixels.
    pub stroke_width: f64,
    /// Per-layer pen colors; layers beyond the list get random colors.
    pub colors: Vec<Color>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            dpi: 128.0,
            stroke_width: 1.0,
            // The palette constants are known-good hex strings.
            colors: LAYER_COLORS
                .iter()
                .map(|s| s.parse().unwrap())
                .collect(),
        }
    }
}

/// Render layers into an SVG preview document of `width` x `height` inches.
pub fn render_svg(layers: &[MultiLineString<f64>], width: f64, height: f64, opts: &RenderOptions) -> Document {
    let mut rng = rand::thread_rng();
    let mut document = Document::new()
        .set("viewBox", (0.0, 0.0, width * opts.dpi, height * opts.dpi))
        .set("width", format!("{}in", width))
        .set("height", format!("{}in", height));
    for (i, layer) in layers.iter().enumerate() {
        let color = opts
            .colors
            .get(i)
            .cloned()
            .unwrap_or_else(|| {
                Color::from_rgba8(rng.gen::<u8>(), rng.gen::<u8>(), rng.gen::<u8>(), 255)
            });
        let path = Path::new()
            .set("fill", "none")
            .set("stroke", color.to_hex_string())
            .set("stroke-width", opts.stroke_width)
            .set("stroke-linecap", "round")
            .set("stroke-linejoin", "round")
            .set("d", layer.to_path_data(opts.dpi));
        document = document.add(path);
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_types::size;
    use geo_types::coord;

    #[test]
    fn test_path_data_line() {
        let data = Data::parse("M 0 0 L 10 0 L 10 10").unwrap();
        let shapes = path_data_to_shapes(&data);
        assert_eq!(shapes.len(), 1);
        match &shapes[0] {
            Geometry::LineString(ls) => assert_eq!(ls.0.len(), 3),
            other => panic!("expected a linestring, got {:?}", other),
        }
    }

    #[test]
    fn test_path_data_closed_becomes_polygon() {
        let data = Data::parse("M 0 0 L 10 0 L 10 10 L 0 10 Z").unwrap();
        let shapes = path_data_to_shapes(&data);
        assert_eq!(shapes.len(), 1);
        match &shapes[0] {
            Geometry::Polygon(poly) => {
                assert_eq!(poly.exterior().0.first(), poly.exterior().0.last());
            }
            other => panic!("expected a polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_path_data_hole() {
        let data = Data::parse("M 0 0 H 10 V 10 H 0 Z M 4 4 h 2 v 2 h -2 Z").unwrap();
        let shapes = path_data_to_shapes(&data);
        assert_eq!(shapes.len(), 1);
        match &shapes[0] {
            Geometry::Polygon(poly) => assert_eq!(poly.interiors().len(), 1),
            other => panic!("expected a polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_path_data_cubic_is_flattened() {
        let data = Data::parse("M 0 0 C 0 10 10 10 10 0").unwrap();
        let shapes = path_data_to_shapes(&data);
        match &shapes[0] {
            Geometry::LineString(ls) => {
                assert_eq!(ls.0.len(), CURVE_SAMPLES + 1);
                let (w, h) = size(ls);
                assert!((w - 10.0).abs() < 1e-6);
                // The curve peaks at 3/4 of the control height.
                assert!((h - 7.5).abs() < 1e-6);
            }
            other => panic!("expected a linestring, got {:?}", other),
        }
    }

    #[test]
    fn test_relative_commands() {
        let data = Data::parse("M 1 1 l 2 0 l 0 2").unwrap();
        let shapes = path_data_to_shapes(&data);
        match &shapes[0] {
            Geometry::LineString(ls) => {
                assert_eq!(ls.0[2], coord! {x: 3.0, y: 3.0});
            }
            other => panic!("expected a linestring, got {:?}", other),
        }
    }

    #[test]
    fn test_render_svg_layer_count() {
        let layer = MultiLineString::new(vec![geo_types::LineString::new(vec![
            coord! {x: 0.0, y: 0.0},
            coord! {x: 1.0, y: 1.0},
        ])]);
        let doc = render_svg(&[layer.clone(), layer], 8.0, 8.0, &RenderOptions::default());
        let rendered = doc.to_string();
        assert_eq!(rendered.matches("<path").count(), 2);
        assert!(rendered.contains("#0000ff"));
        assert!(rendered.contains("#ff0000"));
    }
}
