//! Single-stroke vector text. Outline fonts are useless on a plotter
//! (the pen would trace both edges of every stem), so this follows the
//! Hershey tradition: each glyph is a handful of polylines. A built-in
//! font covers printable ASCII, and any of the classic `.jhf` font files
//! can be loaded for fancier lettering.

use std::fs;
use std::path::Path;

use geo::{Scale, Translate};
use geo_types::{coord, LineString, MultiLineString};

use crate::errors::FontError;
use crate::geo_types::size;

mod builtin;

/// One character: horizontal extents plus the pen strokes that draw it.
/// Stroke coordinates are y-down with the baseline below y zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub left: f64,
    pub right: f64,
    pub strokes: Vec<Vec<(f64, f64)>>,
}

/// A font of up to 96 glyphs, one per printable ASCII character.
#[derive(Debug, Clone)]
pub struct HersheyFont {
    glyphs: Vec<Option<Glyph>>,
}

impl HersheyFont {
    /// The compiled-in single-stroke font. Not beautiful, but always
    /// available.
    pub fn builtin() -> HersheyFont {
        HersheyFont {
            glyphs: builtin::glyphs(),
        }
    }

    /// Read a font in the Hershey `.jhf` format.
    pub fn load_jhf<P: AsRef<Path>>(path: P) -> Result<HersheyFont, FontError> {
        HersheyFont::from_jhf(&fs::read_to_string(path)?)
    }

    /// Parse `.jhf` text: one glyph per record, in ASCII order from space.
    /// Each record carries a glyph id (5 columns), a vertex count
    /// (3 columns), then coordinate pairs encoded as offsets from `R`,
    /// with the first pair being the left/right extents and the pair
    /// `" R"` lifting the pen. Long records wrap onto extra lines.
    pub fn from_jhf(source: &str) -> Result<HersheyFont, FontError> {
        let mut glyphs: Vec<Option<Glyph>> = vec![None; 96];
        let mut slot = 0;
        let mut lines = source.lines().enumerate();
        while let Some((line_no, line)) = lines.next() {
            if line.trim().is_empty() {
                continue;
            }
            if !line.is_ascii() || line.len() < 10 {
                return Err(FontError::BadGlyphHeader(line_no + 1));
            }
            let count: usize = line[5..8]
                .trim()
                .parse()
                .map_err(|_| FontError::BadGlyphHeader(line_no + 1))?;
            let expected = count * 2;
            let mut data: Vec<char> = line[8..].chars().collect();
            while data.len() < expected {
                match lines.next() {
                    Some((_, continuation)) => data.extend(continuation.chars()),
                    None => {
                        return Err(FontError::TruncatedGlyph {
                            line: line_no + 1,
                            expected: count,
                            found: data.len() / 2,
                        })
                    }
                }
            }
            data.truncate(expected);
            if data.len() < 2 {
                return Err(FontError::BadGlyphHeader(line_no + 1));
            }

            let value = |c: char| c as i64 as f64 - 'R' as i64 as f64;
            let left = value(data[0]);
            let right = value(data[1]);
            let mut strokes: Vec<Vec<(f64, f64)>> = vec![];
            let mut current: Vec<(f64, f64)> = vec![];
            for pair in data[2..].chunks(2) {
                if pair[0] == ' ' && pair[1] == 'R' {
                    if current.len() > 1 {
                        strokes.push(std::mem::take(&mut current));
                    } else {
                        current.clear();
                    }
                } else {
                    current.push((value(pair[0]), value(pair[1])));
                }
            }
            if current.len() > 1 {
                strokes.push(current);
            }

            glyphs[slot] = Some(Glyph {
                left,
                right,
                strokes,
            });
            slot += 1;
            if slot == 96 {
                break;
            }
        }
        Ok(HersheyFont { glyphs })
    }

    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        let index = (ch as i64).checked_sub(32)?;
        if !(0..96).contains(&index) {
            return None;
        }
        self.glyphs[index as usize].as_ref()
    }
}

/// Lay out a string in font units, left to right from the origin.
/// `spacing` is added between characters and `extra` after every space,
/// which is what justification leans on.
pub fn text(string: &str, font: &HersheyFont, spacing: f64, extra: f64) -> MultiLineString<f64> {
    let mut lines: Vec<LineString<f64>> = vec![];
    let mut x = 0.0;
    for ch in string.chars() {
        let Some(glyph) = font.glyph(ch) else {
            x += spacing;
            continue;
        };
        for stroke in &glyph.strokes {
            if stroke.len() > 1 {
                lines.push(LineString::new(
                    stroke
                        .iter()
                        .map(|(i, j)| coord! {x: x + i - glyph.left, y: *j})
                        .collect(),
                ));
            }
        }
        x += glyph.right - glyph.left + spacing;
        if ch == ' ' {
            x += extra;
        }
    }
    MultiLineString::new(lines)
}

/// Where each line of wrapped text sits relative to the widest one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Right,
    Center,
}

/// A [`HersheyFont`] scaled to a point size, with the usual layout
/// operations on top.
#[derive(Debug, Clone)]
pub struct Font {
    font: HersheyFont,
    scale: f64,
    max_height: f64,
}

impl Font {
    /// `point_size` works like it does in any text editor: 72 points to
    /// the inch, measured over the full height of the font.
    pub fn new(font: HersheyFont, point_size: f64) -> Font {
        let printable: String = (32u8..127).map(char::from).collect();
        let (_, max_height) = size(&text(&printable, &font, 0.0, 0.0));
        let scale = (point_size / 72.0) / max_height;
        Font {
            font,
            scale,
            max_height,
        }
    }

    /// Render one line of text, in inches.
    pub fn text(&self, string: &str) -> MultiLineString<f64> {
        text(string, &self.font, 0.0, 0.0).scale_around_point(
            self.scale,
            self.scale,
            coord! {x: 0.0, y: 0.0},
        )
    }

    /// Width and height of a rendered string, in inches.
    pub fn measure(&self, string: &str) -> (f64, f64) {
        size(&self.text(string))
    }

    /// Stretch a line of text to exactly `width` inches by widening its
    /// spaces. A line with no spaces (or one already too wide) is
    /// returned as-is.
    pub fn justify_text(&self, string: &str, width: f64) -> MultiLineString<f64> {
        let rendered = self.text(string);
        let (w, _) = size(&rendered);
        let spaces = string.matches(' ').count();
        if spaces == 0 || w >= width {
            return rendered;
        }
        let extra = ((width - w) / spaces as f64) / self.scale;
        text(string, &self.font, 0.0, extra).scale_around_point(
            self.scale,
            self.scale,
            coord! {x: 0.0, y: 0.0},
        )
    }

    /// Word-wrap a paragraph to `width` inches and stack the lines.
    /// `line_spacing` is in multiples of the font height; `justify`
    /// stretches every line but the last to a common width.
    pub fn wrap(
        &self,
        string: &str,
        width: f64,
        line_spacing: f64,
        align: TextAlign,
        justify: bool,
    ) -> MultiLineString<f64> {
        let wrapped = word_wrap(string, width, |s| self.measure(s));
        let mut shapes: Vec<MultiLineString<f64>> =
            wrapped.iter().map(|line| self.text(line)).collect();
        let max_width = shapes
            .iter()
            .map(|shape| size(shape).0)
            .fold(0.0, f64::max);
        if justify && shapes.len() > 1 {
            for (line, shape) in wrapped.iter().zip(shapes.iter_mut()).rev().skip(1) {
                *shape = self.justify_text(line, max_width);
            }
        }
        let spacing = line_spacing * self.max_height * self.scale;
        let mut lines: Vec<LineString<f64>> = vec![];
        let mut y = 0.0;
        for shape in shapes {
            let (w, _) = size(&shape);
            let x = match align {
                TextAlign::Left => 0.0,
                TextAlign::Right => max_width - w,
                TextAlign::Center => (max_width - w) / 2.0,
            };
            lines.extend(shape.translate(x, y).0);
            y += spacing;
        }
        MultiLineString::new(lines)
    }
}

/// Break a paragraph into lines no wider than `width`, splitting at
/// whitespace. A single word wider than the limit gets a line to itself.
fn word_wrap<F>(string: &str, width: f64, measure: F) -> Vec<String>
where
    F: Fn(&str) -> (f64, f64),
{
    let mut result: Vec<String> = vec![];
    for line in string.split('\n') {
        // Alternating runs of non-space and space characters.
        let mut fields: Vec<String> = vec![];
        for ch in line.chars() {
            let starts_new_field = match fields.last() {
                Some(last) => {
                    last.chars().next().map(char::is_whitespace) != Some(ch.is_whitespace())
                }
                None => true,
            };
            if starts_new_field {
                fields.push(String::new());
            }
            fields.last_mut().expect("just pushed").push(ch);
        }
        if fields.len() % 2 == 1 {
            fields.push(String::new());
        }
        let mut pending = String::new();
        for pair in fields.chunks(2) {
            let word = &pair[0];
            let gap = &pair[1];
            let (w, _) = measure(&format!("{}{}", pending, word));
            if w > width {
                if pending.is_empty() {
                    result.push(word.clone());
                    continue;
                }
                result.push(std::mem::take(&mut pending));
            }
            pending.push_str(word);
            pending.push_str(gap);
        }
        if !pending.is_empty() {
            result.push(pending);
        }
    }
    result.iter().map(|line| line.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE_JHF: &str = "    1  1JZ\n    2  5JZNVRNVVNV\n    3  6JZNVRN RVVNV\n";

    #[test]
    fn test_jhf_parse_margins_and_strokes() {
        let font = HersheyFont::from_jhf(TRIANGLE_JHF).unwrap();
        let space = font.glyph(' ').unwrap();
        assert_eq!(space.left, -8.0);
        assert_eq!(space.right, 8.0);
        assert!(space.strokes.is_empty());

        let bang = font.glyph('!').unwrap();
        assert_eq!(bang.strokes.len(), 1);
        assert_eq!(
            bang.strokes[0],
            vec![(-4.0, 4.0), (0.0, -4.0), (4.0, 4.0), (-4.0, 4.0)]
        );
    }

    #[test]
    fn test_jhf_pen_up_splits_strokes() {
        let font = HersheyFont::from_jhf(TRIANGLE_JHF).unwrap();
        let quote = font.glyph('"').unwrap();
        assert_eq!(quote.strokes.len(), 2);
        assert_eq!(quote.strokes[0], vec![(-4.0, 4.0), (0.0, -4.0)]);
        assert_eq!(quote.strokes[1], vec![(4.0, 4.0), (-4.0, 4.0)]);
    }

    #[test]
    fn test_jhf_bad_header() {
        assert!(matches!(
            HersheyFont::from_jhf("    1 xxJZ"),
            Err(FontError::BadGlyphHeader(1))
        ));
    }

    #[test]
    fn test_jhf_truncated_glyph() {
        assert!(matches!(
            HersheyFont::from_jhf("    1 99JZNV"),
            Err(FontError::TruncatedGlyph { line: 1, .. })
        ));
    }

    #[test]
    fn test_text_advances_between_characters() {
        let font = HersheyFont::builtin();
        let single = text("I", &font, 0.0, 0.0);
        let double = text("II", &font, 0.0, 0.0);
        assert_eq!(double.0.len(), single.0.len() * 2);
        let (w1, _) = size(&single);
        let (w2, _) = size(&double);
        assert!(w2 > w1);
    }

    #[test]
    fn test_text_skips_unknown_characters() {
        let font = HersheyFont::builtin();
        let rendered = text("A\u{263a}B", &font, 0.0, 0.0);
        let plain = text("AB", &font, 0.0, 0.0);
        assert_eq!(rendered.0.len(), plain.0.len());
    }

    #[test]
    fn test_point_size_scales_height() {
        let font = Font::new(HersheyFont::builtin(), 72.0);
        // 72 points is one inch over the full font height, so no single
        // string can measure taller than that.
        let (_, h) = font.measure("Hello, World?");
        assert!(h > 0.1 && h <= 1.0 + 1e-9);
        let smaller = Font::new(HersheyFont::builtin(), 36.0);
        let (_, h2) = smaller.measure("Hello, World?");
        assert!((h2 - h / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_word_wrap_breaks_lines() {
        let measure = |s: &str| (s.len() as f64, 1.0);
        let wrapped = word_wrap("the quick brown fox jumps", 10.0, measure);
        assert!(wrapped.len() > 1);
        for line in &wrapped {
            assert!(line.len() as f64 <= 10.0 || !line.contains(' '));
        }
    }

    #[test]
    fn test_word_wrap_overlong_word_gets_own_line() {
        let measure = |s: &str| (s.len() as f64, 1.0);
        let wrapped = word_wrap("a extraordinarily b", 6.0, measure);
        assert!(wrapped.contains(&"extraordinarily".to_string()));
    }

    #[test]
    fn test_wrap_stacks_lines() {
        let font = Font::new(HersheyFont::builtin(), 12.0);
        let one_line = font.text("ONE TWO THREE FOUR");
        let wrapped = font.wrap("ONE TWO THREE FOUR", 0.5, 1.0, TextAlign::Left, false);
        let (_, h1) = size(&one_line);
        let (_, h2) = size(&wrapped);
        assert!(h2 > h1);
    }

    #[test]
    fn test_justify_widens_to_target() {
        let font = Font::new(HersheyFont::builtin(), 12.0);
        let justified = font.justify_text("AB CD", 2.0);
        let (w, _) = size(&justified);
        assert!((w - 2.0).abs() < 1e-6);
    }
}
