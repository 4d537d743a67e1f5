use std::{
    error::Error,
    fmt::{self, Display},
};

/// Errors raised while parsing a Hershey `.jhf` font file.
#[derive(Debug)]
pub enum FontError {
    Io(std::io::Error),
    BadGlyphHeader(usize),
    TruncatedGlyph { line: usize, expected: usize, found: usize },
}

impl Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontError::Io(err) => write!(f, "font i/o error: {}", err),
            FontError::BadGlyphHeader(line) => {
                write!(f, "unparseable glyph header on line {}", line)
            }
            FontError::TruncatedGlyph {
                line,
                expected,
                found,
            } => write!(
                f,
                "glyph on line {} declares {} vertices but carries {}",
                line, expected, found
            ),
        }
    }
}

impl Error for FontError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FontError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FontError {
    fn from(err: std::io::Error) -> Self {
        FontError::Io(err)
    }
}

/// Errors raised while importing an SVG file into geometry.
#[derive(Debug)]
pub enum SvgImportError {
    Io(std::io::Error),
    Parse(String),
    NullGeometry,
}

impl Display for SvgImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SvgImportError::Io(err) => write!(f, "svg i/o error: {}", err),
            SvgImportError::Parse(msg) => write!(f, "svg parse error: {}", msg),
            SvgImportError::NullGeometry => write!(f, "Empty/Invalid/Dimensionless geometry"),
        }
    }
}

impl Error for SvgImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SvgImportError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SvgImportError {
    fn from(err: std::io::Error) -> Self {
        SvgImportError::Io(err)
    }
}
