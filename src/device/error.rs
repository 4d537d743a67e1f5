use std::fmt;
use std::fmt::Formatter;
use std::io;
use std::num::ParseFloatError;

#[derive(Debug)]
pub enum DeviceError {
    /// No plotter answering on any serial port.
    NotFound,
    Io(io::Error),
    Serial(serialport::Error),
    /// The board answered, but with something we could not make sense of.
    Protocol(String),
    /// A settings file that would not parse or serialize.
    Config(String),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::NotFound => write!(f, "could not find an AxiDraw over USB"),
            DeviceError::Io(err) => write!(f, "device i/o error: {}", err),
            DeviceError::Serial(err) => write!(f, "serial port error: {}", err),
            DeviceError::Protocol(msg) => write!(f, "unexpected device response: {}", msg),
            DeviceError::Config(msg) => write!(f, "bad settings file: {}", msg),
        }
    }
}

impl std::error::Error for DeviceError {}

impl From<io::Error> for DeviceError {
    fn from(error: io::Error) -> Self {
        DeviceError::Io(error)
    }
}

impl From<serialport::Error> for DeviceError {
    fn from(error: serialport::Error) -> Self {
        DeviceError::Serial(error)
    }
}

impl From<ParseFloatError> for DeviceError {
    fn from(error: ParseFloatError) -> Self {
        DeviceError::Protocol(error.to_string())
    }
}
