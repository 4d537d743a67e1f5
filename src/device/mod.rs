//! Driving an AxiDraw over USB serial. The board runs the EiBotBoard
//! (EBB) firmware, which takes short comma-separated commands terminated
//! by a carriage return and answers each one with a line of its own.
//!
//! The high-level entry points are [`Device::plot`] for a whole
//! [`Drawing`] and [`Device::run_layer`] for a single pen pass; the rest
//! of the methods map one-to-one onto EBB commands.

use std::fs;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

use geo_types::{MultiLineString, Point};
use indicatif::ProgressBar;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serialport::SerialPortType;

mod calibrate;
pub mod error;
pub mod planner;
pub use error::DeviceError;

use crate::drawing::Drawing;
use crate::geo_types::{down_length, path_length, up_length, PointDistance};
use planner::{Plan, Planner};

/// USB vendor/product id common to all AxiDraws.
const AXIDRAW_VID: u16 = 0x04d8;
const AXIDRAW_PID: u16 = 0xfd92;

const BAUD_RATE: u32 = 9600;
const SERIAL_TIMEOUT: Duration = Duration::from_secs(1);

/// Something that can exchange command lines with an EBB. Split out from
/// the serial port so the protocol layer can be tested against a mock.
pub trait Transport {
    fn write_line(&mut self, line: &str) -> io::Result<()>;
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize>;
    fn flush(&mut self) -> io::Result<()>;
}

/// A real serial connection to the board.
pub struct SerialTransport {
    reader: Box<dyn BufRead + Send>,
    writer: Box<dyn Write + Send>,
}

impl SerialTransport {
    pub fn open(port: &str) -> Result<SerialTransport, DeviceError> {
        let serial = serialport::new(port, BAUD_RATE)
            .timeout(SERIAL_TIMEOUT)
            .open()?;
        let reader = BufReader::new(serial.try_clone()?);
        let writer = BufWriter::new(serial);
        Ok(SerialTransport {
            reader: Box::new(reader),
            writer: Box::new(writer),
        })
    }
}

impl Transport for SerialTransport {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        // EBB commands end with a bare carriage return.
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\r")
    }

    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        self.reader.read_line(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// The serial port an AxiDraw is plugged into, if any.
pub fn find_port() -> Option<String> {
    let ports = serialport::available_ports().ok()?;
    ports.into_iter().find_map(|port| match &port.port_type {
        SerialPortType::UsbPort(usb) if usb.vid == AXIDRAW_VID && usb.pid == AXIDRAW_PID => {
            Some(port.port_name)
        }
        _ => None,
    })
}

/// Is an AxiDraw plugged in right now?
pub fn axidraw_available() -> bool {
    find_port().is_some()
}

/// Everything tunable about the machine. The defaults suit an AxiDraw V3
/// with the brushless pen-lift upgrade; the servo positions in particular
/// are trial-and-error numbers you may want to adjust for your pen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Pen-lift servo level for travel, in percent (can be negative).
    pub pen_up_position: f64,
    /// Pen-lift servo level for drawing, in percent (can be negative).
    pub pen_down_position: f64,
    pub pen_up_speed: f64,
    pub pen_down_speed: f64,
    /// How long to wait after starting to raise the pen, in ms. Too short
    /// and the pen drags a tail out of every path.
    pub pen_up_delay: u32,
    /// How long to wait after starting to lower the pen, in ms. Too short
    /// and the start of every path goes missing.
    pub pen_down_delay: u32,
    /// Acceleration while drawing, in inches per second squared.
    pub acceleration: f64,
    /// Top speed while drawing, in inches per second.
    pub max_velocity: f64,
    /// Cornering allowance; higher is faster but rounds off sharp corners.
    pub corner_factor: f64,
    pub jog_acceleration: f64,
    pub jog_max_velocity: f64,
    /// Driver board pin the pen-lift motor hangs off (0 is the bottom pin).
    pub pen_lift_pin: u8,
    /// Whether the pen lift is the upgraded brushless motor.
    pub brushless: bool,
    /// Motion is streamed to the board in slices this long, in ms.
    pub timeslice_ms: u64,
    pub microstepping_mode: u8,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            pen_up_position: -50.0,
            pen_down_position: -120.0,
            pen_up_speed: 150.0,
            pen_down_speed: 150.0,
            pen_up_delay: 50,
            pen_down_delay: 50,
            acceleration: 16.0,
            max_velocity: 4.0,
            corner_factor: 0.001,
            jog_acceleration: 16.0,
            jog_max_velocity: 8.0,
            pen_lift_pin: 2,
            brushless: true,
            timeslice_ms: 10,
            microstepping_mode: 1,
        }
    }
}

impl DeviceConfig {
    /// Read settings back from a RON file written by [`DeviceConfig::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DeviceConfig, DeviceError> {
        let data = fs::read_to_string(path)?;
        ron::from_str(&data).map_err(|err| DeviceError::Config(err.to_string()))
    }

    /// Write settings out as RON. Goes through a temporary file and a
    /// rename, so an interrupted write leaves the old settings intact.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DeviceError> {
        let path = path.as_ref();
        let tmp = path.with_extension(format!("tmp-{}", rand::random::<u32>()));
        let writer = fs::File::create(&tmp)?;
        ron::Options::default()
            .to_io_writer(writer, self)
            .map_err(|err| DeviceError::Config(err.to_string()))?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    fn step_divider(&self) -> f64 {
        (1u32 << (self.microstepping_mode.saturating_sub(1))) as f64
    }

    /// Motor steps per inch at the configured microstepping mode.
    pub fn steps_per_unit(&self) -> f64 {
        2032.0 / self.step_divider()
    }

    fn planner(&self, jog: bool) -> Planner {
        if jog {
            Planner::new(self.jog_acceleration, self.jog_max_velocity, self.corner_factor)
        } else {
            Planner::new(self.acceleration, self.max_velocity, self.corner_factor)
        }
    }
}

/// A connected AxiDraw. Owning one monopolizes the serial port; drop it
/// (or let it fall out of scope) to let other programs talk to the board.
pub struct Device<T: Transport> {
    config: DeviceConfig,
    transport: T,
    /// Fractional steps left over from previous timeslices, carried so
    /// rounding never drifts the pen off course.
    step_error: (f64, f64),
}

impl Device<SerialTransport> {
    /// Find an AxiDraw on USB and connect with default settings.
    pub fn open() -> Result<Device<SerialTransport>, DeviceError> {
        Device::open_with(DeviceConfig::default())
    }

    pub fn open_with(config: DeviceConfig) -> Result<Device<SerialTransport>, DeviceError> {
        let port = find_port().ok_or(DeviceError::NotFound)?;
        info!("found AxiDraw on {}", port);
        Device::with_transport(SerialTransport::open(&port)?, config)
    }

    /// Connect to an explicit serial port instead of scanning for one.
    pub fn open_port(port: &str, config: DeviceConfig) -> Result<Device<SerialTransport>, DeviceError> {
        Device::with_transport(SerialTransport::open(port)?, config)
    }
}

impl<T: Transport> Device<T> {
    /// Wrap an already-open transport and push the servo configuration
    /// down to the board.
    pub fn with_transport(transport: T, config: DeviceConfig) -> Result<Device<T>, DeviceError> {
        let mut device = Device {
            config,
            transport,
            step_error: (0.0, 0.0),
        };
        device.configure()?;
        Ok(device)
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Send one command and collect the board's one-line answer.
    fn command(&mut self, line: &str) -> Result<String, DeviceError> {
        debug!("> {}", line);
        self.transport.write_line(line)?;
        self.transport.flush()?;
        self.read_response()
    }

    fn read_response(&mut self) -> Result<String, DeviceError> {
        let mut response = String::new();
        self.transport.read_line(&mut response)?;
        debug!("< {}", response.trim_end());
        Ok(response.trim().to_string())
    }

    fn configure(&mut self) -> Result<(), DeviceError> {
        let (servo_min, servo_max) = if self.config.brushless {
            (9855.0, 12600.0)
        } else {
            (5400.0, 27831.0)
        };
        let span = servo_max - servo_min;
        let up = (servo_min + span * self.config.pen_up_position / 100.0) as i32;
        let down = (servo_min + span * self.config.pen_down_position / 100.0) as i32;
        self.command(&format!("SC,4,{}", up))?;
        self.command(&format!("SC,5,{}", down))?;
        self.command(&format!("SC,11,{}", (self.config.pen_up_speed * 5.0) as i32))?;
        self.command(&format!("SC,12,{}", (self.config.pen_down_speed * 5.0) as i32))?;
        Ok(())
    }

    pub fn version(&mut self) -> Result<String, DeviceError> {
        self.command("V")
    }

    /// Lift the pen.
    pub fn pen_up(&mut self) -> Result<(), DeviceError> {
        self.command(&format!(
            "SP,1,{},{}",
            self.config.pen_up_delay, self.config.pen_lift_pin
        ))?;
        Ok(())
    }

    /// Lower the pen.
    pub fn pen_down(&mut self) -> Result<(), DeviceError> {
        self.command(&format!(
            "SP,0,{},{}",
            self.config.pen_down_delay, self.config.pen_lift_pin
        ))?;
        Ok(())
    }

    pub fn enable_motors(&mut self) -> Result<(), DeviceError> {
        let m = self.config.microstepping_mode;
        self.command(&format!("EM,{},{}", m, m))?;
        Ok(())
    }

    pub fn disable_motors(&mut self) -> Result<(), DeviceError> {
        self.command("EM,0,0")?;
        Ok(())
    }

    pub fn motor_status(&mut self) -> Result<String, DeviceError> {
        self.command("QM")
    }

    /// Block until the motors report idle.
    pub fn wait(&mut self) -> Result<(), DeviceError> {
        while self.motor_status()?.contains('1') {
            thread::sleep(Duration::from_millis(10));
        }
        Ok(())
    }

    /// Declare wherever the pen is right now to be the origin. For best
    /// results always start and end a session with the carriage homed; if
    /// it gets away from you, disable the motors, slide it back to the
    /// corner by hand, and call this.
    pub fn zero(&mut self) -> Result<(), DeviceError> {
        self.command("CS")?;
        Ok(())
    }

    /// Where the board thinks the pen is, in inches from the origin.
    pub fn read_position(&mut self) -> Result<(f64, f64), DeviceError> {
        let response = self.command("QS")?;
        // QS sends the step counts and then a separate OK line.
        self.read_response()?;
        let mut parts = response.split(',');
        let (Some(a), Some(b)) = (parts.next(), parts.next()) else {
            return Err(DeviceError::Protocol(response));
        };
        let steps_per_unit = self.config.steps_per_unit();
        let a = a.trim().parse::<f64>()? / steps_per_unit;
        let b = b.trim().parse::<f64>()? / steps_per_unit;
        // The two motors drive mixed axes (CoreXY style).
        let y = (a - b) / 2.0;
        let x = y + b;
        Ok((x, y))
    }

    fn stepper_move(&mut self, duration_ms: u64, a: i64, b: i64) -> Result<(), DeviceError> {
        self.command(&format!("XM,{},{},{}", duration_ms, a, b))?;
        Ok(())
    }

    /// Stream a motion plan to the board, one timeslice at a time. Step
    /// counts are integers, so the fractional remainder of every slice is
    /// carried into the next one.
    pub fn run_plan(&mut self, plan: &Plan) -> Result<(), DeviceError> {
        let step_s = self.config.timeslice_ms as f64 / 1000.0;
        let steps_per_unit = self.config.steps_per_unit();
        let mut t = 0.0;
        while t < plan.duration() {
            let i1 = plan.instant(t);
            let i2 = plan.instant(t + step_s);
            let dx = i2.position.x() - i1.position.x();
            let dy = i2.position.y() - i1.position.y();
            let x = dx * steps_per_unit + self.step_error.0;
            let y = dy * steps_per_unit + self.step_error.1;
            self.step_error = (x.fract(), y.fract());
            self.stepper_move(self.config.timeslice_ms, x.trunc() as i64, y.trunc() as i64)?;
            t += step_s;
        }
        Ok(())
    }

    /// Plan and run one polyline. With `draw` the pen is lowered for the
    /// move; `jog` selects the faster pen-up speed limits.
    pub fn run_path(&mut self, points: &[Point<f64>], draw: bool, jog: bool) -> Result<(), DeviceError> {
        let plan = self.config.planner(jog).plan(points);
        if draw {
            self.pen_down()?;
            self.run_plan(&plan)?;
            self.pen_up()?;
        } else {
            self.run_plan(&plan)?;
        }
        Ok(())
    }

    /// Offset the pen from wherever it currently is, in inches.
    pub fn move_by(&mut self, dx: f64, dy: f64) -> Result<(), DeviceError> {
        self.run_path(&[Point::new(0.0, 0.0), Point::new(dx, dy)], false, false)
    }

    /// Move the pen straight to `(x, y)` inches from the origin.
    pub fn goto(&mut self, x: f64, y: f64, jog: bool) -> Result<(), DeviceError> {
        let (px, py) = self.read_position()?;
        self.run_path(&[Point::new(px, py), Point::new(x, y)], false, jog)
    }

    /// Send the pen back to the origin.
    pub fn home(&mut self) -> Result<(), DeviceError> {
        self.goto(0.0, 0.0, true)
    }

    /// Plot one layer. Planning runs on a background thread so the board
    /// never sits idle waiting for the next path to be planned; a progress
    /// bar tracks distance covered, pen up and down alike.
    pub fn run_layer(&mut self, layer: &MultiLineString<f64>, label: &str) -> Result<(), DeviceError> {
        let jog_planner = self.config.planner(true);
        let draw_planner = self.config.planner(false);
        let paths: Vec<Vec<Point<f64>>> = layer
            .0
            .iter()
            .filter(|line| line.0.len() > 1)
            .map(|line| line.points().collect())
            .collect();

        let (sender, receiver) = crossbeam::channel::unbounded::<(Plan, f64)>();
        let planning = thread::spawn(move || {
            let mut position = Point::new(0.0, 0.0);
            for path in paths {
                let start = path[0];
                let jog_plan = jog_planner.plan(&[position, start]);
                let jog_length = position.distance(&start);
                if sender.send((jog_plan, jog_length)).is_err() {
                    return;
                }
                let draw_length: f64 = path
                    .windows(2)
                    .map(|pair| pair[0].distance(&pair[1]))
                    .sum();
                if sender.send((draw_planner.plan(&path), draw_length)).is_err() {
                    return;
                }
                position = *path.last().expect("paths have 2+ points");
            }
        });

        let total = down_length(layer) + up_length(layer);
        let bar = ProgressBar::new((total * 100.0) as u64);
        bar.set_message(label.to_string());
        let mut index = 0usize;
        for (plan, length) in receiver.iter() {
            if index % 2 == 0 {
                self.pen_up()?;
            } else {
                self.pen_down()?;
            }
            self.run_plan(&plan)?;
            bar.inc((length * 100.0) as u64);
            index += 1;
        }
        bar.finish_and_clear();
        planning
            .join()
            .map_err(|_| DeviceError::Protocol("planning thread panicked".to_string()))?;
        self.pen_up()?;
        self.home()
    }

    /// Plot a whole drawing, pausing before every layer so the operator
    /// can swap pens.
    pub fn plot(&mut self, drawing: &Drawing) -> Result<(), DeviceError> {
        self.enable_motors()?;
        for (i, layer) in drawing.layers().iter().enumerate() {
            let label = format!("layer {}", i);
            let down = path_length_of_layer(layer);
            println!(
                "Press enter when you're ready to draw {} ({:.2} inches of ink)",
                label, down
            );
            let mut line = String::new();
            io::stdin().read_line(&mut line)?;
            self.run_layer(layer, &label)?;
        }
        self.disable_motors()?;
        Ok(())
    }
}

fn path_length_of_layer(layer: &MultiLineString<f64>) -> f64 {
    layer.0.iter().map(path_length).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{coord, LineString};
    use std::collections::VecDeque;

    struct MockTransport {
        sent: Vec<String>,
        responses: VecDeque<String>,
    }

    impl MockTransport {
        fn new() -> MockTransport {
            MockTransport {
                sent: vec![],
                responses: VecDeque::new(),
            }
        }

        fn with_responses(responses: &[&str]) -> MockTransport {
            MockTransport {
                sent: vec![],
                responses: responses.iter().map(|s| s.to_string()).collect(),
            }
        }
    }

    impl Transport for MockTransport {
        fn write_line(&mut self, line: &str) -> io::Result<()> {
            // Position queries need a parseable answer plus a trailing OK.
            if line == "QS" && self.responses.is_empty() {
                self.responses.push_back("0,0".to_string());
                self.responses.push_back("OK".to_string());
            }
            self.sent.push(line.to_string());
            Ok(())
        }

        fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
            let response = self.responses.pop_front().unwrap_or_else(|| "OK".to_string());
            buf.push_str(&response);
            buf.push_str("\r\n");
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn test_device() -> Device<MockTransport> {
        Device::with_transport(MockTransport::new(), DeviceConfig::default()).unwrap()
    }

    #[test]
    fn test_configure_sends_servo_setup() {
        let device = test_device();
        // Brushless range is 9855..12600; -50% and -120% land below it.
        assert_eq!(
            device.transport.sent,
            vec!["SC,4,8482", "SC,5,6561", "SC,11,750", "SC,12,750"]
        );
    }

    #[test]
    fn test_configure_standard_servo() {
        let config = DeviceConfig {
            brushless: false,
            ..DeviceConfig::default()
        };
        let device = Device::with_transport(MockTransport::new(), config).unwrap();
        assert_eq!(device.transport.sent[0], "SC,4,-5815");
        assert_eq!(device.transport.sent[1], "SC,5,-21517");
    }

    #[test]
    fn test_pen_commands() {
        let mut device = test_device();
        device.transport.sent.clear();
        device.pen_up().unwrap();
        device.pen_down().unwrap();
        assert_eq!(device.transport.sent, vec!["SP,1,50,2", "SP,0,50,2"]);
    }

    #[test]
    fn test_motor_commands() {
        let mut device = test_device();
        device.transport.sent.clear();
        device.enable_motors().unwrap();
        device.disable_motors().unwrap();
        device.zero().unwrap();
        assert_eq!(device.transport.sent, vec!["EM,1,1", "EM,0,0", "CS"]);
    }

    #[test]
    fn test_read_position_decodes_mixed_axes() {
        let mut device = Device::with_transport(
            MockTransport::with_responses(&["OK", "OK", "OK", "OK", "1016,508", "OK"]),
            DeviceConfig::default(),
        )
        .unwrap();
        let (x, y) = device.read_position().unwrap();
        assert!((x - 0.375).abs() < 1e-9);
        assert!((y - 0.125).abs() < 1e-9);
    }

    #[test]
    fn test_run_plan_steps_add_up() {
        let mut device = test_device();
        device.transport.sent.clear();
        let plan = device.config.planner(false).plan(&[
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
        ]);
        device.run_plan(&plan).unwrap();
        let mut total_a = 0i64;
        for line in &device.transport.sent {
            let fields: Vec<&str> = line.split(',').collect();
            assert_eq!(fields[0], "XM");
            assert_eq!(fields[1], "10");
            total_a += fields[2].parse::<i64>().unwrap();
        }
        // One inch is 2032 steps; at most one step may be left in the
        // fractional error accumulator.
        assert!(total_a >= 2031 && total_a <= 2032);
        assert!((device.step_error.0).abs() < 1.0);
    }

    #[test]
    fn test_run_layer_alternates_pen_state() {
        let mut device = test_device();
        device.transport.sent.clear();
        let layer = MultiLineString::new(vec![LineString::new(vec![
            coord! {x: 0.0, y: 0.0},
            coord! {x: 0.1, y: 0.0},
        ])]);
        device.run_layer(&layer, "test").unwrap();
        let pen_commands: Vec<&String> = device
            .transport
            .sent
            .iter()
            .filter(|line| line.starts_with("SP"))
            .collect();
        // Up for the jog, down for the stroke, then up again before homing.
        assert_eq!(pen_commands[0], "SP,1,50,2");
        assert_eq!(pen_commands[1], "SP,0,50,2");
        assert_eq!(pen_commands.last().unwrap().as_str(), "SP,1,50,2");
    }

    #[test]
    fn test_config_round_trip() {
        let path = std::env::temp_dir().join(format!("elk-config-{}.ron", rand::random::<u32>()));
        let config = DeviceConfig {
            pen_up_position: -40.0,
            max_velocity: 2.5,
            brushless: false,
            ..DeviceConfig::default()
        };
        config.save(&path).unwrap();
        let loaded = DeviceConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_load_rejects_garbage() {
        let path = std::env::temp_dir().join(format!("elk-config-{}.ron", rand::random::<u32>()));
        std::fs::write(&path, "(pen_up_position: what)").unwrap();
        let result = DeviceConfig::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(DeviceError::Config(_))));
    }
}
