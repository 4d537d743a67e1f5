//! Command line pen wrangling: the handful of motions you always need
//! while setting up a plot (homing, zeroing, nudging the carriage, pen
//! up/down) without writing a program for it.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use elkplot::device::{Device, DeviceConfig, DeviceError, SerialTransport};

#[derive(Parser)]
#[command(name = "elk", version, about = "Manual AxiDraw control")]
struct Opts {
    /// Serial port of the plotter; scans USB for one when omitted.
    #[arg(long, global = true)]
    port: Option<String>,

    /// Settings file (RON) to load instead of the defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactively tune the pen heights (or speed), writing the result
    /// back to the settings file
    Calibrate {
        /// Page width in inches
        width: f64,
        /// Page height in inches
        height: f64,
        /// Margin kept clear on all sides, in inches
        #[arg(long, default_value_t = 0.5)]
        margin: f64,
        /// Tune the top drawing speed instead of the pen heights
        #[arg(long)]
        speed: bool,
    },
    /// Bring the pen down onto the page
    Down {
        /// Servo level to lower to, overriding the default
        height: Option<f64>,
    },
    /// Move the pen directly to the point (x, y), in inches
    #[command(allow_negative_numbers = true)]
    Goto { x: f64, y: f64 },
    /// Return the pen to (0, 0)
    Home,
    /// Offset the pen's current position, in inches
    #[command(allow_negative_numbers = true)]
    Move { dx: f64, dy: f64 },
    /// Disable the motors (so you can slide the carriage by hand)
    Off,
    /// Enable the motors
    On,
    /// Lift the pen off the page
    Up {
        /// Servo level to lift to, overriding the default
        height: Option<f64>,
    },
    /// Set the current location as (0, 0)
    Zero,
}

fn load_config(path: &Option<PathBuf>) -> Result<DeviceConfig, DeviceError> {
    match path {
        Some(path) => DeviceConfig::load(path),
        None => Ok(DeviceConfig::default()),
    }
}

fn connect(
    port: &Option<String>,
    config: DeviceConfig,
) -> Result<Device<SerialTransport>, DeviceError> {
    match port {
        Some(port) => Device::open_port(port, config),
        None => Device::open_with(config),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let opts = Opts::parse();
    let config = load_config(&opts.config)?;

    match opts.command {
        Command::Calibrate {
            width,
            height,
            margin,
            speed,
        } => {
            let mut device = connect(&opts.port, config)?;
            if speed {
                device.calibrate_speed(width, height, margin)?;
            } else {
                device.calibrate_pen_lift(width, height, margin)?;
            }
            if let Some(path) = &opts.config {
                device.config().save(path)?;
                println!("Saved settings to {}", path.display());
            }
        }
        Command::Down { height } => {
            let mut config = config;
            if let Some(height) = height {
                config.pen_down_position = height;
            }
            connect(&opts.port, config)?.pen_down()?;
        }
        Command::Goto { x, y } => {
            connect(&opts.port, config)?.goto(x, y, true)?;
        }
        Command::Home => {
            connect(&opts.port, config)?.home()?;
        }
        Command::Move { dx, dy } => {
            connect(&opts.port, config)?.move_by(dx, dy)?;
        }
        Command::Off => {
            connect(&opts.port, config)?.disable_motors()?;
        }
        Command::On => {
            connect(&opts.port, config)?.enable_motors()?;
        }
        Command::Up { height } => {
            let mut config = config;
            if let Some(height) = height {
                config.pen_up_position = height;
            }
            connect(&opts.port, config)?.pen_up()?;
        }
        Command::Zero => {
            connect(&opts.port, config)?.zero()?;
        }
    }
    Ok(())
}
