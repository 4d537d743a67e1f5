//! Interactive pen calibration. Run these with a scrap sheet loaded; the
//! adjusted settings live on [`Device::config`] afterwards, ready to be
//! saved with [`DeviceConfig::save`](super::DeviceConfig::save).

use std::io::{self, BufRead, Write};

use super::{Device, DeviceError, Transport};

impl<T: Transport> Device<T> {
    /// Dial in the pen up/down servo levels by eye. The pen visits
    /// opposite corners of the page so both extremes of the gantry get
    /// checked with the same numbers.
    pub fn calibrate_pen_lift(
        &mut self,
        width: f64,
        height: f64,
        margin: f64,
    ) -> Result<(), DeviceError> {
        self.enable_motors()?;
        let corners = [(margin, margin), (width - margin, height - margin)];
        for (x, y) in corners {
            self.goto(x, y, true)?;
            println!("Calibrating pen up position");
            loop {
                self.pen_up()?;
                let prompt = format!(
                    "New up position, blank to continue. Current={} ",
                    self.config.pen_up_position
                );
                let Some(value) = read_number(&prompt)? else {
                    break;
                };
                self.config.pen_up_position = value;
                self.configure()?;
            }
            self.pen_up()?;
            println!("Calibrating pen down position");
            loop {
                self.pen_down()?;
                let prompt = format!(
                    "New down position, blank to continue. Current={} ",
                    self.config.pen_down_position
                );
                let Some(value) = read_number(&prompt)? else {
                    break;
                };
                self.config.pen_down_position = value;
                self.configure()?;
            }
            self.pen_up()?;
        }
        self.home()?;
        self.disable_motors()
    }

    /// Dial in the top drawing speed by ruling a test line across the
    /// page at each candidate speed.
    pub fn calibrate_speed(
        &mut self,
        width: f64,
        height: f64,
        margin: f64,
    ) -> Result<(), DeviceError> {
        self.enable_motors()?;
        let offset = (height - 2.0 * margin) / 50.0;
        let mut y = margin;
        while y < height - margin {
            self.pen_up()?;
            self.goto(margin, y, true)?;
            self.pen_down()?;
            self.goto(width - margin, y, false)?;
            self.pen_up()?;
            let prompt = format!(
                "New speed, blank to finish. Current={} ",
                self.config.max_velocity
            );
            let Some(value) = read_number(&prompt)? else {
                break;
            };
            self.config.max_velocity = value;
            y += offset;
        }
        self.home()?;
        self.disable_motors()
    }
}

fn read_number(prompt: &str) -> Result<Option<f64>, DeviceError> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(trimmed.parse()?))
}
