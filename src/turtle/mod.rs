use geo_types::{LineString, MultiLineString, Point};

/// Helper function to convert degrees to radians
pub fn degrees(deg: f64) -> f64 {
    std::f64::consts::PI * (deg / 180.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TurtleState {
    position: Point<f64>,
    heading: f64,
    pen: bool,
}

/// Logo-style turtle graphics that accumulate pen strokes. Angles are in
/// radians (use [`degrees`] to convert) with heading 0 pointing along
/// positive x; the pen starts down at the origin.
///
/// # Example
///
/// ```
/// use elkplot::turtle::{Turtle, degrees};
/// let square = Turtle::new()
///     .fwd(100.0)
///     .right(degrees(90.0))
///     .fwd(100.0)
///     .right(degrees(90.0))
///     .fwd(100.0)
///     .right(degrees(90.0))
///     .fwd(100.0)
///     .to_multiline();
/// assert_eq!(square.0.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Turtle {
    state: TurtleState,
    stack: Vec<TurtleState>,
    current: Vec<Point<f64>>,
    lines: Vec<LineString<f64>>,
}

impl Default for Turtle {
    fn default() -> Self {
        Turtle::new()
    }
}

impl Turtle {
    pub fn new() -> Turtle {
        Turtle::at(0.0, 0.0, 0.0)
    }

    /// Start the turtle somewhere other than the origin.
    pub fn at(x: f64, y: f64, heading: f64) -> Turtle {
        let position = Point::new(x, y);
        Turtle {
            state: TurtleState {
                position,
                heading,
                pen: true,
            },
            stack: vec![],
            current: vec![position],
            lines: vec![],
        }
    }

    pub fn position(&self) -> Point<f64> {
        self.state.position
    }

    pub fn heading(&self) -> f64 {
        self.state.heading
    }

    pub fn is_pen_down(&self) -> bool {
        self.state.pen
    }

    /// Move forward, drawing if the pen is down. Negative distances back up.
    pub fn fwd(self, distance: f64) -> Self {
        let (dx, dy) = (
            distance * self.state.heading.cos(),
            distance * self.state.heading.sin(),
        );
        let target = self.state.position + Point::new(dx, dy);
        self.goto(target.x(), target.y())
    }

    pub fn backward(self, distance: f64) -> Self {
        self.fwd(-distance)
    }

    /// Turn clockwise.
    pub fn right(mut self, angle: f64) -> Self {
        self.state.heading -= angle;
        self
    }

    /// Turn counterclockwise.
    pub fn left(mut self, angle: f64) -> Self {
        self.state.heading += angle;
        self
    }

    /// Spin in place to face an absolute direction.
    pub fn set_heading(mut self, angle: f64) -> Self {
        self.state.heading = angle;
        self
    }

    /// Go straight to a point, drawing if the pen is down.
    pub fn goto(mut self, x: f64, y: f64) -> Self {
        let target = Point::new(x, y);
        if self.state.pen {
            self.current.push(target);
        }
        self.state.position = target;
        self
    }

    pub fn pen_up(mut self) -> Self {
        self.flush_current();
        self.state.pen = false;
        self
    }

    pub fn pen_down(mut self) -> Self {
        self.current = vec![self.state.position];
        self.state.pen = true;
        self
    }

    /// Remember the current position, heading and pen state.
    pub fn push(mut self) -> Self {
        self.stack.push(self.state);
        self
    }

    /// Jump back to the most recently pushed state without drawing a line
    /// on the way. Popping an empty stack is a no-op.
    pub fn pop(mut self) -> Self {
        let Some(state) = self.stack.pop() else {
            return self;
        };
        self.flush_current();
        self.state = state;
        if self.state.pen {
            self.current = vec![self.state.position];
        }
        self
    }

    fn flush_current(&mut self) {
        if self.current.len() > 1 {
            self.lines
                .push(LineString::new(self.current.iter().map(|p| p.0).collect()));
        }
        self.current = vec![self.state.position];
    }

    /// Everything drawn so far as stroke geometry.
    pub fn to_multiline(mut self) -> MultiLineString<f64> {
        self.flush_current();
        MultiLineString::new(self.lines)
    }
}
