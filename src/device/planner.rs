//! Constant-acceleration motion planning. A [`Planner`] turns a polyline
//! into a [`Plan`]: a sequence of acceleration blocks the firmware can be
//! stepped through at a fixed timeslice. Velocity ramps up and down over
//! each segment, slows into sharp corners, and carries straight through
//! shallow ones.

use geo_types::{coord, Coord, Point};

const EPS: f64 = 1e-9;

/// Where the pen is (and how fast it is moving) at one moment of a plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instant {
    pub t: f64,
    pub position: Point<f64>,
    pub velocity: f64,
}

/// One stretch of constant acceleration along a straight line.
#[derive(Debug, Clone, Copy)]
struct Block {
    acceleration: f64,
    duration: f64,
    entry_velocity: f64,
    start: Coord<f64>,
    unit: Coord<f64>,
}

impl Block {
    fn new(
        acceleration: f64,
        entry_velocity: f64,
        exit_velocity: f64,
        start: Coord<f64>,
        unit: Coord<f64>,
    ) -> Block {
        let duration = if acceleration.abs() < EPS {
            0.0
        } else {
            (exit_velocity - entry_velocity) / acceleration
        };
        Block {
            acceleration,
            duration,
            entry_velocity,
            start,
            unit,
        }
    }

    fn cruise(velocity: f64, distance: f64, start: Coord<f64>, unit: Coord<f64>) -> Block {
        Block {
            acceleration: 0.0,
            duration: if velocity.abs() < EPS {
                0.0
            } else {
                distance / velocity
            },
            entry_velocity: velocity,
            start,
            unit,
        }
    }

    fn distance(&self) -> f64 {
        self.entry_velocity * self.duration
            + 0.5 * self.acceleration * self.duration * self.duration
    }

    fn instant(&self, t: f64, dt: f64) -> Instant {
        let distance = self.entry_velocity * dt + 0.5 * self.acceleration * dt * dt;
        Instant {
            t,
            position: Point::new(
                self.start.x + self.unit.x * distance,
                self.start.y + self.unit.y * distance,
            ),
            velocity: self.entry_velocity + self.acceleration * dt,
        }
    }
}

struct Segment {
    start: Coord<f64>,
    unit: Coord<f64>,
    length: f64,
}

/// A fully planned motion: evaluate it at any time with [`Plan::instant`].
#[derive(Debug, Clone)]
pub struct Plan {
    blocks: Vec<Block>,
    /// Start time of each block, plus the total duration at the end.
    times: Vec<f64>,
    start: Coord<f64>,
}

impl Plan {
    fn new(blocks: Vec<Block>, start: Coord<f64>) -> Plan {
        let blocks: Vec<Block> = blocks
            .into_iter()
            .filter(|block| block.duration > EPS)
            .collect();
        let mut times = Vec::with_capacity(blocks.len() + 1);
        let mut t = 0.0;
        times.push(t);
        for block in &blocks {
            t += block.duration;
            times.push(t);
        }
        Plan {
            blocks,
            times,
            start,
        }
    }

    fn empty(start: Coord<f64>) -> Plan {
        Plan::new(vec![], start)
    }

    /// Total duration in seconds.
    pub fn duration(&self) -> f64 {
        *self.times.last().expect("times always has an entry")
    }

    /// Pen state at time `t`, clamped to the plan's duration.
    pub fn instant(&self, t: f64) -> Instant {
        if self.blocks.is_empty() {
            return Instant {
                t: 0.0,
                position: Point::from(self.start),
                velocity: 0.0,
            };
        }
        let t = t.clamp(0.0, self.duration());
        // partition_point finds the first start time beyond t.
        let index = self
            .times
            .partition_point(|start| *start <= t)
            .saturating_sub(1)
            .min(self.blocks.len() - 1);
        self.blocks[index].instant(t, t - self.times[index])
    }
}

/// Trapezoidal velocity planner with a corner-velocity model. Units are
/// whatever you feed it; the device layer uses inches and seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Planner {
    pub acceleration: f64,
    pub max_velocity: f64,
    pub corner_factor: f64,
}

impl Planner {
    pub fn new(acceleration: f64, max_velocity: f64, corner_factor: f64) -> Planner {
        Planner {
            acceleration,
            max_velocity,
            corner_factor,
        }
    }

    /// How fast the pen may carry through the corner between two unit
    /// vectors. Zero on a full reversal, `max_velocity` on a straight
    /// line, in between as the deviation allowance permits.
    fn corner_velocity(&self, u1: Coord<f64>, u2: Coord<f64>) -> f64 {
        let cosine = -(u1.x * u2.x + u1.y * u2.y);
        if (cosine - 1.0).abs() < EPS {
            return 0.0;
        }
        let sine = ((1.0 - cosine) / 2.0).sqrt();
        if (sine - 1.0).abs() < EPS {
            return self.max_velocity;
        }
        let velocity = ((self.acceleration * self.corner_factor * sine) / (1.0 - sine)).sqrt();
        velocity.min(self.max_velocity)
    }

    /// Plan a pen path through `points`, starting and ending at rest.
    pub fn plan(&self, points: &[Point<f64>]) -> Plan {
        let mut deduped: Vec<Coord<f64>> = vec![];
        for point in points {
            let coordinate = coord! {x: point.x(), y: point.y()};
            if deduped.last() != Some(&coordinate) {
                deduped.push(coordinate);
            }
        }
        let start = deduped
            .first()
            .copied()
            .unwrap_or(coord! {x: 0.0, y: 0.0});
        if deduped.len() < 2 {
            return Plan::empty(start);
        }

        let segments: Vec<Segment> = deduped
            .windows(2)
            .map(|pair| {
                let dx = pair[1].x - pair[0].x;
                let dy = pair[1].y - pair[0].y;
                let length = (dx * dx + dy * dy).sqrt();
                Segment {
                    start: pair[0],
                    unit: coord! {x: dx / length, y: dy / length},
                    length,
                }
            })
            .collect();

        // Upper bound on the velocity entering each junction.
        let mut entry_velocities = vec![0.0; segments.len() + 1];
        for i in 1..segments.len() {
            entry_velocities[i] = self.corner_velocity(segments[i - 1].unit, segments[i].unit);
        }

        let a = self.acceleration;
        let mut blocks: Vec<Vec<Block>> = vec![vec![]; segments.len()];
        let mut i = 0;
        while i < segments.len() {
            let segment = &segments[i];
            let s = segment.length;
            let vi = entry_velocities[i];
            let vf = entry_velocities[i + 1];

            // Peak of the accelerate-then-decelerate profile.
            let s1 = (2.0 * a * s + vf * vf - vi * vi) / (4.0 * a);
            let s2 = s - s1;

            if s1 < -EPS {
                // Entry velocity is too hot to brake down to vf in time;
                // lower it and replan the previous segment.
                entry_velocities[i] = (vf * vf + 2.0 * a * s).sqrt();
                i = i.saturating_sub(1);
                continue;
            }
            if s2 < -EPS {
                // Can't even reach vf by accelerating the whole way.
                let reachable = (vi * vi + 2.0 * a * s).sqrt();
                entry_velocities[i + 1] = reachable;
                blocks[i] = vec![Block::new(a, vi, reachable, segment.start, segment.unit)];
                i += 1;
                continue;
            }

            let peak = (vi * vi + 2.0 * a * s1.max(0.0)).sqrt();
            if peak <= self.max_velocity {
                // Triangle profile.
                let apex = coord! {
                    x: segment.start.x + segment.unit.x * s1,
                    y: segment.start.y + segment.unit.y * s1,
                };
                blocks[i] = vec![
                    Block::new(a, vi, peak, segment.start, segment.unit),
                    Block::new(-a, peak, vf, apex, segment.unit),
                ];
            } else {
                // Trapezoid: ramp to max, cruise, ramp down.
                let vmax = self.max_velocity;
                let s1 = (vmax * vmax - vi * vi) / (2.0 * a);
                let s3 = (vmax * vmax - vf * vf) / (2.0 * a);
                let s2 = s - s1 - s3;
                let p1 = coord! {
                    x: segment.start.x + segment.unit.x * s1,
                    y: segment.start.y + segment.unit.y * s1,
                };
                let p2 = coord! {
                    x: segment.start.x + segment.unit.x * (s1 + s2),
                    y: segment.start.y + segment.unit.y * (s1 + s2),
                };
                blocks[i] = vec![
                    Block::new(a, vi, vmax, segment.start, segment.unit),
                    Block::cruise(vmax, s2, p1, segment.unit),
                    Block::new(-a, vmax, vf, p2, segment.unit),
                ];
            }
            i += 1;
        }

        Plan::new(blocks.into_iter().flatten().collect(), start)
    }
}
