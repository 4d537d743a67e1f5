//! Plot-order optimization. The pen spends a surprising amount of time
//! traveling in the air between paths; these passes cut that down by
//! reordering, joining, and relooping paths before they go to the device.
//!
//! ```rust
//! use elkplot::prelude::*;
//! use geo_types::{MultiLineString, LineString, coord};
//!
//! let lines = MultiLineString::new(vec![
//!     LineString::new(vec![coord! {x: 5.0, y: 0.0}, coord! {x: 0.0, y: 0.0}]),
//!     LineString::new(vec![coord! {x: 5.0, y: 5.0}, coord! {x: 5.0, y: 0.0}]),
//! ]);
//! let sorted = Optimizer::default().tolerance(0.01).optimize(&lines);
//! ```

use std::collections::HashMap;

use geo_types::{Coord, LineString, MultiLineString};
use indicatif::ProgressBar;
use log::info;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::geo_types::{metrics_lines, path_length};

/// One endpoint of a line, as stored in the spatial index. Every line gets
/// two of these, one per endpoint, so the greedy pass can pick up a line
/// from either end; `fwd` records whether entering at this endpoint walks
/// the line in its stored direction.
#[derive(Clone, Debug, PartialEq)]
pub struct EndpointRef {
    line_id: usize,
    point: Coord<f64>,
    fwd: bool,
}

impl RTreeObject for EndpointRef {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.point.x, self.point.y])
    }
}

impl PointDistance for EndpointRef {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let d_x = self.point.x - point[0];
        let d_y = self.point.y - point[1];
        // We must return the squared distance!
        d_x * d_x + d_y * d_y
    }
}

/// Spatial index over the endpoints of a set of lines. Removal is lazy:
/// popping a line only deletes it from the id map, and stale tree entries
/// are skipped during queries.
struct LineIndex {
    lines: HashMap<usize, LineString<f64>>,
    tree: RTree<EndpointRef>,
}

impl LineIndex {
    fn new(mls: &MultiLineString<f64>) -> LineIndex {
        let mut lines: HashMap<usize, LineString<f64>> = HashMap::new();
        let mut endpoints: Vec<EndpointRef> = vec![];
        for (i, line) in mls.0.iter().enumerate() {
            // Only index lines that are valid (2+ points)
            if line.0.len() < 2 {
                continue;
            }
            lines.insert(i, line.clone());
            endpoints.push(EndpointRef {
                line_id: i,
                point: *line.0.first().expect("bounds checked above"),
                fwd: true,
            });
            endpoints.push(EndpointRef {
                line_id: i,
                point: *line.0.last().expect("bounds checked above"),
                fwd: false,
            });
        }
        LineIndex {
            lines,
            tree: RTree::bulk_load(endpoints),
        }
    }

    fn len(&self) -> usize {
        self.lines.len()
    }

    fn nearest(&self, point: &[f64; 2]) -> Option<(usize, bool)> {
        self.tree
            .nearest_neighbor_iter(point)
            .find(|endpoint| self.lines.contains_key(&endpoint.line_id))
            .map(|endpoint| (endpoint.line_id, endpoint.fwd))
    }

    fn nearest_within(&self, point: &[f64; 2], tolerance: f64) -> Option<(usize, bool)> {
        self.tree
            .nearest_neighbor_iter_with_distance_2(point)
            .take_while(|(_, distance_2)| *distance_2 <= tolerance * tolerance)
            .map(|(endpoint, _)| endpoint)
            .find(|endpoint| self.lines.contains_key(&endpoint.line_id))
            .map(|endpoint| (endpoint.line_id, endpoint.fwd))
    }

    /// Pull a line out of the index, reversed when it was entered at its
    /// tail endpoint.
    fn pop(&mut self, line_id: usize, fwd: bool) -> Option<LineString<f64>> {
        let mut line = self.lines.remove(&line_id)?;
        if !fwd {
            line.0.reverse();
        }
        Some(line)
    }
}

fn progress_bar(len: u64, enabled: bool) -> ProgressBar {
    if enabled {
        ProgressBar::new(len)
    } else {
        ProgressBar::hidden()
    }
}

/// Greedily reorder paths to shrink pen-up travel. The pen starts at the
/// origin; each step draws whichever remaining path has the nearest
/// endpoint, reversing it when the near endpoint is its tail.
pub fn sort_paths(mls: &MultiLineString<f64>, progress: bool) -> MultiLineString<f64> {
    let mut index = LineIndex::new(mls);
    let bar = progress_bar(index.len() as u64, progress);
    let mut position = [0.0, 0.0];
    let mut lines_out: Vec<LineString<f64>> = vec![];
    while let Some((line_id, fwd)) = index.nearest(&position) {
        let line = index
            .pop(line_id, fwd)
            .expect("nearest only returns live ids");
        let last = line.0.last().expect("indexed lines have 2+ points");
        position = [last.x, last.y];
        lines_out.push(line);
        bar.inc(1);
    }
    bar.finish_and_clear();
    MultiLineString::new(lines_out)
}

/// Weld paths whose facing endpoints are at most `tolerance` apart into
/// single pen-down strokes.
pub fn join_paths(
    mls: &MultiLineString<f64>,
    tolerance: f64,
    progress: bool,
) -> MultiLineString<f64> {
    let mut index = LineIndex::new(mls);
    let bar = progress_bar(index.len() as u64, progress);
    let mut position = [0.0, 0.0];
    let mut lines_out: Vec<LineString<f64>> = vec![];
    while let Some((line_id, fwd)) = index.nearest(&position) {
        let mut current = index
            .pop(line_id, fwd)
            .expect("nearest only returns live ids");
        bar.inc(1);
        loop {
            let tail = *current.0.last().expect("indexed lines have 2+ points");
            let hit = match index.nearest_within(&[tail.x, tail.y], tolerance) {
                Some(hit) => Some(hit),
                None => {
                    // Nothing near the tail; try the head, flipping the
                    // path so welding can continue from the other end.
                    let head = current.0[0];
                    let hit = index.nearest_within(&[head.x, head.y], tolerance);
                    if hit.is_some() {
                        current.0.reverse();
                    }
                    hit
                }
            };
            let Some((next_id, next_fwd)) = hit else {
                break;
            };
            let next = index
                .pop(next_id, next_fwd)
                .expect("nearest only returns live ids");
            bar.inc(1);
            let mut coords = next.0;
            if coords.first() == current.0.last() {
                coords.remove(0);
            }
            current.0.append(&mut coords);
        }
        let last = current.0.last().expect("welded lines have 2+ points");
        position = [last.x, last.y];
        lines_out.push(current);
    }
    bar.finish_and_clear();
    MultiLineString::new(lines_out)
}

/// Randomize the starting vertex of every closed path. Pen-down/pen-up
/// transitions leave little ink blobs; scattering them around the loop
/// beats piling them all up at one corner.
pub fn reloop_paths<R: Rng>(mls: &MultiLineString<f64>, rng: &mut R) -> MultiLineString<f64> {
    let lines_out = mls
        .0
        .iter()
        .map(|line| {
            let closed = line.0.len() > 3 && line.0.first() == line.0.last();
            if !closed {
                return line.clone();
            }
            // Drop the duplicate closing vertex, rotate, then re-close.
            let open = &line.0[..line.0.len() - 1];
            let k = rng.gen_range(0..open.len());
            let mut coords: Vec<Coord<f64>> = Vec::with_capacity(line.0.len());
            coords.extend_from_slice(&open[k..]);
            coords.extend_from_slice(&open[..k]);
            coords.push(open[k]);
            LineString::new(coords)
        })
        .collect();
    MultiLineString::new(lines_out)
}

/// Drop paths shorter than `min_length`. Useful after joining, when the
/// leftovers are specks too small to see but still cost two pen lifts.
pub fn delete_short_paths(mls: &MultiLineString<f64>, min_length: f64) -> MultiLineString<f64> {
    MultiLineString::new(
        mls.0
            .iter()
            .filter(|line| path_length(line) >= min_length)
            .cloned()
            .collect(),
    )
}

/// Configurable optimization pipeline. By default every pass is on with a
/// [`tolerance`](Optimizer::tolerance) of zero, which still welds paths
/// whose ends touch exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct Optimizer {
    tolerance: f64,
    sort: bool,
    join: bool,
    reloop: bool,
    delete_small: bool,
    progress: bool,
}

impl Default for Optimizer {
    fn default() -> Self {
        Optimizer {
            tolerance: 0.0,
            sort: true,
            join: true,
            reloop: true,
            delete_small: true,
            progress: false,
        }
    }
}

impl Optimizer {
    /// Endpoint distance below which paths get welded, and path length
    /// below which they get deleted.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn sort(mut self, enabled: bool) -> Self {
        self.sort = enabled;
        self
    }

    pub fn join(mut self, enabled: bool) -> Self {
        self.join = enabled;
        self
    }

    pub fn reloop(mut self, enabled: bool) -> Self {
        self.reloop = enabled;
        self
    }

    pub fn delete_small(mut self, enabled: bool) -> Self {
        self.delete_small = enabled;
        self
    }

    /// Show progress bars for the slow passes.
    pub fn progress(mut self, enabled: bool) -> Self {
        self.progress = enabled;
        self
    }

    /// Run the enabled passes in order: reloop, join, delete, sort.
    pub fn optimize(&self, mls: &MultiLineString<f64>) -> MultiLineString<f64> {
        let before = metrics_lines(mls);
        let mut lines = mls.clone();
        if self.reloop {
            let mut rng = SmallRng::from_entropy();
            lines = reloop_paths(&lines, &mut rng);
        }
        // Even at zero tolerance joining still welds exactly-touching ends.
        if self.join {
            lines = join_paths(&lines, self.tolerance, self.progress);
        }
        if self.delete_small {
            lines = delete_short_paths(&lines, self.tolerance);
        }
        if self.sort {
            lines = sort_paths(&lines, self.progress);
        }
        let after = metrics_lines(&lines);
        info!("optimized [{}] into [{}]", before, after);
        lines
    }
}
