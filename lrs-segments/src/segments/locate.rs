//! Locate-between: cutting a measured polyline by a measure range.

use crate::domain::{MeasuredCoord, Polyline};

/// Extracts the part of each line that lies between two measures.
pub trait LocateBetween {
    /// One output per input line, in order; `None` where nothing of the
    /// line falls inside the range.
    fn execute_many(&self, lines: &[Polyline], from: f64, to: f64) -> Vec<Option<Polyline>>;
}

/// Linear interpolation along measures, path by path.
///
/// Every path of the input is clipped on its own to the runs whose measures
/// fall inside `[min(from, to), max(from, to)]`, with new vertices
/// interpolated where a segment crosses a bound. Paths are never joined: a
/// gap inside the range gives one output path per side of the gap. Runs
/// that collapse to a single location are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeasureInterpolator;

impl MeasureInterpolator {
    /// Clip a single line.
    pub fn locate(&self, line: &Polyline, from: f64, to: f64) -> Option<Polyline> {
        let (lo, hi) = if from <= to { (from, to) } else { (to, from) };

        let paths: Vec<Vec<MeasuredCoord>> = line
            .paths
            .iter()
            .flat_map(|path| clip_path(path, lo, hi))
            .collect();

        if paths.is_empty() {
            None
        } else {
            Some(Polyline::new(paths, line.spatial_reference))
        }
    }
}

impl LocateBetween for MeasureInterpolator {
    fn execute_many(&self, lines: &[Polyline], from: f64, to: f64) -> Vec<Option<Polyline>> {
        lines.iter().map(|line| self.locate(line, from, to)).collect()
    }
}

/// Fraction range `[t0, t1]` of segment `a -> b` whose measures are in
/// `[lo, hi]`, or `None` if the overlap is empty or a single point.
fn segment_overlap(a: &MeasuredCoord, b: &MeasuredCoord, lo: f64, hi: f64) -> Option<(f64, f64)> {
    let dm = b.m - a.m;

    if dm == 0.0 {
        return (lo..=hi).contains(&a.m).then_some((0.0, 1.0));
    }

    let ta = (lo - a.m) / dm;
    let tb = (hi - a.m) / dm;
    let t0 = ta.min(tb).max(0.0);
    let t1 = ta.max(tb).min(1.0);

    (t0 < t1).then_some((t0, t1))
}

fn clip_path(path: &[MeasuredCoord], lo: f64, hi: f64) -> Vec<Vec<MeasuredCoord>> {
    let mut runs = Vec::new();
    let mut current: Vec<MeasuredCoord> = Vec::new();
    // Whether `current` ends exactly at the previous segment's end vertex.
    let mut open = false;

    for pair in path.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);

        match segment_overlap(a, b, lo, hi) {
            Some((t0, t1)) => {
                let start = if t0 == 0.0 { *a } else { a.lerp(b, t0) };
                let end = if t1 == 1.0 { *b } else { a.lerp(b, t1) };

                if !(open && t0 == 0.0) {
                    flush(&mut runs, &mut current);
                    current.push(start);
                }
                current.push(end);
                open = t1 == 1.0;
            }
            None => {
                flush(&mut runs, &mut current);
                open = false;
            }
        }
    }
    flush(&mut runs, &mut current);

    runs
}

/// Move `current` into `runs` unless it covers no distance.
fn flush(runs: &mut Vec<Vec<MeasuredCoord>>, current: &mut Vec<MeasuredCoord>) {
    let run = std::mem::take(current);
    let Some(first) = run.first() else {
        return;
    };
    if run.iter().any(|c| c.xy() != first.xy()) {
        runs.push(run);
    }
}
