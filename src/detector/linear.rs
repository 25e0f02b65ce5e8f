/// Start/stop guard search for linear symbols along rows and columns
use super::candidate::{CandidateShape, FinderCandidate};
use crate::models::linear::{
    CODE128_PATTERNS, CODE128_START_A, CODE128_START_C, CODE128_STOP, EAN13_MODULES, EAN13_RUNS,
};
use crate::models::{BitMatrix, LinearFormat, Point, SymbolKind};
use crate::utils::runs::{Run, best_pattern, pattern_variance, runs_of};

/// Quiet zone required on both sides, in modules
const QUIET_MODULES: f32 = 5.0;
/// Clusters need this many agreeing scan lines
const MIN_CLUSTER_HITS: usize = 2;
/// Roughly this many lines are scanned per orientation
const LINES_PER_ORIENTATION: usize = 64;

const GUARD_VARIANCE: f32 = 0.48;
const CODE128_VARIANCE: f32 = 0.25;
const MAX_INDIVIDUAL_VARIANCE: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Rows,
    Columns,
}

/// Guard match on one scan line, in pixel offsets along the line
#[derive(Debug, Clone, Copy, PartialEq)]
struct LineHit {
    format: LinearFormat,
    line: usize,
    start: usize,
    end: usize,
    module_size: f32,
    /// Reading direction runs against the scan direction
    reversed: bool,
}

#[derive(Debug, Clone)]
struct Cluster {
    first: LineHit,
    last: LineHit,
    hits: usize,
    start_sum: f32,
    end_sum: f32,
    module_sum: f32,
}

/// Linear candidates found on rows (0/180 degrees) and columns (90/270 degrees)
pub fn find_linear(matrix: &BitMatrix) -> Vec<FinderCandidate> {
    let mut candidates = scan_orientation(matrix, Orientation::Rows);
    candidates.extend(scan_orientation(matrix, Orientation::Columns));
    candidates
}

fn scan_orientation(matrix: &BitMatrix, orientation: Orientation) -> Vec<FinderCandidate> {
    let lines = match orientation {
        Orientation::Rows => matrix.height(),
        Orientation::Columns => matrix.width(),
    };
    let step = (lines / LINES_PER_ORIENTATION).max(1);

    let mut pixels = Vec::new();
    let mut runs = Vec::new();
    let mut open: Vec<Cluster> = Vec::new();
    let mut closed: Vec<Cluster> = Vec::new();

    for line in (0..lines).step_by(step) {
        match orientation {
            Orientation::Rows => matrix.row_into(line, &mut pixels),
            Orientation::Columns => matrix.column_into(line, &mut pixels),
        }
        runs_of(&pixels, &mut runs);
        let hits = line_hits(&runs, line);

        // Clusters not continued on this line are finished
        let (continued, stale): (Vec<Cluster>, Vec<Cluster>) = open
            .into_iter()
            .partition(|c| line - c.last.line <= step);
        closed.extend(stale);
        open = continued;

        for hit in hits {
            match open.iter_mut().find(|c| c.accepts(&hit)) {
                Some(cluster) => cluster.push(hit),
                None => open.push(Cluster::new(hit)),
            }
        }
    }
    closed.extend(open);

    closed
        .into_iter()
        .filter(|c| c.hits >= MIN_CLUSTER_HITS)
        .map(|c| c.into_candidate(orientation, step))
        .collect()
}

/// All guard matches along one line of runs
fn line_hits(runs: &[Run], line: usize) -> Vec<LineHit> {
    let mut hits = Vec::new();
    let mut i = 1;
    while i < runs.len() {
        if !runs[i].black || runs[i - 1].black {
            i += 1;
            continue;
        }
        let hit = ean_at(runs, i, line).or_else(|| code128_at(runs, i, line));
        match hit {
            Some(h) => {
                hits.push(h);
                // Resume after the symbol
                i = runs.iter().position(|r| r.start >= h.end).unwrap_or(runs.len());
            }
            None => i += 1,
        }
    }
    hits
}

/// EAN-13 with its 59 runs starting at `runs[i]`
fn ean_at(runs: &[Run], i: usize, line: usize) -> Option<LineHit> {
    let symbol = runs.get(i..i + EAN13_RUNS)?;
    let start = symbol[0].start;
    let end = symbol[EAN13_RUNS - 1].end();
    let module = (end - start) as f32 / EAN13_MODULES as f32;
    if !quiet_before(runs, i, module) || !quiet_after(runs, i + EAN13_RUNS, module) {
        return None;
    }

    let widths: Vec<f32> = symbol.iter().map(|r| r.len as f32).collect();
    let guards = [(0..3, 3), (27..32, 5), (56..59, 3)];
    let guards_ok = guards.into_iter().all(|(range, n)| {
        pattern_variance(&widths[range], &[1u8; 5][..n], MAX_INDIVIDUAL_VARIANCE) <= GUARD_VARIANCE
    });
    guards_ok.then_some(LineHit {
        format: LinearFormat::Ean13,
        line,
        start,
        end,
        module_size: module,
        reversed: false,
    })
}

/// Code 128 whose start code (or reversed stop) begins at `runs[i]`
fn code128_at(runs: &[Run], i: usize, line: usize) -> Option<LineHit> {
    let widths = |from: usize, n: usize| -> Option<Vec<f32>> {
        runs.get(from..from + n)
            .map(|rs| rs.iter().map(|r| r.len as f32).collect())
    };

    let starts = &CODE128_PATTERNS[CODE128_START_A as usize..=CODE128_START_C as usize];
    let forward = widths(i, 6)
        .and_then(|w| best_pattern(&w, starts, MAX_INDIVIDUAL_VARIANCE))
        .is_some_and(|(_, v)| v <= CODE128_VARIANCE);
    let mut reversed_stop = CODE128_STOP;
    reversed_stop.reverse();
    let backward = !forward
        && widths(i, 7).is_some_and(|w| {
            pattern_variance(&w, &reversed_stop, MAX_INDIVIDUAL_VARIANCE) <= CODE128_VARIANCE
        });
    if !forward && !backward {
        return None;
    }

    let head_modules = if forward { 11.0 } else { 13.0 };
    let head_runs = if forward { 6 } else { 7 };
    let head_px: usize = runs[i..i + head_runs].iter().map(|r| r.len).sum();
    let module = head_px as f32 / head_modules;
    if !quiet_before(runs, i, module) {
        return None;
    }

    // The symbol ends at the first wide space
    let quiet = QUIET_MODULES * module;
    let stop = (i + 1..runs.len())
        .find(|&j| !runs[j].black && runs[j].len as f32 >= quiet)
        .unwrap_or(runs.len());
    let count = stop - i;
    if count < 19 || (count - 7) % 6 != 0 {
        return None;
    }

    let tail = if forward {
        widths(stop - 7, 7).is_some_and(|w| {
            pattern_variance(&w, &CODE128_STOP, MAX_INDIVIDUAL_VARIANCE) <= CODE128_VARIANCE
        })
    } else {
        widths(stop - 6, 6)
            .map(|mut w| {
                w.reverse();
                w
            })
            .and_then(|w| best_pattern(&w, starts, MAX_INDIVIDUAL_VARIANCE))
            .is_some_and(|(_, v)| v <= CODE128_VARIANCE)
    };
    tail.then_some(LineHit {
        format: LinearFormat::Code128,
        line,
        start: runs[i].start,
        end: runs[stop - 1].end(),
        module_size: module,
        reversed: backward,
    })
}

fn quiet_before(runs: &[Run], i: usize, module: f32) -> bool {
    i > 0 && !runs[i - 1].black && runs[i - 1].len as f32 >= QUIET_MODULES * module
}

fn quiet_after(runs: &[Run], i: usize, module: f32) -> bool {
    runs.get(i)
        .is_some_and(|r| !r.black && r.len as f32 >= QUIET_MODULES * module)
}

impl Cluster {
    fn new(hit: LineHit) -> Self {
        Self {
            first: hit,
            last: hit,
            hits: 1,
            start_sum: hit.start as f32,
            end_sum: hit.end as f32,
            module_sum: hit.module_size,
        }
    }

    /// Same symbology and direction with a matching span on the previous line
    fn accepts(&self, hit: &LineHit) -> bool {
        let slack = 2.0 * self.last.module_size + 1.0;
        self.last.line < hit.line
            && self.last.format == hit.format
            && self.last.reversed == hit.reversed
            && (self.last.start as f32 - hit.start as f32).abs() <= slack
            && (self.last.end as f32 - hit.end as f32).abs() <= slack
    }

    fn push(&mut self, hit: LineHit) {
        self.last = hit;
        self.hits += 1;
        self.start_sum += hit.start as f32;
        self.end_sum += hit.end as f32;
        self.module_sum += hit.module_size;
    }

    fn into_candidate(self, orientation: Orientation, step: usize) -> FinderCandidate {
        let n = self.hits as f32;
        let (from, to) = (self.start_sum / n, self.end_sum / n);
        let middle = (self.first.line + self.last.line) as f32 / 2.0 + 0.5;
        let at = |along: f32| match orientation {
            Orientation::Rows => Point::new(along, middle),
            Orientation::Columns => Point::new(middle, along),
        };
        let (start, end) = if self.first.reversed {
            (at(to), at(from))
        } else {
            (at(from), at(to))
        };
        FinderCandidate {
            kind: SymbolKind::Linear,
            shape: CandidateShape::Linear {
                start,
                end,
                thickness: (self.last.line - self.first.line + step) as f32,
                format: self.first.format,
            },
            module_size: self.module_sum / n,
            confidence: (n / 4.0).min(1.0),
        }
    }
}
