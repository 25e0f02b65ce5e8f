/// Grouping of finder centres into ordered top-left / top-right / bottom-left triples
use super::finder::FinderPattern;
use crate::models::Point;

/// Largest ratio between the module sizes of a triple
const MAX_SIZE_RATIO: f32 = 1.4;
/// Largest |cos| of the corner angle at the top-left centre
const MAX_CORNER_COS: f32 = 0.25;
/// Largest ratio between the two legs
const MAX_LEG_RATIO: f32 = 1.4;
/// Shortest leg in modules (version 1 has 14)
const MIN_LEG_MODULES: f32 = 10.0;

/// Three finder centres forming one symbol
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinderTriple {
    /// Corner centre, at the right angle
    pub top_left: FinderPattern,
    /// Centre reached clockwise from the top-left
    pub top_right: FinderPattern,
    /// Remaining centre
    pub bottom_left: FinderPattern,
    /// Estimated modules per side (`17 + 4 * version`)
    pub dimension: usize,
    /// Module size implied by the leg lengths
    pub module_size: f32,
    /// |cos| of the corner angle
    pub corner_cos: f32,
    /// Relative variance of the three module sizes
    variance: f32,
    /// Geometric misfit (corner angle plus leg imbalance)
    score: f32,
}

impl FinderTriple {
    /// Detection confidence in [0, 1] from angle and size agreement
    pub fn confidence(&self) -> f32 {
        let sizes = [
            self.top_left.module_size,
            self.top_right.module_size,
            self.bottom_left.module_size,
        ];
        let min = sizes.iter().copied().fold(f32::INFINITY, f32::min);
        let max = sizes.iter().copied().fold(0.0f32, f32::max);
        let angle = 1.0 - 0.5 * self.corner_cos / MAX_CORNER_COS;
        (angle * min / max).clamp(0.0, 1.0)
    }

    /// Member patterns in top-left, top-right, bottom-left order
    fn members(&self) -> [FinderPattern; 3] {
        [self.top_left, self.top_right, self.bottom_left]
    }
}

/// Consistent, disjoint triples from the first `max_centres` patterns
///
/// Triples are ranked by module-size variance, ties broken by geometry, and
/// picked greedily so no centre is used twice. `measure` gives the module
/// size of a pattern along the line towards a point; the dimension is
/// estimated from those leg-aligned sizes so it holds at any rotation.
pub fn group_triples<M>(
    patterns: &[FinderPattern],
    max_centres: usize,
    measure: M,
) -> Vec<FinderTriple>
where
    M: Fn(&FinderPattern, Point) -> Option<f32>,
{
    let patterns = &patterns[..patterns.len().min(max_centres)];
    if patterns.len() < 3 {
        return Vec::new();
    }

    let mut triples: Vec<([usize; 3], FinderTriple)> = Vec::new();
    for i in 0..patterns.len() {
        for j in (i + 1)..patterns.len() {
            for k in (j + 1)..patterns.len() {
                if let Some(t) = order_triple(&patterns[i], &patterns[j], &patterns[k], &measure) {
                    triples.push(([i, j, k], t));
                }
            }
        }
    }

    triples.sort_by(|(_, a), (_, b)| {
        let qa = (a.variance / 1e-3).round() as i64;
        let qb = (b.variance / 1e-3).round() as i64;
        qa.cmp(&qb).then(a.score.total_cmp(&b.score))
    });

    let mut used = vec![false; patterns.len()];
    let mut selected = Vec::new();
    for (members, triple) in triples {
        if members.iter().any(|&m| used[m]) {
            continue;
        }
        for m in members {
            used[m] = true;
        }
        log::trace!(
            "triple {:?} dim {} cos {:.3}",
            triple.members().map(|p| (p.center.x as i32, p.center.y as i32)),
            triple.dimension,
            triple.corner_cos
        );
        selected.push(triple);
    }
    selected
}

/// Order three centres as (top-left, top-right, bottom-left) if they fit one symbol
fn order_triple<M>(
    a: &FinderPattern,
    b: &FinderPattern,
    c: &FinderPattern,
    measure: &M,
) -> Option<FinderTriple>
where
    M: Fn(&FinderPattern, Point) -> Option<f32>,
{
    let patterns = [a, b, c];
    let sizes = patterns.map(|p| p.module_size);
    let min_size = sizes.iter().copied().fold(f32::INFINITY, f32::min);
    let max_size = sizes.iter().copied().fold(0.0f32, f32::max);
    if min_size <= 0.0 || max_size / min_size > MAX_SIZE_RATIO {
        return None;
    }

    // Find the right-angle corner (top-left)
    let mut best_idx = 0usize;
    let mut best_cos = f32::INFINITY;
    for i in 0..3 {
        let p = &patterns[i].center;
        let p1 = &patterns[(i + 1) % 3].center;
        let p2 = &patterns[(i + 2) % 3].center;
        let (v1x, v1y) = (p1.x - p.x, p1.y - p.y);
        let (v2x, v2y) = (p2.x - p.x, p2.y - p.y);
        let denom = (v1x * v1x + v1y * v1y).sqrt() * (v2x * v2x + v2y * v2y).sqrt();
        if denom == 0.0 {
            continue;
        }
        let cos = ((v1x * v2x + v1y * v2y) / denom).abs();
        if cos < best_cos {
            best_cos = cos;
            best_idx = i;
        }
    }
    if best_cos > MAX_CORNER_COS {
        return None;
    }

    let tl = *patterns[best_idx];
    let p1 = *patterns[(best_idx + 1) % 3];
    let p2 = *patterns[(best_idx + 2) % 3];
    let (tr, bl) = if tl.center.cross(&p1.center, &p2.center) > 0.0 {
        (p1, p2)
    } else {
        (p2, p1)
    };

    let d_tr = tl.center.distance(&tr.center);
    let d_bl = tl.center.distance(&bl.center);
    if d_tr.max(d_bl) / d_tr.min(d_bl) > MAX_LEG_RATIO {
        return None;
    }

    let avg_module = sizes.iter().sum::<f32>() / 3.0;
    let leg_module = leg_module_size(&tl, &tr, &bl, avg_module, measure);
    let legs = (d_tr + d_bl) / 2.0;
    if legs < MIN_LEG_MODULES * leg_module {
        return None;
    }
    let raw_dimension = legs / leg_module + 7.0;
    let version = ((raw_dimension - 17.0) / 4.0).round();
    if !(1.0..=40.0).contains(&version) {
        return None;
    }
    let dimension = 17 + 4 * version as usize;

    let variance = sizes.iter().map(|s| (s - avg_module).powi(2)).sum::<f32>()
        / 3.0
        / (avg_module * avg_module);
    let leg_ratio = d_tr.max(d_bl) / d_tr.min(d_bl);

    Some(FinderTriple {
        top_left: tl,
        top_right: tr,
        bottom_left: bl,
        dimension,
        module_size: legs / (dimension as f32 - 7.0),
        corner_cos: best_cos,
        variance,
        score: best_cos + (leg_ratio - 1.0),
    })
}

/// Mean module size measured along both legs, from each end
///
/// Measurements far from the axis-measured `fallback` are noise; with none
/// left the fallback is used.
fn leg_module_size<M>(
    tl: &FinderPattern,
    tr: &FinderPattern,
    bl: &FinderPattern,
    fallback: f32,
    measure: &M,
) -> f32
where
    M: Fn(&FinderPattern, Point) -> Option<f32>,
{
    let samples = [
        measure(tl, tr.center),
        measure(tr, tl.center),
        measure(tl, bl.center),
        measure(bl, tl.center),
    ];
    let (sum, count) = samples
        .into_iter()
        .flatten()
        .filter(|s| (0.5 * fallback..=1.25 * fallback).contains(s))
        .fold((0.0f32, 0usize), |(sum, n), s| (sum + s, n + 1));
    if count == 0 {
        fallback
    } else {
        sum / count as f32
    }
}
