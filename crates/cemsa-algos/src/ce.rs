//! Combinatorial Extension (CE) structural alignment
//!
//! Residue correspondences are found from C-alpha geometry alone (Shindyalov
//! & Bourne, 1998). Fixed-length fragments of the two chains are compared by
//! their internal distance patterns; similar fragment pairs (AFPs) are then
//! chained into paths, and the path whose expanded residue pairs superpose
//! best wins. Sequence identity plays no part, so distant homologs and
//! renumbered or mutated chains align as long as the folds match.

use crate::kabsch::kabsch;
use crate::AlignError;

/// Upper bound on the number of candidate paths kept for the final fit
const MAX_KEPT: usize = 20;
const UNSCORED: f64 = 1e6;

/// Parameters of the CE search
#[derive(Debug, Clone, PartialEq)]
pub struct CeParams {
    /// Fragment length in residues
    pub window: usize,
    /// Largest gap tried between consecutive fragments of a path
    pub gap_max: usize,
    /// Fragment similarity cutoff in Å
    pub d0: f32,
    /// Path extension cutoff in Å
    pub d1: f32,
    /// Number of best paths kept for the final fit
    pub max_paths: usize,
}

impl Default for CeParams {
    fn default() -> Self {
        Self {
            window: 8,
            gap_max: 30,
            d0: 3.0,
            d1: 4.0,
            max_paths: MAX_KEPT,
        }
    }
}

/// Outcome of a CE search
#[derive(Debug, Clone)]
pub struct CeResult {
    /// (source_index, target_index) pairs into the input C-alpha arrays,
    /// ascending in both indices
    pub pairs: Vec<(usize, usize)>,
    /// RMSD of the pairs after a plain Kabsch fit
    pub rmsd: f32,
    /// Coverage-weighted quality score; higher is better
    pub z_score: f32,
}

impl CeResult {
    #[inline]
    pub fn n_aligned(&self) -> usize {
        self.pairs.len()
    }
}

/// Align two C-alpha traces with Combinatorial Extension.
///
/// The returned pairs are meant to be handed to [`crate::superpose`] for the
/// rigid-body fit. Both traces need at least `window` residues; a trace too
/// short to hold two fragments yields [`AlignError::NoMatches`].
pub fn ce_align(source_ca: &[[f32; 3]], target_ca: &[[f32; 3]], params: &CeParams) -> Result<CeResult, AlignError> {
    let w = params.window;
    if w < 3 {
        return Err(AlignError::InvalidWindow(w));
    }
    let shorter = source_ca.len().min(target_ca.len());
    if shorter < w {
        return Err(AlignError::TooFewAtoms(shorter));
    }

    let dm_a = DistanceMatrix::new(source_ca);
    let dm_b = DistanceMatrix::new(target_ca);
    let scores = FragmentScores::new(&dm_a, &dm_b, w);

    let paths = find_paths(&scores, &dm_a, &dm_b, params);
    let (pairs, rmsd) = best_path(source_ca, target_ca, &paths, w).ok_or(AlignError::NoMatches)?;
    if pairs.len() < 3 {
        return Err(AlignError::TooFewAtoms(pairs.len()));
    }

    let z_score = z_score(pairs.len(), rmsd, shorter);
    Ok(CeResult { pairs, rmsd, z_score })
}

/// Symmetric all-against-all C-alpha distances
struct DistanceMatrix {
    n: usize,
    data: Vec<f32>,
}

impl DistanceMatrix {
    fn new(coords: &[[f32; 3]]) -> Self {
        let n = coords.len();
        let mut data = vec![0.0f32; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (coords[i], coords[j]);
                let d = ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt();
                data[i * n + j] = d;
                data[j * n + i] = d;
            }
        }
        DistanceMatrix { n, data }
    }

    #[inline]
    fn len(&self) -> usize {
        self.n
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> f32 {
        self.data[i * self.n + j]
    }
}

#[inline]
fn gap(a: f32, b: f32) -> f64 {
    (a as f64 - b as f64).abs()
}

/// Mean distance-pattern difference for every fragment pair (i, j).
///
/// Distances between adjacent residues carry no information (CA-CA is
/// always ~3.8 Å) and are left out. Fragments running past a chain end have
/// no score.
struct FragmentScores {
    cols: usize,
    data: Vec<Option<f32>>,
}

impl FragmentScores {
    fn new(dm_a: &DistanceMatrix, dm_b: &DistanceMatrix, w: usize) -> Self {
        let (len_a, len_b) = (dm_a.len(), dm_b.len());
        let compared = ((w - 1) * (w - 2)) as f32 / 2.0;
        let mut data = vec![None; len_a * len_b];

        for i_a in 0..=(len_a - w) {
            for i_b in 0..=(len_b - w) {
                let mut sum = 0.0f32;
                for row in 0..(w - 2) {
                    for col in (row + 2)..w {
                        sum += (dm_a.get(i_a + row, i_a + col) - dm_b.get(i_b + row, i_b + col)).abs();
                    }
                }
                data[i_a * len_b + i_b] = Some(sum / compared);
            }
        }

        FragmentScores { cols: len_b, data }
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> Option<f32> {
        self.data[i * self.cols + j]
    }
}

/// Ring of the best paths seen, overwritten oldest first
struct PathRing {
    slots: Vec<Option<(Vec<(usize, usize)>, f64)>>,
    next: usize,
}

impl PathRing {
    fn new(size: usize) -> Self {
        PathRing {
            slots: vec![None; size.max(1)],
            next: 0,
        }
    }

    /// Store `path` if it beats the slot about to be overwritten
    fn offer(&mut self, path: &[(usize, usize)], score: f64) {
        let beats = match &self.slots[self.next] {
            None => !path.is_empty(),
            Some((held, held_score)) => {
                path.len() > held.len() || (path.len() == held.len() && score < *held_score)
            }
        };
        if beats {
            self.slots[self.next] = Some((path.to_vec(), score));
            self.next = (self.next + 1) % self.slots.len();
        }
    }

    fn into_paths(self) -> Vec<Vec<(usize, usize)>> {
        self.slots.into_iter().flatten().map(|(path, _)| path).collect()
    }
}

/// Mean distance mismatch between a candidate fragment (j_a, j_b) and every
/// fragment already on the path
fn extension_score(
    dm_a: &DistanceMatrix,
    dm_b: &DistanceMatrix,
    path: &[(usize, usize)],
    j_a: usize,
    j_b: usize,
    w: usize,
) -> f64 {
    let mut sum = 0.0f64;
    for &(p_a, p_b) in path {
        sum += gap(dm_a.get(p_a, j_a), dm_b.get(p_b, j_b));
        sum += gap(dm_a.get(p_a + w - 1, j_a + w - 1), dm_b.get(p_b + w - 1, j_b + w - 1));
        for k in 1..(w - 1) {
            sum += gap(dm_a.get(p_a + k, j_a + w - 1 - k), dm_b.get(p_b + k, j_b + w - 1 - k));
        }
    }
    sum / (w * path.len()) as f64
}

/// Grow AFP paths from every seed and keep the best few.
///
/// Each path is a list of fragment starts (source, target). A path is only
/// extended while its running score stays under `d1`; gaps alternate
/// between the two chains (0, +1 in B, +1 in A, +2 in B, ...).
fn find_paths(
    scores: &FragmentScores,
    dm_a: &DistanceMatrix,
    dm_b: &DistanceMatrix,
    params: &CeParams,
) -> Vec<Vec<(usize, usize)>> {
    let w = params.window;
    let (len_a, len_b) = (dm_a.len(), dm_b.len());
    let (last_a, last_b) = (len_a - w, len_b - w);
    let d0 = params.d0 as f64;
    let d1 = params.d1 as f64;
    let n_gaps = params.gap_max * 2 + 1;
    let shorter = len_a.min(len_b);
    let pair_weight = (w - 1) * (w - 2) / 2;

    let seed_score = |i: usize, j: usize| {
        scores
            .get(i, j)
            .map(|s| s as f64)
            .filter(|s| *s < d0)
    };

    // Accumulated weight of a path of k + 1 fragments
    let weights: Vec<f64> = (0..shorter)
        .map(|k| ((k + 1) * k * w / 2 + (k + 1) * pair_weight) as f64)
        .collect();

    let mut best: Vec<(usize, usize)> = Vec::new();
    let mut best_score = UNSCORED;
    let mut ring = PathRing::new(params.max_paths.min(MAX_KEPT));

    let mut path = vec![(0usize, 0usize); shorter];
    let mut gap_taken = vec![0usize; shorter];
    let mut running = vec![vec![UNSCORED; n_gaps]; shorter];

    for i_a in 0..len_a {
        // a seed this late cannot produce a longer path than the best one
        if best.len() > 1 && i_a + w * (best.len() - 1) > len_a {
            break;
        }

        for i_b in 0..len_b {
            let Some(seed) = seed_score(i_a, i_b) else {
                continue;
            };
            if best.len() > 1 && i_b + w * (best.len() - 1) > len_b {
                break;
            }

            path[0] = (i_a, i_b);
            gap_taken[0] = 0;
            let mut len = 1;
            for row in running.iter_mut() {
                row.fill(UNSCORED);
            }

            loop {
                let (prev_a, prev_b) = path[len - 1];
                let mut chosen: Option<(usize, f64, f64)> = None;

                for g in 0..n_gaps {
                    let shift = (g + 1) / 2;
                    let (j_a, j_b) = if (g + 1) % 2 == 0 {
                        (prev_a + w + shift, prev_b + w)
                    } else {
                        (prev_a + w, prev_b + w + shift)
                    };
                    if j_a > last_a || j_b > last_b {
                        continue;
                    }
                    let Some(local) = seed_score(j_a, j_b) else {
                        continue;
                    };

                    let score = extension_score(dm_a, dm_b, &path[..len], j_a, j_b, w);
                    if score >= d1 {
                        continue;
                    }
                    if chosen.map_or(true, |(_, best_gap, _)| score < best_gap) {
                        path[len] = (j_a, j_b);
                        running[len - 1][g] = score;
                        chosen = Some((g, score, local));
                    }
                }

                let Some((g, score, local)) = chosen else {
                    break;
                };

                let span = (w * len) as f64;
                let blended = (score * span + local * pair_weight as f64) / (span + pair_weight as f64);
                let previous = if len > 1 {
                    running[len - 2][gap_taken[len - 1]]
                } else {
                    seed
                };
                let total = (previous * weights[len - 1] + blended * (weights[len] - weights[len - 1])) / weights[len];

                if total > d1 {
                    break;
                }

                running[len - 1][g] = total;
                gap_taken[len] = g;
                len += 1;

                if len > best.len() || (len == best.len() && total < best_score) {
                    best = path[..len].to_vec();
                    best_score = total;
                }
            }

            ring.offer(&best, best_score);
        }
    }

    ring.into_paths()
}

/// Expand each path to residue pairs and return the one with the lowest
/// Kabsch RMSD; ties go to the longer alignment
fn best_path(
    source_ca: &[[f32; 3]],
    target_ca: &[[f32; 3]],
    paths: &[Vec<(usize, usize)>],
    w: usize,
) -> Option<(Vec<(usize, usize)>, f32)> {
    let mut best: Option<(Vec<(usize, usize)>, f32)> = None;

    for path in paths {
        let pairs: Vec<(usize, usize)> = path
            .iter()
            .flat_map(|&(a, b)| (0..w).map(move |k| (a + k, b + k)))
            .filter(|&(a, b)| a < source_ca.len() && b < target_ca.len())
            .collect();
        if pairs.len() < 3 {
            continue;
        }

        let src: Vec<[f32; 3]> = pairs.iter().map(|&(a, _)| source_ca[a]).collect();
        let tgt: Vec<[f32; 3]> = pairs.iter().map(|&(_, b)| target_ca[b]).collect();
        let Ok(fit) = kabsch(&src, &tgt, None) else {
            continue;
        };

        let better = match &best {
            None => true,
            Some((held, rmsd)) => fit.rmsd < *rmsd || (fit.rmsd == *rmsd && pairs.len() > held.len()),
        };
        if better {
            best = Some((pairs, fit.rmsd));
        }
    }

    best
}

fn z_score(n_aligned: usize, rmsd: f32, shorter: usize) -> f32 {
    let l_min = shorter as f32;
    if l_min < 1.0 || rmsd < 1e-6 {
        return n_aligned as f32;
    }
    let n = n_aligned as f32;
    let coverage = n / l_min;
    let d0 = (1.24 * (l_min - 15.0).max(1.0).cbrt() - 1.8).max(0.5);
    n * coverage / (1.0 + rmsd / d0)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helix-like trace with uneven radius, twist and rise, so no register
    /// shift maps it onto itself
    fn trace(n: usize) -> Vec<[f32; 3]> {
        (0..n)
            .map(|i| {
                let t = i as f32;
                let angle = t * 1.745 + 0.35 * (t * 0.9).sin();
                let radius = 2.3 + 0.5 * (t * 0.45).cos();
                [radius * angle.cos(), radius * angle.sin(), 1.5 * t + 0.3 * (t * 1.7).sin()]
            })
            .collect()
    }

    /// Rotation by 90° about Z plus a shift
    fn moved(coords: &[[f32; 3]]) -> Vec<[f32; 3]> {
        coords.iter().map(|p| [-p[1] + 11.0, p[0] - 6.0, p[2] + 25.0]).collect()
    }

    fn strand(n: usize) -> Vec<[f32; 3]> {
        (0..n)
            .map(|i| [3.3 * i as f32, if i % 2 == 0 { 0.5 } else { -0.5 }, 0.0])
            .collect()
    }

    #[test]
    fn test_distance_matrix_symmetric() {
        let coords = trace(6);
        let dm = DistanceMatrix::new(&coords);
        assert_eq!(dm.len(), 6);
        for i in 0..6 {
            assert_eq!(dm.get(i, i), 0.0);
            for j in 0..6 {
                assert!((dm.get(i, j) - dm.get(j, i)).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_fragment_scores() {
        let a = trace(15);
        let b = trace(20);
        let scores = FragmentScores::new(&DistanceMatrix::new(&a), &DistanceMatrix::new(&b), 8);

        assert!(scores.get(0, 0).unwrap().abs() < 1e-6);
        assert!(scores.get(5, 5).unwrap().abs() < 1e-6);
        assert!(scores.get(0, 3).unwrap() > 0.0);
        // fragment would run past the end of `a`
        assert_eq!(scores.get(14, 0), None);
        assert!(scores.get(7, 12).is_some());
        assert_eq!(scores.get(7, 13), None);
    }

    #[test]
    fn test_identical_traces() {
        let coords = trace(24);
        let result = ce_align(&coords, &coords, &CeParams::default()).unwrap();
        assert_eq!(result.pairs, (0..24).map(|i| (i, i)).collect::<Vec<_>>());
        assert!(result.rmsd < 1e-3, "RMSD should be ~0, got {}", result.rmsd);
        assert_eq!(result.n_aligned(), 24);
    }

    #[test]
    fn test_rigid_motion_does_not_change_pairs() {
        let source = trace(26);
        let target = moved(&source);
        let result = ce_align(&source, &target, &CeParams::default()).unwrap();
        assert!(result.n_aligned() >= 24, "expected ≥24 aligned, got {}", result.n_aligned());
        assert!(result.pairs.iter().all(|&(a, b)| a == b));
        assert!(result.rmsd < 1e-3);
    }

    #[test]
    fn test_offset_register_is_found() {
        let full = trace(32);
        let source: Vec<[f32; 3]> = full[4..28].to_vec();
        let result = ce_align(&source, &moved(&full), &CeParams::default()).unwrap();

        assert_eq!(result.pairs.first(), Some(&(0, 4)));
        assert!(result.pairs.iter().all(|&(a, b)| b == a + 4));
        assert!(result.rmsd < 1e-2);
    }

    #[test]
    fn test_dissimilar_folds_score_low() {
        match ce_align(&trace(24), &strand(24), &CeParams::default()) {
            Ok(result) => assert!(result.z_score < 5.0, "z-score should be low, got {}", result.z_score),
            Err(e) => assert!(matches!(e, AlignError::NoMatches | AlignError::TooFewAtoms(_))),
        }
    }

    #[test]
    fn test_input_errors() {
        let short = trace(5);
        assert!(matches!(
            ce_align(&short, &trace(20), &CeParams::default()),
            Err(AlignError::TooFewAtoms(5))
        ));

        let params = CeParams {
            window: 2,
            ..CeParams::default()
        };
        assert!(matches!(
            ce_align(&trace(20), &trace(20), &params),
            Err(AlignError::InvalidWindow(2))
        ));

        // room for a single fragment only
        let one_fragment = trace(10);
        assert!(matches!(
            ce_align(&one_fragment, &one_fragment, &CeParams::default()),
            Err(AlignError::NoMatches)
        ));
    }

    #[test]
    fn test_smaller_window() {
        let source = trace(20);
        let params = CeParams {
            window: 6,
            gap_max: 10,
            d0: 2.5,
            d1: 3.5,
            max_paths: 10,
        };
        let result = ce_align(&source, &moved(&source), &params).unwrap();
        assert_eq!(result.n_aligned(), 18);
    }

    #[test]
    fn test_path_ring_keeps_longer_paths() {
        let mut ring = PathRing::new(2);
        ring.offer(&[], UNSCORED);
        assert!(ring.slots.iter().all(Option::is_none));

        ring.offer(&[(0, 0), (8, 8)], 0.5);
        ring.offer(&[(0, 0), (8, 8)], 0.5);
        // both slots hold a two-fragment path; a worse one is refused
        ring.offer(&[(1, 1), (9, 9)], 0.9);
        ring.offer(&[(0, 0), (8, 8), (16, 16)], 0.7);
        let paths = ring.into_paths();
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().any(|p| p.len() == 3));
    }

    #[test]
    fn test_z_score() {
        assert!(z_score(50, 2.0, 100) > 0.0);
        assert_eq!(z_score(24, 0.0, 24), 24.0);
    }
}
