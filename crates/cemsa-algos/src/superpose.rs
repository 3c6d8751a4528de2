//! Iterative superposition with outlier rejection
//!
//! Kabsch fit over matched pairs, refitted after dropping pairs whose
//! post-fit distance exceeds `cutoff` times the current RMSD.

use crate::kabsch::{kabsch, KabschResult};
use crate::AlignError;

/// Fits at or below this RMSD (Å) are treated as exact; no pair is rejected
const EXACT_FIT_RMSD: f32 = 1e-3;

/// Parameters for iterative superposition
#[derive(Debug, Clone)]
pub struct SuperposeParams {
    /// Number of outlier rejection cycles (0 = single fit)
    pub cycles: u32,
    /// A pair is rejected when `distance / current_rmsd > cutoff`
    pub cutoff: f32,
}

impl Default for SuperposeParams {
    fn default() -> Self {
        Self {
            cycles: 5,
            cutoff: 2.0,
        }
    }
}

/// Result of iterative superposition
#[derive(Debug, Clone)]
pub struct SuperposeResult {
    /// Final fit (rotation + translation)
    pub transform: KabschResult,
    /// RMSD of the first fit over all pairs
    pub initial_rmsd: f32,
    /// RMSD of the final fit over the surviving pairs
    pub final_rmsd: f32,
    /// Number of rejection cycles performed
    pub cycles_performed: u32,
    /// Number of pairs rejected as outliers
    pub n_rejected: usize,
    /// Number of pairs in the final fit
    pub n_aligned: usize,
    /// Surviving (source, target) index pairs
    pub aligned_pairs: Vec<(usize, usize)>,
}

fn gather(
    source: &[[f32; 3]],
    target: &[[f32; 3]],
    pairs: &[(usize, usize)],
) -> Result<(Vec<[f32; 3]>, Vec<[f32; 3]>), AlignError> {
    let mut src = Vec::with_capacity(pairs.len());
    let mut tgt = Vec::with_capacity(pairs.len());
    for &(si, ti) in pairs {
        match (source.get(si), target.get(ti)) {
            (Some(s), Some(t)) => {
                src.push(*s);
                tgt.push(*t);
            }
            _ => return Err(AlignError::PairOutOfRange(si, ti)),
        }
    }
    Ok((src, tgt))
}

fn distance(a: [f32; 3], b: [f32; 3]) -> f32 {
    let (dx, dy, dz) = (a[0] - b[0], a[1] - b[1], a[2] - b[2]);
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Iterative superposition of `source_coords` onto `target_coords`.
///
/// `pairs` lists (source_index, target_index) correspondences. At most
/// `params.cycles` rejection rounds are run; the loop stops early once no
/// pair is rejected, or when fewer than three would survive (the previous
/// fit is then kept).
pub fn superpose(
    source_coords: &[[f32; 3]],
    target_coords: &[[f32; 3]],
    pairs: &[(usize, usize)],
    params: &SuperposeParams,
) -> Result<SuperposeResult, AlignError> {
    if pairs.is_empty() {
        return Err(AlignError::NoMatches);
    }
    if pairs.len() < 3 {
        return Err(AlignError::TooFewAtoms(pairs.len()));
    }

    let mut active: Vec<(usize, usize)> = pairs.to_vec();
    let (src, tgt) = gather(source_coords, target_coords, &active)?;
    let mut fit = kabsch(&src, &tgt, None)?;
    let initial_rmsd = fit.rmsd;
    let mut cycles_performed = 0;

    for _ in 0..params.cycles {
        cycles_performed += 1;
        if fit.rmsd <= EXACT_FIT_RMSD {
            break;
        }

        let (src, tgt) = gather(source_coords, target_coords, &active)?;
        let limit = params.cutoff * fit.rmsd;
        let kept: Vec<(usize, usize)> = active
            .iter()
            .zip(src.iter().zip(&tgt))
            .filter(|(_, (s, t))| distance(fit.apply(**s), **t) <= limit)
            .map(|(pair, _)| *pair)
            .collect();

        if kept.len() == active.len() {
            break;
        }
        if kept.is_empty() {
            return Err(AlignError::AllRejected);
        }
        if kept.len() < 3 {
            break;
        }

        active = kept;
        let (src, tgt) = gather(source_coords, target_coords, &active)?;
        fit = kabsch(&src, &tgt, None)?;
    }

    Ok(SuperposeResult {
        final_rmsd: fit.rmsd,
        transform: fit,
        initial_rmsd,
        cycles_performed,
        n_rejected: pairs.len() - active.len(),
        n_aligned: active.len(),
        aligned_pairs: active,
    })
}
