//! Kabsch algorithm for optimal rigid-body superposition
//!
//! Given two sets of corresponding points, finds the proper rotation and the
//! translation that minimise the RMSD between them. Sums are accumulated in
//! f64; results are handed back in the f32 types used for coordinates.

use lin_alg::f32::{Mat4, Vec3};

use crate::linalg::{determinant, mat_mul, svd3, transpose, Mat3};
use crate::AlignError;

/// Result of Kabsch superposition
#[derive(Debug, Clone)]
pub struct KabschResult {
    /// 3×3 rotation in the upper-left of a row-major Mat4 (`data[row * 4 + col]`)
    pub rotation: Mat4,
    /// Translation applied after rotation
    pub translation: Vec3,
    /// RMSD of the fitted pairs after superposition
    pub rmsd: f32,
    /// Number of point pairs used
    pub n_atoms: usize,
}

impl KabschResult {
    /// Rotation and translation as one row-major 4×4 matrix, translation in
    /// the last column
    pub fn to_mat4(&self) -> Mat4 {
        let r = &self.rotation.data;
        let t = &self.translation;
        Mat4::new([
            r[0], r[1], r[2], t.x,
            r[4], r[5], r[6], t.y,
            r[8], r[9], r[10], t.z,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Map a single point from source to target frame
    pub fn apply(&self, p: [f32; 3]) -> [f32; 3] {
        let r = &self.rotation.data;
        let t = &self.translation;
        [
            r[0] * p[0] + r[1] * p[1] + r[2] * p[2] + t.x,
            r[4] * p[0] + r[5] * p[1] + r[6] * p[2] + t.y,
            r[8] * p[0] + r[9] * p[1] + r[10] * p[2] + t.z,
        ]
    }
}

fn weighted_centroid(points: &[[f32; 3]], weight: &impl Fn(usize) -> f64, total: f64) -> [f64; 3] {
    let mut c = [0.0f64; 3];
    for (i, p) in points.iter().enumerate() {
        let w = weight(i);
        for k in 0..3 {
            c[k] += w * p[k] as f64;
        }
    }
    c.map(|v| v / total)
}

/// Compute the optimal superposition of `source` onto `target`.
///
/// Returns the transform mapping source → target. Both slices must have the
/// same length (at least 3); `weights`, when given, must match too and have a
/// positive sum. A reflection is never returned: when the best orthogonal fit
/// is improper the smallest principal axis is flipped.
pub fn kabsch(
    source: &[[f32; 3]],
    target: &[[f32; 3]],
    weights: Option<&[f32]>,
) -> Result<KabschResult, AlignError> {
    let n = source.len();
    if n != target.len() {
        return Err(AlignError::LengthMismatch(n, target.len()));
    }
    if let Some(w) = weights {
        if w.len() != n {
            return Err(AlignError::LengthMismatch(n, w.len()));
        }
    }
    if n < 3 {
        return Err(AlignError::TooFewAtoms(n));
    }

    let weight = |i: usize| weights.map_or(1.0, |w| w[i] as f64);
    let total: f64 = (0..n).map(&weight).sum();
    if total.is_nan() || total <= 0.0 {
        return Err(AlignError::InvalidWeights);
    }

    let cs = weighted_centroid(source, &weight, total);
    let ct = weighted_centroid(target, &weight, total);

    // Cross-covariance H = Σ w · (p - cs)(q - ct)ᵀ
    let mut h: Mat3 = [[0.0; 3]; 3];
    for i in 0..n {
        let w = weight(i);
        let p = [0, 1, 2].map(|k| source[i][k] as f64 - cs[k]);
        let q = [0, 1, 2].map(|k| target[i][k] as f64 - ct[k]);
        for (j, row) in h.iter_mut().enumerate() {
            for (k, cell) in row.iter_mut().enumerate() {
                *cell += w * p[j] * q[k];
            }
        }
    }

    // R = V · diag(1, 1, d) · Uᵀ with d = sign(det(V · Uᵀ))
    let svd = svd3(&h);
    let d = if determinant(&svd.u) * determinant(&svd.v) < 0.0 { -1.0 } else { 1.0 };
    let mut v = svd.v;
    for row in v.iter_mut() {
        row[2] *= d;
    }
    let rot = mat_mul(&v, &transpose(&svd.u));

    let t = [0, 1, 2].map(|r| ct[r] - (rot[r][0] * cs[0] + rot[r][1] * cs[1] + rot[r][2] * cs[2]));

    let mut sum_sq = 0.0f64;
    for i in 0..n {
        let s = source[i].map(|x| x as f64);
        for r in 0..3 {
            let moved = rot[r][0] * s[0] + rot[r][1] * s[1] + rot[r][2] * s[2] + t[r];
            let diff = moved - target[i][r] as f64;
            sum_sq += weight(i) * diff * diff;
        }
    }
    let rmsd = (sum_sq / total).max(0.0).sqrt() as f32;

    let r = rot.map(|row| row.map(|x| x as f32));
    let rotation = Mat4::new([
        r[0][0], r[0][1], r[0][2], 0.0,
        r[1][0], r[1][1], r[1][2], 0.0,
        r[2][0], r[2][1], r[2][2], 0.0,
        0.0, 0.0, 0.0, 1.0,
    ]);

    Ok(KabschResult {
        rotation,
        translation: Vec3::new(t[0] as f32, t[1] as f32, t[2] as f32),
        rmsd,
        n_atoms: n,
    })
}
