//! Analytical 3×3 SVD
//!
//! Computes A = U · diag(S) · Vᵀ by Jacobi eigen-decomposition of the
//! symmetric matrix AᵀA. Everything is f64 and row-major: `m[row][col]`.

/// Row-major 3×3 matrix
pub type Mat3 = [[f64; 3]; 3];

const IDENTITY: Mat3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Singular values below this (absolute, or relative to the largest) are
/// treated as zero
const SINGULAR_EPS: f64 = 1e-10;
const RELATIVE_EPS: f64 = 1e-6;

/// Result of a 3×3 SVD: A = U · diag(S) · Vᵀ
#[derive(Debug, Clone)]
pub struct Svd3 {
    /// Left singular vectors (columns)
    pub u: Mat3,
    /// Singular values, descending and non-negative
    pub s: [f64; 3],
    /// Right singular vectors (columns), right-handed
    pub v: Mat3,
}

/// Compute the SVD of a 3×3 matrix.
///
/// V is always a proper rotation (det = +1). U carries the sign of det(A), so
/// for a matrix with negative determinant U is a rotation-reflection.
pub fn svd3(a: &Mat3) -> Svd3 {
    let (eigenvalues, eigenvectors) = jacobi_eigen(&mul_transpose_left(a, a));

    // Sort eigenpairs by descending eigenvalue
    let mut order = [0usize, 1, 2];
    order.sort_by(|&i, &j| eigenvalues[j].total_cmp(&eigenvalues[i]));

    let s = order.map(|k| eigenvalues[k].max(0.0).sqrt());
    let mut v_cols = order.map(|k| column(&eigenvectors, k));
    if triple_product(&v_cols) < 0.0 {
        v_cols[2] = scale(&v_cols[2], -1.0);
    }

    // u_i = A · v_i / s_i where defined; fill the rest by orthogonal completion
    let mut u_cols = [[0.0f64; 3]; 3];
    let threshold = SINGULAR_EPS.max(s[0] * RELATIVE_EPS);
    let rank = s.iter().filter(|&&sv| sv > threshold).count();
    for i in 0..rank {
        u_cols[i] = scale(&mat_vec(a, &v_cols[i]), 1.0 / s[i]);
    }
    match rank {
        0 => u_cols = IDENTITY,
        1 => {
            u_cols[1] = any_perpendicular(&u_cols[0]);
            u_cols[2] = normalized(&cross(&u_cols[0], &u_cols[1]));
        }
        2 => u_cols[2] = normalized(&cross(&u_cols[0], &u_cols[1])),
        _ => {}
    }

    Svd3 {
        u: from_columns(&u_cols),
        s,
        v: from_columns(&v_cols),
    }
}

/// Matrix product A · B
pub fn mat_mul(a: &Mat3, b: &Mat3) -> Mat3 {
    let mut out = [[0.0; 3]; 3];
    for (r, row) in out.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| a[r][k] * b[k][c]).sum();
        }
    }
    out
}

/// Transpose
pub fn transpose(m: &Mat3) -> Mat3 {
    let mut out = [[0.0; 3]; 3];
    for (r, row) in m.iter().enumerate() {
        for (c, &value) in row.iter().enumerate() {
            out[c][r] = value;
        }
    }
    out
}

/// Determinant
pub fn determinant(m: &Mat3) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

// ============================================================================
// Internal helpers
// ============================================================================

/// Aᵀ · B
fn mul_transpose_left(a: &Mat3, b: &Mat3) -> Mat3 {
    mat_mul(&transpose(a), b)
}

fn mat_vec(m: &Mat3, v: &[f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

fn column(m: &Mat3, c: usize) -> [f64; 3] {
    [m[0][c], m[1][c], m[2][c]]
}

fn from_columns(cols: &[[f64; 3]; 3]) -> Mat3 {
    transpose(cols)
}

fn scale(v: &[f64; 3], k: f64) -> [f64; 3] {
    [v[0] * k, v[1] * k, v[2] * k]
}

fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn normalized(v: &[f64; 3]) -> [f64; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len > 1e-15 {
        scale(v, 1.0 / len)
    } else {
        *v
    }
}

fn triple_product(cols: &[[f64; 3]; 3]) -> f64 {
    let c = cross(&cols[1], &cols[2]);
    cols[0][0] * c[0] + cols[0][1] * c[1] + cols[0][2] * c[2]
}

/// Unit vector perpendicular to `v`, built from the axis `v` is least aligned with
fn any_perpendicular(v: &[f64; 3]) -> [f64; 3] {
    let abs = v.map(f64::abs);
    let axis = if abs[0] <= abs[1] && abs[0] <= abs[2] {
        [1.0, 0.0, 0.0]
    } else if abs[1] <= abs[2] {
        [0.0, 1.0, 0.0]
    } else {
        [0.0, 0.0, 1.0]
    };
    normalized(&cross(v, &axis))
}

/// Cyclic Jacobi eigen-decomposition of a symmetric 3×3 matrix.
///
/// Returns eigenvalues and a matrix whose columns are the eigenvectors.
fn jacobi_eigen(sym: &Mat3) -> ([f64; 3], Mat3) {
    let mut a = *sym;
    let mut v = IDENTITY;

    for _sweep in 0..50 {
        let off = a[0][1] * a[0][1] + a[0][2] * a[0][2] + a[1][2] * a[1][2];
        if off < 1e-30 {
            break;
        }
        for (p, q) in [(0usize, 1usize), (0, 2), (1, 2)] {
            if a[p][q].abs() > 1e-15 {
                rotate(&mut a, &mut v, p, q);
            }
        }
    }

    ([a[0][0], a[1][1], a[2][2]], v)
}

/// One Givens rotation zeroing a[p][q]; accumulates V ← V · G
fn rotate(a: &mut Mat3, v: &mut Mat3, p: usize, q: usize) {
    let (app, aqq, apq) = (a[p][p], a[q][q], a[p][q]);

    let theta = (aqq - app) / (2.0 * apq);
    let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
    let c = 1.0 / (t * t + 1.0).sqrt();
    let s = t * c;

    a[p][p] = app - t * apq;
    a[q][q] = aqq + t * apq;
    a[p][q] = 0.0;
    a[q][p] = 0.0;

    let r = 3 - p - q;
    let (arp, arq) = (a[r][p], a[r][q]);
    a[r][p] = c * arp - s * arq;
    a[p][r] = a[r][p];
    a[r][q] = s * arp + c * arq;
    a[q][r] = a[r][q];

    for row in v.iter_mut() {
        let (vp, vq) = (row[p], row[q]);
        row[p] = c * vp - s * vq;
        row[q] = s * vp + c * vq;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(s: &[f64; 3]) -> Mat3 {
        [[s[0], 0.0, 0.0], [0.0, s[1], 0.0], [0.0, 0.0, s[2]]]
    }

    fn assert_rotation(m: &Mat3, label: &str) {
        assert_orthonormal(m, label);
        assert!((determinant(m) - 1.0).abs() < 1e-9, "{} is not a rotation", label);
    }

    fn assert_orthonormal(m: &Mat3, label: &str) {
        let prod = mat_mul(&transpose(m), m);
        for (i, row) in prod.iter().enumerate() {
            for (j, &value) in row.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(
                    (value - expected).abs() < 1e-9,
                    "{} not orthonormal at [{}][{}]: {}",
                    label, i, j, value
                );
            }
        }
    }

    fn assert_reconstructs(a: &Mat3, svd: &Svd3, tol: f64) {
        let back = mat_mul(&mat_mul(&svd.u, &diag(&svd.s)), &transpose(&svd.v));
        for r in 0..3 {
            for c in 0..3 {
                assert!(
                    (a[r][c] - back[r][c]).abs() < tol,
                    "A[{}][{}]: {} vs {}",
                    r, c, a[r][c], back[r][c]
                );
            }
        }
    }

    #[test]
    fn test_identity() {
        let result = svd3(&IDENTITY);
        for &s in &result.s {
            assert!((s - 1.0).abs() < 1e-12);
        }
        assert_reconstructs(&IDENTITY, &result, 1e-12);
    }

    #[test]
    fn test_rotation() {
        let (s, c) = std::f64::consts::FRAC_PI_3.sin_cos();
        let rot = [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]];
        let result = svd3(&rot);
        for &sv in &result.s {
            assert!((sv - 1.0).abs() < 1e-9);
        }
        assert_orthonormal(&result.u, "U");
        assert_rotation(&result.v, "V");
        assert_reconstructs(&rot, &result, 1e-9);
    }

    #[test]
    fn test_singular_values_sorted() {
        let m = [[1.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 2.0]];
        let result = svd3(&m);
        assert!((result.s[0] - 3.0).abs() < 1e-9);
        assert!((result.s[1] - 2.0).abs() < 1e-9);
        assert!((result.s[2] - 1.0).abs() < 1e-9);
        assert_reconstructs(&m, &result, 1e-9);
    }

    #[test]
    fn test_general_matrix() {
        let m = [[2.0, -1.0, 0.5], [0.3, 4.0, -2.0], [1.0, 0.0, 3.0]];
        let result = svd3(&m);
        assert!(result.s[0] >= result.s[1] && result.s[1] >= result.s[2]);
        assert_orthonormal(&result.u, "U");
        assert_rotation(&result.v, "V");
        assert_reconstructs(&m, &result, 1e-9);
    }

    #[test]
    fn test_negative_determinant() {
        let mirror = [[1.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, -3.0]];
        let result = svd3(&mirror);
        assert!((result.s[0] - 3.0).abs() < 1e-9);
        assert_orthonormal(&result.u, "U");
        assert_rotation(&result.v, "V");
        assert!((determinant(&result.u) + 1.0).abs() < 1e-9);
        assert_reconstructs(&mirror, &result, 1e-9);
    }

    #[test]
    fn test_rank_deficient() {
        let rank1 = [[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 0.0, 0.0]];
        let result = svd3(&rank1);
        assert!(result.s[0] > 1.0);
        assert!(result.s[1] < 1e-6 && result.s[2] < 1e-6);
        assert_orthonormal(&result.u, "U");
        assert_reconstructs(&rank1, &result, 1e-6);

        let zero = svd3(&[[0.0; 3]; 3]);
        assert!(zero.s.iter().all(|&s| s.abs() < 1e-12));
        assert_orthonormal(&zero.u, "U");
    }
}
