//! Spatial hash grid for distance-based selections
//!
//! Used to find the C-alpha atoms of one molecule that sit close to any atom
//! of another after superposition.

use ahash::AHashMap;
use lin_alg::f32::Vec3;

use crate::molecule::Molecule;

/// Uniform cubic-cell hash grid over point indices.
///
/// Neighbor queries visit the 3×3×3 block of cells around the query point, so
/// every point within `cell_size` of it is returned (plus some farther ones
/// that the caller filters by distance).
pub(crate) struct SpatialGrid {
    cells: AHashMap<(i32, i32, i32), Vec<usize>>,
    cell_size: f32,
}

impl SpatialGrid {
    pub fn with_capacity(cell_size: f32, expected_points: usize) -> Self {
        Self {
            cells: AHashMap::with_capacity(expected_points),
            cell_size,
        }
    }

    /// Build a grid over every coordinate of a molecule
    pub fn from_molecule(molecule: &Molecule, cell_size: f32) -> Self {
        let mut grid = Self::with_capacity(cell_size, molecule.atom_count());
        for (idx, coord) in molecule.coords().iter().enumerate() {
            grid.insert(*coord, idx);
        }
        grid
    }

    fn cell_key(&self, pos: Vec3) -> (i32, i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
            (pos.z / self.cell_size).floor() as i32,
        )
    }

    pub fn insert(&mut self, pos: Vec3, idx: usize) {
        let key = self.cell_key(pos);
        self.cells.entry(key).or_default().push(idx);
    }

    /// Collect all indices in the 3×3×3 neighborhood of the given position
    pub fn query_neighbors(&self, pos: Vec3, out: &mut Vec<usize>) {
        out.clear();
        let (cx, cy, cz) = self.cell_key(pos);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if let Some(indices) = self.cells.get(&(cx + dx, cy + dy, cz + dz)) {
                        out.extend_from_slice(indices);
                    }
                }
            }
        }
    }
}

/// Indices of C-alpha atoms of `query` lying within `cutoff` Å of any atom of
/// `other`, in `query` atom order.
///
/// Same selection as `query and name CA within <cutoff> of other`, restricted
/// to one CA per residue (see [`Molecule::ca_indices`]). The distance test is
/// inclusive.
pub fn ca_within(query: &Molecule, other: &Molecule, cutoff: f32) -> Vec<usize> {
    if cutoff.is_nan() || cutoff <= 0.0 || other.is_empty() {
        return Vec::new();
    }

    let grid = SpatialGrid::from_molecule(other, cutoff);
    let cutoff_sq = cutoff * cutoff;
    let other_coords = other.coords();
    let mut neighbors = Vec::new();

    query
        .ca_indices()
        .into_iter()
        .filter(|&idx| {
            let Some(pos) = query.coord(idx) else {
                return false;
            };
            grid.query_neighbors(pos, &mut neighbors);
            neighbors
                .iter()
                .any(|&j| (other_coords[j] - pos).magnitude_squared() <= cutoff_sq)
        })
        .collect()
}
