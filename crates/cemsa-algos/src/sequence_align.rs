//! Needleman-Wunsch global sequence alignment with affine gap penalties
//!
//! Used to pair C-alpha atoms of two structures before a rigid-body fit.

use crate::substitution_matrix::{SubstitutionMatrix, BLOSUM62};

/// Scoring parameters for sequence alignment
#[derive(Debug, Clone)]
pub struct AlignmentScoring {
    /// Substitution matrix for residue pair scores
    pub matrix: &'static SubstitutionMatrix,
    /// Gap opening penalty (default: -10.0 for BLOSUM62)
    pub gap_open: f32,
    /// Gap extension penalty (default: -1.0)
    pub gap_extend: f32,
}

impl Default for AlignmentScoring {
    fn default() -> Self {
        Self {
            matrix: &BLOSUM62,
            gap_open: -10.0,
            gap_extend: -1.0,
        }
    }
}

/// One column of a pairwise alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignedPair {
    /// Both sequences have a residue at this position
    Match { source: usize, target: usize },
    /// Gap in source (insertion in target)
    GapSource { target: usize },
    /// Gap in target (insertion in source)
    GapTarget { source: usize },
}

/// Result of sequence alignment
#[derive(Debug, Clone)]
pub struct AlignmentResult {
    /// Alignment columns in sequence order
    pub pairs: Vec<AlignedPair>,
    /// Alignment score
    pub score: f32,
    /// Number of matched (non-gap) columns
    pub n_matched: usize,
    /// Identical matches divided by alignment length
    pub identity: f32,
}

impl AlignmentResult {
    /// (source, target) index pairs of the matched columns
    pub fn matched_pairs(&self) -> Vec<(usize, usize)> {
        self.pairs
            .iter()
            .filter_map(|pair| match *pair {
                AlignedPair::Match { source, target } => Some((source, target)),
                _ => None,
            })
            .collect()
    }
}

/// Which DP layer a cell score belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    /// residue against residue
    Diag,
    /// source residue against a gap
    Up,
    /// target residue against a gap
    Left,
}

/// Best score per layer at one cell, plus the layer each came from
#[derive(Clone, Copy)]
struct Cell {
    score: [f32; 3],
    from: [Layer; 3],
}

impl Cell {
    const EMPTY: Cell = Cell {
        score: [f32::NEG_INFINITY; 3],
        from: [Layer::Diag; 3],
    };

    fn get(&self, layer: Layer) -> f32 {
        self.score[layer as usize]
    }

    fn best(&self) -> (f32, Layer) {
        [Layer::Diag, Layer::Up, Layer::Left]
            .into_iter()
            .map(|layer| (self.get(layer), layer))
            .fold((f32::NEG_INFINITY, Layer::Diag), |acc, cur| if cur.0 > acc.0 { cur } else { acc })
    }
}

/// Pick the larger of two (score, origin) candidates, preferring the first on ties
fn pick(a: (f32, Layer), b: (f32, Layer)) -> (f32, Layer) {
    if a.0 >= b.0 {
        a
    } else {
        b
    }
}

/// Global alignment (Needleman-Wunsch, Gotoh affine gaps) of two one-letter
/// sequences.
///
/// A gap of length k costs `gap_open + k * gap_extend`.
pub fn global_align(source: &[char], target: &[char], scoring: &AlignmentScoring) -> AlignmentResult {
    let m = source.len();
    let n = target.len();
    let cols = n + 1;
    let idx = |i: usize, j: usize| i * cols + j;

    let mut dp = vec![Cell::EMPTY; (m + 1) * cols];
    dp[idx(0, 0)].score[Layer::Diag as usize] = 0.0;
    for i in 1..=m {
        let cell = &mut dp[idx(i, 0)];
        cell.score[Layer::Up as usize] = scoring.gap_open + i as f32 * scoring.gap_extend;
        cell.from[Layer::Up as usize] = if i == 1 { Layer::Diag } else { Layer::Up };
    }
    for j in 1..=n {
        let cell = &mut dp[idx(0, j)];
        cell.score[Layer::Left as usize] = scoring.gap_open + j as f32 * scoring.gap_extend;
        cell.from[Layer::Left as usize] = if j == 1 { Layer::Diag } else { Layer::Left };
    }

    let open = scoring.gap_open + scoring.gap_extend;
    for i in 1..=m {
        for j in 1..=n {
            let diag = dp[idx(i - 1, j - 1)];
            let up = dp[idx(i - 1, j)];
            let left = dp[idx(i, j - 1)];

            let sub = scoring.matrix.score(source[i - 1], target[j - 1]);
            let (best_diag, diag_from) = diag.best();

            let (up_score, up_from) = pick(
                (up.get(Layer::Diag) + open, Layer::Diag),
                (up.get(Layer::Up) + scoring.gap_extend, Layer::Up),
            );
            let (left_score, left_from) = pick(
                (left.get(Layer::Diag) + open, Layer::Diag),
                (left.get(Layer::Left) + scoring.gap_extend, Layer::Left),
            );

            dp[idx(i, j)] = Cell {
                score: [best_diag + sub, up_score, left_score],
                from: [diag_from, up_from, left_from],
            };
        }
    }

    let (score, mut layer) = dp[idx(m, n)].best();

    let mut pairs = Vec::with_capacity(m + n);
    let (mut i, mut j) = (m, n);
    while i > 0 || j > 0 {
        let cell = &dp[idx(i, j)];
        let from = cell.from[layer as usize];
        match layer {
            Layer::Diag if i > 0 && j > 0 => {
                pairs.push(AlignedPair::Match { source: i - 1, target: j - 1 });
                i -= 1;
                j -= 1;
            }
            Layer::Up if i > 0 => {
                pairs.push(AlignedPair::GapTarget { source: i - 1 });
                i -= 1;
            }
            Layer::Left if j > 0 => {
                pairs.push(AlignedPair::GapSource { target: j - 1 });
                j -= 1;
            }
            // Boundary row/column: only one kind of move is left
            _ => {
                layer = if i > 0 { Layer::Up } else { Layer::Left };
                continue;
            }
        }
        layer = from;
    }
    pairs.reverse();

    let mut n_matched = 0;
    let mut n_identical = 0;
    for pair in &pairs {
        if let AlignedPair::Match { source: s, target: t } = *pair {
            n_matched += 1;
            if source[s].eq_ignore_ascii_case(&target[t]) {
                n_identical += 1;
            }
        }
    }
    let identity = if pairs.is_empty() {
        0.0
    } else {
        n_identical as f32 / pairs.len() as f32
    };

    AlignmentResult {
        pairs,
        score,
        n_matched,
        identity,
    }
}
