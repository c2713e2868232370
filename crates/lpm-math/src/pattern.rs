//! Per-particle block sparsity pattern for the symmetric stiffness matrix.
//!
//! Row block `i` covers the dofs of particle `i` and spans every
//! connected particle `j ≥ i` (the diagonal block plus the strict upper
//! off-diagonal blocks). The `d` dof rows of a block row are laid out
//! consecutively; row `r` stores columns `r..d` of the diagonal block
//! followed by `d` columns for each higher neighbor. One block row thus
//! holds `d²·nq − d(d−1)/2` entries, where `nq` is the number of
//! connected particles with id ≥ `i`, and the prefix sum of these sizes
//! is the block-offset array (`K_pointer`).
//!
//! ## Workflow
//! 1. `BlockPattern::new(dim, upper)`: reserve the pattern once per run
//! 2. `SymmetricBlockMatrix::new(pattern)`: zeroed values
//! 3. `add` / `set` by `(row block, local offset, r, s)`, or fill whole
//!    block rows in parallel through `row_blocks_mut`
//! 4. `csr()`: hand the finished arrays to a linear solver

use lpm_types::{LpmError, LpmResult};

use crate::sparse::SymmetricCsr;

/// Static block sparsity pattern.
#[derive(Debug, Clone)]
pub struct BlockPattern {
    block_dim: usize,
    /// Per row block: sorted column blocks ≥ the row block, itself first.
    upper: Vec<Vec<usize>>,
    /// Start offset of each block row in the value array, plus the total.
    block_ptr: Vec<usize>,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
}

impl BlockPattern {
    /// Builds the pattern from each row block's upper connection list.
    ///
    /// Every list must be strictly ascending, start with the row block
    /// itself, and only name existing blocks.
    pub fn new(block_dim: usize, upper: Vec<Vec<usize>>) -> LpmResult<Self> {
        if !(1..=3).contains(&block_dim) {
            return Err(LpmError::InvalidTopology(format!(
                "block dimension must be 1, 2 or 3, got {block_dim}"
            )));
        }
        let n = upper.len();
        for (i, list) in upper.iter().enumerate() {
            if list.first() != Some(&i) {
                return Err(LpmError::InvalidTopology(format!(
                    "connection list of block {i} must start with itself"
                )));
            }
            if list.windows(2).any(|w| w[0] >= w[1]) {
                return Err(LpmError::InvalidTopology(format!(
                    "connection list of block {i} is not strictly ascending"
                )));
            }
            if let Some(&last) = list.last() {
                if last >= n {
                    return Err(LpmError::InvalidTopology(format!(
                        "block {i} references block {last}, only {n} exist"
                    )));
                }
            }
        }

        let d = block_dim;
        let mut block_ptr = Vec::with_capacity(n + 1);
        block_ptr.push(0);
        for list in &upper {
            let last = block_ptr[block_ptr.len() - 1];
            block_ptr.push(last + Self::block_row_len(d, list.len()));
        }

        let nnz = block_ptr[n];
        let mut row_ptr = Vec::with_capacity(n * d + 1);
        let mut col_idx = Vec::with_capacity(nnz);
        row_ptr.push(0);
        for (i, list) in upper.iter().enumerate() {
            for r in 0..d {
                col_idx.extend((r..d).map(|s| i * d + s));
                for &j in &list[1..] {
                    col_idx.extend((0..d).map(|s| j * d + s));
                }
                row_ptr.push(col_idx.len());
            }
        }
        debug_assert_eq!(col_idx.len(), nnz);

        Ok(Self {
            block_dim,
            upper,
            block_ptr,
            row_ptr,
            col_idx,
        })
    }

    /// Number of stored entries of a block row with `nq` upper blocks.
    #[inline]
    pub fn block_row_len(dim: usize, nq: usize) -> usize {
        dim * dim * nq - dim * (dim - 1) / 2
    }

    pub fn block_dim(&self) -> usize {
        self.block_dim
    }

    pub fn num_blocks(&self) -> usize {
        self.upper.len()
    }

    /// Total number of dofs (matrix dimension).
    pub fn dofs(&self) -> usize {
        self.upper.len() * self.block_dim
    }

    pub fn nnz(&self) -> usize {
        self.col_idx.len()
    }

    /// Block-row start offsets (`K_pointer`), length `num_blocks + 1`.
    pub fn block_ptr(&self) -> &[usize] {
        &self.block_ptr
    }

    pub fn row_ptr(&self) -> &[usize] {
        &self.row_ptr
    }

    pub fn col_idx(&self) -> &[usize] {
        &self.col_idx
    }

    /// Column blocks stored in block row `row_block`.
    pub fn upper(&self, row_block: usize) -> &[usize] {
        &self.upper[row_block]
    }

    /// Local offset of `col_block` within the block row of `row_block`.
    pub fn local_offset(&self, row_block: usize, col_block: usize) -> Option<usize> {
        self.upper[row_block].binary_search(&col_block).ok()
    }

    /// Offset of entry `(r, s)` of local block `m` relative to the start
    /// of block row `row_block`. For the diagonal block (`m == 0`) only
    /// `s ≥ r` is stored.
    #[inline]
    pub fn local_entry(&self, row_block: usize, m: usize, r: usize, s: usize) -> usize {
        let d = self.block_dim;
        let nq = self.upper[row_block].len();
        debug_assert!(r < d && s < d, "entry ({r}, {s}) outside a {d}×{d} block");
        debug_assert!(m < nq, "local block {m} outside block row of length {nq}");
        debug_assert!(m > 0 || s >= r, "lower entry ({r}, {s}) of a diagonal block");

        let row_start = r * d * nq - r * (r.saturating_sub(1)) / 2;
        if m == 0 {
            row_start + s - r
        } else {
            row_start + (d - r) + (m - 1) * d + s
        }
    }

    /// Global value index of entry `(r, s)` of local block `m` in block row `row_block`.
    #[inline]
    pub fn entry(&self, row_block: usize, m: usize, r: usize, s: usize) -> usize {
        self.block_ptr[row_block] + self.local_entry(row_block, m, r, s)
    }
}

/// Symmetric matrix stored as the upper triangle of a [`BlockPattern`].
#[derive(Debug, Clone)]
pub struct SymmetricBlockMatrix {
    pattern: BlockPattern,
    values: Vec<f64>,
}

impl SymmetricBlockMatrix {
    /// Creates a zeroed matrix over `pattern`.
    pub fn new(pattern: BlockPattern) -> Self {
        let values = vec![0.0; pattern.nnz()];
        Self { pattern, values }
    }

    pub fn pattern(&self) -> &BlockPattern {
        &self.pattern
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    pub fn clear(&mut self) {
        self.values.fill(0.0);
    }

    #[inline]
    pub fn add(&mut self, row_block: usize, m: usize, r: usize, s: usize, value: f64) {
        let idx = self.pattern.entry(row_block, m, r, s);
        self.values[idx] += value;
    }

    #[inline]
    pub fn set(&mut self, row_block: usize, m: usize, r: usize, s: usize, value: f64) {
        let idx = self.pattern.entry(row_block, m, r, s);
        self.values[idx] = value;
    }

    #[inline]
    pub fn get(&self, row_block: usize, m: usize, r: usize, s: usize) -> f64 {
        self.values[self.pattern.entry(row_block, m, r, s)]
    }

    /// Splits the value array into one mutable slice per block row.
    ///
    /// Block rows are disjoint, so the slices can be filled concurrently.
    /// Offsets inside a slice come from [`BlockPattern::local_entry`].
    pub fn row_blocks_mut(&mut self) -> (&BlockPattern, Vec<(usize, &mut [f64])>) {
        let mut out = Vec::with_capacity(self.pattern.num_blocks());
        let mut rest: &mut [f64] = &mut self.values;
        for (i, w) in self.pattern.block_ptr.windows(2).enumerate() {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(w[1] - w[0]);
            out.push((i, head));
            rest = tail;
        }
        (&self.pattern, out)
    }

    /// Diagonal of the full matrix, one entry per dof.
    pub fn diagonal(&self) -> Vec<f64> {
        let d = self.pattern.block_dim;
        let mut diag = Vec::with_capacity(self.pattern.dofs());
        for i in 0..self.pattern.num_blocks() {
            for r in 0..d {
                diag.push(self.get(i, 0, r, r));
            }
        }
        diag
    }

    /// Borrowed CSR view for the linear solvers.
    pub fn csr(&self) -> SymmetricCsr<'_> {
        SymmetricCsr::new(
            self.pattern.dofs(),
            &self.pattern.row_ptr,
            &self.pattern.col_idx,
            &self.values,
        )
    }

    /// Dense expansion of the full symmetric matrix.
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        self.csr().to_dense()
    }
}
