//! Extended residue tables.
//!
//! Column `i` of the table holds, for every residue `r` modulo the base
//! weight `a`, the smallest integer mass congruent to `r` that the elements
//! at search positions `0..=i` can form within their (min-shifted) caps.
//! A remaining mass `m` is only reachable by that prefix if
//! `table[i][m mod a] <= m`.
//!
//! Window searches ask the same question for a whole interval of masses, so
//! the table also answers cyclic range-minimum queries. Columns are split
//! into blocks of [`BLOCK`] residues; short ranges are scanned, longer ones
//! combine a scan of the partial blocks with a sparse table over block
//! minima. The sparse layers are built lazily, one power of two at a time,
//! and hold `modulus / BLOCK` entries per column.

use std::collections::VecDeque;
use std::sync::OnceLock;

use decomp_model::Bound;

use crate::weights::IntegerWeights;

/// Marker for residues no combination of the prefix can reach.
pub const UNREACHABLE: i64 = i64::MAX;

/// Residues per block of the range-minimum structure.
const BLOCK: usize = 32;

#[derive(Debug)]
pub struct ResidueTable {
    weights: IntegerWeights,
    caps: Vec<u32>,
    columns: Vec<Vec<i64>>,
    column_min: Vec<i64>,
    /// `block_min[i][b]` is the minimum of column `i` over block `b`.
    block_min: Vec<Vec<i64>>,
    /// `layers[j - 1][i][b]` is the minimum of `block_min[i]` over the
    /// blocks `b .. b + 2^j`.
    layers: Vec<OnceLock<Vec<Vec<i64>>>>,
}

impl ResidueTable {
    /// Builds the table for `weights` with per-position count caps.
    ///
    /// `caps` are given in search order and already shifted by the lower
    /// bounds; [`Bound::UNBOUNDED`] means no cap.
    pub fn build(weights: IntegerWeights, caps: Vec<u32>) -> Self {
        assert_eq!(weights.len(), caps.len(), "one cap per weight");
        assert!(!weights.is_empty(), "residue table needs a base element");
        let base = weights.base();
        let modulus = base as usize;

        let mut columns = Vec::with_capacity(weights.len());
        let mut first = vec![UNREACHABLE; modulus];
        first[0] = 0;
        columns.push(first);
        for position in 1..weights.len() {
            let previous = &columns[position - 1];
            let column = extend_column(previous, base, weights.weight(position), caps[position]);
            columns.push(column);
        }

        let column_min = columns
            .iter()
            .map(|column| column.iter().copied().min().unwrap_or(UNREACHABLE))
            .collect();
        let block_min: Vec<Vec<i64>> = columns
            .iter()
            .map(|column| {
                column
                    .chunks(BLOCK)
                    .map(|block| block.iter().copied().min().unwrap_or(UNREACHABLE))
                    .collect()
            })
            .collect();

        // Queries shorter than the modulus never cover more full blocks.
        let full_blocks = modulus / BLOCK;
        let mut layer_count = 0;
        while (1_usize << (layer_count + 1)) <= full_blocks {
            layer_count += 1;
        }
        let layers = (0..layer_count).map(|_| OnceLock::new()).collect();

        Self {
            weights,
            caps,
            columns,
            column_min,
            block_min,
            layers,
        }
    }

    pub fn weights(&self) -> &IntegerWeights {
        &self.weights
    }

    /// Count caps per search position.
    pub fn caps(&self) -> &[u32] {
        &self.caps
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn modulus(&self) -> i64 {
        self.weights.base()
    }

    /// Smallest mass with residue `residue` formed by positions `0..=level`.
    pub fn entry(&self, level: usize, residue: usize) -> i64 {
        self.columns[level][residue]
    }

    /// Number of range-minimum layers built so far.
    pub fn built_layers(&self) -> usize {
        self.layers.iter().filter(|layer| layer.get().is_some()).count()
    }

    /// Entries held by the range-minimum structure, excluding the columns.
    pub fn range_entries(&self) -> usize {
        let blocks: usize = self.block_min.iter().map(Vec::len).sum();
        let layers: usize = self
            .layers
            .iter()
            .filter_map(OnceLock::get)
            .flat_map(|layer| layer.iter().map(Vec::len))
            .sum();
        blocks + layers
    }

    /// Whether some mass in `[lo, hi]` may be formed by positions
    /// `0..=level`.
    ///
    /// Never answers `false` for a reachable mass; it may answer `true` for
    /// an unreachable one when the window spans several residues.
    pub fn reachable(&self, level: usize, lo: i64, hi: i64) -> bool {
        if hi < 0 || lo > hi {
            return false;
        }
        let lo = lo.max(0);
        let modulus = self.modulus();
        let len = hi - lo + 1;
        let min = if len >= modulus {
            self.column_min[level]
        } else {
            let start = (lo % modulus) as usize;
            let end = start + len as usize;
            let modulus = modulus as usize;
            if end <= modulus {
                self.linear_min(level, start, end)
            } else {
                self.linear_min(level, start, modulus)
                    .min(self.linear_min(level, 0, end - modulus))
            }
        };
        min <= hi
    }

    /// Minimum of column `level` over the residues `start .. end`.
    fn linear_min(&self, level: usize, start: usize, end: usize) -> i64 {
        let column = &self.columns[level];
        if end - start <= 2 * BLOCK {
            return column[start..end].iter().copied().min().unwrap_or(UNREACHABLE);
        }
        let first_block = start.div_ceil(BLOCK);
        let last_block = end / BLOCK;
        let head = column[start..first_block * BLOCK].iter().copied().min();
        let tail = column[last_block * BLOCK..end].iter().copied().min();
        let middle = self.block_range_min(level, first_block, last_block);
        [head, tail]
            .into_iter()
            .flatten()
            .fold(middle, i64::min)
    }

    /// Minimum of `block_min[level]` over the blocks `first .. last`,
    /// with `first < last`.
    fn block_range_min(&self, level: usize, first: usize, last: usize) -> i64 {
        let count = last - first;
        let exponent = (usize::BITS - 1 - count.leading_zeros()) as usize;
        if exponent == 0 {
            return self.block_min[level][first];
        }
        let span = 1_usize << exponent;
        let layer = &self.layer(exponent)[level];
        layer[first].min(layer[last - span])
    }

    /// Sparse layer for runs of `2^exponent` blocks, `exponent >= 1`.
    fn layer(&self, exponent: usize) -> &[Vec<i64>] {
        self.layers[exponent - 1].get_or_init(|| {
            let half = 1_usize << (exponent - 1);
            let previous: &[Vec<i64>] = if exponent == 1 {
                &self.block_min
            } else {
                self.layer(exponent - 1)
            };
            tracing::trace!(exponent, "building residue range layer");
            previous
                .iter()
                .map(|row| {
                    (0..row.len() - half)
                        .map(|b| row[b].min(row[b + half]))
                        .collect()
                })
                .collect()
        })
    }
}

/// Next table column after adding up to `cap` copies of `weight`.
///
/// Adding `weight` walks the residues in cycles of length `base / gcd`.
/// Along each cycle the update is a sliding-window minimum over the previous
/// column, computed with a monotone deque on `previous − position · weight`.
fn extend_column(previous: &[i64], base: i64, weight: i64, cap: u32) -> Vec<i64> {
    let modulus = previous.len();
    let step = (weight % base) as usize;
    let cycles = gcd(modulus, step);
    let cycle_len = modulus / cycles;
    if cycle_len == 1 {
        // Multiples of the base never change the residue or lower the mass.
        return previous.to_vec();
    }
    let window = (cycle_len - 1).min(cap as usize);

    let mut column = vec![UNREACHABLE; modulus];
    let mut deque: VecDeque<(usize, i64)> = VecDeque::with_capacity(window + 1);
    for start in 0..cycles {
        deque.clear();
        // Walk the cycle twice so every position sees a full window.
        let mut residue = start;
        for position in 0..2 * cycle_len {
            let value = previous[residue];
            if value != UNREACHABLE {
                let key = value - position as i64 * weight;
                while deque.back().is_some_and(|&(_, back)| back >= key) {
                    deque.pop_back();
                }
                deque.push_back((position, key));
            }
            while deque
                .front()
                .is_some_and(|&(front, _)| front + window < position)
            {
                deque.pop_front();
            }
            if position >= cycle_len {
                if let Some(&(_, key)) = deque.front() {
                    column[residue] = column[residue].min(key + position as i64 * weight);
                }
            }
            residue = (residue + step) % modulus;
        }
    }
    column
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Caps in search order: `max − min`, or unbounded.
pub fn shifted_caps(weights: &IntegerWeights, bounds: &[Bound]) -> Vec<u32> {
    weights
        .order()
        .iter()
        .map(|&index| bounds[index].span().unwrap_or(Bound::UNBOUNDED))
        .collect()
}
