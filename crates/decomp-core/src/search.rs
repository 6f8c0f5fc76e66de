//! Branch-and-bound enumeration over a residue table.
//!
//! The search walks the alphabet from the heaviest element down to the base
//! element. Each level tries every multiplicity of its element, prunes the
//! remaining window against the residue table of the lighter prefix, and
//! descends. Pending levels live on an explicit stack of frames, so the
//! depth of the call stack never depends on the alphabet size.

use serde::Serialize;

use crate::residue::ResidueTable;

/// Counters collected by one query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// Multiplicities tried above the base level.
    pub nodes: u64,
    /// Branches cut by the residue table.
    pub pruned: u64,
    /// Integer solutions produced by the search.
    pub emitted: u64,
    /// Integer solutions whose exact mass fell outside the real window.
    pub rejected_exact: u64,
    /// Candidates refused by the validator.
    pub rejected_filter: u64,
}

impl SearchStats {
    pub fn merge(&mut self, other: &SearchStats) {
        self.nodes += other.nodes;
        self.pruned += other.pruned;
        self.emitted += other.emitted;
        self.rejected_exact += other.rejected_exact;
        self.rejected_filter += other.rejected_filter;
    }

    /// Candidates that survived every check.
    pub fn accepted(&self) -> u64 {
        self.emitted - self.rejected_exact - self.rejected_filter
    }
}

/// One pending level: the next multiplicity to try and the integer window
/// left for this level and everything lighter.
#[derive(Debug, Clone, Copy)]
struct Frame {
    level: usize,
    next: u64,
    lo: i64,
    hi: i64,
}

/// Query-local search state over a shared, immutable table.
#[derive(Debug)]
pub struct Search<'t> {
    table: &'t ResidueTable,
    frames: Vec<Frame>,
    counts: Vec<u32>,
    stats: SearchStats,
}

impl<'t> Search<'t> {
    pub fn new(table: &'t ResidueTable) -> Self {
        Self {
            table,
            frames: Vec::with_capacity(table.len()),
            counts: vec![0; table.len()],
            stats: SearchStats::default(),
        }
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Calls `emit` with every count vector (search order, min-shifted)
    /// whose integer mass lies in `[lo, hi]` and whose counts stay within
    /// the table's caps. Each vector is produced exactly once.
    pub fn run(&mut self, lo: i64, hi: i64, mut emit: impl FnMut(&[u32])) {
        let table = self.table;
        if table.is_empty() {
            return;
        }
        self.frames.clear();
        self.counts.fill(0);
        let top = table.len() - 1;
        if !table.reachable(top, lo, hi) {
            self.stats.pruned += 1;
            return;
        }
        if top == 0 {
            self.emit_base(lo, hi, &mut emit);
            return;
        }
        self.frames.push(Frame {
            level: top,
            next: 0,
            lo,
            hi,
        });

        let weights = table.weights();
        let caps = table.caps();
        while let Some(frame) = self.frames.last_mut() {
            let level = frame.level;
            let count = frame.next;
            let consumed = count as i64 * weights.weight(level);
            if count > u64::from(caps[level]) || consumed > frame.hi {
                self.frames.pop();
                continue;
            }
            frame.next += 1;
            let lo = frame.lo - consumed;
            let hi = frame.hi - consumed;

            self.counts[level] = count as u32;
            self.stats.nodes += 1;
            if !table.reachable(level - 1, lo, hi) {
                self.stats.pruned += 1;
                continue;
            }
            if level == 1 {
                self.emit_base(lo, hi, &mut emit);
            } else {
                self.frames.push(Frame {
                    level: level - 1,
                    next: 0,
                    lo,
                    hi,
                });
            }
        }
    }

    /// Emits every base multiplicity that lands the total in `[lo, hi]`.
    fn emit_base(&mut self, lo: i64, hi: i64, emit: &mut impl FnMut(&[u32])) {
        if hi < 0 {
            return;
        }
        let base = self.table.modulus();
        let first = (lo.max(0) + base - 1) / base;
        let last = (hi / base).min(i64::from(self.table.caps()[0]));
        for count in first..=last {
            self.counts[0] = count as u32;
            self.stats.emitted += 1;
            emit(&self.counts);
        }
    }
}
