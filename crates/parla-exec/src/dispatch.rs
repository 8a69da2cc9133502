//! Sequential-or-pool execution seam
//!
//! Every arithmetic kernel in the workspace is written once against
//! [`Dispatch`]. The sequential entry points pass [`Dispatch::Sequential`],
//! the `par_*` entry points pass [`Dispatch::Pool`], so both run the exact
//! same per-range code.
//!
//! The `*_mut` helpers split the destination into one borrowed sub-slice per
//! partition before dispatching. A worker can only reach the slice it was
//! handed, which rules out overlapping writes at compile time.

use std::mem;

use parking_lot::Mutex;

use crate::error::PoolResult;
use crate::pool::ThreadPool;
use crate::range::WorkRange;

/// Where a kernel runs: on the calling thread or across a pool
#[derive(Debug, Clone, Copy, Default)]
pub enum Dispatch<'p> {
    /// Run on the calling thread as a single range
    #[default]
    Sequential,
    /// Partition across the pool's active workers
    Pool(&'p ThreadPool),
}

impl<'p> From<&'p ThreadPool> for Dispatch<'p> {
    fn from(pool: &'p ThreadPool) -> Self {
        Dispatch::Pool(pool)
    }
}

impl<'p> From<Option<&'p ThreadPool>> for Dispatch<'p> {
    fn from(pool: Option<&'p ThreadPool>) -> Self {
        pool.map_or(Dispatch::Sequential, Dispatch::Pool)
    }
}

impl<'p> Dispatch<'p> {
    /// Number of partitions a large dispatch would use
    pub fn parallelism(&self) -> usize {
        match self {
            Dispatch::Sequential => 1,
            Dispatch::Pool(pool) => pool.active_threads(),
        }
    }

    /// Ranges covering `[0, total)` for this dispatch
    pub fn partition(&self, total: usize) -> Vec<WorkRange> {
        WorkRange::partition(total, self.parallelism())
    }

    /// Run `f` once per range of `[0, total)`
    pub fn run<F>(&self, total: usize, f: F) -> PoolResult<()>
    where
        F: Fn(WorkRange) + Sync,
    {
        match self {
            Dispatch::Sequential => {
                if total > 0 {
                    f(WorkRange::new(0, total));
                }
                Ok(())
            }
            Dispatch::Pool(pool) => pool.execute_ranges(total, |_, range| f(range)),
        }
    }

    /// Compute one partial result per range, returned in range order
    ///
    /// Used for reductions: the caller combines the partials after the join.
    pub fn map_partitions<R, F>(&self, total: usize, f: F) -> PoolResult<Vec<R>>
    where
        R: Send,
        F: Fn(WorkRange) -> R + Sync,
    {
        let ranges = self.partition(total);
        match self {
            Dispatch::Sequential => Ok(ranges.into_iter().map(f).collect()),
            Dispatch::Pool(pool) => {
                let slots: Vec<Mutex<Option<R>>> = ranges.iter().map(|_| Mutex::new(None)).collect();
                pool.run_partition(&ranges, &|partition, range| {
                    let value = f(range);
                    *slots[partition].lock() = Some(value);
                })?;
                Ok(slots.into_iter().filter_map(Mutex::into_inner).collect())
            }
        }
    }

    /// Compute `f(i)` for every `i` in `[0, total)`, returned in index order
    pub fn map_collect<R, F>(&self, total: usize, f: F) -> PoolResult<Vec<R>>
    where
        R: Send,
        F: Fn(usize) -> R + Sync,
    {
        let parts = self.map_partitions(total, |range| range.iter().map(&f).collect::<Vec<R>>())?;
        let mut out = Vec::with_capacity(total);
        for part in parts {
            out.extend(part);
        }
        Ok(out)
    }

    /// Hand each range its own contiguous segment of `data`
    pub fn for_each_segment_mut<T, F>(&self, data: &mut [T], f: F) -> PoolResult<()>
    where
        T: Send,
        F: Fn(WorkRange, &mut [T]) + Sync,
    {
        let ranges = self.partition(data.len());
        let pieces = split_at_bounds(data, ranges.iter().map(|r| r.end));
        self.run_pieces(&ranges, pieces, f)
    }

    /// Apply `f(i, &mut data[i])` to every element
    pub fn for_each_mut<T, F>(&self, data: &mut [T], f: F) -> PoolResult<()>
    where
        T: Send,
        F: Fn(usize, &mut T) + Sync,
    {
        self.for_each_segment_mut(data, |range, segment| {
            for (i, item) in range.iter().zip(segment.iter_mut()) {
                f(i, item);
            }
        })
    }

    /// Apply `f(row, &mut row_slice)` to every row of a row-major buffer
    ///
    /// `data.len()` must be a multiple of `width`; a zero width is a no-op.
    pub fn for_each_row_mut<T, F>(&self, data: &mut [T], width: usize, f: F) -> PoolResult<()>
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync,
    {
        if width == 0 {
            return Ok(());
        }
        let rows = data.len() / width;
        let ranges = self.partition(rows);
        let pieces = split_at_bounds(data, ranges.iter().map(|r| r.end * width));
        self.run_pieces(&ranges, pieces, |range, block| {
            for (row, values) in range.iter().zip(block.chunks_mut(width)) {
                f(row, values);
            }
        })
    }

    /// Apply `f(row, &mut span)` to rows delimited by an offset table
    ///
    /// Row `i` owns `data[offsets[i]..offsets[i + 1]]`, the layout of a CSR
    /// `row_ptr`. `offsets` must start at 0, be non-decreasing and end at
    /// `data.len()`.
    pub fn for_each_span_mut<T, F>(&self, data: &mut [T], offsets: &[usize], f: F) -> PoolResult<()>
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync,
    {
        let rows = offsets.len().saturating_sub(1);
        let ranges = self.partition(rows);
        let pieces = split_at_bounds(data, ranges.iter().map(|r| offsets[r.end]));
        self.run_pieces(&ranges, pieces, |range, mut block| {
            for row in range {
                let (span, rest) = mem::take(&mut block).split_at_mut(offsets[row + 1] - offsets[row]);
                f(row, span);
                block = rest;
            }
        })
    }

    fn run_pieces<T, F>(&self, ranges: &[WorkRange], pieces: Vec<&mut [T]>, f: F) -> PoolResult<()>
    where
        T: Send,
        F: Fn(WorkRange, &mut [T]) + Sync,
    {
        match self {
            Dispatch::Sequential => {
                for (range, piece) in ranges.iter().zip(pieces) {
                    f(*range, piece);
                }
                Ok(())
            }
            Dispatch::Pool(pool) => {
                // Slot `i` is only ever taken by the worker running partition `i`
                let slots: Vec<Mutex<Option<&mut [T]>>> =
                    pieces.into_iter().map(|p| Mutex::new(Some(p))).collect();
                pool.run_partition(ranges, &|partition, range| {
                    let piece = slots[partition].lock().take();
                    if let Some(piece) = piece {
                        f(range, piece);
                    }
                })
            }
        }
    }
}

/// Split `data` into consecutive pieces ending at each of `ends`
fn split_at_bounds<T>(mut data: &mut [T], ends: impl IntoIterator<Item = usize>) -> Vec<&mut [T]> {
    let mut pieces = Vec::new();
    let mut consumed = 0;
    for end in ends {
        let (head, tail) = mem::take(&mut data).split_at_mut(end - consumed);
        pieces.push(head);
        data = tail;
        consumed = end;
    }
    pieces
}
