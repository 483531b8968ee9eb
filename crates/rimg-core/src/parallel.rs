//! Data-parallel partitioning of index ranges using Rayon.
//!
//! Every per-row or per-column loop in rimg runs through [`parallel`]: the
//! range `0..len` is cut into chunks that worker tasks claim from a shared
//! atomic counter until the range is exhausted. Each index is visited exactly
//! once, and the call returns only after every chunk has finished.
//!
//! # Configuration
//!
//! [`Parallelism`] controls the worker count and chunk granularity. A
//! process-wide default is read by [`parallel`]; [`parallel_with`] takes an
//! explicit configuration, which is how callers run a single operation
//! sequentially or pin its worker count.
//!
//! ```rust
//! use rimg_core::{parallel_with, Parallelism};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let sum = AtomicUsize::new(0);
//! let par = Parallelism::new().with_workers(4).unwrap();
//! parallel_with(&par, 100, |range| {
//!     sum.fetch_add(range.sum::<usize>(), Ordering::Relaxed);
//! });
//! assert_eq!(sum.into_inner(), 4950);
//! ```
//!
//! # Disjoint writes
//!
//! Partitioned work usually writes into one shared output buffer. Rows (or
//! columns) handed to different chunks never overlap, which [`DisjointSlice`]
//! lets the workers exploit without locking. [`for_each_row`] wraps the common
//! row-per-index case in a safe API.
//!
//! # Dependencies
//!
//! - [`rayon`] - Scoped worker tasks on the global thread pool

use crate::{Error, PixelBuffer, Result, BYTES_PER_PIXEL};
use std::marker::PhantomData;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};
use tracing::trace;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default number of chunks each worker gets when the range is split.
pub const DEFAULT_CHUNKS_PER_WORKER: usize = 16;

/// Ranges shorter than this run on the calling thread.
pub const DEFAULT_MIN_LEN: usize = 2;

static GLOBAL: RwLock<Parallelism> = RwLock::new(Parallelism::new());

/// Partitioning configuration.
///
/// # Example
///
/// ```rust
/// use rimg_core::Parallelism;
///
/// let par = Parallelism::new().with_workers(2).unwrap().with_min_len(64);
/// assert_eq!(par.worker_count(1000), 2);
/// assert_eq!(par.worker_count(10), 1);
/// assert_eq!(Parallelism::sequential().worker_count(1000), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Parallelism {
    /// Run on worker tasks at all
    pub enabled: bool,
    /// Worker cap; `None` uses the Rayon pool size
    pub max_workers: Option<usize>,
    /// Chunks per worker; higher values balance uneven rows better
    pub chunks_per_worker: usize,
    /// Shortest range that is split across workers
    pub min_len: usize,
}

impl Parallelism {
    /// Default configuration: one worker per pool thread.
    pub const fn new() -> Self {
        Self {
            enabled: true,
            max_workers: None,
            chunks_per_worker: DEFAULT_CHUNKS_PER_WORKER,
            min_len: DEFAULT_MIN_LEN,
        }
    }

    /// Runs all work on the calling thread.
    pub const fn sequential() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    /// Caps the number of workers.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] if `workers` is zero.
    pub fn with_workers(mut self, workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(Error::invalid_parameter("worker count must be > 0"));
        }
        self.max_workers = Some(workers);
        Ok(self)
    }

    /// Sets the chunk granularity (clamped to at least 1).
    pub fn with_chunks_per_worker(mut self, chunks: usize) -> Self {
        self.chunks_per_worker = chunks.max(1);
        self
    }

    /// Sets the shortest range that is split across workers.
    pub fn with_min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len;
        self
    }

    /// Number of workers used for a range of `len` indices.
    ///
    /// Never exceeds `len`; 1 means the range runs on the calling thread.
    pub fn worker_count(&self, len: usize) -> usize {
        if !self.enabled || len < self.min_len.max(2) {
            return 1;
        }
        let pool = self.max_workers.unwrap_or_else(rayon::current_num_threads);
        pool.clamp(1, len)
    }

    /// Returns the process-wide configuration used by [`parallel`].
    pub fn global() -> Self {
        *GLOBAL.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the process-wide configuration.
    pub fn set_global(par: Self) {
        *GLOBAL.write().unwrap_or_else(PoisonError::into_inner) = par;
    }
}

impl Default for Parallelism {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs `work` over `0..len` using the process-wide [`Parallelism`].
#[inline]
pub fn parallel<F>(len: usize, work: F)
where
    F: Fn(Range<usize>) + Sync,
{
    parallel_with(&Parallelism::global(), len, work);
}

/// Runs `work` over `0..len`, partitioned per `par`.
///
/// `work` receives disjoint sub-ranges that together cover `0..len` exactly
/// once. With a single worker it is called once with the whole range (also
/// when `len` is zero).
pub fn parallel_with<F>(par: &Parallelism, len: usize, work: F)
where
    F: Fn(Range<usize>) + Sync,
{
    let workers = par.worker_count(len);
    if workers <= 1 {
        work(0..len);
        return;
    }

    let chunk = (len / (workers * par.chunks_per_worker.max(1))).max(1);
    trace!(len, workers, chunk, "parallel");

    let next = AtomicUsize::new(0);
    let work = &work;
    let next = &next;
    rayon::scope(|s| {
        for _ in 0..workers {
            s.spawn(move |_| {
                loop {
                    let start = next.fetch_add(chunk, Ordering::Relaxed);
                    if start >= len {
                        break;
                    }
                    work(start..(start + chunk).min(len));
                }
            });
        }
    });
}

/// Shared view of a mutable slice for writers that touch disjoint ranges.
///
/// Created from `&mut [T]`, so nothing else can observe the slice while the
/// view lives.
pub struct DisjointSlice<'a, T> {
    ptr: *mut T,
    len: usize,
    _marker: PhantomData<&'a mut [T]>,
}

// SAFETY: access goes through `slice_mut`, whose callers guarantee that
// concurrently borrowed ranges never overlap.
unsafe impl<T: Send> Send for DisjointSlice<'_, T> {}
unsafe impl<T: Send> Sync for DisjointSlice<'_, T> {}

impl<'a, T> DisjointSlice<'a, T> {
    /// Wraps an exclusive slice.
    pub fn new(slice: &'a mut [T]) -> Self {
        Self {
            ptr: slice.as_mut_ptr(),
            len: slice.len(),
            _marker: PhantomData,
        }
    }

    /// Length of the underlying slice.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the underlying slice is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Borrows `range` mutably.
    ///
    /// # Safety
    ///
    /// No two live borrows returned by this method may overlap.
    ///
    /// # Panics
    ///
    /// Panics if `range` is out of bounds.
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn slice_mut(&self, range: Range<usize>) -> &mut [T] {
        assert!(
            range.start <= range.end && range.end <= self.len,
            "range {range:?} out of bounds for length {}",
            self.len
        );
        // SAFETY: in bounds (checked above); exclusivity is the caller's contract.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.add(range.start), range.end - range.start) }
    }
}

/// Calls `f(y, row)` for every row of `buf`, rows partitioned per `par`.
///
/// `row` excludes stride padding. Storage shared with other buffers is
/// detached first.
pub fn for_each_row<F>(par: &Parallelism, buf: &mut PixelBuffer, f: F)
where
    F: Fn(u32, &mut [u8]) + Sync,
{
    let (width, height) = buf.dimensions();
    let stride = buf.stride();
    let row_len = width as usize * BYTES_PER_PIXEL;
    let rows = DisjointSlice::new(buf.data_mut());
    parallel_with(par, height as usize, |range| {
        for y in range {
            let start = y * stride;
            // SAFETY: each y is visited once, and row y covers
            // `y * stride .. y * stride + row_len` with `row_len <= stride`.
            let row = unsafe { rows.slice_mut(start..start + row_len) };
            f(y as u32, row);
        }
    });
}
