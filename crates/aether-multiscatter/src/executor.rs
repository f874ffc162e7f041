//! Row-partitioned parallel-for over a 2D output grid.
//!
//! Every executor splits the output buffer into disjoint rows with
//! `chunks_mut`, so each texel is owned by exactly one unit of work and no
//! locking or shared counters are needed.

use std::thread;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LutError;

/// Strategy for visiting every row of a row-major grid exactly once.
pub trait GridExecutor {
    /// Call `row(y, cells)` once for every `width`-long row of `out`.
    ///
    /// Rows may run in any order and concurrently. A trailing partial row is
    /// passed as-is. An empty buffer or zero width is a no-op.
    fn for_each_row<T, F>(&self, out: &mut [T], width: usize, row: F) -> Result<(), LutError>
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync;
}

/// Runs every row on the calling thread, top to bottom.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialExecutor;

impl GridExecutor for SequentialExecutor {
    fn for_each_row<T, F>(&self, out: &mut [T], width: usize, row: F) -> Result<(), LutError>
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync,
    {
        if width == 0 {
            return Ok(());
        }
        for (y, cells) in out.chunks_mut(width).enumerate() {
            row(y, cells);
        }
        Ok(())
    }
}

/// Distributes rows over the global rayon pool.
#[derive(Clone, Copy, Debug, Default)]
pub struct RayonExecutor;

impl GridExecutor for RayonExecutor {
    fn for_each_row<T, F>(&self, out: &mut [T], width: usize, row: F) -> Result<(), LutError>
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync,
    {
        if width == 0 {
            return Ok(());
        }
        out.par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, cells)| row(y, cells));
        Ok(())
    }
}

/// Scoped worker threads, each owning a contiguous band of rows.
#[derive(Clone, Copy, Debug)]
pub struct ThreadPoolExecutor {
    threads: usize,
}

impl ThreadPoolExecutor {
    /// `threads == 0` uses one worker per logical CPU.
    pub fn new(threads: usize) -> Self {
        let threads = if threads == 0 { num_cpus::get() } else { threads };
        Self {
            threads: threads.max(1),
        }
    }

    pub fn threads(&self) -> usize {
        self.threads
    }
}

impl Default for ThreadPoolExecutor {
    fn default() -> Self {
        Self::new(0)
    }
}

impl GridExecutor for ThreadPoolExecutor {
    fn for_each_row<T, F>(&self, out: &mut [T], width: usize, row: F) -> Result<(), LutError>
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync,
    {
        if width == 0 || out.is_empty() {
            return Ok(());
        }

        let rows = out.len().div_ceil(width);
        let workers = self.threads.min(rows);
        let rows_per_worker = rows.div_ceil(workers);
        let row = &row;
        debug!(rows, workers, rows_per_worker, "dispatching LUT rows");

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            let mut spawn_error = None;

            for (worker, band) in out.chunks_mut(width * rows_per_worker).enumerate() {
                let first_row = worker * rows_per_worker;
                let spawned = thread::Builder::new()
                    .name(format!("lut-worker-{worker}"))
                    .spawn_scoped(scope, move || {
                        for (offset, cells) in band.chunks_mut(width).enumerate() {
                            row(first_row + offset, cells);
                        }
                    });
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(err) => {
                        spawn_error = Some(err);
                        break;
                    }
                }
            }

            // join everything before reporting so no panic escapes the scope
            let panicked = handles
                .into_iter()
                .map(|handle| handle.join())
                .filter(Result::is_err)
                .count();

            if let Some(err) = spawn_error {
                return Err(LutError::WorkerSpawn(err));
            }
            if panicked > 0 {
                return Err(LutError::WorkerPanicked);
            }
            Ok(())
        })
    }
}

/// Serializable executor choice, resolved at run time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Executor {
    Sequential,
    #[default]
    Rayon,
    /// Dedicated scoped threads; 0 means one per logical CPU.
    Threads(usize),
}

impl GridExecutor for Executor {
    fn for_each_row<T, F>(&self, out: &mut [T], width: usize, row: F) -> Result<(), LutError>
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync,
    {
        match *self {
            Self::Sequential => SequentialExecutor.for_each_row(out, width, row),
            Self::Rayon => RayonExecutor.for_each_row(out, width, row),
            Self::Threads(threads) => ThreadPoolExecutor::new(threads).for_each_row(out, width, row),
        }
    }
}
