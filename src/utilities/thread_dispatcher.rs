use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::trace;

use crate::physics::error::SolverError;

/// Provides multithreading dispatch primitives and a thread count for the solver to use.
///
/// Work handed to a dispatch is already split into independent pieces: the bundles of one constraint color.
pub trait IThreadDispatcher: Sync {
    /// Gets the number of workers available in the thread dispatcher.
    fn thread_count(&self) -> usize;

    /// Splits `items` into at most `thread_count` contiguous chunks and runs `worker_body` once per chunk,
    /// returning after every chunk has been processed.
    ///
    /// `worker_body` receives the worker index and that worker's exclusive chunk.
    fn dispatch_chunks<T, F>(&self, items: &mut [T], worker_body: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync;
}

/// Runs all work inline on the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialDispatcher;

impl IThreadDispatcher for SequentialDispatcher {
    #[inline(always)]
    fn thread_count(&self) -> usize {
        1
    }

    fn dispatch_chunks<T, F>(&self, items: &mut [T], worker_body: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync,
    {
        if !items.is_empty() {
            worker_body(0, items);
        }
    }
}

/// Dispatches work onto a fixed pool of worker threads.
///
/// The pool is created once, in `new`. Each dispatch hands one chunk per worker to the pool through a
/// `rayon` scope and blocks until every chunk is done.
#[derive(Debug)]
pub struct ThreadPoolDispatcher {
    pool: ThreadPool,
}

impl ThreadPoolDispatcher {
    /// Creates a pool with the given number of workers. Zero is treated as one.
    pub fn new(thread_count: usize) -> Result<Self, SolverError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(thread_count.max(1))
            .thread_name(|index| format!("contact-worker-{index}"))
            .build()
            .map_err(|error| SolverError::ThreadPool(error.to_string()))?;
        Ok(Self { pool })
    }

    /// Creates a pool with one worker per available hardware thread.
    pub fn with_available_parallelism() -> Result<Self, SolverError> {
        let thread_count = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::new(thread_count)
    }
}

impl IThreadDispatcher for ThreadPoolDispatcher {
    #[inline(always)]
    fn thread_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    fn dispatch_chunks<T, F>(&self, items: &mut [T], worker_body: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync,
    {
        if items.is_empty() {
            return;
        }
        let worker_count = self.thread_count().min(items.len());
        if worker_count == 1 {
            worker_body(0, items);
            return;
        }
        let chunk_size = items.len().div_ceil(worker_count);
        trace!(worker_count, chunk_size, "dispatching workers");
        let worker_body = &worker_body;
        self.pool.scope(|scope| {
            for (worker_index, chunk) in items.chunks_mut(chunk_size).enumerate() {
                scope.spawn(move |_| worker_body(worker_index, chunk));
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    fn double_all<D: IThreadDispatcher>(dispatcher: &D, values: &mut [u32]) {
        dispatcher.dispatch_chunks(values, |_, chunk| {
            for value in chunk.iter_mut() {
                *value *= 2;
            }
        });
    }

    #[test]
    fn every_item_is_visited_exactly_once() {
        let mut sequential: Vec<u32> = (0..37).collect();
        let mut threaded = sequential.clone();
        double_all(&SequentialDispatcher, &mut sequential);
        double_all(&ThreadPoolDispatcher::new(4).unwrap(), &mut threaded);
        assert_eq!(sequential, threaded);
        assert_eq!(threaded[36], 72);
    }

    #[test]
    fn worker_indices_stay_below_thread_count() {
        let dispatcher = ThreadPoolDispatcher::new(3).unwrap();
        let mut slots = vec![usize::MAX; 10];
        dispatcher.dispatch_chunks(&mut slots, |worker_index, chunk| {
            for slot in chunk.iter_mut() {
                *slot = worker_index;
            }
        });
        assert!(slots.iter().all(|&w| w < 3));
        assert_eq!(ThreadPoolDispatcher::new(0).unwrap().thread_count(), 1);
    }

    #[test]
    fn repeated_dispatches_reuse_the_same_workers() {
        let dispatcher = ThreadPoolDispatcher::new(4).unwrap();
        let threads = Mutex::new(HashSet::new());
        let mut items = vec![0u32; 16];
        for _ in 0..10 {
            dispatcher.dispatch_chunks(&mut items, |_, chunk| {
                threads.lock().unwrap().insert(std::thread::current().id());
                for item in chunk.iter_mut() {
                    *item += 1;
                }
            });
        }
        assert!(items.iter().all(|&item| item == 10));
        let distinct = threads.lock().unwrap().len();
        assert!((1..=4).contains(&distinct), "{distinct} threads ran work");
    }
}
