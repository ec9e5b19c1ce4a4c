//! Search pipeline (spec §4.E, §5): a fixed thread topology — one walker,
//! two file-scan workers, one consumer — synchronized by named counting
//! semaphores, feeding a [`ResultStore`] the UI polls concurrently.
//!
//! Deliberately not built on `rayon`: the protocol below is a
//! single-slot rendezvous between four fixed roles (always exactly two
//! scan workers, each always assigned half of the same file), not a
//! work-stealing pool over an open set of tasks — rayon has no primitive
//! for "exactly two workers, same file, every time." The semaphore itself
//! is the textbook `Mutex` + `Condvar` construction (the pattern shown in
//! the standard library's own `Condvar` documentation), since no crate in
//! the dependency stack provides one.

use crate::config::FilterSet;
use crate::error::PipelineError;
use crate::matcher::Matcher;
use crate::scanner;
use crate::store::ResultStore;
use crate::types::{LineNo, Truncated};
use crate::walker;
use memmap2::Mmap;
use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

/// A hand-rolled counting semaphore (spec §5: "synchronized by named
/// counting semaphores").
struct Semaphore {
    count: Mutex<usize>,
    condvar: Condvar,
}

impl Semaphore {
    fn new(initial: usize) -> Self {
        Self {
            count: Mutex::new(initial),
            condvar: Condvar::new(),
        }
    }

    fn acquire(&self) {
        let mut count = self.count.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        while *count == 0 {
            count = self.condvar.wait(count).unwrap_or_else(std::sync::PoisonError::into_inner);
        }
        *count -= 1;
    }

    fn release(&self) {
        let mut count = self.count.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *count += 1;
        self.condvar.notify_one();
    }
}

/// One file's worth of scan input, shared read-only by both workers once
/// published. `None` (in [`Shared::current`]) is the shutdown sentinel
/// emitted once after the walk completes.
struct FileJob {
    path: PathBuf,
    mmap: Option<Arc<Mmap>>,
    split: usize,
    second_start_line: u32,
}

struct Shared {
    current: Mutex<Option<Arc<FileJob>>>,
    /// Each worker writes only its own index; the consumer reads both
    /// after `work_done[0]` and `work_done[1]` have both been posted.
    results: [Mutex<Vec<(LineNo, Truncated)>>; 2],
    slot_free: Semaphore,
    work_ready: [Semaphore; 2],
    work_done: [Semaphore; 2],
}

/// Handle to a running pipeline; join it once the search is over.
pub struct PipelineHandle {
    threads: Vec<JoinHandle<()>>,
}

impl PipelineHandle {
    /// Blocks until every pipeline thread has exited.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::WorkerPanicked`] if any thread panicked.
    pub fn join(self) -> Result<(), PipelineError> {
        for t in self.threads {
            t.join().map_err(|_| PipelineError::WorkerPanicked)?;
        }
        Ok(())
    }
}

/// Starts the search pipeline: a walker thread, two scan-worker threads,
/// and a consumer thread, all feeding `store`. Returns immediately; the
/// caller (the UI loop) observes progress by polling `store`.
#[must_use]
pub fn spawn(
    root: PathBuf,
    matcher: Arc<Matcher>,
    filters: Arc<FilterSet>,
    store: Arc<ResultStore>,
) -> PipelineHandle {
    let shared = Arc::new(Shared {
        current: Mutex::new(None),
        results: [Mutex::new(Vec::new()), Mutex::new(Vec::new())],
        slot_free: Semaphore::new(1),
        work_ready: [Semaphore::new(0), Semaphore::new(0)],
        work_done: [Semaphore::new(0), Semaphore::new(0)],
    });

    let threads = vec![
        spawn_walker(Arc::clone(&shared), root, filters),
        spawn_worker(Arc::clone(&shared), 0, Arc::clone(&matcher)),
        spawn_worker(Arc::clone(&shared), 1, matcher),
        spawn_consumer(shared, store),
    ];

    PipelineHandle { threads }
}

fn publish(shared: &Shared, job: Option<Arc<FileJob>>) {
    let mut current = shared.current.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    *current = job;
}

fn spawn_walker(shared: Arc<Shared>, root: PathBuf, filters: Arc<FilterSet>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let _ = walker::walk(&root, &filters, |path| {
            shared.slot_free.acquire();

            let mapped = scanner::map_file(&path).ok().flatten();
            let (split, second_start_line) = mapped
                .as_deref()
                .map_or((0, 1), |data| scanner::compute_split(data));

            publish(
                &shared,
                Some(Arc::new(FileJob {
                    path,
                    mmap: mapped.map(Arc::new),
                    split,
                    second_start_line,
                })),
            );

            shared.work_ready[0].release();
            shared.work_ready[1].release();
        });

        // Shutdown sentinel: one final `None` job, seen by both workers
        // and the consumer on their next wakeup (spec §5/§7: the walk's
        // completion is what ends the pipeline).
        shared.slot_free.acquire();
        publish(&shared, None);
        shared.work_ready[0].release();
        shared.work_ready[1].release();
    })
}

fn spawn_worker(shared: Arc<Shared>, index: usize, matcher: Arc<Matcher>) -> JoinHandle<()> {
    std::thread::spawn(move || loop {
        shared.work_ready[index].acquire();

        let job = {
            let current = shared.current.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            current.clone()
        };

        let Some(job) = job else {
            shared.work_done[index].release();
            break;
        };

        let result = match &job.mmap {
            Some(mmap) => {
                let data: &[u8] = mmap;
                if index == 0 {
                    scanner::scan_range(&data[..job.split], 1, &matcher)
                } else {
                    scanner::scan_range(&data[job.split..], job.second_start_line, &matcher)
                }
            }
            None => Vec::new(),
        };

        *shared.results[index].lock().unwrap_or_else(std::sync::PoisonError::into_inner) = result;
        shared.work_done[index].release();
    })
}

fn spawn_consumer(shared: Arc<Shared>, store: Arc<ResultStore>) -> JoinHandle<()> {
    std::thread::spawn(move || loop {
        shared.work_done[0].acquire();
        shared.work_done[1].acquire();

        let job = {
            let current = shared.current.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            current.clone()
        };

        let Some(job) = job else {
            store.set_done();
            break;
        };

        let mut merged =
            std::mem::take(&mut *shared.results[0].lock().unwrap_or_else(std::sync::PoisonError::into_inner));
        merged.extend(std::mem::take(
            &mut *shared.results[1].lock().unwrap_or_else(std::sync::PoisonError::into_inner),
        ));

        // Single critical section per file (spec §5): a header is only
        // ever appended alongside at least one match line.
        if !merged.is_empty() {
            store.append_file(job.path.clone(), merged);
        }

        shared.slot_free.release();
    })
}
