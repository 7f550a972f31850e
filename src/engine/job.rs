//! Jobs, job collections and the builder queries use to create them.

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::message::AbortCompilation;

use super::cache::QuerySignature;
use super::unit::UnitCtx;
use super::worker::Worker;
use super::GlobalCtx;

pub const STATUS_FREE: u8 = 0;
pub const STATUS_EXE: u8 = 1;
pub const STATUS_FIN: u8 = 2;

static NEXT_JOB_ID: AtomicUsize = AtomicUsize::new(1);

type Task = Box<dyn FnOnce(&Worker) -> Result<(), AbortCompilation> + Send>;

/// One schedulable unit of work. The status advances monotonically
/// FREE → EXE → FIN; the compare-and-set from FREE to EXE guarantees the
/// task runs at most once across all workers.
pub struct BasicJob {
    pub id: usize,
    pub status: AtomicU8,
    /// Signature of the query this job belongs to.
    pub sig: QuerySignature,
    /// Unit context the job runs under.
    pub ctx: Arc<UnitCtx>,
    task: Mutex<Option<Task>>,
}

impl BasicJob {
    fn new(sig: QuerySignature, ctx: Arc<UnitCtx>, task: Task) -> Arc<BasicJob> {
        Arc::new(BasicJob {
            id: NEXT_JOB_ID.fetch_add(1, Ordering::Relaxed),
            status: AtomicU8::new(STATUS_FREE),
            sig,
            ctx,
            task: Mutex::new(Some(task)),
        })
    }

    pub fn status(&self) -> u8 {
        self.status.load(Ordering::SeqCst)
    }

    /// Execute the job on this worker if it is still free. Returns `Ok(true)`
    /// when this call ran the task. An aborting task still transitions the
    /// job to FIN before the abort propagates.
    pub fn run(self: &Arc<Self>, w_ctx: &Worker) -> Result<bool, AbortCompilation> {
        if self
            .status
            .compare_exchange(STATUS_FREE, STATUS_EXE, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Ok(false);
        }
        let task = self.task.lock().take();
        let previous = w_ctx.swap_curr_job(Some(self.clone()));
        let outcome = match task {
            Some(task) => task(w_ctx),
            None => Ok(()),
        };
        w_ctx.swap_curr_job(previous);
        self.status.store(STATUS_FIN, Ordering::SeqCst);
        if let Some(g_ctx) = w_ctx.try_global_ctx() {
            g_ctx.notify_jobs();
        }
        outcome.map(|_| true)
    }
}

/// Builds the job list for one query.
///
/// `R` is the artefact type of the query's jobs; every job writes its result
/// into a typed slot owned by the collection.
pub struct JobsBuilder<R> {
    sig: QuerySignature,
    ctx: Arc<UnitCtx>,
    jobs: Vec<Arc<BasicJob>>,
    slots: Vec<Arc<Mutex<Option<R>>>>,
}

impl<R: Send + 'static> JobsBuilder<R> {
    pub(super) fn new(sig: QuerySignature, ctx: Arc<UnitCtx>) -> Self {
        Self {
            sig,
            ctx,
            jobs: Vec::new(),
            slots: Vec::new(),
        }
    }

    /// Add a new job body.
    pub fn add_job<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&Worker) -> Result<R, AbortCompilation> + Send + 'static,
    {
        let slot = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&slot);
        let task: Task = Box::new(move |w_ctx| {
            let result = f(w_ctx)?;
            *sink.lock() = Some(result);
            Ok(())
        });
        self.jobs.push(BasicJob::new(self.sig, self.ctx.clone(), task));
        self.slots.push(slot);
        self
    }

    /// Switch the unit context for all following jobs. Already created jobs
    /// keep the old context; the query signature is unchanged.
    pub fn switch_context(&mut self, ctx: Arc<UnitCtx>) {
        self.ctx = ctx;
    }

    pub(super) fn into_parts(self) -> (Vec<Arc<BasicJob>>, Vec<Arc<Mutex<Option<R>>>>) {
        (self.jobs, self.slots)
    }
}

/// The jobs of one query plus their typed result slots and the query-level
/// result (which is distinct from any job's result).
///
/// The first job is reserved for the calling worker by convention and is
/// never put onto the open-job stack.
pub struct JobCollection<R, T = ()> {
    pub(super) g_ctx: Weak<GlobalCtx>,
    pub(super) sig: QuerySignature,
    pub jobs: Vec<Arc<BasicJob>>,
    pub(super) slots: Vec<Arc<Mutex<Option<R>>>>,
    pub(super) query_result: Mutex<Option<T>>,
}

impl<R, T> JobCollection<R, T>
where
    R: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// True when every job is done. Observing completion notifies the query
    /// cache; callers must use this method to enable caching.
    pub fn is_finished(&self) -> bool {
        let finished = self.jobs.iter().all(|j| j.status() == STATUS_FIN);
        if finished {
            if let Some(g_ctx) = self.g_ctx.upgrade() {
                g_ctx.finish_job(&self.sig);
            }
        }
        finished
    }

    /// Work on open jobs until the collection is finished. The first
    /// (reserved) job runs on the calling worker, then the remaining jobs
    /// are claimed one by one. With `prevent_idle`, jobs from the global
    /// open stack are stolen while peers still work on this collection.
    pub fn execute(
        self: &Arc<Self>,
        w_ctx: &Worker,
        prevent_idle: bool,
    ) -> Result<Arc<Self>, AbortCompilation> {
        for job in &self.jobs {
            job.run(w_ctx)?;
        }
        if prevent_idle {
            if let Some(g_ctx) = self.g_ctx.upgrade() {
                while !self.is_finished() {
                    match g_ctx.get_free_job() {
                        Some(job) => {
                            job.run(w_ctx)?;
                        }
                        None => break,
                    }
                }
            }
        }
        Ok(Arc::clone(self))
    }

    /// Wait until all jobs have been finished, without busy waiting.
    pub fn wait(self: &Arc<Self>) -> Result<Arc<Self>, AbortCompilation> {
        let g_ctx = self.g_ctx.upgrade().ok_or(AbortCompilation)?;
        let this = Arc::clone(self);
        g_ctx.wait_collection_finished(move || this.is_finished())?;
        Ok(Arc::clone(self))
    }

    /// Result of job `idx`. `Err` when the job was unwound by an abort.
    pub fn job_result(&self, idx: usize) -> Result<R, AbortCompilation> {
        self.slots
            .get(idx)
            .and_then(|slot| slot.lock().clone())
            .ok_or(AbortCompilation)
    }

    pub fn first_result(&self) -> Result<R, AbortCompilation> {
        self.job_result(0)
    }

    pub fn last_result(&self) -> Result<R, AbortCompilation> {
        if self.slots.is_empty() {
            return Err(AbortCompilation);
        }
        self.job_result(self.slots.len() - 1)
    }

    /// The result of the query builder itself. Not from a job.
    pub fn get(&self) -> Option<T> {
        self.query_result.lock().clone()
    }
}
