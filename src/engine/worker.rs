//! Workers execute jobs, each on its own thread.

use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::JoinHandle;

use parking_lot::{Condvar, Mutex};

use crate::message::{AbortCompilation, MessageInfo, MessageKind};

use super::job::{BasicJob, JobCollection};
use super::unit::UnitCtx;
use super::{GlobalCtx, QueryFn};

/// Executes jobs on its thread. Worker 0 is the caller of
/// [`GlobalCtx::setup`] and has no owned thread; it only runs jobs
/// synchronously through [`JobCollection::execute`].
pub struct Worker {
    pub id: usize,
    g_ctx: Weak<GlobalCtx>,
    thread: Mutex<Option<JoinHandle<()>>>,
    finish: AtomicBool,
    mtx: Mutex<()>,
    cv: Condvar,
    curr_job: Mutex<Option<Arc<BasicJob>>>,
    /// Unit context used when no job is running (top-level queries).
    root_unit: Arc<UnitCtx>,
}

impl Worker {
    pub(super) fn new(g_ctx: &Arc<GlobalCtx>, id: usize, root_unit: Arc<UnitCtx>) -> Arc<Worker> {
        Arc::new(Worker {
            id,
            g_ctx: Arc::downgrade(g_ctx),
            thread: Mutex::new(None),
            finish: AtomicBool::new(false),
            mtx: Mutex::new(()),
            cv: Condvar::new(),
            curr_job: Mutex::new(None),
            root_unit,
        })
    }

    pub(super) fn try_global_ctx(&self) -> Option<Arc<GlobalCtx>> {
        self.g_ctx.upgrade()
    }

    /// The global context. Fails with an abort when the engine is already
    /// torn down.
    pub fn global_ctx(&self) -> Result<Arc<GlobalCtx>, AbortCompilation> {
        self.g_ctx.upgrade().ok_or(AbortCompilation)
    }

    /// The unit context of the currently running job, or the root unit
    /// context between jobs.
    pub fn unit_ctx(&self) -> Arc<UnitCtx> {
        self.curr_job
            .lock()
            .as_ref()
            .map(|job| job.ctx.clone())
            .unwrap_or_else(|| self.root_unit.clone())
    }

    pub(super) fn swap_curr_job(&self, job: Option<Arc<BasicJob>>) -> Option<Arc<BasicJob>> {
        std::mem::replace(&mut *self.curr_job.lock(), job)
    }

    pub(super) fn curr_job_sig(&self) -> Option<super::cache::QuerySignature> {
        self.curr_job.lock().as_ref().map(|job| job.sig)
    }

    /// Mark the currently running job's cache entry volatile; it will be
    /// re-executed on every incremental pass.
    pub fn set_curr_job_volatile(&self) {
        if let (Some(sig), Some(g_ctx)) = (self.curr_job_sig(), self.g_ctx.upgrade()) {
            g_ctx.set_volatile_job(&sig);
        }
    }

    /// Create a new query (see [`GlobalCtx::query`]).
    pub fn query<A, R, T>(
        &self,
        func: QueryFn<A, R, T>,
        args: A,
    ) -> Result<Arc<JobCollection<R, T>>, AbortCompilation>
    where
        A: Hash,
        R: Clone + Send + Sync + 'static,
        T: Clone + Send + Sync + 'static,
    {
        self.global_ctx()?.query(func, self, args)
    }

    /// Shortcut for query → execute → wait.
    pub fn do_query<A, R, T>(
        &self,
        func: QueryFn<A, R, T>,
        args: A,
    ) -> Result<Arc<JobCollection<R, T>>, AbortCompilation>
    where
        A: Hash,
        R: Clone + Send + Sync + 'static,
        T: Clone + Send + Sync + 'static,
    {
        let jc = self.query(func, args)?;
        jc.execute(self, true)?;
        jc.wait()
    }

    /// Record a diagnostic on the global context. Fatal kinds (and cap
    /// overflows) return the abort error for propagation with `?`.
    pub fn report(
        &self,
        kind: MessageKind,
        info: MessageInfo,
        notes: Vec<MessageInfo>,
        args: &[&str],
    ) -> Result<(), AbortCompilation> {
        self.global_ctx()?.report(kind, info, notes, args)
    }

    /// Start the worker thread, pulling free jobs from the engine.
    pub(super) fn work(self: &Arc<Self>) {
        let me = Arc::clone(self);
        let spawned = std::thread::Builder::new()
            .name(format!("pushc-worker-{}", self.id))
            .spawn(move || me.run_loop());
        match spawned {
            Ok(handle) => *self.thread.lock() = Some(handle),
            Err(err) => tracing::error!(worker = self.id, %err, "could not spawn worker thread"),
        }
    }

    // The engine is only borrowed per step; holding it across the condvar
    // wait would keep the engine alive from its own worker threads.
    fn run_loop(self: Arc<Self>) {
        let mut job = match self.g_ctx.upgrade() {
            Some(g_ctx) => g_ctx.get_free_job(),
            None => return,
        };
        while !self.finish.load(Ordering::SeqCst) {
            while let Some(next) = job.take() {
                if next.run(&self).is_err() {
                    // Aborted: drop the job and fall through to the wait.
                    break;
                }
                match self.g_ctx.upgrade() {
                    Some(g_ctx) => job = g_ctx.get_free_job(),
                    None => return,
                }
            }

            let mut guard = self.mtx.lock();
            while !self.finish.load(Ordering::SeqCst) {
                let Some(g_ctx) = self.g_ctx.upgrade() else {
                    return;
                };
                if let Some(next) = g_ctx.get_free_job() {
                    job = Some(next);
                    break;
                }
                drop(g_ctx);
                self.cv.wait(&mut guard);
            }
        }
    }

    /// Notify the thread that new jobs exist.
    pub(super) fn notify(&self) {
        let _guard = self.mtx.lock();
        self.cv.notify_all();
    }

    /// Stop the worker thread and block until it exits. The main worker has
    /// no thread object, so this is a no-op for it.
    pub(super) fn stop(&self) {
        let handle = self.thread.lock().take();
        if let Some(handle) = handle {
            {
                let _guard = self.mtx.lock();
                self.finish.store(true, Ordering::SeqCst);
            }
            self.cv.notify_all();
            if handle.join().is_err() {
                tracing::error!(worker = self.id, "worker thread panicked");
            }
        }
    }
}
