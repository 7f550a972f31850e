//! The query engine: worker pool, job scheduling and query memoisation.
//!
//! A query is a plain function `fn(args, &mut JobsBuilder<R>, &Arc<UnitCtx>)
//! -> T` that describes its work as a list of jobs. The engine memoises each
//! query under a signature built from the function's address, the unit
//! context id and a hash of the arguments; freshness across incremental
//! passes is tracked with a coloured dependency DAG (see [`cache`]).

pub mod cache;
mod job;
mod prefs;
mod unit;
mod worker;

use std::any::Any;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::base::text;
use crate::message::{AbortCompilation, Diagnostic, MessageClass, MessageInfo, MessageKind};

use cache::{QueryCacheHead, QuerySignature};

pub use job::{BasicJob, JobCollection, JobsBuilder, STATUS_EXE, STATUS_FIN, STATUS_FREE};
pub use prefs::{PrefType, PrefValue};
pub use unit::UnitCtx;
pub use worker::Worker;

/// The shape every query function has.
pub type QueryFn<A, R, T> = fn(A, &mut JobsBuilder<R>, &Arc<UnitCtx>) -> T;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("at least one worker is required")]
    NoWorkers,
}

#[derive(Default)]
struct JobQueue {
    open_jobs: Vec<Arc<BasicJob>>,
    /// True while no free jobs exist; helps waking threads when new jobs
    /// occur.
    no_jobs: bool,
}

/// Manages compilation queries, jobs, workers and settings.
pub struct GlobalCtx {
    workers: Mutex<Vec<Arc<Worker>>>,

    /// Guards `open_jobs`/`no_jobs`. Acquired before the query-cache mutex
    /// whenever both are needed; never held across a condvar wait on
    /// anything but `jobs_cv`.
    job_mtx: Mutex<JobQueue>,
    jobs_cv: Condvar,
    /// Set by `abort_compilation`, cleared by `reset`. Prevents new jobs.
    abort_new_jobs: AtomicBool,

    query_cache: Mutex<FxHashMap<QuerySignature, Arc<QueryCacheHead>>>,

    prefs: Mutex<prefs::PrefMap>,

    /// All compilation unit files seen this pass; index = unit id.
    known_files: Mutex<Vec<Arc<str>>>,

    diagnostics: Mutex<Vec<Diagnostic>>,
    pub error_count: AtomicUsize,
    pub warning_count: AtomicUsize,
    pub notification_count: AtomicUsize,
    pub max_allowed_errors: AtomicUsize,
    pub max_allowed_warnings: AtomicUsize,
    pub max_allowed_notifications: AtomicUsize,
}

impl Default for GlobalCtx {
    fn default() -> Self {
        Self {
            workers: Mutex::new(Vec::new()),
            job_mtx: Mutex::new(JobQueue::default()),
            jobs_cv: Condvar::new(),
            abort_new_jobs: AtomicBool::new(false),
            query_cache: Mutex::new(FxHashMap::default()),
            prefs: Mutex::new(prefs::PrefMap::default()),
            known_files: Mutex::new(Vec::new()),
            diagnostics: Mutex::new(Vec::new()),
            error_count: AtomicUsize::new(0),
            warning_count: AtomicUsize::new(0),
            notification_count: AtomicUsize::new(0),
            max_allowed_errors: AtomicUsize::new(256),
            max_allowed_warnings: AtomicUsize::new(256),
            max_allowed_notifications: AtomicUsize::new(256),
        }
    }
}

impl GlobalCtx {
    pub fn new() -> Arc<GlobalCtx> {
        Arc::new(GlobalCtx::default())
    }

    /// Initialize the whole compiler infrastructure and return the main
    /// worker. `thread_count` is the total amount of workers including the
    /// calling thread.
    pub fn setup(
        self: &Arc<Self>,
        thread_count: usize,
        cache_reserve: usize,
    ) -> Result<Arc<Worker>, EngineError> {
        if thread_count < 1 {
            tracing::error!("must be at least one worker");
            return Err(EngineError::NoWorkers);
        }

        {
            let mut prefs = self.prefs.lock();
            prefs::set_default_preferences(&mut prefs);
        }
        self.update_global_prefs();
        self.error_count.store(0, Ordering::SeqCst);
        self.warning_count.store(0, Ordering::SeqCst);
        self.notification_count.store(0, Ordering::SeqCst);

        self.query_cache.lock().reserve(cache_reserve);

        let root_unit = self.global_unit_ctx();
        let main_worker = Worker::new(self, 0, root_unit.clone());
        {
            let mut workers = self.workers.lock();
            workers.clear();
            workers.push(main_worker.clone());
            for id in 1..thread_count {
                let worker = Worker::new(self, id, root_unit.clone());
                worker.work();
                workers.push(worker);
            }
        }

        self.reset();
        Ok(main_worker)
    }

    /// The root unit context. Use it only to create new build queries.
    pub fn global_unit_ctx(self: &Arc<Self>) -> Arc<UnitCtx> {
        UnitCtx::new(Arc::from(""), self)
    }

    /// Register a unit file and return its stable id.
    pub(crate) fn intern_known_file(&self, file: &Arc<str>) -> usize {
        let mut files = self.known_files.lock();
        if let Some(idx) = files.iter().position(|f| f.as_ref() == file.as_ref()) {
            return idx;
        }
        files.push(file.clone());
        files.len() - 1
    }

    /// Prepare a new incremental pass: GREEN entries become UNDECIDED, any
    /// volatile entry becomes VOLATILE_RED, and the abort flag is cleared.
    pub fn reset(&self) {
        self.abort_new_jobs.store(false, Ordering::SeqCst);

        let cache = self.query_cache.lock();
        for head in cache.values() {
            let state = head.state.load(Ordering::SeqCst);
            if state == cache::STATE_GREEN {
                head.state.store(cache::STATE_UNDECIDED, Ordering::SeqCst);
            } else if state & 0b010 != 0 {
                head.state.store(cache::STATE_VOLATILE_RED, Ordering::SeqCst);
            }
        }
    }

    /// Create a new query in the calling worker's unit context. The first
    /// job of the returned collection is reserved for the calling worker
    /// and is not in the open-job list.
    pub fn query<A, R, T>(
        self: &Arc<Self>,
        func: QueryFn<A, R, T>,
        w_ctx: &Worker,
        args: A,
    ) -> Result<Arc<JobCollection<R, T>>, AbortCompilation>
    where
        A: Hash,
        R: Clone + Send + Sync + 'static,
        T: Clone + Send + Sync + 'static,
    {
        let unit = w_ctx.unit_ctx();
        self.query_for_unit(func, w_ctx, &unit, args)
    }

    /// Create a new query under an explicit unit context (used by the
    /// driver to start per-file build queries).
    pub fn query_for_unit<A, R, T>(
        self: &Arc<Self>,
        func: QueryFn<A, R, T>,
        w_ctx: &Worker,
        unit: &Arc<UnitCtx>,
        args: A,
    ) -> Result<Arc<JobCollection<R, T>>, AbortCompilation>
    where
        A: Hash,
        R: Clone + Send + Sync + 'static,
        T: Clone + Send + Sync + 'static,
    {
        if self.abort_new_jobs.load(Ordering::SeqCst) {
            return Err(AbortCompilation);
        }

        let unit = unit.clone();
        let sig = QuerySignature::new(func as usize, unit.id, &args);

        let head = {
            let mut cache = self.query_cache.lock();
            cache
                .entry(sig)
                .or_insert_with(|| Arc::new(QueryCacheHead::new(sig)))
                .clone()
        };

        // Record the sub-DAG link from the calling query.
        if let Some(parent_sig) = w_ctx.curr_job_sig() {
            if parent_sig != sig {
                let parent = self.query_cache.lock().get(&parent_sig).cloned();
                if let Some(parent) = parent {
                    parent.sub_dag.lock().push(head.clone());
                }
            }
        }

        if !cache::requires_run(&head) {
            let cached = head.collection.lock().clone();
            if let Some(cached) = cached {
                let any: Arc<dyn Any + Send + Sync> = cached;
                match any.downcast::<JobCollection<R, T>>() {
                    Ok(jc) => {
                        tracing::trace!(?sig, "using cached query result");
                        return Ok(jc);
                    }
                    Err(_) => {
                        tracing::warn!(?sig, "query signature collision, re-running");
                    }
                }
            }
        } else {
            tracing::trace!(?sig, "updating cached query");
        }

        // Build a new job collection through the query function.
        let mut builder = JobsBuilder::new(sig, unit.clone());
        let query_result = func(args, &mut builder, &unit);
        let (jobs, slots) = builder.into_parts();
        let jc = Arc::new(JobCollection {
            g_ctx: Arc::downgrade(self),
            sig,
            jobs,
            slots,
            query_result: Mutex::new(Some(query_result)),
        });

        head.mark_red();
        head.sub_dag.lock().clear();
        let erased: Arc<dyn Any + Send + Sync> = jc.clone();
        *head.collection.lock() = Some(erased);

        {
            let mut queue = self.job_mtx.lock();
            for job in jc.jobs.iter().skip(1) {
                queue.open_jobs.push(job.clone());
            }
            if jc.jobs.len() > 1 {
                queue.no_jobs = false;
            }
        }
        self.jobs_cv.notify_all();
        self.notify_workers();

        Ok(jc)
    }

    /// Pop a free job from the open-job stack. Stale jobs (already claimed
    /// or finished) are skipped with a warning.
    pub fn get_free_job(&self) -> Option<Arc<BasicJob>> {
        let mut found = None;
        {
            let mut queue = self.job_mtx.lock();
            while let Some(top) = queue.open_jobs.last() {
                match top.status() {
                    STATUS_FREE => {
                        found = queue.open_jobs.pop();
                        break;
                    }
                    _ => {
                        tracing::warn!(job = top.id, "found stale job on the open-job stack");
                        queue.open_jobs.pop();
                    }
                }
            }
            if found.is_none() {
                queue.no_jobs = true;
            }
        }
        // Another job was probably finished before, so notify waiters.
        self.jobs_cv.notify_all();
        found
    }

    /// Cancel all waiting jobs and prevent new ones; every wait predicate
    /// observes the flag and raises the abort.
    pub fn abort_compilation(&self) {
        {
            let mut queue = self.job_mtx.lock();
            queue.open_jobs.pop();
            self.abort_new_jobs.store(true, Ordering::SeqCst);
        }
        self.jobs_cv.notify_all();
        self.notify_workers();
    }

    pub fn jobs_allowed(&self) -> bool {
        !self.abort_new_jobs.load(Ordering::SeqCst)
    }

    /// A collection calls this when all of its jobs finished: sets the GREEN
    /// bit for the cache entry.
    pub fn finish_job(&self, sig: &QuerySignature) {
        if let Some(head) = self.query_cache.lock().get(sig) {
            head.state.fetch_or(cache::STATE_GREEN, Ordering::SeqCst);
        }
    }

    /// Set the volatile bit for a cache entry.
    pub fn set_volatile_job(&self, sig: &QuerySignature) {
        if let Some(head) = self.query_cache.lock().get(sig) {
            head.state.fetch_or(cache::STATE_VOLATILE_RED, Ordering::SeqCst);
        }
    }

    pub(crate) fn notify_jobs(&self) {
        self.jobs_cv.notify_all();
    }

    fn notify_workers(&self) {
        for worker in self.workers.lock().iter() {
            worker.notify();
        }
    }

    /// Block on the jobs condition variable until `finished` reports true or
    /// the abort flag is set.
    pub fn wait_collection_finished(
        &self,
        finished: impl Fn() -> bool,
    ) -> Result<(), AbortCompilation> {
        let mut guard = self.job_mtx.lock();
        loop {
            if self.abort_new_jobs.load(Ordering::SeqCst) {
                return Err(AbortCompilation);
            }
            if finished() {
                return Ok(());
            }
            self.jobs_cv.wait(&mut guard);
        }
    }

    /// Wait until all workers have finished. Call only from the main thread.
    pub fn wait_finished(&self) {
        let workers: Vec<_> = self.workers.lock().clone();
        for worker in workers {
            worker.stop();
        }
    }

    // ------------------------------------------------------------------
    // Messages
    // ------------------------------------------------------------------

    /// Record a diagnostic. Fatal kinds return the abort error after being
    /// recorded; exceeding a message cap elevates the overflow to fatal.
    pub fn report(
        &self,
        kind: MessageKind,
        info: MessageInfo,
        notes: Vec<MessageInfo>,
        args: &[&str],
    ) -> Result<(), AbortCompilation> {
        let diagnostic = Diagnostic {
            kind,
            info,
            notes,
            text: kind.format(args),
        };
        tracing::debug!(message = %diagnostic.render());
        self.diagnostics.lock().push(diagnostic);

        let class = kind.class();
        let (count, max) = match class {
            MessageClass::Error | MessageClass::FatalError => {
                (&self.error_count, &self.max_allowed_errors)
            }
            MessageClass::Warning => (&self.warning_count, &self.max_allowed_warnings),
            MessageClass::Notification => {
                (&self.notification_count, &self.max_allowed_notifications)
            }
        };
        let seen = count.fetch_add(1, Ordering::SeqCst) + 1;
        if seen > max.load(Ordering::SeqCst) {
            self.diagnostics.lock().push(Diagnostic {
                kind: MessageKind::ErrTooManyMessages,
                info: MessageInfo::default(),
                notes: Vec::new(),
                text: MessageKind::ErrTooManyMessages.format(&[class.as_str()]),
            });
            self.abort_compilation();
            return Err(AbortCompilation);
        }

        if class == MessageClass::FatalError {
            self.abort_compilation();
            return Err(AbortCompilation);
        }
        Ok(())
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    // ------------------------------------------------------------------
    // Preferences
    // ------------------------------------------------------------------

    /// Read a preference; unset preferences yield `fallback` with a warning.
    pub fn get_pref_or(&self, key: PrefType, fallback: PrefValue) -> PrefValue {
        let prefs = self.prefs.lock();
        match prefs.get(&key) {
            Some(value) => value.clone(),
            None => {
                tracing::warn!(?key, "using preference which was not set before");
                fallback
            }
        }
    }

    /// Read a preference, storing and returning `default` when unset.
    pub fn get_pref_or_set(&self, key: PrefType, default: PrefValue) -> PrefValue {
        let mut prefs = self.prefs.lock();
        prefs.entry(key).or_insert(default).clone()
    }

    /// Store a new preference or overwrite an existing one.
    pub fn set_pref(&self, key: PrefType, value: PrefValue) {
        self.prefs.lock().insert(key, value);
    }

    /// Push the preferences that act as process-wide state: tab width and
    /// the message caps.
    pub fn update_global_prefs(&self) {
        let tab = self
            .get_pref_or_set(PrefType::TabSize, PrefValue::Size(4))
            .as_size();
        text::set_tab_width(tab);
        self.max_allowed_errors.store(
            self.get_pref_or_set(PrefType::MaxErrors, PrefValue::Size(256))
                .as_size(),
            Ordering::SeqCst,
        );
        self.max_allowed_warnings.store(
            self.get_pref_or_set(PrefType::MaxWarnings, PrefValue::Size(256))
                .as_size(),
            Ordering::SeqCst,
        );
        self.max_allowed_notifications.store(
            self.get_pref_or_set(PrefType::MaxNotifications, PrefValue::Size(256))
                .as_size(),
            Ordering::SeqCst,
        );
    }

    // ------------------------------------------------------------------
    // Triplet helpers for the CLI
    // ------------------------------------------------------------------

    /// The triplet slot a bare value belongs to, or "" when unknown.
    pub fn get_triplet_elem_name(value: &str) -> &'static str {
        match value {
            "x86" | "x86_64" | "arm" | "mips" | "8051" | "avr" | "aarch64" | "powerpc" => "arch",
            "windows" | "linux" | "darwin" | "bsd" | "fuchsia" | "webasm" | "dos" => "os",
            "pc" | "android" | "ios" | "macos" => "platform",
            "pe" | "elf" | "macho" => "format",
            "llvm" | "gcc" | "msvc" | "pushbnd" | "ctrans" => "backend",
            "glibc" | "musl" | "msvcrt" => "runtime",
            "static" | "dynamic" => "linkage",
            "debug" | "release" | "minsizerel" | "reldebinfo" => "build",
            _ => "",
        }
    }

    /// Index of a triplet slot name; one past the end when unknown.
    pub fn get_triplet_pos(name: &str) -> usize {
        match name {
            "arch" => 0,
            "os" => 1,
            "platform" => 2,
            "format" => 3,
            "backend" => 4,
            "runtime" => 5,
            "linkage" => 6,
            "build" => 7,
            _ => 8,
        }
    }
}

impl Drop for GlobalCtx {
    fn drop(&mut self) {
        self.wait_finished();
    }
}
