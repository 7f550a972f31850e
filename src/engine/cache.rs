//! Query memoisation: signatures, cache heads and the coloured freshness
//! check over the sub-query DAG.

use std::any::Any;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHasher;

/// Identifies one query invocation: the query function's address, the unit
/// context it runs for, and a hash over its argument tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuerySignature {
    pub func: usize,
    pub unit: usize,
    pub args: u64,
}

impl QuerySignature {
    pub fn new<A: Hash>(func: usize, unit: usize, args: &A) -> Self {
        let mut hasher = FxHasher::default();
        args.hash(&mut hasher);
        Self {
            func,
            unit,
            args: hasher.finish(),
        }
    }
}

/// Cache states. The low bit encodes "valid cached value present", the
/// middle bit encodes "volatile" (re-run on the next incremental pass no
/// matter what).
pub const STATE_UNDECIDED: u8 = 0b000;
pub const STATE_RED: u8 = 0b001;
pub const STATE_VOLATILE_RED: u8 = 0b011;
pub const STATE_GREEN: u8 = 0b101;
pub const STATE_VOLATILE_GREEN: u8 = 0b111;

/// Stores meta information about one cached query.
pub struct QueryCacheHead {
    pub sig: QuerySignature,
    pub state: AtomicU8,
    /// Queries which were called from within this query.
    pub sub_dag: Mutex<Vec<Arc<QueryCacheHead>>>,
    /// The cached job collection, type-erased; downcast on a hit.
    pub collection: Mutex<Option<Arc<dyn Any + Send + Sync>>>,
}

impl QueryCacheHead {
    pub fn new(sig: QuerySignature) -> Self {
        Self {
            sig,
            state: AtomicU8::new(STATE_RED),
            sub_dag: Mutex::new(Vec::new()),
            collection: Mutex::new(None),
        }
    }

    /// Start a fresh run: drop the green bit but keep the volatile bit.
    pub fn mark_red(&self) {
        let mut state = self.state.load(Ordering::SeqCst);
        loop {
            let next = STATE_RED | (state & 0b010);
            match self
                .state
                .compare_exchange(state, next, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return,
                Err(actual) => state = actual,
            }
        }
    }
}

/// Recursive freshness check.
///
/// GREEN (or volatile green) entries are up to date; RED entries must
/// re-run; UNDECIDED entries must re-run iff any sub-entry must, and are
/// demoted to RED when that is the case.
pub fn requires_run(head: &QueryCacheHead) -> bool {
    let state = head.state.load(Ordering::SeqCst);
    if state >= STATE_GREEN {
        false
    } else if state >= STATE_RED {
        true
    } else {
        let subs = head.sub_dag.lock().clone();
        for sub in &subs {
            if requires_run(sub) {
                head.state.store(STATE_RED, Ordering::SeqCst);
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head(state: u8) -> Arc<QueryCacheHead> {
        let h = QueryCacheHead::new(QuerySignature::new(0, 0, &()));
        h.state.store(state, Ordering::SeqCst);
        Arc::new(h)
    }

    #[test]
    fn test_signature_distinguishes_args() {
        let a = QuerySignature::new(1, 0, &"x");
        let b = QuerySignature::new(1, 0, &"y");
        let c = QuerySignature::new(1, 0, &"x");
        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_requires_run_basic_states() {
        assert!(!requires_run(&head(STATE_GREEN)));
        assert!(!requires_run(&head(STATE_VOLATILE_GREEN)));
        assert!(requires_run(&head(STATE_RED)));
        assert!(requires_run(&head(STATE_VOLATILE_RED)));
        assert!(!requires_run(&head(STATE_UNDECIDED)));
    }

    #[test]
    fn test_undecided_demoted_by_dirty_sub() {
        let parent = head(STATE_UNDECIDED);
        parent.sub_dag.lock().push(head(STATE_RED));
        assert!(requires_run(&parent));
        assert_eq!(parent.state.load(Ordering::SeqCst), STATE_RED);
    }

    #[test]
    fn test_undecided_stays_clean_with_green_subs() {
        let parent = head(STATE_UNDECIDED);
        parent.sub_dag.lock().push(head(STATE_GREEN));
        assert!(!requires_run(&parent));
        assert_eq!(parent.state.load(Ordering::SeqCst), STATE_UNDECIDED);
    }

    #[test]
    fn test_mark_red_preserves_volatile() {
        let h = head(STATE_VOLATILE_GREEN);
        h.mark_red();
        assert_eq!(h.state.load(Ordering::SeqCst), STATE_VOLATILE_RED);
        let h = head(STATE_GREEN);
        h.mark_red();
        assert_eq!(h.state.load(Ordering::SeqCst), STATE_RED);
    }
}
