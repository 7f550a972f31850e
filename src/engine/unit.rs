//! Per-compilation-unit context.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::prelude::PreludeConfig;

use super::GlobalCtx;

/// The context of one compilation unit.
///
/// Holds a non-owning reference back to the global context; sub-queries from
/// a worker inherit the caller's unit context unless the job explicitly
/// switches it.
pub struct UnitCtx {
    /// Main file of this compilation unit.
    pub root_file: Arc<str>,
    /// Uniquely identifies this compilation unit.
    pub id: usize,
    g_ctx: Weak<GlobalCtx>,
    /// Prelude configuration loaded for this unit.
    pub prelude_conf: RwLock<Arc<PreludeConfig>>,
}

impl UnitCtx {
    pub fn new(root_file: Arc<str>, g_ctx: &Arc<GlobalCtx>) -> Arc<UnitCtx> {
        let id = g_ctx.intern_known_file(&root_file);
        Arc::new(UnitCtx {
            root_file,
            id,
            g_ctx: Arc::downgrade(g_ctx),
            prelude_conf: RwLock::new(Arc::new(PreludeConfig::default())),
        })
    }

    pub fn global_ctx(&self) -> Option<Arc<GlobalCtx>> {
        self.g_ctx.upgrade()
    }

    pub fn prelude_conf(&self) -> Arc<PreludeConfig> {
        self.prelude_conf.read().clone()
    }

    pub fn set_prelude_conf(&self, conf: Arc<PreludeConfig>) {
        *self.prelude_conf.write() = conf;
    }
}
