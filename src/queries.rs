//! Basic queries: opening source inputs and fetching source lines.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::engine::{JobsBuilder, PrefType, PrefValue, UnitCtx, Worker};
use crate::input::{FileInput, SourceInput, StringInput};
use crate::message::{AbortCompilation, MessageInfo, MessageKind};

/// In-memory sources for the "debug" input preference, keyed by filename.
/// Tests register sources here and set `input_source` to "debug".
static DEBUG_SOURCES: Mutex<Option<FxHashMap<String, String>>> = Mutex::new(None);

/// Register an in-memory source for the "debug" input preference.
pub fn register_debug_source(file: impl Into<String>, source: impl Into<String>) {
    DEBUG_SOURCES
        .lock()
        .get_or_insert_with(FxHashMap::default)
        .insert(file.into(), source.into());
}

fn debug_source(file: &str) -> Option<String> {
    DEBUG_SOURCES
        .lock()
        .as_ref()
        .and_then(|map| map.get(file).cloned())
}

/// Open the source input for a file, honouring the `input_source`
/// preference.
pub fn get_source_input(
    file: Arc<str>,
    w_ctx: &Worker,
) -> Result<Box<dyn SourceInput>, AbortCompilation> {
    let g_ctx = w_ctx.global_ctx()?;
    let pref = g_ctx.get_pref_or(PrefType::InputSource, PrefValue::Str("file".into()));
    match pref.as_str() {
        "file" => {
            if !FileInput::exists(file.as_ref()) {
                w_ctx.report(
                    MessageKind::FerrFileNotFound,
                    MessageInfo::default(),
                    vec![],
                    &[&file],
                )?;
                return Err(AbortCompilation);
            }
            match FileInput::open(file.as_ref()) {
                Ok(input) => Ok(Box::new(input)),
                Err(err) => {
                    tracing::error!(%file, %err, "could not open source file");
                    w_ctx.report(
                        MessageKind::FerrFileNotFound,
                        MessageInfo::default(),
                        vec![],
                        &[&file],
                    )?;
                    Err(AbortCompilation)
                }
            }
        }
        // Registered in-memory sources win; anything else (the shipped
        // prelude files in particular) still comes from disk.
        "debug" => match debug_source(file.as_ref()) {
            Some(source) => Ok(Box::new(StringInput::new(file.clone(), source))),
            None => match FileInput::open(file.as_ref()) {
                Ok(input) => Ok(Box::new(input)),
                Err(_) => {
                    w_ctx.report(
                        MessageKind::FerrFileNotFound,
                        MessageInfo::default(),
                        vec![],
                        &[&file],
                    )?;
                    Err(AbortCompilation)
                }
            },
        },
        other => {
            tracing::error!(pref = other, "unknown input type preference");
            w_ctx.report(
                MessageKind::ErrUnknownSourceInputPref,
                MessageInfo::default(),
                vec![],
                &[other, &file],
            )?;
            Err(AbortCompilation)
        }
    }
}

/// Query: source lines in the half-open 1-indexed range `begin..end`.
pub fn get_source_lines(
    args: (Arc<str>, usize, usize),
    jb: &mut JobsBuilder<Vec<String>>,
    _ctx: &Arc<UnitCtx>,
) {
    let (file, line_begin, line_end) = args;
    jb.add_job(move |w_ctx| {
        let mut input = get_source_input(file.clone(), w_ctx)?;
        let lines = input.get_lines(line_begin, line_end);
        if lines.len() < line_end.saturating_sub(line_begin) {
            w_ctx.report(
                MessageKind::ErrUnexpectedEofAtLineQuery,
                MessageInfo::default(),
                vec![],
                &[&file],
            )?;
        }
        Ok(lines)
    });
}
