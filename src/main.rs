//! `pushc` command line driver.
//!
//! Translates options into preferences on the global context and enqueues
//! the per-file build queries; everything else happens inside the engine.

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use clap::Parser;

use pushc::engine::{GlobalCtx, PrefType, PrefValue, UnitCtx};
use pushc::parser::get_ast;

#[derive(Parser, Debug)]
#[command(name = "pushc", version, about = "Compiler front-end for the push language")]
struct Cli {
    /// Source files to compile.
    files: Vec<String>,

    /// Output files (comma separated, may be repeated).
    #[arg(short = 'o', long = "output")]
    output: Vec<String>,

    /// Run the binary after a successful build.
    #[arg(short = 'r', long = "run")]
    run: bool,

    /// Target triplet: comma separated `key=value` pairs or a dash
    /// separated positional triplet over
    /// arch/os/platform/format/backend/runtime/linkage/build.
    #[arg(short = 't', long = "triplet")]
    triplet: Vec<String>,

    /// Configuration flags or `key=value` preference pairs.
    #[arg(short = 'c', long = "config")]
    config: Vec<String>,

    /// Explicit prelude file.
    #[arg(long = "prelude")]
    prelude: Option<String>,

    /// Worker count; 0 uses twice the available parallelism.
    #[arg(long = "threads", default_value_t = 0)]
    threads: usize,

    /// Colour output.
    #[arg(long = "color", default_value = "auto")]
    color: String,
}

fn store_triplet_elem(g_ctx: &GlobalCtx, name: &str, value: &str) {
    match name {
        "arch" => g_ctx.set_pref(PrefType::Architecture, PrefValue::Str(value.into())),
        "os" => g_ctx.set_pref(PrefType::Os, PrefValue::Str(value.into())),
        "platform" => g_ctx.set_pref(PrefType::Platform, PrefValue::Str(value.into())),
        "format" => g_ctx.set_pref(PrefType::OutputFormat, PrefValue::Str(value.into())),
        "backend" => g_ctx.set_pref(PrefType::Backend, PrefValue::Str(value.into())),
        "runtime" => g_ctx.set_pref(PrefType::Runtime, PrefValue::Str(value.into())),
        "linkage" => g_ctx.set_pref(
            PrefType::DynamicLinkage,
            PrefValue::Bool(value == "dynamic"),
        ),
        "build" => {
            let (speed, size, symbols) = match value {
                "release" => (true, false, false),
                "minsizerel" => (false, true, false),
                "reldebinfo" => (true, false, true),
                _ => (false, false, true),
            };
            g_ctx.set_pref(PrefType::ReleaseSpeedOptimization, PrefValue::Bool(speed));
            g_ctx.set_pref(PrefType::ReleaseSizeOptimization, PrefValue::Bool(size));
            g_ctx.set_pref(PrefType::DebugSymbols, PrefValue::Bool(symbols));
        }
        _ => tracing::warn!(name, value, "unknown triplet element"),
    }
}

fn apply_triplet(g_ctx: &GlobalCtx, items: &[String]) -> bool {
    for item in items {
        for piece in item.split(',') {
            if let Some((key, value)) = piece.split_once('=') {
                if GlobalCtx::get_triplet_pos(key) >= 8 {
                    eprintln!("unknown triplet element \"{key}\"");
                    return false;
                }
                store_triplet_elem(g_ctx, key, value);
            } else {
                for elem in piece.split('-').filter(|e| !e.is_empty()) {
                    let name = GlobalCtx::get_triplet_elem_name(elem);
                    if name.is_empty() {
                        eprintln!("unknown triplet value \"{elem}\"");
                        return false;
                    }
                    store_triplet_elem(g_ctx, name, elem);
                }
            }
        }
    }
    true
}

fn apply_config(g_ctx: &GlobalCtx, items: &[String]) -> bool {
    for item in items {
        for piece in item.split(',') {
            let (key, value) = match piece.split_once('=') {
                Some((key, value)) => (key, Some(value)),
                None => (piece, None),
            };
            match key {
                "tab_size" | "max_errors" | "max_warnings" | "max_notifications" => {
                    let Some(size) = value.and_then(|v| v.parse::<usize>().ok()) else {
                        eprintln!("\"{key}\" expects a numeric value");
                        return false;
                    };
                    let pref = match key {
                        "tab_size" => PrefType::TabSize,
                        "max_errors" => PrefType::MaxErrors,
                        "max_warnings" => PrefType::MaxWarnings,
                        _ => PrefType::MaxNotifications,
                    };
                    g_ctx.set_pref(pref, PrefValue::Size(size));
                }
                "lto" => g_ctx.set_pref(PrefType::Lto, PrefValue::Bool(value != Some("false"))),
                "input_source" => {
                    let Some(value) = value else {
                        eprintln!("\"input_source\" expects a value");
                        return false;
                    };
                    g_ctx.set_pref(PrefType::InputSource, PrefValue::Str(value.into()));
                }
                _ => {
                    eprintln!("unknown configuration \"{key}\"");
                    return false;
                }
            }
        }
    }
    true
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let ansi = match cli.color.as_str() {
        "always" => true,
        "never" => false,
        _ => std::io::IsTerminal::is_terminal(&std::io::stderr()),
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_ansi(ansi)
        .with_writer(std::io::stderr)
        .init();

    if cli.files.is_empty() {
        eprintln!("no input files");
        return ExitCode::from(1);
    }

    let threads = if cli.threads == 0 {
        2 * std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    } else {
        cli.threads
    };

    let g_ctx = GlobalCtx::new();
    let main_worker = match g_ctx.setup(threads, 256) {
        Ok(worker) => worker,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(1);
        }
    };

    if !apply_triplet(&g_ctx, &cli.triplet) || !apply_config(&g_ctx, &cli.config) {
        return ExitCode::from(1);
    }
    if !cli.output.is_empty() {
        let outputs: Vec<String> = cli
            .output
            .iter()
            .flat_map(|o| o.split(','))
            .map(str::to_string)
            .collect();
        g_ctx.set_pref(PrefType::OutputFiles, PrefValue::StrList(outputs));
    }
    g_ctx.set_pref(PrefType::RunAfterBuild, PrefValue::Bool(cli.run));
    if let Some(prelude) = &cli.prelude {
        g_ctx.set_pref(PrefType::PreludePath, PrefValue::Str(prelude.clone()));
    }
    g_ctx.set_pref(PrefType::ColorOutput, PrefValue::Str(cli.color.clone()));
    g_ctx.update_global_prefs();

    let mut failed = false;
    for file in &cli.files {
        let unit = UnitCtx::new(Arc::from(file.as_str()), &g_ctx);
        let built = g_ctx
            .query_for_unit(get_ast, &main_worker, &unit, ())
            .and_then(|jc| {
                jc.execute(&main_worker, true)?;
                jc.wait()?;
                jc.last_result()
            });
        match built {
            Ok(crate_ctx) => {
                tracing::info!(file, ast = %crate_ctx.ast.debug_repr(), "compiled");
            }
            Err(_) => {
                failed = true;
                g_ctx.reset();
            }
        }
    }

    for diagnostic in g_ctx.diagnostics() {
        eprintln!("{}", diagnostic.render());
    }
    g_ctx.wait_finished();

    if failed || g_ctx.error_count.load(Ordering::SeqCst) > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
