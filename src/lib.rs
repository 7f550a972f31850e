//! # pushc
//!
//! Query-driven incremental front-end for the push language.
//!
//! ## Module structure (dependency order)
//!
//! ```text
//! parser    → grammar table + scope parser producing the AST
//!   ↓
//! prelude   → MCI loader: grammar/operator tables from prelude files
//!   ↓
//! input     → token sources (file, string) with lookahead
//!   ↓
//! lexer     → level-aware, table-driven tokenisation
//!   ↓
//! engine    → worker pool, job stack, memoised queries (red/green DAG)
//!   ↓
//! message   → diagnostics model (kinds, classes, counters)
//!   ↓
//! base      → primitives (positions, byte-string measuring)
//! ```
//!
//! The grammar is data-driven by design: the lexer and parser are
//! parameterised entirely by the prelude configuration loaded through the
//! query engine.

pub mod ast;
pub mod base;
pub mod engine;
pub mod input;
pub mod lexer;
pub mod message;
pub mod parser;
pub mod prelude;
pub mod queries;

// Re-export the types almost every embedder needs.
pub use ast::{AstNode, ExprKind};
pub use engine::{GlobalCtx, JobCollection, JobsBuilder, UnitCtx, Worker};
pub use lexer::{Token, TokenConfig, TokenKind, TokenLevel};
pub use message::{AbortCompilation, MessageClass, MessageInfo, MessageKind};
pub use prelude::PreludeConfig;
