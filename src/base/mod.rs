//! Foundation types for the pushc toolchain.
//!
//! This module provides the primitives used throughout the compiler:
//! - [`PosInfo`] - source positions (1-based line/column, code-point length)
//! - text measuring helpers (code points, grapheme columns, tab width)
//!
//! This module has NO dependencies on other pushc modules.

mod position;
pub mod text;

pub use position::PosInfo;
