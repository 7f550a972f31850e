//! Typed key-value preference store.

use rustc_hash::FxHashMap;

/// All known preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefType {
    /// Tab size in spaces.
    TabSize,
    MaxErrors,
    MaxWarnings,
    MaxNotifications,

    Architecture,
    Os,
    Platform,
    /// Binary output format.
    OutputFormat,
    Backend,
    /// Runtime implementation library.
    Runtime,
    DynamicLinkage,
    ReleaseSpeedOptimization,
    ReleaseSizeOptimization,
    DebugSymbols,

    /// Where sources come from: "file" or "debug" (injected input).
    InputSource,
    /// Output files requested on the command line.
    OutputFiles,
    /// Run the produced binary after building.
    RunAfterBuild,
    /// Explicit prelude file from the command line.
    PreludePath,
    ColorOutput,

    /// Link-time optimization.
    Lto,
}

/// A preference value of any supported type.
#[derive(Debug, Clone, PartialEq)]
pub enum PrefValue {
    Bool(bool),
    Int(i32),
    Size(usize),
    Float(f64),
    Str(String),
    StrList(Vec<String>),
}

impl PrefValue {
    pub fn as_bool(&self) -> bool {
        match self {
            Self::Bool(v) => *v,
            _ => false,
        }
    }

    pub fn as_size(&self) -> usize {
        match self {
            Self::Size(v) => *v,
            Self::Int(v) => *v as usize,
            _ => 0,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Str(v) => v,
            _ => "",
        }
    }

    pub fn as_list(&self) -> &[String] {
        match self {
            Self::StrList(v) => v,
            _ => &[],
        }
    }
}

pub type PrefMap = FxHashMap<PrefType, PrefValue>;

/// Initial preferences every fresh engine starts with.
pub fn set_default_preferences(prefs: &mut PrefMap) {
    prefs.insert(PrefType::InputSource, PrefValue::Str("file".into()));
}
