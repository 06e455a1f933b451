//! Trait seams for systems that sit outside this crate's job: invoking
//! the kernel build system to obtain preprocessed text, a persistent
//! source-tree cache, a call-graph visualiser, a migration merger that
//! folds a newer revision's entity/graph changes into an existing slice.
//! `bch_bindgen` played an analogous role for the teacher — a boundary
//! the core never reaches past — except there the boundary was an FFI
//! crate; here it's a plain trait, since there's no C library to link
//! against.
//!
//! `pipeline::run_with_driver` takes a `&dyn PreprocessorDriver` so a
//! real driver — one that actually shells out to the kernel build system
//! — can be substituted later without touching components A-H. The CLI's
//! `slice`/`stats` subcommands go through `pipeline::run` instead, reading
//! both inputs as plain files directly.

use std::path::Path;

use anyhow::Result;

/// Supplies the preprocessed module text and the kernel's macro list,
/// standing in for "invoke the kernel build system".
pub trait PreprocessorDriver {
    fn preprocessed_module_text(&self) -> Result<String>;
    fn kernel_macro_list(&self) -> Result<Vec<String>>;
}

/// A persistent cache of source trees keyed by path, so repeated runs
/// over the same kernel tree needn't re-read it from disk. Unimplemented
/// here; `cache.rs`'s memoisation blob covers the parsed/graph-level
/// caching this crate does implement.
pub trait SourceCache {
    fn read(&self, path: &Path) -> Result<String>;
}

/// Renders the sliced graph for human inspection beyond the plain
/// `--dump-graph-dot` debug flag — an interactive call-graph browser.
pub trait GraphVisualiser {
    fn render(&self, dot: &str) -> Result<()>;
}

/// Merges a newer revision's entity/graph changes into an existing slice
/// without a full re-run. `cache.rs`'s version tag is the only migration
/// awareness this crate has otherwise (a mismatch just forces a full
/// re-run rather than attempting a merge).
pub trait SpecMigrationMerger {
    fn merge(&self, previous: &[u8], next: &[u8]) -> Result<Vec<u8>>;
}
