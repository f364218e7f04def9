//! # Pipeline Module
//!
//! Orchestrates a retagging run over one directory tree.
//!
//! ## Per-file flow
//! 1. **Detect** - classify by file name; unsupported files are skipped
//! 2. **Extract** - read the capture timestamp with the format's reader
//! 3. **Apply** - set access/modification time, or move the file into the
//!    undated directory next to it
//!
//! ## Parallelism
//! With more than one job, extraction runs on a rayon pool. Filesystem
//! changes are always applied one file at a time in discovery order.

mod executor;

pub use executor::{FileOutcome, Pipeline, PipelineBuilder, PipelineConfig, PipelineResult};
