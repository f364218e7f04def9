//! # Media Retag
//!
//! Sets each media file's modification time to the moment it was captured.
//!
//! ## Behaviour
//! - **Embedded metadata only** - the capture time comes from inside the file
//! - **Never overwrite** - undated files are moved aside under a free name
//! - **Keep going** - a file that cannot be handled never stops the run
//!
//! ## Architecture
//! The library is split into a core engine and presentation layers:
//! - `core` - Format detection, metadata readers, scanning and the pipeline
//! - `events` - Event-driven progress reporting
//! - `error` - Error types with file context
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{Result, RetagError};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. `RUST_LOG` takes
/// precedence; otherwise only warnings are shown, or debug output when
/// `verbose` is set.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    // A subscriber may already be installed (e.g. by an embedding application)
    let _ = tracing::subscriber::set_global_default(subscriber);
}
