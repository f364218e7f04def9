//! # retag CLI
//!
//! Command-line interface for the media retagger.
//!
//! ## Usage
//! ```bash
//! retag ~/Pictures
//! retag ~/Pictures --jobs 4 --output json
//! ```

mod cli;

use media_retag::Result;

fn main() -> Result<()> {
    cli::run()
}
