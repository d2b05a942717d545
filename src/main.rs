//! # focus-scan CLI
//!
//! Command-line interface for the focus scanner.
//!
//! ## Usage
//! ```bash
//! focus-scan scan ~/Photos --threshold 150
//! focus-scan scan ~/Photos --cpu 50 --output json
//! ```

mod cli;

use focus_scan::Result;

fn main() -> Result<()> {
    cli::run()
}
