//! Installed-package database (VDB) scanning.
//!
//! - `scan` - a single pass over `<root>/<category>/<PF>` and its publication
//! - `scheduler` - the background loop repeating the pass on an interval

mod scan;
mod scheduler;

pub use scan::{REPOSITORY_FILE, SLOT_FILE, ScanOutcome, collect_installed, run_cycle};
pub use scheduler::Scheduler;
