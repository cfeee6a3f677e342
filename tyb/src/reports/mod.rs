//! Report data structures for commands.
//!
//! Operations build reports, then commands render them to an Output target.

mod batch;
mod bundle;
mod output;

pub use batch::{BatchSummary, WrittenFile};
pub use bundle::{BundleDestination, BundleReport};
pub use output::{Report, TerminalOutput};
