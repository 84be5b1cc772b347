/*!
 * Scheduler Module
 * Two-class ratio scheduling over the process table
 */

pub mod atomic_stats;
pub mod cursor;
pub mod policy;
pub(crate) mod run;
pub mod types;

// Re-export public API
pub use atomic_stats::AtomicSchedulerStats;
pub use cursor::RoamingCursor;
pub use policy::{Choice, RatioPolicy};
pub use types::{DispatchRecord, RunBudget, RunReport, SchedulerStats};
