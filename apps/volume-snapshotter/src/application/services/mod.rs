//! Application Services
//!
//! - `CollectionCycle`: one fetch → aggregate → persist pass
//! - `Scheduler`: runs a cycle immediately, then on a fixed period

mod collection_cycle;
mod scheduler;

pub use collection_cycle::{CollectionCycle, CycleOutcome, CycleSummary};
pub use scheduler::Scheduler;
