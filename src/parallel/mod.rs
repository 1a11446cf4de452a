//! Row partitioning and the synchronized-start worker pool.
//!
//! - `partition`: splits `0..N` into one contiguous row range per worker
//! - `pistol`: condition-variable rendezvous that releases all workers at once
//! - `affinity`: best-effort pinning of a worker to one CPU
//! - `pool`: spawns the workers for one timed pass and measures it

pub mod affinity;
pub mod partition;
pub mod pistol;
pub mod pool;

pub use partition::row_ranges;
pub use pistol::StartingPistol;
pub use pool::run_timed;
