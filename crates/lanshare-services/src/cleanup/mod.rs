//! Time-based expiration of uploads

mod sweeper;

pub use sweeper::{ExpirationSweeper, SweepReport, SweeperHandle};
