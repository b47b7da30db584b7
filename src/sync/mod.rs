mod connectivity;
mod engine;

pub use self::connectivity::{Connectivity, ConnectivityMonitor};
pub use self::engine::{DeferReason, DrainReport, DrainStatus, SendOutcome, SyncEngine};
