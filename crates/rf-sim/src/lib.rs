//! Reservoir-simulator boundary for resflow.
//!
//! Provides:
//! - the three-call `ReservoirSimulator` contract (generate input, launch,
//!   read output) plus the simulator's working folder
//! - the JSON exchange documents written to and read from that folder
//! - `ProxySimulator`: an in-process analytic reservoir
//! - `ExternalSimulator`: an external process with a wall-clock timeout

pub mod error;
pub mod exchange;
pub mod external;
pub mod proxy;
pub mod simulator;

pub use error::{SimError, SimResult};
pub use exchange::{ControlSnapshot, IntervalControl, WellControls, WellStreams, WellStreamsFile};
pub use external::ExternalSimulator;
pub use proxy::{ProxySimulator, ProxyWellParams};
pub use simulator::ReservoirSimulator;
