// Core monitoring engine

pub mod alerting;
pub mod config;
pub mod cycle;
pub mod dashboard;
pub mod log_watch;
pub mod scheduler;
pub mod state;
pub mod system_monitor;

// Re-export commonly used items
pub use config::MonitorConfig;
pub use cycle::{CyclePhase, CycleReport, DispatchOutcome, MonitorCycle};
pub use dashboard::Dashboard;
pub use scheduler::{Scheduler, ShutdownSignal};
pub use state::{RunState, StateStore};
