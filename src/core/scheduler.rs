//! Drives monitor cycles once or on a fixed interval.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::config::MonitorConfig;
use crate::core::cycle::{CycleReport, MonitorCycle};
use crate::error::Result;

/// Cooperative stop request, checked between cycles.
///
/// Cloning yields a handle to the same signal.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock() = true;
        cvar.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        *self.inner.0.lock()
    }

    /// Sleep for `timeout` or until triggered; returns whether it was triggered
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let mut triggered = lock.lock();

        // Intervals too large to add to `Instant::now()` wait until triggered
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            while !*triggered {
                cvar.wait(&mut triggered);
            }
            return true;
        };

        while !*triggered {
            if cvar.wait_until(&mut triggered, deadline).timed_out() {
                break;
            }
        }

        *triggered
    }
}

/// Owns the cycle and the run loop
pub struct Scheduler {
    cycle: MonitorCycle,
    shutdown: ShutdownSignal,
}

impl Scheduler {
    pub fn new(cycle: MonitorCycle) -> Self {
        Self {
            cycle,
            shutdown: ShutdownSignal::new(),
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(MonitorCycle::from_config(config))
    }

    /// Handle that stops [`Scheduler::run_loop`] after the current cycle
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Run exactly one cycle; a failure is logged and returned
    pub fn run_once(&mut self) -> Result<CycleReport> {
        let result = self.cycle.run();
        if let Err(ref e) = result {
            log::error!("Monitor cycle failed: {}", e);
        }
        result
    }

    /// Run cycles every `interval` until the shutdown signal fires.
    ///
    /// A cycle is never interrupted; the signal is honoured while waiting.
    /// Returns the number of cycles executed.
    pub fn run_loop(&mut self, interval: Duration) -> usize {
        let mut cycles = 0;

        while !self.shutdown.is_triggered() {
            // Errors are already logged; the loop keeps going
            let _ = self.run_once();
            cycles += 1;

            if self.shutdown.wait_timeout(interval) {
                break;
            }
        }

        log::info!("Interrupted by user. Exiting.");
        cycles
    }
}
