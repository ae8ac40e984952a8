//! Per-entity single-flight gate.

use std::sync::atomic::{AtomicBool, Ordering};

/// Admits one mutating operation at a time.
#[derive(Debug, Default)]
pub(crate) struct FlightGate {
    busy: AtomicBool,
}

/// Held for the duration of one admitted operation; releases on drop.
#[derive(Debug)]
pub(crate) struct FlightGuard<'gate> {
    gate: &'gate FlightGate,
}

impl FlightGate {
    /// Returns `None` while another operation holds the gate.
    pub(crate) fn try_begin(&self) -> Option<FlightGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard { gate: self })
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}
