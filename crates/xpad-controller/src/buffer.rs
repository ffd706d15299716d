use std::sync::{Mutex, PoisonError};

use xpad_protocol::{validate, ControllerFamily, RawReport};

use crate::transport::ReadCompletion;

/// Latest accepted input report of one slot.
///
/// Written from the transport's completion context and read from the polling
/// context. Each side copies a whole report under the lock, so a reader never
/// observes half of one report and half of another.
#[derive(Debug)]
pub struct ReportBuffer {
    family: ControllerFamily,
    latest: Mutex<Option<RawReport>>,
}

impl ReportBuffer {
    pub fn new(family: ControllerFamily) -> Self {
        Self {
            family,
            latest: Mutex::new(None),
        }
    }

    pub fn family(&self) -> ControllerFamily {
        self.family
    }

    /// Handles one IN completion. Failed transfers and frames that are not
    /// input reports leave the stored report untouched.
    pub fn on_read(&self, completion: &ReadCompletion<'_>) -> bool {
        if completion.status < 0 {
            log::trace!(
                "device {}: read failed with status {}",
                completion.device,
                completion.status
            );
            return false;
        }
        if !validate(self.family, completion.data) {
            log::trace!(
                "device {}: dropped non-input frame ({} bytes)",
                completion.device,
                completion.data.len()
            );
            return false;
        }
        self.publish(RawReport::truncated(completion.data));
        true
    }

    /// Replaces the stored report.
    pub fn publish(&self, report: RawReport) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(report);
    }

    /// Copy of the last accepted report, if any arrived yet.
    pub fn latest(&self) -> Option<RawReport> {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
