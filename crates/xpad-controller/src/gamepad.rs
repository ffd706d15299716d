use std::sync::Arc;

use xpad_protocol::{apply, decode, encode_rumble, ControllerFamily, GamepadState, InputEvents};

use crate::buffer::ReportBuffer;
use crate::driver::Inner;
use crate::error::{Error, Result};
use crate::info::ControllerInfo;
use crate::rumble::RumbleState;
use crate::transport::InstanceId;

/// An opened gamepad slot.
///
/// Owns the previous-state snapshot and rumble state; shares only the report
/// buffer with the transport's read completion. Dropping the handle closes
/// the slot.
pub struct Gamepad {
    info: ControllerInfo,
    buffer: Arc<ReportBuffer>,
    previous: GamepadState,
    rumble: RumbleState,
    inner: Arc<Inner>,
}

impl Gamepad {
    pub(crate) fn new(info: ControllerInfo, buffer: Arc<ReportBuffer>, inner: Arc<Inner>) -> Self {
        Self {
            info,
            buffer,
            previous: GamepadState::default(),
            rumble: RumbleState::default(),
            inner,
        }
    }

    /// Snapshot taken when the slot was opened; the index inside may be stale.
    pub fn info(&self) -> &ControllerInfo {
        &self.info
    }

    pub fn instance_id(&self) -> InstanceId {
        self.info.instance_id
    }

    pub fn family(&self) -> ControllerFamily {
        self.info.family
    }

    /// State as of the last [`Gamepad::update`].
    pub fn state(&self) -> &GamepadState {
        &self.previous
    }

    pub fn rumble_state(&self) -> RumbleState {
        self.rumble
    }

    /// Motor magnitudes currently in effect.
    pub fn rumble_magnitudes(&self) -> (u16, u16) {
        self.rumble.effective(self.inner.clock.now())
    }

    /// Polling tick: stops an expired rumble, then decodes the latest report
    /// and returns what changed since the previous tick.
    pub fn update(&mut self) -> InputEvents {
        let now = self.inner.clock.now();
        if self.rumble.expire(now) {
            log::debug!("device {}: rumble expired", self.info.instance_id);
            self.send_stop();
        }

        let Some(report) = self.buffer.latest() else {
            return InputEvents::new();
        };
        let current = decode(self.info.family, &report);
        apply(&mut self.previous, current)
    }

    /// Runs the motors at `low`/`high` for `duration_ms`.
    ///
    /// Repeating the running magnitudes only extends the deadline.
    pub fn rumble(&mut self, low: u16, high: u16, duration_ms: u32) -> Result<()> {
        let now = self.inner.clock.now();
        if self.rumble.is_current(low, high) {
            self.rumble.refresh(now, duration_ms);
            return Ok(());
        }

        let packet = encode_rumble(self.info.family, low, high);
        self.inner
            .transport
            .write(self.info.instance_id, packet.as_bytes())
            .map_err(Error::TransportWrite)?;
        log::debug!(
            "device {}: rumble low={low:#06x} high={high:#06x} for {duration_ms}ms",
            self.info.instance_id
        );
        self.rumble.commit(low, high, now, duration_ms);
        Ok(())
    }

    /// Stops the motors and releases the slot.
    pub fn close(self) {
        drop(self);
    }

    fn send_stop(&self) {
        let packet = encode_rumble(self.info.family, 0, 0);
        if let Err(e) = self
            .inner
            .transport
            .write(self.info.instance_id, packet.as_bytes())
        {
            log::warn!("device {}: failed to stop rumble: {e}", self.info.instance_id);
        }
    }
}

impl Drop for Gamepad {
    fn drop(&mut self) {
        let id = self.info.instance_id;
        self.send_stop();
        // The device stays registered with the host stack so it can be
        // reopened without re-enumeration.
        self.inner.transport.stop_read(id);
        self.inner.release(id);
        log::debug!("device {id}: closed");
    }
}
