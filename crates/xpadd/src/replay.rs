use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use xpad_controller::memory::MemoryTransport;
use xpad_controller::{
    ControllerEvent, EventReceiver, Gamepad, InputEvent, InstanceId, ManualClock, Ticks,
    XpadDriver,
};

use crate::capture::{Action, Capture};
use crate::hex::format_hex;

#[derive(Debug, Clone, Copy)]
pub(crate) struct ReplayOptions {
    pub poll_interval_ms: u32,
    pub rumble_duration_ms: u32,
}

/// Something observable that happened during a replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Record {
    /// `name` is `None` for devices that are not a supported gamepad.
    Connected {
        at_ms: u32,
        id: InstanceId,
        name: Option<String>,
    },
    Disconnected {
        at_ms: u32,
        id: InstanceId,
    },
    Input {
        at_ms: u32,
        id: InstanceId,
        event: InputEvent,
    },
    /// An OUT transfer written to the device.
    Packet {
        at_ms: u32,
        id: InstanceId,
        bytes: Vec<u8>,
    },
    /// A report arrived while nothing was reading the device.
    Dropped {
        at_ms: u32,
        id: InstanceId,
    },
    Failed {
        at_ms: u32,
        id: InstanceId,
        reason: String,
    },
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Connected { at_ms, id, name } => match name {
                Some(name) => write!(f, "[{at_ms:>6} ms] device {id}: connected ({name})"),
                None => write!(f, "[{at_ms:>6} ms] device {id}: connected (not a gamepad)"),
            },
            Record::Disconnected { at_ms, id } => {
                write!(f, "[{at_ms:>6} ms] device {id}: disconnected")
            }
            Record::Input { at_ms, id, event } => {
                write!(f, "[{at_ms:>6} ms] device {id}: ")?;
                match event {
                    InputEvent::Hat(hat) => write!(f, "hat {hat:?}"),
                    InputEvent::Button { button, pressed } => {
                        let phase = if *pressed { "pressed" } else { "released" };
                        write!(f, "button {button:?} {phase}")
                    }
                    InputEvent::Axis { axis, value } => write!(f, "axis {axis:?} = {value}"),
                }
            }
            Record::Packet { at_ms, id, bytes } => {
                write!(f, "[{at_ms:>6} ms] device {id}: -> {}", format_hex(bytes))
            }
            Record::Dropped { at_ms, id } => {
                write!(f, "[{at_ms:>6} ms] device {id}: report dropped, not open")
            }
            Record::Failed { at_ms, id, reason } => {
                write!(f, "[{at_ms:>6} ms] device {id}: {reason}")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct ReplaySummary {
    pub inputs: usize,
    pub packets: usize,
    /// The pacer asked to stop before the capture ended.
    pub interrupted: bool,
}

/// Driver stack wired to an in-memory bus and a hand-driven clock.
struct Session<'a> {
    transport: Arc<MemoryTransport>,
    clock: Arc<ManualClock>,
    driver: XpadDriver,
    events: EventReceiver,
    pads: AHashMap<InstanceId, Gamepad>,
    now: u32,
    /// A step ran since the last poll.
    dirty: bool,
    summary: ReplaySummary,
    emit: &'a mut dyn FnMut(&Record),
}

impl Session<'_> {
    fn record(&mut self, record: &Record) {
        match record {
            Record::Input { .. } => self.summary.inputs += 1,
            Record::Packet { .. } => self.summary.packets += 1,
            _ => {}
        }
        (self.emit)(record);
    }

    fn set_time(&mut self, at_ms: u32) {
        self.now = at_ms;
        self.clock.set(Ticks(at_ms));
    }

    fn flush_writes(&mut self) {
        for (id, bytes) in self.transport.take_writes() {
            let at_ms = self.now;
            self.record(&Record::Packet { at_ms, id, bytes });
        }
    }

    /// Delivers pending hotplug events, opening gamepads as they arrive and
    /// closing them as they leave.
    fn service(&mut self) {
        self.driver.detect();
        let pending: Vec<ControllerEvent> = self.events.try_iter().collect();
        for event in pending {
            let at_ms = self.now;
            match event {
                ControllerEvent::Connected(id) => {
                    let info = self
                        .driver
                        .controllers()
                        .into_iter()
                        .find(|info| info.instance_id == id);
                    let Some(info) = info else {
                        self.record(&Record::Connected { at_ms, id, name: None });
                        continue;
                    };
                    match self.driver.open(info.index) {
                        Ok(pad) => {
                            self.pads.insert(id, pad);
                            self.record(&Record::Connected {
                                at_ms,
                                id,
                                name: Some(info.name),
                            });
                        }
                        Err(e) => self.record(&Record::Failed {
                            at_ms,
                            id,
                            reason: format!("failed to open: {e}"),
                        }),
                    }
                }
                ControllerEvent::Disconnected(id) => {
                    if let Some(pad) = self.pads.remove(&id) {
                        pad.close();
                    }
                    self.record(&Record::Disconnected { at_ms, id });
                }
            }
        }
        self.flush_writes();
    }

    /// One polling tick over every open pad, in instance id order.
    fn poll(&mut self) {
        self.dirty = false;
        let mut ids: Vec<InstanceId> = self.pads.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            let Some(pad) = self.pads.get_mut(&id) else {
                continue;
            };
            let events = pad.update();
            let at_ms = self.now;
            for event in events {
                self.record(&Record::Input { at_ms, id, event });
            }
        }
        self.flush_writes();
    }

    fn apply(&mut self, action: &Action, options: &ReplayOptions) {
        let at_ms = self.now;
        self.dirty = true;
        match action {
            Action::Report { device, status, data } => {
                if !self.transport.deliver_with_status(*device, *status, data) {
                    self.record(&Record::Dropped { at_ms, id: *device });
                }
            }
            Action::Rumble {
                device,
                low,
                high,
                duration_ms,
            } => {
                let duration_ms = duration_ms.unwrap_or(options.rumble_duration_ms);
                let result = match self.pads.get_mut(device) {
                    Some(pad) => pad
                        .rumble(*low, *high, duration_ms)
                        .map_err(|e| e.to_string()),
                    None => Err("rumble requested, not open".to_string()),
                };
                if let Err(reason) = result {
                    self.record(&Record::Failed {
                        at_ms,
                        id: *device,
                        reason,
                    });
                }
                self.flush_writes();
            }
            Action::Connect(descriptor) => {
                self.transport.attach(descriptor.clone());
                self.service();
            }
            Action::Disconnect(id) => {
                self.transport.detach(*id);
                self.service();
            }
        }
    }

    /// Lets `ms` elapse on the wrapping clock, then polls. `false` when the
    /// pacer asked to stop.
    fn tick(&mut self, ms: u32, pace: &mut impl FnMut(u32) -> bool) -> bool {
        if ms > 0 && !pace(ms) {
            return false;
        }
        self.set_time(Ticks(self.now).after_ms(ms).0);
        self.poll();
        true
    }

    /// Time of the next poll that can observe anything, no later than `limit`.
    ///
    /// Polls with no new input and no rumble deadline behind them change
    /// nothing, so idle stretches of the grid are skipped.
    fn next_poll(&self, interval: u32, limit: u32) -> u32 {
        let next = next_tick(self.now, interval);
        if self.dirty {
            return next;
        }
        let last = limit / interval * interval;
        let Some(remaining) = self.until_expiry().min() else {
            return last.max(next);
        };
        let deadline = u64::from(self.now) + u64::from(remaining);
        if deadline < u64::from(last) {
            next_tick(deadline as u32, interval).max(next)
        } else {
            last.max(next)
        }
    }

    fn interrupt(self) -> ReplaySummary {
        ReplaySummary {
            interrupted: true,
            ..self.summary
        }
    }

    /// Milliseconds from now to each pending rumble deadline. Measured on
    /// the wrapping clock, so a deadline past the counter rollover is still
    /// ahead.
    fn until_expiry(&self) -> impl Iterator<Item = u32> + '_ {
        let now = self.now;
        self.pads
            .values()
            .filter_map(|pad| pad.rumble_state().expiry())
            .map(move |deadline| deadline.0.wrapping_sub(now))
    }
}

/// Runs `capture` through the driver.
///
/// `pace` is called with the number of milliseconds about to elapse and
/// returns `false` to stop early. Every observable effect goes to `emit`.
pub(crate) fn run(
    capture: &Capture,
    options: &ReplayOptions,
    mut pace: impl FnMut(u32) -> bool,
    emit: &mut dyn FnMut(&Record),
) -> xpad_controller::Result<ReplaySummary> {
    let transport = Arc::new(MemoryTransport::new());
    let clock = Arc::new(ManualClock::new(Ticks(0)));
    let driver = XpadDriver::with_clock(transport.clone(), clock.clone())?;
    let events = driver.subscribe();
    for device in &capture.devices {
        transport.attach(device.clone());
    }

    let mut session = Session {
        transport,
        clock,
        driver,
        events,
        pads: AHashMap::new(),
        now: 0,
        dirty: false,
        summary: ReplaySummary::default(),
        emit,
    };
    session.service();

    let interval = options.poll_interval_ms.max(1);
    for step in &capture.steps {
        loop {
            let next = session.next_poll(interval, step.at_ms);
            if next > step.at_ms || next <= session.now {
                break;
            }
            if !session.tick(next - session.now, &mut pace) {
                return Ok(session.interrupt());
            }
        }
        if session.now < step.at_ms {
            if !pace(step.at_ms - session.now) {
                return Ok(session.interrupt());
            }
            session.set_time(step.at_ms);
        }
        session.apply(&step.action, options);
    }

    // Drain the last reports, then let running rumbles run out. The clock may
    // roll over here; a pending deadline is never more than half the range
    // ahead, so one step past the farthest one expires them all.
    let next = next_tick(session.now, interval);
    if !session.tick(next.saturating_sub(session.now), &mut pace) {
        return Ok(session.interrupt());
    }
    loop {
        let Some(remaining) = session.until_expiry().max() else {
            break;
        };
        if !session.tick(remaining.saturating_add(1), &mut pace) {
            return Ok(session.interrupt());
        }
    }

    for (_, pad) in session.pads.drain() {
        pad.close();
    }
    session.flush_writes();
    session.driver.shutdown();
    Ok(session.summary)
}

fn next_tick(now: u32, interval: u32) -> u32 {
    (now / interval).saturating_add(1).saturating_mul(interval)
}
