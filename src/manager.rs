//! Input aggregator: one device state machine per class.
//!
//! [`InputManager`] is the application-facing entry point:
//! - `enqueue(class, event)` routes a raw event to that class' queue only;
//! - `update(frame_time)` advances every device (pointer, key matrix, analog, in
//!   that order);
//! - `snapshot(class)` borrows a device's state until the next update.
//!
//! When events are captured on another thread, hand that thread an
//! [`EventSender`]. Sent events land in a shared inbox that `update` drains (and
//! validates) before the devices run; the inbox is the only state shared between
//! threads.

use crate::clock::{Clock, Timestamp};
use crate::config::{InputConfig, RepeatConfig};
use crate::device::Device;
use crate::error::Result;
use crate::event::{DeviceClass, RawEvent};
use crate::snapshot::{DeviceState, Snapshot};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

type Inbox = Arc<Mutex<VecDeque<(DeviceClass, RawEvent)>>>;

/// Owns the pointer, key-matrix and analog devices and the shared repeat timing.
#[derive(Debug)]
pub struct InputManager {
    pointer: Device,
    key_matrix: Device,
    analog: Device,
    repeat: RepeatConfig,
    inbox: Inbox,
    frame_time: Timestamp,
}

impl InputManager {
    /// Build every device from `config`. Fails if any layout is invalid.
    pub fn new(config: &InputConfig) -> Result<Self> {
        let manager = Self {
            pointer: Device::new(DeviceClass::Pointer, &config.pointer)?,
            key_matrix: Device::new(DeviceClass::KeyMatrix, &config.key_matrix)?,
            analog: Device::new(DeviceClass::Analog, &config.analog)?,
            repeat: config.repeat,
            inbox: Arc::default(),
            frame_time: 0,
        };
        info!(
            "Input manager ready (repeat delay {} ms, period {} ms)",
            manager.repeat.delay_ms(),
            manager.repeat.period_ms()
        );
        Ok(manager)
    }

    /// Manager with the default mouse, keyboard and gamepad layouts.
    pub fn with_defaults() -> Self {
        let config = InputConfig::default();
        Self {
            pointer: Self::default_device(DeviceClass::Pointer, &config),
            key_matrix: Self::default_device(DeviceClass::KeyMatrix, &config),
            analog: Self::default_device(DeviceClass::Analog, &config),
            repeat: config.repeat,
            inbox: Arc::default(),
            frame_time: 0,
        }
    }

    fn default_device(class: DeviceClass, config: &InputConfig) -> Device {
        match Device::new(class, config.layout(class)) {
            Ok(device) => device,
            Err(e) => unreachable!("default {class} layout is invalid: {e}"),
        }
    }

    pub fn device(&self, class: DeviceClass) -> &Device {
        match class {
            DeviceClass::Pointer => &self.pointer,
            DeviceClass::KeyMatrix => &self.key_matrix,
            DeviceClass::Analog => &self.analog,
        }
    }

    fn device_mut(&mut self, class: DeviceClass) -> &mut Device {
        match class {
            DeviceClass::Pointer => &mut self.pointer,
            DeviceClass::KeyMatrix => &mut self.key_matrix,
            DeviceClass::Analog => &mut self.analog,
        }
    }

    /// Queue `event` on the `class` device for the next update.
    ///
    /// Never blocks. Rejects events the device cannot hold (bad index or kind).
    pub fn enqueue(&mut self, class: DeviceClass, event: RawEvent) -> Result<()> {
        self.device_mut(class).enqueue(event).map_err(|e| {
            warn!("Rejected {class} event: {e}");
            e
        })
    }

    /// Handle for pushing events from another thread.
    pub fn sender(&self) -> EventSender {
        EventSender {
            inbox: Arc::clone(&self.inbox),
        }
    }

    /// Advance every device to `frame_time`.
    pub fn update(&mut self, frame_time: Timestamp) {
        self.drain_inbox();
        // Devices hold their time if it runs backwards; mirror that here.
        self.frame_time = self.frame_time.max(frame_time);

        let repeat = self.repeat;
        for class in DeviceClass::ALL {
            self.device_mut(class).update(frame_time, &repeat);
        }
    }

    /// Advance every device to the clock's current time.
    pub fn update_from(&mut self, clock: &impl Clock) {
        self.update(clock.now_ms());
    }

    fn drain_inbox(&mut self) {
        // Swap under the lock, route outside it.
        let pending = std::mem::take(&mut *self.inbox.lock());
        if pending.is_empty() {
            return;
        }
        debug!("Routing {} events from sender inbox", pending.len());
        for (class, event) in pending {
            // Rejections are logged by `enqueue`; a bad event must not stall the rest.
            let _ = self.enqueue(class, event);
        }
    }

    /// State of the `class` device as of the last update.
    pub fn snapshot(&self, class: DeviceClass) -> &DeviceState {
        self.device(class).state()
    }

    /// Owned copy of every device's state.
    pub fn snapshot_all(&self) -> Snapshot {
        Snapshot {
            frame_time: self.frame_time,
            pointer: self.pointer.state().clone(),
            key_matrix: self.key_matrix.state().clone(),
            analog: self.analog.state().clone(),
        }
    }

    /// Latest frame time seen by `update`.
    pub fn frame_time(&self) -> Timestamp {
        self.frame_time
    }

    pub fn repeat(&self) -> &RepeatConfig {
        &self.repeat
    }

    pub fn repeat_delay_ms(&self) -> u64 {
        self.repeat.delay_ms()
    }

    pub fn set_repeat_delay_ms(&mut self, delay_ms: u64) {
        debug!("Repeat delay set to {} ms", delay_ms);
        self.repeat.set_delay_ms(delay_ms);
    }

    pub fn repeat_period_ms(&self) -> u64 {
        self.repeat.period_ms()
    }

    /// Change the repeat period. Zero is rejected and leaves the period unchanged.
    pub fn set_repeat_period_ms(&mut self, period_ms: u64) -> Result<()> {
        self.repeat.set_period_ms(period_ms)?;
        debug!("Repeat period set to {} ms", period_ms);
        Ok(())
    }

    pub fn dead_zone(&self, class: DeviceClass, axis: usize) -> Result<f32> {
        self.device(class).dead_zone(axis)
    }

    pub fn set_dead_zone(&mut self, class: DeviceClass, axis: usize, value: f32) -> Result<()> {
        self.device_mut(class).set_dead_zone(axis, value)?;
        debug!("{} axis {} dead zone set to {}", class, axis, value);
        Ok(())
    }
}

/// Cloneable, thread-safe handle that feeds an [`InputManager`]'s inbox.
///
/// Events are validated when the manager routes them during `update`; invalid ones
/// are logged and dropped there.
#[derive(Clone, Debug)]
pub struct EventSender {
    inbox: Inbox,
}

impl EventSender {
    pub fn send(&self, class: DeviceClass, event: RawEvent) {
        self.inbox.lock().push_back((class, event));
    }

    /// Push several events under one lock, keeping their order.
    pub fn send_all(&self, events: impl IntoIterator<Item = (DeviceClass, RawEvent)>) {
        self.inbox.lock().extend(events);
    }
}
