//! The per-class device state machine.
//!
//! A [`Device`] buffers [`RawEvent`]s as they arrive and folds them into its
//! [`DeviceState`] once per frame:
//!
//! 1. Single-frame edges (`triggered`, `released`) are cleared and relative axes
//!    return to zero. Absolute axes keep their last sample.
//! 2. Queued events are applied in arrival order by the class handler.
//! 3. Absolute axes are renormalized from their latest sample and `repeating` is
//!    recomputed for every button, after the whole drain, so a button triggered
//!    this frame always reports a repeat pulse whatever order its events came in.
//!
//! Events are validated when they are queued; by the time `update` runs, every index
//! is known to be in range and the hot path cannot fail.
//!
//! ## Opposite transitions within one frame
//! Events apply in order, so a press followed by a release in the same frame ends
//! the frame released (and not triggered). A press that arrives *after* the button
//! already released this frame is carried over to the next frame, together with
//! every later event for that button, including what later registers say about it.
//! The release edge and the press that followed it never share a frame. Carried
//! events replay in order, so a carried press and release end that frame released
//! without a trigger edge, like any press and release drained together.

use crate::button::{Button, RepeatTiming};
use crate::clock::Timestamp;
use crate::config::{validate_dead_zone, AxisSpec, DeviceLayout, RepeatConfig};
use crate::deadzone::normalize;
use crate::error::{InputError, Result};
use crate::event::{DeviceClass, PadRegister, RawEvent, Transition};
use crate::snapshot::{Axis, DeviceState};
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

/// State machine for one device class.
#[derive(Debug)]
pub struct Device {
    class: DeviceClass,
    state: DeviceState,
    timing: Vec<RepeatTiming>,
    axis_specs: Vec<AxisSpec>,
    /// Latest raw sample of each absolute axis.
    samples: Vec<i32>,
    queue: VecDeque<RawEvent>,
    /// Events held back for the next frame (see module docs).
    carried: VecDeque<RawEvent>,
    /// Buttons whose events are being carried over this frame.
    deferring: Vec<bool>,
    last_frame: Option<Timestamp>,
}

impl Device {
    /// Build a device of `class` with the given layout.
    ///
    /// Every button starts released and every axis at zero.
    pub fn new(class: DeviceClass, layout: &DeviceLayout) -> Result<Self> {
        layout.validate(class)?;

        let axes = layout
            .axes
            .iter()
            .map(|spec| match spec {
                AxisSpec::Relative => Axis::Relative(0),
                AxisSpec::Absolute { .. } => Axis::Absolute(0.0),
            })
            .collect();

        debug!(
            "Built {} device: {} buttons, {} axes",
            class,
            layout.buttons,
            layout.axes.len()
        );

        Ok(Self {
            class,
            state: DeviceState::new(class, vec![Button::default(); layout.buttons], axes),
            timing: vec![RepeatTiming::default(); layout.buttons],
            axis_specs: layout.axes.clone(),
            samples: vec![0; layout.axes.len()],
            queue: VecDeque::new(),
            carried: VecDeque::new(),
            deferring: vec![false; layout.buttons],
            last_frame: None,
        })
    }

    #[inline]
    pub fn class(&self) -> DeviceClass {
        self.class
    }

    /// State as of the last [`update`](Self::update).
    #[inline]
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    #[inline]
    pub fn button_count(&self) -> usize {
        self.timing.len()
    }

    #[inline]
    pub fn axis_count(&self) -> usize {
        self.axis_specs.len()
    }

    /// Events waiting for the next update (including carried-over ones).
    pub fn pending(&self) -> usize {
        self.queue.len() + self.carried.len()
    }

    /// Frame time of the last update, if any.
    pub fn last_frame(&self) -> Option<Timestamp> {
        self.last_frame
    }

    /// Validate `event` for this device and queue it for the next update.
    pub fn enqueue(&mut self, event: RawEvent) -> Result<()> {
        self.check(&event)?;
        self.queue.push_back(event);
        Ok(())
    }

    /// Check that this device can consume `event`: indices in range, and an event
    /// kind the class handles.
    pub fn check(&self, event: &RawEvent) -> Result<()> {
        let unsupported = || InputError::UnsupportedEvent {
            class: self.class,
            event: event.kind_name(),
        };

        match (self.class, event) {
            (_, RawEvent::Button { index, .. }) => self.check_button(*index),

            (DeviceClass::Pointer | DeviceClass::Analog, RawEvent::AxisDelta { axis, .. }) => {
                match self.axis_spec(*axis)? {
                    AxisSpec::Relative => Ok(()),
                    AxisSpec::Absolute { .. } => Err(unsupported()),
                }
            }

            (DeviceClass::Analog, RawEvent::AxisSample { axis, .. }) => {
                match self.axis_spec(*axis)? {
                    AxisSpec::Absolute { .. } => Ok(()),
                    AxisSpec::Relative => Err(unsupported()),
                }
            }

            (DeviceClass::Analog, RawEvent::Register(register)) => self.check_register(register),

            _ => Err(unsupported()),
        }
    }

    fn check_button(&self, index: usize) -> Result<()> {
        if index < self.button_count() {
            Ok(())
        } else {
            Err(InputError::ButtonOutOfRange {
                class: self.class,
                index,
                count: self.button_count(),
            })
        }
    }

    fn axis_spec(&self, axis: usize) -> Result<AxisSpec> {
        self.axis_specs
            .get(axis)
            .copied()
            .ok_or(InputError::AxisOutOfRange {
                class: self.class,
                index: axis,
                count: self.axis_count(),
            })
    }

    fn check_register(&self, register: &PadRegister) -> Result<()> {
        let stray = register
            .buttons
            .checked_shr(self.button_count() as u32)
            .unwrap_or(0);
        if stray != 0 {
            let highest = 31 - register.buttons.leading_zeros() as usize;
            return Err(InputError::ButtonOutOfRange {
                class: self.class,
                index: highest,
                count: self.button_count(),
            });
        }

        let shape_ok = register.samples.len() <= self.axis_count()
            && self.axis_specs[..register.samples.len()]
                .iter()
                .all(AxisSpec::is_absolute);
        if shape_ok {
            Ok(())
        } else {
            Err(InputError::RegisterShape {
                class: self.class,
                samples: register.samples.len(),
                axes: self.axis_count(),
            })
        }
    }

    /// Dead zone of absolute axis `axis`.
    pub fn dead_zone(&self, axis: usize) -> Result<f32> {
        match self.axis_spec(axis)? {
            AxisSpec::Absolute { dead_zone, .. } => Ok(dead_zone),
            AxisSpec::Relative => Err(InputError::NotAbsoluteAxis {
                class: self.class,
                axis,
            }),
        }
    }

    /// Change the dead zone of absolute axis `axis`. Takes effect on the next update.
    pub fn set_dead_zone(&mut self, axis: usize, value: f32) -> Result<()> {
        validate_dead_zone(self.class, axis, value)?;
        let class = self.class;
        let count = self.axis_count();
        match self.axis_specs.get_mut(axis) {
            Some(AxisSpec::Absolute { dead_zone, .. }) => {
                *dead_zone = value;
                Ok(())
            }
            Some(AxisSpec::Relative) => Err(InputError::NotAbsoluteAxis { class, axis }),
            None => Err(InputError::AxisOutOfRange {
                class,
                index: axis,
                count,
            }),
        }
    }

    /// Advance to the frame at `frame_time`.
    ///
    /// `frame_time` should never decrease; an earlier timestamp is treated as a
    /// repeat of the previous frame time.
    pub fn update(&mut self, frame_time: Timestamp, repeat: &RepeatConfig) {
        let now = match self.last_frame {
            Some(last) if frame_time < last => {
                warn!(
                    "{} update went back in time ({} < {}), holding at {}",
                    self.class, frame_time, last, last
                );
                last
            }
            _ => frame_time,
        };
        self.last_frame = Some(now);

        self.begin_frame();
        self.drain(now);
        self.end_frame(now, repeat);
    }

    fn begin_frame(&mut self) {
        let (buttons, axes) = self.state.parts_mut();
        for button in buttons.iter_mut() {
            button.begin_frame();
        }
        for axis in axes.iter_mut() {
            if let Axis::Relative(delta) = axis {
                *delta = 0;
            }
        }
        self.deferring.fill(false);
    }

    fn drain(&mut self, now: Timestamp) {
        let mut batch = std::mem::take(&mut self.carried);
        batch.append(&mut self.queue);

        for event in batch.drain(..) {
            if let RawEvent::Button { index, transition } = event {
                if self.should_defer(index, transition) {
                    trace!("{} carrying {:?} on button {} to next frame", self.class, transition, index);
                    self.deferring[index] = true;
                    self.carried.push_back(event);
                    continue;
                }
            }

            trace!("{} applying {:?} at {}", self.class, event, now);
            match self.class {
                DeviceClass::Pointer => self.pointer_event(event, now),
                DeviceClass::KeyMatrix => self.key_event(event, now),
                DeviceClass::Analog => self.analog_event(event, now),
            }
        }

        // Hand the (now empty) allocation back to the queue.
        if self.queue.capacity() < batch.capacity() {
            self.queue = batch;
        }
    }

    fn should_defer(&self, index: usize, transition: Transition) -> bool {
        self.deferring[index]
            || (transition == Transition::Press && self.state.buttons()[index].released())
    }

    fn end_frame(&mut self, now: Timestamp, repeat: &RepeatConfig) {
        let (buttons, axes) = self.state.parts_mut();

        for ((axis, spec), sample) in axes.iter_mut().zip(&self.axis_specs).zip(&self.samples) {
            if let AxisSpec::Absolute {
                full_scale,
                dead_zone,
            } = *spec
            {
                *axis = Axis::Absolute(normalize(*sample, full_scale, dead_zone));
            }
        }

        for (button, timing) in buttons.iter_mut().zip(self.timing.iter_mut()) {
            button.update_repeat(timing, now, repeat);
        }
    }

    fn pointer_event(&mut self, event: RawEvent, now: Timestamp) {
        match event {
            RawEvent::Button { index, transition } => self.transition(index, transition, now),
            RawEvent::AxisDelta { axis, delta } => self.accumulate(axis, delta),
            other => self.reject(&other),
        }
    }

    fn key_event(&mut self, event: RawEvent, now: Timestamp) {
        match event {
            RawEvent::Button { index, transition } => self.transition(index, transition, now),
            other => self.reject(&other),
        }
    }

    fn analog_event(&mut self, event: RawEvent, now: Timestamp) {
        match event {
            RawEvent::Button { index, transition } => self.transition(index, transition, now),
            RawEvent::AxisDelta { axis, delta } => self.accumulate(axis, delta),
            RawEvent::AxisSample { axis, sample } => self.samples[axis] = sample,
            RawEvent::Register(register) => self.latch(&register, now),
        }
    }

    fn transition(&mut self, index: usize, transition: Transition, now: Timestamp) {
        let (buttons, _) = self.state.parts_mut();
        let button = &mut buttons[index];
        match transition {
            Transition::Press => {
                if !button.press(&mut self.timing[index], now) {
                    trace!("{} button {} already held, ignoring press", self.class, index);
                }
            }
            Transition::Release => button.release(),
        }
    }

    fn accumulate(&mut self, axis: usize, delta: i32) {
        let (_, axes) = self.state.parts_mut();
        if let Axis::Relative(value) = &mut axes[axis] {
            *value = value.saturating_add(delta);
        }
    }

    /// Diff a polled register against the current `held` flags and apply the
    /// resulting transitions, then take its samples.
    ///
    /// Buttons whose events are being carried over, or that already released this
    /// frame and show down again, get the register's transition appended to the
    /// carried events so it replays after them, in arrival order.
    fn latch(&mut self, register: &PadRegister, now: Timestamp) {
        for index in 0..self.button_count() {
            let button = self.state.buttons()[index];
            let down = register.is_down(index);
            if self.deferring[index] || (down && button.released()) {
                let event = if down {
                    RawEvent::press(index)
                } else {
                    RawEvent::release(index)
                };
                trace!("{} carrying register state of button {} to next frame", self.class, index);
                self.deferring[index] = true;
                self.carried.push_back(event);
                continue;
            }
            if down && !button.held() {
                self.transition(index, Transition::Press, now);
            } else if !down && button.held() {
                self.transition(index, Transition::Release, now);
            }
        }

        self.samples[..register.samples.len()].copy_from_slice(&register.samples);
    }

    fn reject(&self, event: &RawEvent) {
        // Unreachable through `enqueue`, which runs the same class check.
        warn!("{} dropping unsupported {}", self.class, event.kind_name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{MouseAxis, MouseButton, PadAxis, PadButton};

    fn pointer() -> Device {
        Device::new(DeviceClass::Pointer, &DeviceLayout::pointer()).expect("pointer layout")
    }

    fn keys() -> Device {
        Device::new(DeviceClass::KeyMatrix, &DeviceLayout::key_matrix()).expect("key layout")
    }

    fn pad() -> Device {
        Device::new(DeviceClass::Analog, &DeviceLayout::analog()).expect("pad layout")
    }

    fn step(device: &mut Device, now: Timestamp, events: &[RawEvent]) {
        for event in events {
            device.enqueue(event.clone()).expect("valid event");
        }
        device.update(now, &RepeatConfig::default());
    }

    fn assert_invariants(device: &Device) {
        for (i, b) in device.state().buttons().iter().enumerate() {
            assert!(!b.triggered() || b.held(), "button {i}: triggered without held");
            assert!(!b.released() || !b.held(), "button {i}: released while held");
            assert!(!(b.triggered() && b.released()), "button {i}: both edges");
        }
    }

    #[test]
    fn new_device_is_all_released() {
        let d = pad();
        assert_eq!(d.button_count(), PadButton::COUNT);
        assert!(d.state().buttons().iter().all(|b| *b == Button::default()));
        assert!(d
            .state()
            .axes()
            .iter()
            .all(|a| *a == Axis::Absolute(0.0)));
    }

    #[test]
    fn press_echo_does_not_retrigger() {
        let mut d = keys();
        step(&mut d, 0, &[RawEvent::press(65)]);
        assert!(d.state().button(65).triggered());

        step(&mut d, 16, &[]);
        step(&mut d, 32, &[RawEvent::press(65)]);
        let a = d.state().button(65);
        assert!(a.held());
        assert!(!a.triggered());
    }

    #[test]
    fn press_then_release_in_one_frame_ends_released() {
        let mut d = keys();
        step(&mut d, 0, &[RawEvent::press(10), RawEvent::release(10)]);
        let b = d.state().button(10);
        assert!(!b.held());
        assert!(b.released());
        assert!(!b.triggered());
        assert!(!b.repeating());
        assert_invariants(&d);
    }

    #[test]
    fn release_then_press_carries_the_press_over() {
        let mut d = keys();
        step(&mut d, 0, &[RawEvent::press(10)]);
        step(
            &mut d,
            16,
            &[RawEvent::release(10), RawEvent::press(10), RawEvent::release(10)],
        );

        let b = d.state().button(10);
        assert!(b.released() && !b.held());
        assert_eq!(d.pending(), 2);
        assert_invariants(&d);

        step(&mut d, 32, &[]);
        let b = d.state().button(10);
        assert!(b.released() && !b.held(), "carried press+release replays in order");
        assert!(!b.triggered(), "press and release drained together leave no trigger edge");
        assert_eq!(d.pending(), 0);
    }

    #[test]
    fn carried_press_triggers_next_frame() {
        let mut d = keys();
        step(&mut d, 0, &[RawEvent::press(3)]);
        step(&mut d, 16, &[RawEvent::release(3), RawEvent::press(3)]);
        assert!(d.state().button(3).released());

        step(&mut d, 32, &[]);
        let b = d.state().button(3);
        assert!(b.triggered() && b.held() && b.repeating());
    }

    #[test]
    fn relative_deltas_accumulate_then_reset() {
        let mut d = pointer();
        let x = MouseAxis::DeltaX.index();
        step(
            &mut d,
            0,
            &[RawEvent::delta(x, 5), RawEvent::delta(x, -2), RawEvent::delta(x, 10)],
        );
        assert_eq!(d.state().axis(x), Axis::Relative(13));

        step(&mut d, 16, &[]);
        assert_eq!(d.state().axis(x), Axis::Relative(0));

        step(&mut d, 32, &[RawEvent::delta(x, -4)]);
        assert_eq!(d.state().axis(x), Axis::Relative(-4));
    }

    #[test]
    fn deltas_saturate_instead_of_wrapping() {
        let mut d = pointer();
        let w = MouseAxis::Wheel.index();
        step(&mut d, 0, &[RawEvent::delta(w, i32::MAX), RawEvent::delta(w, 10)]);
        assert_eq!(d.state().axis(w), Axis::Relative(i32::MAX));
    }

    #[test]
    fn absolute_axis_holds_last_sample_and_applies_dead_zone() {
        let mut d = pad();
        let lx = PadAxis::LeftX.index();
        step(&mut d, 0, &[RawEvent::sample(lx, 16384)]);
        assert_eq!(d.state().axis(lx), Axis::Absolute(0.5));

        // No new sample: value persists.
        step(&mut d, 16, &[]);
        assert_eq!(d.state().axis(lx), Axis::Absolute(0.5));

        // Later samples overwrite, never add.
        step(&mut d, 32, &[RawEvent::sample(lx, 8192), RawEvent::sample(lx, 1000)]);
        assert_eq!(d.state().axis(lx), Axis::Absolute(0.0));
    }

    #[test]
    fn dead_zone_change_applies_to_held_sample_next_frame() {
        let mut d = pad();
        let rx = PadAxis::RightX.index();
        step(&mut d, 0, &[RawEvent::sample(rx, 3000)]);
        assert_eq!(d.state().axis(rx), Axis::Absolute(0.0));

        d.set_dead_zone(rx, 0.05).expect("valid dead zone");
        assert_eq!(d.dead_zone(rx).expect("absolute"), 0.05);
        step(&mut d, 16, &[]);
        let v = d.state().axis(rx).position().expect("absolute");
        assert!((v - 3000.0 / 32768.0).abs() < 1e-6);
    }

    #[test]
    fn register_diff_synthesizes_transitions() {
        let mut d = pad();
        let a = PadButton::A.index();
        let up = PadButton::DPadUp.index();

        step(
            &mut d,
            0,
            &[RawEvent::Register(PadRegister::new(
                (1 << a) | (1 << up),
                vec![0, -32768],
            ))],
        );
        assert!(d.state().button(a).triggered());
        assert!(d.state().button(up).triggered());
        assert_eq!(d.state().axis(PadAxis::LeftY.index()), Axis::Absolute(-1.0));

        step(&mut d, 16, &[RawEvent::Register(PadRegister::new(1 << a, vec![]))]);
        assert!(d.state().button(a).held());
        assert!(!d.state().button(a).triggered());
        assert!(d.state().button(up).released());
        // Samples not carried by a register keep their value.
        assert_eq!(d.state().axis(PadAxis::LeftY.index()), Axis::Absolute(-1.0));
        assert_invariants(&d);
    }

    #[test]
    fn register_repress_after_release_carries_to_next_frame() {
        let mut d = pad();
        let b = PadButton::B.index();
        step(&mut d, 0, &[RawEvent::Register(PadRegister::new(1 << b, vec![]))]);
        step(
            &mut d,
            16,
            &[
                RawEvent::Register(PadRegister::new(0, vec![])),
                RawEvent::Register(PadRegister::new(1 << b, vec![])),
            ],
        );
        assert!(d.state().button(b).released());
        assert_eq!(d.pending(), 1);
        assert_invariants(&d);

        // No further register needed for the re-press to land.
        step(&mut d, 32, &[]);
        let button = d.state().button(b);
        assert!(button.triggered() && button.held());
    }

    #[test]
    fn register_after_carried_press_keeps_arrival_order() {
        let mut d = pad();
        let b = PadButton::B.index();
        step(&mut d, 0, &[RawEvent::press(b)]);
        step(
            &mut d,
            16,
            &[
                RawEvent::release(b),
                RawEvent::press(b),
                RawEvent::Register(PadRegister::new(0, vec![])),
            ],
        );
        assert!(d.state().button(b).released());
        assert_eq!(d.pending(), 2);

        // The register arrived last and says up.
        step(&mut d, 32, &[]);
        let button = d.state().button(b);
        assert!(!button.held());
        assert_eq!(d.pending(), 0);
        assert_invariants(&d);

        step(&mut d, 48, &[]);
        assert!(!d.state().button(b).held());
    }

    #[test]
    fn register_down_after_carried_press_keeps_button_held() {
        let mut d = pad();
        let b = PadButton::B.index();
        let x = PadButton::X.index();
        step(&mut d, 0, &[RawEvent::press(b)]);
        step(
            &mut d,
            16,
            &[
                RawEvent::release(b),
                RawEvent::press(b),
                RawEvent::Register(PadRegister::new((1 << b) | (1 << x), vec![])),
            ],
        );
        // Buttons with nothing carried still take the register immediately.
        assert!(d.state().button(x).triggered());

        step(&mut d, 32, &[]);
        let button = d.state().button(b);
        assert!(button.triggered() && button.held());
    }

    #[test]
    fn enqueue_rejects_out_of_range_and_wrong_kinds() {
        let mut p = pointer();
        assert!(matches!(
            p.enqueue(RawEvent::press(MouseButton::COUNT)),
            Err(InputError::ButtonOutOfRange { index: 5, count: 5, .. })
        ));
        assert!(matches!(
            p.enqueue(RawEvent::delta(7, 1)),
            Err(InputError::AxisOutOfRange { index: 7, .. })
        ));
        assert!(matches!(
            p.enqueue(RawEvent::sample(0, 1)),
            Err(InputError::UnsupportedEvent { .. })
        ));

        let mut k = keys();
        assert!(k.enqueue(RawEvent::delta(0, 1)).is_err());
        assert!(k
            .enqueue(RawEvent::Register(PadRegister::default()))
            .is_err());

        let mut g = pad();
        assert!(matches!(
            g.enqueue(RawEvent::delta(0, 3)),
            Err(InputError::UnsupportedEvent { .. })
        ));
        assert!(matches!(
            g.enqueue(RawEvent::Register(PadRegister::new(1 << 20, vec![]))),
            Err(InputError::ButtonOutOfRange { index: 20, .. })
        ));
        assert!(matches!(
            g.enqueue(RawEvent::Register(PadRegister::new(0, vec![0; 7]))),
            Err(InputError::RegisterShape { samples: 7, .. })
        ));
        assert_eq!(g.pending(), 0);
    }

    #[test]
    fn dead_zone_setter_validates() {
        let mut g = pad();
        assert!(g.set_dead_zone(0, 2.0).is_err());
        assert!(g.set_dead_zone(99, 0.1).is_err());

        let mut p = pointer();
        assert!(matches!(
            p.set_dead_zone(0, 0.1),
            Err(InputError::NotAbsoluteAxis { .. })
        ));
        assert!(p.dead_zone(0).is_err());
    }

    #[test]
    fn empty_frame_with_same_time_only_drops_edges() {
        let mut d = keys();
        step(&mut d, 100, &[RawEvent::press(1), RawEvent::release(2)]);
        let first = d.state().clone();

        step(&mut d, 100, &[]);
        let second = d.state();
        for (i, (a, b)) in first.buttons().iter().zip(second.buttons()).enumerate() {
            assert_eq!(a.held(), b.held(), "button {i}");
            assert!(!b.triggered() && !b.released(), "button {i}");
            assert!(!b.repeating(), "button {i}");
        }
    }

    #[test]
    fn backwards_time_is_clamped() {
        let mut d = keys();
        step(&mut d, 1_000, &[RawEvent::press(1)]);
        step(&mut d, 10, &[]);
        assert_eq!(d.last_frame(), Some(1_000));
        assert!(!d.state().button(1).repeating());
    }

    #[test]
    fn trigger_frame_repeats_regardless_of_event_order() {
        let mut d = keys();
        step(&mut d, 0, &[RawEvent::press(7)]);
        step(&mut d, 700, &[RawEvent::release(7), RawEvent::press(8)]);
        assert!(d.state().button(8).repeating());
        assert!(!d.state().button(7).repeating());
    }
}
