//! XInput controller polling.
//!
//! XInput reports a whole controller state per call rather than a stream of
//! transitions, so [`XInputPad`] forwards it as a
//! [`PadRegister`](crate::event::PadRegister) and lets the analog device diff it
//! against its own `held` flags.
//!
//! Channel order follows [`PadButton`](crate::layout::PadButton) and
//! [`PadAxis`](crate::layout::PadAxis). Stick Y axes are inverted (up is
//! negative); triggers are raw `0..=255` samples.

#![cfg(target_os = "windows")]

use crate::backends::raw::{xinput_register, XInputGamepad};
use crate::backends::EventSource;
use crate::clock::Timestamp;
use crate::error::Result;
use crate::event::{DeviceClass, PadRegister, RawEvent};
use crate::manager::InputManager;
use tracing::info;
use windows_sys::Win32::UI::Input::XboxController::*;

/// Number of XInput slots.
pub const SLOT_COUNT: u32 = 4;

/// XInput-backed controller in slot `0..4`.
#[derive(Debug)]
pub struct XInputPad {
    slot: u32,
    name: String,
    connected: bool,
}

impl XInputPad {
    pub fn new(slot: u32) -> Self {
        Self {
            slot,
            name: format!("XInput Controller {}", slot),
            connected: false,
        }
    }

    pub fn slot(&self) -> u32 {
        self.slot
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Read the current register.
    ///
    /// Returns `None` while the slot is empty. The first read after a disconnect
    /// returns an all-released, centered register so held buttons get released.
    pub fn poll(&mut self) -> Option<PadRegister> {
        // FFI struct: must be zeroed before the call.
        let mut state: XINPUT_STATE = unsafe { std::mem::zeroed() };
        let res = unsafe { XInputGetState(self.slot, &mut state) };

        if res != 0 {
            if self.connected {
                self.connected = false;
                info!("{} disconnected", self.name);
                return Some(PadRegister::new(0, vec![0; 6]));
            }
            return None;
        }

        if !self.connected {
            self.connected = true;
            info!("{} connected", self.name);
        }

        let gp = state.Gamepad;
        Some(xinput_register(&XInputGamepad {
            buttons: gp.wButtons as u16,
            left_trigger: gp.bLeftTrigger,
            right_trigger: gp.bRightTrigger,
            thumb_lx: gp.sThumbLX,
            thumb_ly: gp.sThumbLY,
            thumb_rx: gp.sThumbRX,
            thumb_ry: gp.sThumbRY,
        }))
    }
}

impl EventSource for XInputPad {
    fn name(&self) -> &str {
        &self.name
    }

    fn pump(&mut self, _now: Timestamp, input: &mut InputManager) -> Result<usize> {
        match self.poll() {
            Some(register) => {
                input.enqueue(DeviceClass::Analog, RawEvent::Register(register))?;
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

/// Pads for every XInput slot.
pub fn probe_pads() -> Vec<XInputPad> {
    (0..SLOT_COUNT).map(XInputPad::new).collect()
}
