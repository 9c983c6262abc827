//! Decoding of Win32 Raw Input and XInput payload fields into [`RawEvent`]s.
//!
//! These are plain bit-twiddling functions over the integer fields the OS hands
//! out, kept free of any Win32 types so they build and test everywhere. The
//! Windows adapters copy the fields out of `RAWINPUT` / `XINPUT_STATE` and call in
//! here.
//!
//! ## Conventions
//! - Mouse deltas are raw OS counts, emitted only for relative motion.
//! - Wheel data is the signed 16-bit `usButtonData` field (±120 per detent).
//!   Read unsigned, a notch down shows up as 65416; that is still -120.
//! - Keys are addressed by virtual-key code; codes above 255 are dropped.

use crate::event::{PadRegister, RawEvent, Transition};
use crate::layout::{MouseAxis, MouseButton};

/// `RAWMOUSE::usFlags`: coordinates are absolute, not deltas.
pub const MOUSE_MOVE_ABSOLUTE: u16 = 0x0001;
/// `usButtonFlags`: `usButtonData` carries a vertical wheel delta.
pub const RI_MOUSE_WHEEL: u16 = 0x0400;
/// `usButtonFlags`: `usButtonData` carries a horizontal wheel delta.
pub const RI_MOUSE_HWHEEL: u16 = 0x0800;
/// `RAWKEYBOARD::Flags`: key went up.
pub const RI_KEY_BREAK: u16 = 0x0001;
/// `WM_INPUT` input code: the window was in the foreground.
pub const RIM_INPUT: usize = 0;
/// `WM_INPUT` input code: the window received input while in the background.
pub const RIM_INPUTSINK: usize = 1;

/// Whether a `WM_INPUT` `wparam` carries foreground input
/// (`GET_RAWINPUT_CODE_WPARAM(wparam) == RIM_INPUT`).
#[inline]
pub fn is_foreground_input(wparam: usize) -> bool {
    wparam & 0xFF == RIM_INPUT
}

/// Fields of a `RAWMOUSE` packet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawMouse {
    pub flags: u16,
    pub button_flags: u16,
    pub button_data: u16,
    pub last_x: i32,
    pub last_y: i32,
}

/// Fields of a `RAWKEYBOARD` packet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawKeyboard {
    pub vkey: u16,
    pub flags: u16,
}

/// Signed vertical wheel delta, if this packet carries one.
#[inline]
pub fn wheel_delta(button_flags: u16, button_data: u16) -> Option<i32> {
    (button_flags & RI_MOUSE_WHEEL != 0).then_some(button_data as i16 as i32)
}

/// Button transitions encoded in `usButtonFlags`.
///
/// Each button owns a bit pair: `1 << 2i` is down, `1 << (2i + 1)` is up. A
/// packet may carry several transitions; they come out in button order, down
/// before up.
pub fn mouse_buttons(button_flags: u16) -> impl Iterator<Item = RawEvent> {
    (0..MouseButton::COUNT).flat_map(move |index| {
        let pair = button_flags >> (index * 2);
        let down = (pair & 0b01 != 0).then(|| RawEvent::press(index));
        let up = (pair & 0b10 != 0).then(|| RawEvent::release(index));
        down.into_iter().chain(up)
    })
}

/// Every pointer event carried by one mouse packet: motion, wheel, then buttons.
pub fn decode_mouse(mouse: &RawMouse) -> Vec<RawEvent> {
    let mut events = Vec::new();

    if mouse.flags & MOUSE_MOVE_ABSOLUTE == 0 {
        if mouse.last_x != 0 {
            events.push(RawEvent::delta(MouseAxis::DeltaX.index(), mouse.last_x));
        }
        if mouse.last_y != 0 {
            events.push(RawEvent::delta(MouseAxis::DeltaY.index(), mouse.last_y));
        }
    }

    if let Some(wheel) = wheel_delta(mouse.button_flags, mouse.button_data) {
        events.push(RawEvent::delta(MouseAxis::Wheel.index(), wheel));
    }

    events.extend(mouse_buttons(mouse.button_flags));
    events
}

/// Key-matrix event for one keyboard packet.
pub fn decode_keyboard(keyboard: &RawKeyboard) -> Option<RawEvent> {
    let index = u8::try_from(keyboard.vkey).ok()? as usize;
    let transition = if keyboard.flags & RI_KEY_BREAK != 0 {
        Transition::Release
    } else {
        Transition::Press
    };
    Some(RawEvent::Button { index, transition })
}

/// Reorder XInput `wButtons` into [`PadButton`](crate::layout::PadButton) order.
///
/// Bits 0-9 (D-pad, Start, Back, thumbs, shoulders) keep their position; the face
/// buttons at bits 12-15 move down to 10-13.
#[inline]
pub fn xinput_buttons(w_buttons: u16) -> u32 {
    let w = w_buttons as u32;
    (w & 0x03FF) | ((w >> 2) & 0x3C00)
}

/// Raw XInput gamepad fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct XInputGamepad {
    pub buttons: u16,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub thumb_lx: i16,
    pub thumb_ly: i16,
    pub thumb_rx: i16,
    pub thumb_ry: i16,
}

/// Register in [`PadAxis`](crate::layout::PadAxis) order. Y axes are inverted so
/// that up is negative.
pub fn xinput_register(pad: &XInputGamepad) -> PadRegister {
    PadRegister::new(
        xinput_buttons(pad.buttons),
        vec![
            pad.thumb_lx as i32,
            -(pad.thumb_ly as i32),
            pad.thumb_rx as i32,
            -(pad.thumb_ry as i32),
            pad.left_trigger as i32,
            pad.right_trigger as i32,
        ],
    )
}
